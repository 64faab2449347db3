/// EVM-specific types and utilities.
///
/// Address wrapper, call/transaction request builders, error definitions, and
/// the decimal formatting helpers used wherever token amounts are displayed.
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::Error;

/// Ethereum address wrapper
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EthAddress(pub Address);

impl EthAddress {
    /// Parse from a 0x-prefixed hex string
    pub fn parse(s: &str) -> Result<Self, Error> {
        let addr = Address::from_str(s)
            .map_err(|e| Error::Evm(format!("Invalid Ethereum address '{}': {}", s, e)))?;
        Ok(Self(addr))
    }

    pub fn inner(&self) -> &Address {
        &self.0
    }
}

impl FromStr for EthAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        Self::parse(s)
    }
}

impl std::fmt::Display for EthAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Debug on alloy's Address renders the full checksummed hex form
        write!(f, "{:?}", self.0)
    }
}

impl From<Address> for EthAddress {
    fn from(addr: Address) -> Self {
        Self(addr)
    }
}

impl From<EthAddress> for Address {
    fn from(addr: EthAddress) -> Self {
        addr.0
    }
}

/// Read-only contract call request
#[derive(Debug, Clone)]
pub struct EvmCallRequest {
    /// Target contract address
    pub to: EthAddress,
    /// Encoded call data
    pub data: Vec<u8>,
    /// Block number or tag (latest when unset)
    pub block: Option<String>,
}

impl EvmCallRequest {
    pub fn new(to: EthAddress, data: Vec<u8>) -> Self {
        Self {
            to,
            data,
            block: None,
        }
    }

    pub fn at_block(mut self, block: String) -> Self {
        self.block = Some(block);
        self
    }
}

/// State-changing transaction request
#[derive(Debug, Clone)]
pub struct EvmTransactionRequest {
    /// Target address (None implies contract creation)
    pub to: Option<EthAddress>,
    /// Value in wei
    pub value: U256,
    /// Gas limit; estimated when unset
    pub gas_limit: Option<u64>,
    /// Max fee per gas (EIP-1559); fetched when unset
    pub max_fee_per_gas: Option<u128>,
    /// Max priority fee per gas (EIP-1559); fetched when unset
    pub max_priority_fee_per_gas: Option<u128>,
    /// Call data
    pub data: Vec<u8>,
    /// Chain ID for EIP-155 replay protection
    pub chain_id: u64,
}

impl EvmTransactionRequest {
    pub fn new(chain_id: u64) -> Self {
        Self {
            to: None,
            value: U256::ZERO,
            gas_limit: None,
            max_fee_per_gas: None,
            max_priority_fee_per_gas: None,
            data: Vec::new(),
            chain_id,
        }
    }

    pub fn to(mut self, to: EthAddress) -> Self {
        self.to = Some(to);
        self
    }

    pub fn value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    pub fn gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }

    pub fn fees(mut self, max_fee: u128, priority_fee: u128) -> Self {
        self.max_fee_per_gas = Some(max_fee);
        self.max_priority_fee_per_gas = Some(priority_fee);
        self
    }

    pub fn data(mut self, data: Vec<u8>) -> Self {
        self.data = data;
        self
    }
}

/// EVM-specific errors
#[derive(Debug, thiserror::Error)]
pub enum EvmError {
    #[error("Invalid Ethereum address: {0}")]
    InvalidAddress(String),

    #[error("ABI encoding/decoding error: {0}")]
    AbiError(String),

    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Transaction failed: {0}")]
    TransactionError(String),

    #[error("Gas estimation failed: {0}")]
    GasEstimationError(String),
}

impl From<EvmError> for Error {
    fn from(err: EvmError) -> Self {
        Error::Evm(err.to_string())
    }
}

/// Amount formatting and parsing helpers
pub mod utils {
    use super::*;

    /// Format a raw integer amount for display.
    ///
    /// The displayed value equals `raw / 10^decimals` truncated to
    /// `precision` fractional digits. Truncation (not rounding half-up)
    /// matches how the holdings views render balances.
    pub fn format_units(raw: U256, decimals: u32, precision: u32) -> String {
        if decimals == 0 {
            return raw.to_string();
        }

        let divisor = U256::from(10u64).pow(U256::from(decimals));
        let integer = raw / divisor;
        let remainder = raw % divisor;

        let shown = precision.min(decimals) as usize;
        if shown == 0 {
            return integer.to_string();
        }

        let mut frac = format!("{:0>width$}", remainder.to_string(), width = decimals as usize);
        frac.truncate(shown);
        format!("{}.{}", integer, frac)
    }

    /// `format_units` over a decimal string balance (the RPC wire form)
    pub fn format_units_str(raw: &str, decimals: u32, precision: u32) -> Result<String, Error> {
        let value = U256::from_str(raw.trim())
            .map_err(|e| Error::Evm(format!("Invalid raw balance '{}': {}", raw, e)))?;
        Ok(format_units(value, decimals, precision))
    }

    /// Parse a human decimal amount into raw integer units.
    ///
    /// Inverse of `format_units`: `"1.5"` with 6 decimals becomes 1500000.
    /// Excess fractional digits beyond `decimals` are rejected rather than
    /// silently truncated.
    pub fn parse_units(amount: &str, decimals: u32) -> Result<U256, Error> {
        let amount = amount.trim();
        let multiplier = U256::from(10u64).pow(U256::from(decimals));

        let Some(dot) = amount.find('.') else {
            let integer = U256::from_str(amount)
                .map_err(|_| Error::Evm(format!("Invalid amount '{}'", amount)))?;
            return Ok(integer * multiplier);
        };

        let int_part = &amount[..dot];
        let frac_part = &amount[dot + 1..];

        if frac_part.len() as u32 > decimals {
            return Err(Error::Evm(format!(
                "Amount '{}' has more than {} fractional digits",
                amount, decimals
            )));
        }

        let integer = if int_part.is_empty() {
            U256::ZERO
        } else {
            U256::from_str(int_part)
                .map_err(|_| Error::Evm(format!("Invalid amount '{}'", amount)))?
        };

        let fraction = if frac_part.is_empty() {
            U256::ZERO
        } else {
            U256::from_str(frac_part)
                .map_err(|_| Error::Evm(format!("Invalid amount '{}'", amount)))?
        };

        let frac_scale = U256::from(10u64).pow(U256::from(decimals - frac_part.len() as u32));
        Ok(integer * multiplier + fraction * frac_scale)
    }

    /// Derive an Ethereum address from an uncompressed secp256k1 public key
    pub fn eth_address_from_pubkey_uncompressed(pubkey: &[u8]) -> Result<EthAddress, Error> {
        use tiny_keccak::{Hasher, Keccak};

        if pubkey.len() != 65 || pubkey[0] != 0x04 {
            return Err(Error::Evm(
                "Invalid uncompressed public key format".to_string(),
            ));
        }

        let mut hasher = Keccak::v256();
        hasher.update(&pubkey[1..]);
        let mut hash = [0u8; 32];
        hasher.finalize(&mut hash);

        let mut address_bytes = [0u8; 20];
        address_bytes.copy_from_slice(&hash[12..32]);
        Ok(EthAddress(Address::from(address_bytes)))
    }
}

#[cfg(test)]
mod tests {
    use super::utils::*;
    use super::*;

    #[test]
    fn format_units_divides_by_decimals() {
        // 1234567890 with 6 decimals = 1234.567890
        let raw = U256::from(1_234_567_890u64);
        assert_eq!(format_units(raw, 6, 6), "1234.567890");
        assert_eq!(format_units(raw, 6, 2), "1234.56");
        assert_eq!(format_units(raw, 6, 0), "1234");
    }

    #[test]
    fn format_units_pads_leading_zeros() {
        // 42 with 6 decimals = 0.000042
        assert_eq!(format_units(U256::from(42u64), 6, 6), "0.000042");
        // Truncated below its magnitude it shows zero
        assert_eq!(format_units(U256::from(42u64), 6, 2), "0.00");
    }

    #[test]
    fn format_units_zero_decimals() {
        assert_eq!(format_units(U256::from(7u64), 0, 4), "7");
    }

    #[test]
    fn format_units_from_wire_string() {
        assert_eq!(
            format_units_str("2500000000000000000", 18, 4).unwrap(),
            "2.5000"
        );
        assert!(format_units_str("not-a-number", 18, 4).is_err());
    }

    #[test]
    fn parse_units_round_trips() {
        let raw = parse_units("1.5", 6).unwrap();
        assert_eq!(raw, U256::from(1_500_000u64));
        assert_eq!(format_units(raw, 6, 1), "1.5");

        assert_eq!(parse_units("12", 2).unwrap(), U256::from(1200u64));
        assert_eq!(parse_units(".25", 2).unwrap(), U256::from(25u64));
    }

    #[test]
    fn parse_units_rejects_excess_precision() {
        assert!(parse_units("0.1234567", 6).is_err());
        assert!(parse_units("abc", 6).is_err());
    }

    #[test]
    fn address_parsing() {
        let addr = EthAddress::parse("0x742d35Cc6634C0532925a3b844Bc454e4438f44e").unwrap();
        assert_eq!(
            addr.to_string().to_lowercase(),
            "0x742d35cc6634c0532925a3b844bc454e4438f44e"
        );

        assert!(EthAddress::parse("742d35cc").is_err());
        assert!(EthAddress::parse("0x742d35").is_err());
    }
}

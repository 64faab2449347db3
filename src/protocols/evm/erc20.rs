/// ERC-20 token helper.
///
/// Balance and metadata reads plus calldata builders for the transfer and
/// approval flows routed through the dispatcher.
use alloy_primitives::{keccak256, Address, U256};
use alloy_sol_types::SolValue;

use crate::error::Error;
use crate::protocols::evm::client::EvmClient;
use crate::protocols::evm::types::{EthAddress, EvmCallRequest};

#[derive(Clone)]
pub struct Erc20 {
    client: EvmClient,
    address: EthAddress,
}

impl Erc20 {
    pub fn new(client: EvmClient, address: EthAddress) -> Self {
        Self { client, address }
    }

    pub fn address(&self) -> &EthAddress {
        &self.address
    }

    /// Token balance of an address
    pub async fn balance_of(&self, owner: Address) -> Result<U256, Error> {
        let data = encode_with_selector(b"balanceOf(address)", &owner.abi_encode());
        let result = self
            .client
            .call(EvmCallRequest::new(self.address.clone(), data))
            .await?;
        decode_uint256(&result)
    }

    /// Token decimals
    pub async fn decimals(&self) -> Result<u8, Error> {
        let data = encode_with_selector(b"decimals()", &[]);
        let result = self
            .client
            .call(EvmCallRequest::new(self.address.clone(), data))
            .await?;
        if result.len() >= 32 {
            Ok(result[31])
        } else {
            Err(Error::Evm("Invalid decimals response".to_string()))
        }
    }

    /// Token symbol
    pub async fn symbol(&self) -> Result<String, Error> {
        let data = encode_with_selector(b"symbol()", &[]);
        let result = self
            .client
            .call(EvmCallRequest::new(self.address.clone(), data))
            .await?;
        decode_string(&result)
    }

    /// Allowance granted by owner to spender
    pub async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, Error> {
        let mut args = owner.abi_encode();
        args.extend_from_slice(&spender.abi_encode());
        let data = encode_with_selector(b"allowance(address,address)", &args);
        let result = self
            .client
            .call(EvmCallRequest::new(self.address.clone(), data))
            .await?;
        decode_uint256(&result)
    }

    /// Calldata for a transfer
    pub fn transfer_calldata(&self, to: Address, amount: U256) -> Vec<u8> {
        let mut args = to.abi_encode();
        args.extend_from_slice(&amount.abi_encode());
        encode_with_selector(b"transfer(address,uint256)", &args)
    }

    /// Calldata for an approval
    pub fn approve_calldata(&self, spender: Address, amount: U256) -> Vec<u8> {
        let mut args = spender.abi_encode();
        args.extend_from_slice(&amount.abi_encode());
        encode_with_selector(b"approve(address,uint256)", &args)
    }
}

/// Selector (first 4 bytes of keccak256 of the signature) plus encoded args
fn encode_with_selector(signature: &[u8], args: &[u8]) -> Vec<u8> {
    let hash = keccak256(signature);
    let mut data = hash[..4].to_vec();
    data.extend_from_slice(args);
    data
}

fn decode_uint256(data: &[u8]) -> Result<U256, Error> {
    if data.len() < 32 {
        return Err(Error::Evm("Insufficient data for uint256".to_string()));
    }
    Ok(U256::from_be_slice(&data[0..32]))
}

fn decode_string(data: &[u8]) -> Result<String, Error> {
    if data.len() < 64 {
        return Err(Error::Evm("Invalid string response".to_string()));
    }
    let length = U256::from_be_slice(&data[32..64]);
    let length: usize = length
        .try_into()
        .map_err(|_| Error::Evm("String length out of range".to_string()))?;
    if data.len() < 64 + length {
        return Err(Error::Evm("Invalid string response length".to_string()));
    }
    String::from_utf8(data[64..64 + length].to_vec())
        .map_err(|e| Error::Evm(format!("Invalid string encoding: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn transfer_calldata_uses_known_selector() {
        let client = EvmClient::new("https://evm-rpc.sei-apis.com", 1329).unwrap();
        let token = EthAddress::parse("0x742d35Cc6634C0532925a3b844Bc454e4438f44e").unwrap();
        let erc20 = Erc20::new(client, token);

        let to = Address::from_str("0x9858EfFD232B4033E47d90003D41EC34EcaEda94").unwrap();
        let data = erc20.transfer_calldata(to, U256::from(1000u64));

        // transfer(address,uint256) selector is 0xa9059cbb
        assert_eq!(&data[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
        // selector + 2 words
        assert_eq!(data.len(), 4 + 64);
    }

    #[test]
    fn string_decoding_handles_abi_layout() {
        // ABI-encoded "SEI": offset word, length word, padded payload
        let mut data = vec![0u8; 96];
        data[31] = 0x20;
        data[63] = 3;
        data[64..67].copy_from_slice(b"SEI");
        assert_eq!(decode_string(&data).unwrap(), "SEI");

        assert!(decode_string(&[0u8; 16]).is_err());
    }
}

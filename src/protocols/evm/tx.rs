// Allow deprecated Signature for compatibility with alloy-consensus ecosystem
#![allow(deprecated)]

use alloy_consensus::{SignableTransaction, Signed, TxEip1559};
use alloy_eips::eip2930::AccessList;
use alloy_primitives::{Address, Bytes, Signature, TxKind, B256, U256};

/// Builder for EIP-1559 transactions on the Sei EVM layer.
#[derive(Clone, Debug)]
pub struct Eip1559Transaction {
    inner: TxEip1559,
}

impl Eip1559Transaction {
    /// Start a transaction with the given chain id and nonce.
    pub fn new(chain_id: u64, nonce: u64) -> Self {
        Self {
            inner: TxEip1559 {
                chain_id,
                nonce,
                gas_limit: 21_000,
                max_fee_per_gas: 0,
                max_priority_fee_per_gas: 0,
                to: TxKind::Create,
                value: U256::ZERO,
                access_list: AccessList::default(),
                input: Bytes::new(),
            },
        }
    }

    /// Set the call target. Contract creation is not used by the SDK, so a
    /// target is always expected before signing.
    pub fn to(mut self, to: Address) -> Self {
        self.inner.to = TxKind::Call(to);
        self
    }

    /// Value in wei to transfer.
    pub fn value(mut self, value: U256) -> Self {
        self.inner.value = value;
        self
    }

    /// Calldata payload.
    pub fn data(mut self, data: impl Into<Bytes>) -> Self {
        self.inner.input = data.into();
        self
    }

    pub fn gas_limit(mut self, gas_limit: u64) -> Self {
        self.inner.gas_limit = gas_limit;
        self
    }

    /// EIP-1559 fee caps in wei.
    pub fn fees(mut self, max_fee_per_gas: u128, max_priority_fee_per_gas: u128) -> Self {
        self.inner.max_fee_per_gas = max_fee_per_gas;
        self.inner.max_priority_fee_per_gas = max_priority_fee_per_gas;
        self
    }

    pub fn chain_id(&self) -> u64 {
        self.inner.chain_id
    }

    pub fn nonce(&self) -> u64 {
        self.inner.nonce
    }

    /// Bytes to keccak-hash for signing.
    pub fn encoded_for_signing(&self) -> Vec<u8> {
        self.inner.encoded_for_signing()
    }

    /// Signature hash (keccak256) of the unsigned transaction.
    pub fn signature_hash(&self) -> B256 {
        self.inner.signature_hash()
    }

    /// Combine with a signature, producing the broadcastable payload.
    pub fn into_signed(self, signature: Signature) -> SignedEip1559Transaction {
        let mut raw = Vec::with_capacity(
            self.inner.encoded_len_with_signature(&signature, false),
        );
        self.inner.encode_with_signature(&signature, &mut raw, false);
        let signed = self.inner.into_signed(signature);
        SignedEip1559Transaction {
            signed,
            raw: Bytes::from(raw),
        }
    }
}

/// Fully signed transaction plus its raw encoding.
#[derive(Clone, Debug)]
pub struct SignedEip1559Transaction {
    signed: Signed<TxEip1559>,
    raw: Bytes,
}

impl SignedEip1559Transaction {
    /// Raw bytes for `eth_sendRawTransaction`.
    pub fn raw(&self) -> &Bytes {
        &self.raw
    }

    /// Transaction hash of the signed payload.
    pub fn hash(&self) -> B256 {
        *self.signed.hash()
    }

    pub fn signature(&self) -> &Signature {
        self.signed.signature()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn signature_hash_is_deterministic() {
        let to = Address::from_str("0x742d35Cc6634C0532925a3b844Bc454e4438f44e").unwrap();
        let tx = Eip1559Transaction::new(1329, 7)
            .to(to)
            .value(U256::from(1000u64))
            .fees(100, 10)
            .gas_limit(50_000);

        assert_eq!(tx.signature_hash(), tx.clone().signature_hash());
        assert_eq!(tx.chain_id(), 1329);
        assert_eq!(tx.nonce(), 7);

        // Different nonce, different hash
        let other = Eip1559Transaction::new(1329, 8)
            .to(to)
            .value(U256::from(1000u64))
            .fees(100, 10)
            .gas_limit(50_000);
        assert_ne!(tx.signature_hash(), other.signature_hash());
    }

    #[test]
    fn signing_payload_is_typed() {
        // EIP-1559 signing payloads are type-prefixed with 0x02
        let tx = Eip1559Transaction::new(1329, 0)
            .to(Address::ZERO)
            .fees(1, 1);
        let encoded = tx.encoded_for_signing();
        assert_eq!(encoded[0], 0x02);
    }
}

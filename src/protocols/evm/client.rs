/// EVM client for the Sei EVM layer.
///
/// Wraps an alloy HTTP provider with the call, fee, and broadcast surface the
/// wallet session and dispatcher need.
use alloy_primitives::{Address, B256, U256};
use alloy_provider::{Provider, ProviderBuilder};
use alloy_rpc_types_eth::{BlockNumberOrTag, TransactionRequest};
use alloy_sol_types::SolCall;
use alloy_transport_http::{Client, Http};

use crate::error::Error;
use crate::protocols::evm::types::{EthAddress, EvmCallRequest, EvmError, EvmTransactionRequest};

/// Percentage buffer added to gas estimates to absorb state drift between
/// estimation and inclusion
pub const GAS_BUFFER_PERCENT: u64 = 20;

/// EIP-1559 fee estimate in wei
#[derive(Debug, Clone, Copy)]
pub struct FeeEstimate {
    pub max_fee_per_gas: u128,
    pub max_priority_fee_per_gas: u128,
}

/// EVM client for blockchain interactions
#[derive(Clone)]
pub struct EvmClient {
    provider: alloy_provider::RootProvider<Http<Client>>,
    chain_id: u64,
}

impl EvmClient {
    /// Create a client for the given RPC endpoint and chain id
    pub fn new(rpc_url: &str, chain_id: u64) -> Result<Self, Error> {
        let url = reqwest::Url::parse(rpc_url)
            .map_err(|e| Error::Config(format!("Invalid EVM RPC URL: {}", e)))?;
        let provider = ProviderBuilder::new().on_http(url);

        Ok(Self { provider, chain_id })
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Execute a read-only contract call
    pub async fn call(&self, request: EvmCallRequest) -> Result<Vec<u8>, Error> {
        let tx_request = TransactionRequest {
            to: Some(alloy_primitives::TxKind::Call(request.to.0)),
            input: request.data.into(),
            ..Default::default()
        };

        let result = self
            .provider
            .call(&tx_request)
            .await
            .map_err(|e| EvmError::RpcError(e.to_string()))?;

        Ok(result.to_vec())
    }

    /// Call a typed contract method (read-only)
    pub async fn call_contract<T: SolCall>(
        &self,
        contract_address: Address,
        call: T,
    ) -> Result<T::Return, Error> {
        let data = call.abi_encode();
        let request = EvmCallRequest::new(EthAddress(contract_address), data);
        let result = self.call(request).await?;
        T::abi_decode_returns(&result, false)
            .map_err(|e| Error::Evm(format!("Failed to decode contract call result: {}", e)))
    }

    /// Execute a raw read-only call against an address
    pub async fn call_raw(&self, address: Address, data: Vec<u8>) -> Result<Vec<u8>, Error> {
        self.call(EvmCallRequest::new(EthAddress(address), data)).await
    }

    /// Estimate gas for a transaction, with the standard buffer applied
    pub async fn estimate_gas(&self, request: &EvmTransactionRequest) -> Result<u64, Error> {
        let tx_request = TransactionRequest {
            to: request.to.as_ref().map(|addr| alloy_primitives::TxKind::Call(addr.0)),
            value: Some(request.value),
            input: request.data.clone().into(),
            ..Default::default()
        };

        let estimated = self
            .provider
            .estimate_gas(&tx_request)
            .await
            .map_err(|e| EvmError::GasEstimationError(e.to_string()))?;

        Ok(estimated + estimated * GAS_BUFFER_PERCENT / 100)
    }

    /// Current legacy gas price in wei
    pub async fn gas_price(&self) -> Result<u128, Error> {
        self.provider
            .get_gas_price()
            .await
            .map_err(|e| EvmError::RpcError(e.to_string()).into())
    }

    /// EIP-1559 fee estimate from recent fee history, falling back to the
    /// legacy gas price when history is unavailable
    pub async fn fee_estimate(&self) -> Result<FeeEstimate, Error> {
        let fee_history = self
            .provider
            .get_fee_history(1, BlockNumberOrTag::Latest, &[50.0])
            .await
            .map_err(|e| EvmError::RpcError(e.to_string()))?;

        if let (Some(base_fee), Some(reward)) = (
            fee_history.base_fee_per_gas.last(),
            fee_history
                .reward
                .as_ref()
                .and_then(|r| r.last())
                .and_then(|r| r.first()),
        ) {
            return Ok(FeeEstimate {
                max_fee_per_gas: base_fee * 2 + reward,
                max_priority_fee_per_gas: *reward,
            });
        }

        let gas_price = self.gas_price().await?;
        Ok(FeeEstimate {
            max_fee_per_gas: gas_price,
            max_priority_fee_per_gas: gas_price / 10,
        })
    }

    /// Native balance of an address in wei
    pub async fn get_balance(&self, address: Address) -> Result<U256, Error> {
        self.provider
            .get_balance(address)
            .await
            .map_err(|e| EvmError::RpcError(e.to_string()).into())
    }

    /// Next nonce for an address
    pub async fn get_nonce(&self, address: Address) -> Result<u64, Error> {
        self.provider
            .get_transaction_count(address)
            .await
            .map_err(|e| EvmError::RpcError(e.to_string()).into())
    }

    /// Current block number
    pub async fn get_block_number(&self) -> Result<u64, Error> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| EvmError::RpcError(e.to_string()).into())
    }

    /// Broadcast a signed transaction, returning its hash
    pub async fn send_raw_transaction(&self, raw: &[u8]) -> Result<B256, Error> {
        let pending = self
            .provider
            .send_raw_transaction(raw)
            .await
            .map_err(|e| EvmError::TransactionError(e.to_string()))?;
        Ok(*pending.tx_hash())
    }

    /// Fetch a transaction receipt by hash
    pub async fn get_transaction_receipt(
        &self,
        tx_hash: B256,
    ) -> Result<Option<alloy_rpc_types_eth::TransactionReceipt>, Error> {
        self.provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(|e| EvmError::RpcError(e.to_string()).into())
    }

    /// ERC-20 helper bound to the given token contract
    pub fn erc20(&self, address: Address) -> crate::protocols::evm::erc20::Erc20 {
        crate::protocols::evm::erc20::Erc20::new(self.clone(), EthAddress(address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_construction_validates_url() {
        assert!(EvmClient::new("https://evm-rpc.sei-apis.com", 1329).is_ok());
        assert!(EvmClient::new("not a url", 1329).is_err());
    }

    #[test]
    fn gas_buffer_applies() {
        // 20% buffer over 100_000
        let estimated = 100_000u64;
        let buffered = estimated + estimated * GAS_BUFFER_PERCENT / 100;
        assert_eq!(buffered, 120_000);
    }
}

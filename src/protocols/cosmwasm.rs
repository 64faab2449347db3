/// CosmWasm client for the Sei native layer.
///
/// Smart-contract state queries and `MsgExecuteContract` broadcasts for the
/// CosmWasm-side protocols (Astroport, Vortex). Queries go over ABCI; writes
/// are signed with the session's Cosmos key and broadcast in commit mode so a
/// rejection surfaces immediately.
use cosmrs::rpc::{Client as RpcClient, HttpClient};
use cosmrs::tx::Msg;
use cosmrs::{cosmwasm::MsgExecuteContract, AccountId, Coin as CosmosCoin};
use prost::Message;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::SeiNetworkConfig;
use crate::error::Error;
use crate::wallet::BarukWallet;

/// Gas limit for CosmWasm execute transactions
pub const DEFAULT_WASM_GAS_LIMIT: u64 = 500_000;

/// Client for the Cosmos layer RPC
#[derive(Clone)]
pub struct WasmClient {
    rpc: Arc<HttpClient>,
    chain_id: String,
    gas_price: f64,
    gas_adjustment: f64,
    native_denom: String,
}

impl WasmClient {
    pub fn new(config: &SeiNetworkConfig) -> Result<Self, Error> {
        let rpc = HttpClient::new(config.rpc_url.as_str())
            .map_err(|e| Error::Rpc(format!("Failed to create Cosmos RPC client: {}", e)))?;
        Ok(Self {
            rpc: Arc::new(rpc),
            chain_id: config.chain_id.clone(),
            gas_price: config.gas_price,
            gas_adjustment: config.gas_adjustment,
            native_denom: config.native_denom.clone(),
        })
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    /// Query a contract's smart state with a typed msg and response
    pub async fn smart_query<M: Serialize, R: DeserializeOwned>(
        &self,
        contract: &str,
        query_msg: &M,
    ) -> Result<R, Error> {
        use cosmos_sdk_proto::cosmwasm::wasm::v1::QuerySmartContractStateRequest;

        let query = QuerySmartContractStateRequest {
            address: contract.to_string(),
            query_data: serde_json::to_vec(query_msg)?,
        };

        let result = self
            .rpc
            .abci_query(
                Some("/cosmwasm.wasm.v1.Query/SmartContractState".to_string()),
                query.encode_to_vec(),
                None,
                false,
            )
            .await
            .map_err(|e| Error::Rpc(format!("ABCI query failed: {}", e)))?;

        if !result.code.is_ok() {
            return Err(Error::Contract(format!(
                "Contract query failed with code {:?}: {}",
                result.code, result.log
            )));
        }

        use cosmos_sdk_proto::cosmwasm::wasm::v1::QuerySmartContractStateResponse;
        let response = QuerySmartContractStateResponse::decode(result.value.as_slice())
            .map_err(|e| Error::Rpc(format!("Failed to decode query response: {}", e)))?;

        let data: R = serde_json::from_slice(&response.data)?;
        Ok(data)
    }

    /// Account number and sequence for an address
    pub async fn account_info(&self, address: &str) -> Result<(u64, u64), Error> {
        use cosmos_sdk_proto::cosmos::auth::v1beta1::{
            BaseAccount, QueryAccountRequest, QueryAccountResponse,
        };

        let request = QueryAccountRequest {
            address: address.to_string(),
        };

        let result = self
            .rpc
            .abci_query(
                Some("/cosmos.auth.v1beta1.Query/Account".to_string()),
                request.encode_to_vec(),
                None,
                false,
            )
            .await
            .map_err(|e| Error::Rpc(format!("Account query failed: {}", e)))?;

        if !result.code.is_ok() {
            return Err(Error::Rpc(format!(
                "Account query failed with code {:?}: {}",
                result.code, result.log
            )));
        }

        let response = QueryAccountResponse::decode(result.value.as_slice())
            .map_err(|e| Error::Rpc(format!("Failed to decode account response: {}", e)))?;
        let any = response
            .account
            .ok_or_else(|| Error::Rpc(format!("Account '{}' not found on chain", address)))?;
        let account = BaseAccount::decode(any.value.as_slice())
            .map_err(|e| Error::Rpc(format!("Failed to decode base account: {}", e)))?;

        Ok((account.account_number, account.sequence))
    }

    /// Spendable bank balances of an address as (denom, amount) pairs
    pub async fn bank_balances(&self, address: &str) -> Result<Vec<(String, String)>, Error> {
        use cosmos_sdk_proto::cosmos::bank::v1beta1::{
            QueryAllBalancesRequest, QueryAllBalancesResponse,
        };

        let request = QueryAllBalancesRequest {
            address: address.to_string(),
            pagination: None,
            resolve_denom: false,
        };

        let result = self
            .rpc
            .abci_query(
                Some("/cosmos.bank.v1beta1.Query/AllBalances".to_string()),
                request.encode_to_vec(),
                None,
                false,
            )
            .await
            .map_err(|e| Error::Rpc(format!("Balance query failed: {}", e)))?;

        if !result.code.is_ok() {
            return Err(Error::Rpc(format!(
                "Balance query failed with code {:?}: {}",
                result.code, result.log
            )));
        }

        let response = QueryAllBalancesResponse::decode(result.value.as_slice())
            .map_err(|e| Error::Rpc(format!("Failed to decode balances: {}", e)))?;

        Ok(response
            .balances
            .into_iter()
            .map(|coin| (coin.denom, coin.amount))
            .collect())
    }

    /// Sign and broadcast a contract execute message, returning the tx hash
    pub async fn execute<M: Serialize>(
        &self,
        wallet: &BarukWallet,
        contract: &str,
        msg: &M,
        funds: Vec<CosmosCoin>,
        memo: Option<String>,
    ) -> Result<String, Error> {
        let sender = wallet.cosmos_address()?;
        let contract_id = AccountId::from_str(contract)
            .map_err(|e| Error::Contract(format!("Invalid contract address '{}': {}", contract, e)))?;

        let (account_number, sequence) = self.account_info(&sender.to_string()).await?;
        debug!(
            sender = %sender,
            contract,
            account_number,
            sequence,
            "Executing CosmWasm message"
        );

        let execute_msg = MsgExecuteContract {
            sender,
            contract: contract_id,
            msg: serde_json::to_vec(msg)?,
            funds,
        };
        let any = execute_msg
            .to_any()
            .map_err(|e| Error::Contract(format!("Failed to encode execute msg: {}", e)))?;

        let gas_limit = DEFAULT_WASM_GAS_LIMIT;
        let fee_amount = (gas_limit as f64 * self.gas_price * self.gas_adjustment) as u64;
        let fee = wallet.create_fee(fee_amount, gas_limit, &self.native_denom)?;

        let raw = wallet.sign_tx(
            account_number,
            sequence,
            &self.chain_id,
            fee,
            vec![any],
            memo,
        )?;

        let response = raw
            .broadcast_commit(&*self.rpc)
            .await
            .map_err(|e| Error::Rpc(format!("Broadcast failed: {}", e)))?;

        if !response.check_tx.code.is_ok() {
            return Err(Error::Contract(format!(
                "Transaction rejected in check_tx (code {:?}): {}",
                response.check_tx.code, response.check_tx.log
            )));
        }
        if !response.tx_result.code.is_ok() {
            return Err(Error::Contract(format!(
                "Transaction failed on chain (code {:?}): {}",
                response.tx_result.code, response.tx_result.log
            )));
        }

        let hash = response.hash.to_string();
        info!(tx_hash = %hash, contract, "CosmWasm execute confirmed");
        Ok(hash)
    }
}

//! Contract dispatcher.
//!
//! Given a logical protocol and contract role, resolves the concrete address
//! and interface, checks it against the connected chain family, and issues the
//! write through whichever signer the wallet session currently holds. A
//! dropped transaction is not resubmitted; errors propagate to the caller.

use alloy_primitives::U256;
use serde_json::Value;
use tracing::debug;

use crate::config::{ChainFamily, ContractInfo, ContractRole, NetworkContracts, ProtocolId};
use crate::error::Error;
use crate::protocols::evm::abi::AbiRegistry;
use crate::protocols::evm::{EthAddress, EvmTransactionRequest};
use crate::wallet::session::{TxPayload, WalletSession, WasmExecute};

/// Built-in interface definitions for the Baruk EVM contracts, keyed by role.
/// Used by the name-resolved dispatch path to validate methods before any
/// signer is touched.
const BARUK_ROUTER_ABI: &str = r#"[
    {"type":"function","name":"swapExactTokensForTokens","stateMutability":"nonpayable",
     "inputs":[{"name":"amountIn","type":"uint256"},{"name":"amountOutMin","type":"uint256"},
               {"name":"path","type":"address[]"},{"name":"to","type":"address"},
               {"name":"deadline","type":"uint256"}],
     "outputs":[{"name":"amounts","type":"uint256[]"}]}
]"#;

const BARUK_AMM_ABI: &str = r#"[
    {"type":"function","name":"addLiquidity","stateMutability":"nonpayable",
     "inputs":[{"name":"tokenA","type":"address"},{"name":"tokenB","type":"address"},
               {"name":"amountADesired","type":"uint256"},{"name":"amountBDesired","type":"uint256"},
               {"name":"amountAMin","type":"uint256"},{"name":"amountBMin","type":"uint256"},
               {"name":"to","type":"address"}],
     "outputs":[{"name":"amountA","type":"uint256"},{"name":"amountB","type":"uint256"},
                {"name":"liquidity","type":"uint256"}]},
    {"type":"function","name":"removeLiquidity","stateMutability":"nonpayable",
     "inputs":[{"name":"tokenA","type":"address"},{"name":"tokenB","type":"address"},
               {"name":"liquidity","type":"uint256"},{"name":"amountAMin","type":"uint256"},
               {"name":"amountBMin","type":"uint256"},{"name":"to","type":"address"}],
     "outputs":[{"name":"amountA","type":"uint256"},{"name":"amountB","type":"uint256"}]},
    {"type":"function","name":"getReserves","stateMutability":"view",
     "inputs":[{"name":"tokenA","type":"address"},{"name":"tokenB","type":"address"}],
     "outputs":[{"name":"reserveA","type":"uint256"},{"name":"reserveB","type":"uint256"}]}
]"#;

const BARUK_FARM_ABI: &str = r#"[
    {"type":"function","name":"stake","stateMutability":"nonpayable",
     "inputs":[{"name":"poolId","type":"uint256"},{"name":"amount","type":"uint256"}],"outputs":[]},
    {"type":"function","name":"unstake","stateMutability":"nonpayable",
     "inputs":[{"name":"poolId","type":"uint256"},{"name":"amount","type":"uint256"}],"outputs":[]},
    {"type":"function","name":"claimRewards","stateMutability":"nonpayable",
     "inputs":[{"name":"poolId","type":"uint256"}],"outputs":[]}
]"#;

const BARUK_LENDING_ABI: &str = r#"[
    {"type":"function","name":"deposit","stateMutability":"nonpayable",
     "inputs":[{"name":"token","type":"address"},{"name":"amount","type":"uint256"}],"outputs":[]},
    {"type":"function","name":"withdraw","stateMutability":"nonpayable",
     "inputs":[{"name":"token","type":"address"},{"name":"amount","type":"uint256"}],"outputs":[]},
    {"type":"function","name":"borrow","stateMutability":"nonpayable",
     "inputs":[{"name":"token","type":"address"},{"name":"amount","type":"uint256"}],"outputs":[]},
    {"type":"function","name":"repay","stateMutability":"nonpayable",
     "inputs":[{"name":"token","type":"address"},{"name":"amount","type":"uint256"}],"outputs":[]}
]"#;

const BARUK_LIMIT_ORDER_ABI: &str = r#"[
    {"type":"function","name":"placeOrder","stateMutability":"nonpayable",
     "inputs":[{"name":"tokenIn","type":"address"},{"name":"tokenOut","type":"address"},
               {"name":"amountIn","type":"uint256"},{"name":"minAmountOut","type":"uint256"},
               {"name":"expiry","type":"uint256"}],
     "outputs":[{"name":"orderId","type":"uint256"}]},
    {"type":"function","name":"cancelOrder","stateMutability":"nonpayable",
     "inputs":[{"name":"orderId","type":"uint256"}],"outputs":[]}
]"#;

/// A write call, in one of the three forms the dispatcher accepts
#[derive(Debug, Clone)]
pub enum ContractCall {
    /// EVM method resolved by name against the contract's ABI; `args` is the
    /// ABI-encoded argument tail
    EvmMethod {
        method: String,
        args: Vec<u8>,
        value: U256,
    },
    /// Fully encoded EVM calldata from a typed builder
    EvmCalldata { calldata: Vec<u8>, value: U256 },
    /// CosmWasm execute message
    CosmosExecute {
        msg: Value,
        funds: Vec<cosmrs::Coin>,
    },
}

/// Routes writes to the right chain through the active signer
pub struct ContractDispatcher {
    contracts: NetworkContracts,
    abis: AbiRegistry,
}

impl ContractDispatcher {
    /// Build a dispatcher for a network's contract set, with the built-in
    /// Baruk interfaces registered
    pub fn new(contracts: NetworkContracts) -> Result<Self, Error> {
        let mut abis = AbiRegistry::new();
        abis.load_from_json(BARUK_ROUTER_ABI, abi_key(ProtocolId::Baruk, ContractRole::Router))?;
        abis.load_from_json(BARUK_AMM_ABI, abi_key(ProtocolId::Baruk, ContractRole::Amm))?;
        abis.load_from_json(BARUK_FARM_ABI, abi_key(ProtocolId::Baruk, ContractRole::YieldFarm))?;
        abis.load_from_json(
            BARUK_LENDING_ABI,
            abi_key(ProtocolId::Baruk, ContractRole::Lending),
        )?;
        abis.load_from_json(
            BARUK_LIMIT_ORDER_ABI,
            abi_key(ProtocolId::Baruk, ContractRole::LimitOrder),
        )?;
        Ok(Self { contracts, abis })
    }

    pub fn contracts(&self) -> &NetworkContracts {
        &self.contracts
    }

    pub fn abis(&self) -> &AbiRegistry {
        &self.abis
    }

    /// Resolve a contract for dispatch, failing descriptively for unknown
    /// protocol/role combinations
    pub fn resolve(&self, protocol: ProtocolId, role: ContractRole) -> Result<&ContractInfo, Error> {
        self.contracts.require_contract(protocol, role)
    }

    /// Issue a write call through the session's active signer.
    ///
    /// Returns the transaction hash. No retries and no idempotency: if the
    /// transaction is dropped downstream it is not resubmitted.
    pub async fn execute(
        &self,
        session: &mut WalletSession,
        protocol: ProtocolId,
        role: ContractRole,
        call: ContractCall,
    ) -> Result<String, Error> {
        let info = self.resolve(protocol, role)?.clone();

        let session_chain = session
            .chain()
            .ok_or_else(|| Error::Dispatch("No wallet connected".to_string()))?;
        if session_chain != info.chain {
            return Err(Error::Dispatch(format!(
                "Contract {}/{} lives on the {} chain but the connected wallet is on {}",
                protocol, role, info.chain, session_chain
            )));
        }

        debug!(%protocol, %role, address = %info.address, "Dispatching contract call");

        let payload = match call {
            ContractCall::EvmMethod { method, args, value } => {
                let calldata =
                    self.abis
                        .encode_call(&abi_key(protocol, role), &method, &args)?;
                TxPayload::Evm(self.evm_request(session, &info, calldata, value)?)
            }
            ContractCall::EvmCalldata { calldata, value } => {
                TxPayload::Evm(self.evm_request(session, &info, calldata, value)?)
            }
            ContractCall::CosmosExecute { msg, funds } => TxPayload::Cosmos(WasmExecute {
                contract: info.address.clone(),
                msg,
                funds,
            }),
        };

        session.sign_and_send(payload).await
    }

    fn evm_request(
        &self,
        session: &WalletSession,
        info: &ContractInfo,
        calldata: Vec<u8>,
        value: U256,
    ) -> Result<EvmTransactionRequest, Error> {
        let chain_id = session
            .chain_id()
            .and_then(|id| id.parse::<u64>().ok())
            .unwrap_or(session.network().evm_chain_id);
        let to = EthAddress::parse(&info.address)?;
        Ok(EvmTransactionRequest::new(chain_id)
            .to(to)
            .value(value)
            .data(calldata))
    }
}

fn abi_key(protocol: ProtocolId, role: ContractRole) -> String {
    format!("{}/{}", protocol, role)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContractRegistry;

    fn dispatcher() -> ContractDispatcher {
        let contracts = ContractRegistry::builtin()
            .get_network("sei-pacific")
            .unwrap()
            .clone();
        ContractDispatcher::new(contracts).unwrap()
    }

    #[test]
    fn resolves_known_contracts() {
        let dispatcher = dispatcher();
        let info = dispatcher
            .resolve(ProtocolId::Baruk, ContractRole::Router)
            .unwrap();
        assert_eq!(info.chain, ChainFamily::Evm);
        assert!(info.address.starts_with("0x"));
    }

    #[test]
    fn unknown_role_resolution_is_descriptive() {
        let dispatcher = dispatcher();
        let err = dispatcher
            .resolve(ProtocolId::Vortex, ContractRole::Router)
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("router"));
        assert!(msg.contains("vortex"));
    }

    #[test]
    fn builtin_abis_cover_baruk_roles() {
        let dispatcher = dispatcher();
        for (role, method) in [
            (ContractRole::Router, "swapExactTokensForTokens"),
            (ContractRole::Amm, "addLiquidity"),
            (ContractRole::YieldFarm, "stake"),
            (ContractRole::Lending, "borrow"),
            (ContractRole::LimitOrder, "placeOrder"),
        ] {
            assert!(dispatcher
                .abis()
                .get_function(&abi_key(ProtocolId::Baruk, role), method)
                .is_ok());
        }
    }

    #[test]
    fn unknown_method_is_rejected_before_dispatch() {
        let dispatcher = dispatcher();
        let err = dispatcher
            .abis()
            .encode_call(
                &abi_key(ProtocolId::Baruk, ContractRole::Router),
                "sweepTreasury",
                &[],
            )
            .unwrap_err();
        assert!(err.to_string().contains("sweepTreasury"));
    }
}

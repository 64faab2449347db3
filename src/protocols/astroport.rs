/// Astroport-style CosmWasm message types.
///
/// The Astroport and Vortex deployments on Sei's native layer share the same
/// pair/router msg shapes, so both protocols dispatch through these builders.
use cosmwasm_std::{Decimal, Uint128};
use serde::{Deserialize, Serialize};

use crate::config::{ContractRole, ProtocolId, SeiNetworkConfig};
use crate::error::Error;
use crate::protocols::cosmwasm::WasmClient;

/// Asset identification: CW20 token or native coin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetInfo {
    Token { contract_addr: String },
    NativeToken { denom: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub info: AssetInfo,
    pub amount: Uint128,
}

/// Execute messages accepted by pair contracts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairExecuteMsg {
    Swap {
        offer_asset: Asset,
        #[serde(skip_serializing_if = "Option::is_none")]
        belief_price: Option<Decimal>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max_spread: Option<Decimal>,
        #[serde(skip_serializing_if = "Option::is_none")]
        to: Option<String>,
    },
    ProvideLiquidity {
        assets: Vec<Asset>,
        #[serde(skip_serializing_if = "Option::is_none")]
        slippage_tolerance: Option<Decimal>,
        #[serde(skip_serializing_if = "Option::is_none")]
        receiver: Option<String>,
    },
}

/// Query messages understood by pair contracts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairQueryMsg {
    Pool {},
    Simulation { offer_asset: Asset },
}

/// Pool state response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolResponse {
    pub assets: Vec<Asset>,
    pub total_share: Uint128,
}

/// Swap simulation response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResponse {
    pub return_amount: Uint128,
    pub spread_amount: Uint128,
    pub commission_amount: Uint128,
}

/// Read-side client for a CosmWasm pair protocol (Astroport or Vortex)
#[derive(Clone)]
pub struct PairClient {
    wasm: WasmClient,
    protocol: ProtocolId,
    pair_address: String,
}

impl PairClient {
    /// Resolve the pair contract for the protocol from the network config
    pub fn from_network(
        wasm: WasmClient,
        protocol: ProtocolId,
        config: &SeiNetworkConfig,
    ) -> Result<Self, Error> {
        let info = config.contracts.require_contract(protocol, ContractRole::Pair)?;
        Ok(Self {
            wasm,
            protocol,
            pair_address: info.address.clone(),
        })
    }

    pub fn pair_address(&self) -> &str {
        &self.pair_address
    }

    pub fn protocol(&self) -> ProtocolId {
        self.protocol
    }

    /// Current pool reserves
    pub async fn pool(&self) -> Result<PoolResponse, Error> {
        self.wasm
            .smart_query(&self.pair_address, &PairQueryMsg::Pool {})
            .await
    }

    /// Simulate a swap against current reserves
    pub async fn simulate_swap(&self, offer_asset: Asset) -> Result<SimulationResponse, Error> {
        self.wasm
            .smart_query(&self.pair_address, &PairQueryMsg::Simulation { offer_asset })
            .await
    }
}

/// Build a swap execute msg
pub fn swap_msg(
    offer_asset: Asset,
    max_spread: Option<Decimal>,
    to: Option<String>,
) -> PairExecuteMsg {
    PairExecuteMsg::Swap {
        offer_asset,
        belief_price: None,
        max_spread,
        to,
    }
}

/// Build a provide-liquidity execute msg
pub fn provide_liquidity_msg(
    assets: Vec<Asset>,
    slippage_tolerance: Option<Decimal>,
) -> PairExecuteMsg {
    PairExecuteMsg::ProvideLiquidity {
        assets,
        slippage_tolerance,
        receiver: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_msg_serializes_to_wasm_shape() {
        let msg = swap_msg(
            Asset {
                info: AssetInfo::NativeToken {
                    denom: "usei".to_string(),
                },
                amount: Uint128::new(1_000_000),
            },
            None,
            None,
        );

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["swap"]["offer_asset"]["amount"], "1000000");
        assert_eq!(
            json["swap"]["offer_asset"]["info"]["native_token"]["denom"],
            "usei"
        );
        // Unset options are omitted entirely, not serialized as null
        assert!(json["swap"].get("max_spread").is_none());
    }

    #[test]
    fn provide_liquidity_msg_shape() {
        let msg = provide_liquidity_msg(
            vec![
                Asset {
                    info: AssetInfo::NativeToken {
                        denom: "usei".to_string(),
                    },
                    amount: Uint128::new(500),
                },
                Asset {
                    info: AssetInfo::Token {
                        contract_addr: "sei1pqcgdn5vmf3g9ncs98vtxkydc6su0f9rk3uk73s5ku2xhthr6avswrwnrx"
                            .to_string(),
                    },
                    amount: Uint128::new(400),
                },
            ],
            Some(Decimal::percent(1)),
        );

        let json = serde_json::to_value(&msg).unwrap();
        let assets = json["provide_liquidity"]["assets"].as_array().unwrap();
        assert_eq!(assets.len(), 2);
        assert_eq!(json["provide_liquidity"]["slippage_tolerance"], "0.01");
    }

    #[test]
    fn pool_response_deserializes() {
        let raw = r#"{
            "assets": [
                {"info": {"native_token": {"denom": "usei"}}, "amount": "123"},
                {"info": {"token": {"contract_addr": "sei1abc"}}, "amount": "456"}
            ],
            "total_share": "579"
        }"#;
        let pool: PoolResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(pool.assets.len(), 2);
        assert_eq!(pool.total_share, Uint128::new(579));
    }
}

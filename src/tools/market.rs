//! Market read tools

use super::*;
use serde_json::json;

use crate::config::ProtocolId;
use crate::protocols::astroport::PairClient;

impl ToolAdapter {
    /// Pool reserves for a pair, on whichever protocol is requested
    pub(super) async fn get_pool_reserves(
        &self,
        _session: &UserSession,
        params: Value,
    ) -> Result<Value, Error> {
        let protocol: ProtocolId = opt_str(&params, "protocol")
            .unwrap_or("baruk")
            .parse()?;

        match protocol {
            ProtocolId::Baruk => {
                let token_a = parse_evm_address(require_str(&params, "token_a")?, "token_a")?;
                let token_b = parse_evm_address(require_str(&params, "token_b")?, "token_b")?;
                let reserves = self.baruk().pool_reserves(token_a, token_b).await?;
                Ok(json!({
                    "protocol": protocol,
                    "reserves": reserves,
                    "timestamp": chrono::Utc::now().to_rfc3339(),
                }))
            }
            ProtocolId::Astroport | ProtocolId::Vortex => {
                let pair = PairClient::from_network(self.wasm().clone(), protocol, self.network())?;
                let pool = pair.pool().await?;
                Ok(json!({
                    "protocol": protocol,
                    "pair": pair.pair_address(),
                    "pool": pool,
                    "timestamp": chrono::Utc::now().to_rfc3339(),
                }))
            }
        }
    }

    /// Farm position for a pool, defaulting to the session's address
    pub(super) async fn get_farm_info(
        &self,
        session: &UserSession,
        params: Value,
    ) -> Result<Value, Error> {
        let pool_id = require_u64(&params, "pool_id")?;
        let address = self.evm_account(session, &params)?;

        let position = self.baruk().farm_position(pool_id, address).await?;
        Ok(json!({
            "protocol": ProtocolId::Baruk,
            "address": format!("{:?}", address),
            "position": position,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }))
    }

    /// Lending snapshot for one token market
    pub(super) async fn get_lending_position(
        &self,
        session: &UserSession,
        params: Value,
    ) -> Result<Value, Error> {
        let token = parse_evm_address(require_str(&params, "token")?, "token")?;
        let address = self.evm_account(session, &params)?;

        let position = self.baruk().lending_position(address, token).await?;
        Ok(json!({
            "protocol": ProtocolId::Baruk,
            "address": format!("{:?}", address),
            "position": position,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }))
    }

    /// USD prices for a list of token addresses
    pub(super) async fn get_token_prices(&self, params: Value) -> Result<Value, Error> {
        let addresses: Vec<String> = params
            .get("addresses")
            .and_then(Value::as_array)
            .ok_or_else(|| Error::Session("Missing required array parameter 'addresses'".to_string()))?
            .iter()
            .filter_map(Value::as_str)
            .map(|s| s.to_string())
            .collect();

        let prices = self.oracle.get_prices(&addresses).await;
        Ok(json!({
            "prices": prices,
            "requested": addresses.len(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }))
    }

    /// Resolve the EVM account for a read: explicit param, else session address
    fn evm_account(
        &self,
        session: &UserSession,
        params: &Value,
    ) -> Result<alloy_primitives::Address, Error> {
        match opt_str(params, "address") {
            Some(explicit) => parse_evm_address(explicit, "address"),
            None => {
                let address = session
                    .wallet
                    .address()
                    .ok_or_else(|| Error::Session("No wallet connected".to_string()))?;
                parse_evm_address(address, "address")
            }
        }
    }
}

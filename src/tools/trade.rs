//! Trade and position tools (write path).
//!
//! Every tool here builds a real contract call and routes it through the
//! dispatcher; the returned hash is the chain's, and failures are the
//! caller's to see.

use super::*;
use cosmwasm_std::Uint128;
use serde_json::json;
use std::str::FromStr;

use crate::config::{ContractRole, ProtocolId};
use crate::dispatch::ContractCall;
use crate::protocols::astroport::{self, Asset, AssetInfo};
use crate::protocols::baruk::contracts as baruk_contracts;
use crate::protocols::baruk::{
    LendingAction, LimitOrderParams, LiquidityParams, OperationResult, SwapParams,
};

/// Default swap deadline window in seconds
const SWAP_DEADLINE_SECS: i64 = 600;

impl ToolAdapter {
    pub(super) async fn swap(
        &self,
        session: &mut UserSession,
        params: Value,
    ) -> Result<Value, Error> {
        let protocol: ProtocolId = opt_str(&params, "protocol").unwrap_or("baruk").parse()?;

        let tx_hash = match protocol {
            ProtocolId::Baruk => {
                let recipient = self.session_evm_address(session)?;
                let swap = SwapParams {
                    token_in: parse_evm_address(require_str(&params, "token_in")?, "token_in")?,
                    token_out: parse_evm_address(require_str(&params, "token_out")?, "token_out")?,
                    amount_in: parse_amount(&params, "amount_in")?,
                    min_amount_out: parse_amount(&params, "min_amount_out")?,
                    recipient,
                    deadline: opt_u64(&params, "deadline").unwrap_or_else(default_deadline),
                };
                let call = ContractCall::EvmCalldata {
                    calldata: baruk_contracts::swap_calldata(&swap),
                    value: alloy_primitives::U256::ZERO,
                };
                self.dispatcher()
                    .execute(&mut session.wallet, protocol, ContractRole::Router, call)
                    .await?
            }
            ProtocolId::Astroport | ProtocolId::Vortex => {
                let (offer_asset, funds) = parse_cosmos_offer(&params)?;
                let msg = astroport::swap_msg(offer_asset, None, None);
                let call = ContractCall::CosmosExecute {
                    msg: serde_json::to_value(&msg)?,
                    funds,
                };
                self.dispatcher()
                    .execute(&mut session.wallet, protocol, ContractRole::Pair, call)
                    .await?
            }
        };

        Ok(json!(OperationResult::confirmed(
            tx_hash,
            format!("Swap submitted on {}", protocol)
        )))
    }

    pub(super) async fn add_liquidity(
        &self,
        session: &mut UserSession,
        params: Value,
    ) -> Result<Value, Error> {
        let protocol: ProtocolId = opt_str(&params, "protocol").unwrap_or("baruk").parse()?;

        let tx_hash = match protocol {
            ProtocolId::Baruk => {
                let liquidity = self.parse_liquidity_params(session, &params)?;
                let call = ContractCall::EvmCalldata {
                    calldata: baruk_contracts::add_liquidity_calldata(&liquidity),
                    value: alloy_primitives::U256::ZERO,
                };
                self.dispatcher()
                    .execute(&mut session.wallet, protocol, ContractRole::Amm, call)
                    .await?
            }
            ProtocolId::Astroport | ProtocolId::Vortex => {
                let assets = parse_cosmos_assets(&params)?;
                let funds = native_funds(&assets)?;
                let msg = astroport::provide_liquidity_msg(assets, None);
                let call = ContractCall::CosmosExecute {
                    msg: serde_json::to_value(&msg)?,
                    funds,
                };
                self.dispatcher()
                    .execute(&mut session.wallet, protocol, ContractRole::Pair, call)
                    .await?
            }
        };

        Ok(json!(OperationResult::confirmed(
            tx_hash,
            format!("Liquidity added on {}", protocol)
        )))
    }

    pub(super) async fn remove_liquidity(
        &self,
        session: &mut UserSession,
        params: Value,
    ) -> Result<Value, Error> {
        // Removal is Baruk-only: the CosmWasm pairs burn LP via CW20 send,
        // which goes through the token contract, not the pair
        let liquidity = self.parse_liquidity_params(session, &params)?;
        let lp_amount = parse_amount(&params, "lp_amount")?;
        let call = ContractCall::EvmCalldata {
            calldata: baruk_contracts::remove_liquidity_calldata(&liquidity, lp_amount),
            value: alloy_primitives::U256::ZERO,
        };
        let tx_hash = self
            .dispatcher()
            .execute(
                &mut session.wallet,
                ProtocolId::Baruk,
                ContractRole::Amm,
                call,
            )
            .await?;

        Ok(json!(OperationResult::confirmed(
            tx_hash,
            "Liquidity removed"
        )))
    }

    pub(super) async fn lend(
        &self,
        session: &mut UserSession,
        params: Value,
    ) -> Result<Value, Error> {
        let action: LendingAction = serde_json::from_value(json!(require_str(&params, "action")?))
            .map_err(|_| {
                Error::Session(
                    "Invalid 'action'. Known actions: [deposit, withdraw, borrow, repay]"
                        .to_string(),
                )
            })?;
        let token = parse_evm_address(require_str(&params, "token")?, "token")?;
        let amount = parse_amount(&params, "amount")?;

        let call = ContractCall::EvmCalldata {
            calldata: baruk_contracts::lending_calldata(action, token, amount),
            value: alloy_primitives::U256::ZERO,
        };
        let tx_hash = self
            .dispatcher()
            .execute(
                &mut session.wallet,
                ProtocolId::Baruk,
                ContractRole::Lending,
                call,
            )
            .await?;

        Ok(json!(OperationResult::confirmed(
            tx_hash,
            format!("Lending action '{:?}' submitted", action).to_lowercase()
        )))
    }

    pub(super) async fn farm(
        &self,
        session: &mut UserSession,
        params: Value,
    ) -> Result<Value, Error> {
        let pool_id = require_u64(&params, "pool_id")?;
        let action = require_str(&params, "action")?;

        let calldata = match action {
            "stake" => baruk_contracts::stake_calldata(pool_id, parse_amount(&params, "amount")?),
            "unstake" => {
                baruk_contracts::unstake_calldata(pool_id, parse_amount(&params, "amount")?)
            }
            "claim" => baruk_contracts::claim_rewards_calldata(pool_id),
            other => {
                return Err(Error::Session(format!(
                    "Unknown farm action '{}'. Known actions: [stake, unstake, claim]",
                    other
                )))
            }
        };

        let call = ContractCall::EvmCalldata {
            calldata,
            value: alloy_primitives::U256::ZERO,
        };
        let tx_hash = self
            .dispatcher()
            .execute(
                &mut session.wallet,
                ProtocolId::Baruk,
                ContractRole::YieldFarm,
                call,
            )
            .await?;

        Ok(json!(OperationResult::confirmed(
            tx_hash,
            format!("Farm action '{}' submitted for pool {}", action, pool_id)
        )))
    }

    pub(super) async fn place_limit_order(
        &self,
        session: &mut UserSession,
        params: Value,
    ) -> Result<Value, Error> {
        let order = LimitOrderParams {
            token_in: parse_evm_address(require_str(&params, "token_in")?, "token_in")?,
            token_out: parse_evm_address(require_str(&params, "token_out")?, "token_out")?,
            amount_in: parse_amount(&params, "amount_in")?,
            min_amount_out: parse_amount(&params, "min_amount_out")?,
            expiry: opt_u64(&params, "expiry").unwrap_or_else(|| default_deadline() + 86_400),
        };

        let call = ContractCall::EvmCalldata {
            calldata: baruk_contracts::place_order_calldata(&order),
            value: alloy_primitives::U256::ZERO,
        };
        let tx_hash = self
            .dispatcher()
            .execute(
                &mut session.wallet,
                ProtocolId::Baruk,
                ContractRole::LimitOrder,
                call,
            )
            .await?;

        Ok(json!(OperationResult::confirmed(
            tx_hash,
            "Limit order placed"
        )))
    }

    pub(super) async fn cancel_limit_order(
        &self,
        session: &mut UserSession,
        params: Value,
    ) -> Result<Value, Error> {
        let order_id = require_u64(&params, "order_id")?;

        let call = ContractCall::EvmCalldata {
            calldata: baruk_contracts::cancel_order_calldata(order_id),
            value: alloy_primitives::U256::ZERO,
        };
        let tx_hash = self
            .dispatcher()
            .execute(
                &mut session.wallet,
                ProtocolId::Baruk,
                ContractRole::LimitOrder,
                call,
            )
            .await?;

        Ok(json!(OperationResult::confirmed(
            tx_hash,
            format!("Limit order {} cancelled", order_id)
        )))
    }

    fn parse_liquidity_params(
        &self,
        session: &UserSession,
        params: &Value,
    ) -> Result<LiquidityParams, Error> {
        Ok(LiquidityParams {
            token_a: parse_evm_address(require_str(params, "token_a")?, "token_a")?,
            token_b: parse_evm_address(require_str(params, "token_b")?, "token_b")?,
            amount_a: parse_amount(params, "amount_a").unwrap_or(alloy_primitives::U256::ZERO),
            amount_b: parse_amount(params, "amount_b").unwrap_or(alloy_primitives::U256::ZERO),
            min_amount_a: parse_amount(params, "min_amount_a")
                .unwrap_or(alloy_primitives::U256::ZERO),
            min_amount_b: parse_amount(params, "min_amount_b")
                .unwrap_or(alloy_primitives::U256::ZERO),
            recipient: self.session_evm_address(session)?,
        })
    }

    fn session_evm_address(&self, session: &UserSession) -> Result<alloy_primitives::Address, Error> {
        let address = session
            .wallet
            .address()
            .ok_or_else(|| Error::Session("No wallet connected".to_string()))?;
        parse_evm_address(address, "session address")
    }
}

fn default_deadline() -> u64 {
    (chrono::Utc::now().timestamp() + SWAP_DEADLINE_SECS) as u64
}

/// Offer asset plus attached native funds for a CosmWasm swap
fn parse_cosmos_offer(params: &Value) -> Result<(Asset, Vec<cosmrs::Coin>), Error> {
    let amount_str = require_str(params, "amount_in")?;
    let amount = Uint128::from_str(amount_str)
        .map_err(|e| Error::Session(format!("Invalid amount_in: {}", e)))?;

    if let Some(denom) = opt_str(params, "offer_denom") {
        let asset = Asset {
            info: AssetInfo::NativeToken {
                denom: denom.to_string(),
            },
            amount,
        };
        let funds = vec![cosmos_coin(denom, amount_str)?];
        Ok((asset, funds))
    } else if let Some(contract) = opt_str(params, "offer_contract") {
        let asset = Asset {
            info: AssetInfo::Token {
                contract_addr: contract.to_string(),
            },
            amount,
        };
        // CW20 offers are moved by the pair via allowance, not attached funds
        Ok((asset, Vec::new()))
    } else {
        Err(Error::Session(
            "Provide 'offer_denom' (native) or 'offer_contract' (CW20) for a CosmWasm swap"
                .to_string(),
        ))
    }
}

/// Asset pair for CosmWasm liquidity provision
fn parse_cosmos_assets(params: &Value) -> Result<Vec<Asset>, Error> {
    let entries = params
        .get("assets")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::Session("Missing required array parameter 'assets'".to_string()))?;

    let mut assets = Vec::with_capacity(entries.len());
    for entry in entries {
        let amount_str = require_str(entry, "amount")?;
        let amount = Uint128::from_str(amount_str)
            .map_err(|e| Error::Session(format!("Invalid asset amount: {}", e)))?;
        let info = if let Some(denom) = opt_str(entry, "denom") {
            AssetInfo::NativeToken {
                denom: denom.to_string(),
            }
        } else if let Some(contract) = opt_str(entry, "contract") {
            AssetInfo::Token {
                contract_addr: contract.to_string(),
            }
        } else {
            return Err(Error::Session(
                "Each asset needs a 'denom' or 'contract'".to_string(),
            ));
        };
        assets.push(Asset { info, amount });
    }
    Ok(assets)
}

/// Attached funds for the native legs of a liquidity provision
fn native_funds(assets: &[Asset]) -> Result<Vec<cosmrs::Coin>, Error> {
    let mut funds = Vec::new();
    for asset in assets {
        if let AssetInfo::NativeToken { denom } = &asset.info {
            funds.push(cosmos_coin(denom, &asset.amount.to_string())?);
        }
    }
    Ok(funds)
}

fn cosmos_coin(denom: &str, amount: &str) -> Result<cosmrs::Coin, Error> {
    let denom = cosmrs::Denom::from_str(denom)
        .map_err(|e| Error::Session(format!("Invalid denom '{}': {}", denom, e)))?;
    let amount: u128 = amount
        .parse()
        .map_err(|e| Error::Session(format!("Invalid coin amount: {}", e)))?;
    Ok(cosmrs::Coin { denom, amount })
}

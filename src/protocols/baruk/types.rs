/// Baruk-specific parameter and result types.
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Swap parameters for the router
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapParams {
    pub token_in: Address,
    pub token_out: Address,
    pub amount_in: U256,
    pub min_amount_out: U256,
    pub recipient: Address,
    /// Unix timestamp after which the router rejects the swap
    pub deadline: u64,
}

/// Liquidity provision / removal parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidityParams {
    pub token_a: Address,
    pub token_b: Address,
    pub amount_a: U256,
    pub amount_b: U256,
    pub min_amount_a: U256,
    pub min_amount_b: U256,
    pub recipient: Address,
}

/// Lending market actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LendingAction {
    Deposit,
    Withdraw,
    Borrow,
    Repay,
}

/// Limit order placement parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitOrderParams {
    pub token_in: Address,
    pub token_out: Address,
    pub amount_in: U256,
    pub min_amount_out: U256,
    /// Unix timestamp when the order expires
    pub expiry: u64,
}

/// AMM pool reserves snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolReserves {
    pub token_a: Address,
    pub token_b: Address,
    pub reserve_a: U256,
    pub reserve_b: U256,
}

/// Yield farm position for one pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FarmPosition {
    pub pool_id: u64,
    pub staked: U256,
    pub pending_rewards: U256,
}

/// Lending account snapshot for one token market
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LendingPosition {
    pub token: Address,
    pub collateral: U256,
    pub debt: U256,
}

/// Result envelope for write operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult {
    pub success: bool,
    pub tx_hash: Option<String>,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

impl OperationResult {
    pub fn confirmed(tx_hash: String, message: impl Into<String>) -> Self {
        Self {
            success: true,
            tx_hash: Some(tx_hash),
            message: message.into(),
            data: None,
        }
    }
}

/// Baruk contract interfaces and operation encoders.
///
/// The on-chain contracts (Router, AMM, YieldFarm, Lending, LimitOrder) are
/// external to this SDK; their interfaces are declared here with `sol!` and
/// every write is produced as calldata for the dispatcher to sign and send.
use alloy_primitives::{Address, U256};
use alloy_sol_types::{sol, SolCall};

use crate::config::{ContractRole, ProtocolId, SeiNetworkConfig};
use crate::error::Error;
use crate::protocols::baruk::types::{
    FarmPosition, LendingAction, LendingPosition, LimitOrderParams, LiquidityParams, PoolReserves,
    SwapParams,
};
use crate::protocols::evm::EvmClient;

sol! {
    // Router
    function swapExactTokensForTokens(
        uint256 amountIn,
        uint256 amountOutMin,
        address[] path,
        address to,
        uint256 deadline
    ) returns (uint256[] amounts);

    // AMM
    function addLiquidity(
        address tokenA,
        address tokenB,
        uint256 amountADesired,
        uint256 amountBDesired,
        uint256 amountAMin,
        uint256 amountBMin,
        address to
    ) returns (uint256 amountA, uint256 amountB, uint256 liquidity);
    function removeLiquidity(
        address tokenA,
        address tokenB,
        uint256 liquidity,
        uint256 amountAMin,
        uint256 amountBMin,
        address to
    ) returns (uint256 amountA, uint256 amountB);
    function getReserves(address tokenA, address tokenB)
        returns (uint256 reserveA, uint256 reserveB);

    // YieldFarm
    function stake(uint256 poolId, uint256 amount);
    function unstake(uint256 poolId, uint256 amount);
    function claimRewards(uint256 poolId);
    function stakedBalance(uint256 poolId, address account) returns (uint256 amount);
    function pendingRewards(uint256 poolId, address account) returns (uint256 amount);

    // Lending
    function deposit(address token, uint256 amount);
    function withdraw(address token, uint256 amount);
    function borrow(address token, uint256 amount);
    function repay(address token, uint256 amount);
    function collateralOf(address account, address token) returns (uint256 amount);
    function debtOf(address account, address token) returns (uint256 amount);

    // LimitOrder
    function placeOrder(
        address tokenIn,
        address tokenOut,
        uint256 amountIn,
        uint256 minAmountOut,
        uint256 expiry
    ) returns (uint256 orderId);
    function cancelOrder(uint256 orderId);
}

/// Resolved Baruk contract set plus the EVM client for reads
#[derive(Clone)]
pub struct BarukContracts {
    evm: EvmClient,
    amm: Address,
    yield_farm: Address,
    lending: Address,
}

impl BarukContracts {
    /// Resolve the contract set from the network config
    pub fn from_network(evm: EvmClient, config: &SeiNetworkConfig) -> Result<Self, Error> {
        Ok(Self {
            evm,
            amm: resolve_evm_address(config, ContractRole::Amm)?,
            yield_farm: resolve_evm_address(config, ContractRole::YieldFarm)?,
            lending: resolve_evm_address(config, ContractRole::Lending)?,
        })
    }

    // ============ Reads ============

    /// Current reserves for a token pair
    pub async fn pool_reserves(
        &self,
        token_a: Address,
        token_b: Address,
    ) -> Result<PoolReserves, Error> {
        let result = self
            .evm
            .call_contract(self.amm, getReservesCall { tokenA: token_a, tokenB: token_b })
            .await?;
        Ok(PoolReserves {
            token_a,
            token_b,
            reserve_a: result.reserveA,
            reserve_b: result.reserveB,
        })
    }

    /// Farm position for an account in one pool
    pub async fn farm_position(&self, pool_id: u64, account: Address) -> Result<FarmPosition, Error> {
        let staked = self
            .evm
            .call_contract(
                self.yield_farm,
                stakedBalanceCall {
                    poolId: U256::from(pool_id),
                    account,
                },
            )
            .await?;
        let pending = self
            .evm
            .call_contract(
                self.yield_farm,
                pendingRewardsCall {
                    poolId: U256::from(pool_id),
                    account,
                },
            )
            .await?;
        Ok(FarmPosition {
            pool_id,
            staked: staked.amount,
            pending_rewards: pending.amount,
        })
    }

    /// Lending account snapshot for one token market
    pub async fn lending_position(
        &self,
        account: Address,
        token: Address,
    ) -> Result<LendingPosition, Error> {
        let collateral = self
            .evm
            .call_contract(self.lending, collateralOfCall { account, token })
            .await?;
        let debt = self
            .evm
            .call_contract(self.lending, debtOfCall { account, token })
            .await?;
        Ok(LendingPosition {
            token,
            collateral: collateral.amount,
            debt: debt.amount,
        })
    }
}

fn resolve_evm_address(config: &SeiNetworkConfig, role: ContractRole) -> Result<Address, Error> {
    let info = config.contracts.require_contract(ProtocolId::Baruk, role)?;
    info.address
        .parse()
        .map_err(|e| Error::Config(format!("Invalid EVM address for baruk {}: {}", role, e)))
}

// ============ Calldata builders ============

/// Router swap calldata
pub fn swap_calldata(params: &SwapParams) -> Vec<u8> {
    swapExactTokensForTokensCall {
        amountIn: params.amount_in,
        amountOutMin: params.min_amount_out,
        path: vec![params.token_in, params.token_out],
        to: params.recipient,
        deadline: U256::from(params.deadline),
    }
    .abi_encode()
}

/// AMM add-liquidity calldata
pub fn add_liquidity_calldata(params: &LiquidityParams) -> Vec<u8> {
    addLiquidityCall {
        tokenA: params.token_a,
        tokenB: params.token_b,
        amountADesired: params.amount_a,
        amountBDesired: params.amount_b,
        amountAMin: params.min_amount_a,
        amountBMin: params.min_amount_b,
        to: params.recipient,
    }
    .abi_encode()
}

/// AMM remove-liquidity calldata; `liquidity` is the LP amount to burn
pub fn remove_liquidity_calldata(params: &LiquidityParams, liquidity: U256) -> Vec<u8> {
    removeLiquidityCall {
        tokenA: params.token_a,
        tokenB: params.token_b,
        liquidity,
        amountAMin: params.min_amount_a,
        amountBMin: params.min_amount_b,
        to: params.recipient,
    }
    .abi_encode()
}

/// Lending market calldata for the given action
pub fn lending_calldata(action: LendingAction, token: Address, amount: U256) -> Vec<u8> {
    match action {
        LendingAction::Deposit => depositCall { token, amount }.abi_encode(),
        LendingAction::Withdraw => withdrawCall { token, amount }.abi_encode(),
        LendingAction::Borrow => borrowCall { token, amount }.abi_encode(),
        LendingAction::Repay => repayCall { token, amount }.abi_encode(),
    }
}

/// YieldFarm stake calldata
pub fn stake_calldata(pool_id: u64, amount: U256) -> Vec<u8> {
    stakeCall {
        poolId: U256::from(pool_id),
        amount,
    }
    .abi_encode()
}

/// YieldFarm unstake calldata
pub fn unstake_calldata(pool_id: u64, amount: U256) -> Vec<u8> {
    unstakeCall {
        poolId: U256::from(pool_id),
        amount,
    }
    .abi_encode()
}

/// YieldFarm claim calldata
pub fn claim_rewards_calldata(pool_id: u64) -> Vec<u8> {
    claimRewardsCall {
        poolId: U256::from(pool_id),
    }
    .abi_encode()
}

/// LimitOrder placement calldata
pub fn place_order_calldata(params: &LimitOrderParams) -> Vec<u8> {
    placeOrderCall {
        tokenIn: params.token_in,
        tokenOut: params.token_out,
        amountIn: params.amount_in,
        minAmountOut: params.min_amount_out,
        expiry: U256::from(params.expiry),
    }
    .abi_encode()
}

/// LimitOrder cancellation calldata
pub fn cancel_order_calldata(order_id: u64) -> Vec<u8> {
    cancelOrderCall {
        orderId: U256::from(order_id),
    }
    .abi_encode()
}

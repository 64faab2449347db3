pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod prices;
pub mod protocols;
pub mod tools;
pub mod wallet;

// HTTP service - optional via "server" feature
#[cfg(feature = "server")]
pub mod server;

// Main client exports
pub use client::{BarukClient, BarukClientBuilder};
pub use config::{ChainFamily, ContractRole, ProtocolId, SeiNetworkConfig};
pub use error::Error;

// Wallet exports
pub use wallet::{
    BarukWallet, ConnectRequest, ExternalCosmosSigner, ExternalEvmProvider, SessionStatus,
    TxPayload, WalletInfo, WalletKind, WalletSession, WalletStore,
};

// Dispatch exports
pub use dispatch::{ContractCall, ContractDispatcher};

// Protocol exports
pub use protocols::baruk::{
    BarukContracts, FarmPosition, LendingAction, LendingPosition, LimitOrderParams,
    LiquidityParams, OperationResult, PoolReserves, SwapParams,
};
pub use protocols::evm::{EthAddress, EvmClient, EvmTransactionRequest};
pub use protocols::{Protocol, ProtocolRegistry};

// Price oracle exports
pub use prices::{PriceOracle, PriceSource};

// Tool adapter exports
pub use tools::{RiskTolerance, ToolAdapter};

// Re-export the cosmwasm math types used in public signatures
pub use cosmwasm_std::{Decimal, Uint128};

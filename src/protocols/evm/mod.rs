/// EVM protocol support for the Sei EVM layer.
///
/// Read-only calls via `eth_call`, EIP-1559 transaction signing and
/// submission, ERC-20 helpers, and ABI-based method resolution for the
/// dispatcher. The Baruk contracts live on this layer.
pub mod abi;
pub mod client;
pub mod erc20;
pub mod tx;
pub mod types;

pub use client::{EvmClient, FeeEstimate, GAS_BUFFER_PERCENT};
pub use erc20::Erc20;
pub use types::{EthAddress, EvmCallRequest, EvmError, EvmTransactionRequest};

/// Baruk protocol module.
///
/// Typed reads against the Baruk EVM contracts and calldata builders for
/// every write the dispatcher can route.
pub mod contracts;
pub mod types;

pub use contracts::BarukContracts;
pub use types::{
    FarmPosition, LendingAction, LendingPosition, LimitOrderParams, LiquidityParams,
    OperationResult, PoolReserves, SwapParams,
};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::config::{ChainFamily, ProtocolId, SeiNetworkConfig};
use crate::error::Error;
use crate::protocols::Protocol;

/// Baruk protocol metadata
#[derive(Clone, Default)]
pub struct BarukProtocol;

#[async_trait]
impl Protocol for BarukProtocol {
    fn name(&self) -> &'static str {
        "baruk"
    }

    fn version(&self) -> &'static str {
        "1.0.0"
    }

    fn chain(&self) -> ChainFamily {
        ChainFamily::Evm
    }

    async fn is_available(&self, network: &SeiNetworkConfig) -> Result<bool, Error> {
        Ok(network.contracts.has_protocol(ProtocolId::Baruk))
    }

    fn get_config(&self) -> Result<Value, Error> {
        Ok(json!({
            "name": self.name(),
            "version": self.version(),
            "chain": self.chain(),
        }))
    }
}

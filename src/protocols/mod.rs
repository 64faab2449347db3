/// Protocol modules for the Baruk SDK.
///
/// Each protocol represents a contract family the SDK can talk to, on either
/// of Sei's chain layers.
pub mod astroport;
pub mod baruk;
pub mod cosmwasm;
pub mod evm;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::{ChainFamily, ProtocolId, SeiNetworkConfig};
use crate::error::Error;
use std::sync::Arc;

/// Common trait for all protocol implementations
#[async_trait]
pub trait Protocol: Send + Sync {
    /// Protocol name
    fn name(&self) -> &'static str;

    /// Protocol version
    fn version(&self) -> &'static str;

    /// Chain family the protocol's contracts live on
    fn chain(&self) -> ChainFamily;

    /// Whether the protocol is usable on the given network
    async fn is_available(&self, network: &SeiNetworkConfig) -> Result<bool, Error>;

    /// Protocol-specific configuration snapshot
    fn get_config(&self) -> Result<Value, Error>;
}

/// Registry of available protocols
#[derive(Default)]
pub struct ProtocolRegistry {
    protocols: Vec<Arc<dyn Protocol>>,
}

impl ProtocolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, protocol: Arc<dyn Protocol>) {
        self.protocols.push(protocol);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Protocol> {
        self.protocols
            .iter()
            .find(|p| p.name() == name)
            .map(|p| p.as_ref())
    }

    /// Get a protocol by name, failing with the available set listed
    pub fn get_protocol(&self, name: &str) -> Result<&dyn Protocol, Error> {
        self.get(name).ok_or_else(|| {
            Error::Config(format!(
                "Protocol '{}' not found. Available protocols: [{}]",
                name,
                self.list().join(", ")
            ))
        })
    }

    pub fn list(&self) -> Vec<&str> {
        self.protocols.iter().map(|p| p.name()).collect()
    }
}

/// Astroport protocol metadata (CosmWasm layer)
#[derive(Clone, Default)]
pub struct AstroportProtocol;

#[async_trait]
impl Protocol for AstroportProtocol {
    fn name(&self) -> &'static str {
        "astroport"
    }

    fn version(&self) -> &'static str {
        "1.0.0"
    }

    fn chain(&self) -> ChainFamily {
        ChainFamily::Cosmos
    }

    async fn is_available(&self, network: &SeiNetworkConfig) -> Result<bool, Error> {
        Ok(network.contracts.has_protocol(ProtocolId::Astroport))
    }

    fn get_config(&self) -> Result<Value, Error> {
        Ok(serde_json::json!({
            "name": self.name(),
            "version": self.version(),
            "chain": self.chain(),
        }))
    }
}

/// Vortex protocol metadata (CosmWasm layer)
#[derive(Clone, Default)]
pub struct VortexProtocol;

#[async_trait]
impl Protocol for VortexProtocol {
    fn name(&self) -> &'static str {
        "vortex"
    }

    fn version(&self) -> &'static str {
        "1.0.0"
    }

    fn chain(&self) -> ChainFamily {
        ChainFamily::Cosmos
    }

    async fn is_available(&self, network: &SeiNetworkConfig) -> Result<bool, Error> {
        Ok(network.contracts.has_protocol(ProtocolId::Vortex))
    }

    fn get_config(&self) -> Result<Value, Error> {
        Ok(serde_json::json!({
            "name": self.name(),
            "version": self.version(),
            "chain": self.chain(),
        }))
    }
}

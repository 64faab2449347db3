/// Baruk SDK client.
///
/// Entry point tying together the network configuration, chain clients,
/// protocol registry, contract dispatcher, and the unified wallet session.
use serde_json::Value;
use std::sync::Arc;

use crate::config::{ContractRole, ProtocolId, SeiNetworkConfig};
use crate::dispatch::{ContractCall, ContractDispatcher};
use crate::error::Error;
use crate::protocols::astroport::PairClient;
use crate::protocols::baruk::{BarukContracts, BarukProtocol};
use crate::protocols::cosmwasm::WasmClient;
use crate::protocols::evm::EvmClient;
use crate::protocols::{AstroportProtocol, ProtocolRegistry, VortexProtocol};
use crate::wallet::session::{ConnectRequest, SessionStatus, TxPayload, WalletSession};

/// Main SDK client
pub struct BarukClient {
    config: SeiNetworkConfig,
    registry: ProtocolRegistry,
    dispatcher: ContractDispatcher,
    evm: EvmClient,
    wasm: WasmClient,
    baruk: BarukContracts,
    session: WalletSession,
}

impl BarukClient {
    /// Create a client for a network configuration
    pub fn new(config: SeiNetworkConfig) -> Result<Self, Error> {
        let evm = EvmClient::new(&config.evm_rpc_url, config.evm_chain_id)?;
        let wasm = WasmClient::new(&config)?;
        let baruk = BarukContracts::from_network(evm.clone(), &config)?;
        let dispatcher = ContractDispatcher::new(config.contracts.clone())?;

        let mut registry = ProtocolRegistry::new();
        registry.register(Arc::new(BarukProtocol));
        registry.register(Arc::new(AstroportProtocol));
        registry.register(Arc::new(VortexProtocol));

        let session = WalletSession::new(config.clone());

        Ok(Self {
            config,
            registry,
            dispatcher,
            evm,
            wasm,
            baruk,
            session,
        })
    }

    pub fn builder() -> BarukClientBuilder {
        BarukClientBuilder::default()
    }

    pub fn config(&self) -> &SeiNetworkConfig {
        &self.config
    }

    pub fn evm(&self) -> &EvmClient {
        &self.evm
    }

    pub fn wasm(&self) -> &WasmClient {
        &self.wasm
    }

    pub fn baruk(&self) -> &BarukContracts {
        &self.baruk
    }

    pub fn dispatcher(&self) -> &ContractDispatcher {
        &self.dispatcher
    }

    pub fn protocols(&self) -> &ProtocolRegistry {
        &self.registry
    }

    /// Pair client for a CosmWasm protocol
    pub fn pair(&self, protocol: ProtocolId) -> Result<PairClient, Error> {
        PairClient::from_network(self.wasm.clone(), protocol, &self.config)
    }

    pub fn session(&self) -> &WalletSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut WalletSession {
        &mut self.session
    }

    /// Connect a wallet backend to the client's session
    pub async fn connect(&mut self, request: ConnectRequest) -> Result<(), Error> {
        self.session.connect(request).await
    }

    pub fn disconnect(&mut self) {
        self.session.disconnect();
    }

    pub fn status(&self) -> SessionStatus {
        self.session.status()
    }

    /// Sign and send a raw payload through the session
    pub async fn sign_and_send(&mut self, payload: TxPayload) -> Result<String, Error> {
        self.session.sign_and_send(payload).await
    }

    /// Dispatch a contract write through the session's active signer
    pub async fn execute(
        &mut self,
        protocol: ProtocolId,
        role: ContractRole,
        call: ContractCall,
    ) -> Result<String, Error> {
        let Self {
            dispatcher,
            session,
            ..
        } = self;
        dispatcher.execute(session, protocol, role, call).await
    }

    /// Availability of each registered protocol on this network
    pub async fn check_availability(&self) -> Result<Vec<(String, bool)>, Error> {
        let mut results = Vec::new();
        for name in self.registry.list() {
            if let Some(protocol) = self.registry.get(name) {
                let available = protocol.is_available(&self.config).await?;
                results.push((name.to_string(), available));
            }
        }
        Ok(results)
    }

    /// Switch the client to a different network.
    ///
    /// Rebuilds the chain clients and dispatcher; the wallet session is reset
    /// to disconnected since its signers were bound to the old network.
    pub async fn switch_network(&mut self, network: &str) -> Result<(), Error> {
        let config = SeiNetworkConfig::load(network)?;
        let rebuilt = Self::new(config)?;
        *self = rebuilt;
        Ok(())
    }

    /// Summary of the client configuration
    pub fn summary(&self) -> Value {
        serde_json::json!({
            "network": {
                "name": self.config.network_name,
                "chain_id": self.config.chain_id,
                "evm_chain_id": self.config.evm_chain_id,
            },
            "protocols": self.registry.list(),
            "wallet_connected": self.session.is_connected(),
        })
    }
}

/// Builder for BarukClient construction
#[derive(Default)]
pub struct BarukClientBuilder {
    network_name: Option<String>,
    config: Option<SeiNetworkConfig>,
}

impl BarukClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a named network (loaded through the layered config)
    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        self.network_name = Some(network.into());
        self
    }

    /// Use an explicit configuration
    pub fn with_config(mut self, config: SeiNetworkConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> Result<BarukClient, Error> {
        let config = if let Some(config) = self.config {
            config
        } else if let Some(name) = self.network_name {
            SeiNetworkConfig::load(&name)?
        } else {
            SeiNetworkConfig::load("sei-pacific")?
        };
        BarukClient::new(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_to_mainnet() {
        let client = BarukClient::builder().build().unwrap();
        assert_eq!(client.config().network_name, "sei-pacific");
        assert!(!client.session().is_connected());
    }

    #[tokio::test]
    async fn all_protocols_available_on_mainnet() {
        let client = BarukClient::builder().build().unwrap();
        let availability = client.check_availability().await.unwrap();
        assert_eq!(availability.len(), 3);
        assert!(availability.iter().all(|(_, available)| *available));
    }

    #[tokio::test]
    async fn atlantic_has_no_vortex() {
        let client = BarukClient::builder()
            .with_network("sei-atlantic")
            .build()
            .unwrap();
        let availability = client.check_availability().await.unwrap();
        let vortex = availability
            .iter()
            .find(|(name, _)| name == "vortex")
            .unwrap();
        assert!(!vortex.1);
    }

    #[test]
    fn summary_reports_disconnected_session() {
        let client = BarukClient::builder().build().unwrap();
        let summary = client.summary();
        assert_eq!(summary["wallet_connected"], false);
        assert_eq!(summary["network"]["evm_chain_id"], 1329);
    }
}

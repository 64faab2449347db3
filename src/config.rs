//! Configuration management for the Baruk SDK
//!
//! Network constants for the known Sei networks plus the runtime network
//! config consumed by the wallet session, chain clients, and dispatcher.

pub mod contracts;

pub use contracts::{
    ChainFamily, ContractInfo, ContractRegistry, ContractRole, NetworkContracts, ProtocolId,
};

use config::{Config as ConfigLoader, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::env;
use url::Url;

use crate::error::Error;

/// Default number of decimals shown when formatting token amounts
pub const DEFAULT_DISPLAY_PRECISION: u32 = 6;

/// Per-network constants for Sei's paired chain layers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConstants {
    /// Network name (e.g. "sei-pacific")
    pub network_name: String,
    /// Cosmos chain ID (for SignDoc construction)
    pub chain_id: String,
    /// EVM chain ID (for EIP-155 replay protection)
    pub evm_chain_id: u64,
    /// Cosmos RPC endpoint
    pub rpc_url: String,
    /// EVM JSON-RPC endpoint
    pub evm_rpc_url: String,
    /// Gas price in the native denom
    pub gas_price: f64,
    /// Gas adjustment multiplier for Cosmos transactions
    pub gas_adjustment: f64,
    /// Native token denom on the Cosmos layer
    pub native_denom: String,
    /// Bech32 address prefix
    pub bech32_prefix: String,
}

impl NetworkConstants {
    /// Load constants for a named network.
    ///
    /// Resolution order: `BARUK_NETWORK_*` env overrides, a `config/network`
    /// file (or `BARUK_CONFIG_DIR`), then hardcoded fallbacks for the known
    /// Sei networks.
    pub fn load(network: &str) -> Result<Self, ConfigError> {
        let mut constants = Self::from_files(network).or_else(|_| Self::fallback(network))?;
        constants.apply_env_overrides();
        Ok(constants)
    }

    fn from_files(network: &str) -> Result<Self, ConfigError> {
        let config_dir = env::var("BARUK_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

        let config_paths = vec![
            format!("{}/network", config_dir),
            "config/network".to_string(),
            "../config/network".to_string(),
        ];

        for config_path in &config_paths {
            if let Ok(settings) = ConfigLoader::builder()
                .add_source(File::with_name(config_path))
                .build()
            {
                if let Ok(constants) = settings.get::<NetworkConstants>(network) {
                    return Ok(constants);
                }
            }
        }

        Err(ConfigError::NotFound(format!(
            "No network config file entry for '{}'",
            network
        )))
    }

    fn fallback(network: &str) -> Result<Self, ConfigError> {
        match network {
            "sei-pacific" => Ok(NetworkConstants {
                network_name: "sei-pacific".to_string(),
                chain_id: "pacific-1".to_string(),
                evm_chain_id: 1329,
                rpc_url: "https://rpc.sei-apis.com:443".to_string(),
                evm_rpc_url: "https://evm-rpc.sei-apis.com".to_string(),
                gas_price: 0.02,
                gas_adjustment: 1.5,
                native_denom: "usei".to_string(),
                bech32_prefix: "sei".to_string(),
            }),
            "sei-atlantic" => Ok(NetworkConstants {
                network_name: "sei-atlantic".to_string(),
                chain_id: "atlantic-2".to_string(),
                evm_chain_id: 1328,
                rpc_url: "https://rpc-testnet.sei-apis.com:443".to_string(),
                evm_rpc_url: "https://evm-rpc-testnet.sei-apis.com".to_string(),
                gas_price: 0.02,
                gas_adjustment: 1.5,
                native_denom: "usei".to_string(),
                bech32_prefix: "sei".to_string(),
            }),
            _ => Err(ConfigError::NotFound(format!(
                "Network configuration for '{}' not found",
                network
            ))),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(rpc) = env::var("BARUK_NETWORK_RPC_URL") {
            if !rpc.trim().is_empty() {
                self.rpc_url = rpc;
            }
        }
        if let Ok(rpc) = env::var("BARUK_NETWORK_EVM_RPC_URL") {
            if !rpc.trim().is_empty() {
                self.evm_rpc_url = rpc;
            }
        }
        if let Ok(price) = env::var("BARUK_NETWORK_GAS_PRICE") {
            if let Ok(parsed) = price.parse::<f64>() {
                self.gas_price = parsed;
            }
        }
    }

    /// Default mainnet constants
    pub fn default_pacific() -> Result<Self, ConfigError> {
        Self::load("sei-pacific")
    }
}

/// Runtime network configuration: constants plus the contract set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeiNetworkConfig {
    pub network_name: String,
    pub chain_id: String,
    pub evm_chain_id: u64,
    pub rpc_url: String,
    pub evm_rpc_url: String,
    pub gas_price: f64,
    pub gas_adjustment: f64,
    pub native_denom: String,
    pub bech32_prefix: String,
    /// Decimals shown when formatting token amounts for display
    pub display_precision: u32,
    /// Contract deployments for this network
    pub contracts: NetworkContracts,
}

impl SeiNetworkConfig {
    /// Build a network config from constants plus the layered contract registry
    pub fn from_constants(constants: &NetworkConstants) -> Result<Self, Error> {
        let registry = ContractRegistry::load().unwrap_or_default();
        let contracts = registry
            .get_network(&constants.network_name)
            .cloned()
            .unwrap_or_else(|_| {
                NetworkContracts::new(
                    constants.network_name.clone(),
                    constants.bech32_prefix.clone(),
                )
            });

        let config = Self {
            network_name: constants.network_name.clone(),
            chain_id: constants.chain_id.clone(),
            evm_chain_id: constants.evm_chain_id,
            rpc_url: constants.rpc_url.clone(),
            evm_rpc_url: constants.evm_rpc_url.clone(),
            gas_price: constants.gas_price,
            gas_adjustment: constants.gas_adjustment,
            native_denom: constants.native_denom.clone(),
            bech32_prefix: constants.bech32_prefix.clone(),
            display_precision: DEFAULT_DISPLAY_PRECISION,
            contracts,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load a named network end to end
    pub fn load(network: &str) -> Result<Self, Error> {
        let constants = NetworkConstants::load(network)
            .map_err(|e| Error::Config(format!("Failed to load network constants: {}", e)))?;
        Self::from_constants(&constants)
    }

    fn validate(&self) -> Result<(), Error> {
        Url::parse(&self.rpc_url)
            .map_err(|e| Error::Config(format!("Invalid Cosmos RPC URL '{}': {}", self.rpc_url, e)))?;
        Url::parse(&self.evm_rpc_url).map_err(|e| {
            Error::Config(format!("Invalid EVM RPC URL '{}': {}", self.evm_rpc_url, e))
        })?;
        if self.gas_price <= 0.0 {
            return Err(Error::Config(format!(
                "Gas price must be positive, got {}",
                self.gas_price
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pacific_fallback_constants() {
        let constants = NetworkConstants::load("sei-pacific").unwrap();
        assert_eq!(constants.chain_id, "pacific-1");
        assert_eq!(constants.evm_chain_id, 1329);
        assert_eq!(constants.native_denom, "usei");
    }

    #[test]
    fn unknown_network_is_an_error() {
        assert!(NetworkConstants::load("sei-unknown").is_err());
    }

    #[test]
    fn network_config_carries_contracts() {
        let config = SeiNetworkConfig::load("sei-pacific").unwrap();
        assert!(config
            .contracts
            .get_address(ProtocolId::Baruk, ContractRole::Router)
            .is_some());
        assert_eq!(config.display_precision, DEFAULT_DISPLAY_PRECISION);
    }
}

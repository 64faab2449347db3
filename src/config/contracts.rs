use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Which of Sei's two chain families a contract lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainFamily {
    /// Sei's EVM-compatible execution layer
    Evm,
    /// Sei's native Cosmos SDK layer
    Cosmos,
}

impl fmt::Display for ChainFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainFamily::Evm => write!(f, "evm"),
            ChainFamily::Cosmos => write!(f, "cosmos"),
        }
    }
}

/// Logical protocol identifier for contract resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolId {
    /// Baruk protocol contracts (EVM layer)
    Baruk,
    /// Astroport DEX contracts (CosmWasm layer)
    Astroport,
    /// Vortex contracts (CosmWasm layer)
    Vortex,
}

impl fmt::Display for ProtocolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolId::Baruk => write!(f, "baruk"),
            ProtocolId::Astroport => write!(f, "astroport"),
            ProtocolId::Vortex => write!(f, "vortex"),
        }
    }
}

impl FromStr for ProtocolId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.to_ascii_lowercase().as_str() {
            "baruk" => Ok(ProtocolId::Baruk),
            "astroport" => Ok(ProtocolId::Astroport),
            "vortex" => Ok(ProtocolId::Vortex),
            other => Err(Error::Config(format!(
                "Unknown protocol '{}'. Known protocols: [baruk, astroport, vortex]",
                other
            ))),
        }
    }
}

/// Role a contract plays within a protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractRole {
    /// Swap router entry point
    Router,
    /// AMM pool / pair contract
    Amm,
    /// Yield farm staking contract
    YieldFarm,
    /// Lending market contract
    Lending,
    /// Limit order book contract
    LimitOrder,
    /// CosmWasm pair contract (Astroport/Vortex)
    Pair,
}

impl ContractRole {
    /// All roles, used for env override scans
    pub const ALL: [ContractRole; 6] = [
        ContractRole::Router,
        ContractRole::Amm,
        ContractRole::YieldFarm,
        ContractRole::Lending,
        ContractRole::LimitOrder,
        ContractRole::Pair,
    ];
}

impl fmt::Display for ContractRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractRole::Router => write!(f, "router"),
            ContractRole::Amm => write!(f, "amm"),
            ContractRole::YieldFarm => write!(f, "yield_farm"),
            ContractRole::Lending => write!(f, "lending"),
            ContractRole::LimitOrder => write!(f, "limit_order"),
            ContractRole::Pair => write!(f, "pair"),
        }
    }
}

impl FromStr for ContractRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.to_ascii_lowercase().as_str() {
            "router" => Ok(ContractRole::Router),
            "amm" => Ok(ContractRole::Amm),
            "yield_farm" | "yieldfarm" | "farm" => Ok(ContractRole::YieldFarm),
            "lending" => Ok(ContractRole::Lending),
            "limit_order" | "limitorder" => Ok(ContractRole::LimitOrder),
            "pair" => Ok(ContractRole::Pair),
            other => Err(Error::Config(format!(
                "Unknown contract role '{}'. Known roles: [router, amm, yield_farm, lending, limit_order, pair]",
                other
            ))),
        }
    }
}

/// Contract address plus metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractInfo {
    /// Contract address on its chain (0x... or bech32)
    pub address: String,
    /// Chain family the contract is deployed on
    pub chain: ChainFamily,
    /// Contract version, if known
    pub version: Option<String>,
}

impl ContractInfo {
    pub fn evm(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            chain: ChainFamily::Evm,
            version: None,
        }
    }

    pub fn cosmos(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            chain: ChainFamily::Cosmos,
            version: None,
        }
    }

    /// Validate the address format for the contract's chain family.
    ///
    /// EVM addresses must be 0x-prefixed 20-byte hex; Cosmos addresses get a
    /// basic bech32 shape check (prefix + length bounds).
    pub fn validate_address(&self, bech32_prefix: &str) -> Result<(), Error> {
        if self.address.is_empty() {
            return Err(Error::Config(
                "Contract address cannot be empty".to_string(),
            ));
        }

        match self.chain {
            ChainFamily::Evm => {
                let hex_part = self.address.strip_prefix("0x").ok_or_else(|| {
                    Error::Config(format!(
                        "EVM contract address '{}' must start with 0x",
                        self.address
                    ))
                })?;
                if hex_part.len() != 40 || hex::decode(hex_part).is_err() {
                    return Err(Error::Config(format!(
                        "EVM contract address '{}' is not 20 bytes of hex",
                        self.address
                    )));
                }
            }
            ChainFamily::Cosmos => {
                if !self.address.starts_with(bech32_prefix) {
                    return Err(Error::Config(format!(
                        "Contract address '{}' does not have expected prefix '{}'",
                        self.address, bech32_prefix
                    )));
                }
                if self.address.len() < 39 || self.address.len() > 90 {
                    return Err(Error::Config(format!(
                        "Contract address '{}' has invalid length",
                        self.address
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Per-network contract address registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkContracts {
    /// Network name (e.g. "sei-pacific")
    pub network: String,
    /// Bech32 address prefix for the Cosmos layer
    pub bech32_prefix: String,
    /// Map of (protocol, role) to contract info
    contracts: HashMap<ProtocolId, HashMap<ContractRole, ContractInfo>>,
}

impl NetworkContracts {
    pub fn new(network: impl Into<String>, bech32_prefix: impl Into<String>) -> Self {
        Self {
            network: network.into(),
            bech32_prefix: bech32_prefix.into(),
            contracts: HashMap::new(),
        }
    }

    /// Register a contract, validating its address first
    pub fn add_contract(
        &mut self,
        protocol: ProtocolId,
        role: ContractRole,
        info: ContractInfo,
    ) -> Result<(), Error> {
        info.validate_address(&self.bech32_prefix)?;
        self.contracts.entry(protocol).or_default().insert(role, info);
        Ok(())
    }

    pub fn get_contract(&self, protocol: ProtocolId, role: ContractRole) -> Option<&ContractInfo> {
        self.contracts.get(&protocol).and_then(|roles| roles.get(&role))
    }

    pub fn get_address(&self, protocol: ProtocolId, role: ContractRole) -> Option<&str> {
        self.get_contract(protocol, role)
            .map(|info| info.address.as_str())
    }

    /// Resolve a contract or fail with an error naming the registered roles.
    ///
    /// Dispatch relies on this never yielding a placeholder: an unknown
    /// (protocol, role) pair must be an error, not a zero address.
    pub fn require_contract(
        &self,
        protocol: ProtocolId,
        role: ContractRole,
    ) -> Result<&ContractInfo, Error> {
        self.get_contract(protocol, role).ok_or_else(|| {
            let mut known: Vec<String> = self
                .contracts
                .get(&protocol)
                .map(|roles| roles.keys().map(|r| r.to_string()).collect())
                .unwrap_or_default();
            known.sort();
            Error::Dispatch(format!(
                "No '{}' contract registered for protocol '{}' on network '{}'. Registered roles: [{}]",
                role,
                protocol,
                self.network,
                known.join(", ")
            ))
        })
    }

    /// Protocols that have at least one contract registered
    pub fn protocols(&self) -> Vec<ProtocolId> {
        let mut ids: Vec<ProtocolId> = self
            .contracts
            .iter()
            .filter(|(_, roles)| !roles.is_empty())
            .map(|(id, _)| *id)
            .collect();
        ids.sort_by_key(|id| id.to_string());
        ids
    }

    pub fn has_protocol(&self, protocol: ProtocolId) -> bool {
        self.contracts
            .get(&protocol)
            .map(|roles| !roles.is_empty())
            .unwrap_or(false)
    }
}

/// Registry of contract sets across networks.
///
/// Layering order: built-in defaults, then an optional TOML file
/// (`BARUK_CONTRACTS_FILE`), then `BARUK_CONTRACT_<PROTOCOL>_<ROLE>` env
/// overrides. Later layers win.
#[derive(Debug, Clone)]
pub struct ContractRegistry {
    networks: HashMap<String, NetworkContracts>,
}

/// Serde shape for the optional contracts TOML file
#[derive(Debug, Deserialize)]
struct ContractsFile {
    #[serde(default)]
    networks: HashMap<String, FileNetwork>,
}

#[derive(Debug, Deserialize)]
struct FileNetwork {
    #[serde(default = "default_prefix")]
    bech32_prefix: String,
    #[serde(default)]
    contracts: HashMap<String, HashMap<String, ContractInfo>>,
}

fn default_prefix() -> String {
    "sei".to_string()
}

impl ContractRegistry {
    /// Load the registry with all layers applied
    pub fn load() -> Result<Self, Error> {
        let mut registry = Self::builtin();
        registry.apply_file_layer()?;
        registry.apply_env_layer()?;
        Ok(registry)
    }

    /// Built-in deployments for the known Sei networks
    pub fn builtin() -> Self {
        let mut networks = HashMap::new();

        let mut pacific = NetworkContracts::new("sei-pacific", "sei");
        let pacific_baruk = [
            (ContractRole::Router, "0x4b3a9c5d2f81e6a07c29f4d8b5e31c6d9a20f7e4"),
            (ContractRole::Amm, "0x7d1f8e2a6b94c3d50e8a71f6c4b92d3e5a80c1b6"),
            (ContractRole::YieldFarm, "0x2e9c4f7a1d83b6e50f97a2c8d4e61b3f5c70d9a2"),
            (ContractRole::Lending, "0x9a5e2d8c4f71b3a60d84c9e2f5a31d7b6e90f4c8"),
            (ContractRole::LimitOrder, "0x6c8b3f9e2a54d7c10b96e4f8a2c53d1e7b40a9f6"),
        ];
        for (role, addr) in pacific_baruk {
            pacific
                .add_contract(ProtocolId::Baruk, role, ContractInfo::evm(addr))
                .expect("builtin baruk address");
        }
        pacific
            .add_contract(
                ProtocolId::Astroport,
                ContractRole::Router,
                ContractInfo::cosmos(
                    "sei14hj2tavq8fpesdwxxcu44rty3hh90vhujrvcmstl4zr3txmfvw9sgnm2cp",
                ),
            )
            .expect("builtin astroport router address");
        pacific
            .add_contract(
                ProtocolId::Astroport,
                ContractRole::Pair,
                ContractInfo::cosmos(
                    "sei1pqcgdn5vmf3g9ncs98vtxkydc6su0f9rk3uk73s5ku2xhthr6avswrwnrx",
                ),
            )
            .expect("builtin astroport pair address");
        pacific
            .add_contract(
                ProtocolId::Vortex,
                ContractRole::Pair,
                ContractInfo::cosmos(
                    "sei1wug8sewp6cedgkmrmvhl3lf3tulagm9hnvy8p0rppz9yjw0g4wtqdxfzff",
                ),
            )
            .expect("builtin vortex pair address");
        networks.insert(pacific.network.clone(), pacific);

        let mut atlantic = NetworkContracts::new("sei-atlantic", "sei");
        let atlantic_baruk = [
            (ContractRole::Router, "0xa14e2c7d9f63b8a50c71d4e8f2a96b3c5d80e1f7"),
            (ContractRole::Amm, "0xd82f5a9c3e61b7d40f95a8c2e4b63f1d7a20c9e5"),
            (ContractRole::YieldFarm, "0x3f7a9d2e5c84b6f10a92d7e4c8f53a1b6e90d2c7"),
            (ContractRole::Lending, "0xc5e8f2a7d94b3c60e81f5a9d2c47b3e6f10a8d4b"),
            (ContractRole::LimitOrder, "0x8b2d6f9a4e73c5b10d86f2a9e4c71b3d5f60e8a2"),
        ];
        for (role, addr) in atlantic_baruk {
            atlantic
                .add_contract(ProtocolId::Baruk, role, ContractInfo::evm(addr))
                .expect("builtin baruk address");
        }
        atlantic
            .add_contract(
                ProtocolId::Astroport,
                ContractRole::Router,
                ContractInfo::cosmos(
                    "sei1466nf3zuxpya8q9emxukd7vftaf6h4psr0a07srl5zw74zh84yjqpeheyc",
                ),
            )
            .expect("builtin astroport router address");
        networks.insert(atlantic.network.clone(), atlantic);

        Self { networks }
    }

    /// Merge the optional TOML file layer on top of the built-ins
    fn apply_file_layer(&mut self) -> Result<(), Error> {
        let path = match env::var("BARUK_CONTRACTS_FILE") {
            Ok(p) if !p.trim().is_empty() => p,
            _ => return Ok(()),
        };

        let content = std::fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("Failed to read contracts file {}: {}", path, e)))?;
        let file: ContractsFile = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse contracts file {}: {}", path, e)))?;

        for (network, net_file) in file.networks {
            let entry = self
                .networks
                .entry(network.clone())
                .or_insert_with(|| NetworkContracts::new(network, net_file.bech32_prefix.clone()));
            for (protocol_name, roles) in net_file.contracts {
                let protocol = ProtocolId::from_str(&protocol_name)?;
                for (role_name, info) in roles {
                    let role = ContractRole::from_str(&role_name)?;
                    entry.add_contract(protocol, role, info)?;
                }
            }
        }

        Ok(())
    }

    /// Apply `BARUK_CONTRACT_<PROTOCOL>_<ROLE>` overrides across all networks.
    ///
    /// Chain family is inferred from the address shape (0x prefix = EVM).
    fn apply_env_layer(&mut self) -> Result<(), Error> {
        for protocol in [ProtocolId::Baruk, ProtocolId::Astroport, ProtocolId::Vortex] {
            for role in ContractRole::ALL {
                let var = format!(
                    "BARUK_CONTRACT_{}_{}",
                    protocol.to_string().to_ascii_uppercase(),
                    role.to_string().to_ascii_uppercase()
                );
                let address = match env::var(&var) {
                    Ok(a) if !a.trim().is_empty() => a,
                    _ => continue,
                };
                let info = if address.starts_with("0x") {
                    ContractInfo::evm(address)
                } else {
                    ContractInfo::cosmos(address)
                };
                for network in self.networks.values_mut() {
                    network.add_contract(protocol, role, info.clone())?;
                }
            }
        }
        Ok(())
    }

    pub fn get_network(&self, network: &str) -> Result<&NetworkContracts, Error> {
        self.networks.get(network).ok_or_else(|| {
            let mut known: Vec<&str> = self.networks.keys().map(|s| s.as_str()).collect();
            known.sort();
            Error::Config(format!(
                "No contract registry for network '{}'. Known networks: [{}]",
                network,
                known.join(", ")
            ))
        })
    }

    pub fn networks(&self) -> Vec<&str> {
        self.networks.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for ContractRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_has_both_networks() {
        let registry = ContractRegistry::builtin();
        assert!(registry.get_network("sei-pacific").is_ok());
        assert!(registry.get_network("sei-atlantic").is_ok());
        assert!(registry.get_network("sei-nonexistent").is_err());
    }

    #[test]
    fn require_contract_unknown_role_is_descriptive() {
        let registry = ContractRegistry::builtin();
        let network = registry.get_network("sei-pacific").unwrap();

        let err = network
            .require_contract(ProtocolId::Astroport, ContractRole::Lending)
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("lending"));
        assert!(msg.contains("astroport"));
        assert!(msg.contains("router"));
    }

    #[test]
    fn evm_address_validation() {
        let good = ContractInfo::evm("0x4b3a9c5d2f81e6a07c29f4d8b5e31c6d9a20f7e4");
        assert!(good.validate_address("sei").is_ok());

        let no_prefix = ContractInfo::evm("4b3a9c5d2f81e6a07c29f4d8b5e31c6d9a20f7e4");
        assert!(no_prefix.validate_address("sei").is_err());

        let short = ContractInfo::evm("0x4b3a9c");
        assert!(short.validate_address("sei").is_err());
    }

    #[test]
    fn cosmos_address_validation() {
        let good = ContractInfo::cosmos(
            "sei14hj2tavq8fpesdwxxcu44rty3hh90vhujrvcmstl4zr3txmfvw9sgnm2cp",
        );
        assert!(good.validate_address("sei").is_ok());

        let wrong_prefix = ContractInfo::cosmos(
            "osmo14hj2tavq8fpesdwxxcu44rty3hh90vhujrvcmstl4zr3txmfvw9sgnm2cp",
        );
        assert!(wrong_prefix.validate_address("sei").is_err());
    }

    #[test]
    fn role_round_trips_through_strings() {
        for role in ContractRole::ALL {
            let parsed = ContractRole::from_str(&role.to_string()).unwrap();
            assert_eq!(parsed, role);
        }
        assert!(ContractRole::from_str("escrow").is_err());
    }
}

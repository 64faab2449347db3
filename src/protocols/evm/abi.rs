/// ABI registry for EVM contracts.
///
/// Caches JSON ABIs per contract role so the dispatcher can resolve a method
/// name to its selector and reject calls against methods the contract does not
/// expose.
use alloy_json_abi::{Function, JsonAbi};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::Error;

#[derive(Debug, Clone, Default)]
pub struct AbiRegistry {
    abis: HashMap<String, JsonAbi>,
}

impl AbiRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an ABI from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P, key: String) -> Result<(), Error> {
        let content = fs::read_to_string(&path).map_err(|e| {
            Error::Config(format!(
                "Failed to read ABI file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        self.load_from_json(&content, key)
    }

    /// Load an ABI from a JSON string
    pub fn load_from_json(&mut self, json: &str, key: String) -> Result<(), Error> {
        let abi: JsonAbi = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("Failed to parse ABI JSON for '{}': {}", key, e)))?;
        self.abis.insert(key, abi);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&JsonAbi> {
        self.abis.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.abis.contains_key(key)
    }

    /// Look up a function by name within a registered ABI
    pub fn get_function(&self, abi_key: &str, function_name: &str) -> Result<&Function, Error> {
        let abi = self.get(abi_key).ok_or_else(|| {
            let mut known: Vec<&str> = self.abis.keys().map(|s| s.as_str()).collect();
            known.sort();
            Error::Config(format!(
                "ABI '{}' not found. Loaded ABIs: [{}]",
                abi_key,
                known.join(", ")
            ))
        })?;

        abi.functions()
            .find(|f| f.name == function_name)
            .ok_or_else(|| {
                let mut names: Vec<&str> = abi.functions().map(|f| f.name.as_str()).collect();
                names.sort();
                names.dedup();
                Error::Contract(format!(
                    "Function '{}' not found in ABI '{}'. Known functions: [{}]",
                    function_name,
                    abi_key,
                    names.join(", ")
                ))
            })
    }

    /// Build calldata from a function's selector plus pre-encoded arguments
    pub fn encode_call(
        &self,
        abi_key: &str,
        function_name: &str,
        encoded_args: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let function = self.get_function(abi_key, function_name)?;
        let mut data = function.selector().to_vec();
        data.extend_from_slice(encoded_args);
        Ok(data)
    }

    pub fn list_keys(&self) -> Vec<&str> {
        self.abis.keys().map(|s| s.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROUTER_ABI: &str = r#"[
        {
            "type": "function",
            "name": "swapExactTokensForTokens",
            "inputs": [
                {"name": "amountIn", "type": "uint256"},
                {"name": "amountOutMin", "type": "uint256"},
                {"name": "path", "type": "address[]"},
                {"name": "to", "type": "address"},
                {"name": "deadline", "type": "uint256"}
            ],
            "outputs": [{"name": "amounts", "type": "uint256[]"}],
            "stateMutability": "nonpayable"
        }
    ]"#;

    #[test]
    fn function_lookup_by_name() {
        let mut registry = AbiRegistry::new();
        registry
            .load_from_json(ROUTER_ABI, "baruk/router".to_string())
            .unwrap();

        let function = registry
            .get_function("baruk/router", "swapExactTokensForTokens")
            .unwrap();
        assert_eq!(function.inputs.len(), 5);
    }

    #[test]
    fn unknown_function_is_descriptive() {
        let mut registry = AbiRegistry::new();
        registry
            .load_from_json(ROUTER_ABI, "baruk/router".to_string())
            .unwrap();

        let err = registry
            .get_function("baruk/router", "swapETHForExactTokens")
            .unwrap_err();
        assert!(err.to_string().contains("swapExactTokensForTokens"));

        let err = registry.get_function("baruk/escrow", "anything").unwrap_err();
        assert!(err.to_string().contains("baruk/router"));
    }

    #[test]
    fn encode_call_prefixes_selector() {
        let mut registry = AbiRegistry::new();
        registry
            .load_from_json(ROUTER_ABI, "baruk/router".to_string())
            .unwrap();

        let data = registry
            .encode_call("baruk/router", "swapExactTokensForTokens", &[0xaa; 32])
            .unwrap();
        assert_eq!(data.len(), 4 + 32);
    }
}

//! Tool adapter.
//!
//! JSON-in/JSON-out wrappers over the SDK, consumed by the HTTP chat route
//! (the surface the conversational agent calls into). Tools delegate to real
//! chain reads or to the dispatcher for writes; failures propagate as errors,
//! never as fabricated successes.
//!
//! Per-user state lives in a process-local session map. The map is bounded:
//! when full, the longest-idle session is evicted.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::client::BarukClient;
use crate::config::SeiNetworkConfig;
use crate::dispatch::ContractDispatcher;
use crate::error::Error;
use crate::prices::PriceOracle;
use crate::protocols::baruk::BarukContracts;
use crate::protocols::cosmwasm::WasmClient;
use crate::protocols::evm::EvmClient;
use crate::wallet::{WalletSession, WalletStore};

mod market;
mod trade;
mod wallet;

/// Default bound on concurrently tracked user sessions
pub const DEFAULT_MAX_SESSIONS: usize = 1024;

/// User risk tolerance, set via preferences and echoed to the agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RiskTolerance {
    Conservative,
    #[default]
    Balanced,
    Aggressive,
}

impl FromStr for RiskTolerance {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.to_ascii_lowercase().as_str() {
            "conservative" => Ok(RiskTolerance::Conservative),
            "balanced" => Ok(RiskTolerance::Balanced),
            "aggressive" => Ok(RiskTolerance::Aggressive),
            other => Err(Error::Session(format!(
                "Unknown risk tolerance '{}'. Known values: [conservative, balanced, aggressive]",
                other
            ))),
        }
    }
}

/// Per-user server-side session
pub struct UserSession {
    pub user_id: String,
    /// Opaque id for correlating log lines across tool calls
    pub session_id: Uuid,
    pub wallet: WalletSession,
    pub risk_tolerance: RiskTolerance,
    pub preferences: HashMap<String, String>,
    pub last_active: Instant,
}

impl UserSession {
    fn new(user_id: String, network: SeiNetworkConfig) -> Self {
        Self {
            user_id,
            session_id: Uuid::new_v4(),
            wallet: WalletSession::new(network),
            risk_tolerance: RiskTolerance::default(),
            preferences: HashMap::new(),
            last_active: Instant::now(),
        }
    }
}

/// All tool names the adapter dispatches, for discovery and error messages
pub const TOOL_NAMES: [&str; 16] = [
    "connect_wallet",
    "disconnect_wallet",
    "wallet_status",
    "switch_account",
    "set_preferences",
    "get_balances",
    "get_pool_reserves",
    "get_farm_info",
    "get_lending_position",
    "get_token_prices",
    "swap",
    "add_liquidity",
    "remove_liquidity",
    "lend",
    "farm",
    "place_limit_order",
];

// cancel_limit_order is routed as well; it shares the limit-order surface
const EXTRA_TOOLS: [&str; 1] = ["cancel_limit_order"];

/// Adapter owning per-user sessions on top of a shared SDK client
pub struct ToolAdapter {
    client: BarukClient,
    oracle: PriceOracle,
    wallet_store: WalletStore,
    sessions: RwLock<HashMap<String, UserSession>>,
    max_sessions: usize,
}

impl ToolAdapter {
    pub fn new(network: SeiNetworkConfig) -> Result<Self, Error> {
        Ok(Self {
            client: BarukClient::new(network)?,
            oracle: PriceOracle::for_sei(),
            wallet_store: WalletStore::new()?,
            sessions: RwLock::new(HashMap::new()),
            max_sessions: DEFAULT_MAX_SESSIONS,
        })
    }

    /// Replace the price oracle (used by the server to share one instance)
    pub fn with_oracle(mut self, oracle: PriceOracle) -> Self {
        self.oracle = oracle;
        self
    }

    /// Replace the wallet store (tests point this at a temp dir)
    pub fn with_wallet_store(mut self, store: WalletStore) -> Self {
        self.wallet_store = store;
        self
    }

    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions.max(1);
        self
    }

    pub fn network(&self) -> &SeiNetworkConfig {
        self.client.config()
    }

    pub fn oracle(&self) -> &PriceOracle {
        &self.oracle
    }

    fn evm(&self) -> &EvmClient {
        self.client.evm()
    }

    fn wasm(&self) -> &WasmClient {
        self.client.wasm()
    }

    fn baruk(&self) -> &BarukContracts {
        self.client.baruk()
    }

    fn dispatcher(&self) -> &ContractDispatcher {
        self.client.dispatcher()
    }

    /// Dispatch a named tool for a user.
    ///
    /// Creates the user's session on first use. All tool results are JSON
    /// envelopes; all failures are returned as `Err`.
    pub async fn handle(&self, user_id: &str, tool: &str, params: Value) -> Result<Value, Error> {
        self.ensure_session(user_id).await;

        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(user_id)
            .ok_or_else(|| Error::Session(format!("Session for '{}' disappeared", user_id)))?;
        session.last_active = Instant::now();

        debug!(user_id, session_id = %session.session_id, tool, "Handling tool call");
        match tool {
            "connect_wallet" => self.connect_wallet(session, params).await,
            "disconnect_wallet" => self.disconnect_wallet(session).await,
            "wallet_status" => self.wallet_status(session).await,
            "switch_account" => self.switch_account(session, params).await,
            "set_preferences" => self.set_preferences(session, params).await,
            "get_balances" => self.get_balances(session, params).await,
            "get_pool_reserves" => self.get_pool_reserves(session, params).await,
            "get_farm_info" => self.get_farm_info(session, params).await,
            "get_lending_position" => self.get_lending_position(session, params).await,
            "get_token_prices" => self.get_token_prices(params).await,
            "swap" => self.swap(session, params).await,
            "add_liquidity" => self.add_liquidity(session, params).await,
            "remove_liquidity" => self.remove_liquidity(session, params).await,
            "lend" => self.lend(session, params).await,
            "farm" => self.farm(session, params).await,
            "place_limit_order" => self.place_limit_order(session, params).await,
            "cancel_limit_order" => self.cancel_limit_order(session, params).await,
            other => {
                let mut known: Vec<&str> = TOOL_NAMES
                    .iter()
                    .chain(EXTRA_TOOLS.iter())
                    .copied()
                    .collect();
                known.sort();
                Err(Error::Session(format!(
                    "Unknown tool '{}'. Available tools: [{}]",
                    other,
                    known.join(", ")
                )))
            }
        }
    }

    /// Refresh native balances for every connected session.
    /// Driven by the server's 10s polling task; failures are per-session and
    /// do not stop the sweep.
    pub async fn refresh_balances(&self) {
        let targets: Vec<(String, crate::config::ChainFamily, String)> = {
            let sessions = self.sessions.read().await;
            sessions
                .iter()
                .filter_map(|(user_id, session)| {
                    let address = session.wallet.address()?;
                    let chain = session.wallet.chain()?;
                    Some((user_id.clone(), chain, address.to_string()))
                })
                .collect()
        };

        let refreshes = targets.into_iter().map(|(user_id, chain, address)| async move {
            let result = match chain {
                crate::config::ChainFamily::Evm => match Address::from_str(&address) {
                    Ok(parsed) => self.evm().get_balance(parsed).await.map(|b| b.to_string()),
                    Err(e) => Err(Error::Session(e.to_string())),
                },
                crate::config::ChainFamily::Cosmos => self
                    .wasm()
                    .bank_balances(&address)
                    .await
                    .map(|balances| format!("{} denoms", balances.len())),
            };
            match result {
                Ok(summary) => debug!(user_id, %address, summary, "Balance refreshed"),
                Err(e) => warn!(user_id, %address, error = %e, "Balance refresh failed"),
            }
        });
        futures::future::join_all(refreshes).await;
    }

    /// Number of tracked sessions
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn ensure_session(&self, user_id: &str) {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(user_id) {
            return;
        }

        if sessions.len() >= self.max_sessions {
            // Evict the longest-idle session to bound memory
            if let Some(oldest) = sessions
                .iter()
                .min_by_key(|(_, s)| s.last_active)
                .map(|(id, _)| id.clone())
            {
                info!(evicted = %oldest, "Session map full, evicting longest-idle session");
                sessions.remove(&oldest);
            }
        }

        sessions.insert(
            user_id.to_string(),
            UserSession::new(user_id.to_string(), self.client.config().clone()),
        );
    }
}

// ============ Param helpers ============

pub(crate) fn require_str<'a>(params: &'a Value, key: &str) -> Result<&'a str, Error> {
    params
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::Session(format!("Missing required string parameter '{}'", key)))
}

pub(crate) fn opt_str<'a>(params: &'a Value, key: &str) -> Option<&'a str> {
    params.get(key).and_then(Value::as_str)
}

pub(crate) fn require_u64(params: &Value, key: &str) -> Result<u64, Error> {
    params
        .get(key)
        .and_then(Value::as_u64)
        .ok_or_else(|| Error::Session(format!("Missing required integer parameter '{}'", key)))
}

pub(crate) fn opt_u64(params: &Value, key: &str) -> Option<u64> {
    params.get(key).and_then(Value::as_u64)
}

pub(crate) fn parse_evm_address(value: &str, key: &str) -> Result<Address, Error> {
    Address::from_str(value)
        .map_err(|e| Error::Session(format!("Invalid address for '{}': {}", key, e)))
}

/// Raw base-unit amount from a decimal string parameter
pub(crate) fn parse_amount(params: &Value, key: &str) -> Result<U256, Error> {
    let raw = require_str(params, key)?;
    U256::from_str(raw)
        .map_err(|e| Error::Session(format!("Invalid amount for '{}': {}", key, e)))
}

//! Unified wallet connector.
//!
//! One API surface over four incompatible wallet backends: browser-style
//! external providers and locally derived internal wallets, on each of Sei's
//! two chain families. The session tracks which backend is connected, which
//! account is active, and routes `sign_and_send` to the matching signer.
//! Exactly one signer is active at a time.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::{ChainFamily, SeiNetworkConfig};
use crate::error::Error;
use crate::protocols::cosmwasm::WasmClient;
use crate::protocols::evm::tx::Eip1559Transaction;
use crate::protocols::evm::{EvmClient, EvmTransactionRequest};
use crate::wallet::BarukWallet;

/// Number of sibling accounts derived for an internal wallet
const INTERNAL_ACCOUNT_SET: u32 = 5;

/// The four supported wallet backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WalletKind {
    /// Browser-extension style EVM provider
    EvmExternal,
    /// Locally derived EVM wallet
    EvmInternal,
    /// External Cosmos signer
    CosmosExternal,
    /// Locally derived Cosmos wallet
    CosmosInternal,
}

impl WalletKind {
    pub fn chain(&self) -> ChainFamily {
        match self {
            WalletKind::EvmExternal | WalletKind::EvmInternal => ChainFamily::Evm,
            WalletKind::CosmosExternal | WalletKind::CosmosInternal => ChainFamily::Cosmos,
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, WalletKind::EvmInternal | WalletKind::CosmosInternal)
    }
}

impl fmt::Display for WalletKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletKind::EvmExternal => write!(f, "evm-external"),
            WalletKind::EvmInternal => write!(f, "evm-internal"),
            WalletKind::CosmosExternal => write!(f, "cosmos-external"),
            WalletKind::CosmosInternal => write!(f, "cosmos-internal"),
        }
    }
}

impl FromStr for WalletKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.to_ascii_lowercase().as_str() {
            "evm-external" => Ok(WalletKind::EvmExternal),
            "evm-internal" => Ok(WalletKind::EvmInternal),
            "cosmos-external" => Ok(WalletKind::CosmosExternal),
            "cosmos-internal" => Ok(WalletKind::CosmosInternal),
            other => Err(Error::Session(format!(
                "Unknown wallet kind '{}'. Known kinds: [evm-external, evm-internal, cosmos-external, cosmos-internal]",
                other
            ))),
        }
    }
}

/// External EVM provider, supplied by the embedding application.
///
/// Mirrors the injected-provider surface: account requests prompt the user,
/// and signing happens inside the provider, never in this process.
#[async_trait]
pub trait ExternalEvmProvider: Send + Sync {
    /// Request the authorized account list, prompting if needed
    async fn request_accounts(&self) -> Result<Vec<String>, Error>;

    /// EVM chain id the provider is currently on
    async fn chain_id(&self) -> Result<u64, Error>;

    /// Ask the provider to switch chains
    async fn switch_chain(&self, chain_id: u64) -> Result<(), Error>;

    /// Sign and submit a transaction from the given account, returning the hash
    async fn sign_and_send(
        &self,
        from: &str,
        request: EvmTransactionRequest,
    ) -> Result<String, Error>;
}

/// CosmWasm execute payload handed to a signer
#[derive(Debug, Clone)]
pub struct WasmExecute {
    pub contract: String,
    pub msg: Value,
    pub funds: Vec<cosmrs::Coin>,
}

/// External Cosmos signer, supplied by the embedding application
#[async_trait]
pub trait ExternalCosmosSigner: Send + Sync {
    /// Request the account list for a chain, prompting if needed
    async fn request_accounts(&self, chain_id: &str) -> Result<Vec<String>, Error>;

    /// Sign and broadcast a contract execute, returning the tx hash
    async fn sign_and_broadcast(&self, from: &str, execute: WasmExecute) -> Result<String, Error>;
}

/// The signer currently held by the session
#[derive(Clone, Default)]
pub enum ActiveSigner {
    #[default]
    None,
    Internal(Arc<BarukWallet>),
    EvmProvider(Arc<dyn ExternalEvmProvider>),
    CosmosProvider(Arc<dyn ExternalCosmosSigner>),
}

/// Connection request for one of the four backends
#[derive(Clone)]
pub enum ConnectRequest {
    EvmExternal(Arc<dyn ExternalEvmProvider>),
    EvmInternal(Arc<BarukWallet>),
    CosmosExternal(Arc<dyn ExternalCosmosSigner>),
    CosmosInternal(Arc<BarukWallet>),
}

impl ConnectRequest {
    pub fn kind(&self) -> WalletKind {
        match self {
            ConnectRequest::EvmExternal(_) => WalletKind::EvmExternal,
            ConnectRequest::EvmInternal(_) => WalletKind::EvmInternal,
            ConnectRequest::CosmosExternal(_) => WalletKind::CosmosExternal,
            ConnectRequest::CosmosInternal(_) => WalletKind::CosmosInternal,
        }
    }
}

/// Transaction payload for `sign_and_send`
#[derive(Debug, Clone)]
pub enum TxPayload {
    Evm(EvmTransactionRequest),
    Cosmos(WasmExecute),
}

/// Serializable session snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatus {
    pub connected: bool,
    pub kind: Option<WalletKind>,
    pub chain: Option<ChainFamily>,
    pub address: Option<String>,
    pub accounts: Vec<String>,
    pub current_account_index: usize,
    pub chain_id: Option<String>,
    pub last_error: Option<String>,
}

/// Unified wallet session
pub struct WalletSession {
    network: SeiNetworkConfig,
    kind: Option<WalletKind>,
    chain: Option<ChainFamily>,
    address: Option<String>,
    accounts: Vec<String>,
    current_account_index: usize,
    chain_id: Option<String>,
    signer: ActiveSigner,
    evm_client: Option<EvmClient>,
    wasm_client: Option<WasmClient>,
    last_error: Option<String>,
}

impl WalletSession {
    /// Create a disconnected session bound to a network
    pub fn new(network: SeiNetworkConfig) -> Self {
        Self {
            network,
            kind: None,
            chain: None,
            address: None,
            accounts: Vec::new(),
            current_account_index: 0,
            chain_id: None,
            signer: ActiveSigner::None,
            evm_client: None,
            wasm_client: None,
            last_error: None,
        }
    }

    pub fn network(&self) -> &SeiNetworkConfig {
        &self.network
    }

    pub fn is_connected(&self) -> bool {
        self.kind.is_some()
    }

    pub fn kind(&self) -> Option<WalletKind> {
        self.kind
    }

    pub fn chain(&self) -> Option<ChainFamily> {
        self.chain
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn accounts(&self) -> &[String] {
        &self.accounts
    }

    pub fn chain_id(&self) -> Option<&str> {
        self.chain_id.as_deref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn signer(&self) -> &ActiveSigner {
        &self.signer
    }

    /// EVM client for the connected session (present after an EVM connect)
    pub fn evm_client(&self) -> Option<&EvmClient> {
        self.evm_client.as_ref()
    }

    /// Cosmos client for the connected session (present after a Cosmos connect)
    pub fn wasm_client(&self) -> Option<&WasmClient> {
        self.wasm_client.as_ref()
    }

    /// Serializable status snapshot
    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            connected: self.is_connected(),
            kind: self.kind,
            chain: self.chain,
            address: self.address.clone(),
            accounts: self.accounts.clone(),
            current_account_index: self.current_account_index,
            chain_id: self.chain_id.clone(),
            last_error: self.last_error.clone(),
        }
    }

    /// Connect one of the four backends.
    ///
    /// The previous session state is replaced only once the new backend has
    /// produced its account list; a failed connect leaves the prior connection
    /// in place with the error recorded.
    pub async fn connect(&mut self, request: ConnectRequest) -> Result<(), Error> {
        let kind = request.kind();
        let result = self.connect_inner(request).await;
        match &result {
            Ok(()) => {
                self.last_error = None;
                info!(kind = %kind, address = ?self.address, "Wallet connected");
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                warn!(kind = %kind, error = %e, "Wallet connect failed");
            }
        }
        result
    }

    async fn connect_inner(&mut self, request: ConnectRequest) -> Result<(), Error> {
        match request {
            ConnectRequest::EvmExternal(provider) => {
                // One account request per connect; the provider prompts if the
                // app has no prior authorization
                let accounts = provider.request_accounts().await?;
                let address = accounts
                    .first()
                    .cloned()
                    .ok_or_else(|| Error::Session("Provider returned no accounts".to_string()))?;
                let chain_id = provider.chain_id().await?;

                self.install_evm_clients()?;
                self.kind = Some(WalletKind::EvmExternal);
                self.chain = Some(ChainFamily::Evm);
                self.address = Some(address);
                self.accounts = accounts;
                self.current_account_index = 0;
                self.chain_id = Some(chain_id.to_string());
                self.signer = ActiveSigner::EvmProvider(provider);
                self.wasm_client = None;
            }
            ConnectRequest::EvmInternal(wallet) => {
                let mut accounts = derive_evm_accounts(&wallet)?;
                let index = wallet.account_index() as usize;
                // Wallets derived beyond the standard set still appear in their
                // own account list
                if index >= accounts.len() {
                    accounts.push(format!("{:?}", wallet.evm_address()?));
                }
                let index = index.min(accounts.len() - 1);
                let address = accounts[index].clone();

                self.install_evm_clients()?;
                self.kind = Some(WalletKind::EvmInternal);
                self.chain = Some(ChainFamily::Evm);
                self.current_account_index = index;
                self.address = Some(address);
                self.accounts = accounts;
                self.chain_id = Some(self.network.evm_chain_id.to_string());
                self.signer = ActiveSigner::Internal(wallet);
                self.wasm_client = None;
            }
            ConnectRequest::CosmosExternal(signer) => {
                let chain_id = self.network.chain_id.clone();
                let accounts = signer.request_accounts(&chain_id).await?;
                let address = accounts
                    .first()
                    .cloned()
                    .ok_or_else(|| Error::Session("Signer returned no accounts".to_string()))?;

                self.install_wasm_client()?;
                self.kind = Some(WalletKind::CosmosExternal);
                self.chain = Some(ChainFamily::Cosmos);
                self.address = Some(address);
                self.accounts = accounts;
                self.current_account_index = 0;
                self.chain_id = Some(chain_id);
                self.signer = ActiveSigner::CosmosProvider(signer);
                self.evm_client = None;
            }
            ConnectRequest::CosmosInternal(wallet) => {
                let mut accounts = derive_cosmos_accounts(&wallet)?;
                let index = wallet.account_index() as usize;
                if index >= accounts.len() {
                    accounts.push(wallet.cosmos_address()?.to_string());
                }
                let index = index.min(accounts.len() - 1);
                let address = accounts[index].clone();

                self.install_wasm_client()?;
                self.kind = Some(WalletKind::CosmosInternal);
                self.chain = Some(ChainFamily::Cosmos);
                self.current_account_index = index;
                self.address = Some(address);
                self.accounts = accounts;
                self.chain_id = Some(self.network.chain_id.clone());
                self.signer = ActiveSigner::Internal(wallet);
                self.evm_client = None;
            }
        }
        Ok(())
    }

    /// Disconnect and clear all session state
    pub fn disconnect(&mut self) {
        debug!(address = ?self.address, "Wallet disconnected");
        self.kind = None;
        self.chain = None;
        self.address = None;
        self.accounts.clear();
        self.current_account_index = 0;
        self.chain_id = None;
        self.signer = ActiveSigner::None;
        self.evm_client = None;
        self.wasm_client = None;
        self.last_error = None;
    }

    /// Switch the active account to `accounts[index]`.
    ///
    /// External backends re-request the account list first; internal wallets
    /// re-derive the signing key at the new index. The account list itself is
    /// left as reported.
    pub async fn switch_account(&mut self, index: usize) -> Result<(), Error> {
        let result = self.switch_account_inner(index).await;
        if let Err(e) = &result {
            self.last_error = Some(e.to_string());
        }
        result
    }

    async fn switch_account_inner(&mut self, index: usize) -> Result<(), Error> {
        let kind = self
            .kind
            .ok_or_else(|| Error::Session("No wallet connected".to_string()))?;

        match (&self.signer, kind) {
            (ActiveSigner::EvmProvider(provider), _) => {
                self.accounts = provider.request_accounts().await?;
            }
            (ActiveSigner::CosmosProvider(signer), _) => {
                let chain_id = self
                    .chain_id
                    .clone()
                    .unwrap_or_else(|| self.network.chain_id.clone());
                self.accounts = signer.request_accounts(&chain_id).await?;
            }
            (ActiveSigner::Internal(_), _) => {}
            (ActiveSigner::None, _) => {
                return Err(Error::Session("No signer active".to_string()));
            }
        }

        if index >= self.accounts.len() {
            return Err(Error::Session(format!(
                "Account index {} out of range ({} accounts available)",
                index,
                self.accounts.len()
            )));
        }

        if let ActiveSigner::Internal(wallet) = &self.signer {
            let derived = wallet.derive_account(index as u32)?;
            self.signer = ActiveSigner::Internal(Arc::new(derived));
        }

        self.current_account_index = index;
        self.address = Some(self.accounts[index].clone());
        debug!(index, address = ?self.address, "Switched account");
        Ok(())
    }

    /// Switch the connected chain.
    ///
    /// EVM-external sessions delegate to the provider; Cosmos sessions are
    /// reconnected against the new chain id (external) or repointed (internal).
    pub async fn switch_chain(&mut self, chain_id: &str) -> Result<(), Error> {
        let result = self.switch_chain_inner(chain_id).await;
        if let Err(e) = &result {
            self.last_error = Some(e.to_string());
        }
        result
    }

    async fn switch_chain_inner(&mut self, chain_id: &str) -> Result<(), Error> {
        let kind = self
            .kind
            .ok_or_else(|| Error::Session("No wallet connected".to_string()))?;

        match kind {
            WalletKind::EvmExternal => {
                let numeric: u64 = chain_id.parse().map_err(|_| {
                    Error::Session(format!("Invalid EVM chain id '{}'", chain_id))
                })?;
                if let ActiveSigner::EvmProvider(provider) = &self.signer {
                    provider.switch_chain(numeric).await?;
                }
                self.chain_id = Some(numeric.to_string());
            }
            WalletKind::EvmInternal => {
                let numeric: u64 = chain_id.parse().map_err(|_| {
                    Error::Session(format!("Invalid EVM chain id '{}'", chain_id))
                })?;
                self.chain_id = Some(numeric.to_string());
            }
            WalletKind::CosmosExternal => {
                // Approximated by reconnecting against the new chain
                if let ActiveSigner::CosmosProvider(signer) = &self.signer {
                    let accounts = signer.request_accounts(chain_id).await?;
                    let address = accounts.first().cloned().ok_or_else(|| {
                        Error::Session("Signer returned no accounts".to_string())
                    })?;
                    self.accounts = accounts;
                    self.current_account_index = 0;
                    self.address = Some(address);
                }
                self.chain_id = Some(chain_id.to_string());
            }
            WalletKind::CosmosInternal => {
                self.chain_id = Some(chain_id.to_string());
            }
        }

        debug!(chain_id, "Switched chain");
        Ok(())
    }

    /// Sign and submit a transaction through the active signer, branching on
    /// the connected chain family. Returns the transaction hash.
    pub async fn sign_and_send(&mut self, payload: TxPayload) -> Result<String, Error> {
        let result = self.sign_and_send_inner(payload).await;
        match &result {
            Ok(hash) => {
                self.last_error = None;
                info!(tx_hash = %hash, "Transaction submitted");
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                warn!(error = %e, "Transaction failed");
            }
        }
        result
    }

    async fn sign_and_send_inner(&mut self, payload: TxPayload) -> Result<String, Error> {
        let chain = self
            .chain
            .ok_or_else(|| Error::Session("No wallet connected".to_string()))?;

        match (chain, payload) {
            (ChainFamily::Evm, TxPayload::Evm(request)) => self.send_evm(request).await,
            (ChainFamily::Cosmos, TxPayload::Cosmos(execute)) => self.send_cosmos(execute).await,
            (ChainFamily::Evm, TxPayload::Cosmos(_)) => Err(Error::Session(
                "Cosmos payload cannot be sent through an EVM wallet session".to_string(),
            )),
            (ChainFamily::Cosmos, TxPayload::Evm(_)) => Err(Error::Session(
                "EVM payload cannot be sent through a Cosmos wallet session".to_string(),
            )),
        }
    }

    async fn send_evm(&self, request: EvmTransactionRequest) -> Result<String, Error> {
        match &self.signer {
            ActiveSigner::EvmProvider(provider) => {
                let from = self
                    .address
                    .as_deref()
                    .ok_or_else(|| Error::Session("No active account".to_string()))?;
                provider.sign_and_send(from, request).await
            }
            ActiveSigner::Internal(wallet) => {
                let evm = self
                    .evm_client
                    .as_ref()
                    .ok_or_else(|| Error::Session("EVM client not initialized".to_string()))?;

                let to = request
                    .to
                    .clone()
                    .ok_or_else(|| Error::Evm("Transaction has no target address".to_string()))?;
                let from = wallet.evm_address()?;

                let nonce = evm.get_nonce(from).await?;
                let gas_limit = match request.gas_limit {
                    Some(limit) => limit,
                    None => evm.estimate_gas(&request).await?,
                };
                let (max_fee, priority_fee) = match (
                    request.max_fee_per_gas,
                    request.max_priority_fee_per_gas,
                ) {
                    (Some(max), Some(priority)) => (max, priority),
                    _ => {
                        let estimate = evm.fee_estimate().await?;
                        (estimate.max_fee_per_gas, estimate.max_priority_fee_per_gas)
                    }
                };

                let tx = Eip1559Transaction::new(request.chain_id, nonce)
                    .to(to.0)
                    .value(request.value)
                    .data(request.data.clone())
                    .gas_limit(gas_limit)
                    .fees(max_fee, priority_fee);

                let signed = wallet.sign_eip1559(&tx)?;
                let hash = evm.send_raw_transaction(signed.raw()).await?;
                Ok(format!("{:?}", hash))
            }
            ActiveSigner::CosmosProvider(_) | ActiveSigner::None => Err(Error::Session(
                "No EVM signer active".to_string(),
            )),
        }
    }

    async fn send_cosmos(&self, execute: WasmExecute) -> Result<String, Error> {
        match &self.signer {
            ActiveSigner::CosmosProvider(signer) => {
                let from = self
                    .address
                    .as_deref()
                    .ok_or_else(|| Error::Session("No active account".to_string()))?;
                signer.sign_and_broadcast(from, execute).await
            }
            ActiveSigner::Internal(wallet) => {
                let wasm = self
                    .wasm_client
                    .as_ref()
                    .ok_or_else(|| Error::Session("Cosmos client not initialized".to_string()))?;
                wasm.execute(wallet, &execute.contract, &execute.msg, execute.funds, None)
                    .await
            }
            ActiveSigner::EvmProvider(_) | ActiveSigner::None => Err(Error::Session(
                "No Cosmos signer active".to_string(),
            )),
        }
    }

    fn install_evm_clients(&mut self) -> Result<(), Error> {
        self.evm_client = Some(EvmClient::new(
            &self.network.evm_rpc_url,
            self.network.evm_chain_id,
        )?);
        Ok(())
    }

    fn install_wasm_client(&mut self) -> Result<(), Error> {
        self.wasm_client = Some(WasmClient::new(&self.network)?);
        Ok(())
    }
}

fn derive_evm_accounts(wallet: &BarukWallet) -> Result<Vec<String>, Error> {
    let mut accounts = Vec::with_capacity(INTERNAL_ACCOUNT_SET as usize);
    for index in 0..INTERNAL_ACCOUNT_SET {
        let sibling = wallet.derive_account(index)?;
        accounts.push(format!("{:?}", sibling.evm_address()?));
    }
    Ok(accounts)
}

fn derive_cosmos_accounts(wallet: &BarukWallet) -> Result<Vec<String>, Error> {
    let mut accounts = Vec::with_capacity(INTERNAL_ACCOUNT_SET as usize);
    for index in 0..INTERNAL_ACCOUNT_SET {
        let sibling = wallet.derive_account(index)?;
        accounts.push(sibling.cosmos_address()?.to_string());
    }
    Ok(accounts)
}

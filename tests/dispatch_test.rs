//! Contract dispatcher tests: resolution, chain-family checks, and routing
//! through the active signer.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use baruk_sdk::config::{ContractRole, ProtocolId, SeiNetworkConfig};
use baruk_sdk::dispatch::{ContractCall, ContractDispatcher};
use baruk_sdk::error::Error;
use baruk_sdk::protocols::baruk::contracts::swap_calldata;
use baruk_sdk::protocols::baruk::SwapParams;
use baruk_sdk::protocols::evm::EvmTransactionRequest;
use baruk_sdk::wallet::session::{ConnectRequest, ExternalEvmProvider, WalletSession};
use baruk_sdk::wallet::BarukWallet;

const TEST_MNEMONIC: &str =
    "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

fn network() -> SeiNetworkConfig {
    SeiNetworkConfig::load("sei-pacific").unwrap()
}

fn dispatcher() -> ContractDispatcher {
    ContractDispatcher::new(network().contracts).unwrap()
}

struct CapturingProvider {
    sign_calls: AtomicUsize,
    sent: Mutex<Option<EvmTransactionRequest>>,
}

impl CapturingProvider {
    fn new() -> Self {
        Self {
            sign_calls: AtomicUsize::new(0),
            sent: Mutex::new(None),
        }
    }
}

#[async_trait]
impl ExternalEvmProvider for CapturingProvider {
    async fn request_accounts(&self) -> Result<Vec<String>, Error> {
        Ok(vec!["0x9858EfFD232B4033E47d90003D41EC34EcaEda94".to_string()])
    }

    async fn chain_id(&self) -> Result<u64, Error> {
        Ok(1329)
    }

    async fn switch_chain(&self, _chain_id: u64) -> Result<(), Error> {
        Ok(())
    }

    async fn sign_and_send(
        &self,
        _from: &str,
        request: EvmTransactionRequest,
    ) -> Result<String, Error> {
        self.sign_calls.fetch_add(1, Ordering::SeqCst);
        *self.sent.lock().await = Some(request);
        Ok("0xfeedface".to_string())
    }
}

fn sample_swap() -> SwapParams {
    SwapParams {
        token_in: "0x3894085Ef7Ff0f0aeDf52E2A2704928d1Ec074F1".parse().unwrap(),
        token_out: "0xE30feDd158A2e3b13e9badaeABaFc5516e95e8C7".parse().unwrap(),
        amount_in: 1_000_000u64.try_into().unwrap(),
        min_amount_out: 990_000u64.try_into().unwrap(),
        recipient: "0x9858EfFD232B4033E47d90003D41EC34EcaEda94".parse().unwrap(),
        deadline: 1_999_999_999,
    }
}

#[tokio::test]
async fn unknown_role_errors_without_touching_the_signer() {
    let provider = Arc::new(CapturingProvider::new());
    let mut session = WalletSession::new(network());
    session
        .connect(ConnectRequest::EvmExternal(provider.clone()))
        .await
        .unwrap();

    // Vortex has no lending contract registered
    let err = dispatcher()
        .execute(
            &mut session,
            ProtocolId::Vortex,
            ContractRole::Lending,
            ContractCall::EvmCalldata {
                calldata: vec![0x00],
                value: Default::default(),
            },
        )
        .await
        .unwrap_err();

    let msg = err.to_string();
    assert!(msg.contains("lending"));
    assert!(msg.contains("vortex"));
    assert_eq!(provider.sign_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn chain_family_mismatch_is_rejected() {
    let wallet = Arc::new(BarukWallet::from_mnemonic(TEST_MNEMONIC, 0).unwrap());
    let mut session = WalletSession::new(network());
    session
        .connect(ConnectRequest::EvmInternal(wallet))
        .await
        .unwrap();

    // Astroport's pair contract lives on the Cosmos layer
    let err = dispatcher()
        .execute(
            &mut session,
            ProtocolId::Astroport,
            ContractRole::Pair,
            ContractCall::CosmosExecute {
                msg: serde_json::json!({ "swap": {} }),
                funds: vec![],
            },
        )
        .await
        .unwrap_err();

    assert!(err.to_string().contains("cosmos"));
    assert!(err.to_string().contains("evm"));
}

#[tokio::test]
async fn disconnected_session_cannot_dispatch() {
    let mut session = WalletSession::new(network());
    let err = dispatcher()
        .execute(
            &mut session,
            ProtocolId::Baruk,
            ContractRole::Router,
            ContractCall::EvmCalldata {
                calldata: vec![],
                value: Default::default(),
            },
        )
        .await
        .unwrap_err();
    assert!(err.to_string().contains("No wallet connected"));
}

#[tokio::test]
async fn evm_dispatch_routes_calldata_to_the_router() {
    let provider = Arc::new(CapturingProvider::new());
    let mut session = WalletSession::new(network());
    session
        .connect(ConnectRequest::EvmExternal(provider.clone()))
        .await
        .unwrap();

    let calldata = swap_calldata(&sample_swap());
    let selector = calldata[..4].to_vec();

    let hash = dispatcher()
        .execute(
            &mut session,
            ProtocolId::Baruk,
            ContractRole::Router,
            ContractCall::EvmCalldata {
                calldata,
                value: Default::default(),
            },
        )
        .await
        .unwrap();

    assert_eq!(hash, "0xfeedface");
    assert_eq!(provider.sign_calls.load(Ordering::SeqCst), 1);

    let sent = provider.sent.lock().await;
    let request = sent.as_ref().unwrap();
    // The transaction targets the registered router and carries the calldata
    let router = network()
        .contracts
        .get_address(ProtocolId::Baruk, ContractRole::Router)
        .unwrap()
        .to_string();
    assert_eq!(
        request.to.as_ref().unwrap().to_string().to_lowercase(),
        router.to_lowercase()
    );
    assert_eq!(&request.data[..4], selector.as_slice());
    assert_eq!(request.chain_id, 1329);
}

#[tokio::test]
async fn method_dispatch_validates_against_the_abi() {
    let provider = Arc::new(CapturingProvider::new());
    let mut session = WalletSession::new(network());
    session
        .connect(ConnectRequest::EvmExternal(provider.clone()))
        .await
        .unwrap();

    // Unknown method fails before any signing happens
    let err = dispatcher()
        .execute(
            &mut session,
            ProtocolId::Baruk,
            ContractRole::Router,
            ContractCall::EvmMethod {
                method: "rugPull".to_string(),
                args: vec![],
                value: Default::default(),
            },
        )
        .await
        .unwrap_err();
    assert!(err.to_string().contains("rugPull"));
    assert_eq!(provider.sign_calls.load(Ordering::SeqCst), 0);

    // A known method goes through with its selector prefixed
    let hash = dispatcher()
        .execute(
            &mut session,
            ProtocolId::Baruk,
            ContractRole::Router,
            ContractCall::EvmMethod {
                method: "swapExactTokensForTokens".to_string(),
                args: vec![0u8; 32],
                value: Default::default(),
            },
        )
        .await
        .unwrap();
    assert_eq!(hash, "0xfeedface");

    let sent = provider.sent.lock().await;
    assert_eq!(sent.as_ref().unwrap().data.len(), 4 + 32);
}

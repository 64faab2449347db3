//! Tool adapter tests: session handling and the wallet tool surface.
//!
//! Tools that read chain state need a live RPC endpoint and are exercised in
//! the wallet/dispatch tests through mocks instead.

use serde_json::json;

use baruk_sdk::config::SeiNetworkConfig;
use baruk_sdk::tools::ToolAdapter;
use baruk_sdk::wallet::WalletStore;

const TEST_MNEMONIC: &str =
    "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

fn adapter(store_dir: &std::path::Path) -> ToolAdapter {
    let network = SeiNetworkConfig::load("sei-pacific").unwrap();
    ToolAdapter::new(network)
        .unwrap()
        .with_wallet_store(WalletStore::with_dir(store_dir))
}

#[tokio::test]
async fn connect_status_switch_disconnect_round_trip() {
    let tmp = tempfile::tempdir().unwrap();
    let adapter = adapter(tmp.path());

    let connected = adapter
        .handle(
            "user-1",
            "connect_wallet",
            json!({ "kind": "evm-internal", "mnemonic": TEST_MNEMONIC }),
        )
        .await
        .unwrap();
    assert_eq!(connected["status"]["connected"], true);
    assert_eq!(connected["status"]["kind"], "evm-internal");
    assert_eq!(connected["status"]["chain"], "evm");
    assert_eq!(
        connected["status"]["address"]
            .as_str()
            .unwrap()
            .to_lowercase(),
        "0x9858effd232b4033e47d90003d41ec34ecaeda94"
    );

    let status = adapter
        .handle("user-1", "wallet_status", json!({}))
        .await
        .unwrap();
    assert_eq!(status["status"]["connected"], true);
    assert_eq!(status["risk_tolerance"], "balanced");

    let switched = adapter
        .handle("user-1", "switch_account", json!({ "index": 1 }))
        .await
        .unwrap();
    assert_eq!(switched["status"]["current_account_index"], 1);
    let accounts = switched["status"]["accounts"].as_array().unwrap();
    assert_eq!(
        switched["status"]["address"], accounts[1],
        "address follows the switched index"
    );

    let disconnected = adapter
        .handle("user-1", "disconnect_wallet", json!({}))
        .await
        .unwrap();
    assert_eq!(disconnected["status"]["connected"], false);
    assert!(disconnected["status"]["address"].is_null());
}

#[tokio::test]
async fn external_kinds_are_rejected_on_this_surface() {
    let tmp = tempfile::tempdir().unwrap();
    let adapter = adapter(tmp.path());

    let err = adapter
        .handle(
            "user-1",
            "connect_wallet",
            json!({ "kind": "evm-external" }),
        )
        .await
        .unwrap_err();
    assert!(err.to_string().contains("embedding application"));
}

#[tokio::test]
async fn named_wallet_is_generated_then_reloaded() {
    let tmp = tempfile::tempdir().unwrap();
    let adapter = adapter(tmp.path());

    let first = adapter
        .handle(
            "user-1",
            "connect_wallet",
            json!({ "kind": "cosmos-internal", "wallet_name": "main", "passphrase": "pw" }),
        )
        .await
        .unwrap();
    // New wallets surface their phrase exactly once
    let phrase = first["generated_mnemonic"].as_str().unwrap().to_string();
    assert_eq!(phrase.split_whitespace().count(), 12);
    let address = first["status"]["address"].as_str().unwrap().to_string();
    assert!(address.starts_with("sei1"));

    let second = adapter
        .handle(
            "user-2",
            "connect_wallet",
            json!({ "kind": "cosmos-internal", "wallet_name": "main", "passphrase": "pw" }),
        )
        .await
        .unwrap();
    // Reloaded from the store: same address, no phrase in the response
    assert_eq!(second["status"]["address"], address.as_str());
    assert!(second.get("generated_mnemonic").is_none());
}

#[tokio::test]
async fn wrong_passphrase_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    let adapter = adapter(tmp.path());

    adapter
        .handle(
            "user-1",
            "connect_wallet",
            json!({ "kind": "evm-internal", "wallet_name": "main", "passphrase": "pw" }),
        )
        .await
        .unwrap();

    let err = adapter
        .handle(
            "user-2",
            "connect_wallet",
            json!({ "kind": "evm-internal", "wallet_name": "main", "passphrase": "wrong" }),
        )
        .await
        .unwrap_err();
    assert!(err.to_string().contains("wrong passphrase"));
}

#[tokio::test]
async fn unknown_tool_lists_the_available_tools() {
    let tmp = tempfile::tempdir().unwrap();
    let adapter = adapter(tmp.path());

    let err = adapter
        .handle("user-1", "moon_shot", json!({}))
        .await
        .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("moon_shot"));
    assert!(msg.contains("connect_wallet"));
    assert!(msg.contains("swap"));
}

#[tokio::test]
async fn preferences_update_risk_tolerance() {
    let tmp = tempfile::tempdir().unwrap();
    let adapter = adapter(tmp.path());

    let updated = adapter
        .handle(
            "user-1",
            "set_preferences",
            json!({
                "risk_tolerance": "aggressive",
                "preferences": { "slippage": "0.5" }
            }),
        )
        .await
        .unwrap();
    assert_eq!(updated["risk_tolerance"], "aggressive");
    assert_eq!(updated["preferences"]["slippage"], "0.5");

    let err = adapter
        .handle("user-1", "set_preferences", json!({ "risk_tolerance": "degen" }))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("degen"));
}

#[tokio::test]
async fn sessions_are_created_per_user_and_bounded() {
    let tmp = tempfile::tempdir().unwrap();
    let network = SeiNetworkConfig::load("sei-pacific").unwrap();
    let adapter = ToolAdapter::new(network)
        .unwrap()
        .with_wallet_store(WalletStore::with_dir(tmp.path()))
        .with_max_sessions(2);

    for user in ["a", "b", "c"] {
        adapter
            .handle(user, "wallet_status", json!({}))
            .await
            .unwrap();
    }

    // The longest-idle session was evicted to hold the bound
    assert_eq!(adapter.session_count().await, 2);
}

#[tokio::test]
async fn trade_tools_require_a_connected_wallet() {
    let tmp = tempfile::tempdir().unwrap();
    let adapter = adapter(tmp.path());

    let err = adapter
        .handle(
            "user-1",
            "swap",
            json!({
                "token_in": "0x3894085Ef7Ff0f0aeDf52E2A2704928d1Ec074F1",
                "token_out": "0xE30feDd158A2e3b13e9badaeABaFc5516e95e8C7",
                "amount_in": "1000000",
                "min_amount_out": "990000"
            }),
        )
        .await
        .unwrap_err();
    assert!(err.to_string().contains("No wallet connected"));
}

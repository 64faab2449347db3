//! HTTP route tests against an in-process server.

#![cfg(feature = "server")]

use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;

use baruk_sdk::config::SeiNetworkConfig;
use baruk_sdk::server::{router, AppState};
use baruk_sdk::tools::ToolAdapter;
use baruk_sdk::wallet::WalletStore;

const TEST_MNEMONIC: &str =
    "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

async fn spawn_server(store_dir: &std::path::Path) -> SocketAddr {
    let network = SeiNetworkConfig::load("sei-pacific").unwrap();
    let adapter = ToolAdapter::new(network)
        .unwrap()
        .with_wallet_store(WalletStore::with_dir(store_dir));
    let state = AppState {
        adapter: Arc::new(adapter),
    };
    let app = router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn health_reports_network_and_sessions() {
    let tmp = tempfile::tempdir().unwrap();
    let addr = spawn_server(tmp.path()).await;

    let body: Value = reqwest::get(format!("http://{}/health", addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], "ok");
    assert_eq!(body["network"], "sei-pacific");
    assert_eq!(body["sessions"], 0);
}

#[tokio::test]
async fn wallet_route_drives_the_session_lifecycle() {
    let tmp = tempfile::tempdir().unwrap();
    let addr = spawn_server(tmp.path()).await;
    let client = reqwest::Client::new();
    let url = format!("http://{}/api/wallet", addr);

    let connected: Value = client
        .post(&url)
        .json(&json!({
            "user_id": "u1",
            "action": "connect",
            "params": { "kind": "evm-internal", "mnemonic": TEST_MNEMONIC }
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(connected["status"]["connected"], true);

    let status: Value = client
        .post(&url)
        .json(&json!({ "user_id": "u1", "action": "status" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["status"]["kind"], "evm-internal");

    let disconnected: Value = client
        .post(&url)
        .json(&json!({ "user_id": "u1", "action": "disconnect" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(disconnected["status"]["connected"], false);
}

#[tokio::test]
async fn unknown_wallet_action_is_a_bad_request() {
    let tmp = tempfile::tempdir().unwrap();
    let addr = spawn_server(tmp.path()).await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/api/wallet", addr))
        .json(&json!({ "action": "teleport" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("teleport"));
}

#[tokio::test]
async fn chat_route_dispatches_tools_and_propagates_errors() {
    let tmp = tempfile::tempdir().unwrap();
    let addr = spawn_server(tmp.path()).await;
    let client = reqwest::Client::new();
    let url = format!("http://{}/api/chat", addr);

    let status: Value = client
        .post(&url)
        .json(&json!({ "user_id": "u1", "tool": "wallet_status", "params": {} }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["tool"], "wallet_status");
    assert_eq!(status["result"]["status"]["connected"], false);

    // Unknown tools surface as errors, never as synthetic successes
    let response = client
        .post(&url)
        .json(&json!({ "user_id": "u1", "tool": "force_swap_success", "params": {} }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
}

//! HTTP service.
//!
//! The routes the Baruk front end consumes: `/api/wallet` for the session
//! lifecycle, `/api/chat` as the tool-dispatch surface behind the
//! conversational agent, and `/api/prices` for token price lookups. Polling
//! tasks mirror the front end's refresh cadence: balances every 10s, prices
//! every 30s.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::error::Error;
use crate::tools::ToolAdapter;

/// Balance refresh cadence for connected sessions
pub const BALANCE_REFRESH_INTERVAL: Duration = Duration::from_secs(10);

/// Price cache refresh cadence
pub const PRICE_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Fallback user id for requests that do not carry one
const ANONYMOUS_USER: &str = "anonymous";

/// Shared server state
#[derive(Clone)]
pub struct AppState {
    pub adapter: Arc<ToolAdapter>,
}

/// API error wrapper mapping SDK errors onto HTTP statuses
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::Session(_)
            | Error::NotSupported(_)
            | Error::Wallet(_)
            | Error::Dispatch(_)
            | Error::Serialization(_) => StatusCode::BAD_REQUEST,
            Error::Rpc(_) | Error::Http(_) | Error::Contract(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        error!(status = %status, error = %self.0, "Request failed");
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct WalletRequest {
    user_id: Option<String>,
    action: String,
    #[serde(default)]
    params: Value,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    user_id: Option<String>,
    tool: String,
    #[serde(default)]
    params: Value,
}

#[derive(Debug, Deserialize)]
struct PricesRequest {
    addresses: Vec<String>,
}

/// Build the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/wallet", post(wallet))
        .route("/api/chat", post(chat))
        .route("/api/prices", post(prices))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "network": state.adapter.network().network_name,
        "sessions": state.adapter.session_count().await,
    }))
}

async fn wallet(
    State(state): State<AppState>,
    Json(request): Json<WalletRequest>,
) -> Result<Json<Value>, ApiError> {
    let user_id = request.user_id.as_deref().unwrap_or(ANONYMOUS_USER);
    let tool = match request.action.as_str() {
        "connect" => "connect_wallet",
        "disconnect" => "disconnect_wallet",
        "status" => "wallet_status",
        "switch_account" => "switch_account",
        other => {
            return Err(Error::Session(format!(
                "Unknown wallet action '{}'. Known actions: [connect, disconnect, status, switch_account]",
                other
            ))
            .into())
        }
    };
    let result = state.adapter.handle(user_id, tool, request.params).await?;
    Ok(Json(result))
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<Value>, ApiError> {
    let user_id = request.user_id.as_deref().unwrap_or(ANONYMOUS_USER);
    let result = state
        .adapter
        .handle(user_id, &request.tool, request.params)
        .await?;
    Ok(Json(json!({ "tool": request.tool, "result": result })))
}

async fn prices(
    State(state): State<AppState>,
    Json(request): Json<PricesRequest>,
) -> Result<Json<Value>, ApiError> {
    let prices = state.adapter.oracle().get_prices(&request.addresses).await;
    Ok(Json(json!({ "prices": prices })))
}

/// Spawn the background refresh tasks, returning their handles
pub fn spawn_pollers(state: &AppState) -> Vec<JoinHandle<()>> {
    let balance_adapter = state.adapter.clone();
    let balance_task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(BALANCE_REFRESH_INTERVAL);
        loop {
            interval.tick().await;
            balance_adapter.refresh_balances().await;
        }
    });

    let price_adapter = state.adapter.clone();
    let price_task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(PRICE_REFRESH_INTERVAL);
        loop {
            interval.tick().await;
            price_adapter.oracle().refresh().await;
        }
    });

    vec![balance_task, price_task]
}

/// Serve the API on the given address until shutdown
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<(), Error> {
    let pollers = spawn_pollers(&state);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Http(format!("Failed to bind {}: {}", addr, e)))?;
    info!(%addr, "Baruk API listening");

    let result = axum::serve(listener, app)
        .await
        .map_err(|e| Error::Http(format!("Server error: {}", e)));

    for poller in pollers {
        poller.abort();
    }
    result
}

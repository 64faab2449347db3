//! Crate-wide error type.
//!
//! Every module maps external failures into a single [`Error`] enum whose
//! variants each carry a human-readable message string.

/// The unified error type returned throughout the SDK.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration loading, parsing, or validation failure.
    #[error("config error: {0}")]
    Config(String),

    /// Contract interaction failure (encode/decode/execute).
    #[error("contract error: {0}")]
    Contract(String),

    /// Contract dispatch / routing failure.
    #[error("dispatch error: {0}")]
    Dispatch(String),

    /// EVM-layer failure.
    #[error("evm error: {0}")]
    Evm(String),

    /// Gas estimation failure.
    #[error("gas estimation error: {0}")]
    GasEstimationError(String),

    /// HTTP server / transport failure.
    #[error("http error: {0}")]
    Http(String),

    /// Requested entity was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Requested operation is not supported.
    #[error("not supported: {0}")]
    NotSupported(String),

    /// RPC call failure.
    #[error("rpc error: {0}")]
    Rpc(String),

    /// RPC error (provider-reported).
    #[error("rpc error: {0}")]
    RpcError(String),

    /// Serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Wallet session failure.
    #[error("session error: {0}")]
    Session(String),

    /// Transaction submission failure.
    #[error("transaction error: {0}")]
    TransactionError(String),

    /// Wallet failure.
    #[error("wallet error: {0}")]
    Wallet(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

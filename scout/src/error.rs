//! Unified error types for the scout service.

use thiserror::Error;

/// Top-level error type for the application.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file could not be resolved, read, parsed, or validated.
    #[error("config: {0}")]
    Config(String),

    /// Requested chain identifier is not in the configured chain table.
    #[error("unsupported chain: {0}")]
    UnsupportedChain(String),

    /// RPC client construction failed.
    #[error("chain: {0}")]
    Chain(String),

    /// Upstream JSON-RPC request failed (transport or error response).
    #[error("rpc: {0}")]
    Rpc(String),

    /// Server bind or runtime error.
    #[error("server: {0}")]
    Server(String),
}

impl Error {
    /// Configuration error from a plain message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Configuration error wrapping an underlying cause.
    pub fn config_with(msg: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::Config(format!("{}: {cause}", msg.into()))
    }

    /// Chain error from a plain message.
    pub fn chain(msg: impl Into<String>) -> Self {
        Self::Chain(msg.into())
    }

    /// RPC error from a plain message.
    pub fn rpc(msg: impl Into<String>) -> Self {
        Self::Rpc(msg.into())
    }

    /// RPC error wrapping an underlying cause.
    pub fn rpc_with(msg: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::Rpc(format!("{}: {cause}", msg.into()))
    }
}

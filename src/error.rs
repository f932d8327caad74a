use thiserror::Error;

/// Failures surfaced by the chain client and name resolver.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("invalid RPC url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("failed to connect to chain: {0}")]
    Connect(String),
    #[error("rpc call failed: {0}")]
    Rpc(String),
    #[error("rpc call timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("name not found: {0}")]
    NotFound(String),
}

impl ChainError {
    pub fn rpc(err: impl std::fmt::Display) -> Self {
        Self::Rpc(err.to_string())
    }
}

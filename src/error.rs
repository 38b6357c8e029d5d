use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("operation cancelled")]
    Cancelled,
    #[error("invalid peer address: {0}")]
    InvalidPeerAddress(String),
    #[error("peer {peer} unavailable - Reason: {reason}")]
    Peer { peer: String, reason: String },
    #[error("configuration error: {0}")]
    Config(String),
    #[error("internal error: {0}")]
    Internal(String),
}

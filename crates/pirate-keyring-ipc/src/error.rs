//! Error types

use crate::controller::ConnectionId;

/// Keyring IPC errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Peer went away while the handle was open
    #[error("Connection lost: {0}")]
    ConnectionLost(ConnectionId),

    /// Handle was closed locally
    #[error("Keyring handle is closed")]
    Closed,

    /// Auto-lock duration outside the accepted range
    #[error("Invalid auto-lock duration: {0} minutes")]
    InvalidAutoLockMinutes(u32),

    /// Service-side failure
    #[error("Keyring service error: {0}")]
    Service(String),
}

impl Error {
    /// Connection the error belongs to, if any
    pub fn connection(&self) -> Option<ConnectionId> {
        match self {
            Self::ConnectionLost(id) => Some(*id),
            _ => None,
        }
    }
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;

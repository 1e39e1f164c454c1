//! Error types

/// Settings errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Keyring error
    #[error("Keyring error: {0}")]
    Keyring(#[from] pirate_keyring_ipc::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;

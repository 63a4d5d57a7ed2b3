//! Error types for vault operations

use thiserror::Error;

/// Errors that can occur during vault operations
#[derive(Error, Debug)]
pub enum VaultError {
    /// Load-time failure. Wrong passphrase, corrupted file, and truncated
    /// file are deliberately indistinguishable in this signal.
    #[error("failed to unlock vault")]
    UnlockFailed,

    #[error("vault is closed")]
    VaultClosed,

    #[error("key derivation error: {0}")]
    KeyDerivation(String),

    #[error("encryption error: {0}")]
    Encryption(String),

    #[error("decryption failed - wrong passphrase or corrupted data")]
    DecryptionFailed,

    #[error("malformed vault data: {0}")]
    InvalidFormat(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type VaultResult<T> = Result<T, VaultError>;

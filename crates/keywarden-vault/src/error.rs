//! Vault error types for `keywarden-vault`.

use keywarden_crypto_core::CryptoError;
use thiserror::Error;

/// Errors produced by vault session operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// AES-GCM tag verification failed. Wrong key and corrupted data are
    /// deliberately not distinguished.
    #[error("incorrect password or corrupted data")]
    AuthenticationFailure,

    /// Entry operation attempted without a vault key in memory.
    #[error("vault is locked: unlock the vault first")]
    Locked,

    /// Setup or unlock attempted while a vault key is already held.
    #[error("vault is already unlocked")]
    AlreadyUnlocked,

    /// Caller-supplied parameters cannot be satisfied.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The stored profile is malformed (bad salt, bad envelope, bad key payload).
    #[error("corrupt vault profile: {0}")]
    CorruptProfile(String),

    /// A stored entry record is malformed (bad encoding, bad IV, bad JSON).
    #[error("corrupt entry record: {0}")]
    CorruptRecord(String),

    /// Configuration file could not be parsed or written.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error from the filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Unrecoverable cryptographic fault (CSPRNG or primitive unavailable).
    #[error(transparent)]
    Crypto(CryptoError),
}

impl From<CryptoError> for VaultError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::Decryption => Self::AuthenticationFailure,
            CryptoError::InvalidConfiguration(msg) => Self::InvalidConfiguration(msg),
            other => Self::Crypto(other),
        }
    }
}

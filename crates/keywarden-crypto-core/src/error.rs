//! Cryptographic error types for `keywarden-crypto-core`.

use thiserror::Error;

/// Errors produced by cryptographic operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key derivation failed (bad salt length, zero iterations).
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// Symmetric encryption failure (AES-256-GCM key setup or sealing).
    #[error("encryption error: {0}")]
    Encryption(String),

    /// Authentication tag verification failed.
    ///
    /// Wrong key, tampered ciphertext and corrupted IV are indistinguishable.
    #[error("decryption failed: authentication tag mismatch")]
    Decryption,

    /// Invalid key material (wrong length, corrupted bytes).
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),

    /// Base64 text could not be decoded.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// A persisted envelope has the wrong shape (IV length, truncated ciphertext).
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// The operating system CSPRNG could not produce bytes. Fatal.
    #[error("secure randomness unavailable: {0}")]
    RandomnessUnavailable(String),

    /// Secure memory allocation failure.
    #[error("secure memory error: {0}")]
    SecureMemory(String),

    /// Caller supplied parameters that cannot be satisfied (e.g. no charset enabled).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

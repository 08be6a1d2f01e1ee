//! Vault key generation and envelope wrapping.
//!
//! This module provides:
//! - [`generate_vault_key`]: a fresh random 256-bit data-encryption key
//! - [`export_vault_key`] / [`import_vault_key`]: raw-byte round trip
//! - [`wrap_vault_key`]: seal a vault key under a [`MasterKey`]
//! - [`unwrap_vault_key`]: recover a vault key from its [`WrappedVaultKey`]
//!
//! # Key hierarchy
//!
//! ```text
//! password + pepper ──PBKDF2──► Master Key ──wraps──► Vault Key ──encrypts──► entries
//! ```
//!
//! The wrapped payload is the base64 text of the raw key, not the raw bytes,
//! so profiles created by the browser client unwrap here unchanged.

use std::fmt;

use crate::encoding;
use crate::error::CryptoError;
use crate::kdf::MasterKey;
use crate::memory::{SecretBuffer, SecretBytes};
use crate::symmetric::{EncryptedEnvelope, SealedData, SymmetricKey, KEY_LEN};

/// Vault key length in bytes (256 bits).
pub const VAULT_KEY_LEN: usize = KEY_LEN;

/// Persisted, master-key-encrypted form of a [`VaultKey`].
pub type WrappedVaultKey = EncryptedEnvelope;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The data-encryption key for every entry in a vault.
///
/// Zeroized on drop. Unlike [`MasterKey`], it may be exported, which is
/// what allows it to be wrapped for storage.
pub struct VaultKey {
    key: SymmetricKey,
}

impl VaultKey {
    /// Encrypt an entry payload.
    ///
    /// # Errors
    ///
    /// See [`crate::symmetric::encrypt`].
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<SealedData, CryptoError> {
        self.key.encrypt(plaintext, &[])
    }

    /// Decrypt an entry payload.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::Decryption`] if the payload was not sealed
    /// under this key or was modified.
    pub fn decrypt(&self, sealed: &SealedData) -> Result<SecretBuffer, CryptoError> {
        self.key.decrypt(sealed, &[])
    }
}

impl fmt::Debug for VaultKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VaultKey(***)")
    }
}

// ---------------------------------------------------------------------------
// Key management
// ---------------------------------------------------------------------------

/// Generate a new random vault key.
///
/// # Errors
///
/// Returns [`CryptoError::RandomnessUnavailable`] if the CSPRNG fails.
pub fn generate_vault_key() -> Result<VaultKey, CryptoError> {
    Ok(VaultKey {
        key: SymmetricKey::generate()?,
    })
}

/// Export the raw 32 key bytes.
///
/// # Errors
///
/// Returns [`CryptoError::SecureMemory`] if the output buffer cannot be built.
pub fn export_vault_key(key: &VaultKey) -> Result<SecretBuffer, CryptoError> {
    SecretBuffer::new(key.key.expose())
}

/// Import a vault key from raw bytes.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidKeyMaterial`] if `raw` is not exactly 32 bytes.
pub fn import_vault_key(raw: &[u8]) -> Result<VaultKey, CryptoError> {
    let bytes = SecretBytes::<VAULT_KEY_LEN>::from_slice(raw).map_err(|_| {
        CryptoError::InvalidKeyMaterial(format!(
            "vault key must be {VAULT_KEY_LEN} bytes, got {}",
            raw.len()
        ))
    })?;
    Ok(VaultKey {
        key: SymmetricKey::from_secret(bytes),
    })
}

/// Wrap `vault_key` under `master_key`.
///
/// Exports the key, base64-encodes it, and seals the text with AES-256-GCM.
/// Each call uses a fresh IV, so wrapping the same key twice yields
/// different envelopes.
///
/// # Errors
///
/// Propagates CSPRNG or AEAD failures from [`crate::symmetric::encrypt`].
pub fn wrap_vault_key(
    vault_key: &VaultKey,
    master_key: &MasterKey,
) -> Result<WrappedVaultKey, CryptoError> {
    let raw = export_vault_key(vault_key)?;
    let text = encoding::encode_secret(raw.expose());
    let sealed = master_key.encrypt(text.expose())?;
    Ok(EncryptedEnvelope::from_sealed(&sealed))
}

/// Recover a vault key from its wrapped form.
///
/// # Errors
///
/// - [`CryptoError::Encoding`] / [`CryptoError::MalformedEnvelope`] if the
///   envelope itself is malformed
/// - [`CryptoError::Decryption`] if `master_key` is wrong or the envelope
///   was tampered with (the wrong-password signal, passed through unchanged)
/// - [`CryptoError::Encoding`] / [`CryptoError::InvalidKeyMaterial`] if the
///   authenticated payload is not base64 of a 32-byte key
pub fn unwrap_vault_key(
    wrapped: &WrappedVaultKey,
    master_key: &MasterKey,
) -> Result<VaultKey, CryptoError> {
    let sealed = wrapped.to_sealed()?;
    let text = master_key.decrypt(&sealed)?;
    let raw = encoding::decode_secret(text.expose())?;
    import_vault_key(raw.expose())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

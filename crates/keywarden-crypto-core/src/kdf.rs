//! PBKDF2-HMAC-SHA256 master key derivation.
//!
//! This module provides:
//! - [`derive_master_key`]: derive a 256-bit [`MasterKey`] from password bytes,
//!   a 16-byte salt and an iteration count
//! - [`generate_salt`]: a fresh random 16-byte salt
//! - [`MasterKey`]: key handle that can wrap/unwrap but never be exported
//!
//! Derivation is deterministic: the same inputs always yield the same key,
//! which is what makes unlock possible. It is also deliberately slow
//! (hundreds of milliseconds at the default work factor); callers on a
//! latency-sensitive thread should hand it to a blocking worker.

use std::fmt;

use sha2::Sha256;
use zeroize::Zeroize;

use crate::error::CryptoError;
use crate::memory::{SecretBuffer, SecretBytes};
use crate::random;
use crate::symmetric::{SealedData, SymmetricKey, KEY_LEN};

/// Salt length in bytes. Fixed for the lifetime of every vault.
pub const SALT_LEN: usize = 16;

/// Default PBKDF2 work factor.
pub const DEFAULT_ITERATIONS: u32 = 250_000;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Key derived from the (peppered) master password.
///
/// Used only to wrap and unwrap the vault key, then dropped. There is no
/// way to get its bytes back out.
pub struct MasterKey {
    key: SymmetricKey,
}

impl MasterKey {
    /// Encrypt `plaintext` under the master key.
    ///
    /// # Errors
    ///
    /// See [`crate::symmetric::encrypt`].
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<SealedData, CryptoError> {
        self.key.encrypt(plaintext, &[])
    }

    /// Decrypt a payload sealed under the master key.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::Decryption`] if the key does not match.
    pub fn decrypt(&self, sealed: &SealedData) -> Result<SecretBuffer, CryptoError> {
        self.key.decrypt(sealed, &[])
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterKey(***)")
    }
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// A fresh random salt for a new vault.
///
/// # Errors
///
/// Returns [`CryptoError::RandomnessUnavailable`] if the CSPRNG fails.
pub fn generate_salt() -> Result<[u8; SALT_LEN], CryptoError> {
    random::random_array()
}

/// Derive a [`MasterKey`] with PBKDF2-HMAC-SHA256.
///
/// `password` is the already-peppered password bytes. Any length is
/// accepted, including empty; strength policy belongs to the caller.
///
/// # Errors
///
/// Returns [`CryptoError::KeyDerivation`] if the salt is not exactly
/// [`SALT_LEN`] bytes or `iterations` is zero.
pub fn derive_master_key(
    password: &[u8],
    salt: &[u8],
    iterations: u32,
) -> Result<MasterKey, CryptoError> {
    if salt.len() != SALT_LEN {
        return Err(CryptoError::KeyDerivation(format!(
            "salt must be {SALT_LEN} bytes, got {}",
            salt.len()
        )));
    }
    if iterations == 0 {
        return Err(CryptoError::KeyDerivation(
            "iteration count must be at least 1".into(),
        ));
    }

    let mut output = [0u8; KEY_LEN];
    pbkdf2_sha256(password, salt, iterations, &mut output);
    let key = SecretBytes::new(output);
    output.zeroize();

    Ok(MasterKey {
        key: SymmetricKey::from_secret(key),
    })
}

fn pbkdf2_sha256(password: &[u8], salt: &[u8], iterations: u32, out: &mut [u8]) {
    pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, iterations, out);
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

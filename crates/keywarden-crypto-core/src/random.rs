//! Secure random byte generation backed by the operating system CSPRNG.
//!
//! Every other module that needs randomness (IVs, salts, vault keys,
//! password characters) draws it through here or through `OsRng` directly.
//! A CSPRNG failure is reported as [`CryptoError::RandomnessUnavailable`]
//! and is never retried.

use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::CryptoError;

/// Fill `buf` with cryptographically secure random bytes.
///
/// # Errors
///
/// Returns [`CryptoError::RandomnessUnavailable`] if the OS CSPRNG fails.
pub fn fill_random(buf: &mut [u8]) -> Result<(), CryptoError> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| CryptoError::RandomnessUnavailable(format!("CSPRNG fill failed: {e}")))
}

/// Return `n` cryptographically secure random bytes.
///
/// # Errors
///
/// Returns [`CryptoError::RandomnessUnavailable`] if the OS CSPRNG fails.
pub fn random_bytes(n: usize) -> Result<Vec<u8>, CryptoError> {
    let mut out = vec![0u8; n];
    fill_random(&mut out)?;
    Ok(out)
}

/// Return a random fixed-size array (salts, IVs).
///
/// # Errors
///
/// Returns [`CryptoError::RandomnessUnavailable`] if the OS CSPRNG fails.
pub fn random_array<const N: usize>() -> Result<[u8; N], CryptoError> {
    let mut out = [0u8; N];
    fill_random(&mut out)?;
    Ok(out)
}

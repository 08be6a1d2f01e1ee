//! Base64 text encoding for salts, IVs, ciphertext and wrapped keys.
//!
//! Uses standard padded base64 (RFC 4648 §4), the alphabet produced by
//! `btoa` in browsers, so records written by the web client round-trip.

use data_encoding::{BASE64, HEXLOWER};
use ring::digest;
use zeroize::Zeroize;

use crate::error::CryptoError;
use crate::memory::SecretBuffer;

/// Encode bytes as padded base64.
#[must_use]
pub fn encode(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

/// Decode padded base64 text.
///
/// # Errors
///
/// Returns [`CryptoError::Encoding`] if `text` is not valid base64.
pub fn decode(text: &str) -> Result<Vec<u8>, CryptoError> {
    BASE64
        .decode(text.as_bytes())
        .map_err(|e| CryptoError::Encoding(format!("invalid base64: {e}")))
}

/// Encode secret bytes (raw key material) into base64 held in a [`SecretBuffer`].
#[must_use]
pub fn encode_secret(bytes: &[u8]) -> SecretBuffer {
    let mut out = vec![0u8; BASE64.encode_len(bytes.len())];
    BASE64.encode_mut(bytes, &mut out);
    SecretBuffer::from_vec(out)
}

/// Decode base64 text that carries secret bytes, keeping the result in a
/// [`SecretBuffer`]. The scratch buffer is zeroized on every path.
///
/// # Errors
///
/// Returns [`CryptoError::Encoding`] if `text` is not valid base64.
pub fn decode_secret(text: &[u8]) -> Result<SecretBuffer, CryptoError> {
    let max_len = BASE64
        .decode_len(text.len())
        .map_err(|e| CryptoError::Encoding(format!("invalid base64 length: {e}")))?;
    let mut scratch = vec![0u8; max_len];
    let written = match BASE64.decode_mut(text, &mut scratch) {
        Ok(n) => n,
        Err(partial) => {
            scratch.zeroize();
            return Err(CryptoError::Encoding(format!(
                "invalid base64: {}",
                partial.error
            )));
        }
    };
    let result = SecretBuffer::new(scratch.get(..written).unwrap_or_default());
    scratch.zeroize();
    result
}

/// Lowercase hex SHA-256 digest of `data`.
///
/// For non-secret verification values only; never use it to derive keys.
#[must_use]
pub fn sha256_hex(data: &[u8]) -> String {
    HEXLOWER.encode(digest::digest(&digest::SHA256, data).as_ref())
}

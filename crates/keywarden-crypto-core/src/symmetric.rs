//! AES-256-GCM authenticated encryption.
//!
//! This module provides:
//! - [`SymmetricKey`]: opaque 256-bit key handle that can encrypt and decrypt
//! - [`encrypt`] / [`decrypt`]: seal and open payloads under a fresh random IV
//! - [`SealedData`]: IV + ciphertext-with-tag, in binary form
//! - [`EncryptedEnvelope`]: the base64 form persisted by the profile and entry stores
//!
//! # Ciphertext layout
//!
//! Ciphertext carries its 16-byte authentication tag appended at the end
//! (`ct || tag`), the WebCrypto convention, so envelopes produced by the
//! browser client decrypt here unchanged.

use std::fmt;

use ring::aead;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::encoding;
use crate::error::CryptoError;
use crate::memory::{SecretBuffer, SecretBytes};
use crate::random;

/// AES-256-GCM IV length in bytes (96 bits).
pub const IV_LEN: usize = 12;

/// AES-256-GCM authentication tag length in bytes (128 bits).
pub const TAG_LEN: usize = 16;

/// AES-256-GCM key length in bytes (256 bits).
pub const KEY_LEN: usize = 32;

/// Minimum binary length: IV + empty ciphertext + tag.
const MIN_SEALED_LEN: usize = IV_LEN + TAG_LEN;

// ---------------------------------------------------------------------------
// Key handle
// ---------------------------------------------------------------------------

/// A 256-bit AES-GCM key.
///
/// The raw bytes never leave this crate through this type; extraction is a
/// separate capability granted only to vault keys
/// (see [`crate::vault_key::export_vault_key`]).
pub struct SymmetricKey {
    bytes: SecretBytes<KEY_LEN>,
}

impl SymmetricKey {
    /// Wrap existing key material.
    #[must_use]
    pub fn from_secret(bytes: SecretBytes<KEY_LEN>) -> Self {
        Self { bytes }
    }

    /// A fresh random key.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::RandomnessUnavailable`] if the CSPRNG fails.
    pub fn generate() -> Result<Self, CryptoError> {
        Ok(Self::from_secret(SecretBytes::random()?))
    }

    pub(crate) const fn expose(&self) -> &[u8; KEY_LEN] {
        self.bytes.expose()
    }

    fn aead_key(&self) -> Result<aead::LessSafeKey, CryptoError> {
        let unbound = aead::UnboundKey::new(&aead::AES_256_GCM, self.expose())
            .map_err(|_| CryptoError::Encryption("failed to create AES-256-GCM key".into()))?;
        Ok(aead::LessSafeKey::new(unbound))
    }

    /// Encrypt `plaintext` under this key. See [`encrypt`].
    ///
    /// # Errors
    ///
    /// See [`encrypt`].
    pub fn encrypt(&self, plaintext: &[u8], aad: &[u8]) -> Result<SealedData, CryptoError> {
        encrypt(plaintext, self, aad)
    }

    /// Decrypt `sealed` under this key. See [`decrypt`].
    ///
    /// # Errors
    ///
    /// See [`decrypt`].
    pub fn decrypt(&self, sealed: &SealedData, aad: &[u8]) -> Result<SecretBuffer, CryptoError> {
        decrypt(sealed, self, aad)
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SymmetricKey(***)")
    }
}

// ---------------------------------------------------------------------------
// Ciphertext containers
// ---------------------------------------------------------------------------

/// IV plus authenticated ciphertext (`ct || tag`).
///
/// Binary wire form: `iv (12 bytes) || ct || tag (16 bytes)`.
#[must_use = "encrypted data must be stored or transmitted"]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedData {
    /// 96-bit random IV, unique per encryption.
    pub nonce: [u8; IV_LEN],
    /// Ciphertext with the 16-byte tag appended.
    pub ciphertext: Vec<u8>,
}

impl SealedData {
    /// Serialize to `iv || ct || tag`.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(IV_LEN.saturating_add(self.ciphertext.len()));
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Parse `iv || ct || tag`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::MalformedEnvelope`] if the input is shorter than
    /// 28 bytes (IV + tag).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() < MIN_SEALED_LEN {
            return Err(CryptoError::MalformedEnvelope(format!(
                "sealed data too short: {} bytes (minimum {MIN_SEALED_LEN})",
                bytes.len()
            )));
        }
        let (iv, ciphertext) = bytes.split_at(IV_LEN);
        let mut nonce = [0u8; IV_LEN];
        nonce.copy_from_slice(iv);
        Ok(Self {
            nonce,
            ciphertext: ciphertext.to_vec(),
        })
    }
}

/// Base64 form of [`SealedData`], as persisted by external stores.
///
/// Also accepts the field names `ciphertext` / `iv` used by older records.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedEnvelope {
    /// Base64 of `ct || tag`.
    #[serde(alias = "ciphertext")]
    pub ciphertext_base64: String,
    /// Base64 of the 12-byte IV.
    #[serde(alias = "iv")]
    pub iv_base64: String,
}

impl EncryptedEnvelope {
    /// Base64-encode a [`SealedData`].
    #[must_use]
    pub fn from_sealed(sealed: &SealedData) -> Self {
        Self {
            ciphertext_base64: encoding::encode(&sealed.ciphertext),
            iv_base64: encoding::encode(&sealed.nonce),
        }
    }

    /// Decode back into [`SealedData`], validating lengths.
    ///
    /// # Errors
    ///
    /// - [`CryptoError::Encoding`] if either field is not valid base64
    /// - [`CryptoError::MalformedEnvelope`] if the IV is not 12 bytes or the
    ///   ciphertext is shorter than a tag
    pub fn to_sealed(&self) -> Result<SealedData, CryptoError> {
        let iv = encoding::decode(&self.iv_base64)?;
        let nonce: [u8; IV_LEN] = iv.as_slice().try_into().map_err(|_| {
            CryptoError::MalformedEnvelope(format!(
                "IV is {} bytes (expected {IV_LEN})",
                iv.len()
            ))
        })?;
        let ciphertext = encoding::decode(&self.ciphertext_base64)?;
        if ciphertext.len() < TAG_LEN {
            return Err(CryptoError::MalformedEnvelope(format!(
                "ciphertext is {} bytes (minimum {TAG_LEN})",
                ciphertext.len()
            )));
        }
        Ok(SealedData { nonce, ciphertext })
    }
}

impl From<&SealedData> for EncryptedEnvelope {
    fn from(sealed: &SealedData) -> Self {
        Self::from_sealed(sealed)
    }
}

// ---------------------------------------------------------------------------
// Core encryption
// ---------------------------------------------------------------------------

/// Encrypt `plaintext` with AES-256-GCM under a fresh random 96-bit IV.
///
/// `aad` is authenticated but not encrypted; pass `&[]` for none.
///
/// # Errors
///
/// - [`CryptoError::RandomnessUnavailable`] if no IV could be drawn
/// - [`CryptoError::Encryption`] if the AEAD primitive fails
pub fn encrypt(
    plaintext: &[u8],
    key: &SymmetricKey,
    aad: &[u8],
) -> Result<SealedData, CryptoError> {
    let aead_key = key.aead_key()?;

    let nonce_bytes: [u8; IV_LEN] = random::random_array()?;
    let nonce = aead::Nonce::assume_unique_for_key(nonce_bytes);

    let mut in_out = Vec::with_capacity(plaintext.len().saturating_add(TAG_LEN));
    in_out.extend_from_slice(plaintext);
    if aead_key
        .seal_in_place_append_tag(nonce, aead::Aad::from(aad), &mut in_out)
        .is_err()
    {
        in_out.zeroize();
        return Err(CryptoError::Encryption(
            "AES-256-GCM encryption failed".into(),
        ));
    }

    Ok(SealedData {
        nonce: nonce_bytes,
        ciphertext: in_out,
    })
}

/// Decrypt and authenticate `sealed`.
///
/// The plaintext comes back in a [`SecretBuffer`]; the working buffer is
/// zeroized on success and on failure.
///
/// # Errors
///
/// Returns [`CryptoError::Decryption`] if the tag does not verify: wrong key,
/// modified ciphertext, modified IV or mismatched AAD.
pub fn decrypt(
    sealed: &SealedData,
    key: &SymmetricKey,
    aad: &[u8],
) -> Result<SecretBuffer, CryptoError> {
    let aead_key = key.aead_key()?;
    let nonce = aead::Nonce::assume_unique_for_key(sealed.nonce);

    let mut in_out = sealed.ciphertext.clone();
    let result = match aead_key.open_in_place(nonce, aead::Aad::from(aad), &mut in_out) {
        Ok(plaintext) => SecretBuffer::new(plaintext),
        Err(_) => Err(CryptoError::Decryption),
    };
    in_out.zeroize();
    result
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

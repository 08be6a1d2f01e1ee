//! Vault entries and their encrypted record form.
//!
//! An [`Entry`] is plaintext and lives only in memory. It is serialized to
//! JSON, sealed under the vault key, and stored as an
//! [`EncryptedEntryRecord`] whose `id` and timestamps stay in the clear so
//! the store can index and sort without decrypting.

use std::fmt;

use chrono::{SecondsFormat, Utc};
use keywarden_crypto_core::{EncryptedEnvelope, SealedData};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::VaultError;

/// RFC 3339 UTC timestamp with millisecond precision, e.g.
/// `2024-05-01T12:30:00.123Z`.
pub(crate) fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// A fresh UUID v4 in hyphenated lowercase form.
pub(crate) fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// One stored credential. Every string is zeroized on drop.
///
/// `serde_json` round-trips create intermediate `String`s this type cannot
/// reach; the drop impl covers the struct's own lifetime, which is the one
/// that spans calls.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// UUID v4.
    pub id: String,
    /// Site or service, e.g. `example.com`.
    pub site: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub notes: String,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    /// RFC 3339 timestamp of the last encryption.
    pub updated_at: String,
}

impl Entry {
    /// A new entry with a fresh id and both timestamps set to now.
    #[must_use]
    pub fn new(
        site: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let now = now_rfc3339();
        Self {
            id: generate_id(),
            site: site.into(),
            username: username.into(),
            password: password.into(),
            notes: String::new(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("id", &self.id)
            .field("site", &self.site)
            .field("username", &self.username)
            .field("password", &"***")
            .field("notes", &self.notes.len())
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Encrypted record
// ---------------------------------------------------------------------------

/// Persisted form of an [`Entry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedEntryRecord {
    /// Same id as the entry inside.
    pub id: String,
    /// Base64 of `ct || tag`.
    pub encrypted_data: String,
    /// Base64 of the 12-byte IV.
    pub iv: String,
    pub created_at: String,
    pub updated_at: String,
}

impl EncryptedEntryRecord {
    pub(crate) fn seal(entry: &Entry, sealed: &SealedData) -> Self {
        let envelope = EncryptedEnvelope::from_sealed(sealed);
        Self {
            id: entry.id.clone(),
            encrypted_data: envelope.ciphertext_base64,
            iv: envelope.iv_base64,
            created_at: entry.created_at.clone(),
            updated_at: entry.updated_at.clone(),
        }
    }

    /// Decode the ciphertext and IV.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::CorruptRecord`] for invalid base64, an IV that is
    /// not 12 bytes, or a ciphertext shorter than the tag.
    pub fn sealed(&self) -> Result<SealedData, VaultError> {
        let envelope = EncryptedEnvelope {
            ciphertext_base64: self.encrypted_data.clone(),
            iv_base64: self.iv.clone(),
        };
        envelope
            .to_sealed()
            .map_err(|e| VaultError::CorruptRecord(format!("{}: {e}", self.id)))
    }

    /// Parse a record from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::CorruptRecord`] if the JSON is not a record.
    pub fn from_json_str(json: &str) -> Result<Self, VaultError> {
        serde_json::from_str(json).map_err(|e| VaultError::CorruptRecord(e.to_string()))
    }
}

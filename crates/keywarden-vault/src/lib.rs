//! `keywarden-vault`: Vault session for Keywarden.
//!
//! Owns the lock/unlock state machine, the vault configuration, and the
//! persisted profile and entry record formats. Storage is the caller's job:
//! this crate only produces and consumes the records.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod config;
pub mod error;
pub mod session;

pub mod entries;
pub mod profile;

pub use config::{VaultConfig, ALGORITHM, DEFAULT_PEPPER, KEY_LENGTH_BITS, MAX_ITERATIONS};
pub use entries::{EncryptedEntryRecord, Entry};
pub use error::VaultError;
pub use profile::UserVaultProfile;
pub use session::{SessionStatus, UnlockOutcome, VaultSession};

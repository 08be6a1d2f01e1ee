//! `keywarden-crypto-core`: Envelope key hierarchy and authenticated
//! encryption primitives for Keywarden.
//!
//! Zero network, zero async, zero storage. Everything a vault needs to turn
//! a master password into a key that can open its entries lives here.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod error;
pub mod memory;
pub mod random;

pub mod encoding;

pub mod kdf;
pub mod symmetric;

pub mod vault_key;

pub mod password;

pub use encoding::{decode, encode, sha256_hex};
pub use error::CryptoError;
pub use kdf::{derive_master_key, generate_salt, MasterKey, DEFAULT_ITERATIONS, SALT_LEN};
pub use memory::{disable_core_dumps, LockedRegion, SecretBuffer, SecretBytes};
pub use password::{
    generate_password, CharClasses, DEFAULT_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH,
};
pub use random::{fill_random, random_bytes};
pub use symmetric::{
    decrypt, encrypt, EncryptedEnvelope, SealedData, SymmetricKey, IV_LEN, KEY_LEN, TAG_LEN,
};
pub use vault_key::{
    export_vault_key, generate_vault_key, import_vault_key, unwrap_vault_key, wrap_vault_key,
    VaultKey, WrappedVaultKey, VAULT_KEY_LEN,
};

//! Vault configuration: pepper and PBKDF2 work factor.
//!
//! The algorithm, key, salt and IV sizes are recognized so a config file can
//! state them, but they are fixed: any other value is rejected, since changing
//! them would strand every wrapped key and entry already written.
//!
//! The pepper is not a secret. It is an application-wide constant whose only
//! job is to make the vault derivation input differ from the password the
//! identity provider sees.

use std::fs;
use std::path::Path;

use keywarden_crypto_core::{SecretBuffer, DEFAULT_ITERATIONS, IV_LEN, SALT_LEN};
use serde::{Deserialize, Serialize};

use crate::error::VaultError;

/// The only supported cipher.
pub const ALGORITHM: &str = "AES-GCM";

/// Key length in bits.
pub const KEY_LENGTH_BITS: u32 = 256;

/// Largest accepted PBKDF2 work factor, ten times the default.
///
/// Stored profiles above this are rejected before any derivation starts,
/// since PBKDF2 runs with the session lock held.
pub const MAX_ITERATIONS: u32 = 2_500_000;

/// Default application pepper.
pub const DEFAULT_PEPPER: &str = "keywarden-vault-pepper-v1";

/// Configuration consumed by [`crate::VaultSession`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultConfig {
    /// Appended to every master password before derivation.
    #[serde(default = "default_pepper")]
    pub pepper: String,

    /// PBKDF2 iteration count for new vaults.
    #[serde(default = "default_iterations")]
    pub pbkdf2_iterations: u32,

    /// Must be `"AES-GCM"`.
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// Must be 256.
    #[serde(default = "default_key_length")]
    pub key_length: u32,

    /// Must be 16.
    #[serde(default = "default_salt_length")]
    pub salt_length: usize,

    /// Must be 12.
    #[serde(default = "default_iv_length")]
    pub iv_length: usize,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            pepper: default_pepper(),
            pbkdf2_iterations: default_iterations(),
            algorithm: default_algorithm(),
            key_length: default_key_length(),
            salt_length: default_salt_length(),
            iv_length: default_iv_length(),
        }
    }
}

fn default_pepper() -> String {
    DEFAULT_PEPPER.into()
}
const fn default_iterations() -> u32 {
    DEFAULT_ITERATIONS
}
fn default_algorithm() -> String {
    ALGORITHM.into()
}
const fn default_key_length() -> u32 {
    KEY_LENGTH_BITS
}
const fn default_salt_length() -> usize {
    SALT_LEN
}
const fn default_iv_length() -> usize {
    IV_LEN
}

impl VaultConfig {
    /// Default config with a different work factor.
    #[must_use]
    pub fn with_iterations(iterations: u32) -> Self {
        Self {
            pbkdf2_iterations: iterations,
            ..Self::default()
        }
    }

    /// Check that the fixed parameters hold their only legal values.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvalidConfiguration`] naming the first bad field.
    pub fn validate(&self) -> Result<(), VaultError> {
        if !(1..=MAX_ITERATIONS).contains(&self.pbkdf2_iterations) {
            return Err(VaultError::InvalidConfiguration(format!(
                "pbkdf2Iterations must be between 1 and {MAX_ITERATIONS}, got {}",
                self.pbkdf2_iterations
            )));
        }
        if self.algorithm != ALGORITHM {
            return Err(VaultError::InvalidConfiguration(format!(
                "algorithm must be {ALGORITHM}, got {}",
                self.algorithm
            )));
        }
        if self.key_length != KEY_LENGTH_BITS {
            return Err(VaultError::InvalidConfiguration(format!(
                "keyLength must be {KEY_LENGTH_BITS}, got {}",
                self.key_length
            )));
        }
        if self.salt_length != SALT_LEN {
            return Err(VaultError::InvalidConfiguration(format!(
                "saltLength must be {SALT_LEN}, got {}",
                self.salt_length
            )));
        }
        if self.iv_length != IV_LEN {
            return Err(VaultError::InvalidConfiguration(format!(
                "ivLength must be {IV_LEN}, got {}",
                self.iv_length
            )));
        }
        Ok(())
    }

    /// `password || pepper`, assembled in a zeroizing buffer.
    #[must_use]
    pub fn pepper_password(&self, password: &str) -> SecretBuffer {
        SecretBuffer::concat(&[password.as_bytes(), self.pepper.as_bytes()])
    }

    /// Parse and validate a JSON config.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Config`] for invalid JSON and
    /// [`VaultError::InvalidConfiguration`] for illegal values.
    pub fn from_json_str(json: &str) -> Result<Self, VaultError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| VaultError::Config(format!("invalid vault config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    ///
    /// Unlike UI preferences, a missing or broken file is an error: silently
    /// falling back to a different pepper would make every vault unopenable.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Io`] if the file cannot be read, otherwise as
    /// [`Self::from_json_str`].
    pub fn load(path: &Path) -> Result<Self, VaultError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Write the config as pretty JSON via a temp file and rename.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Io`] if the write or rename fails.
    pub fn save(&self, path: &Path) -> Result<(), VaultError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| VaultError::Config(format!("failed to serialize vault config: {e}")))?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))?;
        }

        fs::rename(&tmp, path)?;
        Ok(())
    }
}

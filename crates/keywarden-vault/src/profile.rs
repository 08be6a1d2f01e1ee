//! Persisted vault profile: salt, wrapped vault key and work factor.
//!
//! The profile is produced once by [`crate::VaultSession::setup_new_vault`]
//! and handed to an external store. It contains nothing that is secret on
//! its own: the vault key inside is sealed under the password-derived key.

use keywarden_crypto_core::{encoding, WrappedVaultKey, SALT_LEN};
use serde::{Deserialize, Serialize};

use crate::config::MAX_ITERATIONS;
use crate::error::VaultError;

/// Everything needed to unlock a vault, apart from the password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserVaultProfile {
    /// Base64 of the 16-byte PBKDF2 salt.
    pub salt_base64: String,

    /// The vault key sealed under the master key.
    #[serde(alias = "encryptedVaultKey")]
    pub wrapped_vault_key: WrappedVaultKey,

    /// Work factor used at setup. Older profiles omit it, in which case the
    /// configured iteration count applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pbkdf2_iterations: Option<u32>,
}

impl UserVaultProfile {
    /// Decode and length-check the salt.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::CorruptProfile`] if the salt is not base64 of
    /// exactly 16 bytes.
    pub fn salt(&self) -> Result<[u8; SALT_LEN], VaultError> {
        let raw = encoding::decode(&self.salt_base64)
            .map_err(|e| VaultError::CorruptProfile(format!("salt: {e}")))?;
        raw.as_slice().try_into().map_err(|_| {
            VaultError::CorruptProfile(format!(
                "salt is {} bytes (expected {SALT_LEN})",
                raw.len()
            ))
        })
    }

    /// Iteration count to derive with: the stored one, else `fallback`.
    ///
    /// The store is untrusted, so a stored count must lie in
    /// `1..=MAX_ITERATIONS`.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::CorruptProfile`] for a stored count of zero or
    /// above [`MAX_ITERATIONS`].
    pub fn iterations_or(&self, fallback: u32) -> Result<u32, VaultError> {
        match self.pbkdf2_iterations {
            None => Ok(fallback),
            Some(n) if (1..=MAX_ITERATIONS).contains(&n) => Ok(n),
            Some(n) => Err(VaultError::CorruptProfile(format!(
                "pbkdf2Iterations {n} outside 1..={MAX_ITERATIONS}"
            ))),
        }
    }

    /// Parse a profile from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::CorruptProfile`] if the JSON does not describe a
    /// profile.
    pub fn from_json_str(json: &str) -> Result<Self, VaultError> {
        serde_json::from_str(json).map_err(|e| VaultError::CorruptProfile(e.to_string()))
    }

    /// Serialize to JSON.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Config`] if serialization fails.
    pub fn to_json_string(&self) -> Result<String, VaultError> {
        serde_json::to_string(self).map_err(|e| VaultError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(salt: &[u8]) -> UserVaultProfile {
        UserVaultProfile {
            salt_base64: encoding::encode(salt),
            wrapped_vault_key: WrappedVaultKey {
                ciphertext_base64: "AAAA".into(),
                iv_base64: "AAAA".into(),
            },
            pbkdf2_iterations: None,
        }
    }

    #[test]
    fn salt_decodes_to_sixteen_bytes() {
        assert_eq!(profile(&[7u8; 16]).salt().unwrap(), [7u8; 16]);
    }

    #[test]
    fn short_salt_is_corrupt_profile() {
        assert!(matches!(
            profile(&[7u8; 8]).salt(),
            Err(VaultError::CorruptProfile(_))
        ));
    }

    #[test]
    fn non_base64_salt_is_corrupt_profile() {
        let mut p = profile(&[0u8; 16]);
        p.salt_base64 = "not base64!".into();
        assert!(matches!(p.salt(), Err(VaultError::CorruptProfile(_))));
    }

    #[test]
    fn json_field_names() {
        let mut p = profile(&[1u8; 16]);
        p.pbkdf2_iterations = Some(250_000);
        let json: serde_json::Value = serde_json::from_str(&p.to_json_string().unwrap()).unwrap();
        assert!(json["saltBase64"].is_string());
        assert!(json["wrappedVaultKey"]["ciphertextBase64"].is_string());
        assert!(json["wrappedVaultKey"]["ivBase64"].is_string());
        assert_eq!(json["pbkdf2Iterations"], 250_000);
    }

    #[test]
    fn iterations_omitted_when_unset() {
        let json = profile(&[1u8; 16]).to_json_string().unwrap();
        assert!(!json.contains("pbkdf2Iterations"));
    }

    #[test]
    fn accepts_legacy_field_names() {
        let json = r#"{
            "saltBase64": "AAAAAAAAAAAAAAAAAAAAAA==",
            "encryptedVaultKey": { "ciphertext": "AAAA", "iv": "AAAA" }
        }"#;
        let p = UserVaultProfile::from_json_str(json).unwrap();
        assert_eq!(p.wrapped_vault_key.ciphertext_base64, "AAAA");
        assert_eq!(p.iterations_or(250_000).unwrap(), 250_000);
        assert_eq!(p.salt().unwrap(), [0u8; 16]);
    }

    #[test]
    fn stored_iterations_are_bounded() {
        let mut p = profile(&[1u8; 16]);
        p.pbkdf2_iterations = Some(MAX_ITERATIONS);
        assert_eq!(p.iterations_or(1).unwrap(), MAX_ITERATIONS);
        for bad in [0, MAX_ITERATIONS + 1, u32::MAX] {
            p.pbkdf2_iterations = Some(bad);
            assert!(
                matches!(p.iterations_or(1), Err(VaultError::CorruptProfile(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn garbage_json_is_corrupt_profile() {
        assert!(matches!(
            UserVaultProfile::from_json_str("[]"),
            Err(VaultError::CorruptProfile(_))
        ));
    }
}

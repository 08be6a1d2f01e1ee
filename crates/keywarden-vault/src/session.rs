//! Vault session: the lock/unlock state machine.
//!
//! The session holds the vault key behind a `Mutex<Option<VaultKey>>`:
//! - `None` when locked (initial state, and after [`VaultSession::lock`])
//! - `Some(key)` when unlocked
//!
//! Dropping the key (setting the slot to `None`) zeroizes it through
//! `SecretBytes`' `Drop` impl. The master key is derived, used to wrap or
//! unwrap, and dropped within a single call; it never enters the slot.
//!
//! Every transition runs with the mutex held, PBKDF2 included, so two
//! concurrent `unlock` calls cannot interleave. Calls block for the whole
//! derivation; async callers should go through `spawn_blocking`.

use std::sync::{Mutex, MutexGuard, PoisonError};

use keywarden_crypto_core::{
    derive_master_key, encoding, generate_salt, generate_vault_key, unwrap_vault_key,
    wrap_vault_key, CryptoError, MasterKey, SecretBuffer, VaultKey,
};

use crate::config::VaultConfig;
use crate::entries::{now_rfc3339, EncryptedEntryRecord, Entry};
use crate::error::VaultError;
use crate::profile::UserVaultProfile;

/// Whether a vault key is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Locked,
    Unlocked,
}

impl SessionStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Locked => "locked",
            Self::Unlocked => "unlocked",
        }
    }
}

/// Result of an unlock attempt that reached the tag check.
///
/// A wrong password is an expected outcome, not an error.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockOutcome {
    Unlocked,
    WrongPassword,
}

impl UnlockOutcome {
    #[must_use]
    pub const fn is_unlocked(self) -> bool {
        matches!(self, Self::Unlocked)
    }
}

/// One user's vault session. `Send + Sync`; share it behind an `Arc`.
pub struct VaultSession {
    config: VaultConfig,
    vault_key: Mutex<Option<VaultKey>>,
}

impl Default for VaultSession {
    fn default() -> Self {
        Self {
            config: VaultConfig::default(),
            vault_key: Mutex::new(None),
        }
    }
}

impl std::fmt::Debug for VaultSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultSession")
            .field("status", &self.status())
            .field("pbkdf2_iterations", &self.config.pbkdf2_iterations)
            .finish_non_exhaustive()
    }
}

impl VaultSession {
    /// A locked session using `config`.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvalidConfiguration`] if `config` fails
    /// [`VaultConfig::validate`].
    pub fn new(config: VaultConfig) -> Result<Self, VaultError> {
        config.validate()?;
        Ok(Self {
            config,
            vault_key: Mutex::new(None),
        })
    }

    #[must_use]
    pub const fn config(&self) -> &VaultConfig {
        &self.config
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        if self.slot().is_some() {
            SessionStatus::Unlocked
        } else {
            SessionStatus::Locked
        }
    }

    #[must_use]
    pub fn is_unlocked(&self) -> bool {
        self.status() == SessionStatus::Unlocked
    }

    /// The slot guard. The slot is always either empty or a whole key, so a
    /// panic in another holder leaves nothing half-written and poison is
    /// safe to clear.
    fn slot(&self) -> MutexGuard<'_, Option<VaultKey>> {
        self.vault_key
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn derive(&self, password: &str, salt: &[u8], iterations: u32) -> Result<MasterKey, CryptoError> {
        let peppered: SecretBuffer = self.config.pepper_password(password);
        derive_master_key(peppered.expose(), salt, iterations)
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Create a new vault and unlock it.
    ///
    /// Generates a salt and a vault key, wraps the key under the
    /// password-derived master key, and keeps the vault key. The returned
    /// profile is what the caller must persist.
    ///
    /// # Errors
    ///
    /// - [`VaultError::AlreadyUnlocked`] if a vault key is already held.
    ///   Replacing it would orphan every entry sealed under it.
    /// - [`VaultError::Crypto`] if the CSPRNG fails
    pub fn setup_new_vault(&self, master_password: &str) -> Result<UserVaultProfile, VaultError> {
        let mut slot = self.slot();
        if slot.is_some() {
            tracing::warn!("setup rejected: vault already unlocked");
            return Err(VaultError::AlreadyUnlocked);
        }

        let iterations = self.config.pbkdf2_iterations;
        let salt = generate_salt()?;
        let master_key = self.derive(master_password, &salt, iterations)?;
        let vault_key = generate_vault_key()?;
        let wrapped = wrap_vault_key(&vault_key, &master_key)?;
        drop(master_key);

        *slot = Some(vault_key);
        tracing::info!(iterations, "New vault created and unlocked");

        Ok(UserVaultProfile {
            salt_base64: encoding::encode(&salt),
            wrapped_vault_key: wrapped,
            pbkdf2_iterations: Some(iterations),
        })
    }

    /// Unlock with `master_password` against a stored profile.
    ///
    /// Returns [`UnlockOutcome::WrongPassword`], leaving the session locked,
    /// when the wrapped key fails authentication.
    ///
    /// # Errors
    ///
    /// - [`VaultError::AlreadyUnlocked`] if a vault key is already held
    /// - [`VaultError::CorruptProfile`] if the salt, envelope, iteration count
    ///   or unwrapped key payload is malformed
    /// - [`VaultError::Crypto`] for unrecoverable crypto faults
    pub fn unlock(
        &self,
        master_password: &str,
        profile: &UserVaultProfile,
    ) -> Result<UnlockOutcome, VaultError> {
        let mut slot = self.slot();
        if slot.is_some() {
            tracing::warn!("unlock rejected: vault already unlocked");
            return Err(VaultError::AlreadyUnlocked);
        }

        let salt = profile.salt().inspect_err(|e| {
            tracing::error!("Vault profile rejected: {e}");
        })?;
        let iterations = profile
            .iterations_or(self.config.pbkdf2_iterations)
            .inspect_err(|e| {
                tracing::error!("Vault profile rejected: {e}");
            })?;

        let master_key = self
            .derive(master_password, &salt, iterations)
            .map_err(|e| corrupt_profile(&e))?;

        match unwrap_vault_key(&profile.wrapped_vault_key, &master_key) {
            Ok(vault_key) => {
                *slot = Some(vault_key);
                tracing::info!(iterations, "Vault unlocked");
                Ok(UnlockOutcome::Unlocked)
            }
            Err(CryptoError::Decryption) => {
                tracing::warn!("Vault unlock failed: wrong password");
                Ok(UnlockOutcome::WrongPassword)
            }
            Err(
                e @ (CryptoError::Encoding(_)
                | CryptoError::MalformedEnvelope(_)
                | CryptoError::InvalidKeyMaterial(_)),
            ) => Err(corrupt_profile(&e)),
            Err(e) => Err(e.into()),
        }
    }

    /// Drop the vault key. Always succeeds; a no-op when already locked.
    pub fn lock(&self) {
        if self.slot().take().is_some() {
            tracing::info!("Vault locked");
        } else {
            tracing::debug!("lock called on locked vault");
        }
    }

    // -----------------------------------------------------------------------
    // Entry operations
    // -----------------------------------------------------------------------

    fn with_vault_key<T>(
        &self,
        f: impl FnOnce(&VaultKey) -> Result<T, VaultError>,
    ) -> Result<T, VaultError> {
        let slot = self.slot();
        let key = slot.as_ref().ok_or(VaultError::Locked)?;
        f(key)
    }

    /// Seal `entry` under the vault key.
    ///
    /// `updatedAt` is set to now, both in the sealed JSON and on the record.
    ///
    /// # Errors
    ///
    /// - [`VaultError::Locked`] if no vault key is held
    /// - [`VaultError::Crypto`] if the CSPRNG or AEAD fails
    pub fn encrypt_entry(&self, entry: &Entry) -> Result<EncryptedEntryRecord, VaultError> {
        self.with_vault_key(|key| {
            let mut stamped = entry.clone();
            stamped.updated_at = now_rfc3339();

            let json = serde_json::to_vec(&stamped)
                .map_err(|e| VaultError::CorruptRecord(format!("{}: {e}", stamped.id)))?;
            let plaintext = SecretBuffer::from_vec(json);
            let sealed = key.encrypt(plaintext.expose())?;

            tracing::debug!(entry_id = %stamped.id, "Entry encrypted");
            Ok(EncryptedEntryRecord::seal(&stamped, &sealed))
        })
    }

    /// Open a record sealed under the current vault key.
    ///
    /// # Errors
    ///
    /// - [`VaultError::Locked`] if no vault key is held
    /// - [`VaultError::CorruptRecord`] if the record or its decrypted payload
    ///   is malformed, or the payload's id differs from `record.id`
    /// - [`VaultError::AuthenticationFailure`] if the ciphertext does not
    ///   verify under this key
    pub fn decrypt_entry(&self, record: &EncryptedEntryRecord) -> Result<Entry, VaultError> {
        self.with_vault_key(|key| {
            let sealed = record.sealed()?;
            let plaintext = key.decrypt(&sealed).inspect_err(|_| {
                tracing::warn!(entry_id = %record.id, "Entry failed authentication");
            })?;
            let entry: Entry = serde_json::from_slice(plaintext.expose())
                .map_err(|e| VaultError::CorruptRecord(format!("{}: {e}", record.id)))?;

            // The clear id is not covered by the tag; the sealed one is.
            if entry.id != record.id {
                tracing::warn!(entry_id = %record.id, sealed_id = %entry.id, "Entry id mismatch");
                return Err(VaultError::CorruptRecord(format!(
                    "{}: sealed payload belongs to entry {}",
                    record.id, entry.id
                )));
            }

            tracing::debug!(entry_id = %record.id, "Entry decrypted");
            Ok(entry)
        })
    }
}

fn corrupt_profile(err: &CryptoError) -> VaultError {
    tracing::error!("Vault profile rejected: {err}");
    VaultError::CorruptProfile(err.to_string())
}

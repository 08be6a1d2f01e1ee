//! Random password generation.
//!
//! Every character is an independent uniform draw from the union of the
//! enabled classes, using `OsRng`. `gen_range` samples by rejection, so
//! charsets whose size does not divide the RNG domain carry no modulo bias.

use rand::rngs::OsRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::CryptoError;

/// Default generated password length.
pub const DEFAULT_PASSWORD_LENGTH: usize = 16;

/// Largest accepted password length.
pub const MAX_PASSWORD_LENGTH: usize = 1024;

const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const NUMBERS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Character classes to draw from.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CharClasses {
    /// `a-z`
    pub lowercase: bool,
    /// `A-Z`
    pub uppercase: bool,
    /// `0-9`
    pub numbers: bool,
    /// `!@#$%^&*()_+-=[]{}|;:,.<>?`
    pub symbols: bool,
}

impl Default for CharClasses {
    fn default() -> Self {
        Self {
            lowercase: true,
            uppercase: true,
            numbers: true,
            symbols: true,
        }
    }
}

impl CharClasses {
    /// Only digits.
    #[must_use]
    pub const fn numbers_only() -> Self {
        Self {
            lowercase: false,
            uppercase: false,
            numbers: true,
            symbols: false,
        }
    }

    /// The union of enabled classes, in lowercase/uppercase/numbers/symbols order.
    #[must_use]
    pub fn charset(&self) -> Vec<u8> {
        let mut pool = Vec::new();
        if self.lowercase {
            pool.extend_from_slice(LOWERCASE);
        }
        if self.uppercase {
            pool.extend_from_slice(UPPERCASE);
        }
        if self.numbers {
            pool.extend_from_slice(NUMBERS);
        }
        if self.symbols {
            pool.extend_from_slice(SYMBOLS);
        }
        pool
    }
}

/// Generate a random password of exactly `length` characters.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidConfiguration`] if every class is disabled
/// or `length` is outside `1..=MAX_PASSWORD_LENGTH`.
pub fn generate_password(length: usize, classes: &CharClasses) -> Result<String, CryptoError> {
    if !(1..=MAX_PASSWORD_LENGTH).contains(&length) {
        return Err(CryptoError::InvalidConfiguration(format!(
            "password length must be between 1 and {MAX_PASSWORD_LENGTH}, got {length}"
        )));
    }

    let pool = classes.charset();
    if pool.is_empty() {
        return Err(CryptoError::InvalidConfiguration(
            "at least one character class must be enabled".into(),
        ));
    }

    let mut rng = OsRng;
    let password = (0..length)
        .map(|_| char::from(pool[rng.gen_range(0..pool.len())]))
        .collect();
    Ok(password)
}

//! PBKDF2-HMAC-SHA256 Known-Answer Tests.
//!
//! RFC 7914 §11 gives PBKDF2-HMAC-SHA256 vectors. `derive_master_key` is
//! also cross-checked against `ring`'s independent PBKDF2.

use std::num::NonZeroU32;

use data_encoding::HEXLOWER;
use keywarden_crypto_core::kdf::derive_master_key;
use keywarden_crypto_core::memory::SecretBytes;
use keywarden_crypto_core::symmetric::{SymmetricKey, KEY_LEN};
use sha2::Sha256;

/// RFC 7914 §11: P = "passwd", S = "salt", c = 1, dkLen = 64.
#[test]
fn rfc7914_passwd_salt_c1() {
    let mut out = [0u8; 64];
    pbkdf2::pbkdf2_hmac::<Sha256>(b"passwd", b"salt", 1, &mut out);
    assert_eq!(
        HEXLOWER.encode(&out),
        "55ac046e56e3089fec1691c22544b605f94185216dde0465e68b9d57c20dacbc\
         49ca9cccf179b645991664b39d77ef317c71b845b1e30bd509112041d3a19783"
    );
}

/// `derive_master_key` matches `ring::pbkdf2` on the same inputs.
#[test]
fn derive_master_key_matches_ring() {
    let password = b"Secret123!keywarden-vault-pepper-v1";
    let salt = *b"0123456789abcdef";
    let iterations = 1_000;

    let mut expected = [0u8; KEY_LEN];
    ring::pbkdf2::derive(
        ring::pbkdf2::PBKDF2_HMAC_SHA256,
        NonZeroU32::new(iterations).unwrap(),
        &salt,
        password,
        &mut expected,
    );
    let reference = SymmetricKey::from_secret(SecretBytes::new(expected));

    let master = derive_master_key(password, &salt, iterations).unwrap();
    let sealed = reference.encrypt(b"cross-check", &[]).unwrap();
    assert_eq!(master.decrypt(&sealed).unwrap().expose(), b"cross-check");
}

//! NIST SP 800-38D: AES-256-GCM Known-Answer Test vectors.
//!
//! Verifies `ring`'s AES-256-GCM against GCMEncryptExtIV256.rsp and checks
//! that our `decrypt()` reads the `ct || tag` layout the vectors produce.

use data_encoding::HEXLOWER;
use keywarden_crypto_core::memory::SecretBytes;
use keywarden_crypto_core::symmetric::{decrypt, SealedData, SymmetricKey, IV_LEN, KEY_LEN};
use ring::aead;

fn zero_key() -> SymmetricKey {
    SymmetricKey::from_secret(SecretBytes::new([0u8; KEY_LEN]))
}

/// NIST Test Case 13: zero key, zero IV, empty plaintext.
///
/// Tag: 530f8afbc74536b9a963b4f1c4cb738b
#[test]
fn nist_test_case_13_empty_plaintext() {
    let sealed = SealedData {
        nonce: [0u8; IV_LEN],
        ciphertext: HEXLOWER
            .decode(b"530f8afbc74536b9a963b4f1c4cb738b")
            .unwrap(),
    };
    let plain = decrypt(&sealed, &zero_key(), &[]).expect("vector should verify");
    assert!(plain.is_empty());
}

/// NIST Test Case 14: zero key, zero IV, 16 zero bytes of plaintext.
///
/// CT:  cea7403d4d606b6e074ec5d3baf39d18
/// Tag: d0d1c8a799996bf0265b98b5d48ab919
#[test]
fn nist_test_case_14_aes256_gcm() {
    let unbound = aead::UnboundKey::new(&aead::AES_256_GCM, &[0u8; 32]).expect("key should be valid");
    let less_safe_key = aead::LessSafeKey::new(unbound);
    let nonce = aead::Nonce::assume_unique_for_key([0u8; 12]);
    let mut in_out = vec![0u8; 16];
    let tag = less_safe_key
        .seal_in_place_separate_tag(nonce, aead::Aad::empty(), &mut in_out)
        .expect("seal should succeed");

    assert_eq!(HEXLOWER.encode(&in_out), "cea7403d4d606b6e074ec5d3baf39d18");
    assert_eq!(HEXLOWER.encode(tag.as_ref()), "d0d1c8a799996bf0265b98b5d48ab919");
}

/// The same vector fed through our wrapper as `ct || tag`.
#[test]
fn nist_test_case_14_through_decrypt() {
    let sealed = SealedData {
        nonce: [0u8; IV_LEN],
        ciphertext: HEXLOWER
            .decode(b"cea7403d4d606b6e074ec5d3baf39d18d0d1c8a799996bf0265b98b5d48ab919")
            .unwrap(),
    };
    let plain = decrypt(&sealed, &zero_key(), &[]).expect("vector should verify");
    assert_eq!(plain.expose(), &[0u8; 16]);
}

/// Tag placed before the ciphertext must not verify.
#[test]
fn tag_first_layout_is_rejected() {
    let sealed = SealedData {
        nonce: [0u8; IV_LEN],
        ciphertext: HEXLOWER
            .decode(b"d0d1c8a799996bf0265b98b5d48ab919cea7403d4d606b6e074ec5d3baf39d18")
            .unwrap(),
    };
    assert!(decrypt(&sealed, &zero_key(), &[]).is_err());
}

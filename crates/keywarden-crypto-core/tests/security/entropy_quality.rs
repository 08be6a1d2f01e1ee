//! Entropy quality tests for CSPRNG outputs.
//!
//! Shannon entropy of uniform random bytes approaches 8.0 bits/byte as the
//! sample grows; small samples fall short because not every byte value
//! appears. Thresholds are set well below the expected value for each size
//! so they only trip on degenerate output (all zeros, repeated patterns).
//!
//! | Sample size | Expected entropy | Threshold |
//! |-------------|-----------------|-----------|
//! | 32 bytes    | ~4.88           | 4.0       |
//! | 1 KB        | ~7.81           | 7.5       |
//! | 64 KB       | ~7.997          | 7.99      |

use std::collections::HashSet;

use keywarden_crypto_core::memory::{SecretBuffer, SecretBytes};
use keywarden_crypto_core::password::{generate_password, CharClasses};
use keywarden_crypto_core::{generate_salt, random_bytes};

/// Shannon entropy of a byte slice (bits per byte).
#[allow(clippy::cast_precision_loss)]
fn shannon_entropy(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let mut freq = [0u64; 256];
    for &b in data {
        freq[b as usize] = freq[b as usize].saturating_add(1);
    }
    let len = data.len() as f64;
    freq.iter()
        .filter(|&&f| f > 0)
        .map(|&f| {
            let p = f as f64 / len;
            -p * p.log2()
        })
        .sum()
}

#[test]
fn random_bytes_64kb_entropy() {
    let bytes = random_bytes(65_536).expect("CSPRNG should succeed");
    let entropy = shannon_entropy(&bytes);
    assert!(
        entropy > 7.99,
        "random_bytes(65536) entropy too low: {entropy:.4} (expected > 7.99)"
    );
}

#[test]
fn secret_buffer_random_1kb_entropy() {
    let buf = SecretBuffer::random(1024).expect("CSPRNG should succeed");
    let entropy = shannon_entropy(buf.expose());
    assert!(
        entropy > 7.5,
        "SecretBuffer::random(1024) entropy too low: {entropy:.4} (expected > 7.5)"
    );
}

#[test]
fn secret_bytes_32_random_entropy() {
    let key = SecretBytes::<32>::random().expect("CSPRNG should succeed");
    let entropy = shannon_entropy(key.expose());
    assert!(
        entropy > 4.0,
        "SecretBytes::<32>::random() entropy too low: {entropy:.4} (expected > 4.0)"
    );
}

/// 1000 salts, no repeats. A collision among 128-bit values at this count
/// means the CSPRNG is broken.
#[test]
fn salts_never_repeat() {
    let mut seen = HashSet::new();
    for _ in 0..1000 {
        assert!(seen.insert(generate_salt().expect("CSPRNG should succeed")));
    }
}

/// Character frequencies over 64K generated digits stay near uniform.
///
/// Expected count per digit is 6553.6; a chi-square statistic over 10
/// classes (9 degrees of freedom) above 40 has p < 1e-5.
#[test]
#[allow(clippy::cast_precision_loss)]
fn password_digits_are_uniform() {
    let mut counts = [0u64; 10];
    for _ in 0..64 {
        let pw = generate_password(1024, &CharClasses::numbers_only()).expect("generate");
        for b in pw.bytes() {
            counts[usize::from(b - b'0')] += 1;
        }
    }
    let total: u64 = counts.iter().sum();
    let expected = total as f64 / 10.0;
    let chi_square: f64 = counts
        .iter()
        .map(|&c| {
            let d = c as f64 - expected;
            d * d / expected
        })
        .sum();
    assert!(chi_square < 40.0, "digit distribution skewed: chi² = {chi_square:.2}");
}

/// Full-charset passwords carry close to log2(88) bits per character.
#[test]
fn password_full_charset_entropy() {
    let pw = generate_password(1024, &CharClasses::default()).expect("generate");
    let entropy = shannon_entropy(pw.as_bytes());
    assert!(entropy > 6.0, "password entropy too low: {entropy:.4}");
}

//! Verify that `SecretBuffer` and `SecretBytes` actually clear memory on drop.
//!
//! Heap buffers are checked by scanning for a sentinel rather than asserting
//! all zeros, since the allocator may write free-list metadata into the
//! block after deallocation.
//!
//! Reading freed memory is undefined behavior. These are best-effort smoke
//! tests meant for the debug profile (plain `cargo test`).

use keywarden_crypto_core::memory::{SecretBuffer, SecretBytes};

const SENTINEL: [u8; 4] = [0xDE, 0xAD, 0xBE, 0xEF];

#[test]
fn secret_buffer_sentinel_not_found_after_drop() {
    let sentinel_data: Vec<u8> = SENTINEL.iter().copied().cycle().take(512).collect();

    let data_ptr: *const u8;
    let data_len: usize;

    {
        let buf = SecretBuffer::new(&sentinel_data).expect("allocation should succeed");
        let exposed = buf.expose();
        data_ptr = exposed.as_ptr();
        data_len = exposed.len();
        assert_eq!(&exposed[..4], &SENTINEL);
    }

    // SAFETY: reads memory that was just freed; see module docs.
    let sentinel_found = unsafe {
        let slice = std::slice::from_raw_parts(data_ptr, data_len);
        slice.windows(4).any(|w| w == SENTINEL)
    };

    assert!(
        !sentinel_found,
        "Sentinel pattern found in memory after SecretBuffer drop"
    );
}

#[test]
fn secret_bytes_zeroed_after_drop() {
    let data_ptr: *const u8;

    {
        let key = SecretBytes::<32>::new([0xAB; 32]);
        data_ptr = key.expose().as_ptr();
        assert_eq!(key.expose()[0], 0xAB);
    }

    // SAFETY: the bytes lived inline in this stack frame, which is still live.
    let zeroed = unsafe {
        let slice = std::slice::from_raw_parts(data_ptr, 32);
        slice.iter().all(|&b| b == 0)
    };

    assert!(
        zeroed,
        "SecretBytes<32> memory was NOT zeroed after drop"
    );
}

/// Key handles must run a destructor, or their bytes would outlive them.
#[test]
fn key_types_need_drop() {
    assert!(std::mem::needs_drop::<keywarden_crypto_core::SymmetricKey>());
    assert!(std::mem::needs_drop::<keywarden_crypto_core::MasterKey>());
    assert!(std::mem::needs_drop::<keywarden_crypto_core::VaultKey>());
    assert!(std::mem::needs_drop::<SecretBuffer>());
}

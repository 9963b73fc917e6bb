#![no_main]

//! Fuzz target for incremental hashing
//!
//! The first byte picks a chunk size; feeding the rest in chunks of that size
//! must give the same fingerprint as hashing it in one call.
//!
//! Run with: cargo +nightly fuzz run fuzz_chunked_hash

use libfuzzer_sys::fuzz_target;
use fixity_core::{fingerprint_bytes, Hasher};

fuzz_target!(|data: &[u8]| {
    let Some((&size, content)) = data.split_first() else {
        return;
    };
    let chunk_size = usize::from(size).max(1);

    let mut hasher = Hasher::new();
    for chunk in content.chunks(chunk_size) {
        hasher.update(chunk);
    }

    assert_eq!(hasher.finish(), fingerprint_bytes(content));
});

#![no_main]

//! Fuzz target for Fingerprint::from_str()
//!
//! Parsing arbitrary text must never panic, and anything that parses must
//! render back to the same lowercase hex.
//!
//! Run with: cargo +nightly fuzz run fuzz_parse_fingerprint

use libfuzzer_sys::fuzz_target;
use fixity_core::Fingerprint;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(fingerprint) = text.parse::<Fingerprint>() {
            assert_eq!(fingerprint.to_hex(), text.to_lowercase());
        }
    }
});

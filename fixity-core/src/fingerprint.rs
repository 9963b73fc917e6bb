//! Content fingerprinting.
//!
//! A fingerprint is the SHA-256 digest of a file's bytes. Hashing is always
//! incremental: callers feed chunks as they arrive and never need to hold a
//! whole file in memory.

use std::fmt;
use std::io::{self, Read};
use std::str::FromStr;

use futures::{Stream, StreamExt};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::error::{RegistryError, Result};

/// Length of a fingerprint in bytes.
pub const FINGERPRINT_BYTES: usize = 32;

/// Length of a fingerprint rendered as hex.
pub const FINGERPRINT_HEX_LEN: usize = FINGERPRINT_BYTES * 2;

/// Buffer size used when draining a blocking reader.
const READ_CHUNK_BYTES: usize = 64 * 1024;

/// SHA-256 fingerprint of a byte stream.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; FINGERPRINT_BYTES]);

impl Fingerprint {
    /// Wrap a raw 32-byte digest.
    pub const fn from_bytes(bytes: [u8; FINGERPRINT_BYTES]) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; FINGERPRINT_BYTES] {
        &self.0
    }

    /// Lowercase hex rendering (64 characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.to_hex())
    }
}

impl FromStr for Fingerprint {
    type Err = RegistryError;

    /// Parse 64 hex characters, upper- or lower-case.
    fn from_str(s: &str) -> Result<Self> {
        if s.len() != FINGERPRINT_HEX_LEN {
            return Err(RegistryError::validation(format!(
                "Fingerprint must be {} hex characters, got {}",
                FINGERPRINT_HEX_LEN,
                s.len()
            )));
        }

        let mut bytes = [0u8; FINGERPRINT_BYTES];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|e| RegistryError::validation(format!("Invalid fingerprint: {}", e)))?;

        Ok(Self(bytes))
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Incremental fingerprint computation.
///
/// Feed chunks with [`Hasher::update`], then call [`Hasher::finish`].
#[derive(Clone, Default)]
pub struct Hasher {
    digest: Sha256,
    bytes_hashed: u64,
}

impl Hasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, chunk: &[u8]) {
        self.digest.update(chunk);
        self.bytes_hashed += chunk.len() as u64;
    }

    /// Number of bytes fed so far.
    pub fn bytes_hashed(&self) -> u64 {
        self.bytes_hashed
    }

    pub fn finish(self) -> Fingerprint {
        Fingerprint(self.digest.finalize().into())
    }
}

/// Fingerprint an in-memory buffer.
pub fn fingerprint_bytes(data: &[u8]) -> Fingerprint {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finish()
}

/// Fingerprint a blocking reader in fixed-size chunks.
pub fn fingerprint_reader<R: Read>(mut reader: R) -> Result<Fingerprint> {
    let mut hasher = Hasher::new();
    let mut buf = vec![0u8; READ_CHUNK_BYTES];

    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => hasher.update(&buf[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(hasher.finish())
}

/// Fingerprint an async stream of chunks.
pub async fn fingerprint_stream<S, B, E>(stream: S) -> Result<Fingerprint>
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    fingerprint_stream_limited(stream, None).await
}

/// Fingerprint an async stream of chunks, rejecting streams longer than `max_bytes`.
///
/// A read error yields [`RegistryError::Io`]; crossing the ceiling yields
/// [`RegistryError::Validation`]. Either way no fingerprint is produced.
pub async fn fingerprint_stream_limited<S, B, E>(
    stream: S,
    max_bytes: Option<u64>,
) -> Result<Fingerprint>
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let mut stream = std::pin::pin!(stream);
    let mut hasher = Hasher::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(io::Error::other)?;
        hasher.update(chunk.as_ref());

        if let Some(max) = max_bytes {
            if hasher.bytes_hashed() > max {
                return Err(RegistryError::validation(format!(
                    "File too large: exceeds maximum of {} bytes",
                    max
                )));
            }
        }
    }

    Ok(hasher.finish())
}

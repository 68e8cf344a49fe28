//! 256-bit content hashes.
//!
//! This module defines a single strongly-typed hash wrapper used for block
//! hashes and state commitments alike. Keeping the type in one place avoids
//! "naked" byte arrays or ad hoc hex strings showing up at API boundaries.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Length in bytes of all 256-bit hashes used in this crate.
pub const HASH_LEN: usize = 32;

/// Strongly-typed 256-bit hash wrapper (SHA-256).
#[derive(Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Hash256(pub [u8; HASH_LEN]);

impl Hash256 {
    /// Computes a new [`Hash256`] as the SHA-256 digest of `data`.
    pub fn compute(data: &[u8]) -> Self {
        let digest = Sha256::digest(data);
        let mut out = [0u8; HASH_LEN];
        out.copy_from_slice(&digest);
        Hash256(out)
    }

    /// Returns the underlying 32-byte hash as a borrowed array.
    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }

    /// Lowercase hex encoding of the hash.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses a lowercase hex string into a `Hash256`.
    ///
    /// Returns `None` if the string is not valid hex or is not exactly
    /// [`HASH_LEN`] bytes long.
    pub fn from_hex(s: &str) -> Option<Self> {
        let bytes = hex::decode(s).ok()?;
        if bytes.len() != HASH_LEN {
            return None;
        }
        let mut out = [0u8; HASH_LEN];
        out.copy_from_slice(&bytes);
        Some(Hash256(out))
    }

    /// A hash of all zero bytes, used as the genesis parent hash.
    pub fn zero() -> Self {
        Hash256([0u8; HASH_LEN])
    }
}

impl std::fmt::Debug for Hash256 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Hash256({}…)", &self.to_hex()[..12])
    }
}

impl std::fmt::Display for Hash256 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

//! Cryptographic primitives: canonical encoding, key material, and the
//! domain-separated signing envelope.
//!
//! This module groups the three concerns that sit underneath every other
//! part of the crate — state commitments, block headers, and votes all
//! bottom out here.

pub mod canonical;
pub mod envelope;
pub mod keys;

pub use canonical::{canonical_bytes, canonical_string};
pub use envelope::{Context, sign, verify};
pub use keys::{KeyPair, parse_public_key};

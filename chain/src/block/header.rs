//! Block headers: the content-addressed, signed backbone of the chain.

use serde::{Deserialize, Serialize};

use crate::crypto::{Context, KeyPair, sign, verify};
use crate::hash::Hash256;

/// A block header.
///
/// `hash` is computed over every field *except* `signature` (see
/// [`BlockHeader::compute_hash`]); the signature is then produced over that
/// same hash-defining encoding under context `"HEADER"`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlockHeader {
    pub parent_hash: String,
    pub height: u64,
    pub state_hash: String,
    pub proposer: String,
    pub signature: String,
}

/// The subset of header fields that determine its hash — excludes the
/// signature so the header can be signed over its own hash input.
#[derive(Serialize)]
struct HashedFields<'a> {
    parent_hash: &'a str,
    height: u64,
    state_hash: &'a str,
    proposer: &'a str,
}

impl BlockHeader {
    fn hashed_fields(&self) -> HashedFields<'_> {
        HashedFields {
            parent_hash: &self.parent_hash,
            height: self.height,
            state_hash: &self.state_hash,
            proposer: &self.proposer,
        }
    }

    /// Content hash of this header: SHA-256 over the canonical encoding of
    /// `{parent_hash, height, state_hash, proposer}`. The signature is
    /// deliberately excluded.
    pub fn compute_hash(&self) -> Hash256 {
        let bytes = crate::crypto::canonical_bytes(&self.hashed_fields());
        Hash256::compute(&bytes)
    }

    /// Signs this header (in place) with `key` under context `"HEADER"`.
    pub fn sign(&mut self, key: &KeyPair, chain_id: &str) {
        self.signature = sign(key, &self.hashed_fields(), Context::Header, chain_id);
    }

    /// Verifies this header's signature against `self.proposer`.
    pub fn verify_signature(&self, chain_id: &str) -> bool {
        verify(
            &self.proposer,
            &self.signature,
            &self.hashed_fields(),
            Context::Header,
            chain_id,
        )
    }

    /// Constructs the genesis header: `parent_hash = "0"*64`, `height = 0`,
    /// `proposer = "genesis"`, `signature = ""`, and `state_hash` set to the
    /// commitment of an empty application state.
    pub fn genesis(empty_state_commitment: Hash256) -> Self {
        BlockHeader {
            parent_hash: "0".repeat(64),
            height: 0,
            state_hash: empty_state_commitment.to_hex(),
            proposer: "genesis".to_string(),
            signature: String::new(),
        }
    }
}

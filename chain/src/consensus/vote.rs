//! Votes: a validator's signed statement about a block hash at a given
//! height and phase.

use serde::{Deserialize, Serialize};

use crate::consensus::phase::Phase;
use crate::crypto::{Context, KeyPair, sign, verify};

/// A single prevote or precommit.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Vote {
    pub validator: String,
    pub height: u64,
    pub block_hash: String,
    pub phase: Phase,
    pub signature: String,
}

#[derive(Serialize)]
struct VotePayload<'a> {
    validator: &'a str,
    height: u64,
    block_hash: &'a str,
    phase: Phase,
}

impl Vote {
    fn payload(&self) -> VotePayload<'_> {
        VotePayload {
            validator: &self.validator,
            height: self.height,
            block_hash: &self.block_hash,
            phase: self.phase,
        }
    }

    /// Builds and signs a new vote under context `"VOTE"`.
    pub fn new_signed(key: &KeyPair, block_hash: impl Into<String>, height: u64, phase: Phase, chain_id: &str) -> Self {
        let validator = key.public_hex().to_string();
        let block_hash = block_hash.into();
        let mut vote = Vote {
            validator,
            height,
            block_hash,
            phase,
            signature: String::new(),
        };
        vote.signature = sign(key, &vote.payload(), Context::Vote, chain_id);
        vote
    }

    /// Verifies this vote's signature against `self.validator`.
    pub fn verify_signature(&self, chain_id: &str) -> bool {
        verify(&self.validator, &self.signature, &self.payload(), Context::Vote, chain_id)
    }

    /// The idempotent-delivery dedup key: `validator:height:phase:block_hash`.
    ///
    /// Deliberately excludes the signature — two different signatures over
    /// the same logical vote are still the same vote for dedup purposes.
    pub fn dedup_key(&self) -> String {
        format!("{}:{}:{}:{}", self.validator, self.height, self.phase, self.block_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_vote_verifies() {
        let key = KeyPair::from_seed("seed", 0);
        let vote = Vote::new_signed(&key, "a".repeat(64), 1, Phase::Prevote, "test-chain");
        assert!(vote.verify_signature("test-chain"));
    }

    #[test]
    fn dedup_key_excludes_signature() {
        let key = KeyPair::from_seed("seed", 0);
        let mut a = Vote::new_signed(&key, "a".repeat(64), 1, Phase::Precommit, "test-chain");
        let b = a.clone();
        a.signature = "deadbeef".to_string();
        assert_eq!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn different_phase_gives_different_dedup_key() {
        let key = KeyPair::from_seed("seed", 0);
        let prevote = Vote::new_signed(&key, "a".repeat(64), 1, Phase::Prevote, "test-chain");
        let precommit = Vote::new_signed(&key, "a".repeat(64), 1, Phase::Precommit, "test-chain");
        assert_ne!(prevote.dedup_key(), precommit.dedup_key());
    }
}

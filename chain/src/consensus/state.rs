//! Per-height vote tallying and finalization.

use std::collections::{HashMap, HashSet};

use crate::consensus::error::ConsensusError;
use crate::consensus::phase::Phase;
use crate::consensus::vote::Vote;

/// Tracks prevotes and precommits per height for a fixed validator set and
/// decides when a height is finalized.
///
/// Quorum here is strict majority (`floor(N/2) + 1`), not a BFT
/// `ceil(2N/3) + 1` threshold — deliberately simplified, see the crate's
/// top-level design notes. This guarantees uniqueness of a finalizable hash
/// per height as long as validators do not equivocate across a majority
/// split; detecting an actual double-finalization attempt is exactly what
/// `try_finalize` raises `SafetyViolation` for.
pub struct ConsensusState {
    validator_set: HashSet<String>,
    chain_id: String,
    prevotes: HashMap<u64, Vec<Vote>>,
    precommits: HashMap<u64, Vec<Vote>>,
    finalized: HashMap<u64, String>,
}

impl ConsensusState {
    pub fn new(validator_set: HashSet<String>, chain_id: impl Into<String>) -> Self {
        Self {
            validator_set,
            chain_id: chain_id.into(),
            prevotes: HashMap::new(),
            precommits: HashMap::new(),
            finalized: HashMap::new(),
        }
    }

    fn quorum(&self) -> usize {
        self.validator_set.len() / 2 + 1
    }

    /// Ingests `vote`. Returns `Ok(true)` if the vote was accepted and
    /// tallied, `Ok(false)` if it was rejected (unknown validator or bad
    /// signature), and `Err` only for a fatal safety violation raised while
    /// attempting to finalize a precommit.
    pub fn handle_vote(&mut self, vote: Vote) -> Result<bool, ConsensusError> {
        if !self.validator_set.contains(&vote.validator) {
            return Ok(false);
        }
        if !vote.verify_signature(&self.chain_id) {
            return Ok(false);
        }

        let height = vote.height;
        let phase = vote.phase;
        match phase {
            Phase::Prevote => self.prevotes.entry(height).or_default().push(vote),
            Phase::Precommit => self.precommits.entry(height).or_default().push(vote),
        }

        if phase == Phase::Precommit {
            self.try_finalize(height)?;
        }

        Ok(true)
    }

    /// Tallies precommits at `height` and finalizes the first hash that
    /// meets quorum.
    ///
    /// Returns the finalized hash for `height` (pre-existing or newly set),
    /// or `None` if nothing is finalized yet. Raises `SafetyViolation` if a
    /// hash different from the already-finalized one also meets quorum —
    /// this can only happen if votes were inserted directly into the tally
    /// bypassing per-node dedup, since `handle_vote` never double-counts a
    /// single validator's vote within a height/phase once deduped upstream.
    pub fn try_finalize(&mut self, height: u64) -> Result<Option<String>, ConsensusError> {
        let Some(votes) = self.precommits.get(&height) else {
            return Ok(self.finalized.get(&height).cloned());
        };

        let quorum = self.quorum();
        let mut tally: HashMap<&str, usize> = HashMap::new();
        for vote in votes {
            *tally.entry(vote.block_hash.as_str()).or_insert(0) += 1;
        }

        for (hash, count) in &tally {
            if *count < quorum {
                continue;
            }
            match self.finalized.get(&height) {
                Some(existing) if existing != hash => {
                    return Err(ConsensusError::SafetyViolation {
                        height,
                        first: existing.clone(),
                        second: (*hash).to_string(),
                    });
                }
                Some(_) => {}
                None => {
                    self.finalized.insert(height, (*hash).to_string());
                }
            }
        }

        Ok(self.finalized.get(&height).cloned())
    }

    pub fn finalized_at(&self, height: u64) -> Option<&str> {
        self.finalized.get(&height).map(String::as_str)
    }

    /// Unconditionally records `block_hash` as finalized at `height`.
    ///
    /// Used only to pre-finalize genesis at height 0, which by construction
    /// has no votes behind it; never call this for any other height.
    pub(crate) fn set_finalized(&mut self, height: u64, block_hash: String) {
        self.finalized.insert(height, block_hash);
    }

    pub fn validator_set(&self) -> &HashSet<String> {
        &self.validator_set
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    /// Inserts a precommit directly into the tally without going through
    /// `handle_vote` or any dedup — used to model a validator set pushing
    /// votes through an injected channel that bypasses node-level defenses.
    #[cfg(test)]
    pub(crate) fn inject_precommit_unchecked(&mut self, vote: Vote) {
        self.precommits.entry(vote.height).or_default().push(vote);
    }
}

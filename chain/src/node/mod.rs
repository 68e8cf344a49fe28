//! Node orchestration: wires the application state, consensus state, and
//! block store together behind a single message-handling surface.

pub mod error;

pub use error::NodeError;

use std::collections::HashSet;

use crate::block::{BlockBody, BlockHeader, BlockStore, build_block, validate_received_block};
use crate::consensus::{ConsensusState, Phase, Vote};
use crate::crypto::KeyPair;
use crate::hash::Hash256;
use crate::state::{AppState, Transaction};

/// A single validator node.
///
/// Owns one [`AppState`], one [`ConsensusState`], a block store `S`, a
/// pending-transaction buffer, and a seen-vote set for idempotent vote
/// ingress. Genesis is constructed and pre-finalized at height 0 when the
/// node is created.
pub struct Node<S: BlockStore> {
    node_id: String,
    key: KeyPair,
    chain_id: String,
    consensus: ConsensusState,
    app_state: AppState,
    store: S,
    pending_txs: Vec<Transaction>,
    seen_votes: HashSet<String>,
    current_height: u64,
}

impl<S: BlockStore> Node<S> {
    /// Constructs a new node, inserting and pre-finalizing genesis at
    /// height 0.
    pub fn new(
        node_id: impl Into<String>,
        key: KeyPair,
        chain_id: impl Into<String>,
        validator_set: HashSet<String>,
        mut store: S,
    ) -> Self {
        let node_id = node_id.into();
        let chain_id = chain_id.into();

        let genesis_state = AppState::new();
        let genesis_header = BlockHeader::genesis(genesis_state.commitment());
        let genesis_hash = genesis_header.compute_hash();
        store.put_header(genesis_hash, genesis_header);
        store.put_body(genesis_hash, Vec::new());

        let mut consensus = ConsensusState::new(validator_set, chain_id.clone());
        consensus.set_finalized(0, genesis_hash.to_hex());

        tracing::debug!(node_id = %node_id, genesis_hash = %genesis_hash, "node initialized");

        Self {
            node_id,
            key,
            chain_id,
            consensus,
            app_state: genesis_state,
            store,
            pending_txs: Vec::new(),
            seen_votes: HashSet::new(),
            current_height: 0,
        }
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    pub fn public_hex(&self) -> &str {
        self.key.public_hex()
    }

    pub fn current_height(&self) -> u64 {
        self.current_height
    }

    pub fn app_state(&self) -> &AppState {
        &self.app_state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn finalized_at(&self, height: u64) -> Option<&str> {
        self.consensus.finalized_at(height)
    }

    pub fn pending_tx_count(&self) -> usize {
        self.pending_txs.len()
    }

    /// Validates `tx` against a *copy* of the live state (buffering never
    /// mutates live state) and, if accepted, appends it to the pending
    /// buffer. Returns whether it was accepted.
    pub fn receive_transaction(&mut self, tx: Transaction) -> bool {
        let mut probe = self.app_state.clone();
        if probe.apply_tx(&tx, &self.chain_id) {
            tracing::debug!(node_id = %self.node_id, sender = %tx.sender, key = %tx.key, "transaction accepted");
            self.pending_txs.push(tx);
            true
        } else {
            tracing::warn!(node_id = %self.node_id, sender = %tx.sender, key = %tx.key, "transaction rejected");
            false
        }
    }

    /// Builds a block over `parent_hash` from the pending-tx buffer, stores
    /// it, and clears the buffer. Returns `None` if `parent_hash` is
    /// unknown, in which case the pending buffer is left untouched.
    pub fn propose_block(&mut self, parent_hash: &Hash256) -> Option<BlockHeader> {
        let txs = std::mem::take(&mut self.pending_txs);

        let Some((header, _state)) = build_block(&self.store, parent_hash, txs.clone(), &self.key, &self.chain_id)
        else {
            tracing::warn!(node_id = %self.node_id, "propose_block: unknown parent");
            self.pending_txs = txs;
            return None;
        };

        let hash = header.compute_hash();
        self.store.put_header(hash, header.clone());
        self.store.put_body(hash, txs);

        tracing::debug!(node_id = %self.node_id, height = header.height, hash = %hash, "proposed block");
        Some(header)
    }

    /// Validates and, on success, stores a block received from a peer.
    ///
    /// A re-delivery of an already-known hash short-circuits here, before
    /// storing anything: the body is not covered by the header hash, so a
    /// duplicated delivery carrying a substituted body must never overwrite
    /// the legitimate one already on record.
    pub fn receive_block(&mut self, header: BlockHeader, txs: BlockBody) -> bool {
        let hash = header.compute_hash();
        if self.store.contains(&hash) {
            return true;
        }

        if validate_received_block(&self.store, &header, &txs, &self.chain_id) {
            self.store.put_header(hash, header.clone());
            self.store.put_body(hash, txs);
            tracing::debug!(node_id = %self.node_id, height = header.height, hash = %hash, "accepted received block");
            true
        } else {
            tracing::warn!(node_id = %self.node_id, height = header.height, "rejected received block");
            false
        }
    }

    /// Builds and self-signs a vote. Does not ingest it into consensus.
    pub fn create_vote(&self, block_hash: impl Into<String>, height: u64, phase: Phase) -> Vote {
        Vote::new_signed(&self.key, block_hash, height, phase, &self.chain_id)
    }

    /// Ingests `vote`: silently drops duplicates (by [`Vote::dedup_key`]),
    /// otherwise delegates to [`ConsensusState::handle_vote`]. Propagates a
    /// safety violation as a fatal `Err`; on a precommit that causes
    /// finalization, replays the finalized block into live state.
    pub fn receive_vote(&mut self, vote: Vote) -> Result<bool, NodeError> {
        let dedup_key = vote.dedup_key();
        if self.seen_votes.contains(&dedup_key) {
            tracing::debug!(node_id = %self.node_id, "duplicate vote dropped");
            return Ok(false);
        }

        let height = vote.height;
        let phase = vote.phase;
        let previously_finalized = self.consensus.finalized_at(height).map(str::to_string);

        let accepted = self.consensus.handle_vote(vote)?;
        if !accepted {
            tracing::warn!(node_id = %self.node_id, height, "vote rejected");
            return Ok(false);
        }

        self.seen_votes.insert(dedup_key);
        tracing::debug!(node_id = %self.node_id, height, phase = %phase, "vote accepted");

        if phase == Phase::Precommit {
            if let Some(now_finalized) = self.consensus.finalized_at(height).map(str::to_string) {
                if previously_finalized.as_deref() != Some(now_finalized.as_str()) {
                    self._finalize_block(height, &now_finalized);
                }
            }
        }

        Ok(true)
    }

    /// Replays `block_hash`'s transactions into the live application state
    /// and advances `current_height`.
    fn _finalize_block(&mut self, height: u64, block_hash: &str) {
        let Some(hash) = Hash256::from_hex(block_hash) else {
            tracing::warn!(node_id = %self.node_id, height, "finalize: malformed block hash");
            return;
        };
        let Some(txs) = self.store.get_body(&hash) else {
            tracing::warn!(node_id = %self.node_id, height, "finalize: body missing from store");
            return;
        };

        for tx in &txs {
            let _ = self.app_state.apply_tx(tx, &self.chain_id);
        }
        if height > self.current_height {
            self.current_height = height;
        }

        tracing::debug!(node_id = %self.node_id, height, hash = %hash, "block finalized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::HASH_LEN;
    use crate::storage::mem::InMemoryBlockStore;

    fn validator_set(keys: &[KeyPair]) -> HashSet<String> {
        keys.iter().map(|k| k.public_hex().to_string()).collect()
    }

    fn genesis_hash_of<S: BlockStore>(node: &Node<S>) -> Hash256 {
        Hash256::from_hex(node.finalized_at(0).expect("genesis pre-finalized")).unwrap()
    }

    #[test]
    fn genesis_is_prefinalized_at_height_zero() {
        let key = KeyPair::from_seed("seed", 0);
        let set = validator_set(std::slice::from_ref(&key));
        let node = Node::new("n0", key, "test-chain", set, InMemoryBlockStore::new());

        assert_eq!(node.current_height(), 0);
        assert!(node.finalized_at(0).is_some());
        assert_eq!(node.finalized_at(0).unwrap().len(), HASH_LEN * 2);
    }

    #[test]
    fn single_node_finalizes_and_replays_state() {
        let key = KeyPair::from_seed("seed", 0);
        let set = validator_set(std::slice::from_ref(&key));
        let mut node = Node::new("n0", key.clone(), "test-chain", set, InMemoryBlockStore::new());

        let tx = Transaction::new_signed(&key, format!("{}/x", key.public_hex()), "1", "test-chain");
        assert!(node.receive_transaction(tx));

        let genesis_hash = genesis_hash_of(&node);
        let header = node.propose_block(&genesis_hash).expect("known parent");
        let block_hash = header.compute_hash();

        let prevote = node.create_vote(block_hash.to_hex(), 1, Phase::Prevote);
        assert!(node.receive_vote(prevote).unwrap());

        let precommit = node.create_vote(block_hash.to_hex(), 1, Phase::Precommit);
        assert!(node.receive_vote(precommit).unwrap());

        assert_eq!(node.finalized_at(1), Some(block_hash.to_hex().as_str()));
        assert_eq!(node.current_height(), 1);
        assert_eq!(node.app_state().get(&format!("{}/x", node.public_hex())), Some("1"));
    }

    #[test]
    fn duplicate_vote_is_dropped() {
        let key = KeyPair::from_seed("seed", 0);
        let set = validator_set(std::slice::from_ref(&key));
        let mut node = Node::new("n0", key.clone(), "test-chain", set, InMemoryBlockStore::new());

        let genesis_hash = genesis_hash_of(&node);
        let header = node.propose_block(&genesis_hash).expect("known parent");
        let block_hash = header.compute_hash().to_hex();

        let precommit = node.create_vote(block_hash.clone(), 1, Phase::Precommit);
        assert!(node.receive_vote(precommit.clone()).unwrap());
        assert!(!node.receive_vote(precommit).unwrap());
    }

    #[test]
    fn rejected_transaction_is_not_buffered() {
        let key = KeyPair::from_seed("seed", 0);
        let set = validator_set(std::slice::from_ref(&key));
        let mut node = Node::new("n0", key.clone(), "test-chain", set, InMemoryBlockStore::new());

        let mut tx = Transaction::new_signed(&key, format!("{}/x", key.public_hex()), "1", "test-chain");
        tx.value = "tampered".to_string();

        assert!(!node.receive_transaction(tx));
        assert_eq!(node.pending_tx_count(), 0);
    }

    #[test]
    fn propose_block_returns_none_for_unknown_parent() {
        let key = KeyPair::from_seed("seed", 0);
        let set = validator_set(std::slice::from_ref(&key));
        let mut node = Node::new("n0", key, "test-chain", set, InMemoryBlockStore::new());

        let phantom = Hash256::compute(b"nope");
        assert!(node.propose_block(&phantom).is_none());
    }

    #[test]
    fn redelivered_known_block_does_not_overwrite_its_body() {
        let key = KeyPair::from_seed("seed", 0);
        let set = validator_set(std::slice::from_ref(&key));
        let mut node = Node::new("n0", key.clone(), "test-chain", set, InMemoryBlockStore::new());

        let tx = Transaction::new_signed(&key, format!("{}/x", key.public_hex()), "1", "test-chain");
        assert!(node.receive_transaction(tx.clone()));

        let genesis_hash = genesis_hash_of(&node);
        let header = node.propose_block(&genesis_hash).expect("known parent");
        let hash = header.compute_hash();
        let original_len = node.store().get_body(&hash).expect("body just stored").len();
        assert_eq!(original_len, 1);

        // A re-delivery under the same hash, but carrying a substituted
        // (forged) body, must be accepted as a known-hash no-op and must
        // not replace the legitimate stored body.
        let forged_body = Vec::new();
        assert!(node.receive_block(header, forged_body));

        let body_after = node.store().get_body(&hash).expect("body still present");
        assert_eq!(body_after.len(), original_len);
    }
}

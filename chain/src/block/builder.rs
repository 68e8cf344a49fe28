//! Block construction and ingress validation.
//!
//! Both `build_block` and `validate_received_block` reproduce a block
//! deterministically from a fresh, empty application state rather than the
//! parent's cumulative post-state. This reproduces a quirk present in the
//! source this protocol is modeled on (see the design notes in the
//! project's top-level documentation): `state_hash` ends up committing to
//! the *delta* introduced by this one block's transactions, not to the
//! chain's cumulative state. It is preserved deliberately, not a bug to
//! silently "fix" here — `Node::_finalize_block` is what applies a
//! finalized block's transactions to the live, cumulative state.

use crate::block::BlockBody;
use crate::block::header::BlockHeader;
use crate::block::store::BlockStore;
use crate::crypto::KeyPair;
use crate::hash::Hash256;
use crate::state::AppState;

/// Re-executes `txs` against a fresh [`AppState`], silently skipping any
/// transaction that fails ownership or signature checks, and returns the
/// resulting state.
fn execute(txs: &[crate::state::Transaction], chain_id: &str) -> AppState {
    let mut state = AppState::new();
    for tx in txs {
        let _ = state.apply_tx(tx, chain_id);
    }
    state
}

/// Builds a new block extending `parent_hash`.
///
/// Returns `None` if `parent_hash` is not present in `store`. On success,
/// returns the signed header and the resulting (fresh) application state —
/// the caller is responsible for storing the header/body and clearing
/// whatever pending-transaction buffer fed `txs`.
pub fn build_block<S: BlockStore>(
    store: &S,
    parent_hash: &Hash256,
    txs: BlockBody,
    proposer_key: &KeyPair,
    chain_id: &str,
) -> Option<(BlockHeader, AppState)> {
    let parent = store.get_header(parent_hash)?;

    let new_state = execute(&txs, chain_id);
    let mut header = BlockHeader {
        parent_hash: parent.compute_hash().to_hex(),
        height: parent.height + 1,
        state_hash: new_state.commitment().to_hex(),
        proposer: proposer_key.public_hex().to_string(),
        signature: String::new(),
    };
    header.sign(proposer_key, chain_id);

    Some((header, new_state))
}

/// Validates a block received from a peer.
///
/// Returns `true` if the block is already known (idempotent re-delivery),
/// or if it passes all of: known parent, valid proposer signature, and a
/// recomputed `state_hash` matching the declared one. Every rejection is
/// silent (`false`); nothing here raises.
pub fn validate_received_block<S: BlockStore>(
    store: &S,
    header: &BlockHeader,
    txs: &BlockBody,
    chain_id: &str,
) -> bool {
    let hash = header.compute_hash();
    if store.contains(&hash) {
        return true;
    }

    let Some(parent_hash) = Hash256::from_hex(&header.parent_hash) else {
        return false;
    };
    if !store.contains(&parent_hash) {
        return false;
    }

    if !header.verify_signature(chain_id) {
        return false;
    }

    let recomputed = execute(txs, chain_id);
    recomputed.commitment().to_hex() == header.state_hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::mem::InMemoryBlockStore;

    fn genesis_store() -> (InMemoryBlockStore, Hash256) {
        let genesis = BlockHeader::genesis(AppState::new().commitment());
        let hash = genesis.compute_hash();
        let mut store = InMemoryBlockStore::new();
        store.put_header(hash, genesis);
        (store, hash)
    }

    #[test]
    fn build_block_extends_parent_and_signs() {
        let (store, genesis_hash) = genesis_store();
        let proposer = KeyPair::from_seed("seed", 0);

        let (header, _state) =
            build_block(&store, &genesis_hash, Vec::new(), &proposer, "test-chain").expect("parent exists");

        assert_eq!(header.height, 1);
        assert_eq!(header.parent_hash, genesis_hash.to_hex());
        assert!(header.verify_signature("test-chain"));
    }

    #[test]
    fn build_block_returns_none_for_unknown_parent() {
        let store = InMemoryBlockStore::new();
        let proposer = KeyPair::from_seed("seed", 0);
        let missing_parent = Hash256::compute(b"nope");
        assert!(build_block(&store, &missing_parent, Vec::new(), &proposer, "test-chain").is_none());
    }

    #[test]
    fn validate_accepts_reproducible_block() {
        let (mut store, genesis_hash) = genesis_store();
        let proposer = KeyPair::from_seed("seed", 0);
        let (header, _) = build_block(&store, &genesis_hash, Vec::new(), &proposer, "test-chain").unwrap();

        assert!(validate_received_block(&store, &header, &Vec::new(), "test-chain"));

        store.put_header(header.compute_hash(), header.clone());
        assert!(validate_received_block(&store, &header, &Vec::new(), "test-chain"));
    }

    #[test]
    fn validate_rejects_unknown_parent() {
        let store = InMemoryBlockStore::new();
        let proposer = KeyPair::from_seed("seed", 0);
        let mut header = BlockHeader {
            parent_hash: Hash256::compute(b"phantom").to_hex(),
            height: 1,
            state_hash: AppState::new().commitment().to_hex(),
            proposer: proposer.public_hex().to_string(),
            signature: String::new(),
        };
        header.sign(&proposer, "test-chain");
        assert!(!validate_received_block(&store, &header, &Vec::new(), "test-chain"));
    }

    #[test]
    fn validate_rejects_tampered_state_hash() {
        let (store, genesis_hash) = genesis_store();
        let proposer = KeyPair::from_seed("seed", 0);
        let (mut header, _) = build_block(&store, &genesis_hash, Vec::new(), &proposer, "test-chain").unwrap();
        header.state_hash = Hash256::compute(b"forged").to_hex();
        assert!(!validate_received_block(&store, &header, &Vec::new(), "test-chain"));
    }
}

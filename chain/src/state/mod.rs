//! Deterministic key/value application state.
//!
//! [`AppState`] is the thing consensus is ultimately agreeing on: a flat
//! string-to-string map, mutated only through signed, ownership-checked
//! transactions, and summarized by a sorted-key commitment hash.

pub mod tx;

pub use tx::Transaction;

use std::collections::BTreeMap;

use crate::hash::Hash256;

/// Ordered key/value application state.
///
/// Backed by a `BTreeMap` rather than a `HashMap` so that iteration is
/// always in sorted-key order — this is what makes [`AppState::commitment`]
/// independent of insertion order without needing an explicit sort step.
#[derive(Clone, Debug, Default, serde::Serialize)]
pub struct AppState {
    entries: BTreeMap<String, String>,
}

impl AppState {
    /// An empty application state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `tx` to this state.
    ///
    /// Returns `false` (without mutating state) if `tx.key` is not
    /// namespaced under `tx.sender`, or if the signature fails to verify.
    /// Returns `true` after the value is written.
    pub fn apply_tx(&mut self, tx: &Transaction, chain_id: &str) -> bool {
        if !tx.is_owned_by_sender() {
            return false;
        }
        if !tx.verify_signature(chain_id) {
            return false;
        }
        self.entries.insert(tx.key.clone(), tx.value.clone());
        true
    }

    /// Reads the current value for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Number of keys currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// SHA-256 of the canonical JSON encoding of the key/value map.
    ///
    /// Because `entries` is a `BTreeMap`, this value depends only on the
    /// map's contents, never on the order transactions were applied in.
    pub fn commitment(&self) -> Hash256 {
        let bytes = crate::crypto::canonical_bytes(&self.entries);
        Hash256::compute(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;

    #[test]
    fn commitment_is_order_independent() {
        let k1 = KeyPair::from_seed("seed", 0);
        let k2 = KeyPair::from_seed("seed", 1);

        let tx1 = Transaction::new_signed(&k1, format!("{}/a", k1.public_hex()), "1", "test-chain");
        let tx2 = Transaction::new_signed(&k2, format!("{}/b", k2.public_hex()), "2", "test-chain");

        let mut forward = AppState::new();
        assert!(forward.apply_tx(&tx1, "test-chain"));
        assert!(forward.apply_tx(&tx2, "test-chain"));

        let mut backward = AppState::new();
        assert!(backward.apply_tx(&tx2, "test-chain"));
        assert!(backward.apply_tx(&tx1, "test-chain"));

        assert_eq!(forward.commitment().as_bytes(), backward.commitment().as_bytes());
    }

    #[test]
    fn invalid_tx_does_not_mutate_state() {
        let key = KeyPair::from_seed("seed", 0);
        let mut tx = Transaction::new_signed(&key, format!("{}/a", key.public_hex()), "1", "test-chain");
        tx.value = "tampered".to_string();

        let mut state = AppState::new();
        let before = state.commitment();
        assert!(!state.apply_tx(&tx, "test-chain"));
        assert_eq!(state.commitment().as_bytes(), before.as_bytes());
        assert!(state.is_empty());
    }

    #[test]
    fn empty_state_commitment_is_stable() {
        let a = AppState::new().commitment();
        let b = AppState::new().commitment();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }
}

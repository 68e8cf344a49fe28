//! In-memory block store.
//!
//! Useful for unit tests, the simulator harness, and small devnets. Keeps
//! headers and bodies in separate `HashMap`s, both keyed by header hash.

use std::collections::HashMap;

use crate::block::body::BlockBody;
use crate::block::header::BlockHeader;
use crate::block::store::BlockStore;
use crate::hash::Hash256;

/// In-memory implementation of [`BlockStore`].
#[derive(Default)]
pub struct InMemoryBlockStore {
    headers: HashMap<Hash256, BlockHeader>,
    bodies: HashMap<Hash256, BlockBody>,
}

impl InMemoryBlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

impl BlockStore for InMemoryBlockStore {
    fn get_header(&self, hash: &Hash256) -> Option<BlockHeader> {
        self.headers.get(hash).cloned()
    }

    fn put_header(&mut self, hash: Hash256, header: BlockHeader) {
        self.headers.insert(hash, header);
    }

    fn get_body(&self, hash: &Hash256) -> Option<BlockBody> {
        self.bodies.get(hash).cloned()
    }

    fn put_body(&mut self, hash: Hash256, body: BlockBody) {
        self.bodies.insert(hash, body);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;

    fn dummy_header(height: u64) -> BlockHeader {
        BlockHeader {
            parent_hash: "0".repeat(64),
            height,
            state_hash: AppState::new().commitment().to_hex(),
            proposer: "p".to_string(),
            signature: String::new(),
        }
    }

    #[test]
    fn put_and_get_header_roundtrip() {
        let mut store = InMemoryBlockStore::new();
        let header = dummy_header(0);
        let hash = header.compute_hash();

        store.put_header(hash, header.clone());
        let fetched = store.get_header(&hash).expect("header should be present");

        assert_eq!(fetched.height, 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn body_is_tracked_separately_from_header() {
        let mut store = InMemoryBlockStore::new();
        let header = dummy_header(5);
        let hash = header.compute_hash();

        store.put_header(hash, header);
        assert!(store.get_body(&hash).is_none());

        store.put_body(hash, Vec::new());
        assert!(store.get_body(&hash).is_some());
    }
}

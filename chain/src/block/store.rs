//! Block storage trait: separate header and body lookups keyed by hash.
//!
//! Unlike a combined `Block` store, headers and bodies are tracked
//! independently here because votes and parent links only ever need the
//! header; bodies are only consulted at finalization time.

use crate::block::BlockBody;
use crate::block::header::BlockHeader;
use crate::hash::Hash256;

/// Storage for block headers and bodies, keyed by content hash.
pub trait BlockStore {
    /// Looks up a header by its content hash.
    fn get_header(&self, hash: &Hash256) -> Option<BlockHeader>;

    /// Inserts a header under its own content hash.
    fn put_header(&mut self, hash: Hash256, header: BlockHeader);

    /// Looks up a body by the content hash of its header.
    fn get_body(&self, hash: &Hash256) -> Option<BlockBody>;

    /// Inserts a body under a header's content hash.
    fn put_body(&mut self, hash: Hash256, body: BlockBody);

    /// Returns `true` if a header is stored under `hash`.
    fn contains(&self, hash: &Hash256) -> bool {
        self.get_header(hash).is_some()
    }
}

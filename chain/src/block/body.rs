//! Block bodies: the ordered transaction list accompanying a header.

use crate::state::Transaction;

/// The ordered list of transactions included in a block.
///
/// Kept as a thin alias rather than a newtype: nothing beyond ordering and
/// membership is needed at this layer, and a newtype would only add
/// boilerplate indirection over a `Vec`.
pub type BlockBody = Vec<Transaction>;

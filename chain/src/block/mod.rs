//! Block model: content-addressed, signed headers plus the builder and
//! ingress validator that sit on top of them.

pub mod body;
pub mod builder;
pub mod header;
pub mod store;

pub use body::BlockBody;
pub use builder::{build_block, validate_received_block};
pub use header::BlockHeader;
pub use store::BlockStore;

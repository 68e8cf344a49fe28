//! Chain library crate.
//!
//! This crate provides the core building blocks for a small Tendermint-style
//! BFT replicated state machine:
//!
//! - a domain-separated Ed25519 signing envelope (`crypto`),
//! - a deterministic key/value application state (`state`),
//! - content-addressed block headers/bodies and their builder (`block`),
//! - per-height prevote/precommit tallying and finalization (`consensus`),
//! - per-node orchestration tying the three together (`node`),
//! - storage backends for the block/body store (`storage`),
//! - Prometheus-based metrics (`metrics`),
//! - and top-level node configuration (`config`).
//!
//! Higher-level binaries (this crate's `main`, and the `simulator` crate)
//! compose these pieces into runnable validator nodes and scenarios.

pub mod block;
pub mod config;
pub mod consensus;
pub mod crypto;
pub mod hash;
pub mod metrics;
pub mod node;
pub mod state;
pub mod storage;

// Re-export top-level configuration types.
pub use config::{NodeConfig, MetricsConfig, StorageConfig, StorageKind};

// Re-export the hash type used throughout.
pub use hash::Hash256;

// Re-export the signing envelope.
pub use crypto::{Context, KeyPair, canonical_bytes, canonical_string, sign, verify};

// Re-export block model types.
pub use block::{BlockBody, BlockHeader, BlockStore, build_block, validate_received_block};

// Re-export consensus types.
pub use consensus::{ConsensusError, ConsensusState, Phase, Vote};

// Re-export node orchestration.
pub use node::{Node, NodeError};

// Re-export application state and transactions.
pub use state::{AppState, Transaction};

// Re-export storage backends.
pub use storage::{InMemoryBlockStore, RocksDbBlockStore, RocksDbConfig, StorageError};

// Re-export metrics registry.
pub use metrics::{MetricsRegistry, NodeMetrics, run_prometheus_http_server};

/// Type alias for a node backed by the in-memory store — the default for
/// tests, scenarios, and the simulator.
pub type MemNode = Node<InMemoryBlockStore>;

/// Type alias for a node backed by the persistent RocksDB store.
pub type RocksDbNode = Node<RocksDbBlockStore>;

//! Top-level configuration for a chain node.
//!
//! This module aggregates configuration for:
//!
//! - the node's own identity and key material (`NodeConfig`),
//! - which [`crate::block::BlockStore`] backend to use (`StorageConfig`),
//! - the Prometheus metrics exporter (`MetricsConfig`).
//!
//! The goal is a single `NodeConfig` that higher-level binaries (`main.rs`,
//! the `simulator` crate) can construct from defaults or from a seed, the
//! same way the deterministic-key derivation in [`crate::crypto::KeyPair`]
//! lets a scenario reconstruct identical validator sets across runs.

use std::collections::HashSet;
use std::net::SocketAddr;

use crate::storage::RocksDbConfig;

/// How a node's own [`crate::crypto::KeyPair`] should be produced.
#[derive(Clone, Debug)]
pub enum KeySeed {
    /// Derive deterministically via `SHA-256(seed_material || ":" || index)`,
    /// matching [`crate::crypto::KeyPair::from_seed`]. Used by tests, the
    /// simulator, and the determinism harness so that validator identities
    /// are reproducible across runs.
    Deterministic { seed_material: String, index: usize },
    /// Generate a fresh random keypair via the OS RNG.
    Random,
}

impl Default for KeySeed {
    fn default() -> Self {
        KeySeed::Deterministic {
            seed_material: "chain".to_string(),
            index: 0,
        }
    }
}

/// Which [`crate::block::BlockStore`] backend a node should use.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Default)]
pub enum StorageKind {
    /// Volatile, in-process storage — tests, scenarios, small simulations.
    #[default]
    Memory,
    /// Durable, on-disk storage for a long-running validator process.
    RocksDb,
}

/// Configuration selecting and parametrizing the block-store backend.
#[derive(Clone, Debug, Default)]
pub struct StorageConfig {
    pub kind: StorageKind,
    /// Only consulted when `kind == StorageKind::RocksDb`.
    pub rocksdb: RocksDbConfig,
}

/// Configuration for the Prometheus metrics exporter.
#[derive(Clone, Debug)]
pub struct MetricsConfig {
    /// Whether to run a `/metrics` HTTP exporter.
    pub enabled: bool,
    /// Address to bind the metrics HTTP server to.
    pub listen_addr: SocketAddr,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        // Safe to unwrap: this is a fixed, valid address literal.
        let addr: SocketAddr = "127.0.0.1:9898"
            .parse()
            .expect("hard-coded metrics listen address should parse");
        Self {
            enabled: true,
            listen_addr: addr,
        }
    }
}

/// Everything needed to construct a [`crate::node::Node`].
///
/// Plain struct with a `Default` impl for the common case (a single-node
/// devnet with a deterministic key and in-memory storage); no external
/// config-file format is mandated, but the struct is shaped so a binary
/// could deserialize the pieces it cares about from TOML/env and fill in
/// the rest from these defaults.
#[derive(Clone, Debug)]
pub struct NodeConfig {
    pub node_id: String,
    pub chain_id: String,
    /// Public keys (hex) of every validator permitted to vote.
    pub validator_set: HashSet<String>,
    pub key_seed: KeySeed,
    pub storage: StorageConfig,
    pub metrics: MetricsConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            node_id: "node-0".to_string(),
            chain_id: "devnet".to_string(),
            validator_set: HashSet::new(),
            key_seed: KeySeed::default(),
            storage: StorageConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

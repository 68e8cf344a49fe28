// src/main.rs
//
// Minimal single-validator demo node that wires up the chain library:
//
// - in-memory block store (swap for RocksDB via `StorageKind::RocksDb`)
// - a deterministically-derived keypair, validator set of one
// - Prometheus metrics exporter on /metrics
// - a loop that proposes a block every `block_time_secs`, then immediately
//   self-votes prevote + precommit so the single-validator set reaches its
//   own (trivial) quorum and finalizes.

use std::{sync::Arc, time::Duration};

use chain::{KeyPair, MemNode, MetricsRegistry, NodeConfig, Phase, run_prometheus_http_server};

const BLOCK_INTERVAL_SECS: u64 = 5;

#[tokio::main]
async fn main() {
    if let Err(err) = run_node().await {
        eprintln!("fatal error: {err}");
        std::process::exit(1);
    }
}

async fn run_node() -> Result<(), String> {
    let mut cfg = NodeConfig::default();

    // Derive this node's keypair up front so it can seed its own
    // single-member validator set: a one-node devnet is its own quorum.
    let key = KeyPair::from_seed("chain-demo-node", 0);
    cfg.validator_set.insert(key.public_hex().to_string());

    // ---------------------------
    // Metrics registry + exporter
    // ---------------------------

    let metrics = Arc::new(
        MetricsRegistry::new().map_err(|e| format!("failed to initialise metrics registry: {e}"))?,
    );

    if cfg.metrics.enabled {
        let metrics_clone = metrics.clone();
        let addr = cfg.metrics.listen_addr;
        tokio::spawn(async move {
            if let Err(e) = run_prometheus_http_server(metrics_clone, addr).await {
                eprintln!("metrics HTTP server error: {e}");
            }
        });
        eprintln!("metrics exporter listening on http://{}/metrics", addr);
    }

    // ---------------------------
    // Node (in-memory store)
    // ---------------------------

    let mut node: MemNode = MemNode::new(
        cfg.node_id.clone(),
        key,
        cfg.chain_id.clone(),
        cfg.validator_set.clone(),
        chain::InMemoryBlockStore::new(),
    );

    eprintln!(
        "starting node {} on chain {} (block_time_secs={})",
        node.node_id(),
        node.chain_id(),
        BLOCK_INTERVAL_SECS,
    );

    // ---------------------------
    // Main proposal loop
    // ---------------------------

    loop {
        let start = std::time::Instant::now();
        let tip = chain::Hash256::from_hex(
            node.finalized_at(node.current_height())
                .expect("current_height is always finalized"),
        )
        .expect("finalized hash is valid hex");

        if let Some(header) = node.propose_block(&tip) {
            let hash = header.compute_hash();
            metrics.node.blocks_proposed.inc();

            let prevote = node.create_vote(hash.to_hex(), header.height, Phase::Prevote);
            node.receive_vote(prevote)
                .map_err(|e| format!("fatal safety violation: {e}"))?;

            let precommit = node.create_vote(hash.to_hex(), header.height, Phase::Precommit);
            if node
                .receive_vote(precommit)
                .map_err(|e| format!("fatal safety violation: {e}"))?
            {
                metrics.node.blocks_finalized.inc();
            }

            let elapsed = start.elapsed().as_secs_f64();
            metrics.node.block_validation_seconds.observe(elapsed);

            println!(
                "proposed+finalized block height={} hash={}",
                header.height, hash,
            );
        } else {
            eprintln!("failed to propose block: unknown parent {tip}");
        }

        tokio::time::sleep(Duration::from_secs(BLOCK_INTERVAL_SECS)).await;
    }
}

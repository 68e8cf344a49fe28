// src/main.rs
//
// Scenario runner and determinism-verification harness for the `chain`
// consensus core, grounded in the distilled source's
// `tests/verify_determinism.py` and `tests/test_e2e.py`:
//
// - runs the direct-broadcast scenario twice with the same seed and
//   asserts the two runs produced byte-identical finalized maps and state
//   commitments on every node (determinism),
// - then runs the scenario again routed through the unreliable
//   `NetworkSimulator` (drop/duplicate/delay/rate-limit) and reports
//   whether agreement held — safety is asserted; liveness is not
//   guaranteed and is only logged.

mod config;
mod network;
mod scenario;

use config::ScenarioConfig;
use scenario::{run_direct_scenario, run_unreliable_scenario};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "simulator=info,chain=info".to_string()))
        .init();

    let cfg = ScenarioConfig::default();

    tracing::info!(
        chain_id = %cfg.chain_id,
        num_nodes = cfg.num_nodes,
        seed = cfg.seed,
        "running direct-broadcast scenario twice for determinism check"
    );

    let run1 = run_direct_scenario(&cfg);
    let run2 = run_direct_scenario(&cfg);

    if run1.finalized == run2.finalized && run1.state_commitments == run2.state_commitments {
        tracing::info!("DETERMINISM CHECK: PASSED — both runs produced identical state");
    } else {
        tracing::error!("DETERMINISM CHECK: FAILED — runs diverged");
        for id in &run1.node_ids {
            tracing::error!(
                node_id = %id,
                run1_commitment = %run1.state_commitments[id],
                run2_commitment = %run2.state_commitments[id],
                "per-node commitment comparison"
            );
        }
        std::process::exit(1);
    }

    tracing::info!("running the same scenario over an unreliable network (drop/duplicate/delay/rate-limit)");
    let unreliable = run_unreliable_scenario(&cfg, 1_000);

    let finalized_at_1: std::collections::HashSet<_> = unreliable
        .finalized
        .values()
        .filter_map(|h| h.get(&1).cloned())
        .collect();

    match finalized_at_1.len() {
        0 => tracing::warn!("no node finalized height 1 under the unreliable network (liveness is not guaranteed)"),
        1 => tracing::info!(
            hash = %finalized_at_1.iter().next().unwrap(),
            finalized_nodes = unreliable.finalized.values().filter(|h| h.contains_key(&1)).count(),
            "AGREEMENT CHECK: PASSED — every node that finalized height 1 agrees"
        ),
        n => {
            tracing::error!(conflicting_hashes = n, "AGREEMENT CHECK: FAILED — nodes finalized conflicting hashes");
            std::process::exit(1);
        }
    }
}

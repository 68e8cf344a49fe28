//! Scenario construction and execution: wires N validator nodes together,
//! drives a deterministic transaction/propose/prevote/precommit sequence,
//! and reports the resulting per-node state.
//!
//! Grounded in `test_e2e.py` (direct-broadcast scenarios) and
//! `verify_determinism.py` (seed-derived keys, end-to-end run, final-state
//! comparison). Only calls the `chain` crate's public `Node` API.

use std::collections::HashMap;

use chain::{BlockStore, KeyPair, MemNode, Phase, Transaction};

use crate::config::ScenarioConfig;
use crate::network::{Message, NetworkSimulator};

/// The observable outcome of a scenario run, used both to report results
/// and to compare two runs for determinism.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScenarioOutcome {
    pub node_ids: Vec<String>,
    /// Per-node `height -> finalized block hash` map, at every height the
    /// node has finalized.
    pub finalized: HashMap<String, HashMap<u64, String>>,
    /// Per-node application-state commitment (hex).
    pub state_commitments: HashMap<String, String>,
}

/// A node plus the keypair that signs transactions on its behalf in this
/// harness (the node itself only ever signs headers and votes).
struct Validator {
    node_id: String,
    key: KeyPair,
    node: MemNode,
}

fn build_validators(cfg: &ScenarioConfig) -> Vec<Validator> {
    let keys: Vec<KeyPair> = (0..cfg.num_nodes)
        .map(|i| KeyPair::from_seed(&cfg.seed.to_string(), i))
        .collect();
    let validator_set: std::collections::HashSet<String> =
        keys.iter().map(|k| k.public_hex().to_string()).collect();

    keys.into_iter()
        .enumerate()
        .map(|(i, key)| {
            let node_id = format!("Node_{i}");
            let node = MemNode::new(
                node_id.clone(),
                key.clone(),
                cfg.chain_id.clone(),
                validator_set.clone(),
                chain::InMemoryBlockStore::new(),
            );
            Validator { node_id, key, node }
        })
        .collect()
}

fn collect_outcome(validators: &[Validator]) -> ScenarioOutcome {
    let node_ids: Vec<String> = validators.iter().map(|v| v.node_id.clone()).collect();
    let mut finalized = HashMap::new();
    let mut state_commitments = HashMap::new();
    for v in validators {
        let mut heights = HashMap::new();
        for h in 0..=v.node.current_height() {
            if let Some(hash) = v.node.finalized_at(h) {
                heights.insert(h, hash.to_string());
            }
        }
        finalized.insert(v.node_id.clone(), heights);
        state_commitments.insert(v.node_id.clone(), v.node.app_state().commitment().to_hex());
    }
    ScenarioOutcome {
        node_ids,
        finalized,
        state_commitments,
    }
}

/// Runs the direct-broadcast scenario: every message is handed straight to
/// every peer's `receive_*`, with no network in between. Mirrors
/// `verify_determinism.py`'s `run_scenario`: a handful of transactions,
/// one proposed block, a full prevote + precommit round, then a check that
/// every node finalized the same hash.
///
/// Panics if nodes disagree on the finalized hash at height 1 — that would
/// mean either a bug in this harness or a genuine safety violation, and
/// either way the scenario cannot proceed meaningfully.
pub fn run_direct_scenario(cfg: &ScenarioConfig) -> ScenarioOutcome {
    let mut validators = build_validators(cfg);

    // Step 1: every validator but the last writes one key under its own
    // namespace; broadcast each transaction directly to every peer.
    let txs: Vec<Transaction> = validators[..validators.len().saturating_sub(1)]
        .iter()
        .map(|v| {
            Transaction::new_signed(
                &v.key,
                format!("{}/message", v.key.public_hex()),
                format!("hello-from-{}", v.node_id),
                &cfg.chain_id,
            )
        })
        .collect();
    for tx in &txs {
        for v in validators.iter_mut() {
            v.node.receive_transaction(tx.clone());
        }
    }

    // Step 2: the first validator proposes a block over genesis.
    let genesis_hash = chain::Hash256::from_hex(validators[0].node.finalized_at(0).unwrap()).unwrap();
    let header = validators[0]
        .node
        .propose_block(&genesis_hash)
        .expect("genesis is always a known parent");
    let block_hash = header.compute_hash();
    let body = validators[0]
        .node
        .store()
        .get_body(&block_hash)
        .expect("proposer just stored this body");

    for v in validators.iter_mut().skip(1) {
        v.node.receive_block(header.clone(), body.clone());
    }

    // Steps 3 & 4: every node prevotes, then precommits, broadcasting to
    // every node (including itself, a harmless duplicate).
    for phase in [Phase::Prevote, Phase::Precommit] {
        let votes: Vec<_> = validators
            .iter()
            .map(|v| v.node.create_vote(block_hash.to_hex(), header.height, phase))
            .collect();
        for vote in votes {
            for v in validators.iter_mut() {
                v.node
                    .receive_vote(vote.clone())
                    .expect("single-block scenario cannot raise a safety violation");
            }
        }
    }

    let outcome = collect_outcome(&validators);
    let first = outcome.finalized[&validators[0].node_id].get(&1);
    for v in &validators[1..] {
        assert_eq!(
            outcome.finalized[&v.node_id].get(&1),
            first,
            "nodes disagreed on the finalized hash at height 1"
        );
    }
    outcome
}

/// Runs the scenario once, routing the proposed block and every vote
/// through a [`NetworkSimulator`] instead of broadcasting them directly —
/// exercising the "safe under drop/duplicate/delay/reorder" guarantee from
/// the core's external-interfaces contract. Liveness is not guaranteed:
/// under a sufficiently hostile draw, height 1 may simply never finalize
/// on every node, which this function reports rather than asserts against.
pub fn run_unreliable_scenario(cfg: &ScenarioConfig, max_ticks: usize) -> ScenarioOutcome {
    let mut validators = build_validators(cfg);
    let node_ids: Vec<String> = validators.iter().map(|v| v.node_id.clone()).collect();
    let mut net = NetworkSimulator::new(cfg.seed, cfg.network.clone());
    net.connect_all(&node_ids);

    let genesis_hash = chain::Hash256::from_hex(validators[0].node.finalized_at(0).unwrap()).unwrap();
    let header = validators[0]
        .node
        .propose_block(&genesis_hash)
        .expect("genesis is always a known parent");
    let block_hash = header.compute_hash();
    let body = validators[0]
        .node
        .store()
        .get_body(&block_hash)
        .expect("proposer just stored this body");

    for id in node_ids.iter().skip(1) {
        net.send(
            &node_ids[0],
            id,
            Message::Block {
                header: header.clone(),
                body: body.clone(),
            },
        );
    }
    deliver_until_quiet(&mut net, &mut validators, max_ticks);

    // Every node votes both phases; each vote is sent through the
    // unreliable network to every peer (including a loopback send, which
    // models a validator's own gossip echo).
    for phase in [Phase::Prevote, Phase::Precommit] {
        let votes: Vec<(String, chain::Vote)> = validators
            .iter()
            .map(|v| {
                (
                    v.node_id.clone(),
                    v.node.create_vote(block_hash.to_hex(), header.height, phase),
                )
            })
            .collect();
        for (sender, vote) in votes {
            for target in &node_ids {
                net.send(&sender, target, Message::Vote(vote.clone()));
            }
        }
        deliver_until_quiet(&mut net, &mut validators, max_ticks);
    }

    collect_outcome(&validators)
}

fn deliver_until_quiet(net: &mut NetworkSimulator, validators: &mut [Validator], max_ticks: usize) {
    let mut by_id: HashMap<&str, &mut Validator> =
        validators.iter_mut().map(|v| (v.node_id.as_str(), v)).collect();

    for delivered in net.drain(1.0, max_ticks) {
        let Some(validator) = by_id.get_mut(delivered.receiver_id.as_str()) else {
            continue;
        };
        match delivered.message {
            Message::Transaction(tx) => {
                validator.node.receive_transaction(tx);
            }
            Message::Block { header, body } => {
                validator.node.receive_block(header, body);
            }
            Message::Vote(vote) => {
                validator
                    .node
                    .receive_vote(vote)
                    .expect("scenario never injects conflicting precommits");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_scenario_agrees_across_nodes() {
        let cfg = ScenarioConfig {
            num_nodes: 4,
            ..ScenarioConfig::default()
        };
        let outcome = run_direct_scenario(&cfg);
        let hashes: std::collections::HashSet<_> =
            outcome.finalized.values().map(|h| h.get(&1).cloned()).collect();
        assert_eq!(hashes.len(), 1);
    }

    #[test]
    fn direct_scenario_is_deterministic_given_same_seed() {
        let cfg = ScenarioConfig {
            num_nodes: 4,
            seed: 7,
            ..ScenarioConfig::default()
        };
        let a = run_direct_scenario(&cfg);
        let b = run_direct_scenario(&cfg);
        assert_eq!(a.finalized, b.finalized);
        assert_eq!(a.state_commitments, b.state_commitments);
    }

    #[test]
    fn unreliable_scenario_never_disagrees_even_if_it_does_not_finalize() {
        let cfg = ScenarioConfig {
            num_nodes: 4,
            seed: 99,
            ..ScenarioConfig::default()
        };
        let outcome = run_unreliable_scenario(&cfg, 500);
        let hashes: std::collections::HashSet<_> = outcome
            .finalized
            .values()
            .filter_map(|h| h.get(&1).cloned())
            .collect();
        assert!(hashes.len() <= 1, "agreement violated: {hashes:?}");
    }
}

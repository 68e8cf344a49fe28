//! Scenario-level configuration for the simulator binary.

use crate::network::NetworkConfig;

/// Parameters for one run of the determinism/unreliable-network scenario.
///
/// Mirrors `verify_determinism.py`'s `run_scenario(run_id, seed)`: a fixed
/// chain id, a validator count, and a seed that drives both key derivation
/// (`chain::KeyPair::from_seed`) and the network simulator's RNG.
#[derive(Clone, Debug)]
pub struct ScenarioConfig {
    pub chain_id: String,
    pub num_nodes: usize,
    pub seed: u64,
    pub network: NetworkConfig,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            chain_id: "lab01-determinism-test".to_string(),
            num_nodes: 4,
            seed: 42,
            network: NetworkConfig::default(),
        }
    }
}

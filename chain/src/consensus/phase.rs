//! Voting phases.

use serde::{Deserialize, Serialize};

/// The two voting phases of the Tendermint-style round.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Prevote,
    Precommit,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Prevote => "prevote",
            Phase::Precommit => "precommit",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

//! Errors surfaced by [`super::Node`].

use std::fmt;

use crate::consensus::ConsensusError;

/// Errors a node can encounter while processing transactions, blocks, or
/// votes.
///
/// `Fatal` wraps a [`ConsensusError`] (currently only a safety violation)
/// and is never expected to be recovered from by the caller: per the
/// consensus invariants, a node that observes one should stop
/// participating rather than guess at a resolution.
#[derive(Debug)]
pub enum NodeError {
    /// The underlying consensus state machine detected an unrecoverable
    /// safety violation.
    Fatal(ConsensusError),
}

impl From<ConsensusError> for NodeError {
    fn from(e: ConsensusError) -> Self {
        NodeError::Fatal(e)
    }
}

impl fmt::Display for NodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeError::Fatal(e) => write!(f, "fatal consensus error: {e}"),
        }
    }
}

impl std::error::Error for NodeError {}

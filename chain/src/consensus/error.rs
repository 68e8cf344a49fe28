use std::fmt;

/// Errors that can occur inside the consensus state machine.
///
/// `SafetyViolation` is the one truly fatal variant: it means two distinct
/// block hashes both reached quorum at the same height, and a node that
/// observes it cannot safely continue. It must never be swallowed.
#[derive(Debug)]
pub enum ConsensusError {
    /// Two different block hashes both reached quorum at the same height.
    SafetyViolation {
        height: u64,
        first: String,
        second: String,
    },
}

impl fmt::Display for ConsensusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsensusError::SafetyViolation { height, first, second } => write!(
                f,
                "SAFETY VIOLATION at height {height}: both {first} and {second} reached quorum"
            ),
        }
    }
}

impl std::error::Error for ConsensusError {}

use thiserror::Error;

use crate::types::Record;

/// Errors raised by the bracket engine.
///
/// Configuration errors are detected before any trial runs. `NoOpponent`
/// means the pairing policy reached a state it should never reach, so it
/// aborts the whole run instead of dropping the trial.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SwissError {
    #[error("Roster size mismatch: ruleset expects {expected} teams, found {found}")]
    RosterSize { expected: usize, found: usize },

    #[error("Duplicate team name: {0}")]
    DuplicateTeam(String),

    #[error("Duplicate seed: {0}")]
    DuplicateSeed(u32),

    #[error("Invalid series length: best-of-{0} (must be odd and at least 1)")]
    InvalidSeries(u8),

    #[error("Invalid ruleset: {0}")]
    InvalidRuleset(String),

    #[error("Unsupported round {round}")]
    UnsupportedRound { round: u32 },

    #[error("Record {record} has no place in the round {round} table")]
    UnexpectedRecord { record: Record, round: u32 },

    #[error("No opponent found for {team} in round {round}")]
    NoOpponent { team: String, round: u32 },
}

impl SwissError {
    /// Whether the error comes from the roster or ruleset rather than the engine.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, SwissError::NoOpponent { .. })
    }
}

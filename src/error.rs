//! Engine error types.
//!
//! Running out of moves is not an error: move queries return `Option`.

use derive_more::{Display, Error};
use tracing::warn;

/// Errors reported by the knowledge engine and the board.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum EngineError {
    /// The caller broke the input contract (bad coordinate, repeated
    /// reveal, impossible neighbor count, bad board dimensions).
    #[display("invalid input: {reason}")]
    InvalidInput { reason: String },
    /// The evidence supplied so far cannot all be true.
    #[display("contradiction: {reason}")]
    Contradiction { reason: String },
}

impl EngineError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        warn!(%reason, "rejected input");
        Self::InvalidInput { reason }
    }

    pub fn contradiction(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        warn!(%reason, "inconsistent knowledge");
        Self::Contradiction { reason }
    }

    pub fn is_contradiction(&self) -> bool {
        matches!(self, Self::Contradiction { .. })
    }
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;

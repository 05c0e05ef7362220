//! Error types for the mechanics engine.

/// Errors that can occur while rolling flat checks.
#[derive(Debug, thiserror::Error)]
pub enum MechError {
    /// The dice primitive failed to produce a result.
    #[error("roll failed: {0}")]
    RollFailed(String),

    /// A scripted roller ran out of prepared results.
    #[error("no scripted rolls left")]
    RollsExhausted,
}

/// Convenience result type for mechanics operations.
pub type MechResult<T> = Result<T, MechError>;

use thiserror::Error;

use shared::domain::MAX_ARGUMENT_ROUNDS;

/// Failures surfaced by session operations. Validation and precondition
/// variants are raised before any backend call; the remote variants wrap
/// the collaborating service's message.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no documents staged; upload at least one before filing")]
    NothingStaged,
    #[error("argument text is empty")]
    EmptyArgument,
    #[error("no active case")]
    NoActiveCase,
    #[error("the {limit}-round argument limit has been reached")]
    RoundLimitReached { limit: u32 },
    #[error("a case filing is already in flight")]
    FilingInFlight,
    #[error("an argument submission is already in flight")]
    ArgumentInFlight,
    #[error("the session was reset while the request was in flight")]
    SessionReset,
    #[error("case filing failed: {0}")]
    FilingFailed(String),
    #[error("verdict request failed: {0}")]
    VerdictFailed(String),
    #[error("argument submission failed: {0}")]
    ArgumentFailed(String),
    #[error("case status request failed: {0}")]
    StatusFailed(String),
}

impl SessionError {
    pub fn round_limit() -> Self {
        SessionError::RoundLimitReached {
            limit: MAX_ARGUMENT_ROUNDS,
        }
    }
}

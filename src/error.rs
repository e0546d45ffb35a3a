// src/error.rs
// Standardized error types for scalplab

use crate::governor::GovernorError;
use std::fmt::Display;
use thiserror::Error;

/// Main error type for the scalplab library
#[derive(Error, Debug)]
pub enum ScalpError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Rejected by the governor; retry after the given number of seconds.
    #[error("cooldown active: available in {0}s")]
    CooldownActive(u64),

    /// The AI service reported too many requests or an exhausted quota.
    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("missing credential: {0}")]
    MissingCredential(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience type alias for Result using ScalpError
pub type Result<T> = std::result::Result<T, ScalpError>;

impl<E: Display> From<GovernorError<E>> for ScalpError {
    fn from(err: GovernorError<E>) -> Self {
        match err {
            GovernorError::CooldownActive(secs) => ScalpError::CooldownActive(secs),
            GovernorError::RateLimited(e) => ScalpError::RateLimited(format!("{e:#}")),
            GovernorError::Failed(e) => ScalpError::Llm(format!("{e:#}")),
        }
    }
}

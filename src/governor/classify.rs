// src/governor/classify.rs
// Rate-limit detection for failed external calls

use std::fmt::Display;

/// Exact markers the AI service puts in rate-limit failures.
const RATE_LIMIT_MARKERS: &[&str] = &["429", "RESOURCE_EXHAUSTED"];

/// Matched case-insensitively ("quota", "Quota exceeded", ...).
const QUOTA_MARKER: &str = "quota";

/// How a failed dispatch affects governor state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Too many requests / quota exhausted - opens the global cooldown.
    RateLimited,
    /// Anything else - passed through with no state change.
    Transient,
}

/// Check a failure message for rate-limit markers.
pub fn is_rate_limit_message(message: &str) -> bool {
    RATE_LIMIT_MARKERS.iter().any(|m| message.contains(m))
        || message.to_lowercase().contains(QUOTA_MARKER)
}

/// Classify a failure from its rendered text.
///
/// Uses the alternate format so `anyhow` errors include their context chain.
pub fn classify_failure<E: Display + ?Sized>(err: &E) -> FailureKind {
    if is_rate_limit_message(&format!("{err:#}")) {
        FailureKind::RateLimited
    } else {
        FailureKind::Transient
    }
}

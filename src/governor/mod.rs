// src/governor/mod.rs
// Process-wide request governor for outbound AI calls
//
// Every call to the AI service goes through one FIFO queue. Dispatches are
// spaced at least `min_request_gap` apart, and a rate-limited failure opens a
// global cooldown during which submissions fail fast without touching the
// service.

mod classify;
mod cooldown;

pub use classify::{FailureKind, classify_failure, is_rate_limit_message};
pub use cooldown::{CooldownWindow, ceil_secs};

use std::fmt::Display;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Minimum spacing between two dispatches, measured start to start.
pub const MIN_REQUEST_GAP: Duration = Duration::from_millis(5_000);

/// Fail-fast window opened after a rate-limited call.
pub const COOLDOWN_PERIOD: Duration = Duration::from_millis(65_000);

/// Governor timings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GovernorConfig {
    pub min_request_gap: Duration,
    pub cooldown_period: Duration,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            min_request_gap: MIN_REQUEST_GAP,
            cooldown_period: COOLDOWN_PERIOD,
        }
    }
}

/// Outcome of a submission that did not produce a value.
#[derive(Debug, Error)]
pub enum GovernorError<E> {
    /// Rejected before dispatch; the service was not contacted.
    #[error("cooldown active: available in {0}s")]
    CooldownActive(u64),

    /// The call failed with a rate-limit marker and opened the cooldown.
    #[error("rate limited: {0}")]
    RateLimited(E),

    /// Any other failure of the call, unchanged.
    #[error("{0}")]
    Failed(E),
}

impl<E> GovernorError<E> {
    /// Seconds left in the cooldown, for `CooldownActive` only.
    pub fn cooldown_secs(&self) -> Option<u64> {
        match self {
            Self::CooldownActive(secs) => Some(*secs),
            _ => None,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }

    /// The original failure, if the call was dispatched.
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::CooldownActive(_) => None,
            Self::RateLimited(e) | Self::Failed(e) => Some(e),
        }
    }
}

#[derive(Debug, Default)]
struct GovernorState {
    cooldown: CooldownWindow,
    last_dispatch_at: Option<Instant>,
}

/// Serializing, spacing and cooldown gate in front of the AI service.
#[derive(Debug)]
pub struct RequestGovernor {
    config: GovernorConfig,
    /// Tail of the call sequence. The tokio mutex grants the lock in the order
    /// it was requested, which gives FIFO dispatch.
    queue: tokio::sync::Mutex<()>,
    state: Mutex<GovernorState>,
    next_ticket: AtomicU64,
}

impl RequestGovernor {
    pub fn new(config: GovernorConfig) -> Self {
        Self {
            config,
            queue: tokio::sync::Mutex::new(()),
            state: Mutex::new(GovernorState::default()),
            next_ticket: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> GovernorConfig {
        self.config
    }

    /// Submit one unit of work (exactly one external call).
    ///
    /// Waits for every earlier submission to settle, rejects with
    /// `CooldownActive` while a cooldown is open, sleeps off any remaining
    /// minimum gap, then runs `work`. Failures are classified and always
    /// returned to the caller.
    pub async fn submit<F, Fut, T, E>(&self, work: F) -> Result<T, GovernorError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        debug!(ticket, "Joining request queue");

        // Released on every exit path, including a panicking `work`
        let _slot = self.queue.lock().await;

        let wait = {
            let now = Instant::now();
            let mut state = self.lock_state();

            let remaining = state.cooldown.remaining_secs(now);
            if remaining > 0 {
                debug!(ticket, cooldown_secs = remaining, "Rejected during cooldown");
                return Err(GovernorError::CooldownActive(remaining));
            }

            state
                .last_dispatch_at
                .map(|last| {
                    self.config
                        .min_request_gap
                        .saturating_sub(now.saturating_duration_since(last))
                })
                .unwrap_or(Duration::ZERO)
        };

        if !wait.is_zero() {
            info!(ticket, wait_ms = wait.as_millis() as u64, "Spacing request");
            tokio::time::sleep(wait).await;
        }

        self.lock_state().last_dispatch_at = Some(Instant::now());
        debug!(ticket, "Dispatching request");

        match work().await {
            Ok(value) => Ok(value),
            Err(err) => match classify_failure(&err) {
                FailureKind::RateLimited => {
                    let period = self.config.cooldown_period;
                    self.lock_state().cooldown.open(Instant::now(), period);
                    warn!(
                        ticket,
                        cooldown_secs = ceil_secs(period),
                        error = %err,
                        "Rate limit hit, all AI calls paused"
                    );
                    Err(GovernorError::RateLimited(err))
                }
                FailureKind::Transient => {
                    debug!(ticket, error = %err, "Request failed");
                    Err(GovernorError::Failed(err))
                }
            },
        }
    }

    /// Whole seconds left in the active cooldown, 0 if none.
    ///
    /// Clears an expired cooldown flag as a side effect; never touches the
    /// expiry instant, the dispatch history or the queue.
    pub fn remaining_cooldown_secs(&self) -> u64 {
        self.lock_state().cooldown.remaining_secs(Instant::now())
    }

    fn lock_state(&self) -> MutexGuard<'_, GovernorState> {
        // State stays consistent across a panic: every write is a single store
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for RequestGovernor {
    fn default() -> Self {
        Self::new(GovernorConfig::default())
    }
}

static GLOBAL: OnceLock<Arc<RequestGovernor>> = OnceLock::new();

/// Install the process-wide governor. The first call wins; later calls
/// return the already installed instance.
pub fn install_global(config: GovernorConfig) -> Arc<RequestGovernor> {
    GLOBAL
        .get_or_init(|| Arc::new(RequestGovernor::new(config)))
        .clone()
}

/// The process-wide governor, created with default timings if none was
/// installed.
pub fn global() -> Arc<RequestGovernor> {
    install_global(GovernorConfig::default())
}

// src/governor/cooldown.rs
// Global cooldown window opened after a rate-limited call

use std::time::Duration;
use tokio::time::Instant;

/// Cooldown state shared by the governor and the oracle.
///
/// `expires_at` is only meaningful while `throttled` is set. Clearing the
/// flag on expiry leaves `expires_at` untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct CooldownWindow {
    throttled: bool,
    expires_at: Option<Instant>,
}

impl CooldownWindow {
    pub fn is_throttled(&self) -> bool {
        self.throttled
    }

    pub fn expires_at(&self) -> Option<Instant> {
        self.expires_at
    }

    /// Start (or restart) the window at `now`.
    pub fn open(&mut self, now: Instant, period: Duration) {
        self.throttled = true;
        self.expires_at = Some(now + period);
    }

    /// Whole seconds left in the window, rounded up.
    ///
    /// Returns 0 when no window is active. A window found to be elapsed is
    /// cleared here (lazy expiry); this only ever moves `throttled` from true
    /// to false.
    pub fn remaining_secs(&mut self, now: Instant) -> u64 {
        if !self.throttled {
            return 0;
        }

        let remaining = self
            .expires_at
            .map(|expires_at| ceil_secs(expires_at.saturating_duration_since(now)))
            .unwrap_or(0);

        if remaining == 0 {
            self.throttled = false;
        }
        remaining
    }
}

/// Round a duration up to whole seconds.
pub fn ceil_secs(duration: Duration) -> u64 {
    duration.as_secs() + u64::from(duration.subsec_nanos() > 0)
}

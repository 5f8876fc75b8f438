//! Repeating, cancellable tick source.
//!
//! The ticker does not own a thread or a timer. It only tracks whether a tick
//! loop is armed and hands out a stop handle per arming. Whoever actually
//! schedules ticks (the cooperative [`crate::driver`], a GUI frame callback,
//! a test) must drop any tick whose handle was cancelled.

use crate::cancellation::CancellationToken;
use std::time::{Duration, Instant};

pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(16);

#[derive(Debug)]
pub struct Ticker {
    period: Duration,
    armed: Option<CancellationToken>,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            armed: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Arm the loop. A previous arming is cancelled first so at most one
    /// handle is ever live.
    pub fn arm(&mut self) -> CancellationToken {
        self.disarm();
        let token = CancellationToken::new();
        self.armed = Some(token.clone());
        token
    }

    /// Cancel the live handle, if any. Once this returns no tick issued under
    /// that handle is valid.
    pub fn disarm(&mut self) {
        if let Some(token) = self.armed.take() {
            token.cancel();
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
            .as_ref()
            .is_some_and(|token| !token.is_cancelled())
    }

    pub fn handle(&self) -> Option<CancellationToken> {
        self.armed
            .as_ref()
            .filter(|token| !token.is_cancelled())
            .cloned()
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_PERIOD)
    }
}

/// Monotonic time source, expressed as an offset from an arbitrary origin.
pub trait Clock {
    fn now(&self) -> Duration;
}

#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        Instant::now().saturating_duration_since(self.origin)
    }
}

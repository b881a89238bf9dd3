//! Session timer: simulated mining progress over a fixed wall-clock duration.
//!
//! Progress is a pure function of `started_at` and the sampled time. Ticks
//! only decide *when* it is recomputed, so a slow, suspended, or skipped tick
//! can delay the display but never desynchronise it from real elapsed time.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use minefaucet_core::constants::{HASHRATE_MAX, HASHRATE_MIN, SESSION_DURATION_MS};
use minefaucet_core::TimestampMs;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    #[default]
    Idle,
    Mining,
    Ready,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Idle => "idle",
            SessionState::Mining => "mining",
            SessionState::Ready => "ready",
        };
        f.write_str(s)
    }
}

/// Result of one session tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SessionTick {
    /// No session is running; nothing was recomputed.
    Inactive,
    /// Still mining at the given fraction.
    Progress(f64),
    /// The session reached full duration on this tick. Reported once.
    Completed,
}

/// `clamp((now - started_at) / SESSION_DURATION_MS, 0, 1)`.
pub fn elapsed_fraction(started_at: TimestampMs, now: TimestampMs) -> f64 {
    let elapsed = now.saturating_sub(started_at).max(0) as f64;
    (elapsed / SESSION_DURATION_MS as f64).clamp(0.0, 1.0)
}

#[derive(Clone, Debug, Default)]
pub struct SessionTimer {
    state: SessionState,
    started_at: Option<TimestampMs>,
    elapsed_fraction: f64,
    display_rate: f64,
}

impl SessionTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a session at `now`. Guards live in the controller.
    pub fn start(&mut self, now: TimestampMs) {
        self.state = SessionState::Mining;
        self.started_at = Some(now);
        self.elapsed_fraction = 0.0;
        self.display_rate = 0.0;
    }

    /// Recompute progress from absolute elapsed time and redraw the cosmetic rate.
    pub fn tick<G: Rng + ?Sized>(&mut self, now: TimestampMs, rng: &mut G) -> SessionTick {
        let Some(started_at) = self.started_at else {
            return SessionTick::Inactive;
        };
        if self.state != SessionState::Mining {
            return SessionTick::Inactive;
        }

        // A wall clock stepping backwards must not move the bar backwards.
        let fraction = elapsed_fraction(started_at, now).max(self.elapsed_fraction);
        self.elapsed_fraction = fraction;

        if fraction >= 1.0 {
            self.state = SessionState::Ready;
            self.display_rate = 0.0;
            return SessionTick::Completed;
        }

        self.display_rate = rng.gen_range(HASHRATE_MIN..HASHRATE_MAX);
        SessionTick::Progress(fraction)
    }

    /// Drop the session and return to `Idle`.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Only a running session has a tick scheduled.
    pub fn is_ticking(&self) -> bool {
        self.state == SessionState::Mining
    }

    pub fn started_at(&self) -> Option<TimestampMs> {
        self.started_at
    }

    pub fn elapsed_fraction(&self) -> f64 {
        self.elapsed_fraction
    }

    pub fn display_rate(&self) -> f64 {
        self.display_rate
    }

    /// Milliseconds left in the session as of `now`. Zero unless mining.
    pub fn time_remaining_ms(&self, now: TimestampMs) -> u64 {
        match (self.state, self.started_at) {
            (SessionState::Mining, Some(started_at)) => {
                let end = started_at.saturating_add(SESSION_DURATION_MS as i64);
                end.saturating_sub(now).max(0) as u64
            }
            _ => 0,
        }
    }
}

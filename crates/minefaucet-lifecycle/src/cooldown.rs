//! Cooldown window derived from the on-chain `next_claim_time`.
//!
//! The window holds the last fetched timestamp, never a running counter.
//! Each tick re-derives the remaining time from that timestamp and the
//! sampled clock, so the countdown cannot drift or be extended locally.

use minefaucet_core::record::cooldown_remaining_ms;
use minefaucet_core::{ClaimRecord, Timestamp, TimestampMs};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CooldownWindow {
    next_claim_time: Option<Timestamp>,
    remaining_ms: u64,
}

impl CooldownWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt a freshly read record. `None` means the contract has no data
    /// for the address, which leaves nothing to wait for.
    pub fn recompute(&mut self, record: Option<&ClaimRecord>, now: TimestampMs) -> u64 {
        self.next_claim_time = record.map(|r| r.next_claim_time);
        self.tick(now)
    }

    /// Re-derive `remaining_ms` from the latest known `next_claim_time`.
    pub fn tick(&mut self, now: TimestampMs) -> u64 {
        self.remaining_ms = match self.next_claim_time {
            Some(next) => cooldown_remaining_ms(next, now),
            None => 0,
        };
        self.remaining_ms
    }

    /// Forget the window entirely (wallet disconnected).
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    pub fn next_claim_time(&self) -> Option<Timestamp> {
        self.next_claim_time
    }

    /// The countdown tick is scheduled only while time remains.
    pub fn is_active(&self) -> bool {
        self.remaining_ms > 0
    }
}

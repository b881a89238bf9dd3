//! minefaucet-core::record
//!
//! The per-wallet claim record as stored by the faucet contract.

use serde::{Deserialize, Serialize};

use crate::constants::ALLOWANCE_CAP;
use crate::types::{Amount, Timestamp, TimestampMs};

/// Authoritative per-address claim state, as last read from the chain.
///
/// The client never edits a record; it only replaces it with a fresh read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRecord {
    /// Cumulative reward already paid out to this address.
    pub total_claimed: Amount,
    /// `ALLOWANCE_CAP - total_claimed` as reported by the contract.
    pub remaining_allowance: Amount,
    /// Unix seconds after which a new session may start.
    pub next_claim_time: Timestamp,
}

impl ClaimRecord {
    /// Build a record for an address that has claimed `total_claimed` so far,
    /// deriving the remaining allowance from the cap.
    pub fn new(total_claimed: Amount, next_claim_time: Timestamp) -> Self {
        Self {
            total_claimed,
            remaining_allowance: ALLOWANCE_CAP.saturating_sub(total_claimed),
            next_claim_time,
        }
    }

    /// `remaining_allowance + total_claimed == ALLOWANCE_CAP`.
    pub fn is_consistent(&self) -> bool {
        self.total_claimed.checked_add(self.remaining_allowance) == Some(ALLOWANCE_CAP)
    }

    /// True once the lifetime cap has been reached.
    pub fn is_exhausted(&self) -> bool {
        self.remaining_allowance == 0
    }

    /// Milliseconds until `next_claim_time`, at whole-second resolution.
    pub fn cooldown_remaining_ms(&self, now_ms: TimestampMs) -> u64 {
        cooldown_remaining_ms(self.next_claim_time, now_ms)
    }
}

/// `max(0, next_claim_time - now_s) * 1000`, with `now_s` floored from `now_ms`.
pub fn cooldown_remaining_ms(next_claim_time: Timestamp, now_ms: TimestampMs) -> u64 {
    let now_s = now_ms.div_euclid(1000);
    let secs = next_claim_time.saturating_sub(now_s).max(0);
    (secs as u64).saturating_mul(1000)
}

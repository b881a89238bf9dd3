//! Read-only view handed to the display surface.

use serde::Serialize;

use minefaucet_core::{Address, Amount, TxHash};

use crate::session::SessionState;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    /// Handed to the writer; no hash yet.
    Unsent,
    /// Broadcast, waiting for the receipt.
    Pending,
    Confirmed,
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ClaimView {
    pub hash: Option<TxHash>,
    pub status: ClaimStatus,
}

/// Everything the display needs for one frame.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    pub state: SessionState,
    /// Session progress, 0–100.
    pub progress: f64,
    pub time_remaining_ms: u64,
    pub cosmetic_rate: f64,
    pub cooldown_ms: u64,
    pub total_claimed: Option<Amount>,
    pub remaining_allowance: Option<Amount>,
    pub wallet: Option<Address>,
    pub claim: Option<ClaimView>,
}

impl Snapshot {
    /// Whether the display should offer the start action.
    pub fn can_start(&self) -> bool {
        self.wallet.is_some() && self.state == SessionState::Idle && self.cooldown_ms == 0
    }

    /// Whether the display should offer the claim action.
    pub fn can_claim(&self) -> bool {
        self.wallet.is_some() && self.state == SessionState::Ready && self.claim.is_none()
    }
}

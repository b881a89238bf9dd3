use serde::{Deserialize, Serialize};

use minefaucet_core::{Amount, ClaimRecord, Timestamp};

use crate::client::WireError;

/// Claim record as returned by `faucet_getClaimRecord`.
///
/// Amounts travel as decimal strings so large values survive JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcClaimRecord {
    pub total_claimed: String,
    pub remaining_allowance: String,
    pub next_claim_time: Timestamp,
}

impl RpcClaimRecord {
    pub fn into_record(self) -> Result<ClaimRecord, WireError> {
        Ok(ClaimRecord {
            total_claimed: parse_amount("total_claimed", &self.total_claimed)?,
            remaining_allowance: parse_amount("remaining_allowance", &self.remaining_allowance)?,
            next_claim_time: self.next_claim_time,
        })
    }
}

/// Receipt returned by `faucet_getReceipt` once a claim has settled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcReceipt {
    /// `"confirmed"` or `"reverted"`.
    pub status: String,
    pub reason: Option<String>,
}

/// Faucet parameters returned by `faucet_getInfo`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcFaucetInfo {
    pub token: String,
    pub reward_per_claim: String,
    pub allowance_cap: String,
    pub session_duration_ms: u64,
}

fn parse_amount(field: &str, s: &str) -> Result<Amount, WireError> {
    s.parse()
        .map_err(|e| WireError::Malformed(format!("{field}: {e}")))
}

use thiserror::Error;

use minefaucet_core::format::format_duration_ms;
use minefaucet_core::ChainError;

use crate::session::SessionState;

/// Signals raised by the lifecycle controller.
///
/// Guard violations are raised before any external call and leave state
/// untouched. Transaction failures return the session to `Ready`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    // ── Guard violations ─────────────────────────────────────────────────────
    #[error("cooldown active: {} remaining", format_duration_ms(*.remaining_ms))]
    CooldownActive { remaining_ms: u64 },

    #[error("wallet not connected")]
    WalletDisconnected,

    #[error("a session is already {0}")]
    AlreadyMining(SessionState),

    #[error("nothing to claim: session is {0}")]
    NotReady(SessionState),

    #[error("a claim is already in flight")]
    ClaimInFlight,

    #[error("controller has been torn down")]
    TornDown,

    // ── Transaction failures ─────────────────────────────────────────────────
    #[error("transaction rejected: {0}")]
    TransactionRejected(String),

    #[error("transaction reverted: {0}")]
    TransactionReverted(String),

    // ── Read failures ────────────────────────────────────────────────────────
    #[error("claim record unavailable: {0}")]
    ReadFailed(ChainError),
}

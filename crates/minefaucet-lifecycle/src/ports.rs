//! Contracts for the collaborators the controller consumes.
//!
//! The controller never talks to a node, a wallet, or a screen directly; it
//! goes through these traits so the same state machine runs against the
//! JSON-RPC client in production and hand-written fakes in tests.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use minefaucet_core::{Address, ChainError, ClaimRecord, TimestampMs, TxHash};

// ── Wallet ───────────────────────────────────────────────────────────────────

/// Identity of the connected account, as reported by the wallet provider.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletSession {
    pub address: Option<Address>,
    pub connected: bool,
}

impl WalletSession {
    pub fn connected(address: Address) -> Self {
        Self {
            address: Some(address),
            connected: true,
        }
    }

    pub fn disconnected() -> Self {
        Self::default()
    }

    /// The address, only while the session is actually connected.
    pub fn active_address(&self) -> Option<Address> {
        if self.connected {
            self.address
        } else {
            None
        }
    }
}

/// Source of wallet sessions (keyfile, hardware wallet, browser extension…).
pub trait WalletProvider {
    type Error;

    fn session(&self) -> WalletSession;
    fn connect(&mut self) -> Result<WalletSession, Self::Error>;
    fn disconnect(&mut self) -> WalletSession;
}

// ── Chain ────────────────────────────────────────────────────────────────────

/// Settlement outcome of a broadcast claim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TxOutcome {
    Confirmed,
    Reverted { reason: String },
}

/// Read side of the faucet contract.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// The claim record for `address`, or `None` when the contract has no data.
    async fn claim_record(&self, address: &Address) -> Result<Option<ClaimRecord>, ChainError>;
}

/// Write side of the faucet contract plus its receipt watcher.
#[async_trait]
pub trait ChainWriter: Send + Sync {
    /// Broadcast a claim from `address`. Returns once the transaction has a hash.
    async fn submit_claim(&self, address: &Address) -> Result<TxHash, ChainError>;

    /// Resolve once `hash` has settled. Implementations must not time out.
    async fn wait_for_receipt(&self, hash: &TxHash) -> Result<TxOutcome, ChainError>;
}

#[async_trait]
impl<T: ChainReader + ?Sized> ChainReader for Arc<T> {
    async fn claim_record(&self, address: &Address) -> Result<Option<ClaimRecord>, ChainError> {
        (**self).claim_record(address).await
    }
}

#[async_trait]
impl<T: ChainWriter + ?Sized> ChainWriter for Arc<T> {
    async fn submit_claim(&self, address: &Address) -> Result<TxHash, ChainError> {
        (**self).submit_claim(address).await
    }

    async fn wait_for_receipt(&self, hash: &TxHash) -> Result<TxOutcome, ChainError> {
        (**self).wait_for_receipt(hash).await
    }
}

// ── Notifications ────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// A user-facing notice. Fire-and-forget.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notice {
    pub fn new(severity: Severity, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity,
        }
    }
}

pub trait NotificationSink {
    fn notify(&self, notice: Notice);
}

impl<T: NotificationSink + ?Sized> NotificationSink for Arc<T> {
    fn notify(&self, notice: Notice) {
        (**self).notify(notice)
    }
}

// ── Clock ────────────────────────────────────────────────────────────────────

/// Wall-clock source, in Unix milliseconds.
pub trait Clock {
    fn now_ms(&self) -> TimestampMs;
}

/// Wall clock backed by the system time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> TimestampMs {
        chrono::Utc::now().timestamp_millis()
    }
}

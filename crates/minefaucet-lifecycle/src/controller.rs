//! Lifecycle controller: the state machine that owns the mining session, the
//! cooldown window, and the single in-flight claim.
//!
//! Transitions:
//!   idle    → mining   `start`, wallet connected and cooldown elapsed
//!   mining  → ready    session tick reaches full duration
//!   ready   → claiming `claim`, wallet connected and nothing in flight
//!   claiming → idle    receipt confirmed (one record re-read, session reset)
//!   claiming → ready   submission refused or transaction reverted
//!
//! Every method takes the sampled wall-clock time explicitly; the controller
//! never reads a clock of its own.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use minefaucet_core::constants::REWARD_PER_CLAIM;
use minefaucet_core::format::format_duration_ms;
use minefaucet_core::{Address, ClaimRecord, TimestampMs, TxHash};

use crate::cooldown::CooldownWindow;
use crate::error::LifecycleError;
use crate::flight::{claim_flight, ClaimEvent, ClaimFlight};
use crate::ports::{ChainReader, ChainWriter, Notice, NotificationSink, Severity, WalletSession};
use crate::session::{SessionState, SessionTick, SessionTimer};
use crate::snapshot::{ClaimStatus, ClaimView, Snapshot};

/// The claim currently in flight. At most one exists at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClaimTransaction {
    /// Wallet that requested the claim.
    pub address: Address,
    pub hash: Option<TxHash>,
    pub status: ClaimStatus,
}

pub struct Controller<R, W: ?Sized, N> {
    reader: R,
    writer: Arc<W>,
    notifier: N,
    wallet: WalletSession,
    record: Option<ClaimRecord>,
    session: SessionTimer,
    cooldown: CooldownWindow,
    claim: Option<ClaimTransaction>,
    rng: StdRng,
    torn_down: bool,
}

impl<R, W, N> Controller<R, W, N>
where
    R: ChainReader,
    W: ChainWriter + ?Sized + 'static,
    N: NotificationSink,
{
    pub fn new(reader: R, writer: Arc<W>, notifier: N) -> Self {
        Self::with_rng(reader, writer, notifier, StdRng::from_entropy())
    }

    /// Construct with a fixed RNG so the cosmetic rate is reproducible.
    pub fn with_rng(reader: R, writer: Arc<W>, notifier: N, rng: StdRng) -> Self {
        Self {
            reader,
            writer,
            notifier,
            wallet: WalletSession::disconnected(),
            record: None,
            session: SessionTimer::new(),
            cooldown: CooldownWindow::new(),
            claim: None,
            rng,
            torn_down: false,
        }
    }

    // ── Wallet ───────────────────────────────────────────────────────────────

    /// Adopt a new wallet session from the provider.
    ///
    /// A connected session triggers one claim-record read for its address. A
    /// disconnected one forgets the record and the cooldown; a running
    /// session is kept since it is purely local.
    ///
    /// While a claim is in flight the read is deferred: the claim's
    /// settlement performs it, against whichever wallet is connected then.
    /// The claimant's own record is not read once another wallet is active.
    pub async fn set_wallet(
        &mut self,
        session: WalletSession,
        now: TimestampMs,
    ) -> Result<(), LifecycleError> {
        let previous = self.wallet.active_address();
        self.wallet = session;

        match session.active_address() {
            Some(address) => {
                if previous != Some(address) {
                    self.record = None;
                    self.cooldown.clear();
                }
                info!(%address, "wallet connected");
                if let Some(tx) = &self.claim {
                    debug!(
                        %address,
                        claimant = %tx.address,
                        "record read deferred until the claim settles"
                    );
                    return Ok(());
                }
                self.refresh(now).await
            }
            None => {
                if previous.is_some() {
                    info!("wallet disconnected");
                }
                self.record = None;
                self.cooldown.clear();
                Ok(())
            }
        }
    }

    // ── Chain reconciliation ─────────────────────────────────────────────────

    /// Pull the authoritative claim record and re-derive the cooldown from it.
    ///
    /// Refused without a notice while a claim is in flight, since the poll
    /// calls it too: the next read is the one that follows the claim. On a
    /// read failure the last-known record and cooldown stay in place.
    pub async fn refresh(&mut self, now: TimestampMs) -> Result<(), LifecycleError> {
        if self.torn_down {
            return Err(LifecycleError::TornDown);
        }
        if self.claim.is_some() {
            return Err(LifecycleError::ClaimInFlight);
        }
        self.reload(now).await
    }

    async fn reload(&mut self, now: TimestampMs) -> Result<(), LifecycleError> {
        let address = self
            .wallet
            .active_address()
            .ok_or(LifecycleError::WalletDisconnected)?;

        match self.reader.claim_record(&address).await {
            Ok(record) => {
                if let Some(r) = &record {
                    if !r.is_consistent() {
                        warn!(
                            %address,
                            total_claimed = r.total_claimed,
                            remaining_allowance = r.remaining_allowance,
                            "claim record does not add up to the allowance cap"
                        );
                    }
                }
                let cooldown_ms = self.cooldown.recompute(record.as_ref(), now);
                debug!(%address, ?record, cooldown_ms, "claim record refreshed");
                self.record = record;
                Ok(())
            }
            Err(e) => {
                warn!(%address, error = %e, "claim record read failed; keeping last-known values");
                self.notifier.notify(Notice::new(
                    Severity::Warning,
                    "Could not refresh claim status",
                    e.to_string(),
                ));
                Err(LifecycleError::ReadFailed(e))
            }
        }
    }

    // ── Commands ─────────────────────────────────────────────────────────────

    /// Begin a mining session at `now`.
    pub fn start(&mut self, now: TimestampMs) -> Result<(), LifecycleError> {
        if self.torn_down {
            return Err(self.refuse(LifecycleError::TornDown));
        }
        if self.wallet.active_address().is_none() {
            self.notifier.notify(Notice::new(
                Severity::Warning,
                "Wallet not connected",
                "Connect a wallet to start mining.",
            ));
            return Err(LifecycleError::WalletDisconnected);
        }
        if self.session.state() != SessionState::Idle {
            return Err(self.refuse(LifecycleError::AlreadyMining(self.session.state())));
        }

        let remaining_ms = self.cooldown.tick(now);
        if remaining_ms > 0 {
            self.notifier.notify(Notice::new(
                Severity::Warning,
                "Cooldown active",
                format!("You can mine again in {}.", format_duration_ms(remaining_ms)),
            ));
            return Err(LifecycleError::CooldownActive { remaining_ms });
        }

        self.session.start(now);
        info!(started_at = now, "mining session started");
        Ok(())
    }

    /// Request the reward for a finished session.
    ///
    /// Returns the flight the caller must drive to completion, feeding each
    /// event back through [`on_claim_event`](Self::on_claim_event).
    pub fn claim(&mut self) -> Result<ClaimFlight, LifecycleError> {
        if self.torn_down {
            return Err(self.refuse(LifecycleError::TornDown));
        }
        let Some(address) = self.wallet.active_address() else {
            self.notifier.notify(Notice::new(
                Severity::Warning,
                "Wallet not connected",
                "Connect a wallet to claim your reward.",
            ));
            return Err(LifecycleError::WalletDisconnected);
        };
        if self.claim.is_some() {
            return Err(self.refuse(LifecycleError::ClaimInFlight));
        }
        if self.session.state() != SessionState::Ready {
            return Err(self.refuse(LifecycleError::NotReady(self.session.state())));
        }

        self.claim = Some(ClaimTransaction {
            address,
            hash: None,
            status: ClaimStatus::Unsent,
        });
        info!(%address, "submitting claim");
        Ok(claim_flight(Arc::clone(&self.writer), address))
    }

    /// React to progress of the in-flight claim.
    pub async fn on_claim_event(
        &mut self,
        event: ClaimEvent,
        now: TimestampMs,
    ) -> Result<(), LifecycleError> {
        if self.torn_down {
            debug!(?event, "ignoring claim event after teardown");
            return Ok(());
        }
        let Some(mut tx) = self.claim.take() else {
            warn!(?event, "claim event with no claim in flight");
            return Ok(());
        };

        match event {
            ClaimEvent::Submitted(hash) => {
                tx.hash = Some(hash);
                tx.status = ClaimStatus::Pending;
                self.claim = Some(tx);
                info!(%hash, "claim pending");
                self.notifier.notify(Notice::new(
                    Severity::Info,
                    "Claim submitted",
                    format!("Waiting for confirmation of {hash}."),
                ));
                Ok(())
            }
            ClaimEvent::Confirmed(hash) => {
                tx.status = ClaimStatus::Confirmed;
                info!(%hash, claimant = %tx.address, status = ?tx.status, "claim confirmed");
                // Sequenced strictly after the receipt; this is the only read
                // a confirmation triggers.
                let reread = match self.wallet.active_address() {
                    Some(active) => {
                        if active != tx.address {
                            info!(
                                claimant = %tx.address,
                                %active,
                                "wallet changed during claim; reading the connected wallet"
                            );
                        }
                        self.reload(now).await
                    }
                    None => {
                        debug!(claimant = %tx.address, "wallet disconnected during claim; no re-read");
                        Ok(())
                    }
                };
                self.session.reset();
                self.notifier.notify(Notice::new(
                    Severity::Success,
                    "Claim successful",
                    format!("{REWARD_PER_CLAIM} tokens are on their way."),
                ));
                reread
            }
            ClaimEvent::Failed { hash, error } => {
                tx.status = ClaimStatus::Failed;
                let message = error.to_string();
                warn!(?hash, status = ?tx.status, error = %message, "claim failed");
                self.notifier.notify(Notice::new(Severity::Error, "Claim failed", message.clone()));
                // A wallet connected while the claim was pending still owes its first read.
                if let Some(active) = self.wallet.active_address() {
                    if active != tx.address {
                        if let Err(e) = self.reload(now).await {
                            debug!(%active, error = %e, "deferred record read failed");
                        }
                    }
                }
                match hash {
                    None => Err(LifecycleError::TransactionRejected(message)),
                    Some(_) => Err(LifecycleError::TransactionReverted(message)),
                }
            }
        }
    }

    /// Warn the user about a refused command and hand the error back.
    fn refuse(&self, err: LifecycleError) -> LifecycleError {
        let (title, description) = match &err {
            LifecycleError::TornDown => ("Miner stopped", "The miner is shutting down.".to_string()),
            LifecycleError::AlreadyMining(state) => {
                ("Session in progress", format!("A session is already {state}."))
            }
            LifecycleError::NotReady(SessionState::Mining) => {
                ("Nothing to claim yet", "Mining is still in progress.".to_string())
            }
            LifecycleError::NotReady(_) => {
                ("Nothing to claim yet", "Finish a mining session first.".to_string())
            }
            LifecycleError::ClaimInFlight => (
                "Claim in progress",
                "Wait for the pending claim to settle.".to_string(),
            ),
            other => ("Command refused", other.to_string()),
        };
        self.notifier.notify(Notice::new(Severity::Warning, title, description));
        err
    }

    // ── Timers ───────────────────────────────────────────────────────────────

    pub fn tick_session(&mut self, now: TimestampMs) -> SessionTick {
        if self.torn_down {
            return SessionTick::Inactive;
        }
        let tick = self.session.tick(now, &mut self.rng);
        if tick == SessionTick::Completed {
            info!("mining session complete");
            self.notifier.notify(Notice::new(
                Severity::Success,
                "Mining complete",
                format!("Claim your {REWARD_PER_CLAIM} tokens."),
            ));
        }
        tick
    }

    pub fn tick_cooldown(&mut self, now: TimestampMs) -> u64 {
        if self.torn_down {
            return 0;
        }
        let remaining = self.cooldown.tick(now);
        if remaining == 0 {
            debug!("cooldown elapsed");
        }
        remaining
    }

    /// Cancel both timers. Late claim events are ignored afterwards.
    pub fn teardown(&mut self) {
        if !self.torn_down {
            debug!(claim_in_flight = self.claim.is_some(), "controller torn down");
        }
        self.torn_down = true;
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    pub fn session_timer_active(&self) -> bool {
        !self.torn_down && self.session.is_ticking()
    }

    pub fn cooldown_timer_active(&self) -> bool {
        !self.torn_down && self.cooldown.is_active()
    }

    pub fn claim_in_flight(&self) -> bool {
        self.claim.is_some()
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn record(&self) -> Option<&ClaimRecord> {
        self.record.as_ref()
    }

    pub fn cooldown_ms(&self) -> u64 {
        self.cooldown.remaining_ms()
    }

    pub fn wallet(&self) -> Option<Address> {
        self.wallet.active_address()
    }

    pub fn session(&self) -> &SessionTimer {
        &self.session
    }

    pub fn snapshot(&self, now: TimestampMs) -> Snapshot {
        Snapshot {
            state: self.session.state(),
            progress: self.session.elapsed_fraction() * 100.0,
            time_remaining_ms: self.session.time_remaining_ms(now),
            cosmetic_rate: self.session.display_rate(),
            cooldown_ms: self.cooldown.remaining_ms(),
            total_claimed: self.record.map(|r| r.total_claimed),
            remaining_allowance: self.record.map(|r| r.remaining_allowance),
            wallet: self.wallet.active_address(),
            claim: self.claim.map(|tx| ClaimView {
                hash: tx.hash,
                status: tx.status,
            }),
        }
    }
}

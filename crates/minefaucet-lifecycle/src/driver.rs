//! Cooperative run loop around the controller.
//!
//! One task, no parallelism. The loop selects over user commands, the two
//! timers, the in-flight claim, and the supplementary record poll. A timer
//! branch is only enabled while its owning condition holds, which is how
//! ticks are scheduled and cancelled.

use std::future;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{debug, info};

use minefaucet_core::constants::{COOLDOWN_TICK_MS, RECORD_POLL_SECS, SESSION_TICK_MS};

use crate::controller::Controller;
use crate::error::LifecycleError;
use crate::flight::{ClaimEvent, ClaimFlight};
use crate::ports::{ChainReader, ChainWriter, Clock, NotificationSink, WalletSession};
use crate::snapshot::Snapshot;

/// User intents forwarded to the loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Claim,
    Refresh,
    Wallet(WalletSession),
    Quit,
}

/// Consumer of per-tick snapshots. Never writes back into the controller.
pub trait Display {
    fn render(&mut self, snapshot: &Snapshot);
}

/// Tick cadences for the run loop.
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// Session progress cadence. Presentation only.
    pub session_tick: Duration,
    /// Cooldown countdown cadence.
    pub cooldown_tick: Duration,
    /// Supplementary claim-record poll. `None` disables it.
    pub record_poll: Option<Duration>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            session_tick: Duration::from_millis(SESSION_TICK_MS),
            cooldown_tick: Duration::from_millis(COOLDOWN_TICK_MS),
            record_poll: (RECORD_POLL_SECS > 0).then(|| Duration::from_secs(RECORD_POLL_SECS)),
        }
    }
}

fn ticker(period: Duration) -> Interval {
    let mut i = interval(period);
    i.set_missed_tick_behavior(MissedTickBehavior::Skip);
    i
}

async fn next_event(flight: &mut Option<ClaimFlight>) -> Option<ClaimEvent> {
    match flight {
        Some(stream) => stream.next().await,
        None => future::pending().await,
    }
}

async fn poll_tick(poll: &mut Option<Interval>) {
    match poll {
        Some(i) => {
            i.tick().await;
        }
        None => future::pending().await,
    }
}

fn log_rejection(action: &str, err: LifecycleError) {
    // Guard refusals reach the user as notices; a refresh skipped while a
    // claim is pending is silent.
    debug!(action, error = %err, "command not applied");
}

/// Drive `controller` until `Quit` arrives or the command channel closes.
///
/// Returns the controller, torn down, so callers can inspect its final state.
pub async fn run<R, W, N, D, C>(
    mut controller: Controller<R, W, N>,
    mut commands: mpsc::Receiver<Command>,
    display: &mut D,
    clock: &C,
    config: &LoopConfig,
) -> Controller<R, W, N>
where
    R: ChainReader,
    W: ChainWriter + ?Sized + 'static,
    N: NotificationSink,
    D: Display,
    C: Clock,
{
    let mut session_tick = ticker(config.session_tick);
    let mut cooldown_tick = ticker(config.cooldown_tick);
    let mut poll = config.record_poll.map(ticker);
    let mut flight: Option<ClaimFlight> = None;

    // Skip the immediate first tick of the poll; the wallet connect reads anyway.
    if let Some(p) = poll.as_mut() {
        p.reset();
    }

    info!("miner loop started");
    display.render(&controller.snapshot(clock.now_ms()));

    loop {
        tokio::select! {
            cmd = commands.recv() => {
                let now = clock.now_ms();
                match cmd {
                    None | Some(Command::Quit) => break,
                    Some(Command::Start) => match controller.start(now) {
                        Ok(()) => session_tick.reset(),
                        Err(e) => log_rejection("start", e),
                    },
                    Some(Command::Claim) => match controller.claim() {
                        Ok(f) => flight = Some(f),
                        Err(e) => log_rejection("claim", e),
                    },
                    Some(Command::Refresh) => {
                        if let Err(e) = controller.refresh(now).await {
                            log_rejection("refresh", e);
                        }
                    }
                    Some(Command::Wallet(session)) => {
                        if let Err(e) = controller.set_wallet(session, now).await {
                            log_rejection("wallet", e);
                        }
                    }
                }
            }
            _ = session_tick.tick(), if controller.session_timer_active() => {
                controller.tick_session(clock.now_ms());
            }
            _ = cooldown_tick.tick(), if controller.cooldown_timer_active() => {
                controller.tick_cooldown(clock.now_ms());
            }
            Some(event) = next_event(&mut flight) => {
                let terminal = event.is_terminal();
                if let Err(e) = controller.on_claim_event(event, clock.now_ms()).await {
                    log_rejection("claim", e);
                }
                if terminal {
                    flight = None;
                }
            }
            _ = poll_tick(&mut poll) => {
                if controller.wallet().is_some() {
                    if let Err(e) = controller.refresh(clock.now_ms()).await {
                        log_rejection("poll", e);
                    }
                }
            }
        }

        display.render(&controller.snapshot(clock.now_ms()));
    }

    controller.teardown();
    info!("miner loop stopped");
    controller
}

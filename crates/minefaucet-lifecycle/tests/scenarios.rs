//! Controller behaviour against a scripted chain.
//!
//! Run with:
//!   cargo test -p minefaucet-lifecycle --test scenarios

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use minefaucet_core::constants::ALLOWANCE_CAP;
use minefaucet_core::{Address, ChainError, ClaimRecord};
use minefaucet_lifecycle::{
    ClaimEvent, ClaimStatus, LifecycleError, SessionState, SessionTick, Severity, TxOutcome,
    WalletSession,
};

use common::*;

const MIN: i64 = 60_000;

/// Connected controller whose record allows mining right away.
async fn ready_to_mine(total_claimed: u64) -> (TestController, Arc<FakeChain>, Arc<RecordingNotifier>) {
    let chain = FakeChain::with_record(ClaimRecord::new(total_claimed, NOW_S - 10));
    let (mut c, notifier) = controller(&chain);
    c.set_wallet(WalletSession::connected(wallet()), NOW).await.unwrap();
    (c, chain, notifier)
}

/// Mine a full session starting at `t0`, leaving the controller `Ready`.
fn mine_to_ready(c: &mut TestController, t0: i64) {
    c.start(t0).unwrap();
    assert_eq!(c.tick_session(t0 + 10 * MIN), SessionTick::Completed);
    assert_eq!(c.state(), SessionState::Ready);
}

// ── Scenario A: cooldown ──────────────────────────────────────────────────────

#[tokio::test]
async fn cooldown_from_chain_blocks_start() {
    let chain = FakeChain::with_record(ClaimRecord::new(200, NOW_S + 120));
    let (mut c, notifier) = controller(&chain);
    c.set_wallet(WalletSession::connected(wallet()), NOW).await.unwrap();

    assert_eq!(c.cooldown_ms(), 120_000);
    assert!(c.cooldown_timer_active());

    let err = c.start(NOW).unwrap_err();
    assert_eq!(err, LifecycleError::CooldownActive { remaining_ms: 120_000 });
    assert_eq!(c.state(), SessionState::Idle);
    assert!(!c.session_timer_active());
    assert_eq!(c.session().started_at(), None);

    let notice = notifier.last().unwrap();
    assert_eq!(notice.severity, Severity::Warning);
    assert_eq!(notice.title, "Cooldown active");
    assert!(notice.description.contains("02:00"), "{}", notice.description);

    assert_eq!(c.tick_cooldown(NOW + MIN), 60_000);
    assert_eq!(c.tick_cooldown(NOW + 2 * MIN), 0);
    assert!(!c.cooldown_timer_active());

    c.start(NOW + 2 * MIN).unwrap();
    assert_eq!(c.state(), SessionState::Mining);
    assert!(c.session_timer_active());
}

#[tokio::test]
async fn start_during_cooldown_rechecks_clock() {
    let chain = FakeChain::with_record(ClaimRecord::new(200, NOW_S + 120));
    let (mut c, _) = controller(&chain);
    c.set_wallet(WalletSession::connected(wallet()), NOW).await.unwrap();

    // No cooldown ticks ran, but the window has passed by the time of the request.
    c.start(NOW + 121_000).unwrap();
    assert_eq!(c.state(), SessionState::Mining);
    assert_eq!(chain.reads(), 1);
}

// ── Scenario B: session progress ──────────────────────────────────────────────

#[tokio::test]
async fn session_reaches_ready_after_ten_minutes() {
    let (mut c, _, notifier) = ready_to_mine(0).await;
    c.start(NOW).unwrap();

    assert_eq!(c.tick_session(NOW + 5 * MIN), SessionTick::Progress(0.5));
    assert_eq!(c.state(), SessionState::Mining);
    let snap = c.snapshot(NOW + 5 * MIN);
    assert_eq!(snap.progress, 50.0);
    assert_eq!(snap.time_remaining_ms, 300_000);
    assert!(snap.cosmetic_rate >= 45.0 && snap.cosmetic_rate < 65.0);

    assert_eq!(c.tick_session(NOW + 10 * MIN), SessionTick::Completed);
    assert_eq!(c.state(), SessionState::Ready);
    assert!(!c.session_timer_active());
    assert_eq!(c.tick_session(NOW + 11 * MIN), SessionTick::Inactive);

    let completions = notifier
        .titles()
        .into_iter()
        .filter(|t| t == "Mining complete")
        .count();
    assert_eq!(completions, 1);
}

#[tokio::test]
async fn start_while_mining_is_refused() {
    let (mut c, _, notifier) = ready_to_mine(0).await;
    c.start(NOW).unwrap();
    assert_eq!(
        c.start(NOW + 1_000).unwrap_err(),
        LifecycleError::AlreadyMining(SessionState::Mining)
    );
    assert_eq!(c.session().started_at(), Some(NOW));

    let notice = notifier.last().unwrap();
    assert_eq!(notice.severity, Severity::Warning);
    assert_eq!(notice.title, "Session in progress");
}

// ── Scenario C: allowance reconciliation ──────────────────────────────────────

#[tokio::test]
async fn confirmed_claim_rereads_once_and_resets() {
    let (mut c, chain, notifier) = ready_to_mine(1_800).await;
    assert_eq!(c.record().unwrap().remaining_allowance, 200);

    mine_to_ready(&mut c, NOW);
    chain.confirm_with(ClaimRecord::new(2_000, NOW_S + 86_400));

    let flight = c.claim().unwrap();
    assert!(c.claim_in_flight());
    let after = NOW + 11 * MIN;
    settle(&mut c, flight, after).await.unwrap();

    assert_eq!(chain.submits(), 1);
    assert_eq!(chain.reads(), 2, "one read on connect, one after confirmation");
    assert!(!c.claim_in_flight());
    assert_eq!(c.state(), SessionState::Idle);
    assert_eq!(c.session().started_at(), None);

    let record = c.record().unwrap();
    assert_eq!(record.total_claimed, 2_000);
    assert_eq!(record.remaining_allowance, 0);
    assert!(c.cooldown_timer_active());
    assert_eq!(
        c.cooldown_ms(),
        ClaimRecord::new(2_000, NOW_S + 86_400).cooldown_remaining_ms(after)
    );

    let titles = notifier.titles();
    assert!(titles.contains(&"Claim submitted".to_string()));
    assert_eq!(titles.last().map(String::as_str), Some("Claim successful"));
}

#[tokio::test]
async fn allowance_matches_cap_after_every_read() {
    let chain = FakeChain::with_record(ClaimRecord::new(0, NOW_S));
    let (mut c, _) = controller(&chain);
    c.set_wallet(WalletSession::connected(wallet()), NOW).await.unwrap();

    for total in (0..=ALLOWANCE_CAP).step_by(200) {
        *chain.record.lock().unwrap() = Some(ClaimRecord::new(total, NOW_S));
        c.refresh(NOW).await.unwrap();
        let r = c.record().unwrap();
        assert_eq!(r.total_claimed + r.remaining_allowance, ALLOWANCE_CAP);
    }
}

// ── Scenario D: revert and retry ──────────────────────────────────────────────

#[tokio::test]
async fn reverted_claim_stays_ready_without_reread() {
    let (mut c, chain, notifier) = ready_to_mine(2_000).await;
    mine_to_ready(&mut c, NOW);
    chain.set_outcome(Ok(TxOutcome::Reverted {
        reason: "execution reverted: allowance exhausted".into(),
    }));

    let flight = c.claim().unwrap();
    let err = settle(&mut c, flight, NOW + 11 * MIN).await.unwrap_err();
    assert_eq!(
        err,
        LifecycleError::TransactionReverted("execution reverted: allowance exhausted".into())
    );
    assert_eq!(c.state(), SessionState::Ready);
    assert!(!c.claim_in_flight());
    assert_eq!(chain.reads(), 1, "a failed claim triggers no re-read");

    let notice = notifier.last().unwrap();
    assert_eq!(notice.severity, Severity::Error);
    assert_eq!(notice.description, "execution reverted: allowance exhausted");

    // Immediate retry without re-mining.
    chain.set_outcome(Ok(TxOutcome::Confirmed));
    let flight = c.claim().unwrap();
    settle(&mut c, flight, NOW + 12 * MIN).await.unwrap();
    assert_eq!(chain.submits(), 2);
    assert_eq!(chain.reads(), 2);
    assert_eq!(c.state(), SessionState::Idle);
}

#[tokio::test]
async fn rejected_submission_surfaces_message_verbatim() {
    let (mut c, chain, _) = ready_to_mine(0).await;
    mine_to_ready(&mut c, NOW);
    chain.set_submit_result(Err(ChainError::Rejected("user rejected the request".into())));

    let flight = c.claim().unwrap();
    let err = settle(&mut c, flight, NOW + 11 * MIN).await.unwrap_err();
    assert_eq!(
        err,
        LifecycleError::TransactionRejected("user rejected the request".into())
    );
    assert_eq!(c.state(), SessionState::Ready);
    assert_eq!(chain.reads(), 1);
}

// ── In-flight exclusivity ─────────────────────────────────────────────────────

#[tokio::test]
async fn only_one_claim_in_flight() {
    let (mut c, chain, notifier) = ready_to_mine(0).await;
    mine_to_ready(&mut c, NOW);

    let flight = c.claim().unwrap();
    assert_eq!(c.claim().err(), Some(LifecycleError::ClaimInFlight));
    let notice = notifier.last().unwrap();
    assert_eq!(notice.severity, Severity::Warning);
    assert_eq!(notice.title, "Claim in progress");
    assert_eq!(c.refresh(NOW).await.unwrap_err(), LifecycleError::ClaimInFlight);
    assert!(!c.snapshot(NOW).can_claim());
    assert_eq!(c.snapshot(NOW).claim.unwrap().status, ClaimStatus::Unsent);

    settle(&mut c, flight, NOW + 11 * MIN).await.unwrap();
    assert_eq!(chain.submits(), 1);
}

#[tokio::test]
async fn submitted_event_records_hash() {
    let (mut c, _, _) = ready_to_mine(0).await;
    mine_to_ready(&mut c, NOW);
    let _flight = c.claim().unwrap();

    c.on_claim_event(ClaimEvent::Submitted(tx_hash()), NOW).await.unwrap();
    let view = c.snapshot(NOW).claim.unwrap();
    assert_eq!(view.hash, Some(tx_hash()));
    assert_eq!(view.status, ClaimStatus::Pending);
    assert_eq!(c.state(), SessionState::Ready);
}

// ── Guards ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn disconnected_wallet_blocks_everything() {
    let chain = FakeChain::with_record(ClaimRecord::new(0, 0));
    let (mut c, notifier) = controller(&chain);

    assert_eq!(c.start(NOW).unwrap_err(), LifecycleError::WalletDisconnected);
    assert_eq!(c.claim().err(), Some(LifecycleError::WalletDisconnected));
    assert_eq!(c.refresh(NOW).await.unwrap_err(), LifecycleError::WalletDisconnected);
    assert_eq!(chain.reads(), 0);
    assert_eq!(chain.submits(), 0);
    assert_eq!(c.state(), SessionState::Idle);
    assert!(notifier.titles().iter().all(|t| t == "Wallet not connected"));
}

#[tokio::test]
async fn claim_before_ready_is_refused() {
    let (mut c, chain, notifier) = ready_to_mine(0).await;
    assert_eq!(c.claim().err(), Some(LifecycleError::NotReady(SessionState::Idle)));
    c.start(NOW).unwrap();
    assert_eq!(c.claim().err(), Some(LifecycleError::NotReady(SessionState::Mining)));
    assert_eq!(chain.submits(), 0);

    let refusals: Vec<_> = notifier
        .notices
        .lock()
        .unwrap()
        .iter()
        .filter(|n| n.title == "Nothing to claim yet")
        .map(|n| n.severity)
        .collect();
    assert_eq!(refusals, vec![Severity::Warning, Severity::Warning]);
}

#[tokio::test]
async fn disconnect_clears_chain_state_but_keeps_session() {
    let (mut c, _, _) = ready_to_mine(400).await;
    c.start(NOW).unwrap();
    c.set_wallet(WalletSession::disconnected(), NOW + 1_000).await.unwrap();

    assert!(c.record().is_none());
    assert_eq!(c.cooldown_ms(), 0);
    assert_eq!(c.state(), SessionState::Mining);
    assert_eq!(c.tick_session(NOW + 10 * MIN), SessionTick::Completed);
    assert_eq!(c.claim().err(), Some(LifecycleError::WalletDisconnected));
}

// ── Read failures ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn read_failure_keeps_last_known_cooldown() {
    let chain = FakeChain::with_record(ClaimRecord::new(600, NOW_S + 120));
    let (mut c, notifier) = controller(&chain);
    c.set_wallet(WalletSession::connected(wallet()), NOW).await.unwrap();

    chain.read_fails.store(true, Ordering::SeqCst);
    let err = c.refresh(NOW + 1_000).await.unwrap_err();
    assert!(matches!(err, LifecycleError::ReadFailed(ChainError::Unavailable(_))));

    assert_eq!(c.record().unwrap().total_claimed, 600);
    assert_eq!(c.cooldown_ms(), 120_000);
    assert_eq!(
        c.start(NOW + 1_000).unwrap_err(),
        LifecycleError::CooldownActive { remaining_ms: 119_000 }
    );
    assert!(notifier.titles().contains(&"Could not refresh claim status".to_string()));
}

// ── Teardown ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn teardown_cancels_timers_and_refuses_commands() {
    let chain = FakeChain::with_record(ClaimRecord::new(0, NOW_S + 60));
    let (mut c, notifier) = controller(&chain);
    c.set_wallet(WalletSession::connected(wallet()), NOW).await.unwrap();
    assert!(c.cooldown_timer_active());

    c.teardown();
    assert!(!c.cooldown_timer_active());
    assert!(!c.session_timer_active());
    assert_eq!(c.start(NOW + 2 * MIN).unwrap_err(), LifecycleError::TornDown);
    assert_eq!(notifier.last().unwrap().severity, Severity::Warning);
}

#[tokio::test]
async fn confirmation_after_teardown_is_ignored() {
    let (mut c, chain, notifier) = ready_to_mine(0).await;
    mine_to_ready(&mut c, NOW);
    let _flight = c.claim().unwrap();
    c.on_claim_event(ClaimEvent::Submitted(tx_hash()), NOW).await.unwrap();

    c.teardown();
    c.on_claim_event(ClaimEvent::Confirmed(tx_hash()), NOW + 11 * MIN)
        .await
        .unwrap();

    assert_eq!(chain.reads(), 1, "no re-read after teardown");
    assert_eq!(c.state(), SessionState::Ready);
    assert!(c.claim_in_flight());
    assert!(!notifier.titles().contains(&"Claim successful".to_string()));
}

// ── Wallet changes during a claim ─────────────────────────────────────────────

#[tokio::test]
async fn wallet_switch_defers_read_until_claim_settles() {
    let (mut c, chain, _) = ready_to_mine(0).await;
    mine_to_ready(&mut c, NOW);
    let other = Address::from_bytes([0x22; 20]);

    let flight = c.claim().unwrap();
    c.set_wallet(WalletSession::connected(other), NOW + 1_000).await.unwrap();
    assert_eq!(chain.reads(), 1, "no read while the claim is pending");
    assert!(c.record().is_none());

    settle(&mut c, flight, NOW + 11 * MIN).await.unwrap();
    assert_eq!(chain.reads(), 2);
    assert_eq!(chain.last_read(), Some(other));
    assert_eq!(c.state(), SessionState::Idle);
    assert!(c.record().is_some());
}

#[tokio::test]
async fn wallet_switch_then_revert_still_reads_new_wallet() {
    let (mut c, chain, _) = ready_to_mine(0).await;
    mine_to_ready(&mut c, NOW);
    chain.set_outcome(Ok(TxOutcome::Reverted {
        reason: "execution reverted".into(),
    }));
    let other = Address::from_bytes([0x22; 20]);

    let flight = c.claim().unwrap();
    c.set_wallet(WalletSession::connected(other), NOW + 1_000).await.unwrap();
    settle(&mut c, flight, NOW + 11 * MIN).await.unwrap_err();

    assert_eq!(chain.reads(), 2);
    assert_eq!(chain.last_read(), Some(other));
    assert_eq!(c.state(), SessionState::Ready);
}

#[tokio::test]
async fn disconnect_during_claim_skips_reread() {
    let (mut c, chain, notifier) = ready_to_mine(0).await;
    mine_to_ready(&mut c, NOW);

    let flight = c.claim().unwrap();
    c.set_wallet(WalletSession::disconnected(), NOW + 1_000).await.unwrap();
    settle(&mut c, flight, NOW + 11 * MIN).await.unwrap();

    assert_eq!(chain.reads(), 1);
    assert_eq!(c.state(), SessionState::Idle);
    assert!(notifier.titles().contains(&"Claim successful".to_string()));
}

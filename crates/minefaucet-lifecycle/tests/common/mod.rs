#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::Notify;

use minefaucet_core::{Address, ChainError, ClaimRecord, TimestampMs, TxHash};
use minefaucet_lifecycle::{
    ChainReader, ChainWriter, ClaimFlight, Clock, Controller, LifecycleError, Notice,
    NotificationSink, TxOutcome,
};

pub const NOW_S: i64 = 1_700_000_000;
pub const NOW: TimestampMs = NOW_S * 1000;

pub fn wallet() -> Address {
    Address::from_bytes([0x11; 20])
}

pub fn tx_hash() -> TxHash {
    TxHash::from_bytes([0xaa; 32])
}

/// Scripted chain: serves one record, accepts claims, and installs
/// `confirmed_record` when a receipt confirms.
pub struct FakeChain {
    pub record: Mutex<Option<ClaimRecord>>,
    pub confirmed_record: Mutex<Option<ClaimRecord>>,
    pub submit_result: Mutex<Result<TxHash, ChainError>>,
    pub outcome: Mutex<Result<TxOutcome, ChainError>>,
    pub last_read: Mutex<Option<Address>>,
    pub read_fails: AtomicBool,
    pub hold_receipts: AtomicBool,
    pub release: Notify,
    pub reads: AtomicUsize,
    pub submits: AtomicUsize,
}

impl FakeChain {
    pub fn with_record(record: ClaimRecord) -> Arc<Self> {
        Arc::new(Self {
            record: Mutex::new(Some(record)),
            confirmed_record: Mutex::new(None),
            submit_result: Mutex::new(Ok(tx_hash())),
            outcome: Mutex::new(Ok(TxOutcome::Confirmed)),
            last_read: Mutex::new(None),
            read_fails: AtomicBool::new(false),
            hold_receipts: AtomicBool::new(false),
            release: Notify::new(),
            reads: AtomicUsize::new(0),
            submits: AtomicUsize::new(0),
        })
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn last_read(&self) -> Option<Address> {
        *self.last_read.lock().unwrap()
    }

    pub fn submits(&self) -> usize {
        self.submits.load(Ordering::SeqCst)
    }

    pub fn confirm_with(&self, record: ClaimRecord) {
        *self.confirmed_record.lock().unwrap() = Some(record);
    }

    pub fn set_outcome(&self, outcome: Result<TxOutcome, ChainError>) {
        *self.outcome.lock().unwrap() = outcome;
    }

    pub fn set_submit_result(&self, result: Result<TxHash, ChainError>) {
        *self.submit_result.lock().unwrap() = result;
    }
}

#[async_trait]
impl ChainReader for FakeChain {
    async fn claim_record(&self, address: &Address) -> Result<Option<ClaimRecord>, ChainError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        *self.last_read.lock().unwrap() = Some(*address);
        if self.read_fails.load(Ordering::SeqCst) {
            return Err(ChainError::Unavailable("connection refused".into()));
        }
        Ok(*self.record.lock().unwrap())
    }
}

#[async_trait]
impl ChainWriter for FakeChain {
    async fn submit_claim(&self, _address: &Address) -> Result<TxHash, ChainError> {
        self.submits.fetch_add(1, Ordering::SeqCst);
        self.submit_result.lock().unwrap().clone()
    }

    async fn wait_for_receipt(&self, _hash: &TxHash) -> Result<TxOutcome, ChainError> {
        if self.hold_receipts.load(Ordering::SeqCst) {
            self.release.notified().await;
        }
        let outcome = self.outcome.lock().unwrap().clone();
        if matches!(outcome, Ok(TxOutcome::Confirmed)) {
            if let Some(next) = self.confirmed_record.lock().unwrap().take() {
                *self.record.lock().unwrap() = Some(next);
            }
        }
        outcome
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn titles(&self) -> Vec<String> {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .map(|n| n.title.clone())
            .collect()
    }

    pub fn last(&self) -> Option<Notice> {
        self.notices.lock().unwrap().last().cloned()
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

pub type TestController = Controller<Arc<FakeChain>, FakeChain, Arc<RecordingNotifier>>;

pub fn controller(chain: &Arc<FakeChain>) -> (TestController, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let controller = Controller::new(Arc::clone(chain), Arc::clone(chain), Arc::clone(&notifier));
    (controller, notifier)
}

/// Feed every event of `flight` back into the controller; returns the last result.
pub async fn settle(
    controller: &mut TestController,
    mut flight: ClaimFlight,
    now: TimestampMs,
) -> Result<(), LifecycleError> {
    let mut last = Ok(());
    while let Some(event) = flight.next().await {
        last = controller.on_claim_event(event, now).await;
    }
    last
}

/// Clock that follows tokio's (pausable) time from a fixed origin.
pub struct TokioClock {
    origin: TimestampMs,
    start: tokio::time::Instant,
}

impl TokioClock {
    pub fn new(origin: TimestampMs) -> Self {
        Self {
            origin,
            start: tokio::time::Instant::now(),
        }
    }
}

impl Clock for TokioClock {
    fn now_ms(&self) -> TimestampMs {
        self.origin + self.start.elapsed().as_millis() as TimestampMs
    }
}

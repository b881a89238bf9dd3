//! minefaucet-lifecycle
//!
//! Client-side mining session and claim lifecycle.
//!
//! The session timer simulates a fixed-length mining run, the cooldown
//! window is re-derived from the on-chain `next_claim_time`, and the
//! controller ties both to the claim transaction and reconciles with the
//! chain after every confirmation. `driver::run` hosts the controller on a
//! single cooperative task.

pub mod controller;
pub mod cooldown;
pub mod driver;
pub mod error;
pub mod flight;
pub mod ports;
pub mod session;
pub mod snapshot;

pub use controller::{ClaimTransaction, Controller};
pub use cooldown::CooldownWindow;
pub use driver::{run, Command, Display, LoopConfig};
pub use error::LifecycleError;
pub use flight::{claim_flight, ClaimEvent, ClaimFlight};
pub use ports::{
    ChainReader, ChainWriter, Clock, Notice, NotificationSink, Severity, SystemClock, TxOutcome,
    WalletProvider, WalletSession,
};
pub use session::{elapsed_fraction, SessionState, SessionTick, SessionTimer};
pub use snapshot::{ClaimStatus, ClaimView, Snapshot};

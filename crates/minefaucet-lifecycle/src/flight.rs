//! The in-flight claim: submission followed by the receipt wait.
//!
//! A flight is a stream so the run loop can keep ticking timers while the
//! writer is busy. It yields `Submitted` once the transaction has a hash and
//! then exactly one terminal event.

use std::sync::Arc;

use futures::stream::{self, BoxStream, StreamExt};
use tracing::debug;

use minefaucet_core::{Address, ChainError, TxHash};

use crate::ports::{ChainWriter, TxOutcome};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClaimEvent {
    /// The writer broadcast the claim.
    Submitted(TxHash),
    /// The receipt came back successful.
    Confirmed(TxHash),
    /// Submission was refused (`hash == None`) or the transaction failed to settle.
    Failed {
        hash: Option<TxHash>,
        error: ChainError,
    },
}

impl ClaimEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ClaimEvent::Submitted(_))
    }
}

pub type ClaimFlight = BoxStream<'static, ClaimEvent>;

enum Stage {
    Submit,
    Watch(TxHash),
    Done,
}

/// Build the flight for one claim attempt. The writer is invoked exactly once.
pub fn claim_flight<W>(writer: Arc<W>, address: Address) -> ClaimFlight
where
    W: ChainWriter + ?Sized + 'static,
{
    stream::unfold(Stage::Submit, move |stage| {
        let writer = Arc::clone(&writer);
        async move {
            match stage {
                Stage::Submit => match writer.submit_claim(&address).await {
                    Ok(hash) => {
                        debug!(%hash, "claim broadcast");
                        Some((ClaimEvent::Submitted(hash), Stage::Watch(hash)))
                    }
                    Err(error) => Some((ClaimEvent::Failed { hash: None, error }, Stage::Done)),
                },
                Stage::Watch(hash) => {
                    let event = match writer.wait_for_receipt(&hash).await {
                        Ok(TxOutcome::Confirmed) => ClaimEvent::Confirmed(hash),
                        Ok(TxOutcome::Reverted { reason }) => ClaimEvent::Failed {
                            hash: Some(hash),
                            error: ChainError::Reverted(reason),
                        },
                        Err(error) => ClaimEvent::Failed {
                            hash: Some(hash),
                            error,
                        },
                    };
                    Some((event, Stage::Done))
                }
                Stage::Done => None,
            }
        }
    })
    .boxed()
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FaucetError {
    // ── Encoding errors ──────────────────────────────────────────────────────
    #[error("invalid {what} hex: {reason}")]
    InvalidHex { what: &'static str, reason: String },

    #[error("invalid {what} length: expected {expected} bytes, got {got}")]
    InvalidLength {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    // ── Wallet errors ────────────────────────────────────────────────────────
    #[error("no wallet address configured")]
    NoAddress,
}

/// Failures reported by the chain collaborators (reader, writer, receipt watcher).
///
/// Every variant carries the underlying message so it can be shown to the
/// user verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// Node unreachable, HTTP failure, or an RPC error on a read.
    #[error("chain unavailable: {0}")]
    Unavailable(String),

    /// The claim was refused before it was broadcast (user rejection, node
    /// refused the transaction).
    #[error("{0}")]
    Rejected(String),

    /// The transaction was mined but reverted.
    #[error("{0}")]
    Reverted(String),

    /// The node answered with something we could not interpret.
    #[error("malformed response: {0}")]
    Malformed(String),
}

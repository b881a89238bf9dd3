/// ─── Faucet Protocol Constants ──────────────────────────────────────────────
///
/// These values form the external contract surface shared by the faucet
/// contract and every client. They are not tunable at runtime.
///
/// Reward unit: whole faucet tokens (no sub-unit is exposed by the contract).

// ── Rewards ──────────────────────────────────────────────────────────────────

/// Fixed reward paid out by one successful claim.
pub const REWARD_PER_CLAIM: u64 = 200;

/// Lifetime cap per wallet. `remaining_allowance = ALLOWANCE_CAP - total_claimed`.
pub const ALLOWANCE_CAP: u64 = 2_000;

// ── Mining session ────────────────────────────────────────────────────────────

/// Length of one simulated mining session (milliseconds). 10 minutes.
pub const SESSION_DURATION_MS: u64 = 600_000;

/// Default session tick cadence (milliseconds). Presentation only.
pub const SESSION_TICK_MS: u64 = 100;

/// Cosmetic hashrate band, lower bound (inclusive).
pub const HASHRATE_MIN: f64 = 45.0;

/// Cosmetic hashrate band, upper bound (exclusive).
pub const HASHRATE_MAX: f64 = 65.0;

// ── Cooldown ──────────────────────────────────────────────────────────────────

/// Cooldown countdown cadence (milliseconds).
pub const COOLDOWN_TICK_MS: u64 = 1_000;

// ── Chain polling ─────────────────────────────────────────────────────────────

/// Interval between receipt lookups while a claim is pending (milliseconds).
pub const RECEIPT_POLL_MS: u64 = 2_000;

/// Supplementary claim-record poll interval (seconds). 0 disables the poll.
pub const RECORD_POLL_SECS: u64 = 30;

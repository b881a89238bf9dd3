//! Human-readable rendering of durations and amounts.

use crate::constants::ALLOWANCE_CAP;
use crate::types::Amount;

/// Render milliseconds as `mm:ss`, or `h:mm:ss` once an hour or more remains.
///
/// Partial seconds round up so a running countdown never shows `00:00`
/// before it has actually reached zero.
pub fn format_duration_ms(ms: u64) -> String {
    let total_secs = ms.div_ceil(1000);
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

/// `"1800 / 2000"` style progress toward the lifetime cap.
pub fn format_allowance(total_claimed: Amount) -> String {
    format!("{total_claimed} / {ALLOWANCE_CAP}")
}

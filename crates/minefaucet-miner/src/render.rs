//! Terminal display and notices.

use std::io::Write;

use tracing::{debug, info, warn};

use minefaucet_core::constants::REWARD_PER_CLAIM;
use minefaucet_core::format::{format_allowance, format_duration_ms};
use minefaucet_lifecycle::{
    ClaimStatus, Display, Notice, NotificationSink, SessionState, Severity, Snapshot,
};

/// One status line for a snapshot.
pub fn status_line(s: &Snapshot) -> String {
    let mut parts = Vec::new();

    match s.state {
        SessionState::Idle if s.cooldown_ms > 0 => {
            parts.push(format!("cooldown {}", format_duration_ms(s.cooldown_ms)))
        }
        SessionState::Idle => parts.push("idle".to_string()),
        SessionState::Mining => parts.push(format!(
            "mining {:>3.0}% | {:.1} MH/s | {} left",
            s.progress,
            s.cosmetic_rate,
            format_duration_ms(s.time_remaining_ms)
        )),
        SessionState::Ready => parts.push(format!("ready to claim {REWARD_PER_CLAIM}")),
    }

    if let Some(claim) = &s.claim {
        let status = match claim.status {
            ClaimStatus::Unsent => "submitting",
            ClaimStatus::Pending => "pending",
            ClaimStatus::Confirmed => "confirmed",
            ClaimStatus::Failed => "failed",
        };
        match claim.hash {
            Some(hash) => parts.push(format!("claim {status} {hash}")),
            None => parts.push(format!("claim {status}")),
        }
    }

    match s.wallet {
        Some(addr) => {
            parts.push(addr.short());
            if let Some(total) = s.total_claimed {
                parts.push(format!("claimed {}", format_allowance(total)));
            }
        }
        None => parts.push("wallet not connected".to_string()),
    }

    if s.can_start() {
        parts.push("type `start`".to_string());
    } else if s.can_claim() {
        parts.push("type `claim`".to_string());
    }

    parts.join(" | ")
}

/// Rewrites a single stdout line in place, only when its text changes.
#[derive(Default)]
pub struct TerminalDisplay {
    last: String,
}

impl TerminalDisplay {
    /// Move off the status line so later output starts clean.
    pub fn finish(&mut self) {
        if !self.last.is_empty() {
            println!();
            self.last.clear();
        }
    }
}

impl Display for TerminalDisplay {
    fn render(&mut self, snapshot: &Snapshot) {
        let line = status_line(snapshot);
        if line == self.last {
            return;
        }
        let mut out = std::io::stdout().lock();
        // Pad so a shorter line fully covers the previous one.
        let width = self.last.chars().count().max(line.chars().count());
        if let Err(e) = write!(out, "\r{line:<width$}").and_then(|()| out.flush()) {
            debug!(error = %e, "status line not written");
        }
        self.last = line;
    }
}

/// Prints notices on their own line and mirrors them into the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct TerminalNotifier;

impl NotificationSink for TerminalNotifier {
    fn notify(&self, notice: Notice) {
        let tag = match notice.severity {
            Severity::Info => "info",
            Severity::Success => "ok",
            Severity::Warning => "warn",
            Severity::Error => "error",
        };
        match notice.severity {
            Severity::Warning | Severity::Error => {
                warn!(title = %notice.title, "{}", notice.description)
            }
            Severity::Info | Severity::Success => {
                info!(title = %notice.title, "{}", notice.description)
            }
        }
        println!("\n[{tag}] {}: {}", notice.title, notice.description);
    }
}

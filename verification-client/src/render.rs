//! Terminal rendering of the flow state.

use std::fmt::Write as _;

use chrono::Local;

use crate::{
    activity::ActivityLog,
    notice::{Notice, Notifier},
    state::{CheckSlot, FlowState, Target, VerificationOutcome},
};

/// Console log lines: `[time] SEVERITY: message`
#[must_use]
pub fn render_console(log: &ActivityLog) -> String {
    let mut out = String::from("Console Output:\n");
    for entry in log.entries() {
        let _ = writeln!(
            out,
            "[{}] {}: {}",
            entry.timestamp.with_timezone(&Local).format("%H:%M:%S"),
            entry.severity,
            entry.message
        );
    }
    out
}

/// Result card for one slot, empty when nothing was checked yet
#[must_use]
pub fn render_result_card(slot: &CheckSlot) -> String {
    let mut out = String::new();
    match &slot.outcome {
        VerificationOutcome::NotChecked => {}
        VerificationOutcome::Human { result } | VerificationOutcome::NotHuman { result } => {
            let address = result
                .wallet_address
                .as_deref()
                .or(slot.address.as_deref())
                .unwrap_or_default();
            let _ = writeln!(out, "Result:");
            let _ = writeln!(out, "  Address: {address}");
            let _ = writeln!(
                out,
                "  Is Human: {}",
                if slot.outcome.is_success() { "Yes" } else { "No" }
            );
            if let Some(user_id) = slot.outcome.user_id() {
                let _ = writeln!(out, "  User ID: {user_id}");
            }
        }
        VerificationOutcome::Failed { reason } => {
            let _ = writeln!(out, "Verification failed: {reason}");
        }
    }
    out
}

/// Wallet button label, console log and the result card of `target`
#[must_use]
pub fn render_state(state: &FlowState, target: Target) -> String {
    let wallet = state
        .session
        .as_ref()
        .map_or("Connect Wallet", |session| session.display_address());

    let mut out = format!("Wallet: {wallet}\n\n");
    let card = render_result_card(state.slot(target));
    if !card.is_empty() {
        out.push_str(&card);
        out.push('\n');
    }
    out.push_str(&render_console(&state.log));
    out
}

/// Prints notices to stderr, the terminal counterpart of toasts and alerts
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: &Notice) {
        if notice.is_blocking() {
            eprintln!("!! {notice}");
        } else {
            eprintln!("[{}] {notice}", notice.severity());
        }
    }
}

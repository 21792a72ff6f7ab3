//! Client-side verification state and its reducer.
//!
//! All state lives in one serializable [`FlowState`]. Every change goes through
//! [`reduce`], which takes the current state, an [`Event`] and the current time and
//! returns the next state without performing any I/O.

use chrono::{DateTime, Utc};
use common_types::VerificationResult;
use serde::{Deserialize, Serialize};

use crate::{
    activity::{ActivityLog, Severity},
    session::WalletSession,
};

/// Which result slot a verification writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// The wallet connected through the provider
    Connected,
    /// An address typed in by the user
    Arbitrary,
}

/// Result of the latest verification of a slot.
///
/// `NotHuman` and `Failed` are both unsuccessful but kept apart: the first is an
/// answer from the API, the second means no usable answer arrived.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VerificationOutcome {
    #[default]
    NotChecked,
    Human { result: VerificationResult },
    NotHuman { result: VerificationResult },
    Failed { reason: String },
}

impl VerificationOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Human { .. })
    }

    /// Upstream user id, only for a verified human
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::Human { result } => result.verified_user_id(),
            _ => None,
        }
    }

    #[must_use]
    pub const fn result(&self) -> Option<&VerificationResult> {
        match self {
            Self::Human { result } | Self::NotHuman { result } => Some(result),
            Self::NotChecked | Self::Failed { .. } => None,
        }
    }
}

/// One verification slot: in-flight flag, checked address and latest outcome
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckSlot {
    pub loading: bool,
    pub address: Option<String>,
    pub outcome: VerificationOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowState {
    pub session: Option<WalletSession>,
    pub connected: CheckSlot,
    pub arbitrary: CheckSlot,
    pub log: ActivityLog,
}

impl FlowState {
    /// Empty state whose activity log keeps at most `log_capacity` entries
    #[must_use]
    pub fn new(log_capacity: usize) -> Self {
        Self {
            log: ActivityLog::new(log_capacity),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn slot(&self, target: Target) -> &CheckSlot {
        match target {
            Target::Connected => &self.connected,
            Target::Arbitrary => &self.arbitrary,
        }
    }

    fn slot_mut(&mut self, target: Target) -> &mut CheckSlot {
        match target {
            Target::Connected => &mut self.connected,
            Target::Arbitrary => &mut self.arbitrary,
        }
    }

    /// True while any verification is outstanding
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.connected.loading || self.arbitrary.loading
    }
}

/// Everything that can happen to the flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// No wallet provider is installed
    WalletUnavailable,
    ConnectRequested,
    WalletConnected(WalletSession),
    WalletConnectFailed { reason: String },
    /// Verification of the connected wallet asked for without a session
    VerifyWithoutWallet,
    /// Arbitrary check asked for with a blank address
    EmptyAddress,
    /// A second verification arrived while the slot was still loading
    VerificationBusy { target: Target },
    VerificationStarted { target: Target, address: String },
    VerificationCompleted { target: Target, result: VerificationResult },
    VerificationFailed { target: Target, reason: String },
    /// The verification future went away without settling (panic or cancellation)
    VerificationAbandoned { target: Target },
}

/// Applies `event` to `state` at time `now`
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn reduce(mut state: FlowState, event: Event, now: DateTime<Utc>) -> FlowState {
    match event {
        Event::WalletUnavailable => {
            state.log.record(
                now,
                Severity::Warning,
                "Wallet provider not detected. Please install a wallet extension.",
            );
        }
        Event::ConnectRequested => {
            state
                .log
                .record(now, Severity::Info, "Requesting wallet connection...");
        }
        Event::WalletConnected(session) => match &state.session {
            Some(current) if current.raw_address() != session.raw_address() => {
                state.log.record(
                    now,
                    Severity::Warning,
                    format!(
                        "Wallet already connected as {}, ignoring {}",
                        current.raw_address(),
                        session.raw_address()
                    ),
                );
            }
            Some(current) => {
                state.log.record(
                    now,
                    Severity::Info,
                    format!("Wallet already connected: {}", current.raw_address()),
                );
            }
            None => {
                state.log.record(
                    now,
                    Severity::Success,
                    format!("Wallet connected: {}", session.raw_address()),
                );
                state.session = Some(session);
            }
        },
        Event::WalletConnectFailed { reason } => {
            state.log.record(
                now,
                Severity::Error,
                format!("Failed to connect wallet: {reason}"),
            );
        }
        Event::VerifyWithoutWallet => {
            state
                .log
                .record(now, Severity::Warning, "Wallet not connected");
        }
        Event::EmptyAddress => {
            state
                .log
                .record(now, Severity::Warning, "No wallet address entered");
        }
        Event::VerificationBusy { target } => {
            state.log.record(
                now,
                Severity::Warning,
                format!("{} is already in progress", describe(target, None)),
            );
        }
        Event::VerificationStarted { target, address } => {
            state.log.record(
                now,
                Severity::Info,
                format!("Verifying {}", describe(target, Some(&address))),
            );
            let slot = state.slot_mut(target);
            slot.loading = true;
            slot.address = Some(address);
        }
        Event::VerificationCompleted { target, result } => {
            let response =
                serde_json::to_string(&result).unwrap_or_else(|_| format!("{result:?}"));
            state
                .log
                .record(now, Severity::Info, format!("API Response: {response}"));

            let subject = match target {
                Target::Connected => "Wallet".to_string(),
                Target::Arbitrary => format!(
                    "Wallet {}",
                    state.arbitrary.address.as_deref().unwrap_or_default()
                ),
            };
            let outcome = if result.is_human {
                state.log.record(
                    now,
                    Severity::Success,
                    format!("{subject} verified as human!"),
                );
                VerificationOutcome::Human { result }
            } else {
                state.log.record(
                    now,
                    Severity::Warning,
                    format!("{subject} not verified as human"),
                );
                VerificationOutcome::NotHuman { result }
            };

            let slot = state.slot_mut(target);
            slot.loading = false;
            slot.outcome = outcome;
        }
        Event::VerificationFailed { target, reason } => {
            state
                .log
                .record(now, Severity::Error, format!("API Error: {reason}"));
            let slot = state.slot_mut(target);
            slot.loading = false;
            slot.outcome = VerificationOutcome::Failed { reason };
        }
        Event::VerificationAbandoned { target } => {
            let reason = "Verification did not complete".to_string();
            state
                .log
                .record(now, Severity::Error, format!("API Error: {reason}"));
            let slot = state.slot_mut(target);
            slot.loading = false;
            slot.outcome = VerificationOutcome::Failed { reason };
        }
    }

    state
}

fn describe(target: Target, address: Option<&str>) -> String {
    let subject = match target {
        Target::Connected => "wallet",
        Target::Arbitrary => "arbitrary wallet",
    };
    match address {
        Some(address) => format!("{subject}: {address}"),
        None => format!("Verification of the {subject}"),
    }
}

//! Wallet connection and verification steps.
//!
//! [`VerificationFlow`] owns the [`FlowState`] behind a mutex that is never held across
//! an `.await`, performs the effects (wallet request, verification request) and feeds
//! their outcome back through [`reduce`].

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use chrono::Utc;
use thiserror::Error;

use crate::{
    activity::DEFAULT_LOG_CAPACITY,
    api::{VerificationApi, VerifyError, DEFAULT_REQUEST_TIMEOUT_SECS},
    notice::{Notice, Notifier},
    session::WalletSession,
    state::{reduce, Event, FlowState, Target, VerificationOutcome},
    wallet::{WalletError, WalletProvider},
};

/// Error types for flow steps. Each one has already been logged and notified.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("No wallet provider available")]
    WalletUnavailable,

    #[error("Wallet not connected")]
    WalletNotConnected,

    #[error("No wallet address entered")]
    EmptyAddress,

    #[error("A verification is already in progress")]
    VerificationInFlight,

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Verify(#[from] VerifyError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowConfig {
    /// Upper bound for one verification request
    pub request_timeout: Duration,
    /// Activity log entries kept before the oldest are evicted
    pub log_capacity: usize,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            log_capacity: DEFAULT_LOG_CAPACITY,
        }
    }
}

pub struct VerificationFlow {
    wallet: Option<Arc<dyn WalletProvider>>,
    api: Arc<dyn VerificationApi>,
    notifier: Arc<dyn Notifier>,
    request_timeout: Duration,
    state: Mutex<FlowState>,
}

impl VerificationFlow {
    /// `wallet` is `None` when no wallet provider is installed
    #[must_use]
    pub fn new(
        wallet: Option<Arc<dyn WalletProvider>>,
        api: Arc<dyn VerificationApi>,
        notifier: Arc<dyn Notifier>,
        config: FlowConfig,
    ) -> Self {
        Self {
            wallet,
            api,
            notifier,
            request_timeout: config.request_timeout,
            state: Mutex::new(FlowState::new(config.log_capacity)),
        }
    }

    /// Snapshot of the current state
    #[must_use]
    pub fn state(&self) -> FlowState {
        self.lock().clone()
    }

    /// Connects the wallet, keeping an existing session if there is one.
    ///
    /// # Errors
    ///
    /// - `FlowError::WalletUnavailable` when no provider is installed
    /// - `FlowError::Wallet` when the provider rejects or fails the request
    pub async fn connect_wallet(&self) -> Result<WalletSession, FlowError> {
        let Some(wallet) = self.wallet.as_ref() else {
            tracing::warn!("No wallet provider available");
            self.apply(Event::WalletUnavailable);
            self.notifier.notify(&Notice::InstallWallet);
            return Err(FlowError::WalletUnavailable);
        };

        self.apply(Event::ConnectRequested);

        let session = match wallet
            .request_accounts()
            .await
            .and_then(|accounts| WalletSession::from_accounts(&accounts))
        {
            Ok(session) => session,
            Err(err) => {
                tracing::error!(error = %err, "Error connecting to wallet");
                self.apply(Event::WalletConnectFailed {
                    reason: err.to_string(),
                });
                self.notifier.notify(&Notice::WalletConnectionFailed {
                    reason: err.to_string(),
                });
                return Err(err.into());
            }
        };

        tracing::info!(address = %session.raw_address(), "Wallet connected");
        self.apply(Event::WalletConnected(session.clone()));
        Ok(self.lock().session.clone().unwrap_or(session))
    }

    /// Verifies the connected wallet.
    ///
    /// Returns the outcome for both human and non-human answers.
    ///
    /// # Errors
    ///
    /// - `FlowError::WalletNotConnected` without a session; nothing is sent
    /// - `FlowError::VerificationInFlight` while a previous verification is outstanding
    /// - `FlowError::Verify` on network failure, timeout or unusable response
    pub async fn verify_connected(&self) -> Result<VerificationOutcome, FlowError> {
        self.run_check(Target::Connected, None).await
    }

    /// Verifies any address without a wallet session, in its own result slot.
    ///
    /// # Errors
    ///
    /// - `FlowError::EmptyAddress` for a blank address; nothing is sent
    /// - `FlowError::VerificationInFlight` and `FlowError::Verify` as for
    ///   [`Self::verify_connected`]
    pub async fn verify_address(&self, address: &str) -> Result<VerificationOutcome, FlowError> {
        self.run_check(Target::Arbitrary, Some(address)).await
    }

    async fn run_check(
        &self,
        target: Target,
        address: Option<&str>,
    ) -> Result<VerificationOutcome, FlowError> {
        let (in_flight, address) = self.begin(target, address)?;

        let result = tokio::time::timeout(self.request_timeout, self.api.verify(&address))
            .await
            .unwrap_or(Err(VerifyError::Timeout(self.request_timeout)));

        match result {
            Ok(result) => {
                let outcome = in_flight.settle(Event::VerificationCompleted { target, result });
                if outcome.is_success() {
                    tracing::info!(%address, "Wallet verified as human");
                    self.notifier.notify(&Notice::VerifiedHuman { target });
                } else {
                    tracing::warn!(%address, "Wallet not verified as human");
                    self.notifier.notify(&Notice::NotHuman { target });
                }
                Ok(outcome)
            }
            Err(err) => {
                tracing::error!(error = %err, %address, "Error fetching data");
                in_flight.settle(Event::VerificationFailed {
                    target,
                    reason: err.to_string(),
                });
                self.notifier.notify(&Notice::VerificationFailed);
                Err(err.into())
            }
        }
    }

    /// Checks the preconditions and marks the slot as loading in one step
    fn begin(
        &self,
        target: Target,
        address: Option<&str>,
    ) -> Result<(InFlight<'_>, String), FlowError> {
        let mut state = self.lock();

        let address = match target {
            Target::Connected => state
                .session
                .as_ref()
                .map(|session| session.raw_address().to_string()),
            Target::Arbitrary => address
                .map(str::trim)
                .filter(|address| !address.is_empty())
                .map(ToString::to_string),
        };

        let Some(address) = address else {
            let (event, notice, err) = match target {
                Target::Connected => (
                    Event::VerifyWithoutWallet,
                    Notice::ConnectWalletFirst,
                    FlowError::WalletNotConnected,
                ),
                Target::Arbitrary => (
                    Event::EmptyAddress,
                    Notice::EnterAddress,
                    FlowError::EmptyAddress,
                ),
            };
            tracing::warn!("{err}");
            transition(&mut state, event);
            drop(state);
            self.notifier.notify(&notice);
            return Err(err);
        };

        if state.slot(target).loading {
            tracing::warn!(%address, "Verification already in progress");
            transition(&mut state, Event::VerificationBusy { target });
            drop(state);
            self.notifier
                .notify(&Notice::VerificationInProgress { target });
            return Err(FlowError::VerificationInFlight);
        }

        tracing::info!(%address, "Verifying wallet");
        transition(
            &mut state,
            Event::VerificationStarted {
                target,
                address: address.clone(),
            },
        );

        Ok((
            InFlight {
                flow: self,
                target,
                settled: false,
            },
            address,
        ))
    }

    fn apply(&self, event: Event) {
        transition(&mut self.lock(), event);
    }

    fn lock(&self) -> MutexGuard<'_, FlowState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn transition(state: &mut FlowState, event: Event) {
    *state = reduce(std::mem::take(state), event, Utc::now());
}

/// Holds a slot's loading flag; dropping it unsettled clears the flag
struct InFlight<'a> {
    flow: &'a VerificationFlow,
    target: Target,
    settled: bool,
}

impl InFlight<'_> {
    fn settle(mut self, event: Event) -> VerificationOutcome {
        self.settled = true;
        let mut state = self.flow.lock();
        transition(&mut state, event);
        state.slot(self.target).outcome.clone()
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::warn!(slot = ?self.target, "Verification dropped before completion");
            self.flow
                .apply(Event::VerificationAbandoned { target: self.target });
        }
    }
}

use std::fmt;

use crate::{activity::Severity, state::Target};

/// User-facing notification raised by the flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// No wallet provider available; blocks until acknowledged
    InstallWallet,
    WalletConnectionFailed { reason: String },
    ConnectWalletFirst,
    EnterAddress,
    /// A verification for the same slot has not finished yet
    VerificationInProgress { target: Target },
    VerifiedHuman { target: Target },
    NotHuman { target: Target },
    /// Network failure, timeout or unusable response
    VerificationFailed,
}

impl Notice {
    /// Blocking notices need acknowledgement before the user can go on
    #[must_use]
    pub const fn is_blocking(&self) -> bool {
        matches!(self, Self::InstallWallet)
    }

    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::InstallWallet
            | Self::ConnectWalletFirst
            | Self::EnterAddress
            | Self::VerificationInProgress { .. } => Severity::Warning,
            Self::VerifiedHuman { .. } => Severity::Success,
            Self::WalletConnectionFailed { .. }
            | Self::NotHuman { .. }
            | Self::VerificationFailed => Severity::Error,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InstallWallet => f.write_str("Please install a wallet extension"),
            Self::WalletConnectionFailed { reason } => {
                write!(f, "Failed to connect wallet: {reason}")
            }
            Self::ConnectWalletFirst => f.write_str("Please connect your wallet first"),
            Self::EnterAddress => f.write_str("Please enter a wallet address"),
            Self::VerificationInProgress { .. } => {
                f.write_str("Verification already in progress, please wait")
            }
            Self::VerifiedHuman { .. } => f.write_str("Wallet verified as human!"),
            Self::NotHuman {
                target: Target::Connected,
            } => f.write_str("Sorry, your wallet cannot be verified as owned by a human"),
            Self::NotHuman {
                target: Target::Arbitrary,
            } => f.write_str("Wallet not verified as human"),
            Self::VerificationFailed => f.write_str("Error fetching data"),
        }
    }
}

/// Receives notices for display (toast, alert, terminal line, ...)
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: &Notice);
}

#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    use std::sync::Mutex;

    use super::{Notice, Notifier};

    /// Keeps every notice it receives
    #[derive(Default)]
    pub struct RecordingNotifier {
        notices: Mutex<Vec<Notice>>,
    }

    impl RecordingNotifier {
        /// # Panics
        ///
        /// If a previous holder of the lock panicked
        #[must_use]
        pub fn notices(&self) -> Vec<Notice> {
            self.notices.lock().unwrap().clone()
        }

        /// Number of recorded notices equal to `notice`
        #[must_use]
        pub fn count(&self, notice: &Notice) -> usize {
            self.notices().iter().filter(|n| *n == notice).count()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notice: &Notice) {
            self.notices.lock().unwrap().push(notice.clone());
        }
    }
}

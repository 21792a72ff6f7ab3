//! Wallet provider seam.
//!
//! A provider hands out account addresses on request, gated by user consent. Whether a
//! provider exists at all is modelled by the flow holding an `Option` of one.

use thiserror::Error;

/// Error types for wallet account requests
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    /// The user declined the account request
    #[error("User rejected the request: {0}")]
    Rejected(String),

    /// The provider failed for its own reasons
    #[error("Wallet provider error: {0}")]
    Provider(String),

    /// The provider granted access but returned no account
    #[error("Wallet returned no accounts")]
    NoAccounts,

    /// The first account is not a `0x`-prefixed 40 hex character address
    #[error("Invalid wallet address: {0}")]
    InvalidAddress(String),
}

/// Trait for wallet providers
#[async_trait::async_trait]
pub trait WalletProvider: Send + Sync {
    /// Requests access to the user's accounts. Safe to call again once granted.
    async fn request_accounts(&self) -> Result<Vec<String>, WalletError>;
}

/// Provider backed by addresses supplied by the operator, used by the CLI
pub struct StaticWalletProvider {
    accounts: Vec<String>,
}

impl StaticWalletProvider {
    #[must_use]
    pub const fn new(accounts: Vec<String>) -> Self {
        Self { accounts }
    }
}

#[async_trait::async_trait]
impl WalletProvider for StaticWalletProvider {
    async fn request_accounts(&self) -> Result<Vec<String>, WalletError> {
        Ok(self.accounts.clone())
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::{WalletError, WalletProvider};

    /// Answers every account request with the same result and counts requests
    pub struct MockWalletProvider {
        response: Result<Vec<String>, WalletError>,
        calls: AtomicUsize,
    }

    impl MockWalletProvider {
        #[must_use]
        pub fn with_accounts(accounts: &[&str]) -> Self {
            Self {
                response: Ok(accounts.iter().map(ToString::to_string).collect()),
                calls: AtomicUsize::new(0),
            }
        }

        #[must_use]
        pub const fn failing(error: WalletError) -> Self {
            Self {
                response: Err(error),
                calls: AtomicUsize::new(0),
            }
        }

        #[must_use]
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl WalletProvider for MockWalletProvider {
        async fn request_accounts(&self) -> Result<Vec<String>, WalletError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response.clone()
        }
    }
}

use std::{sync::Arc, time::Duration};

use clap::{Parser, ValueEnum};

use crate::{
    activity::DEFAULT_LOG_CAPACITY,
    api::{VerifyError, VerifyRoute, DEFAULT_REQUEST_TIMEOUT_SECS},
    flow::FlowConfig,
    wallet::{StaticWalletProvider, WalletProvider},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RouteKind {
    /// Call the Humanity Protocol API with a client-held key
    Direct,
    /// Call the verification proxy
    Proxy,
}

/// Humanity verification client
#[derive(Parser, Debug)]
#[command(name = "verification-client")]
#[command(author, version, about = "Connect a wallet and check its human credential", long_about = None)]
pub struct Args {
    /// Where verification requests go
    #[arg(long, env = "VERIFY_ROUTE", value_enum, default_value_t = RouteKind::Proxy)]
    pub route: RouteKind,

    /// Humanity Protocol API base URL (direct route)
    #[arg(long, env = "API_ADDRESS")]
    pub api_url: Option<String>,

    /// Humanity Protocol API key (direct route)
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Verification proxy base URL (proxy route)
    #[arg(long, env = "PROXY_URL", default_value = "http://localhost:3002")]
    pub proxy_url: String,

    /// Address the wallet provider hands out; without it no provider is installed
    #[arg(long, env = "WALLET_ADDRESS")]
    pub wallet_address: Option<String>,

    /// Verify this address instead of the connected wallet
    #[arg(long, value_name = "ADDRESS")]
    pub check: Option<String>,

    /// Timeout of one verification request in seconds
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Console log entries kept
    #[arg(long, default_value_t = DEFAULT_LOG_CAPACITY)]
    pub log_capacity: usize,

    /// Print the final state as JSON
    #[arg(long)]
    pub json: bool,
}

impl Args {
    /// # Errors
    ///
    /// `VerifyError::MissingConfig` when the direct route lacks its URL or key
    pub fn verify_route(&self) -> Result<VerifyRoute, VerifyError> {
        match self.route {
            RouteKind::Direct => VerifyRoute::direct(self.api_url.clone(), self.api_key.clone()),
            RouteKind::Proxy => Ok(VerifyRoute::proxy(self.proxy_url.clone())),
        }
    }

    #[must_use]
    pub fn flow_config(&self) -> FlowConfig {
        FlowConfig {
            request_timeout: self.request_timeout(),
            log_capacity: self.log_capacity,
        }
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The operator-supplied wallet, `None` when no address was given
    #[must_use]
    pub fn wallet_provider(&self) -> Option<Arc<dyn WalletProvider>> {
        self.wallet_address.as_ref().map(|address| {
            Arc::new(StaticWalletProvider::new(vec![address.clone()])) as Arc<dyn WalletProvider>
        })
    }
}

//! Client for the Humanity Protocol verification API.
//!
//! The proxy holds the API key; browsers only ever talk to the proxy.

mod error;

use std::time::Duration;

use axum::http::StatusCode;
use common_types::{API_KEY_HEADER, UPSTREAM_VERIFY_PATH, WALLET_ADDRESS_QUERY};
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;
use serde_json::{Map, Value};

pub use error::HumanityApiError;

/// Default request timeout in seconds
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
/// Maximum number of idle connections to maintain per host
const MAX_IDLE_CONNECTIONS_PER_HOST: usize = 10;

/// Upstream location and credentials, captured once at start-up
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HumanityApiConfig {
    /// Base URL of the API, e.g. `https://api.humanity.org`
    pub api_url: Option<String>,
    /// Pre-shared key sent in the `X-HP-API-Key` header
    pub api_key: Option<String>,
}

/// Raw upstream answer: status code and JSON object, both passed through by the proxy
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: Map<String, Value>,
}

/// Trait for the Humanity Protocol verification API
#[async_trait::async_trait]
pub trait HumanityApi: Send + Sync {
    /// Configured base URL, echoed by the health route
    fn api_url(&self) -> Option<&str>;

    /// Asks the upstream whether `wallet_address` belongs to a verified human.
    ///
    /// Non-2xx answers are not errors; they are returned with their status.
    async fn verify_wallet(&self, wallet_address: &str)
        -> Result<UpstreamResponse, HumanityApiError>;
}

pub struct HumanityApiClient {
    config: HumanityApiConfig,
    http_client: ClientWithMiddleware,
}

/// Implements an HTTP client to the Humanity Protocol API
impl HumanityApiClient {
    /// Creates a new Humanity Protocol API client
    ///
    /// # Panics
    ///
    /// If the HTTP client fails to be created
    #[must_use]
    pub fn new(config: HumanityApiConfig) -> Self {
        Self::with_timeout(config, Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    /// Same as [`Self::new`] with a custom per-request timeout
    ///
    /// # Panics
    ///
    /// If the HTTP client fails to be created
    #[must_use]
    pub fn with_timeout(config: HumanityApiConfig, timeout: Duration) -> Self {
        let reqwest_client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(MAX_IDLE_CONNECTIONS_PER_HOST)
            .user_agent(format!("verification-proxy/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to create HTTP client");

        let http_client = ClientBuilder::new(reqwest_client)
            .with(TracingMiddleware::default())
            .build();

        Self {
            config,
            http_client,
        }
    }

    fn credentials(&self) -> Result<(&str, &str), HumanityApiError> {
        let api_url = self
            .config
            .api_url
            .as_deref()
            .ok_or(HumanityApiError::MissingApiUrl)?;
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(HumanityApiError::MissingApiKey)?;
        Ok((api_url, api_key))
    }
}

#[async_trait::async_trait]
impl HumanityApi for HumanityApiClient {
    fn api_url(&self) -> Option<&str> {
        self.config.api_url.as_deref()
    }

    async fn verify_wallet(
        &self,
        wallet_address: &str,
    ) -> Result<UpstreamResponse, HumanityApiError> {
        let (api_url, api_key) = self.credentials()?;

        let url = format!("{}{UPSTREAM_VERIFY_PATH}", api_url.trim_end_matches('/'));
        tracing::info!(%url, %wallet_address, "Making request to Humanity Protocol API");

        let response = self
            .http_client
            .get(url)
            .query(&[(WALLET_ADDRESS_QUERY, wallet_address)])
            .header(API_KEY_HEADER, api_key)
            .send()
            .await?;

        let status = response.status();
        let body = match response.json::<Value>().await? {
            Value::Object(body) => body,
            _ => return Err(HumanityApiError::NotAnObject),
        };

        tracing::info!(%status, response = ?body, "Humanity Protocol API response");

        Ok(UpstreamResponse { status, body })
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    };

    use axum::http::StatusCode;
    use serde_json::{Map, Value};

    use super::{HumanityApi, HumanityApiError, UpstreamResponse};

    /// Answers every verification with a canned status and body
    pub struct MockHumanityApi {
        api_url: Option<String>,
        status: StatusCode,
        body: Map<String, Value>,
        calls: AtomicUsize,
        last_wallet_address: Mutex<Option<String>>,
    }

    impl MockHumanityApi {
        /// # Panics
        ///
        /// If `body` is not a JSON object
        #[must_use]
        pub fn new(status: StatusCode, body: Value) -> Self {
            let Value::Object(body) = body else {
                panic!("mock body must be a JSON object");
            };
            Self {
                api_url: Some("http://mock.humanity.invalid".to_string()),
                status,
                body,
                calls: AtomicUsize::new(0),
                last_wallet_address: Mutex::new(None),
            }
        }

        /// Number of verifications requested so far
        #[must_use]
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        /// Address of the most recent verification
        ///
        /// # Panics
        ///
        /// If a previous holder of the lock panicked
        #[must_use]
        pub fn last_wallet_address(&self) -> Option<String> {
            self.last_wallet_address.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl HumanityApi for MockHumanityApi {
        fn api_url(&self) -> Option<&str> {
            self.api_url.as_deref()
        }

        async fn verify_wallet(
            &self,
            wallet_address: &str,
        ) -> Result<UpstreamResponse, HumanityApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_wallet_address.lock().unwrap() = Some(wallet_address.to_string());
            Ok(UpstreamResponse {
                status: self.status,
                body: self.body.clone(),
            })
        }
    }
}

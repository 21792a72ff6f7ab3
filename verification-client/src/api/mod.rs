//! Verification requests, either straight to the Humanity Protocol API or through the
//! verification proxy.

mod error;

use std::time::Duration;

use common_types::{
    VerificationResult, API_KEY_HEADER, UPSTREAM_VERIFY_PATH, WALLET_ADDRESS_QUERY,
};
use reqwest::{Client, Url};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;

pub use error::VerifyError;

/// Default request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Where verification requests go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyRoute {
    /// Call the upstream API with the key held by this client
    Direct { api_url: String, api_key: String },
    /// Call the proxy, which holds the key
    Proxy { proxy_url: String },
}

impl VerifyRoute {
    /// # Errors
    ///
    /// `VerifyError::MissingConfig` when the URL or the key is missing
    pub fn direct(api_url: Option<String>, api_key: Option<String>) -> Result<Self, VerifyError> {
        Ok(Self::Direct {
            api_url: api_url.ok_or(VerifyError::MissingConfig("API_ADDRESS"))?,
            api_key: api_key.ok_or(VerifyError::MissingConfig("API_KEY"))?,
        })
    }

    #[must_use]
    pub fn proxy(proxy_url: impl Into<String>) -> Self {
        Self::Proxy {
            proxy_url: proxy_url.into(),
        }
    }
}

/// Trait for the verification endpoint
#[async_trait::async_trait]
pub trait VerificationApi: Send + Sync {
    /// Issues exactly one verification request for `wallet_address`
    async fn verify(&self, wallet_address: &str) -> Result<VerificationResult, VerifyError>;
}

pub struct HttpVerificationApi {
    route: VerifyRoute,
    http_client: ClientWithMiddleware,
}

impl HttpVerificationApi {
    /// # Panics
    ///
    /// If the HTTP client fails to be created
    #[must_use]
    pub fn new(route: VerifyRoute, timeout: Duration) -> Self {
        let reqwest_client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("verification-client/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to create HTTP client");

        let http_client = ClientBuilder::new(reqwest_client)
            .with(TracingMiddleware::default())
            .build();

        Self { route, http_client }
    }
}

#[async_trait::async_trait]
impl VerificationApi for HttpVerificationApi {
    async fn verify(&self, wallet_address: &str) -> Result<VerificationResult, VerifyError> {
        let request = match &self.route {
            VerifyRoute::Direct { api_url, api_key } => self
                .http_client
                .get(format!(
                    "{}{UPSTREAM_VERIFY_PATH}",
                    api_url.trim_end_matches('/')
                ))
                .query(&[(WALLET_ADDRESS_QUERY, wallet_address)])
                .header(API_KEY_HEADER, api_key),
            VerifyRoute::Proxy { proxy_url } => self
                .http_client
                .get(proxy_verify_url(proxy_url, wallet_address)?),
        };

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(VerifyError::Status { status, body });
        }

        Ok(response.json::<VerificationResult>().await?)
    }
}

/// `{proxy_url}/verify/{wallet_address}` with the address as one encoded path segment
fn proxy_verify_url(proxy_url: &str, wallet_address: &str) -> Result<Url, VerifyError> {
    let invalid = || VerifyError::InvalidProxyUrl(proxy_url.to_string());

    let mut url = Url::parse(proxy_url).map_err(|_| invalid())?;
    url.path_segments_mut()
        .map_err(|()| invalid())?
        .pop_if_empty()
        .push("verify")
        .push(wallet_address);
    Ok(url)
}

#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    use common_types::VerificationResult;
    use reqwest::StatusCode;

    use super::{VerificationApi, VerifyError};

    /// How the mock answers
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        Respond(VerificationResult),
        /// Answer after a delay
        Delayed(Duration, VerificationResult),
        Status(StatusCode),
        /// Never answer
        Hang,
        Panic,
    }

    pub struct MockVerificationApi {
        behavior: MockBehavior,
        calls: AtomicUsize,
    }

    impl MockVerificationApi {
        #[must_use]
        pub const fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior,
                calls: AtomicUsize::new(0),
            }
        }

        #[must_use]
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl VerificationApi for MockVerificationApi {
        async fn verify(&self, _wallet_address: &str) -> Result<VerificationResult, VerifyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                MockBehavior::Respond(result) => Ok(result.clone()),
                MockBehavior::Delayed(delay, result) => {
                    tokio::time::sleep(*delay).await;
                    Ok(result.clone())
                }
                MockBehavior::Status(status) => Err(VerifyError::Status {
                    status: *status,
                    body: String::new(),
                }),
                MockBehavior::Hang => std::future::pending().await,
                MockBehavior::Panic => panic!("verification backend panicked"),
            }
        }
    }
}

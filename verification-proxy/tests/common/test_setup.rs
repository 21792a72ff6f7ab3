use axum::{body::Body, http::Request, response::Response, Router};
use std::sync::Arc;
use tower::ServiceExt;
use verification_proxy::{
    humanity_api::{HumanityApiClient, HumanityApiConfig},
    server,
    types::Environment,
};

use super::FakeUpstream;

pub const TEST_API_KEY: &str = "test-api-key";
pub const TEST_WALLET: &str = "0xdead00000000000000000000000000000000beef";

/// Setup tracing for tests
pub fn setup_test_env() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .ok();
}

/// Proxy router wired to a real HTTP client
pub struct TestSetup {
    pub router: Router,
}

impl TestSetup {
    pub fn new(environment: Environment, config: HumanityApiConfig) -> Self {
        setup_test_env();

        let router = server::router(environment, Arc::new(HumanityApiClient::new(config)));
        Self { router }
    }

    /// Proxy pointing at `upstream` with the test API key
    pub fn with_upstream(upstream: &FakeUpstream) -> Self {
        Self::new(
            Environment::Development,
            HumanityApiConfig {
                api_url: Some(upstream.url()),
                api_key: Some(TEST_API_KEY.to_string()),
            },
        )
    }

    pub async fn send_get_request(
        &self,
        route: &str,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("GET")
            .body(Body::empty())?;
        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    pub async fn parse_response_body(
        &self,
        response: Response,
    ) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
        use http_body_util::BodyExt;

        let body = response.into_body().collect().await?.to_bytes();
        let json = serde_json::from_slice(&body)?;
        Ok(json)
    }
}

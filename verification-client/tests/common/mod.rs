#![allow(dead_code)]

use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use common_types::VerificationResult;
use serde_json::json;
use tokio::net::TcpListener;
use verification_client::{
    api::mock::{MockBehavior, MockVerificationApi},
    flow::{FlowConfig, VerificationFlow},
    notice::mock::RecordingNotifier,
    wallet::{mock::MockWalletProvider, WalletProvider},
};
use verification_proxy::{humanity_api::HumanityApi, server, types::Environment};

pub const WALLET: &str = "0xdead00000000000000000000000000000000beef";

/// Flow under test together with the doubles it talks to
pub struct FlowSetup {
    pub flow: VerificationFlow,
    pub wallet: Option<Arc<MockWalletProvider>>,
    pub api: Arc<MockVerificationApi>,
    pub notifier: Arc<RecordingNotifier>,
}

impl FlowSetup {
    pub fn new(wallet: Option<MockWalletProvider>, behavior: MockBehavior) -> Self {
        Self::with_config(wallet, behavior, FlowConfig::default())
    }

    pub fn with_config(
        wallet: Option<MockWalletProvider>,
        behavior: MockBehavior,
        config: FlowConfig,
    ) -> Self {
        let wallet = wallet.map(Arc::new);
        let api = Arc::new(MockVerificationApi::new(behavior));
        let notifier = Arc::new(RecordingNotifier::default());

        let flow = VerificationFlow::new(
            wallet
                .clone()
                .map(|wallet| wallet as Arc<dyn WalletProvider>),
            api.clone(),
            notifier.clone(),
            config,
        );

        Self {
            flow,
            wallet,
            api,
            notifier,
        }
    }

    /// Setup with a wallet holding [`WALLET`]
    pub fn connected(behavior: MockBehavior) -> Self {
        Self::new(Some(MockWalletProvider::with_accounts(&[WALLET])), behavior)
    }

    pub fn wallet_calls(&self) -> usize {
        self.wallet.as_ref().map_or(0, |wallet| wallet.calls())
    }
}

pub fn human(user_id: &str) -> MockBehavior {
    MockBehavior::Respond(VerificationResult::new(
        Some(WALLET.to_string()),
        true,
        Some(user_id.to_string()),
    ))
}

pub fn not_human() -> MockBehavior {
    MockBehavior::Respond(VerificationResult::new(Some(WALLET.to_string()), false, None))
}

pub fn short_timeout() -> FlowConfig {
    FlowConfig {
        request_timeout: Duration::from_millis(50),
        ..FlowConfig::default()
    }
}

/// Serves `router` on an ephemeral loopback port and returns its base URL
pub async fn serve(router: Router) -> String {
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local address");

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Test server failed");
    });

    format!("http://{addr}")
}

/// Runs the verification proxy in-process in front of `humanity_api`
pub async fn spawn_proxy(humanity_api: Arc<dyn HumanityApi>) -> String {
    serve(server::router(Environment::Development, humanity_api)).await
}

/// Wallet address and API key seen by [`spawn_upstream`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeenRequest {
    pub wallet_address: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Clone)]
struct UpstreamState {
    api_key: String,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

/// Stand-in for the Humanity Protocol API: answers 401 unless `api_key` is presented,
/// otherwise reports the address as a human with user id `abc`
pub async fn spawn_upstream(api_key: &str) -> (String, Arc<Mutex<Vec<SeenRequest>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let state = UpstreamState {
        api_key: api_key.to_string(),
        seen: seen.clone(),
    };

    let router = Router::new()
        .route("/v1/human/verify", get(upstream_verify))
        .with_state(state);

    (serve(router).await, seen)
}

async fn upstream_verify(
    State(state): State<UpstreamState>,
    Query(query): Query<std::collections::HashMap<String, String>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let request = SeenRequest {
        wallet_address: query.get("wallet_address").cloned(),
        api_key: headers
            .get("X-HP-API-Key")
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string),
    };
    state.seen.lock().unwrap().push(request.clone());

    if request.api_key.as_deref() != Some(state.api_key.as_str()) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "invalid api key" })),
        );
    }

    (
        StatusCode::OK,
        Json(json!({
            "wallet_address": request.wallet_address,
            "is_human": true,
            "user_id": "abc",
        })),
    )
}

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use common_types::{API_KEY_HEADER, UPSTREAM_VERIFY_PATH, WALLET_ADDRESS_QUERY};
use tokio::net::TcpListener;

/// What the fake upstream saw on its last call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub wallet_address: Option<String>,
    pub api_key: Option<String>,
}

struct UpstreamState {
    status: StatusCode,
    body: String,
    hits: AtomicUsize,
    last_request: Mutex<Option<RecordedRequest>>,
}

/// In-process stand-in for the Humanity Protocol API, bound to a random loopback port
pub struct FakeUpstream {
    addr: SocketAddr,
    state: Arc<UpstreamState>,
}

impl FakeUpstream {
    /// Answers every call with `status` and the given JSON body
    pub async fn json(status: StatusCode, body: serde_json::Value) -> Self {
        Self::raw(status, body.to_string()).await
    }

    /// Answers every call with `status` and an arbitrary body
    pub async fn raw(status: StatusCode, body: impl Into<String>) -> Self {
        let state = Arc::new(UpstreamState {
            status,
            body: body.into(),
            hits: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        });

        let app = Router::new()
            .route(UPSTREAM_VERIFY_PATH, get(verify))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake upstream");
        let addr = listener.local_addr().expect("Failed to read local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.state.last_request.lock().unwrap().clone()
    }
}

async fn verify(
    State(state): State<Arc<UpstreamState>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    *state.last_request.lock().unwrap() = Some(RecordedRequest {
        wallet_address: query.get(WALLET_ADDRESS_QUERY).cloned(),
        api_key: headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string),
    });

    (
        state.status,
        [(header::CONTENT_TYPE, "application/json")],
        state.body.clone(),
    )
}

use std::sync::Arc;

use aide::OperationOutput;
use axum::{
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::{DateTime, SecondsFormat, Utc};
use common_types::SERVER_IDENTIFIER;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    humanity_api::{HumanityApi, UpstreamResponse},
    types::AppError,
};

#[derive(Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyParams {
    /// The wallet address to verify (EIP-55 compliant)
    pub wallet_address: String,
}

/// Upstream verification envelope re-emitted by the proxy
#[derive(Debug, Serialize, JsonSchema)]
pub struct ProxiedVerification {
    /// Fields of the upstream answer (`wallet_address`, `is_human`, `user_id`, ...)
    #[serde(flatten)]
    pub upstream: Map<String, Value>,
    /// Time at which the proxy produced the envelope
    pub timestamp: String,
    /// Server identifier
    pub server: String,
}

impl ProxiedVerification {
    /// Merges the proxy fields into the upstream body; proxy fields win on conflict
    #[must_use]
    pub fn new(mut upstream: Map<String, Value>, now: DateTime<Utc>) -> Self {
        upstream.remove("timestamp");
        upstream.remove("server");
        Self {
            upstream,
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            server: SERVER_IDENTIFIER.to_string(),
        }
    }
}

/// Proxied envelope along with the upstream status code
#[derive(Debug)]
pub struct ProxyReply {
    status: StatusCode,
    body: ProxiedVerification,
}

impl From<UpstreamResponse> for ProxyReply {
    fn from(upstream: UpstreamResponse) -> Self {
        Self {
            status: upstream.status,
            body: ProxiedVerification::new(upstream.body, Utc::now()),
        }
    }
}

impl IntoResponse for ProxyReply {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl OperationOutput for ProxyReply {
    type Inner = ProxiedVerification;

    fn operation_response(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Option<aide::openapi::Response> {
        Json::<ProxiedVerification>::operation_response(ctx, operation)
    }
}

/// Verify if a wallet address belongs to a human
///
/// Forwards the address to the Humanity Protocol API with the server-held key and
/// re-emits the answer with `timestamp` and `server` fields. Upstream error statuses
/// are passed through.
///
/// # Errors
///
/// - `500` when `HP_API_URL` or `HP_API_KEY` is missing; the upstream is not contacted
/// - `500` when the upstream cannot be reached or does not answer with a JSON object
pub async fn handler(
    Extension(humanity_api): Extension<Arc<dyn HumanityApi>>,
    Path(VerifyParams { wallet_address }): Path<VerifyParams>,
) -> Result<ProxyReply, AppError> {
    tracing::info!(%wallet_address, "Verifying wallet");

    let upstream = humanity_api.verify_wallet(&wallet_address).await?;
    if !upstream.status.is_success() {
        tracing::warn!(
            status = %upstream.status,
            %wallet_address,
            "Humanity Protocol API returned an error status"
        );
    }

    Ok(upstream.into())
}

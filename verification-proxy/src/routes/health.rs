use std::sync::Arc;

use axum::{Extension, Json};
use chrono::{SecondsFormat, Utc};
use common_types::HealthResponse;

use crate::humanity_api::HumanityApi;

/// Health check endpoint
///
/// Returns the server status, the current time and the configured upstream URL.
pub async fn handler(
    Extension(humanity_api): Extension<Arc<dyn HumanityApi>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        api_url: humanity_api.api_url().map(ToString::to_string),
    })
}

//! OpenAPI document and Scalar UI. Neither route exists when docs are disabled.

use aide::{axum::ApiRouter, openapi::OpenApi, scalar::Scalar};
use axum::{routing::get, Extension, Json};

use crate::types::Environment;

const OPENAPI_PATH: &str = "/openapi.json";

pub fn handler(environment: &Environment) -> ApiRouter {
    if !environment.show_api_docs() {
        tracing::debug!(?environment, "API docs disabled");
        return ApiRouter::new();
    }

    let scalar = Scalar::new(OPENAPI_PATH).with_title("Humanity Verification Proxy");
    ApiRouter::new()
        .route("/docs", scalar.axum_route())
        .route(OPENAPI_PATH, get(openapi_document))
}

#[allow(clippy::unused_async)]
async fn openapi_document(Extension(openapi): Extension<OpenApi>) -> Json<OpenApi> {
    Json(openapi)
}

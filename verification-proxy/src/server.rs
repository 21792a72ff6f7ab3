use std::{sync::Arc, time::Duration};

use aide::openapi::{Info, OpenApi};
use axum::{Extension, Router};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::routes;
use crate::{
    humanity_api::HumanityApi,
    types::{Environment, DEFAULT_PORT},
};

/// Builds the proxy router with its OpenAPI document and shared dependencies
pub fn router(environment: Environment, humanity_api: Arc<dyn HumanityApi>) -> Router {
    let mut openapi = OpenApi {
        info: Info {
            title: "Humanity Protocol Server Example".to_string(),
            description: Some(
                "Verification proxy for the Humanity Protocol API".to_string(),
            ),
            version: env!("CARGO_PKG_VERSION").to_string(),
            ..Info::default()
        },
        ..OpenApi::default()
    };

    routes::handler(&environment)
        .finish_api(&mut openapi)
        .layer(Extension(openapi))
        .layer(Extension(humanity_api))
        .layer(TraceLayer::new_for_http())
        // Browser clients call the proxy cross-origin
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(Duration::from_secs(15)))
}

/// Starts the server with the given environment and dependencies
///
/// # Errors
///
/// Returns an error if the server fails to start or bind to the port
pub async fn start(
    environment: Environment,
    humanity_api: Arc<dyn HumanityApi>,
) -> anyhow::Result<()> {
    let api_url = humanity_api.api_url().map(ToString::to_string);
    let router = router(environment, humanity_api);

    let addr = std::net::SocketAddr::from((
        [0, 0, 0, 0],
        std::env::var("PORT").map_or(Ok(DEFAULT_PORT), |p| p.parse())?,
    ));

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🔄 Verification proxy started on http://{addr}");
    tracing::info!("API docs available at http://{addr}/docs");
    match api_url {
        Some(api_url) => tracing::info!("Using Humanity Protocol API at: {api_url}"),
        None => tracing::warn!("HP_API_URL is not set, verifications will fail"),
    }

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(anyhow::Error::from)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}

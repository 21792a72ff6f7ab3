use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};
use verification_proxy::{
    humanity_api::{HumanityApi, HumanityApiClient},
    server,
    types::Environment,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env();
    let filter = EnvFilter::builder()
        .with_default_directive(environment.tracing_level().into())
        .from_env_lossy();

    // Use JSON format for staging/production, regular format for development
    if environment.json_logs() {
        fmt().json().with_env_filter(filter).init();
    } else {
        fmt().with_env_filter(filter).init();
    }

    let humanity_api: Arc<dyn HumanityApi> =
        Arc::new(HumanityApiClient::new(environment.humanity_api_config()));

    server::start(environment, humanity_api).await
}

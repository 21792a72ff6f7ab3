use std::{process::ExitCode, sync::Arc};

use clap::Parser;
use tracing_subscriber::EnvFilter;
use verification_client::{
    api::HttpVerificationApi,
    cli::Args,
    flow::VerificationFlow,
    render::{self, ConsoleNotifier},
    state::Target,
};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Logs go to stderr so stdout only carries the rendered result
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let api = Arc::new(HttpVerificationApi::new(
        args.verify_route()?,
        args.request_timeout(),
    ));
    let flow = VerificationFlow::new(
        args.wallet_provider(),
        api,
        Arc::new(ConsoleNotifier),
        args.flow_config(),
    );

    let (target, outcome) = match &args.check {
        Some(address) => (Target::Arbitrary, flow.verify_address(address).await),
        None => {
            let outcome = match flow.connect_wallet().await {
                Ok(_) => flow.verify_connected().await,
                Err(err) => Err(err),
            };
            (Target::Connected, outcome)
        }
    };

    let state = flow.state();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else {
        print!("{}", render::render_state(&state, target));
    }

    match outcome {
        Ok(outcome) if outcome.is_success() => Ok(ExitCode::SUCCESS),
        Ok(_) => Ok(ExitCode::from(1)),
        Err(err) => {
            tracing::debug!(error = %err, "Verification flow ended with an error");
            Ok(ExitCode::from(2))
        }
    }
}

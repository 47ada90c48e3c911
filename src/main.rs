use clap::Parser;
use grafana_slack_relay::{
    Args, config::Config, gateway::Gateway, http, metrics, signal_handler, slack::SlackClient,
};
use axum_server::Handle;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Setup tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    metrics::register_metrics()?;

    // Parse config
    let args = Args::parse();
    let config = Arc::new(Config::from_args(&args)?);
    tracing::info!(
        "Posting as '{}' with {:?} alert source",
        config.slack.username,
        config.source
    );

    let handle = Handle::new();
    signal_handler(handle.clone())?;

    let slack = SlackClient::new(config.slack.webhook_url.clone())?;
    let gateway = Arc::new(Gateway::new(config.clone(), slack));

    http::create_server(&config.http, gateway, handle).await
}

use axum_server::Handle;
use clap::{Parser, ValueEnum};
use std::{path::PathBuf, time::Duration};
use tokio::{
    select,
    signal::unix::{SignalKind, signal},
};

pub mod config;
pub mod error;
pub mod gateway;
pub mod grafana;
pub mod http;
pub mod metrics;
pub mod render;
pub mod slack;

#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Slack incoming webhook url
    #[arg(long)]
    pub webhook_url: Option<String>,

    /// Username shown on posted messages (default: Grafana)
    #[arg(short, long)]
    pub username: Option<String>,

    /// Where alerts come from
    #[arg(long, value_enum)]
    pub mode: Option<Mode>,

    /// Grafana url used to build links in external mode
    #[arg(long)]
    pub base_url: Option<String>,

    /// Alertmanager datasource name used in external mode links
    #[arg(long)]
    pub alertmanager: Option<String>,

    /// Prometheus datasource opened by the explore button in external mode
    #[arg(long)]
    pub datasource: Option<String>,

    /// Add a silence button to firing alerts
    #[arg(long)]
    pub enable_silence: bool,

    /// Address to listen on (default: 0.0.0.0)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (default: 8080)
    #[arg(short, long)]
    pub port: Option<u16>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Grafana-managed alerts
    Native,
    /// Alerts from an external Alertmanager
    External,
}

/// Grace period for in-flight requests once a shutdown signal arrives
pub const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(30);

/// Handle signals by shutting the server down gracefully
pub fn signal_handler(handle: Handle) -> anyhow::Result<()> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::spawn(async move {
        select! {
            _ = sigterm.recv() => tracing::info!("SIGTERM received, shutting down"),
            _ = sigint.recv() => tracing::info!("SIGINT received, shutting down"),
        }

        handle.graceful_shutdown(Some(SHUTDOWN_GRACE_PERIOD));
    });

    Ok(())
}

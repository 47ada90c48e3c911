use metrics::{describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

pub mod delivery;
pub mod http;

pub static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder and describe the metrics for the application
pub fn register_metrics() -> anyhow::Result<()> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    METRICS_HANDLE
        .set(handle)
        .map_err(|_| anyhow::anyhow!("Metrics handle is already set"))?;

    delivery::register_metrics();
    http::register_metrics();

    describe_gauge!(
        "build_info",
        "Build information of the application, labeled by version"
    );
    gauge!("build_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);

    Ok(())
}

#[derive(Debug, Clone, Copy)]
pub enum Status {
    Success,
    Failure,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Success => write!(f, "success"),
            Status::Failure => write!(f, "failure"),
        }
    }
}

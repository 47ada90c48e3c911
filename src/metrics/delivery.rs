use crate::metrics::Status;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Instant;

/// Register the metrics for the application
pub(super) fn register_metrics() {
    // Alerts received from Grafana, labeled by alert status.
    describe_counter!(
        "alerts_received_total",
        "Total number of alerts received in webhook notifications"
    );

    describe_counter!(
        "messages_rendered_total",
        "Total number of Slack messages rendered from alert batches"
    );

    // Labeled by status (success or failure).
    describe_counter!(
        "deliveries_total",
        "Total number of Slack webhook deliveries"
    );

    describe_histogram!(
        "delivery_duration_seconds",
        "Duration of Slack webhook deliveries in seconds"
    );
}

/// Record an alert received with the given status
pub fn record_alert_received(status: &str) {
    counter!("alerts_received_total", "status" => status.to_string()).increment(1);
}

/// Record the number of messages rendered for one notification
pub fn record_messages_rendered(count: usize) {
    counter!("messages_rendered_total").increment(count as u64);
}

/// Record a delivery attempt with the given status
pub fn record_delivery(status: Status) {
    counter!("deliveries_total", "status" => status.to_string()).increment(1);
}

/// Create a timer for a single delivery
pub fn delivery_timer() -> Timer {
    Timer {
        start_time: Instant::now(),
    }
}

pub struct Timer {
    start_time: Instant,
}

impl Drop for Timer {
    fn drop(&mut self) {
        histogram!("delivery_duration_seconds").record(self.start_time.elapsed().as_secs_f64());
    }
}

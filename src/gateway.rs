use crate::{
    config::Config,
    error::{DeliveryError, GatewayError},
    grafana::AlertBatch,
    metrics::{Status, delivery as delivery_metrics},
    render::render,
    slack::message::WebhookMessage,
};
use std::sync::Arc;

/// Channel used when the request does not name one
pub const DEFAULT_CHANNEL: &str = "alerts";

/// Sends a rendered message to its destination
pub trait Delivery: Send + Sync {
    fn deliver(
        &self,
        message: &WebhookMessage,
    ) -> impl Future<Output = Result<(), DeliveryError>> + Send;
}

pub struct Gateway<D> {
    config: Arc<Config>,
    delivery: D,
}

impl<D: Delivery> Gateway<D> {
    /// Create a new Gateway instance
    pub fn new(config: Arc<Config>, delivery: D) -> Self {
        Self { config, delivery }
    }

    pub fn delivery(&self) -> &D {
        &self.delivery
    }

    /// Decode a notification, render it and deliver every message.
    ///
    /// Deliveries are attempted for all messages even if some fail; the request
    /// fails when any of them did. Returns the number of delivered messages.
    #[tracing::instrument(skip(self, body))]
    pub async fn handle(
        &self,
        body: &[u8],
        channel: Option<&str>,
    ) -> Result<usize, GatewayError> {
        let batch: AlertBatch = serde_json::from_slice(body).map_err(|e| {
            tracing::error!("Failed to decode alert batch: {}", e);
            GatewayError::Decode(e)
        })?;

        let channel = match channel.filter(|c| !c.is_empty()) {
            Some(channel) => channel,
            None => {
                tracing::info!(
                    "Slack channel is not specified in 'channel' query param, \
                     using default '{}' channel",
                    DEFAULT_CHANNEL
                );
                DEFAULT_CHANNEL
            }
        };

        for alert in &batch.alerts {
            delivery_metrics::record_alert_received(&alert.status);
        }

        let messages = render(&batch, channel, &self.config);
        delivery_metrics::record_messages_rendered(messages.len());
        tracing::info!(
            "Rendered {} alerts into {} messages",
            batch.alerts.len(),
            messages.len()
        );

        let total = messages.len();
        let mut failed = 0;
        let mut last_error = None;

        for message in &messages {
            let _timer = delivery_metrics::delivery_timer();

            match self.delivery.deliver(message).await {
                Ok(()) => delivery_metrics::record_delivery(Status::Success),
                Err(e) => {
                    tracing::error!("Failed to deliver message to '{}': {}", channel, e);
                    delivery_metrics::record_delivery(Status::Failure);
                    failed += 1;
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(source) => Err(GatewayError::Delivery {
                failed,
                total,
                source,
            }),
            None => Ok(total),
        }
    }
}

use crate::{error::DeliveryError, gateway::Delivery, slack::message::WebhookMessage};

pub mod block;
pub mod message;

pub struct SlackClient {
    webhook_url: String,
    client: reqwest::Client,
}

impl SlackClient {
    /// Create a new Slack client posting to the given incoming webhook
    pub fn new(webhook_url: impl Into<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("grafana-slack-relay/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            webhook_url: webhook_url.into(),
            client,
        })
    }

    /// Post a message to the webhook
    #[tracing::instrument(skip_all, fields(channel = %message.channel))]
    pub async fn post(&self, message: &WebhookMessage) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(message)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        tracing::error!(
            "Slack rejected message with HTTP {}: {}, payload: {}",
            status,
            body,
            serde_json::to_string(message).unwrap_or_default()
        );

        Err(DeliveryError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

impl Delivery for SlackClient {
    async fn deliver(&self, message: &WebhookMessage) -> Result<(), DeliveryError> {
        self.post(message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slack::block::Block;
    use axum::{Json, Router, extract::State, routing::post};
    use hyper::StatusCode;
    use std::{net::SocketAddr, sync::Arc};
    use tokio::{net::TcpListener, sync::Mutex};

    type Received = Arc<Mutex<Vec<serde_json::Value>>>;

    async fn record(
        State(received): State<Received>,
        Json(body): Json<serde_json::Value>,
    ) -> StatusCode {
        received.lock().await.push(body);
        StatusCode::OK
    }

    /// Local stand-in for the Slack webhook endpoint
    async fn webhook() -> (SocketAddr, Received) {
        let received = Received::default();

        let app = Router::new()
            .route("/ok", post(record))
            .route(
                "/missing",
                post(|| async { (StatusCode::NOT_FOUND, "channel_not_found") }),
            )
            .with_state(received.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await });

        (addr, received)
    }

    fn message() -> WebhookMessage {
        WebhookMessage {
            channel: "ops".to_string(),
            username: "Grafana".to_string(),
            text: "Fired: HighLatency".to_string(),
            blocks: vec![Block::header("HighLatency")],
        }
    }

    #[tokio::test]
    async fn posts_message_as_json() {
        let (addr, received) = webhook().await;
        let client = SlackClient::new(format!("http://{addr}/ok")).unwrap();

        client.post(&message()).await.unwrap();

        let received = received.lock().await;
        assert_eq!(received.len(), 1);
        assert_eq!(received[0]["channel"], "ops");
        assert_eq!(received[0]["username"], "Grafana");
        assert_eq!(received[0]["text"], "Fired: HighLatency");
        assert_eq!(received[0]["blocks"][0]["type"], "header");
    }

    #[tokio::test]
    async fn rejected_message_keeps_status_and_body() {
        let (addr, _) = webhook().await;
        let client = SlackClient::new(format!("http://{addr}/missing")).unwrap();

        match client.post(&message()).await {
            Err(DeliveryError::Rejected { status, body }) => {
                assert_eq!(status, 404);
                assert_eq!(body, "channel_not_found");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_webhook_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = SlackClient::new(format!("http://{addr}/ok")).unwrap();

        assert!(matches!(
            client.post(&message()).await,
            Err(DeliveryError::Transport(_))
        ));
    }
}

use crate::{
    config::Http,
    gateway::{Delivery, Gateway},
    metrics::{METRICS_HANDLE, http as http_metrics},
};
use axum::{
    Router,
    body::Bytes,
    extract::{Query, State},
    response::IntoResponse,
    routing::{get, post},
};
use axum_server::Handle;
use hyper::StatusCode;
use serde::Deserialize;
use std::{net::SocketAddr, sync::Arc};

#[derive(Debug, Deserialize)]
pub struct SlackQuery {
    pub channel: Option<String>,
}

/// Creates an Axum Web Server, running until `handle` is told to shut down
pub async fn create_server<D: Delivery + 'static>(
    config: &Http,
    gateway: Arc<Gateway<D>>,
    handle: Handle,
) -> anyhow::Result<()> {
    tracing::info!("Starting the web server");

    let app = create_router(gateway);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("Listening on {}", addr);

    axum_server::bind(addr)
        .handle(handle)
        .serve(app.into_make_service_with_connect_info::<SocketAddr>())
        .await?;

    tracing::info!("Web server shut down");
    Ok(())
}

/// Create the router for the application
pub fn create_router<D: Delivery + 'static>(gateway: Arc<Gateway<D>>) -> Router {
    Router::new()
        .route("/slack", post(slack::<D>).put(slack::<D>))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .with_state(gateway)
}

/// This is the handler for the /slack path
async fn slack<D: Delivery + 'static>(
    State(gateway): State<Arc<Gateway<D>>>,
    Query(query): Query<SlackQuery>,
    body: Bytes,
) -> (StatusCode, String) {
    let _timer = http_metrics::http_request_timer("/slack");

    let response = match gateway.handle(&body, query.channel.as_deref()).await {
        Ok(_) => (StatusCode::OK, String::new()),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };

    http_metrics::record_http_request("/slack", response.0);
    response
}

/// This is the handler for the /health path
async fn health() -> StatusCode {
    let _timer = http_metrics::http_request_timer("/health");
    http_metrics::record_http_request("/health", StatusCode::OK);

    StatusCode::OK
}

/// This is the handler for the /metrics path
async fn metrics() -> impl IntoResponse {
    let _timer = http_metrics::http_request_timer("/metrics");

    let response = match METRICS_HANDLE.get() {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to get the metrics handle".to_string(),
        ),
    };

    http_metrics::record_http_request("/metrics", response.0);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        gateway::tests::{RecordingDelivery, payload},
    };
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use std::time::Duration;
    use tower::ServiceExt;

    fn app(delivery: RecordingDelivery) -> (Router, Arc<Gateway<RecordingDelivery>>) {
        let config = Arc::new(Config::new("https://hooks.slack.com/services/T/B/X"));
        let gateway = Arc::new(Gateway::new(config, delivery));
        (create_router(gateway.clone()), gateway)
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (app, _) = app(RecordingDelivery::default());

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn slack_forwards_to_channel() {
        let (app, gateway) = app(RecordingDelivery::default());

        let request = Request::builder()
            .method("POST")
            .uri("/slack?channel=ops")
            .body(Body::from(payload(&["firing", "resolved"])))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let attempts = gateway.delivery().attempts();
        assert_eq!(attempts.len(), 2);
        assert!(attempts.iter().all(|m| m.channel == "ops"));
    }

    #[tokio::test]
    async fn malformed_body_is_a_server_error() {
        let (app, gateway) = app(RecordingDelivery::default());

        let request = Request::builder()
            .method("POST")
            .uri("/slack")
            .body(Body::from("not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_text(response).await.starts_with("failed to decode alert batch"));
        assert!(gateway.delivery().attempts().is_empty());
    }

    #[tokio::test]
    async fn delivery_failure_is_a_server_error() {
        let (app, gateway) = app(RecordingDelivery::failing_on(vec![1]));

        let request = Request::builder()
            .method("POST")
            .uri("/slack")
            .body(Body::from(payload(&["firing", "resolved"])))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_text(response).await.contains("invalid_blocks"));
        assert_eq!(gateway.delivery().attempts().len(), 2);
    }

    #[tokio::test]
    async fn slack_accepts_put() {
        let (app, gateway) = app(RecordingDelivery::default());

        let request = Request::builder()
            .method("PUT")
            .uri("/slack?channel=ops")
            .body(Body::from(payload(&["firing"])))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(gateway.delivery().attempts().len(), 1);
    }

    #[tokio::test]
    async fn server_stops_on_graceful_shutdown() {
        let config = Arc::new(Config::new("https://hooks.slack.com/services/T/B/X"));
        let gateway = Arc::new(Gateway::new(config, RecordingDelivery::default()));
        let http = Http {
            host: "127.0.0.1".to_string(),
            port: 0,
        };
        let handle = Handle::new();

        let server = tokio::spawn({
            let handle = handle.clone();
            async move { create_server(&http, gateway, handle).await }
        });

        let addr = handle.listening().await.unwrap();
        let response = reqwest::get(format!("http://{addr}/health")).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        handle.graceful_shutdown(Some(Duration::from_secs(1)));

        let result = tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .expect("server did not stop")
            .unwrap();
        assert!(result.is_ok());
    }
}

use thiserror::Error;

/// Errors returned to the caller of the `/slack` endpoint.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request body is not a valid alert batch.
    #[error("failed to decode alert batch: {0}")]
    Decode(#[source] serde_json::Error),

    /// At least one message could not be delivered to Slack.
    #[error("{failed} of {total} messages failed to deliver, last error: {source}")]
    Delivery {
        failed: usize,
        total: usize,
        #[source]
        source: DeliveryError,
    },
}

/// Failure to post a single message to the Slack webhook.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("webhook request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("webhook rejected the message with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Failure to construct an auxiliary link for a button.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("invalid base url '{url}': {source}")]
    BaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid generator url '{url}': {source}")]
    GeneratorUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("no query expression in generator url '{0}'")]
    MissingExpr(String),
}

/// A value string that does not hold a number.
#[derive(Debug, Error)]
#[error("cannot humanize '{input}': {source}")]
pub struct HumanizeError {
    pub input: String,
    #[source]
    pub source: std::num::ParseFloatError,
}

use crate::slack::block::Block;
use serde::Serialize;

/// Payload of a Slack incoming webhook call
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct WebhookMessage {
    pub channel: String,
    pub username: String,
    /// Notification preview, shown where blocks cannot be rendered
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,
    pub blocks: Vec<Block>,
}

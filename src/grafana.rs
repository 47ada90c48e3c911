use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

pub mod alert;

pub use alert::Alert;

/// Notification posted by Grafana or Alertmanager to a webhook contact point
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct AlertBatch {
    #[serde(deserialize_with = "null_as_default")]
    pub receiver: String,
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub alerts: Vec<Alert>,
    #[serde(rename = "groupLabels", deserialize_with = "null_as_default")]
    pub group_labels: HashMap<String, String>,
    #[serde(rename = "commonLabels", deserialize_with = "null_as_default")]
    pub common_labels: HashMap<String, String>,
    #[serde(rename = "commonAnnotations", deserialize_with = "null_as_default")]
    pub common_annotations: HashMap<String, String>,
    #[serde(rename = "externalURL", deserialize_with = "null_as_default")]
    pub external_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub version: String,
    #[serde(rename = "groupKey", deserialize_with = "null_as_default")]
    pub group_key: String,
    #[serde(rename = "truncatedAlerts", deserialize_with = "null_as_default")]
    pub truncated_alerts: u64,
    #[serde(rename = "orgId", deserialize_with = "null_as_default")]
    pub org_id: i64,
}

/// Decode an explicit `null` the same way as a missing field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

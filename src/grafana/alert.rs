use super::null_as_default;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

pub const STATUS_RESOLVED: &str = "resolved";

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Alert {
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub labels: HashMap<String, String>,
    #[serde(deserialize_with = "null_as_default")]
    pub annotations: HashMap<String, String>,
    #[serde(rename = "startsAt", deserialize_with = "null_as_default")]
    pub starts_at: DateTime<Utc>,
    #[serde(rename = "endsAt")]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(rename = "generatorURL", deserialize_with = "null_as_default")]
    pub generator_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub fingerprint: String,
    #[serde(rename = "silenceURL", deserialize_with = "null_as_default")]
    pub silence_url: String,
    #[serde(rename = "dashboardURL", deserialize_with = "null_as_default")]
    pub dashboard_url: String,
    #[serde(rename = "panelURL", deserialize_with = "null_as_default")]
    pub panel_url: String,
    #[serde(rename = "valueString")]
    pub value_string: Option<String>,
    #[serde(rename = "imageURL")]
    pub image_url: Option<String>,
    #[serde(rename = "embeddedImage")]
    pub embedded_image: Option<String>,
}

impl Alert {
    /// Any status other than `resolved` counts as firing
    pub fn is_resolved(&self) -> bool {
        self.status == STATUS_RESOLVED
    }

    /// Annotation value, empty when absent
    pub fn annotation(&self, name: &str) -> &str {
        self.annotations.get(name).map(String::as_str).unwrap_or_default()
    }

    pub fn summary(&self) -> &str {
        self.annotation("summary")
    }

    /// End time of the alert. Go's zero time and the epoch mean it has not ended.
    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ends_at.filter(|t| t.timestamp() > 0)
    }

    /// Labels sorted by name
    pub fn sorted_labels(&self) -> Vec<(&str, &str)> {
        let mut labels: Vec<_> = self
            .labels
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        labels.sort_unstable();
        labels
    }
}

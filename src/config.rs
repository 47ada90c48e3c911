use crate::{Args, Mode};
use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;

const DEFAULT_USERNAME: &str = "Grafana";
const DEFAULT_MENTION_LABEL: &str = "label_app_kubernetes_io_team";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub slack: Slack,
    #[serde(default)]
    pub source: Source,
    #[serde(default)]
    pub render: Render,
    #[serde(default)]
    pub http: Http,
}

#[derive(Debug, Clone)]
pub struct Slack {
    pub webhook_url: String,
    pub username: String,
}

/// Where the alerts come from, which decides how links are built
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Source {
    /// Grafana-managed alerting, links are taken from the alert itself
    #[default]
    Native,
    /// An external Alertmanager viewed through Grafana at `base_url`
    External {
        #[serde(rename = "baseUrl", default)]
        base_url: String,
        #[serde(default)]
        alertmanager: Option<String>,
        /// Prometheus datasource opened by the Explore button
        #[serde(default)]
        datasource: Option<String>,
    },
}

#[derive(Debug, Deserialize, Clone)]
pub struct Render {
    #[serde(rename = "silenceButtons", default)]
    pub silence_buttons: bool,
    #[serde(rename = "mentionLabel", default = "default_mention_label")]
    pub mention_label: String,
    #[serde(rename = "slackDates", default = "default_slack_dates")]
    pub slack_dates: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Http {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_mention_label() -> String {
    DEFAULT_MENTION_LABEL.to_string()
}

fn default_slack_dates() -> bool {
    true
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for Slack {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            username: DEFAULT_USERNAME.to_string(),
        }
    }
}

impl Default for Render {
    fn default() -> Self {
        Self {
            silence_buttons: false,
            mention_label: default_mention_label(),
            slack_dates: default_slack_dates(),
        }
    }
}

impl Default for Http {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Config {
    /// Create a configuration posting to the given webhook, with defaults for everything else
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            slack: Slack {
                webhook_url: webhook_url.into(),
                ..Slack::default()
            },
            source: Source::default(),
            render: Render::default(),
            http: Http::default(),
        }
    }

    /// Set the display username of posted messages
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.slack.username = username.into();
        self
    }

    /// Set the alert source
    pub fn with_source(mut self, source: Source) -> Self {
        self.source = source;
        self
    }

    /// Enable or disable silence buttons on firing alerts
    pub fn with_silence_buttons(mut self, enabled: bool) -> Self {
        self.render.silence_buttons = enabled;
        self
    }

    /// Load configuration from a file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        tracing::info!("Loading config from file");

        let config = std::fs::read_to_string(path)?;
        Self::from_yaml(&config)
    }

    /// Parse configuration from a YAML document
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_norway::from_str(yaml)?)
    }

    /// Build the configuration from the command line, reading the config file if one is given
    pub fn from_args(args: &Args) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::new(String::new()),
        };

        config.apply_args(args);
        config.validate()?;

        Ok(config)
    }

    /// Command line flags take precedence over the config file
    fn apply_args(&mut self, args: &Args) {
        if let Some(webhook_url) = &args.webhook_url {
            self.slack.webhook_url = webhook_url.clone();
        }

        if let Some(username) = &args.username {
            self.slack.username = username.clone();
        }

        match args.mode {
            Some(Mode::Native) => self.source = Source::Native,
            Some(Mode::External) if self.source == Source::Native => {
                self.source = Source::External {
                    base_url: String::new(),
                    alertmanager: None,
                    datasource: None,
                };
            }
            _ => {}
        }

        if let Source::External {
            base_url,
            alertmanager,
            datasource,
        } = &mut self.source
        {
            if let Some(url) = &args.base_url {
                *base_url = url.clone();
            }

            if let Some(name) = &args.alertmanager {
                *alertmanager = Some(name.clone());
            }

            if let Some(name) = &args.datasource {
                *datasource = Some(name.clone());
            }
        }

        if args.enable_silence {
            self.render.silence_buttons = true;
        }

        if let Some(host) = &args.host {
            self.http.host = host.clone();
        }

        if let Some(port) = args.port {
            self.http.port = port;
        }
    }

    fn validate(&self) -> Result<()> {
        if self.slack.webhook_url.is_empty() {
            anyhow::bail!(
                "Slack webhook url is not configured, set slack.webhookUrl or --webhook-url"
            );
        }

        if let Source::External { base_url, .. } = &self.source {
            if base_url.is_empty() {
                anyhow::bail!(
                    "External mode requires a base url, set source.baseUrl or --base-url"
                );
            }
        }

        Ok(())
    }
}

impl Slack {
    /// Create a new Slack instance, resolving the webhook url from an environment
    /// variable if needed
    pub fn new(
        webhook_url: Option<String>,
        webhook_url_from: Option<String>,
        username: Option<String>,
    ) -> anyhow::Result<Self> {
        let webhook_url = match (webhook_url, webhook_url_from) {
            (Some(url), _) => url,
            (None, Some(var)) => std::env::var(&var)
                .map_err(|e| anyhow::anyhow!("Failed to read webhook url from '{}': {}", var, e))?,
            (None, None) => String::new(),
        };

        Ok(Self {
            webhook_url,
            username: username.unwrap_or_else(|| DEFAULT_USERNAME.to_string()),
        })
    }
}

impl<'de> Deserialize<'de> for Slack {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct SlackRaw {
            #[serde(rename = "webhookUrl")]
            webhook_url: Option<String>,
            #[serde(rename = "webhookUrlFrom")]
            webhook_url_from: Option<String>,
            username: Option<String>,
        }

        let raw = SlackRaw::deserialize(deserializer)?;
        Slack::new(raw.webhook_url, raw.webhook_url_from, raw.username)
            .map_err(serde::de::Error::custom)
    }
}

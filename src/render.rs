use crate::{
    config::Config,
    grafana::{Alert, AlertBatch},
    slack::{
        block::{Block, Text},
        message::WebhookMessage,
    },
};
use chrono::{DateTime, Utc};

pub mod buttons;
pub mod value;

/// Alerts per message, bounded by the Block Kit limit of 50 blocks
pub const ALERTS_PER_MESSAGE: usize = 7;
/// Block Kit allows at most 10 fields in a section
pub const FIELDS_PER_SECTION: usize = 10;

const FIRING_EMOJI: &str = "🆘";
const RESOLVED_EMOJI: &str = "🟢";

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// Render a notification into Slack messages. Alerts are grouped by status and
/// each group is split into messages of at most `ALERTS_PER_MESSAGE` alerts.
pub fn render(batch: &AlertBatch, channel: &str, config: &Config) -> Vec<WebhookMessage> {
    group_by_status(&batch.alerts)
        .into_iter()
        .flat_map(|(_, alerts)| {
            alerts
                .chunks(ALERTS_PER_MESSAGE)
                .map(|chunk| render_chunk(chunk, channel, config))
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Group alerts by status. Groups come in order of first appearance and keep
/// the batch order of their alerts.
pub fn group_by_status(alerts: &[Alert]) -> Vec<(&str, Vec<&Alert>)> {
    let mut groups: Vec<(&str, Vec<&Alert>)> = Vec::new();

    for alert in alerts {
        match groups.iter_mut().find(|(status, _)| *status == alert.status) {
            Some((_, group)) => group.push(alert),
            None => groups.push((alert.status.as_str(), vec![alert])),
        }
    }

    groups
}

fn render_chunk(alerts: &[&Alert], channel: &str, config: &Config) -> WebhookMessage {
    let mut fired = String::new();
    let mut resolved = String::new();
    let mut blocks = Vec::new();

    for (i, alert) in alerts.iter().enumerate() {
        let preview = if alert.is_resolved() {
            &mut resolved
        } else {
            &mut fired
        };
        preview.push_str(&format!("[{}] ", alert.summary()));

        if i != 0 {
            blocks.push(Block::Divider);
        }

        render_alert(alert, config, &mut blocks);
    }

    let text = if !fired.is_empty() {
        format!("Fired: {fired}")
    } else if !resolved.is_empty() {
        format!("Resolved: {resolved}")
    } else {
        String::new()
    };

    WebhookMessage {
        channel: channel.to_string(),
        username: config.slack.username.clone(),
        text,
        blocks,
    }
}

fn render_alert(alert: &Alert, config: &Config, blocks: &mut Vec<Block>) {
    let emoji = if alert.is_resolved() {
        RESOLVED_EMOJI
    } else {
        FIRING_EMOJI
    };
    blocks.push(Block::header(format!("{emoji} {}", alert.summary())));

    let description = alert.annotation("description");
    if !description.is_empty() {
        let quoted: String = description
            .lines()
            .map(|line| format!("> {line} \n"))
            .collect();
        blocks.push(Block::text_section(quoted));
    }

    blocks.extend(label_sections(alert, &config.render.mention_label));

    let id = label_hash(alert);
    blocks.push(Block::actions(
        format!("actions-{id}"),
        buttons::buttons(alert, config),
    ));
    blocks.push(Block::context(
        format!("context-{id}"),
        context_elements(alert, config.render.slack_dates),
    ));
}

fn label_sections(alert: &Alert, mention_label: &str) -> Vec<Block> {
    let fields: Vec<Text> = alert
        .sorted_labels()
        .into_iter()
        .map(|(name, value)| {
            if name == mention_label {
                Text::mrkdwn(format!("*{name}*:\n`@{value}`"))
            } else {
                Text::mrkdwn(format!("*{name}*:\n`{value}`"))
            }
        })
        .collect();

    fields
        .chunks(FIELDS_PER_SECTION)
        .map(|chunk| Block::fields_section(chunk.to_vec()))
        .collect()
}

fn context_elements(alert: &Alert, slack_dates: bool) -> Vec<Text> {
    let mut elements = Vec::new();

    if let Some(value_string) = alert.value_string.as_deref().filter(|s| !s.is_empty()) {
        elements.push(Text::plain(format!(
            "Value: {}",
            value::extract_value(value_string)
        )));
    }

    elements.push(timestamp("Started at", alert.starts_at, slack_dates));

    if let Some(ended_at) = alert.ended_at() {
        elements.push(timestamp("Ended at", ended_at, slack_dates));
    }

    elements
}

/// Slack renders `<!date^...>` in the reader's timezone, the RFC 822 text is the fallback
fn timestamp(label: &str, at: DateTime<Utc>, slack_dates: bool) -> Text {
    let fallback = at.format("%d %b %y %H:%M UTC").to_string();

    if slack_dates {
        Text::mrkdwn(format!(
            "{label}: <!date^{}^{{date_short_pretty}} {{time}}|{fallback}>",
            at.timestamp()
        ))
    } else {
        Text::plain(format!("{label}: {fallback}"))
    }
}

/// FNV-1a over the sorted label names and values, stable for a given label set
pub fn label_hash(alert: &Alert) -> u32 {
    alert
        .sorted_labels()
        .into_iter()
        .flat_map(|(name, value)| name.bytes().chain(value.bytes()))
        .fold(FNV_OFFSET_BASIS, |hash, byte| {
            (hash ^ u32::from(byte)).wrapping_mul(FNV_PRIME)
        })
}

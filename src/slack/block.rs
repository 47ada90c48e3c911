//! Block Kit layout blocks used in webhook messages

use serde::Serialize;

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Text {
    PlainText { text: String, emoji: bool },
    Mrkdwn { text: String },
}

impl Text {
    pub fn plain(text: impl Into<String>) -> Self {
        Text::PlainText {
            text: text.into(),
            emoji: true,
        }
    }

    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Text::Mrkdwn { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Text::PlainText { text, .. } | Text::Mrkdwn { text } => text,
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    Primary,
    Danger,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Button {
    pub action_id: String,
    pub text: Text,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
}

impl Button {
    pub fn new(
        action_id: impl Into<String>,
        text: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            action_id: action_id.into(),
            text: Text::plain(text),
            url: url.into(),
            style: None,
        }
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Element {
    Button(Button),
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Header {
        text: Text,
    },
    Section {
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<Text>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        fields: Vec<Text>,
    },
    Divider,
    Actions {
        block_id: String,
        elements: Vec<Element>,
    },
    Context {
        block_id: String,
        elements: Vec<Text>,
    },
}

impl Block {
    pub fn header(text: impl Into<String>) -> Self {
        Block::Header {
            text: Text::plain(text),
        }
    }

    pub fn text_section(text: impl Into<String>) -> Self {
        Block::Section {
            text: Some(Text::mrkdwn(text)),
            fields: Vec::new(),
        }
    }

    pub fn fields_section(fields: Vec<Text>) -> Self {
        Block::Section { text: None, fields }
    }

    pub fn actions(block_id: impl Into<String>, buttons: Vec<Button>) -> Self {
        Block::Actions {
            block_id: block_id.into(),
            elements: buttons.into_iter().map(Element::Button).collect(),
        }
    }

    pub fn context(block_id: impl Into<String>, elements: Vec<Text>) -> Self {
        Block::Context {
            block_id: block_id.into(),
            elements,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_block_kit_shapes() {
        let blocks = vec![
            Block::header("🆘 Disk full"),
            Block::Divider,
            Block::fields_section(vec![Text::mrkdwn("*job*:\n`api`")]),
            Block::actions(
                "actions-1",
                vec![
                    Button::new("generator", "Details", "https://example.com")
                        .with_style(Style::Primary),
                ],
            ),
        ];

        assert_eq!(
            serde_json::to_value(&blocks).unwrap(),
            json!([
                {
                    "type": "header",
                    "text": { "type": "plain_text", "text": "🆘 Disk full", "emoji": true }
                },
                { "type": "divider" },
                { "type": "section", "fields": [ { "type": "mrkdwn", "text": "*job*:\n`api`" } ] },
                {
                    "type": "actions",
                    "block_id": "actions-1",
                    "elements": [ {
                        "type": "button",
                        "action_id": "generator",
                        "text": { "type": "plain_text", "text": "Details", "emoji": true },
                        "url": "https://example.com",
                        "style": "primary"
                    } ]
                }
            ])
        );
    }

    #[test]
    fn default_style_is_omitted() {
        let value = serde_json::to_value(Button::new("runbook", "Runbook", "https://r")).unwrap();

        assert!(value.get("style").is_none());
    }
}

pub mod line;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::RelayResult;

/// An outbound message: plain text, or a flex card with an alt-text summary
/// for clients that cannot render cards.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Message {
    Text {
        text: String,
    },
    Flex {
        #[serde(rename = "altText")]
        alt_text: String,
        contents: FlexBubble,
    },
}

impl Message {
    pub fn text(text: impl Into<String>) -> Self {
        Message::Text { text: text.into() }
    }

    pub fn flex(alt_text: impl Into<String>, contents: FlexBubble) -> Self {
        Message::Flex {
            alt_text: alt_text.into(),
            contents,
        }
    }
}

/// Push capability of the messaging platform. One call delivers an ordered
/// list of messages to a single conversation.
#[async_trait]
pub trait PushClient: Send + Sync {
    async fn push(&self, to: &str, messages: &[Message]) -> RelayResult<()>;
}

// Flex message subset — only the component kinds the result card emits.
// Each struct carries its own `type` discriminator so the serialized tree
// matches the platform's wire format exactly.

#[derive(Debug, Clone, Serialize)]
pub struct FlexBubble {
    #[serde(rename = "type")]
    kind: &'static str,
    pub body: FlexBox,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<FlexBox>,
}

impl FlexBubble {
    pub fn new(body: FlexBox, footer: Option<FlexBox>) -> Self {
        Self {
            kind: "bubble",
            body,
            footer,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FlexBox {
    #[serde(rename = "type")]
    kind: &'static str,
    pub layout: &'static str,
    pub contents: Vec<FlexComponent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spacing: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<&'static str>,
}

impl FlexBox {
    pub fn vertical(contents: Vec<FlexComponent>) -> Self {
        Self {
            kind: "box",
            layout: "vertical",
            contents,
            spacing: None,
            margin: None,
        }
    }

    pub fn baseline(contents: Vec<FlexComponent>) -> Self {
        Self {
            kind: "box",
            layout: "baseline",
            contents,
            spacing: Some("sm"),
            margin: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum FlexComponent {
    Text(FlexText),
    Box(FlexBox),
    Button(FlexButton),
    Separator(FlexSeparator),
}

#[derive(Debug, Clone, Serialize)]
pub struct FlexText {
    #[serde(rename = "type")]
    kind: &'static str,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flex: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrap: Option<bool>,
}

impl FlexText {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            kind: "text",
            text: text.into(),
            weight: None,
            size: None,
            color: None,
            margin: None,
            flex: None,
            wrap: None,
        }
    }

    pub fn weight(mut self, weight: &'static str) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn size(mut self, size: &'static str) -> Self {
        self.size = Some(size);
        self
    }

    pub fn color(mut self, color: &'static str) -> Self {
        self.color = Some(color);
        self
    }

    pub fn margin(mut self, margin: &'static str) -> Self {
        self.margin = Some(margin);
        self
    }

    pub fn flex(mut self, flex: u32) -> Self {
        self.flex = Some(flex);
        self
    }

    pub fn wrap(mut self) -> Self {
        self.wrap = Some(true);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FlexButton {
    #[serde(rename = "type")]
    kind: &'static str,
    pub style: &'static str,
    pub height: &'static str,
    pub action: UriAction,
}

impl FlexButton {
    pub fn link(label: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            kind: "button",
            style: "link",
            height: "sm",
            action: UriAction {
                kind: "uri",
                label: label.into(),
                uri: uri.into(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UriAction {
    #[serde(rename = "type")]
    kind: &'static str,
    pub label: String,
    pub uri: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlexSeparator {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<&'static str>,
}

impl FlexSeparator {
    pub fn new(margin: Option<&'static str>) -> Self {
        Self {
            kind: "separator",
            margin,
        }
    }
}

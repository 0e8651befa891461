//! Block Kit types used for messages and modals.
//!
//! Only the block and element kinds the bots build are modelled. Messages
//! echoed back by Slack in interaction payloads go through [`MessageBlock`],
//! which keeps anything unrecognised as raw JSON so it can be sent back
//! untouched.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextKind {
    PlainText,
    Mrkdwn,
}

/// Composition text object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    #[serde(rename = "type")]
    pub kind: TextKind,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<bool>,
}

impl Text {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            kind: TextKind::PlainText,
            text: text.into(),
            emoji: None,
        }
    }

    /// Plain text with emoji shortcodes rendered
    pub fn plain_emoji(text: impl Into<String>) -> Self {
        Self {
            emoji: Some(true),
            ..Self::plain(text)
        }
    }

    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Self {
            kind: TextKind::Mrkdwn,
            text: text.into(),
            emoji: None,
        }
    }
}

/// Option object for selects and checkbox groups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub text: Text,
    pub value: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, text: Text) -> Self {
        Self {
            text,
            value: value.into(),
        }
    }
}

/// Interactive and input elements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Element {
    Button {
        action_id: String,
        text: Text,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },
    StaticSelect {
        action_id: String,
        placeholder: Text,
        options: Vec<SelectOption>,
    },
    MultiUsersSelect {
        action_id: String,
        placeholder: Text,
    },
    PlainTextInput {
        action_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<Text>,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        multiline: bool,
    },
    Checkboxes {
        action_id: String,
        options: Vec<SelectOption>,
    },
}

impl Element {
    pub fn button(action_id: &str, value: &str, text: Text) -> Self {
        Element::Button {
            action_id: action_id.to_string(),
            text,
            value: Some(value.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Context {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        block_id: Option<String>,
        elements: Vec<Text>,
    },
    Section {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        block_id: Option<String>,
        text: Text,
    },
    Actions {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        block_id: Option<String>,
        elements: Vec<Element>,
    },
    Divider {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        block_id: Option<String>,
    },
    Input {
        block_id: String,
        label: Text,
        element: Element,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        hint: Option<Text>,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        optional: bool,
    },
}

fn block_id(id: &str) -> Option<String> {
    (!id.is_empty()).then(|| id.to_string())
}

impl Block {
    pub fn context(id: &str, text: Text) -> Self {
        Block::Context {
            block_id: block_id(id),
            elements: vec![text],
        }
    }

    pub fn section(text: Text) -> Self {
        Block::Section {
            block_id: None,
            text,
        }
    }

    pub fn actions(id: &str, elements: Vec<Element>) -> Self {
        Block::Actions {
            block_id: block_id(id),
            elements,
        }
    }

    pub fn divider() -> Self {
        Block::Divider { block_id: None }
    }

    pub fn input(id: &str, label: Text, hint: Option<Text>, element: Element) -> Self {
        Block::Input {
            block_id: id.to_string(),
            label,
            element,
            hint,
            optional: false,
        }
    }

    /// Mark an input block optional; no-op for other blocks
    pub fn optional(mut self) -> Self {
        if let Block::Input { optional, .. } = &mut self {
            *optional = true;
        }
        self
    }

    pub fn block_id(&self) -> Option<&str> {
        match self {
            Block::Context { block_id, .. }
            | Block::Section { block_id, .. }
            | Block::Actions { block_id, .. }
            | Block::Divider { block_id } => block_id.as_deref(),
            Block::Input { block_id, .. } => Some(block_id),
        }
    }
}

/// A block from a message Slack sent back to us
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageBlock {
    Known(Block),
    Raw(serde_json::Value),
}

impl From<Block> for MessageBlock {
    fn from(block: Block) -> Self {
        MessageBlock::Known(block)
    }
}

/// Modal view for `views.open`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModalView {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub callback_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_metadata: Option<String>,
    pub title: Text,
    pub submit: Text,
    pub close: Text,
    pub blocks: Vec<Block>,
}

impl ModalView {
    pub fn new(callback_id: &str, title: &str, submit: &str, close: &str) -> Self {
        Self {
            kind: "modal",
            callback_id: callback_id.to_string(),
            private_metadata: None,
            title: Text::plain(title),
            submit: Text::plain(submit),
            close: Text::plain(close),
            blocks: Vec::new(),
        }
    }

    pub fn with_private_metadata(mut self, metadata: String) -> Self {
        self.private_metadata = Some(metadata);
        self
    }

    pub fn with_blocks(mut self, blocks: Vec<Block>) -> Self {
        self.blocks = blocks;
        self
    }
}

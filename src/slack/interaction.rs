//! Interactivity payloads (`payload=` form field)

use super::blocks::MessageBlock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InteractionPayload {
    ViewSubmission(ViewSubmission),
    BlockActions(BlockActions),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserRef {
    pub id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChannelRef {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct ViewSubmission {
    #[serde(default)]
    pub user: UserRef,
    pub view: SubmittedView,
}

#[derive(Debug, Deserialize)]
pub struct SubmittedView {
    #[serde(default)]
    pub callback_id: String,
    #[serde(default)]
    pub private_metadata: String,
    #[serde(default)]
    pub state: ViewState,
}

/// `view.state.values`: block id → action id → value
#[derive(Debug, Default, Deserialize)]
pub struct ViewState {
    #[serde(default)]
    pub values: HashMap<String, HashMap<String, StateValue>>,
}

impl ViewState {
    pub fn value(&self, block_id: &str, action_id: &str) -> Option<&StateValue> {
        self.values.get(block_id)?.get(action_id)
    }

    /// Text input value, empty when absent
    pub fn text(&self, block_id: &str, action_id: &str) -> &str {
        self.value(block_id, action_id)
            .and_then(|v| v.value.as_deref())
            .unwrap_or("")
    }

    /// Selected option of a static select, if any
    pub fn selected(&self, block_id: &str, action_id: &str) -> Option<&str> {
        self.value(block_id, action_id)
            .and_then(|v| v.selected_option.as_ref())
            .map(|o| o.value.as_str())
            .filter(|v| !v.is_empty())
    }

    pub fn selected_users(&self, block_id: &str, action_id: &str) -> &[String] {
        self.value(block_id, action_id)
            .map(|v| v.selected_users.as_slice())
            .unwrap_or(&[])
    }

    /// True if at least one checkbox is ticked
    pub fn is_checked(&self, block_id: &str, action_id: &str) -> bool {
        self.value(block_id, action_id)
            .is_some_and(|v| !v.selected_options.is_empty())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StateValue {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub selected_option: Option<SelectedOption>,
    #[serde(default)]
    pub selected_users: Vec<String>,
    #[serde(default)]
    pub selected_options: Vec<SelectedOption>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectedOption {
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct BlockActions {
    #[serde(default)]
    pub user: UserRef,
    #[serde(default)]
    pub trigger_id: String,
    #[serde(default)]
    pub channel: ChannelRef,
    #[serde(default)]
    pub message: InteractionMessage,
    #[serde(default)]
    pub actions: Vec<Action>,
}

#[derive(Debug, Default, Deserialize)]
pub struct InteractionMessage {
    #[serde(default)]
    pub ts: String,
    #[serde(default)]
    pub thread_ts: Option<String>,
    #[serde(default)]
    pub blocks: Vec<MessageBlock>,
}

impl InteractionMessage {
    /// Thread the message belongs to, or the message itself
    pub fn thread_root(&self) -> &str {
        self.thread_ts
            .as_deref()
            .filter(|ts| !ts.is_empty())
            .unwrap_or(&self.ts)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Action {
    pub action_id: String,
    #[serde(default)]
    pub value: Option<String>,
}

/// `response_action: errors` body for a view submission
#[derive(Debug, Serialize)]
pub struct ViewErrors {
    response_action: &'static str,
    errors: HashMap<String, String>,
}

impl ViewErrors {
    pub fn single(block_id: &str, message: &str) -> Self {
        Self {
            response_action: "errors",
            errors: HashMap::from([(block_id.to_string(), message.to_string())]),
        }
    }
}

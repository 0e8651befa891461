//! Slack plumbing shared by both bots.
//!
//! - [`api`] -- Web API client (`chat.postMessage`, `chat.update`, `views.open`)
//! - [`blocks`] -- Block Kit types
//! - [`events`] -- Events API envelopes
//! - [`interaction`] -- interactivity payloads and view responses

pub mod api;
pub mod blocks;
pub mod events;
pub mod interaction;

pub use api::{MessageContent, SlackApiError, SlackClient};

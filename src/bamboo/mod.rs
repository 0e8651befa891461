//! bamboo-forest: anonymous posting through a `/bamboo` slash command.
//!
//! The slash command opens a modal; the submitted message is posted by the
//! bot with only an optional nickname. Posted messages carry buttons for
//! anonymous thread replies, marking the post as handled, and anonymous
//! emoji reactions (counted in a Google Sheet).

pub mod handler;
pub mod reactions;
pub mod views;

pub use handler::{router, BambooApp};
pub use reactions::{Emoji, EmojiCounts, ReactionStore, SheetsReactionStore};

// Modal callback ids
pub const CALLBACK_NEW_POST: &str = "bamboo_new_post";
pub const CALLBACK_NEW_THREAD: &str = "bamboo_new_thread";

// Input block ids
pub const BLOCK_MESSAGE: &str = "message_block";
pub const BLOCK_NAME: &str = "name_block";
pub const BLOCK_MENTION: &str = "mention_block";
pub const BLOCK_CATEGORY: &str = "category_block";
pub const BLOCK_URGENCY: &str = "urgency_block";
pub const BLOCK_CONFIRM: &str = "confirm_block";

// Message block ids
pub const BLOCK_EMOJI_COUNTS: &str = "emoji_counts";
pub const BLOCK_EMOJI_ACTIONS: &str = "emoji_actions";

// Input action ids
pub const ACTION_MESSAGE: &str = "message_input";
pub const ACTION_NAME: &str = "name_input";
pub const ACTION_MENTION: &str = "mention_input";
pub const ACTION_CATEGORY: &str = "category_input";
pub const ACTION_URGENCY: &str = "urgency_input";
pub const ACTION_CONFIRM: &str = "confirm_checkbox";

// Button action ids
pub const ACTION_REPLY: &str = "bamboo_reply";
pub const ACTION_COMPLETE: &str = "bamboo_complete";
pub const ACTION_EMOJI_THUMBSUP: &str = "bamboo_emoji_thumbsup";
pub const ACTION_EMOJI_THUMBSDOWN: &str = "bamboo_emoji_thumbsdown";
pub const ACTION_EMOJI_HUG: &str = "bamboo_emoji_hug";
pub const ACTION_EMOJI_FLEX: &str = "bamboo_emoji_flex";

/// Name shown when the poster leaves the nickname empty
pub const DEFAULT_NICKNAME: &str = "익명";

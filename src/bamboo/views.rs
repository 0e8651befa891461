//! Modals and message blocks for anonymous posts.

use super::*;
use crate::slack::blocks::{Block, Element, MessageBlock, ModalView, SelectOption, Text};

const REPLY_BUTTON_TEXT: &str = "💬 익명 답글 달기";
const COMPLETE_BUTTON_TEXT: &str = "✅ 처리 완료";

const NOTICE: &str = "⚠️ *주의사항*\n\
    • 게시된 메시지는 수정하거나 삭제할 수 없습니다\n\
    • 타인을 비방하거나 불쾌감을 주는 내용은 삼가주세요";

const NICKNAME_HINT: &str = "비워두면 '익명'으로 표시됩니다";
const NICKNAME_PLACEHOLDER: &str = "예: 3년차 개발자, 신입사원 등";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Suggestion,
    Question,
    Praise,
    Concern,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Suggestion,
        Category::Question,
        Category::Praise,
        Category::Concern,
        Category::Other,
    ];

    pub fn from_value(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.value() == value)
    }

    pub fn value(self) -> &'static str {
        match self {
            Category::Suggestion => "suggestion",
            Category::Question => "question",
            Category::Praise => "praise",
            Category::Concern => "concern",
            Category::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Suggestion => "💡 건의사항",
            Category::Question => "❓ 질문",
            Category::Praise => "👏 칭찬",
            Category::Concern => "💭 고민",
            Category::Other => "📝 기타",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Urgency {
    Urgent,
    #[default]
    Normal,
    Low,
}

impl Urgency {
    pub const ALL: [Urgency; 3] = [Urgency::Urgent, Urgency::Normal, Urgency::Low];

    pub fn from_value(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|u| u.value() == value)
    }

    pub fn value(self) -> &'static str {
        match self {
            Urgency::Urgent => "urgent",
            Urgency::Normal => "normal",
            Urgency::Low => "low",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Urgency::Urgent => "🔴 긴급",
            Urgency::Normal => "🟡 보통",
            Urgency::Low => "🟢 여유",
        }
    }
}

/// What the poster filled in, common to posts and thread replies
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Submission {
    pub message: String,
    pub nickname: String,
    pub mentions: Vec<String>,
}

impl Submission {
    fn display_name(&self) -> &str {
        if self.nickname.is_empty() {
            DEFAULT_NICKNAME
        } else {
            &self.nickname
        }
    }

    /// Mentions on their own line followed by the message
    fn body(&self) -> String {
        if self.mentions.is_empty() {
            return self.message.clone();
        }
        let mentions: Vec<String> = self.mentions.iter().map(|u| format!("<@{}>", u)).collect();
        format!("{}\n\n{}", mentions.join(" "), self.message)
    }
}

fn options<T: Copy>(
    items: &[T],
    value: fn(T) -> &'static str,
    label: fn(T) -> &'static str,
) -> Vec<SelectOption> {
    items
        .iter()
        .map(|&item| SelectOption::new(value(item), Text::plain(label(item))))
        .collect()
}

fn message_input(label: &str, hint: &str, placeholder: &str) -> Block {
    Block::input(
        BLOCK_MESSAGE,
        Text::plain(label),
        Some(Text::plain(hint)),
        Element::PlainTextInput {
            action_id: ACTION_MESSAGE.to_string(),
            placeholder: Some(Text::plain(placeholder)),
            multiline: true,
        },
    )
}

fn nickname_input() -> Block {
    Block::input(
        BLOCK_NAME,
        Text::plain("닉네임 (선택사항)"),
        Some(Text::plain(NICKNAME_HINT)),
        Element::PlainTextInput {
            action_id: ACTION_NAME.to_string(),
            placeholder: Some(Text::plain(NICKNAME_PLACEHOLDER)),
            multiline: false,
        },
    )
    .optional()
}

fn mention_input() -> Block {
    Block::input(
        BLOCK_MENTION,
        Text::plain("멘션할 사람 (선택사항)"),
        Some(Text::plain("메시지에서 언급할 사람을 선택하세요")),
        Element::MultiUsersSelect {
            action_id: ACTION_MENTION.to_string(),
            placeholder: Text::plain("사람 선택..."),
        },
    )
    .optional()
}

fn confirm_input(text: &str) -> Block {
    Block::input(
        BLOCK_CONFIRM,
        Text::plain("확인"),
        None,
        Element::Checkboxes {
            action_id: ACTION_CONFIRM.to_string(),
            options: vec![SelectOption::new("confirmed", Text::mrkdwn(text))],
        },
    )
}

/// Modal opened by `/bamboo`
pub fn new_post_modal() -> ModalView {
    ModalView::new(CALLBACK_NEW_POST, "🎋 대나무숲", "게시하기", "취소").with_blocks(vec![
        Block::input(
            BLOCK_CATEGORY,
            Text::plain("카테고리"),
            Some(Text::plain("메시지 종류를 선택하세요")),
            Element::StaticSelect {
                action_id: ACTION_CATEGORY.to_string(),
                placeholder: Text::plain("카테고리 선택..."),
                options: options(&Category::ALL, Category::value, Category::label),
            },
        ),
        Block::input(
            BLOCK_URGENCY,
            Text::plain("긴급도 (선택사항)"),
            Some(Text::plain("기본값: 보통")),
            Element::StaticSelect {
                action_id: ACTION_URGENCY.to_string(),
                placeholder: Text::plain("긴급도 선택..."),
                options: options(&Urgency::ALL, Urgency::value, Urgency::label),
            },
        )
        .optional(),
        message_input(
            "익명 메시지",
            "하고 싶은 말을 적어주세요",
            "익명으로 전달하고 싶은 이야기를 적어주세요...",
        ),
        nickname_input(),
        mention_input(),
        Block::divider(),
        Block::section(Text::mrkdwn(NOTICE)),
        confirm_input("*위 내용을 확인했으며, 게시 후 수정/삭제가 불가능함을 이해합니다*"),
    ])
}

/// Modal for an anonymous reply; the target thread rides in private metadata
pub fn thread_modal(channel_id: &str, thread_ts: &str) -> ModalView {
    ModalView::new(CALLBACK_NEW_THREAD, "🎋 익명 답글", "답글 달기", "취소")
        .with_private_metadata(thread_metadata(channel_id, thread_ts))
        .with_blocks(vec![
            message_input(
                "익명 답글",
                "스레드에 익명으로 답글을 남깁니다",
                "익명으로 전달하고 싶은 답글을 적어주세요...",
            ),
            nickname_input(),
            mention_input(),
            Block::divider(),
            confirm_input("*게시 후 수정/삭제가 불가능함을 이해합니다*"),
        ])
}

pub fn thread_metadata(channel_id: &str, thread_ts: &str) -> String {
    format!("{}|{}", channel_id, thread_ts)
}

/// Split `"{channel}|{thread_ts}"`; anything else is rejected
pub fn parse_thread_metadata(metadata: &str) -> Option<(&str, &str)> {
    let (channel, thread_ts) = metadata.split_once('|')?;
    if channel.is_empty() || thread_ts.is_empty() || thread_ts.contains('|') {
        return None;
    }
    Some((channel, thread_ts))
}

fn reply_button() -> Element {
    Element::button(ACTION_REPLY, "reply", Text::plain(REPLY_BUTTON_TEXT))
}

pub fn format_emoji_counts(counts: &EmojiCounts) -> String {
    Emoji::ALL
        .iter()
        .map(|&e| format!("{} {}", e.symbol(), counts.get(e)))
        .collect::<Vec<_>>()
        .join(" │ ")
}

/// Blocks of a new anonymous post
pub fn new_post_blocks(submission: &Submission, category: Category, urgency: Urgency) -> Vec<Block> {
    let emoji_buttons = Emoji::ALL
        .iter()
        .map(|&e| Element::button(e.action_id(), e.value(), Text::plain_emoji(e.symbol())))
        .collect();

    vec![
        Block::context(
            "",
            Text::mrkdwn(format!(
                "🎋 *{}* │ {} │ {}",
                submission.display_name(),
                category.label(),
                urgency.label()
            )),
        ),
        Block::section(Text::mrkdwn(submission.body())),
        Block::context(
            BLOCK_EMOJI_COUNTS,
            Text::mrkdwn(format_emoji_counts(&EmojiCounts::default())),
        ),
        Block::actions(BLOCK_EMOJI_ACTIONS, emoji_buttons),
        Block::divider(),
        Block::actions(
            "",
            vec![
                reply_button(),
                Element::button(ACTION_COMPLETE, "complete", Text::plain(COMPLETE_BUTTON_TEXT)),
            ],
        ),
    ]
}

/// Blocks of an anonymous thread reply
pub fn thread_reply_blocks(submission: &Submission) -> Vec<Block> {
    vec![
        Block::context(
            "",
            Text::mrkdwn(format!("🎋 *{}*", submission.display_name())),
        ),
        Block::section(Text::mrkdwn(submission.body())),
        Block::divider(),
        Block::actions("", vec![reply_button()]),
    ]
}

/// Rewrite a post as handled by `user_id`.
///
/// The header gets a "처리됨" marker and the action row loses its complete
/// button. Reaction blocks and unrecognised blocks are kept as they are.
pub fn mark_completed(blocks: &[MessageBlock], user_id: &str) -> Vec<MessageBlock> {
    blocks
        .iter()
        .map(|block| match block {
            MessageBlock::Known(Block::Context { block_id, elements })
                if block_id.as_deref() != Some(BLOCK_EMOJI_COUNTS) =>
            {
                match elements.first() {
                    Some(header) => Block::context(
                        "",
                        Text::mrkdwn(format!("{} │ ✅ 처리됨 (<@{}>)", header.text, user_id)),
                    )
                    .into(),
                    None => block.clone(),
                }
            }
            MessageBlock::Known(Block::Actions { block_id, .. })
                if block_id.as_deref() != Some(BLOCK_EMOJI_ACTIONS) =>
            {
                Block::actions("", vec![reply_button()]).into()
            }
            _ => block.clone(),
        })
        .collect()
}

/// Replace the reaction count line with `counts`
pub fn with_emoji_counts(blocks: &[MessageBlock], counts: &EmojiCounts) -> Vec<MessageBlock> {
    blocks
        .iter()
        .map(|block| match block {
            MessageBlock::Known(Block::Context { block_id, .. })
                if block_id.as_deref() == Some(BLOCK_EMOJI_COUNTS) =>
            {
                Block::context(BLOCK_EMOJI_COUNTS, Text::mrkdwn(format_emoji_counts(counts))).into()
            }
            _ => block.clone(),
        })
        .collect()
}

//! Bot API request and response shapes (only the fields ctfpost uses).

use std::fmt;

use ctfpost_core::document::ChannelId;
use ctfpost_core::render::RenderedPost;
use serde::{Deserialize, Serialize};

/// A chat as the Bot API accepts it: numeric id or `@username`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ChatRef {
    Id(i64),
    Username(String),
}

impl ChatRef {
    /// Interpret user input. Numeric ids pass through, anything else is a
    /// username and gets an `@` prefix if it lacks one.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }
        if let Ok(id) = input.parse::<i64>() {
            return Some(ChatRef::Id(id));
        }
        let name = input.trim_start_matches('@');
        if name.is_empty() {
            return None;
        }
        Some(ChatRef::Username(format!("@{name}")))
    }
}

impl From<&ChannelId> for ChatRef {
    fn from(channel: &ChannelId) -> Self {
        ChatRef::parse(channel.as_str())
            .unwrap_or_else(|| ChatRef::Username(channel.as_str().to_string()))
    }
}

impl fmt::Display for ChatRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatRef::Id(id) => write!(f, "{id}"),
            ChatRef::Username(name) => f.write_str(name),
        }
    }
}

/// Envelope of every Bot API response.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub error_code: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: Option<ResponseParameters>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponseParameters {
    #[serde(default)]
    pub retry_after: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Message {
    pub message_id: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct User {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Chat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatMember {
    pub status: String,
    #[serde(default)]
    pub can_post_messages: Option<bool>,
}

impl ChatMember {
    /// Administrators may post unless the channel explicitly denies it.
    pub fn can_post(&self) -> bool {
        match self.status.as_str() {
            "creator" => true,
            "administrator" => self.can_post_messages.unwrap_or(true),
            _ => false,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct InlineKeyboardButton {
    pub text: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct LinkPreviewOptions {
    pub is_disabled: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct SendMessage {
    pub chat_id: ChatRef,
    pub text: String,
    pub parse_mode: &'static str,
    pub link_preview_options: LinkPreviewOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

#[derive(Debug, Serialize)]
pub(crate) struct EditMessageText {
    pub chat_id: ChatRef,
    pub message_id: i64,
    pub text: String,
    pub parse_mode: &'static str,
    pub link_preview_options: LinkPreviewOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GetChat {
    pub chat_id: ChatRef,
}

#[derive(Debug, Serialize)]
pub(crate) struct GetChatMember {
    pub chat_id: ChatRef,
    pub user_id: i64,
}

pub(crate) fn keyboard(post: &RenderedPost) -> Option<InlineKeyboardMarkup> {
    if post.buttons.is_empty() {
        return None;
    }
    Some(InlineKeyboardMarkup {
        inline_keyboard: vec![
            post.buttons
                .iter()
                .map(|b| InlineKeyboardButton {
                    text: b.label.clone(),
                    url: b.url.clone(),
                })
                .collect(),
        ],
    })
}

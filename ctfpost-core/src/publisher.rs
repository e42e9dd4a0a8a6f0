//! Channel publisher port.
//!
//! The engine only knows how to post a rendered event into a channel and how
//! to edit a message it posted earlier. Transports (Telegram, test fakes)
//! implement these traits.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::document::{ChannelId, MessageHandle};
use crate::render::RenderedPost;

/// Failure of a single post or edit.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PublishError {
    /// The message was deleted or is otherwise unreachable.
    #[error("message no longer exists")]
    MessageGone,

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("rejected: {0}")]
    Rejected(String),
}

impl PublishError {
    /// Only a gone message is permanent; everything else is retried next cycle.
    pub fn is_permanent(&self) -> bool {
        matches!(self, PublishError::MessageGone)
    }
}

#[async_trait]
pub trait ChannelPublisher: Send + Sync {
    /// Create a new message and return its handle.
    async fn post(
        &self,
        channel: &ChannelId,
        post: &RenderedPost,
    ) -> Result<MessageHandle, PublishError>;

    /// Replace the content of an existing message.
    async fn edit(
        &self,
        channel: &ChannelId,
        handle: MessageHandle,
        post: &RenderedPost,
    ) -> Result<(), PublishError>;
}

/// Lookup and capability checks consulted before a channel joins the registry.
#[async_trait]
pub trait ChannelDirectory: Send + Sync {
    /// Turn user input (`@name`, `name` or a numeric id) into a channel id.
    async fn resolve(&self, input: &str) -> Result<ChannelId, PublishError>;

    /// Whether the bot may post and edit messages in `channel`.
    async fn can_post(&self, channel: &ChannelId) -> Result<bool, PublishError>;
}

use std::time::Duration;

use async_trait::async_trait;
use ctfpost_core::config::AppConfig;
use ctfpost_core::document::{ChannelId, MessageHandle};
use ctfpost_core::publisher::{ChannelDirectory, ChannelPublisher, PublishError};
use ctfpost_core::render::RenderedPost;
use tokio::sync::OnceCell;

use crate::client::TelegramClient;
use crate::error::TelegramResult;
use crate::types::{ChatRef, EditMessageText, LinkPreviewOptions, SendMessage, keyboard};

const PARSE_MODE: &str = "HTML";

/// Publishes rendered events to Telegram channels.
pub struct TelegramPublisher {
    client: TelegramClient,
    bot_id: OnceCell<i64>,
}

impl TelegramPublisher {
    pub fn new(client: TelegramClient) -> Self {
        TelegramPublisher {
            client,
            bot_id: OnceCell::new(),
        }
    }

    pub fn from_config(config: &AppConfig) -> ctfpost_core::CoreResult<Self> {
        let token = config.require_bot_token()?;
        let client = TelegramClient::new(
            &config.telegram_api_url,
            token,
            Duration::from_secs(config.request_timeout_secs),
        )
        .map_err(|e| ctfpost_core::CoreError::Config(e.to_string()))?;
        Ok(Self::new(client))
    }

    async fn bot_id(&self) -> TelegramResult<i64> {
        self.bot_id
            .get_or_try_init(|| self.client.get_me())
            .await
            .copied()
    }
}

#[async_trait]
impl ChannelPublisher for TelegramPublisher {
    async fn post(
        &self,
        channel: &ChannelId,
        post: &RenderedPost,
    ) -> Result<MessageHandle, PublishError> {
        let body = SendMessage {
            chat_id: ChatRef::from(channel),
            text: post.text.clone(),
            parse_mode: PARSE_MODE,
            link_preview_options: LinkPreviewOptions {
                is_disabled: post.disable_preview,
            },
            reply_markup: keyboard(post),
        };

        let id = self.client.send_message(&body).await?;
        Ok(MessageHandle(id))
    }

    async fn edit(
        &self,
        channel: &ChannelId,
        handle: MessageHandle,
        post: &RenderedPost,
    ) -> Result<(), PublishError> {
        let body = EditMessageText {
            chat_id: ChatRef::from(channel),
            message_id: handle.0,
            text: post.text.clone(),
            parse_mode: PARSE_MODE,
            link_preview_options: LinkPreviewOptions {
                is_disabled: post.disable_preview,
            },
            reply_markup: keyboard(post),
        };

        match self.client.edit_message_text(&body).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_modified() => {
                tracing::debug!(%channel, %handle, "message already up to date");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl ChannelDirectory for TelegramPublisher {
    async fn resolve(&self, input: &str) -> Result<ChannelId, PublishError> {
        let chat = ChatRef::parse(input).ok_or_else(|| {
            PublishError::Rejected(format!("invalid channel reference: {input:?}"))
        })?;

        match chat {
            ChatRef::Id(id) => Ok(ChannelId::new(id.to_string())),
            username => {
                let id = self.client.get_chat(username).await?;
                Ok(ChannelId::new(id.to_string()))
            }
        }
    }

    async fn can_post(&self, channel: &ChannelId) -> Result<bool, PublishError> {
        let bot_id = self.bot_id().await?;
        let member = self
            .client
            .get_chat_member(ChatRef::from(channel), bot_id)
            .await?;
        Ok(member.can_post())
    }
}

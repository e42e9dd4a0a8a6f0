use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{TelegramError, TelegramResult};
use crate::types::{
    ApiResponse, Chat, ChatMember, ChatRef, EditMessageText, GetChat, GetChatMember, Message,
    SendMessage, User,
};

/// Thin JSON client for the Bot API.
#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl TelegramClient {
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> TelegramResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(ctfpost_core::constants::USER_AGENT)
            .build()?;

        Ok(TelegramClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> TelegramResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        tracing::debug!(method, "telegram request");

        // The API reports failures with a JSON envelope and a non-2xx status,
        // so decode the body regardless of status.
        let response = self
            .http
            .post(self.method_url(method))
            .json(body)
            .send()
            .await?;
        let status = response.status();
        let envelope: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| TelegramError::Decode(format!("{method} ({status}): {e}")))?;

        unwrap_envelope(method, envelope)
    }

    pub(crate) async fn send_message(&self, body: &SendMessage) -> TelegramResult<i64> {
        let message: Message = self.call("sendMessage", body).await?;
        Ok(message.message_id)
    }

    pub(crate) async fn edit_message_text(&self, body: &EditMessageText) -> TelegramResult<()> {
        // Result is either the edited Message or `true`; neither is needed.
        let _: serde_json::Value = self.call("editMessageText", body).await?;
        Ok(())
    }

    /// Numeric id of the bot account itself.
    pub async fn get_me(&self) -> TelegramResult<i64> {
        let me: User = self.call("getMe", &serde_json::json!({})).await?;
        Ok(me.id)
    }

    pub(crate) async fn get_chat(&self, chat: ChatRef) -> TelegramResult<i64> {
        let chat: Chat = self.call("getChat", &GetChat { chat_id: chat }).await?;
        Ok(chat.id)
    }

    pub(crate) async fn get_chat_member(
        &self,
        chat: ChatRef,
        user_id: i64,
    ) -> TelegramResult<ChatMember> {
        self.call(
            "getChatMember",
            &GetChatMember {
                chat_id: chat,
                user_id,
            },
        )
        .await
    }
}

fn unwrap_envelope<T>(method: &str, envelope: ApiResponse<T>) -> TelegramResult<T> {
    if envelope.ok {
        return envelope
            .result
            .ok_or_else(|| TelegramError::Decode(format!("{method}: ok response without result")));
    }

    Err(TelegramError::Api {
        code: envelope.error_code.unwrap_or_default(),
        description: envelope
            .description
            .unwrap_or_else(|| "no description".to_string()),
        retry_after: envelope.parameters.and_then(|p| p.retry_after),
    })
}

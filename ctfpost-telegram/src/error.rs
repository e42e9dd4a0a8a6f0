use std::time::Duration;

use ctfpost_core::publisher::PublishError;
use thiserror::Error;

/// Errors from talking to the Bot API.
#[derive(Error, Debug)]
pub enum TelegramError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Telegram API error {code}: {description}")]
    Api {
        code: i64,
        description: String,
        retry_after: Option<u64>,
    },

    #[error("Unexpected response: {0}")]
    Decode(String),
}

pub type TelegramResult<T> = Result<T, TelegramError>;

impl TelegramError {
    fn description_contains(&self, needle: &str) -> bool {
        match self {
            TelegramError::Api { description, .. } => description.to_lowercase().contains(needle),
            _ => false,
        }
    }

    /// The target message was deleted or never existed.
    pub fn is_message_gone(&self) -> bool {
        self.description_contains("message to edit not found")
            || self.description_contains("message not found")
    }

    /// Editing with identical content; the message already shows it.
    pub fn is_not_modified(&self) -> bool {
        self.description_contains("message is not modified")
    }
}

impl From<TelegramError> for PublishError {
    fn from(err: TelegramError) -> Self {
        if err.is_message_gone() {
            return PublishError::MessageGone;
        }

        match err {
            TelegramError::Api {
                code: 429,
                retry_after,
                ..
            } => PublishError::RateLimited {
                retry_after: retry_after.map(Duration::from_secs),
            },
            TelegramError::Api { code, description, .. } if code >= 500 => {
                PublishError::Transport(format!("{code}: {description}"))
            }
            TelegramError::Api { description, .. } => PublishError::Rejected(description),
            TelegramError::Http(e) => PublishError::Transport(e.to_string()),
            TelegramError::Decode(msg) => PublishError::Transport(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(code: i64, description: &str, retry_after: Option<u64>) -> TelegramError {
        TelegramError::Api {
            code,
            description: description.to_string(),
            retry_after,
        }
    }

    #[test]
    fn missing_message_is_gone() {
        let err = api(400, "Bad Request: message to edit not found", None);
        assert_eq!(PublishError::from(err), PublishError::MessageGone);
    }

    #[test]
    fn not_modified_is_recognized() {
        let err = api(
            400,
            "Bad Request: message is not modified: specified new message content and reply markup are exactly the same",
            None,
        );
        assert!(err.is_not_modified());
        assert!(!err.is_message_gone());
    }

    #[test]
    fn flood_control_is_rate_limited() {
        let err = api(429, "Too Many Requests: retry after 7", Some(7));
        assert_eq!(
            PublishError::from(err),
            PublishError::RateLimited {
                retry_after: Some(Duration::from_secs(7))
            }
        );
    }

    #[test]
    fn server_errors_are_transient() {
        let err = api(502, "Bad Gateway", None);
        assert!(matches!(PublishError::from(err), PublishError::Transport(_)));
    }

    #[test]
    fn other_api_errors_are_rejections_but_not_permanent() {
        let err = PublishError::from(api(
            403,
            "Forbidden: bot is not a member of the channel chat",
            None,
        ));
        assert!(matches!(err, PublishError::Rejected(_)));
        assert!(!err.is_permanent());
    }
}

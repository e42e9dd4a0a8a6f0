//! Telegram Bot API transport for ctfpost.
//!
//! Implements the core `ChannelPublisher` and `ChannelDirectory` ports on top
//! of `sendMessage`, `editMessageText`, `getChat` and `getChatMember`.

mod client;
mod error;
mod publisher;
mod types;

pub use client::TelegramClient;
pub use error::{TelegramError, TelegramResult};
pub use publisher::TelegramPublisher;
pub use types::ChatRef;

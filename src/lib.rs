//! tgsend — send messages to Telegram chats via a bot
//!
//! This library provides the two halves of the tool:
//! - Credential resolution from explicit arguments, `TGSEND_*` environment
//!   variables and layered INI config files
//! - A Bot API dispatcher for text messages, media uploads and stickers

pub mod config;
pub mod error;
pub mod message;
pub mod telegram;

// Re-export common types
pub use config::{resolve, resolve_with_search, Credentials, DEFAULT_SECTION};
pub use error::{Error, Result};
pub use message::{Level, MessageKind, MessageRequest, ParseMode};
pub use telegram::{BotInfo, Dispatch, Telegram, BOT_API_URL};

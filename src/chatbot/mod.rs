//! Chatbot module - relays Telegram updates to the model and back.

pub mod dispatcher;
pub mod message;
pub mod telegram;
pub mod templates;
pub mod update;


pub use dispatcher::{Dispatcher, send_chunked};
pub use message::{InlineButton, InlineKeyboard, MAX_MESSAGE_LEN, OutboundMessage};
pub use telegram::{ChatAction, ChatApi, TelegramClient};
pub use update::{DecodeError, Update};

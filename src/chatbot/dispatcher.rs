//! Update dispatcher: one inbound update in, a handful of Bot API calls out.

use std::sync::Arc;

use tracing::{info, warn};

use crate::ai::{InferenceBackend, Message};
use crate::chatbot::message::{FormatMode, MAX_MESSAGE_LEN, OutboundMessage};
use crate::chatbot::telegram::{ChatAction, ChatApi};
use crate::chatbot::templates::{self, CallbackAction, Command};
use crate::chatbot::update::{IncomingCallback, IncomingMessage, Update};

/// Stateless; clone freely across requests.
#[derive(Clone)]
pub struct Dispatcher {
    chat: Arc<dyn ChatApi>,
    backend: Arc<dyn InferenceBackend>,
    max_message_len: usize,
}

impl Dispatcher {
    pub fn new(chat: Arc<dyn ChatApi>, backend: Arc<dyn InferenceBackend>) -> Self {
        Self { chat, backend, max_message_len: MAX_MESSAGE_LEN }
    }

    /// Override the chunk size. Mostly useful in tests.
    pub fn with_max_message_len(mut self, len: usize) -> Self {
        self.max_message_len = len.max(1);
        self
    }

    /// Handle one update. Never fails: outbound errors are logged and dropped.
    pub async fn handle(&self, update: Update) {
        match update {
            Update::Message(msg) => self.handle_message(msg).await,
            Update::CallbackQuery(cb) => self.handle_callback(cb).await,
            Update::Unsupported => {}
        }
    }

    async fn handle_message(&self, msg: IncomingMessage) {
        let text = msg.text.as_deref().unwrap_or("");
        let preview: String = text.chars().take(100).collect();
        info!("Message in chat {}: \"{}\"", msg.chat_id, preview);

        if let Some(command) = Command::parse(text) {
            self.handle_command(command, &msg).await;
            return;
        }

        if text.is_empty() {
            return;
        }

        self.answer_with_model(msg.chat_id, text).await;
    }

    async fn handle_command(&self, command: Command, msg: &IncomingMessage) {
        let chat_id = msg.chat_id;
        let reply = match command {
            Command::Start => OutboundMessage::new(chat_id, templates::welcome_text(msg.sender_name.as_deref()))
                .keyboard(templates::welcome_keyboard()),
            Command::Help => OutboundMessage::new(chat_id, templates::HELP_TEXT)
                .format(FormatMode::Markdown)
                .keyboard(templates::help_keyboard()),
            Command::About => OutboundMessage::new(chat_id, templates::ABOUT_TEXT).format(FormatMode::Markdown),
            Command::Unknown => OutboundMessage::new(chat_id, templates::UNKNOWN_COMMAND_TEXT),
        };

        self.send(reply).await;
    }

    async fn answer_with_model(&self, chat_id: i64, text: &str) {
        // Best effort; the reply goes out whether or not this lands.
        let _ = self.chat.send_chat_action(chat_id, ChatAction::Typing).await;

        let turns = [Message::system(templates::SYSTEM_PROMPT), Message::user(text)];

        let reply = match self.backend.complete(&turns).await {
            Ok(answer) => {
                info!("Model answered chat {} ({} chars)", chat_id, answer.chars().count());
                OutboundMessage::new(chat_id, answer).keyboard(templates::follow_up_keyboard())
            }
            Err(e) => {
                warn!("Inference failed for chat {}: {e}", chat_id);
                OutboundMessage::new(chat_id, templates::APOLOGY_TEXT)
            }
        };

        self.send(reply).await;
    }

    async fn handle_callback(&self, cb: IncomingCallback) {
        info!("Callback {} with data {:?}", cb.id, cb.data);

        // Clears the spinner on the user's button; the outcome doesn't change anything below.
        let _ = self.chat.answer_callback_query(&cb.id).await;

        let Some(action) = cb.data.as_deref().and_then(CallbackAction::parse) else {
            return;
        };
        let Some(origin) = cb.origin else {
            return;
        };

        let chat_id = origin.chat_id;
        let reply = match action {
            CallbackAction::Examples => OutboundMessage::new(chat_id, templates::EXAMPLES_TEXT).format(FormatMode::Markdown),
            CallbackAction::About => OutboundMessage::new(chat_id, templates::ABOUT_TEXT).format(FormatMode::Markdown),
            CallbackAction::Help => OutboundMessage::new(chat_id, templates::HELP_TEXT)
                .format(FormatMode::Markdown)
                .keyboard(templates::help_keyboard()),
            CallbackAction::AskAgain => OutboundMessage::new(chat_id, templates::ASK_AGAIN_TEXT),
        };

        self.send(reply).await;
    }

    async fn send(&self, message: OutboundMessage) {
        send_chunked(self.chat.as_ref(), message, self.max_message_len).await;
    }
}

/// Send `message` in order as one or more Bot API messages of at most `limit`
/// UTF-16 units.
///
/// Each part is awaited before the next goes out. A failed part is logged and
/// the rest are still attempted.
pub async fn send_chunked(chat: &dyn ChatApi, message: OutboundMessage, limit: usize) {
    let chat_id = message.chat_id;
    for (i, part) in message.into_chunks(limit).iter().enumerate() {
        if let Err(e) = chat.send_message(part).await {
            warn!("Chunk {} to chat {} not delivered: {e}", i, chat_id);
        }
    }
}

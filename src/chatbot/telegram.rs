//! Telegram client using teloxide.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{
    BotCommand, CallbackQueryId, InlineKeyboardButton, InlineKeyboardMarkup, ParseMode,
};
use tracing::{debug, info, warn};

use crate::chatbot::message::{FormatMode, InlineKeyboard, OutboundMessage};

/// Transient status shown in the chat header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatAction {
    Typing,
}

/// The three Bot API calls the dispatcher makes.
///
/// Failures come back as a formatted message; callers decide whether they care.
#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn send_message(&self, message: &OutboundMessage) -> Result<(), String>;
    async fn send_chat_action(&self, chat_id: i64, action: ChatAction) -> Result<(), String>;
    async fn answer_callback_query(&self, callback_id: &str) -> Result<(), String>;
}

/// Telegram API client.
pub struct TelegramClient {
    bot: Bot,
}

impl TelegramClient {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    /// Point Telegram at `url` for updates.
    pub async fn set_webhook(&self, url: reqwest::Url) -> Result<(), String> {
        info!("Registering webhook {}", url);
        self.bot.set_webhook(url).await.map(|_| ()).map_err(|e| {
            let msg = format!("Failed to set webhook: {e}");
            warn!("{}", msg);
            msg
        })
    }

    /// Publish the `/` command menu.
    pub async fn set_commands(&self, commands: &[(&str, &str)]) -> Result<(), String> {
        let commands: Vec<BotCommand> = commands
            .iter()
            .map(|(name, description)| BotCommand::new(*name, *description))
            .collect();

        self.bot.set_my_commands(commands).await.map(|_| ()).map_err(|e| {
            let msg = format!("Failed to set commands: {e}");
            warn!("{}", msg);
            msg
        })
    }
}

fn parse_mode(format: FormatMode) -> ParseMode {
    match format {
        #[allow(deprecated)]
        FormatMode::Markdown => ParseMode::Markdown,
    }
}

fn markup(keyboard: &InlineKeyboard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(keyboard.rows.iter().map(|row| {
        row.iter()
            .map(|b| InlineKeyboardButton::callback(b.label.clone(), b.callback_data.clone()))
            .collect::<Vec<_>>()
    }))
}

#[async_trait]
impl ChatApi for TelegramClient {
    async fn send_message(&self, message: &OutboundMessage) -> Result<(), String> {
        debug!("Sending {} chars to chat {}", message.text.chars().count(), message.chat_id);

        let mut request = self.bot.send_message(ChatId(message.chat_id), message.text.clone());

        if let Some(format) = message.format {
            request = request.parse_mode(parse_mode(format));
        }

        if let Some(ref keyboard) = message.keyboard {
            request = request.reply_markup(markup(keyboard));
        }

        request.await.map(|_| ()).map_err(|e| {
            let msg = format!("Failed to send: {e}");
            warn!("{}", msg);
            msg
        })
    }

    async fn send_chat_action(&self, chat_id: i64, action: ChatAction) -> Result<(), String> {
        let action = match action {
            ChatAction::Typing => teloxide::types::ChatAction::Typing,
        };

        self.bot
            .send_chat_action(ChatId(chat_id), action)
            .await
            .map(|_| ())
            .map_err(|e| {
                let msg = format!("Failed to send chat action: {e}");
                warn!("{}", msg);
                msg
            })
    }

    async fn answer_callback_query(&self, callback_id: &str) -> Result<(), String> {
        self.bot
            .answer_callback_query(CallbackQueryId(callback_id.to_string()))
            .await
            .map(|_| ())
            .map_err(|e| {
                let msg = format!("Failed to answer callback query: {e}");
                warn!("{}", msg);
                msg
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chatbot::message::InlineButton;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_with_server() -> (TelegramClient, MockServer) {
        let server = MockServer::start().await;
        let bot = Bot::new("123456:TESTTOKEN").set_api_url(server.uri().parse().unwrap());
        (TelegramClient::new(bot), server)
    }

    async fn last_body(server: &MockServer) -> (String, serde_json::Value) {
        let requests = server.received_requests().await.unwrap();
        let req = requests.last().expect("no request received");
        let method = req.url.path().rsplit('/').next().unwrap().to_lowercase();
        (method, serde_json::from_slice(&req.body).unwrap())
    }

    #[tokio::test]
    async fn test_send_message_body() {
        let (client, server) = client_with_server().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "result": {
                    "message_id": 1,
                    "date": 1700000000,
                    "chat": {"id": 42, "type": "private", "first_name": "A"},
                    "text": "hi"
                }
            })))
            .mount(&server)
            .await;

        let msg = OutboundMessage::new(42, "hi")
            .format(FormatMode::Markdown)
            .keyboard(InlineKeyboard::new(vec![vec![InlineButton::callback("Go", "examples")]]));

        // The result parse may or may not succeed; only the wire format matters here.
        let _ = client.send_message(&msg).await;

        let (method, body) = last_body(&server).await;
        assert_eq!(method, "sendmessage");
        assert_eq!(body["chat_id"], 42);
        assert_eq!(body["text"], "hi");
        assert_eq!(body["parse_mode"], "Markdown");
        assert_eq!(
            body["reply_markup"]["inline_keyboard"][0][0],
            serde_json::json!({"text": "Go", "callback_data": "examples"})
        );
    }

    #[tokio::test]
    async fn test_plain_message_omits_options() {
        let (client, server) = client_with_server().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "ok": false,
                "error_code": 400,
                "description": "Bad Request: chat not found"
            })))
            .mount(&server)
            .await;

        let result = client.send_message(&OutboundMessage::new(7, "plain")).await;
        assert!(result.is_err());

        let (_, body) = last_body(&server).await;
        assert!(body.get("parse_mode").is_none());
        assert!(body.get("reply_markup").is_none());
    }

    #[tokio::test]
    async fn test_chat_action_and_callback_answer() {
        let (client, server) = client_with_server().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "result": true
            })))
            .mount(&server)
            .await;

        assert!(client.send_chat_action(42, ChatAction::Typing).await.is_ok());
        let (method, body) = last_body(&server).await;
        assert_eq!(method, "sendchataction");
        assert_eq!(body["action"], "typing");

        assert!(client.answer_callback_query("cb-9").await.is_ok());
        let (method, body) = last_body(&server).await;
        assert_eq!(method, "answercallbackquery");
        assert_eq!(body["callback_query_id"], "cb-9");
    }

    #[tokio::test]
    async fn test_chat_action_failure_is_reported() {
        let (client, server) = client_with_server().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "ok": false,
                "error_code": 403,
                "description": "Forbidden: bot was blocked by the user"
            })))
            .mount(&server)
            .await;

        let err = client.send_chat_action(42, ChatAction::Typing).await.unwrap_err();
        assert!(err.starts_with("Failed to send chat action"));
    }
}

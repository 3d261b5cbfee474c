//! Static replies, keyboards and the command/callback vocabulary.

use crate::chatbot::message::{InlineButton, InlineKeyboard};

/// Persona instruction sent as the system turn of every completion.
pub const SYSTEM_PROMPT: &str = "You are a friendly and knowledgeable AI assistant living inside a \
Telegram chat. Answer clearly and concisely, prefer short paragraphs and lists, and say so \
honestly when you don't know something. Reply in the same language the user writes in.";

pub const HELP_TEXT: &str = "*How to use me*\n\n\
Just send me any question or message and I'll answer it with AI.\n\n\
*Commands*\n\
/start - show the welcome message\n\
/help - show this help\n\
/about - about this bot\n\n\
Tip: the more specific your question, the better the answer.";

pub const ABOUT_TEXT: &str = "*About*\n\n\
I relay your messages to a hosted language model and send back its answer.\n\
I don't keep any history: every message is answered on its own.";

pub const EXAMPLES_TEXT: &str = "*Things you can ask*\n\n\
- Explain how HTTPS works in simple terms\n\
- Write a haiku about the sea\n\
- Give me three ideas for a weekend project\n\
- Translate \"good morning\" into Japanese\n\
- Summarize the plot of Hamlet";

pub const ASK_AGAIN_TEXT: &str = "Sure, send me your next question.";

pub const UNKNOWN_COMMAND_TEXT: &str = "Sorry, I don't know that command. Send /help to see what I can do.";

pub const APOLOGY_TEXT: &str = "Sorry, I couldn't come up with an answer right now. Please try again in a moment.";

/// Body of `GET` responses.
pub const LIVENESS_TEXT: &str = "relaybot is running";

pub fn welcome_text(name: Option<&str>) -> String {
    let name = name.map(str::trim).filter(|n| !n.is_empty()).unwrap_or("there");
    format!(
        "Hi {name}!\n\n\
I'm an AI assistant. Send me any question and I'll do my best to answer it.\n\n\
Use the buttons below to see some examples or learn more."
    )
}

/// Bot commands, matched on the lowercased first token of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    About,
    Unknown,
}

impl Command {
    /// All recognised commands with their menu descriptions.
    pub const MENU: &'static [(&'static str, &'static str)] = &[
        ("start", "Show the welcome message"),
        ("help", "How to use this bot"),
        ("about", "About this bot"),
    ];

    /// Parse the leading token of `text`. `None` if the text isn't a command.
    pub fn parse(text: &str) -> Option<Self> {
        if !text.starts_with('/') {
            return None;
        }
        let token = text.split_whitespace().next().unwrap_or("/").to_lowercase();
        // `/help@some_bot` in group chats
        let name = token.split('@').next().unwrap_or_default();

        Some(match name {
            "/start" => Command::Start,
            "/help" => Command::Help,
            "/about" => Command::About,
            _ => Command::Unknown,
        })
    }
}

/// Payloads carried by the inline buttons this bot sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    Examples,
    About,
    Help,
    AskAgain,
}

impl CallbackAction {
    pub fn parse(data: &str) -> Option<Self> {
        match data {
            "examples" => Some(Self::Examples),
            "about" => Some(Self::About),
            "help" => Some(Self::Help),
            "ask_again" => Some(Self::AskAgain),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Examples => "examples",
            Self::About => "about",
            Self::Help => "help",
            Self::AskAgain => "ask_again",
        }
    }

    fn button(self, label: &str) -> InlineButton {
        InlineButton::callback(label, self.as_str())
    }
}

pub fn welcome_keyboard() -> InlineKeyboard {
    InlineKeyboard::new(vec![
        vec![CallbackAction::Examples.button("💡 Examples")],
        vec![
            CallbackAction::Help.button("❓ Help"),
            CallbackAction::About.button("ℹ️ About"),
        ],
    ])
}

pub fn help_keyboard() -> InlineKeyboard {
    InlineKeyboard::new(vec![vec![CallbackAction::Examples.button("💡 Examples")]])
}

/// Attached to every model answer.
pub fn follow_up_keyboard() -> InlineKeyboard {
    InlineKeyboard::new(vec![vec![
        CallbackAction::AskAgain.button("🔁 Ask another"),
        CallbackAction::Examples.button("💡 Examples"),
    ]])
}

//! # relaybot
//!
//! Telegram webhook that answers free-text messages with a Workers AI model
//! and handles a few static commands and inline buttons.

pub mod ai;
pub mod chatbot;
pub mod config;
pub mod server;

//! Register the bot's webhook and publish its command menu.
//!
//! Usage: cargo run --bin register_webhook <public_url>
//!
//! Reads TELEGRAM_BOT_TOKEN (and optionally TELEGRAM_API_URL) from the
//! environment or a .env file, the same way the server does.

use teloxide::Bot;

use relaybot::chatbot::TelegramClient;
use relaybot::chatbot::templates::Command;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <public_url>", args[0]);
        eprintln!();
        eprintln!("Tell Telegram to deliver updates to <public_url> and set the / command menu.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  public_url  HTTPS address the server is reachable at (e.g. https://bot.example.com/)");
        std::process::exit(1);
    }

    let url = match reqwest::Url::parse(&args[1]) {
        Ok(url) if url.scheme() == "https" => url,
        Ok(_) => {
            eprintln!("ERROR: Telegram only delivers webhooks over HTTPS.");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("ERROR: Invalid URL '{}': {}", args[1], e);
            std::process::exit(1);
        }
    };

    let token = match std::env::var("TELEGRAM_BOT_TOKEN") {
        Ok(token) if !token.trim().is_empty() => token,
        _ => {
            eprintln!("ERROR: TELEGRAM_BOT_TOKEN must be set");
            std::process::exit(1);
        }
    };

    let mut bot = Bot::new(token.trim());
    if let Ok(api_url) = std::env::var("TELEGRAM_API_URL") {
        match reqwest::Url::parse(&api_url) {
            Ok(api_url) => bot = bot.set_api_url(api_url),
            Err(e) => {
                eprintln!("ERROR: Invalid TELEGRAM_API_URL: {}", e);
                std::process::exit(1);
            }
        }
    }
    let client = TelegramClient::new(bot);

    println!("Setting webhook to {}...", url);
    if let Err(e) = client.set_webhook(url).await {
        eprintln!("ERROR: {}", e);
        std::process::exit(1);
    }

    println!("Publishing {} commands...", Command::MENU.len());
    if let Err(e) = client.set_commands(Command::MENU).await {
        eprintln!("ERROR: {}", e);
        std::process::exit(1);
    }

    println!("Done.");
}

use std::sync::Arc;

use teloxide::Bot;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;

use relaybot::ai::Client as AiClient;
use relaybot::chatbot::{Dispatcher, TelegramClient};
use relaybot::config::Config;
use relaybot::server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env is normal in production
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    // Setup logging; the guard must outlive the server so the file writer flushes.
    let _guard = init_logging(&config)?;

    info!("🚀 Starting relaybot...");
    info!("Loaded config: {:?}", config);

    let mut bot = Bot::new(&config.telegram_bot_token);
    if let Some(ref url) = config.telegram_api_url {
        bot = bot.set_api_url(url.clone());
    }
    let telegram = Arc::new(TelegramClient::new(bot));

    let ai = AiClient::new(
        &config.ai_api_url,
        &config.cf_account_id,
        config.cf_api_token.clone(),
        config.ai_model.clone(),
        config.ai_timeout,
    )?;
    info!("Using model {}", ai.model());

    let dispatcher = Dispatcher::new(telegram, Arc::new(ai));
    let app = server::router(dispatcher);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    info!("Shut down");
    Ok(())
}

fn init_logging(
    config: &Config,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>, std::io::Error> {
    let stdout_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stdout).with_filter(
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
    );

    let Some(ref log_dir) = config.log_dir else {
        tracing_subscriber::registry().with(stdout_layer).init();
        return Ok(None);
    };

    std::fs::create_dir_all(log_dir)?;
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("relaybot.log"))?;
    let (non_blocking, guard) = tracing_appender::non_blocking(log_file);

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .init();

    Ok(Some(guard))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

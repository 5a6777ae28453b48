use std::sync::Arc;

use anyhow::Context;
use secrecy::ExposeSecret;
use teloxide::Bot;
use tracing_subscriber::EnvFilter;

use quizsmith::config::Config;
use quizsmith::extraction::openai::OpenAiExtractor;
use quizsmith::intake::IntakeHandler;
use quizsmith::session::SessionStore;
use quizsmith::telegram::{self, TelegramTransport};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().context("failed to load configuration")?;

    let bot = Bot::new(config.telegram.bot_token.expose_secret());
    let transport = Arc::new(TelegramTransport::new(bot.clone()));
    let provider = Arc::new(
        OpenAiExtractor::new(&config.extraction)
            .context("failed to build extraction provider")?,
    );
    let intake = Arc::new(IntakeHandler::new(
        Arc::new(SessionStore::new()),
        transport,
        provider,
    ));

    if let Some(admin) = config.admin_chat_id {
        intake.announce(admin, "quizsmith is online.").await;
    }

    tracing::info!(model = %config.extraction.model, "starting telegram dispatcher");
    telegram::run(bot, intake).await;

    Ok(())
}

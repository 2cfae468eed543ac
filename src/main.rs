use std::sync::Arc;

use car_import_bot::channels::{Channel, CliChannel, TelegramChannel};
use car_import_bot::config::Config;
use car_import_bot::dialog::DialogEngine;
use car_import_bot::rates::RateProvider;
use car_import_bot::store::{Database, LibSqlBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = Config::from_env()?;

    eprintln!("🚗 Car Import Bot v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Database: {}", config.db_path.display());

    let db: Arc<dyn Database> = Arc::new(LibSqlBackend::new_local(&config.db_path).await?);
    let rates = RateProvider::new(Arc::clone(&db), config.default_rates);

    let channel: Arc<dyn Channel> = match &config.bot_token {
        Some(token) => {
            eprintln!("   Channel: telegram (long polling)");
            Arc::new(TelegramChannel::new(token.clone()))
        }
        None => {
            eprintln!("   Channel: cli (set BOT_TOKEN for Telegram)");
            eprintln!("   Type a message, or a button tag to tap it.\n");
            Arc::new(CliChannel::new())
        }
    };

    channel.health_check().await?;

    match &config.admin_chat_id {
        Some(chat) => eprintln!("   Lead notifications: chat {chat}"),
        None => eprintln!("   Lead notifications: disabled (ADMIN_CHAT_ID not set)"),
    }

    let engine = Arc::new(DialogEngine::new(
        rates,
        db,
        config.links.clone(),
        config.admin_chat_id.clone(),
        Some(Arc::clone(&channel)),
    ));

    car_import_bot::bot::run(channel, engine).await?;
    Ok(())
}

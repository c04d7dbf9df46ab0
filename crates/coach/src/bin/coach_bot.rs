use std::sync::Arc;

use coach::{CoachConfig, Conversation, PendingReminders, Scheduler, SessionStore, TelegramSender, UpdateProcessor};
use database::Database;
use telegram_client::{BotConfig, TelegramClient};
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "coach=info,database=info,telegram_client=info";

/// Make sure the directory for a file-backed database exists.
fn ensure_database_dir(database_url: &str) -> std::io::Result<()> {
    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:");
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() || path.starts_with(':') {
        return Ok(());
    }
    match std::path::Path::new(path).parent() {
        Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir),
        _ => Ok(()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = CoachConfig::from_env()?;
    info!("Loaded config: {:?}", config);

    ensure_database_dir(&config.database_url)?;
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    let mut bot_config = BotConfig::new(config.bot_token.clone()).with_poll_timeout(config.poll_timeout);
    if let Some(api_url) = &config.api_url {
        bot_config = bot_config.with_api_url(api_url.clone());
    }
    let client = TelegramClient::connect(bot_config).await?;

    let sender = Arc::new(TelegramSender::new(client.clone()));
    let pending = Arc::new(PendingReminders::new());
    let sessions = Arc::new(SessionStore::new());

    let conversation = Arc::new(
        Conversation::new(db.clone(), sender.clone(), config.admin_chat_id)
            .with_sessions(sessions)
            .with_pending(pending.clone())
            .with_history_days(config.history_days),
    );

    let scheduler = Scheduler::new(db.clone(), sender, pending)
        .with_tick_interval(config.tick_interval)
        .with_follow_up_after(config.follow_up_after);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler_task = tokio::spawn(async move { scheduler.run(shutdown_rx).await });

    let processor = UpdateProcessor::new(client, conversation);
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };
    let result = processor.run_with_shutdown(shutdown).await;

    let _ = shutdown_tx.send(true);
    if let Err(e) = scheduler_task.await {
        warn!("Scheduler task failed: {}", e);
    }
    db.close().await;
    info!("Coach bot stopped");

    result?;
    Ok(())
}

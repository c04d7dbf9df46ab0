//! Update loop connecting the Telegram client to the conversation handler.

use std::sync::Arc;

use futures::StreamExt;
use telegram_client::{TelegramClient, Update};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::conversation::Conversation;
use crate::telegram::{event_from_update, TelegramSender};

/// Errors that stop the update loop.
#[derive(Debug, Error)]
pub enum ProcessorError {
    /// The update stream ended unexpectedly.
    #[error("update stream ended")]
    StreamEnded,
}

/// Consumes updates and feeds them to the state machine one at a time.
pub struct UpdateProcessor {
    client: TelegramClient,
    conversation: Arc<Conversation<TelegramSender>>,
}

impl UpdateProcessor {
    pub fn new(client: TelegramClient, conversation: Arc<Conversation<TelegramSender>>) -> Self {
        Self {
            client,
            conversation,
        }
    }

    /// Handle a single update. Handler errors are logged, never returned.
    pub async fn process_update(&self, update: &Update) {
        if let Some(query) = &update.callback_query {
            if let Err(e) = self.client.answer_callback_query(&query.id, None).await {
                debug!("Failed to answer callback {}: {}", query.id, e);
            }
        }

        let Some(event) = event_from_update(update) else {
            debug!("Skipping update {}", update.update_id);
            return;
        };

        if let Err(e) = self.conversation.handle(&event).await {
            warn!("Error handling update {} from chat {}: {}", update.update_id, event.chat_id, e);
        }
    }

    /// Run until the shutdown signal completes.
    ///
    /// An update being handled when the signal fires is finished first.
    pub async fn run_with_shutdown<F>(self, shutdown_signal: F) -> Result<(), ProcessorError>
    where
        F: std::future::Future<Output = ()> + Send,
    {
        info!("Starting update processor (graceful shutdown enabled)");

        let mut stream = telegram_client::subscribe(&self.client);

        tokio::pin!(shutdown_signal);

        loop {
            tokio::select! {
                biased;

                // Check for shutdown signal first
                () = &mut shutdown_signal => {
                    info!("Shutdown signal received, stopping update processor");
                    return Ok(());
                }

                result = stream.next() => {
                    match result {
                        Some(Ok(update)) => self.process_update(&update).await,
                        Some(Err(e)) => {
                            // Retries with backoff happen inside the stream.
                            error!("Update stream error: {}", e);
                        }
                        None => {
                            warn!("Update stream ended");
                            return Err(ProcessorError::StreamEnded);
                        }
                    }
                }
            }
        }
    }
}

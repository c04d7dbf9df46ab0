//! Long-polling update stream.

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::stream::{self, BoxStream, Stream};
use tracing::{debug, info, warn};

use crate::error::TelegramError;
use crate::types::Update;
use crate::TelegramClient;

/// Configuration for retrying failed polls.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Maximum number of consecutive failures (None = infinite).
    pub max_retries: Option<u32>,
    /// Initial delay before first retry.
    pub initial_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Backoff multiplier for each retry.
    pub backoff_multiplier: f64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_retries: None,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

impl ReconnectConfig {
    /// Calculate delay for a given attempt number.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay_ms = self.initial_delay.as_millis() as f64
            * self.backoff_multiplier.powi(attempt as i32);
        let delay = Duration::from_millis(delay_ms as u64);
        delay.min(self.max_delay)
    }

    /// Check if we should retry after the given number of attempts.
    pub fn should_retry(&self, attempts: u32) -> bool {
        self.max_retries.map_or(true, |max| attempts < max)
    }
}

struct PollState {
    client: TelegramClient,
    reconnect: ReconnectConfig,
    offset: Option<i64>,
    buffer: VecDeque<Update>,
    failures: u32,
    backoff: Option<Duration>,
    finished: bool,
}

impl PollState {
    /// Queue a batch and move the offset past the newest update.
    fn accept(&mut self, updates: Vec<Update>) {
        for update in updates {
            let next = update.update_id + 1;
            if self.offset.map_or(true, |offset| next > offset) {
                self.offset = Some(next);
            }
            self.buffer.push_back(update);
        }
    }
}

/// A stream of incoming updates.
///
/// Each batch from getUpdates is acknowledged by the following request's
/// offset, so an update is never yielded twice by the same stream. Poll
/// failures are yielded as errors and the stream backs off before the next
/// request.
pub struct UpdateStream {
    inner: BoxStream<'static, Result<Update, TelegramError>>,
}

impl UpdateStream {
    /// Create a new update stream from a TelegramClient.
    pub fn new(client: &TelegramClient) -> Self {
        Self::with_reconnect(client, ReconnectConfig::default())
    }

    /// Create a new update stream with custom retry config.
    pub fn with_reconnect(client: &TelegramClient, reconnect: ReconnectConfig) -> Self {
        info!("Starting long poll against {}", client.config().api_url);

        let state = PollState {
            client: client.clone(),
            reconnect,
            offset: None,
            buffer: VecDeque::new(),
            failures: 0,
            backoff: None,
            finished: false,
        };

        let inner = stream::unfold(state, |mut state| async move {
            loop {
                if let Some(update) = state.buffer.pop_front() {
                    return Some((Ok(update), state));
                }
                if state.finished {
                    return None;
                }
                if let Some(delay) = state.backoff.take() {
                    debug!("Backing off for {:?}", delay);
                    tokio::time::sleep(delay).await;
                }

                match state.client.get_updates(state.offset).await {
                    Ok(updates) => {
                        state.failures = 0;
                        if !updates.is_empty() {
                            debug!("Received {} update(s)", updates.len());
                        }
                        state.accept(updates);
                    }
                    Err(e) => {
                        warn!("getUpdates failed: {}", e);
                        if state.reconnect.should_retry(state.failures) {
                            state.backoff = Some(state.reconnect.delay_for_attempt(state.failures));
                            state.failures += 1;
                        } else {
                            info!("Giving up after {} failed polls", state.failures);
                            state.finished = true;
                        }
                        return Some((Err(e), state));
                    }
                }
            }
        });

        Self {
            inner: Box::pin(inner),
        }
    }
}

impl Stream for UpdateStream {
    type Item = Result<Update, TelegramError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

/// Create an update stream from a TelegramClient.
pub fn subscribe(client: &TelegramClient) -> UpdateStream {
    UpdateStream::new(client)
}

/// Create an update stream with custom retry configuration.
pub fn subscribe_with_reconnect(
    client: &TelegramClient,
    reconnect_config: ReconnectConfig,
) -> UpdateStream {
    UpdateStream::with_reconnect(client, reconnect_config)
}

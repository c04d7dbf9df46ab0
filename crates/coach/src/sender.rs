//! Message sender trait and implementations.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::CoachError;
use crate::event::Action;

/// A button that triggers an [`Action`] when pressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionButton {
    pub label: String,
    pub action: Action,
}

impl ActionButton {
    pub fn new(label: impl Into<String>, action: Action) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }
}

/// Presentation hint attached to an outgoing message.
///
/// How it is rendered is up to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Markup {
    /// Buttons attached to the message, one row.
    Actions(Vec<ActionButton>),
    /// Suggested replies, in rows. Pressing one sends its text.
    Choices(Vec<Vec<String>>),
    /// Remove previously suggested replies.
    Clear,
}

/// Trait for sending messages.
///
/// Abstracted to support different transports (Telegram, tests, etc.)
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Send a text message.
    ///
    /// # Arguments
    /// * `chat_id` - Recipient chat
    /// * `text` - Message content
    /// * `markup` - Optional buttons or reply choices
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        markup: Option<&Markup>,
    ) -> Result<(), CoachError>;

    /// Send plain text without markup.
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), CoachError> {
        self.send_message(chat_id, text, None).await
    }
}

/// A message captured by [`RecordingSender`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outgoing {
    pub chat_id: i64,
    pub text: String,
    pub markup: Option<Markup>,
}

/// A sender for tests that records every message and can simulate
/// undeliverable chats.
#[derive(Debug, Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<Outgoing>>,
    failing: Mutex<Vec<i64>>,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every send to `chat_id` fail, as if the user blocked the bot.
    pub async fn fail_for(&self, chat_id: i64) {
        self.failing.lock().await.push(chat_id);
    }

    /// All delivered messages so far.
    pub async fn sent(&self) -> Vec<Outgoing> {
        self.sent.lock().await.clone()
    }

    /// Delivered messages for one chat.
    pub async fn sent_to(&self, chat_id: i64) -> Vec<Outgoing> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .cloned()
            .collect()
    }

    /// Text of the last message delivered to a chat.
    pub async fn last_text(&self, chat_id: i64) -> Option<String> {
        self.sent_to(chat_id).await.last().map(|m| m.text.clone())
    }

    /// Return and forget everything recorded so far.
    pub async fn drain(&self) -> Vec<Outgoing> {
        std::mem::take(&mut *self.sent.lock().await)
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        markup: Option<&Markup>,
    ) -> Result<(), CoachError> {
        if self.failing.lock().await.contains(&chat_id) {
            return Err(CoachError::SendFailed(format!(
                "chat {} is unreachable",
                chat_id
            )));
        }
        self.sent.lock().await.push(Outgoing {
            chat_id,
            text: text.to_string(),
            markup: markup.cloned(),
        });
        Ok(())
    }
}

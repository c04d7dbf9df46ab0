//! Types for sending messages through the Bot API.

use serde::{Deserialize, Serialize};

/// Parameters for sendMessage.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageParams {
    /// Target chat.
    pub chat_id: i64,

    /// The message text.
    pub text: String,

    /// Keyboard to attach.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<ReplyMarkup>,
}

impl SendMessageParams {
    /// Plain text to a chat.
    pub fn text(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            reply_markup: None,
        }
    }

    /// Attach a keyboard.
    pub fn with_markup(mut self, markup: ReplyMarkup) -> Self {
        self.reply_markup = Some(markup);
        self
    }
}

/// Keyboard attached to an outgoing message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReplyMarkup {
    /// Buttons under the message that send callback data.
    Inline {
        inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
    },
    /// Custom reply keyboard replacing the user's keyboard.
    Keyboard {
        keyboard: Vec<Vec<KeyboardButton>>,
        resize_keyboard: bool,
        one_time_keyboard: bool,
    },
    /// Remove a previously shown reply keyboard.
    Remove { remove_keyboard: bool },
}

impl ReplyMarkup {
    /// Single row of inline buttons.
    pub fn inline_row(buttons: Vec<InlineKeyboardButton>) -> Self {
        ReplyMarkup::Inline {
            inline_keyboard: vec![buttons],
        }
    }

    /// Reply keyboard from rows of labels.
    pub fn keyboard(rows: Vec<Vec<String>>, one_time: bool) -> Self {
        ReplyMarkup::Keyboard {
            keyboard: rows
                .into_iter()
                .map(|row| row.into_iter().map(|text| KeyboardButton { text }).collect())
                .collect(),
            resize_keyboard: true,
            one_time_keyboard: one_time,
        }
    }

    /// Remove the reply keyboard.
    pub fn remove() -> Self {
        ReplyMarkup::Remove {
            remove_keyboard: true,
        }
    }
}

/// A button that sends callback data when pressed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

impl InlineKeyboardButton {
    pub fn new(text: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: callback_data.into(),
        }
    }
}

/// A reply keyboard button; pressing it sends its text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyboardButton {
    pub text: String,
}

/// Parameters for answerCallbackQuery.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerCallbackParams {
    pub callback_query_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Parameters for getUpdates.
#[derive(Debug, Clone, Serialize)]
pub struct GetUpdatesParams {
    /// First update to return; acknowledges everything before it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,

    /// Long-poll timeout in seconds.
    pub timeout: u64,

    /// Update kinds to receive.
    pub allowed_updates: Vec<String>,
}

/// Result of sendMessage (only the fields we use).
#[derive(Debug, Clone, Deserialize)]
pub struct SentMessage {
    pub message_id: i64,

    #[serde(default)]
    pub date: i64,
}

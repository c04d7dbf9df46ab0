//! Update and message types received from the Bot API.

use serde::{Deserialize, Serialize};

/// One incoming update from getUpdates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Update {
    /// Monotonic update identifier; the next poll offset is this plus one.
    pub update_id: i64,

    /// New incoming message.
    #[serde(default)]
    pub message: Option<Message>,

    /// Inline button press.
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

/// A chat message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Message {
    /// Message identifier within the chat.
    pub message_id: i64,

    /// Sender (absent for channel posts).
    #[serde(default)]
    pub from: Option<User>,

    /// Chat the message belongs to.
    pub chat: Chat,

    /// Unix timestamp.
    #[serde(default)]
    pub date: i64,

    /// Text content.
    #[serde(default)]
    pub text: Option<String>,
}

/// A Telegram user or bot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    #[serde(default)]
    pub is_bot: bool,

    #[serde(default)]
    pub first_name: String,

    #[serde(default)]
    pub last_name: Option<String>,

    #[serde(default)]
    pub username: Option<String>,
}

impl User {
    /// First and last name joined, as Telegram clients display them.
    pub fn full_name(&self) -> String {
        match &self.last_name {
            Some(last) if !last.is_empty() => format!("{} {}", self.first_name, last),
            _ => self.first_name.clone(),
        }
    }
}

/// A chat.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,

    /// "private", "group", "supergroup" or "channel".
    #[serde(default, rename = "type")]
    pub kind: String,
}

/// An inline keyboard button press.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallbackQuery {
    /// Identifier to pass to answerCallbackQuery.
    pub id: String,

    /// Who pressed the button.
    pub from: User,

    /// The message the keyboard was attached to.
    #[serde(default)]
    pub message: Option<Message>,

    /// The button's callback data.
    #[serde(default)]
    pub data: Option<String>,
}

impl CallbackQuery {
    /// Chat the button was pressed in. Falls back to the user for private chats.
    pub fn chat_id(&self) -> i64 {
        self.message
            .as_ref()
            .map(|m| m.chat.id)
            .unwrap_or(self.from.id)
    }
}

//! Inbound events and interactive action identifiers.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// An event from a chat participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    /// Chat the event came from. Replies go here.
    pub chat_id: i64,
    /// User who produced the event. Equal to `chat_id` in private chats.
    pub sender_id: i64,
    /// Display name of the sender.
    pub sender_name: String,
    pub kind: EventKind,
}

/// What the participant did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// Free text.
    Text(String),
    /// Selection of a previously offered action.
    Action(Action),
}

impl InboundEvent {
    /// Free text from a private chat.
    pub fn text(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            sender_id: chat_id,
            sender_name: String::new(),
            kind: EventKind::Text(text.into()),
        }
    }

    /// Action selection from a private chat.
    pub fn action(chat_id: i64, action: Action) -> Self {
        Self {
            chat_id,
            sender_id: chat_id,
            sender_name: String::new(),
            kind: EventKind::Action(action),
        }
    }

    /// Set the sender's display name.
    pub fn with_sender_name(mut self, name: impl Into<String>) -> Self {
        self.sender_name = name.into();
        self
    }
}

/// Interactive action. The string form is the routing key carried by
/// buttons, so `Display` and `FromStr` must stay exact inverses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// `done_<profile_id>`
    Done(i64),
    /// `skip_<profile_id>`
    Skip(i64),
    /// `answer_<question_id>`
    Answer(i64),
    /// `continue`
    Continue,
    /// `create_new`
    CreateNew,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Done(id) => write!(f, "done_{}", id),
            Action::Skip(id) => write!(f, "skip_{}", id),
            Action::Answer(id) => write!(f, "answer_{}", id),
            Action::Continue => f.write_str("continue"),
            Action::CreateNew => f.write_str("create_new"),
        }
    }
}

/// Unrecognized action identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown action: {0:?}")]
pub struct ParseActionError(pub String);

/// Decimal, unpadded, non-negative.
fn parse_id(digits: &str) -> Option<i64> {
    let canonical = !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && (digits == "0" || !digits.starts_with('0'));
    if !canonical {
        return None;
    }
    digits.parse().ok()
}

impl FromStr for Action {
    type Err = ParseActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = match s {
            "continue" => Some(Action::Continue),
            "create_new" => Some(Action::CreateNew),
            _ => {
                if let Some(id) = s.strip_prefix("done_") {
                    parse_id(id).map(Action::Done)
                } else if let Some(id) = s.strip_prefix("skip_") {
                    parse_id(id).map(Action::Skip)
                } else if let Some(id) = s.strip_prefix("answer_") {
                    parse_id(id).map(Action::Answer)
                } else {
                    None
                }
            }
        };
        parsed.ok_or_else(|| ParseActionError(s.to_string()))
    }
}

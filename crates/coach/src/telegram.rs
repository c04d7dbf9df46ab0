//! Telegram transport: outbound sender and inbound update conversion.

use async_trait::async_trait;
use telegram_client::{InlineKeyboardButton, ReplyMarkup, TelegramClient, Update};
use tracing::debug;

use crate::error::CoachError;
use crate::event::{Action, EventKind, InboundEvent};
use crate::sender::{Markup, MessageSender};

/// Sends messages through the Bot API.
#[derive(Debug, Clone)]
pub struct TelegramSender {
    client: TelegramClient,
}

impl TelegramSender {
    pub fn new(client: TelegramClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &TelegramClient {
        &self.client
    }
}

#[async_trait]
impl MessageSender for TelegramSender {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        markup: Option<&Markup>,
    ) -> Result<(), CoachError> {
        let result = match markup {
            Some(markup) => {
                self.client
                    .send_with_markup(chat_id, text, to_reply_markup(markup))
                    .await
            }
            None => self.client.send_text(chat_id, text).await,
        };

        result
            .map(|_| ())
            .map_err(|e| CoachError::SendFailed(e.to_string()))
    }
}

/// Render a presentation hint as a Bot API keyboard.
pub fn to_reply_markup(markup: &Markup) -> ReplyMarkup {
    match markup {
        Markup::Actions(buttons) => ReplyMarkup::inline_row(
            buttons
                .iter()
                .map(|b| InlineKeyboardButton::new(b.label.clone(), b.action.to_string()))
                .collect(),
        ),
        // Stays visible until a later message sends Markup::Clear.
        Markup::Choices(rows) => ReplyMarkup::keyboard(rows.clone(), false),
        Markup::Clear => ReplyMarkup::remove(),
    }
}

/// Convert an update into an event for the state machine.
///
/// Updates without text, and button presses with unknown data, yield `None`.
pub fn event_from_update(update: &Update) -> Option<InboundEvent> {
    if let Some(query) = &update.callback_query {
        let data = query.data.as_deref()?;
        let action = match data.parse::<Action>() {
            Ok(action) => action,
            Err(e) => {
                debug!("Ignoring callback {}: {}", query.id, e);
                return None;
            }
        };
        return Some(InboundEvent {
            chat_id: query.chat_id(),
            sender_id: query.from.id,
            sender_name: query.from.full_name(),
            kind: EventKind::Action(action),
        });
    }

    let message = update.message.as_ref()?;
    let text = message.text.clone()?;
    let (sender_id, sender_name) = match &message.from {
        Some(user) if user.is_bot => return None,
        Some(user) => (user.id, user.full_name()),
        None => (message.chat.id, String::new()),
    };

    Some(InboundEvent {
        chat_id: message.chat.id,
        sender_id,
        sender_name,
        kind: EventKind::Text(text),
    })
}

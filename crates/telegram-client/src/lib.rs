//! Telegram Bot API client library.
//!
//! This crate provides a Rust client for the Telegram Bot API over HTTPS.
//! It supports:
//!
//! - Sending text messages with inline or reply keyboards
//! - Receiving updates via long polling, with backoff on failures
//! - Answering callback queries from inline buttons
//!
//! # Example
//!
//! ```no_run
//! use telegram_client::{BotConfig, TelegramClient};
//!
//! # async fn example() -> Result<(), telegram_client::TelegramError> {
//! // Connect (verifies the token with getMe)
//! let config = BotConfig::new("123456:ABC-DEF");
//! let client = TelegramClient::connect(config).await?;
//!
//! // Send a message
//! let sent = client.send_text(123456789, "Hello!").await?;
//! println!("Sent message {}", sent.message_id);
//!
//! // Poll for updates
//! use futures::StreamExt;
//! let mut updates = telegram_client::subscribe(&client);
//! while let Some(result) = updates.next().await {
//!     match result {
//!         Ok(update) => {
//!             if let Some(msg) = update.message {
//!                 println!("From {}: {:?}", msg.chat.id, msg.text);
//!             }
//!         }
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod poll;
pub mod types;

pub use client::TelegramClient;
pub use config::BotConfig;
pub use error::TelegramError;
pub use poll::{subscribe, subscribe_with_reconnect, ReconnectConfig, UpdateStream};
pub use types::*;

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

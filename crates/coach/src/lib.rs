//! Training coach: conversation state machine and reminder scheduler.
//!
//! This crate provides the [`Conversation`] state machine that registers
//! users and records their workouts, and the [`Scheduler`] that sends daily
//! exercise reminders.
//!
//! # Features
//!
//! - Multi-step registration with in-place re-prompts on invalid input
//! - Daily reminders with a random eligible exercise and done/skip buttons
//! - One follow-up per unacknowledged reminder
//! - Consecutive-day streaks and a progress strip
//! - Post-workout feedback and a question relay to the administrator
//!
//! # Architecture
//!
//! ```text
//! Telegram update (long poll)             tick every 60s
//!          ↓                                    ↓
//! ┌──────────────────────┐          ┌──────────────────────┐
//! │     CONVERSATION     │          │      SCHEDULER       │
//! │  session per (chat,  │          │  due profiles →      │
//! │  sender), validation │          │  ExerciseSelector →  │
//! │  and transitions     │          │  reminder + buttons  │
//! └──────────┬───────────┘          └──────────┬───────────┘
//!            │   acknowledge   ┌───────────┐   │ register / take overdue
//!            └────────────────→│  PENDING  │←──┘
//!            │                 └───────────┘   │
//!            ↓                                 ↓
//!      ┌──────────────────────────────────────────────┐
//!      │          database (SQLite via sqlx)          │
//!      └──────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use coach::{Conversation, InboundEvent, PendingReminders, RecordingSender, Scheduler};
//! use database::Database;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("sqlite:coach.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     let sender = Arc::new(RecordingSender::new());
//!     let pending = Arc::new(PendingReminders::new());
//!
//!     let conversation = Conversation::new(db.clone(), sender.clone(), 1)
//!         .with_pending(pending.clone());
//!     conversation.handle(&InboundEvent::text(42, "/start")).await?;
//!
//!     let scheduler = Scheduler::new(db, sender, pending);
//!     let report = scheduler.tick().await;
//!     println!("dispatched {}", report.dispatched);
//!     Ok(())
//! }
//! ```

pub mod clock;
pub mod config;
pub mod conversation;
pub mod error;
pub mod event;
pub mod pending;
pub mod processor;
pub mod scheduler;
pub mod selector;
pub mod sender;
pub mod session;
pub mod streak;
pub mod telegram;
pub mod texts;

pub use clock::{Clock, FixedClock, LocalClock};
pub use config::{CoachConfig, ConfigError};
pub use conversation::Conversation;
pub use error::CoachError;
pub use event::{Action, EventKind, InboundEvent, ParseActionError};
pub use pending::{PendingReminder, PendingReminders};
pub use processor::{ProcessorError, UpdateProcessor};
pub use scheduler::{Scheduler, TickReport};
pub use selector::ExerciseSelector;
pub use sender::{ActionButton, Markup, MessageSender, Outgoing, RecordingSender};
pub use session::{RegistrationDraft, Session, SessionKey, SessionStore};
pub use telegram::TelegramSender;

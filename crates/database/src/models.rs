//! Database models.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered user's fitness data and reminder configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Profile {
    /// Auto-incrementing ID.
    pub id: i64,
    /// Display name. Deactivated profiles carry a `_Deactivated_` prefix.
    pub name: String,
    /// Age in years.
    pub age: u32,
    /// Fitness level, 1 (beginner) to 5 (professional).
    pub fitness_level: u8,
    /// Zero-padded `HH:MM` reminder time.
    pub reminder_time: String,
    /// Linked chat. `None` once the profile has been deactivated.
    pub chat_id: Option<i64>,
    /// Registration date.
    pub created_on: NaiveDate,
    /// Selected exercise tags.
    #[sqlx(json)]
    pub tags: BTreeSet<String>,
}

impl Profile {
    /// Whether the profile is still linked to a chat.
    pub fn is_active(&self) -> bool {
        self.chat_id.is_some()
    }
}

/// Fields needed to register a new profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProfile {
    pub name: String,
    pub age: u32,
    pub fitness_level: u8,
    pub reminder_time: String,
    pub chat_id: i64,
    pub created_on: NaiveDate,
    pub tags: BTreeSet<String>,
}

/// An exercise from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Exercise {
    pub id: i64,
    pub name: String,
    /// Minimum fitness level required.
    pub level: u8,
    pub description: String,
    /// Repetition scheme, e.g. "3 x 15".
    pub repetitions: String,
}

/// Fields needed to add an exercise to the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExercise {
    pub name: String,
    pub level: u8,
    pub description: String,
    pub repetitions: String,
    pub tags: Vec<String>,
}

/// One day of workout tracking for a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct DailyLog {
    pub id: i64,
    pub profile_id: i64,
    pub log_date: NaiveDate,
    pub completed: bool,
}

/// Post-workout feedback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Feedback {
    pub id: i64,
    pub profile_id: i64,
    pub feedback_date: NaiveDate,
    /// Rating from 1 to 5.
    pub rating: u8,
    pub comment: Option<String>,
    pub created_at: String,
}

/// A question relayed to the administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: i64,
    /// Asking profile.
    pub profile_id: i64,
    /// Chat the answer should be delivered to.
    pub chat_id: i64,
    pub text: String,
    pub asked_on: NaiveDate,
    /// Either `open` or `answered`.
    pub status: String,
}

impl Question {
    pub const OPEN: &'static str = "open";
    pub const ANSWERED: &'static str = "answered";

    /// Whether the question still awaits an answer.
    pub fn is_open(&self) -> bool {
        self.status == Self::OPEN
    }
}

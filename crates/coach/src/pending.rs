//! In-flight reminders awaiting acknowledgment.
//!
//! Entries live only in memory and are lost on restart. An entry leaves the
//! registry exactly once: either the user acknowledges it, or the follow-up
//! sweep claims it. Both paths remove under the same lock, so a follow-up and
//! an acknowledgment can never both win.

use std::collections::HashMap;

use chrono::{Duration, NaiveDateTime};
use tokio::sync::Mutex;

/// A dispatched reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingReminder {
    pub profile_id: i64,
    pub chat_id: i64,
    pub sent_at: NaiveDateTime,
}

/// Registry of un-acknowledged reminders keyed by profile id.
#[derive(Debug, Default)]
pub struct PendingReminders {
    entries: Mutex<HashMap<i64, PendingReminder>>,
}

impl PendingReminders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a dispatched reminder. A newer dispatch replaces an older one.
    pub async fn register(&self, profile_id: i64, chat_id: i64, sent_at: NaiveDateTime) {
        self.entries.lock().await.insert(
            profile_id,
            PendingReminder {
                profile_id,
                chat_id,
                sent_at,
            },
        );
    }

    /// Mark the reminder for a profile acknowledged.
    ///
    /// Returns `true` if a reminder was pending.
    pub async fn acknowledge(&self, profile_id: i64) -> bool {
        self.entries.lock().await.remove(&profile_id).is_some()
    }

    /// Remove and return every reminder sent at least `grace` before `now`.
    pub async fn take_overdue(&self, now: NaiveDateTime, grace: Duration) -> Vec<PendingReminder> {
        let mut entries = self.entries.lock().await;

        let overdue: Vec<i64> = entries
            .values()
            .filter(|entry| now - entry.sent_at >= grace)
            .map(|entry| entry.profile_id)
            .collect();

        let mut taken: Vec<PendingReminder> = overdue
            .into_iter()
            .filter_map(|profile_id| entries.remove(&profile_id))
            .collect();
        taken.sort_by_key(|entry| entry.profile_id);
        taken
    }

    pub async fn get(&self, profile_id: i64) -> Option<PendingReminder> {
        self.entries.lock().await.get(&profile_id).copied()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

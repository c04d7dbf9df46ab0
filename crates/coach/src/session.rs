//! Per-conversation session state.

use std::collections::{BTreeSet, HashMap};

use tokio::sync::Mutex;

/// Fields collected during registration before the profile is committed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationDraft {
    pub name: String,
    pub age: u32,
    pub fitness_level: u8,
    pub tags: BTreeSet<String>,
}

/// Where a conversation currently is. No entry in the store means idle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    AwaitingName,
    AwaitingAge { name: String },
    AwaitingFitnessLevel { name: String, age: u32 },
    AwaitingExerciseTags(RegistrationDraft),
    AwaitingReminderTime(RegistrationDraft),
    AwaitingFeedbackRating { profile_id: i64 },
    AwaitingFeedbackComment { profile_id: i64, rating: u8 },
    AwaitingAdminAnswer { question_id: i64 },
}

impl Session {
    pub fn is_feedback(&self) -> bool {
        matches!(
            self,
            Session::AwaitingFeedbackRating { .. } | Session::AwaitingFeedbackComment { .. }
        )
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Session::AwaitingName => "awaiting_name",
            Session::AwaitingAge { .. } => "awaiting_age",
            Session::AwaitingFitnessLevel { .. } => "awaiting_fitness_level",
            Session::AwaitingExerciseTags(_) => "awaiting_exercise_tags",
            Session::AwaitingReminderTime(_) => "awaiting_reminder_time",
            Session::AwaitingFeedbackRating { .. } => "awaiting_feedback_rating",
            Session::AwaitingFeedbackComment { .. } => "awaiting_feedback_comment",
            Session::AwaitingAdminAnswer { .. } => "awaiting_admin_answer",
        }
    }
}

/// Sessions are keyed by chat and sender, so one user in a group does not
/// step on another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub chat_id: i64,
    pub sender_id: i64,
}

impl SessionKey {
    pub fn new(chat_id: i64, sender_id: i64) -> Self {
        Self { chat_id, sender_id }
    }
}

/// Thread-safe session storage. At most one session per key.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<SessionKey, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current session, if any.
    pub async fn get(&self, key: SessionKey) -> Option<Session> {
        self.sessions.lock().await.get(&key).cloned()
    }

    /// Replace the session for a key.
    pub async fn set(&self, key: SessionKey, session: Session) {
        self.sessions.lock().await.insert(key, session);
    }

    /// Drop the session for a key.
    pub async fn clear(&self, key: SessionKey) {
        self.sessions.lock().await.remove(&key);
    }

    /// Number of active sessions.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_one_session_per_key() {
        let store = SessionStore::new();
        let key = SessionKey::new(10, 10);

        store.set(key, Session::AwaitingName).await;
        store
            .set(key, Session::AwaitingAge { name: "Anna".to_string() })
            .await;
        assert_eq!(store.len().await, 1);
        assert_eq!(
            store.get(key).await,
            Some(Session::AwaitingAge { name: "Anna".to_string() })
        );

        store.clear(key).await;
        assert!(store.get(key).await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_keys_isolate_group_members() {
        let store = SessionStore::new();
        store.set(SessionKey::new(-5, 1), Session::AwaitingName).await;

        assert!(store.get(SessionKey::new(-5, 2)).await.is_none());
        assert_eq!(store.get(SessionKey::new(-5, 1)).await, Some(Session::AwaitingName));
        store.clear(SessionKey::new(-5, 2)).await;
        assert_eq!(store.len().await, 1);
    }

    #[test]
    fn test_session_groups() {
        assert!(Session::AwaitingFeedbackRating { profile_id: 1 }.is_feedback());
        assert!(!Session::AwaitingExerciseTags(RegistrationDraft::default()).is_feedback());
        assert!(Session::AwaitingFeedbackComment { profile_id: 1, rating: 3 }.is_feedback());
        assert!(!Session::AwaitingAdminAnswer { question_id: 1 }.is_feedback());
    }
}

//! Shared harness for coach integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use coach::{
    Action, Clock, Conversation, FixedClock, InboundEvent, PendingReminders, RecordingSender, Scheduler,
    SessionKey, SessionStore,
};
use database::{exercise, profile, Database, NewExercise, Profile};

pub const ADMIN: i64 = 999;

pub fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

pub struct Harness {
    pub db: Database,
    pub sender: Arc<RecordingSender>,
    pub clock: Arc<FixedClock>,
    pub sessions: Arc<SessionStore>,
    pub pending: Arc<PendingReminders>,
    pub conversation: Conversation<RecordingSender>,
    pub scheduler: Scheduler<RecordingSender>,
}

impl Harness {
    pub async fn new() -> Self {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();

        let sender = Arc::new(RecordingSender::new());
        let clock = Arc::new(FixedClock::new(at(18, 7, 30)));
        let sessions = Arc::new(SessionStore::new());
        let pending = Arc::new(PendingReminders::new());
        let dyn_clock: Arc<dyn Clock> = clock.clone();

        let conversation = Conversation::new(db.clone(), sender.clone(), ADMIN)
            .with_sessions(sessions.clone())
            .with_pending(pending.clone())
            .with_clock(dyn_clock.clone());
        let scheduler = Scheduler::new(db.clone(), sender.clone(), pending.clone()).with_clock(dyn_clock);

        Self {
            db,
            sender,
            clock,
            sessions,
            pending,
            conversation,
            scheduler,
        }
    }

    pub async fn say(&self, chat_id: i64, text: &str) {
        self.conversation
            .handle(&InboundEvent::text(chat_id, text))
            .await
            .unwrap();
    }

    pub async fn say_as(&self, chat_id: i64, sender_id: i64, text: &str) {
        let mut event = InboundEvent::text(chat_id, text);
        event.sender_id = sender_id;
        self.conversation.handle(&event).await.unwrap();
    }

    pub async fn press(&self, chat_id: i64, action: Action) {
        self.conversation
            .handle(&InboundEvent::action(chat_id, action))
            .await
            .unwrap();
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub async fn last_text(&self, chat_id: i64) -> String {
        self.sender.last_text(chat_id).await.unwrap_or_default()
    }

    pub async fn session(&self, chat_id: i64) -> Option<coach::Session> {
        self.sessions.get(SessionKey::new(chat_id, chat_id)).await
    }

    /// Walk through the whole registration form.
    pub async fn register(&self, chat_id: i64, name: &str, level: u8, tags: &[&str], time: &str) -> Profile {
        self.say(chat_id, "/start").await;
        self.say(chat_id, name).await;
        self.say(chat_id, "30").await;
        self.say(chat_id, &level.to_string()).await;
        for tag in tags {
            self.say(chat_id, tag).await;
        }
        self.say(chat_id, "done").await;
        self.say(chat_id, time).await;

        profile::find_by_chat(self.db.pool(), chat_id)
            .await
            .unwrap()
            .expect("registration should create a profile")
    }

    pub async fn add_exercise(&self, name: &str, level: u8, tags: &[&str]) -> i64 {
        let new = NewExercise {
            name: name.to_string(),
            level,
            description: format!("How to do {}", name),
            repetitions: "3 x 12".to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        };
        exercise::insert_exercise(self.db.pool(), &new).await.unwrap()
    }
}

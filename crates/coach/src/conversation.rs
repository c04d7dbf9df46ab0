//! Conversation state machine.
//!
//! Drives registration, workout acknowledgment, feedback capture and the
//! question relay between users and the administrator. Each inbound event is
//! handled against the session stored for its (chat, sender) pair.

use std::sync::Arc;

use database::validation::{self, ValidationError};
use database::{daily_log, exercise, feedback, profile, question, Database, DatabaseError, NewProfile, Profile};
use tracing::{debug, info, warn};

use crate::clock::{Clock, LocalClock};
use crate::error::CoachError;
use crate::event::{Action, EventKind, InboundEvent};
use crate::pending::PendingReminders;
use crate::sender::{ActionButton, Markup, MessageSender};
use crate::session::{RegistrationDraft, Session, SessionKey, SessionStore};
use crate::streak::{self, DEFAULT_HISTORY_DAYS};
use crate::texts;

/// Tag buttons per keyboard row.
const TAG_ROW_WIDTH: usize = 2;

/// Slash commands. Honored in every state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command<'a> {
    Start,
    Ask(&'a str),
    Help,
}

fn parse_command(text: &str) -> Option<Command<'_>> {
    let text = text.trim();
    if !text.starts_with('/') {
        return None;
    }

    let (head, rest) = match text.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (text, ""),
    };
    // Group chats address commands as /cmd@botname.
    let name = head.split('@').next().unwrap_or(head);

    match name {
        texts::START_COMMAND => Some(Command::Start),
        texts::ASK_COMMAND => Some(Command::Ask(rest)),
        texts::HELP_COMMAND => Some(Command::Help),
        _ => None,
    }
}

/// `Some(true)` for "done", `Some(false)` for "not done".
fn parse_acknowledgment(text: &str) -> Option<bool> {
    let text = text.trim().to_lowercase();
    if text == texts::DONE_PHRASE {
        Some(true)
    } else if text == texts::NOT_DONE_PHRASE {
        Some(false)
    } else {
        None
    }
}

fn scale_choices() -> Vec<Vec<String>> {
    vec![(1..=5).map(|n| n.to_string()).collect()]
}

fn fitness_level_choices() -> Vec<Vec<String>> {
    vec![
        vec!["1".to_string(), "2".to_string()],
        vec!["3".to_string(), "4".to_string()],
        vec!["5".to_string()],
    ]
}

fn tag_choices(tags: Vec<String>) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = tags.chunks(TAG_ROW_WIDTH).map(<[String]>::to_vec).collect();
    rows.push(vec![texts::DONE_LABEL.to_string()]);
    rows
}

/// Handles inbound events for every chat.
///
/// Events for the same (chat, sender) pair must be handled one at a time;
/// different pairs may be handled concurrently.
pub struct Conversation<S: MessageSender> {
    database: Database,
    sender: Arc<S>,
    sessions: Arc<SessionStore>,
    pending: Arc<PendingReminders>,
    clock: Arc<dyn Clock>,
    admin_chat_id: i64,
    history_days: u32,
}

impl<S: MessageSender> Conversation<S> {
    /// Create a state machine with fresh session and reminder stores.
    pub fn new(database: Database, sender: Arc<S>, admin_chat_id: i64) -> Self {
        Self {
            database,
            sender,
            sessions: Arc::new(SessionStore::new()),
            pending: Arc::new(PendingReminders::new()),
            clock: Arc::new(LocalClock),
            admin_chat_id,
            history_days: DEFAULT_HISTORY_DAYS,
        }
    }

    /// Share a session store.
    pub fn with_sessions(mut self, sessions: Arc<SessionStore>) -> Self {
        self.sessions = sessions;
        self
    }

    /// Share the reminder registry with the scheduler.
    pub fn with_pending(mut self, pending: Arc<PendingReminders>) -> Self {
        self.pending = pending;
        self
    }

    /// Use a different time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Set how many days the progress strip shows.
    pub fn with_history_days(mut self, days: u32) -> Self {
        self.history_days = days;
        self
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    pub fn pending(&self) -> &Arc<PendingReminders> {
        &self.pending
    }

    /// Handle one inbound event.
    pub async fn handle(&self, event: &InboundEvent) -> Result<(), CoachError> {
        let key = SessionKey::new(event.chat_id, event.sender_id);
        match &event.kind {
            EventKind::Text(text) => self.handle_text(event, key, text).await,
            EventKind::Action(action) => self.handle_action(event, key, *action).await,
        }
    }

    async fn reply(&self, chat_id: i64, text: &str, markup: Option<Markup>) -> Result<(), CoachError> {
        self.sender.send_message(chat_id, text, markup.as_ref()).await
    }

    async fn handle_text(&self, event: &InboundEvent, key: SessionKey, text: &str) -> Result<(), CoachError> {
        if let Some(command) = parse_command(text) {
            return match command {
                Command::Start => self.start(event, key).await,
                Command::Ask(body) => self.ask(event, body).await,
                Command::Help => self.reply(event.chat_id, texts::HELP, None).await,
            };
        }

        let session = self.sessions.get(key).await;

        let accepts_acknowledgment = session.as_ref().map_or(true, Session::is_feedback);
        if accepts_acknowledgment {
            if let Some(completed) = parse_acknowledgment(text) {
                return match profile::find_by_chat(self.database.pool(), event.chat_id).await? {
                    Some(profile) => self.acknowledge(event, key, profile, completed).await,
                    None => self.reply(event.chat_id, texts::USER_NOT_FOUND, None).await,
                };
            }
        }

        match session {
            None => self.reply(event.chat_id, texts::UNKNOWN_INPUT, None).await,
            Some(session) => {
                debug!("Session {:?} in state {}", key, session.name());
                self.advance(event, key, session, text).await
            }
        }
    }

    async fn handle_action(&self, event: &InboundEvent, key: SessionKey, action: Action) -> Result<(), CoachError> {
        debug!("Action {} from chat {}", action, event.chat_id);
        match action {
            Action::Continue => {
                self.sessions.clear(key).await;
                self.reply(event.chat_id, texts::CONTINUING, None).await
            }
            Action::CreateNew => self.replace_account(event, key).await,
            Action::Done(profile_id) => self.acknowledge_action(event, key, profile_id, true).await,
            Action::Skip(profile_id) => self.acknowledge_action(event, key, profile_id, false).await,
            Action::Answer(question_id) => self.begin_answer(event, key, question_id).await,
        }
    }

    async fn start(&self, event: &InboundEvent, key: SessionKey) -> Result<(), CoachError> {
        self.sessions.clear(key).await;

        match profile::find_by_chat(self.database.pool(), event.chat_id).await? {
            Some(existing) => {
                let markup = Markup::Actions(vec![
                    ActionButton::new(texts::CONTINUE_LABEL, Action::Continue),
                    ActionButton::new(texts::CREATE_NEW_LABEL, Action::CreateNew),
                ]);
                self.reply(event.chat_id, &texts::already_registered(&existing.name), Some(markup))
                    .await
            }
            None => {
                self.sessions.set(key, Session::AwaitingName).await;
                self.reply(event.chat_id, texts::ASK_NAME, Some(Markup::Clear)).await
            }
        }
    }

    async fn replace_account(&self, event: &InboundEvent, key: SessionKey) -> Result<(), CoachError> {
        if let Some(existing) = profile::find_by_chat(self.database.pool(), event.chat_id).await? {
            profile::deactivate_profile(self.database.pool(), existing.id).await?;
            self.pending.acknowledge(existing.id).await;
            info!("Deactivated profile {} for chat {}", existing.id, event.chat_id);
        }

        self.sessions.set(key, Session::AwaitingName).await;
        self.reply(event.chat_id, texts::ASK_NAME_AGAIN, Some(Markup::Clear)).await
    }

    /// Apply free text to an in-progress session.
    async fn advance(&self, event: &InboundEvent, key: SessionKey, session: Session, text: &str) -> Result<(), CoachError> {
        let chat_id = event.chat_id;

        match session {
            Session::AwaitingName => {
                self.sessions
                    .set(key, Session::AwaitingAge { name: text.to_string() })
                    .await;
                self.reply(chat_id, texts::ASK_AGE, None).await
            }

            Session::AwaitingAge { name } => match validation::parse_age(text.trim()) {
                Ok(age) => {
                    self.sessions
                        .set(key, Session::AwaitingFitnessLevel { name, age })
                        .await;
                    self.reply(
                        chat_id,
                        texts::ASK_FITNESS_LEVEL,
                        Some(Markup::Choices(fitness_level_choices())),
                    )
                    .await
                }
                Err(e) => {
                    debug!("Rejected age: {}", e);
                    self.reply(chat_id, texts::INVALID_AGE, None).await
                }
            },

            Session::AwaitingFitnessLevel { name, age } => match validation::parse_fitness_level(text.trim()) {
                Ok(fitness_level) => {
                    let draft = RegistrationDraft {
                        name,
                        age,
                        fitness_level,
                        tags: Default::default(),
                    };
                    self.sessions.set(key, Session::AwaitingExerciseTags(draft)).await;

                    let catalog_tags = exercise::list_tag_names(self.database.pool()).await?;
                    self.reply(chat_id, texts::ASK_TAGS, Some(Markup::Choices(tag_choices(catalog_tags))))
                        .await
                }
                Err(e) => {
                    debug!("Rejected fitness level: {}", e);
                    self.reply(chat_id, texts::INVALID_FITNESS_LEVEL, None).await
                }
            },

            Session::AwaitingExerciseTags(mut draft) => {
                if text.trim().eq_ignore_ascii_case(texts::TAGS_SENTINEL) {
                    if draft.tags.is_empty() {
                        return self.reply(chat_id, texts::NO_TAGS_SELECTED, None).await;
                    }
                    self.sessions.set(key, Session::AwaitingReminderTime(draft)).await;
                    return self
                        .reply(chat_id, texts::ASK_REMINDER_TIME, Some(Markup::Clear))
                        .await;
                }

                match validation::normalize_tag(text) {
                    Ok(tag) => {
                        if draft.tags.insert(tag.clone()) {
                            debug!("Chat {} selected tag {}", chat_id, tag);
                            self.sessions.set(key, Session::AwaitingExerciseTags(draft)).await;
                        }
                    }
                    Err(e) => debug!("Ignored tag input: {}", e),
                }
                Ok(())
            }

            Session::AwaitingReminderTime(draft) => match validation::normalize_reminder_time(text) {
                Ok(reminder_time) => self.register(event, key, draft, reminder_time).await,
                Err(e) => {
                    debug!("Rejected reminder time: {}", e);
                    let prompt = match e {
                        ValidationError::TimeOutOfRange { .. } => texts::TIME_OUT_OF_RANGE,
                        _ => texts::INVALID_TIME_FORMAT,
                    };
                    self.reply(chat_id, prompt, None).await
                }
            },

            Session::AwaitingFeedbackRating { profile_id } => match validation::parse_rating(text.trim()) {
                Ok(rating) => {
                    self.sessions
                        .set(key, Session::AwaitingFeedbackComment { profile_id, rating })
                        .await;
                    self.reply(chat_id, texts::ASK_COMMENT, Some(Markup::Clear)).await
                }
                Err(e) => {
                    debug!("Rejected rating: {}", e);
                    self.reply(chat_id, texts::INVALID_RATING, Some(Markup::Choices(scale_choices())))
                        .await
                }
            },

            Session::AwaitingFeedbackComment { profile_id, rating } => {
                let comment = text.trim();
                let comment = if comment.eq_ignore_ascii_case(texts::NO_COMMENT_SENTINEL) {
                    texts::NO_COMMENT_PROVIDED
                } else {
                    comment
                };

                feedback::insert_feedback(
                    self.database.pool(),
                    profile_id,
                    self.clock.today(),
                    rating,
                    Some(comment),
                )
                .await?;
                self.sessions.clear(key).await;
                info!("Stored feedback from profile {} (rating {})", profile_id, rating);

                self.reply(chat_id, texts::FEEDBACK_THANKS, Some(Markup::Clear)).await
            }

            Session::AwaitingAdminAnswer { question_id } => self.send_answer(event, key, question_id, text).await,
        }
    }

    /// Commit the registration draft as a profile.
    async fn register(
        &self,
        event: &InboundEvent,
        key: SessionKey,
        draft: RegistrationDraft,
        reminder_time: String,
    ) -> Result<(), CoachError> {
        let new = NewProfile {
            name: draft.name,
            age: draft.age,
            fitness_level: draft.fitness_level,
            reminder_time,
            chat_id: event.chat_id,
            created_on: self.clock.today(),
            tags: draft.tags,
        };

        match profile::create_profile(self.database.pool(), &new).await {
            Ok(created) => {
                self.sessions.clear(key).await;
                info!(
                    profile_id = created.id,
                    "Registered {} for chat {} at {}", created.name, event.chat_id, created.reminder_time
                );
                self.reply(
                    event.chat_id,
                    &texts::registration_summary(&created),
                    Some(Markup::Clear),
                )
                .await
            }
            Err(DatabaseError::AlreadyExists { .. }) => {
                self.sessions.clear(key).await;
                self.reply(event.chat_id, texts::ALREADY_REGISTERED_TAKEN, Some(Markup::Clear))
                    .await
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn acknowledge_action(
        &self,
        event: &InboundEvent,
        key: SessionKey,
        profile_id: i64,
        completed: bool,
    ) -> Result<(), CoachError> {
        let profile = match profile::get_profile(self.database.pool(), profile_id).await {
            Ok(profile) => profile,
            Err(DatabaseError::NotFound { .. }) => {
                return self.reply(event.chat_id, texts::NOT_REGISTERED, None).await;
            }
            Err(e) => return Err(e.into()),
        };

        // Buttons only act for the chat the profile is linked to.
        if profile.chat_id != Some(event.chat_id) {
            debug!(
                "Action for profile {} from chat {} does not match its link {:?}",
                profile_id, event.chat_id, profile.chat_id
            );
            return self.reply(event.chat_id, texts::NOT_REGISTERED, None).await;
        }

        self.acknowledge(event, key, profile, completed).await
    }

    /// Record today's outcome and report progress.
    async fn acknowledge(
        &self,
        event: &InboundEvent,
        key: SessionKey,
        profile: Profile,
        completed: bool,
    ) -> Result<(), CoachError> {
        let pool = self.database.pool();
        let today = self.clock.today();

        if self.pending.acknowledge(profile.id).await {
            debug!("Reminder for profile {} acknowledged", profile.id);
        }

        let inserted = daily_log::record_day(pool, profile.id, today, completed).await?;
        if inserted {
            info!(profile_id = profile.id, "Logged {} as {}", today, if completed { "done" } else { "not done" });
        } else {
            debug!("Profile {} already has a log for {}", profile.id, today);
        }

        let from = streak::strip_start(profile.created_on, today, self.history_days);
        let logs = daily_log::logs_between(pool, profile.id, from, today).await?;
        let strip = streak::history_strip(profile.created_on, today, &logs, self.history_days);

        if completed {
            let dates = daily_log::completed_dates(pool, profile.id).await?;
            let current = streak::current_streak(&dates, today);

            self.sessions
                .set(key, Session::AwaitingFeedbackRating { profile_id: profile.id })
                .await;

            self.reply(event.chat_id, &texts::workout_done(current), None).await?;
            self.reply(event.chat_id, &texts::history(&strip), None).await?;
            self.reply(event.chat_id, texts::ASK_RATING, Some(Markup::Choices(scale_choices())))
                .await
        } else {
            self.sessions.clear(key).await;

            self.reply(event.chat_id, texts::SKIPPED, None).await?;
            self.reply(event.chat_id, &texts::history(&strip), Some(Markup::Clear)).await
        }
    }

    /// Store a question and notify the administrator.
    async fn ask(&self, event: &InboundEvent, body: &str) -> Result<(), CoachError> {
        if body.is_empty() {
            return self.reply(event.chat_id, texts::ASK_USAGE, None).await;
        }

        let Some(asker) = profile::find_by_chat(self.database.pool(), event.chat_id).await? else {
            return self.reply(event.chat_id, texts::ASK_REGISTER_FIRST, None).await;
        };

        let question_id = question::create_question(self.database.pool(), asker.id, event.chat_id, body).await?;
        info!("Question {} from profile {}", question_id, asker.id);

        let notice = texts::new_question(&event.sender_name, &asker.name, event.chat_id, body);
        let markup = Markup::Actions(vec![ActionButton::new(
            texts::ANSWER_LABEL,
            Action::Answer(question_id),
        )]);

        match self
            .sender
            .send_message(self.admin_chat_id, &notice, Some(&markup))
            .await
        {
            Ok(()) => self.reply(event.chat_id, texts::QUESTION_SENT, None).await,
            Err(e) => {
                warn!("Failed to notify administrator about question {}: {}", question_id, e);
                self.reply(event.chat_id, texts::QUESTION_SAVED, None).await
            }
        }
    }

    async fn open_question(&self, question_id: i64) -> Result<Option<database::Question>, CoachError> {
        let found = question::get_question(self.database.pool(), question_id).await?;
        Ok(found.filter(database::Question::is_open))
    }

    async fn begin_answer(&self, event: &InboundEvent, key: SessionKey, question_id: i64) -> Result<(), CoachError> {
        if self.open_question(question_id).await?.is_none() {
            return self.reply(event.chat_id, texts::QUESTION_NOT_FOUND, None).await;
        }

        self.sessions
            .set(key, Session::AwaitingAdminAnswer { question_id })
            .await;
        self.reply(event.chat_id, texts::ASK_ANSWER, None).await
    }

    /// Relay the administrator's answer to the asker.
    async fn send_answer(
        &self,
        event: &InboundEvent,
        key: SessionKey,
        question_id: i64,
        answer: &str,
    ) -> Result<(), CoachError> {
        // Authorization guard for the answer transition.
        if event.sender_id != self.admin_chat_id {
            warn!("Sender {} tried to answer question {}", event.sender_id, question_id);
            self.sessions.clear(key).await;
            return self.reply(event.chat_id, texts::NOT_ADMIN, None).await;
        }

        self.sessions.clear(key).await;

        let Some(open) = self.open_question(question_id).await? else {
            return self.reply(event.chat_id, texts::QUESTION_NOT_FOUND, None).await;
        };

        match self
            .sender
            .send_text(open.chat_id, &texts::admin_answer(answer))
            .await
        {
            Ok(()) => {
                if question::mark_answered(self.database.pool(), question_id).await? {
                    info!("Question {} answered", question_id);
                } else {
                    debug!("Question {} was already closed by another answer", question_id);
                }
                self.reply(event.chat_id, texts::ANSWER_SENT, None).await
            }
            Err(e) => {
                warn!("Failed to deliver answer for question {}: {}", question_id, e);
                self.reply(event.chat_id, &texts::answer_failed(&e.to_string()), None)
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("/start"), Some(Command::Start));
        assert_eq!(parse_command("  /start@coach_bot "), Some(Command::Start));
        assert_eq!(parse_command("/help"), Some(Command::Help));
        assert_eq!(parse_command("/ask How to breathe? "), Some(Command::Ask("How to breathe?")));
        assert_eq!(parse_command("/ask"), Some(Command::Ask("")));
        assert_eq!(parse_command("/unknown"), None);
        assert_eq!(parse_command("start"), None);
    }

    #[test]
    fn test_parse_acknowledgment() {
        assert_eq!(parse_acknowledgment("done"), Some(true));
        assert_eq!(parse_acknowledgment(" DONE "), Some(true));
        assert_eq!(parse_acknowledgment("Not Done"), Some(false));
        assert_eq!(parse_acknowledgment("not  done"), None);
        assert_eq!(parse_acknowledgment("done!"), None);
    }

    #[test]
    fn test_tag_choices_end_with_sentinel() {
        let rows = tag_choices(vec!["Abs".into(), "Arms".into(), "Back".into()]);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec!["Abs".to_string(), "Arms".to_string()]);
        assert!(rows[2][0].eq_ignore_ascii_case(texts::TAGS_SENTINEL));
    }
}

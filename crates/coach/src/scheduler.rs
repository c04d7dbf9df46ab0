//! Reminder scheduler.
//!
//! Once per tick the scheduler dispatches reminders to every profile whose
//! reminder time equals the current minute, then sends one follow-up for
//! each reminder left unacknowledged past the grace period.
//!
//! Matching is exact: a minute without a tick is a missed reminder for that
//! day. Reminders are sent at most once and never late.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, NaiveDateTime, Timelike};
use database::{profile, Database};
use tokio::sync::{watch, Mutex};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::clock::{Clock, LocalClock};
use crate::error::CoachError;
use crate::event::Action;
use crate::pending::PendingReminders;
use crate::selector::ExerciseSelector;
use crate::sender::{ActionButton, Markup, MessageSender};
use crate::texts;

/// Default tick interval.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(60);

/// Default grace period before the follow-up.
pub const DEFAULT_FOLLOW_UP_MINUTES: i64 = 15;

/// What one tick did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Profiles whose reminder time matched.
    pub due: usize,
    /// Reminders delivered and registered as pending.
    pub dispatched: usize,
    /// Due profiles with no eligible exercise.
    pub no_exercise: usize,
    /// Reminders that could not be delivered.
    pub failed: usize,
    /// Follow-ups attempted. Each one clears its pending entry.
    pub follow_ups: usize,
    /// The minute was already processed by an earlier tick.
    pub repeated_minute: bool,
    /// Active profiles could not be loaded; only follow-ups ran.
    pub profiles_unavailable: bool,
}

/// Periodic reminder dispatcher.
pub struct Scheduler<S: MessageSender> {
    database: Database,
    sender: Arc<S>,
    selector: ExerciseSelector,
    pending: Arc<PendingReminders>,
    clock: Arc<dyn Clock>,
    tick_interval: Duration,
    follow_up_after: ChronoDuration,
    last_minute: Mutex<Option<NaiveDateTime>>,
}

impl<S: MessageSender> Scheduler<S> {
    pub fn new(database: Database, sender: Arc<S>, pending: Arc<PendingReminders>) -> Self {
        Self {
            selector: ExerciseSelector::new(database.clone()),
            database,
            sender,
            pending,
            clock: Arc::new(LocalClock),
            tick_interval: DEFAULT_TICK_INTERVAL,
            follow_up_after: ChronoDuration::minutes(DEFAULT_FOLLOW_UP_MINUTES),
            last_minute: Mutex::new(None),
        }
    }

    /// Use a different time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Set the tick interval.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Set the grace period before a follow-up.
    pub fn with_follow_up_after(mut self, grace: ChronoDuration) -> Self {
        self.follow_up_after = grace;
        self
    }

    /// Run one tick at the clock's current time.
    pub async fn tick(&self) -> TickReport {
        self.tick_at(self.clock.now()).await
    }

    /// Run one tick as if the time were `now`.
    ///
    /// Failures are logged and counted; follow-ups run even when the
    /// profile lookup fails.
    pub async fn tick_at(&self, now: NaiveDateTime) -> TickReport {
        let mut report = TickReport::default();

        if self.claim_minute(now).await {
            if let Err(e) = self.dispatch_due(now, &mut report).await {
                error!("Failed to load profiles for {}: {}", now.format("%H:%M"), e);
                report.profiles_unavailable = true;
            }
        } else {
            debug!("Minute {} already processed", now.format("%H:%M"));
            report.repeated_minute = true;
        }

        self.send_follow_ups(now, &mut report).await;
        report
    }

    /// Returns `false` if a previous tick already handled this minute.
    async fn claim_minute(&self, now: NaiveDateTime) -> bool {
        let minute = now
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(now);

        let mut last = self.last_minute.lock().await;
        if *last == Some(minute) {
            return false;
        }
        *last = Some(minute);
        true
    }

    async fn dispatch_due(&self, now: NaiveDateTime, report: &mut TickReport) -> Result<(), CoachError> {
        let current = now.format("%H:%M").to_string();
        let profiles = profile::list_active_profiles(self.database.pool()).await?;

        for due in profiles.into_iter().filter(|p| p.reminder_time == current) {
            let Some(chat_id) = due.chat_id else {
                continue;
            };
            report.due += 1;

            let Some(exercise) = self.selector.select(due.fitness_level, &due.tags).await else {
                info!(profile_id = due.id, "No exercise available, skipping reminder");
                report.no_exercise += 1;
                continue;
            };

            let markup = Markup::Actions(vec![
                ActionButton::new(texts::DONE_LABEL, Action::Done(due.id)),
                ActionButton::new(texts::SKIP_LABEL, Action::Skip(due.id)),
            ]);
            let text = texts::reminder(&due.name, &exercise);

            match self.sender.send_message(chat_id, &text, Some(&markup)).await {
                Ok(()) => {
                    self.pending.register(due.id, chat_id, now).await;
                    report.dispatched += 1;
                    debug!("Sent {} to profile {}", exercise.name, due.id);
                }
                Err(e) => {
                    warn!("Failed to send reminder to chat {}: {}", chat_id, e);
                    report.failed += 1;
                }
            }
        }

        Ok(())
    }

    async fn send_follow_ups(&self, now: NaiveDateTime, report: &mut TickReport) {
        for overdue in self.pending.take_overdue(now, self.follow_up_after).await {
            report.follow_ups += 1;
            if let Err(e) = self.sender.send_text(overdue.chat_id, texts::FOLLOW_UP).await {
                warn!("Failed to send follow-up to chat {}: {}", overdue.chat_id, e);
            }
        }
    }

    /// Tick until `shutdown` flips to `true` or its sender is dropped.
    ///
    /// A tick that has started always finishes before shutdown is observed.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("Reminder scheduler started (tick every {:?})", self.tick_interval);

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                biased;

                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }

                _ = interval.tick() => {
                    let report = self.tick().await;
                    if report.due > 0 || report.follow_ups > 0 {
                        info!(
                            "Tick: {} due, {} dispatched, {} without exercise, {} failed, {} follow-ups",
                            report.due, report.dispatched, report.no_exercise, report.failed, report.follow_ups
                        );
                    }
                }
            }
        }

        info!("Reminder scheduler stopped");
    }
}

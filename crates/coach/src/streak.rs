//! Consecutive-day streak and the progress strip.

use std::collections::HashSet;

use chrono::{Days, Duration, NaiveDate};
use database::DailyLog;

/// Days shown in the progress strip by default.
pub const DEFAULT_HISTORY_DAYS: u32 = 28;

/// Cells per strip row.
pub const STRIP_WIDTH: usize = 7;

/// Streak length that earns a congratulation.
pub const STREAK_MILESTONE: u32 = 7;

const DONE_GLYPH: &str = "✅";
const MISSED_GLYPH: &str = "❌";

/// Count consecutive completed days ending today.
///
/// `completed` may be unordered and contain duplicates. Dates after `today`
/// are ignored. Without an entry for `today` the streak is 0.
pub fn current_streak(completed: &[NaiveDate], today: NaiveDate) -> u32 {
    let mut dates: Vec<NaiveDate> = completed.iter().copied().filter(|d| *d <= today).collect();
    dates.sort_unstable_by(|a, b| b.cmp(a));
    dates.dedup();

    let mut streak = 0u32;
    for date in dates {
        if date == today - Duration::days(i64::from(streak)) {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}

/// Where a streak stands relative to [`STREAK_MILESTONE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Milestone {
    Below,
    Reached,
    Beyond,
}

pub fn milestone(streak: u32) -> Milestone {
    match streak.cmp(&STREAK_MILESTONE) {
        std::cmp::Ordering::Less => Milestone::Below,
        std::cmp::Ordering::Equal => Milestone::Reached,
        std::cmp::Ordering::Greater => Milestone::Beyond,
    }
}

/// First day rendered by [`history_strip`].
pub fn strip_start(created_on: NaiveDate, today: NaiveDate, days: u32) -> NaiveDate {
    let window_start = today
        .checked_sub_days(Days::new(u64::from(days.saturating_sub(1))))
        .unwrap_or(NaiveDate::MIN);
    window_start.max(created_on)
}

/// Render the last `days` days ending today, oldest first, one glyph per day.
///
/// Days before `created_on` are not rendered. Rows hold [`STRIP_WIDTH`] cells.
pub fn history_strip(created_on: NaiveDate, today: NaiveDate, logs: &[DailyLog], days: u32) -> String {
    if days == 0 || created_on > today {
        return String::new();
    }

    let done: HashSet<NaiveDate> = logs
        .iter()
        .filter(|log| log.completed)
        .map(|log| log.log_date)
        .collect();

    let cells: Vec<&str> = strip_start(created_on, today, days)
        .iter_days()
        .take_while(|day| *day <= today)
        .map(|day| if done.contains(&day) { DONE_GLYPH } else { MISSED_GLYPH })
        .collect();

    cells
        .chunks(STRIP_WIDTH)
        .map(|row| row.concat())
        .collect::<Vec<_>>()
        .join("\n")
}

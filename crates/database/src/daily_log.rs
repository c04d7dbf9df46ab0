//! Daily workout log.
//!
//! A profile has at most one row per calendar day. The first write for a day
//! wins; later writes are ignored by the database, so concurrent
//! acknowledgments cannot produce duplicates or flip the completion flag.

use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::models::DailyLog;
use crate::Result;

/// Record the outcome for a day unless one is already stored.
///
/// Returns `true` if a new row was written, `false` if the day was already
/// logged.
pub async fn record_day(
    pool: &SqlitePool,
    profile_id: i64,
    date: NaiveDate,
    completed: bool,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO daily_logs (profile_id, log_date, completed)
        VALUES (?, ?, ?)
        ON CONFLICT(profile_id, log_date) DO NOTHING
        "#,
    )
    .bind(profile_id)
    .bind(date)
    .bind(completed)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Get the log row for a specific day.
pub async fn get_day(pool: &SqlitePool, profile_id: i64, date: NaiveDate) -> Result<Option<DailyLog>> {
    let record = sqlx::query_as::<_, DailyLog>(
        r#"
        SELECT id, profile_id, log_date, completed
        FROM daily_logs
        WHERE profile_id = ? AND log_date = ?
        "#,
    )
    .bind(profile_id)
    .bind(date)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

/// All days on which the profile completed a workout, newest first.
pub async fn completed_dates(pool: &SqlitePool, profile_id: i64) -> Result<Vec<NaiveDate>> {
    let dates = sqlx::query_scalar::<_, NaiveDate>(
        r#"
        SELECT log_date
        FROM daily_logs
        WHERE profile_id = ? AND completed = 1
        ORDER BY log_date DESC
        "#,
    )
    .bind(profile_id)
    .fetch_all(pool)
    .await?;

    Ok(dates)
}

/// Log rows in an inclusive date range, oldest first.
pub async fn logs_between(
    pool: &SqlitePool,
    profile_id: i64,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<DailyLog>> {
    let rows = sqlx::query_as::<_, DailyLog>(
        r#"
        SELECT id, profile_id, log_date, completed
        FROM daily_logs
        WHERE profile_id = ? AND log_date BETWEEN ? AND ?
        ORDER BY log_date
        "#,
    )
    .bind(profile_id)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Count log rows for a profile.
pub async fn count_logs(pool: &SqlitePool, profile_id: i64) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM daily_logs WHERE profile_id = ?
        "#,
    )
    .bind(profile_id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

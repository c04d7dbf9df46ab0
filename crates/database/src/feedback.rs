//! Post-workout feedback storage. Append-only.

use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::models::Feedback;
use crate::Result;

/// Store a feedback entry and return its ID.
pub async fn insert_feedback(
    pool: &SqlitePool,
    profile_id: i64,
    date: NaiveDate,
    rating: u8,
    comment: Option<&str>,
) -> Result<i64> {
    let id = sqlx::query(
        r#"
        INSERT INTO feedback (profile_id, feedback_date, rating, comment)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(profile_id)
    .bind(date)
    .bind(rating)
    .bind(comment)
    .execute(pool)
    .await?
    .last_insert_rowid();

    Ok(id)
}

/// List a profile's feedback, oldest first.
pub async fn list_feedback(pool: &SqlitePool, profile_id: i64) -> Result<Vec<Feedback>> {
    let rows = sqlx::query_as::<_, Feedback>(
        r#"
        SELECT id, profile_id, feedback_date, rating, comment, created_at
        FROM feedback
        WHERE profile_id = ?
        ORDER BY id
        "#,
    )
    .bind(profile_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

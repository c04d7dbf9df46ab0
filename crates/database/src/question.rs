//! Questions relayed from users to the administrator.

use sqlx::SqlitePool;

use crate::models::Question;
use crate::Result;

/// Open a new question and return its row ID.
///
/// The returned ID is what the administrator's answer action must carry.
pub async fn create_question(
    pool: &SqlitePool,
    profile_id: i64,
    chat_id: i64,
    text: &str,
) -> Result<i64> {
    let id = sqlx::query(
        r#"
        INSERT INTO questions (profile_id, chat_id, text, status)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(profile_id)
    .bind(chat_id)
    .bind(text)
    .bind(Question::OPEN)
    .execute(pool)
    .await?
    .last_insert_rowid();

    Ok(id)
}

/// Get a question by its own row ID.
pub async fn get_question(pool: &SqlitePool, id: i64) -> Result<Option<Question>> {
    let record = sqlx::query_as::<_, Question>(
        r#"
        SELECT id, profile_id, chat_id, text, asked_on, status
        FROM questions
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

/// Mark an open question as answered.
///
/// Returns `false` if the question does not exist or was already answered.
pub async fn mark_answered(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE questions
        SET status = ?
        WHERE id = ? AND status = ?
        "#,
    )
    .bind(Question::ANSWERED)
    .bind(id)
    .bind(Question::OPEN)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// List open questions, oldest first.
pub async fn list_open(pool: &SqlitePool) -> Result<Vec<Question>> {
    let rows = sqlx::query_as::<_, Question>(
        r#"
        SELECT id, profile_id, chat_id, text, asked_on, status
        FROM questions
        WHERE status = ?
        ORDER BY id
        "#,
    )
    .bind(Question::OPEN)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewProfile;
    use crate::{feedback, profile, Database};
    use chrono::NaiveDate;

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    async fn seed_profile(db: &Database, chat_id: i64) -> i64 {
        let new = NewProfile {
            name: format!("user{}", chat_id),
            age: 40,
            fitness_level: 1,
            reminder_time: "07:05".to_string(),
            chat_id,
            created_on: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            tags: ["Eyes".to_string()].into_iter().collect(),
        };
        profile::create_profile(db.pool(), &new).await.unwrap().id
    }

    #[tokio::test]
    async fn test_question_ids_are_their_own() {
        let db = test_db().await;

        // Make the profile id and the question id diverge.
        seed_profile(&db, 1).await;
        seed_profile(&db, 2).await;
        let asker = seed_profile(&db, 3).await;

        let qid = create_question(db.pool(), asker, 3, "How do I breathe?").await.unwrap();
        assert_ne!(qid, asker);

        let q = get_question(db.pool(), qid).await.unwrap().unwrap();
        assert_eq!(q.profile_id, asker);
        assert_eq!(q.chat_id, 3);
        assert!(q.is_open());
    }

    #[tokio::test]
    async fn test_mark_answered_once() {
        let db = test_db().await;
        let asker = seed_profile(&db, 9).await;
        let qid = create_question(db.pool(), asker, 9, "Rest days?").await.unwrap();

        assert_eq!(list_open(db.pool()).await.unwrap().len(), 1);
        assert!(mark_answered(db.pool(), qid).await.unwrap());
        assert!(!mark_answered(db.pool(), qid).await.unwrap());
        assert!(list_open(db.pool()).await.unwrap().is_empty());
        assert!(!mark_answered(db.pool(), 12345).await.unwrap());
    }

    #[tokio::test]
    async fn test_feedback_appends() {
        let db = test_db().await;
        let id = seed_profile(&db, 5).await;
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();

        feedback::insert_feedback(db.pool(), id, date, 4, Some("good")).await.unwrap();
        feedback::insert_feedback(db.pool(), id, date, 5, None).await.unwrap();

        let rows = feedback::list_feedback(db.pool(), id).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].rating, 4);
        assert_eq!(rows[0].comment.as_deref(), Some("good"));
        assert!(rows[1].comment.is_none());
    }
}

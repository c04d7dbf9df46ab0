//! Exercise catalog queries.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{Exercise, NewExercise};

/// Add an exercise and link it to its tags, creating unknown tags on the way.
pub async fn insert_exercise(pool: &SqlitePool, exercise: &NewExercise) -> Result<i64> {
    let mut tx = pool.begin().await?;

    let id = sqlx::query(
        r#"
        INSERT INTO exercises (name, level, description, repetitions)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&exercise.name)
    .bind(exercise.level)
    .bind(&exercise.description)
    .bind(&exercise.repetitions)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    for tag in &exercise.tags {
        sqlx::query(
            r#"
            INSERT INTO exercise_tags (name)
            VALUES (?)
            ON CONFLICT(name) DO NOTHING
            "#,
        )
        .bind(tag)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT OR IGNORE INTO exercise_tag_links (exercise_id, tag_id)
            SELECT ?, id FROM exercise_tags WHERE name = ?
            "#,
        )
        .bind(id)
        .bind(tag)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(id)
}

/// Get an exercise by ID.
pub async fn get_exercise(pool: &SqlitePool, id: i64) -> Result<Exercise> {
    sqlx::query_as::<_, Exercise>(
        r#"
        SELECT id, name, level, description, repetitions
        FROM exercises
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Exercise",
        id: id.to_string(),
    })
}

/// List exercises a profile with `level` and `tags` may receive.
///
/// An exercise is eligible when its level does not exceed `level` and it is
/// linked to at least one of `tags`. The tag list is bound as one JSON array
/// parameter and expanded on the database side.
pub async fn list_eligible(pool: &SqlitePool, level: u8, tags: &[String]) -> Result<Vec<Exercise>> {
    if tags.is_empty() {
        return Ok(Vec::new());
    }

    let tags_json = serde_json::to_string(tags)?;
    let exercises = sqlx::query_as::<_, Exercise>(
        r#"
        SELECT DISTINCT e.id, e.name, e.level, e.description, e.repetitions
        FROM exercises e
        INNER JOIN exercise_tag_links l ON l.exercise_id = e.id
        INNER JOIN exercise_tags t ON t.id = l.tag_id
        WHERE e.level <= ?
          AND t.name IN (SELECT value FROM json_each(?))
        ORDER BY e.id
        "#,
    )
    .bind(level)
    .bind(tags_json)
    .fetch_all(pool)
    .await?;

    Ok(exercises)
}

/// Tag names attached to an exercise.
pub async fn tags_for_exercise(pool: &SqlitePool, exercise_id: i64) -> Result<Vec<String>> {
    let tags = sqlx::query_scalar::<_, String>(
        r#"
        SELECT t.name
        FROM exercise_tags t
        INNER JOIN exercise_tag_links l ON l.tag_id = t.id
        WHERE l.exercise_id = ?
        ORDER BY t.name
        "#,
    )
    .bind(exercise_id)
    .fetch_all(pool)
    .await?;

    Ok(tags)
}

/// All known tag names, in catalog order.
pub async fn list_tag_names(pool: &SqlitePool) -> Result<Vec<String>> {
    let tags = sqlx::query_scalar::<_, String>(
        r#"
        SELECT name FROM exercise_tags ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    fn exercise(name: &str, level: u8, tags: &[&str]) -> NewExercise {
        NewExercise {
            name: name.to_string(),
            level,
            description: format!("{} description", name),
            repetitions: "3 x 10".to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn tags(names: &[&str]) -> Vec<String> {
        names.iter().map(|t| t.to_string()).collect()
    }

    #[tokio::test]
    async fn test_eligibility_filters_level_and_tags() {
        let db = test_db().await;

        let easy = insert_exercise(db.pool(), &exercise("Bridge", 1, &["Core"])).await.unwrap();
        let hard = insert_exercise(db.pool(), &exercise("Dragon flag", 5, &["Core"])).await.unwrap();
        let other = insert_exercise(db.pool(), &exercise("Wrist roll", 1, &["Grip"])).await.unwrap();

        let eligible = list_eligible(db.pool(), 3, &tags(&["Core"])).await.unwrap();
        let ids: Vec<i64> = eligible.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![easy]);
        assert!(!ids.contains(&hard));
        assert!(!ids.contains(&other));

        let eligible = list_eligible(db.pool(), 5, &tags(&["Core", "Grip"])).await.unwrap();
        let ids: Vec<i64> = eligible.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![easy, hard, other]);
    }

    #[tokio::test]
    async fn test_multi_tag_exercise_listed_once() {
        let db = test_db().await;

        let id = insert_exercise(db.pool(), &exercise("Bird dog", 2, &["Core", "Balance"]))
            .await
            .unwrap();

        let eligible = list_eligible(db.pool(), 2, &tags(&["Core", "Balance"])).await.unwrap();
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].id, id);
        assert_eq!(
            tags_for_exercise(db.pool(), id).await.unwrap(),
            vec!["Balance".to_string(), "Core".to_string()]
        );
    }

    #[tokio::test]
    async fn test_empty_tags_match_nothing() {
        let db = test_db().await;
        let eligible = list_eligible(db.pool(), 5, &[]).await.unwrap();
        assert!(eligible.is_empty());
    }

    #[tokio::test]
    async fn test_seeded_catalog() {
        let db = test_db().await;

        let names = list_tag_names(db.pool()).await.unwrap();
        assert_eq!(names, tags(&["Abs", "Stretching", "Arms", "Back", "Legs", "Eyes"]));

        let eligible = list_eligible(db.pool(), 1, &tags(&["Eyes"])).await.unwrap();
        assert_eq!(eligible.len(), 2);
        assert!(eligible.iter().all(|e| e.level <= 1));
    }

    #[tokio::test]
    async fn test_get_exercise_not_found() {
        let db = test_db().await;
        let result = get_exercise(db.pool(), 9999).await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }
}

//! Profile CRUD operations.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{NewProfile, Profile};

/// Column list shared by every profile query. Tags are folded into a JSON
/// array so a profile loads in a single round trip.
const PROFILE_SELECT: &str = r#"
    SELECT p.id, p.name, p.age, p.fitness_level, p.reminder_time, p.chat_id, p.created_on,
           (SELECT json_group_array(t.tag) FROM profile_tags t WHERE t.profile_id = p.id) AS tags
    FROM profiles p
"#;

/// Create a profile together with its tags.
///
/// Runs in a single transaction: either the profile and all of its tags are
/// stored, or nothing is. Fails with `AlreadyExists` if another active
/// profile is linked to the same chat.
pub async fn create_profile(pool: &SqlitePool, profile: &NewProfile) -> Result<Profile> {
    let mut tx = pool.begin().await?;

    let id = sqlx::query(
        r#"
        INSERT INTO profiles (name, age, fitness_level, reminder_time, chat_id, created_on)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&profile.name)
    .bind(profile.age)
    .bind(profile.fitness_level)
    .bind(&profile.reminder_time)
    .bind(profile.chat_id)
    .bind(profile.created_on)
    .execute(&mut *tx)
    .await
    .map_err(|e| DatabaseError::from_insert(e, "Profile", profile.chat_id))?
    .last_insert_rowid();

    for tag in &profile.tags {
        sqlx::query(
            r#"
            INSERT INTO profile_tags (profile_id, tag)
            VALUES (?, ?)
            "#,
        )
        .bind(id)
        .bind(tag)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::debug!(profile_id = id, chat_id = profile.chat_id, "Profile created");

    get_profile(pool, id).await
}

/// Get a profile by ID, active or not.
pub async fn get_profile(pool: &SqlitePool, id: i64) -> Result<Profile> {
    let query = format!("{PROFILE_SELECT} WHERE p.id = ?");
    sqlx::query_as::<_, Profile>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "Profile",
            id: id.to_string(),
        })
}

/// Find the active profile linked to a chat, if any.
pub async fn find_by_chat(pool: &SqlitePool, chat_id: i64) -> Result<Option<Profile>> {
    let query = format!("{PROFILE_SELECT} WHERE p.chat_id = ?");
    let profile = sqlx::query_as::<_, Profile>(&query)
        .bind(chat_id)
        .fetch_optional(pool)
        .await?;

    Ok(profile)
}

/// List every profile that is still linked to a chat.
pub async fn list_active_profiles(pool: &SqlitePool) -> Result<Vec<Profile>> {
    let query = format!("{PROFILE_SELECT} WHERE p.chat_id IS NOT NULL ORDER BY p.id");
    let profiles = sqlx::query_as::<_, Profile>(&query)
        .fetch_all(pool)
        .await?;

    Ok(profiles)
}

/// Deactivate a profile so its chat can register again.
///
/// Clears the chat link and tags the name; history rows stay attached to the
/// old profile id.
pub async fn deactivate_profile(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE profiles
        SET chat_id = NULL, name = '_Deactivated_' || name
        WHERE id = ? AND chat_id IS NOT NULL
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Active profile",
            id: id.to_string(),
        });
    }

    tracing::info!(profile_id = id, "Profile deactivated");
    Ok(())
}

/// Count profiles linked to a chat.
pub async fn count_active_profiles(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM profiles WHERE chat_id IS NOT NULL
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use chrono::NaiveDate;
    use std::collections::BTreeSet;

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    fn new_profile(chat_id: i64) -> NewProfile {
        NewProfile {
            name: "Anna".to_string(),
            age: 31,
            fitness_level: 3,
            reminder_time: "08:00".to_string(),
            chat_id,
            created_on: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            tags: ["Back", "Legs"].iter().map(|t| t.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_create_and_fetch() {
        let db = test_db().await;

        let created = create_profile(db.pool(), &new_profile(42)).await.unwrap();
        assert_eq!(created.name, "Anna");
        assert_eq!(created.chat_id, Some(42));
        assert_eq!(created.tags.len(), 2);
        assert!(created.tags.contains("Back"));

        let found = find_by_chat(db.pool(), 42).await.unwrap().unwrap();
        assert_eq!(found, created);

        assert!(find_by_chat(db.pool(), 7).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_chat_rejected() {
        let db = test_db().await;

        create_profile(db.pool(), &new_profile(42)).await.unwrap();
        let result = create_profile(db.pool(), &new_profile(42)).await;
        assert!(matches!(result, Err(DatabaseError::AlreadyExists { .. })));

        // The failed transaction must not leave orphan rows behind.
        assert_eq!(count_active_profiles(db.pool()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_deactivate_allows_replacement() {
        let db = test_db().await;

        let old = create_profile(db.pool(), &new_profile(42)).await.unwrap();
        deactivate_profile(db.pool(), old.id).await.unwrap();

        let old = get_profile(db.pool(), old.id).await.unwrap();
        assert!(!old.is_active());
        assert_eq!(old.name, "_Deactivated_Anna");

        let replacement = create_profile(db.pool(), &new_profile(42)).await.unwrap();
        assert_ne!(replacement.id, old.id);
        assert_eq!(
            find_by_chat(db.pool(), 42).await.unwrap().map(|p| p.id),
            Some(replacement.id)
        );

        // Deactivating twice is reported.
        let again = deactivate_profile(db.pool(), old.id).await;
        assert!(matches!(again, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_list_active_skips_deactivated() {
        let db = test_db().await;

        let a = create_profile(db.pool(), &new_profile(1)).await.unwrap();
        create_profile(db.pool(), &new_profile(2)).await.unwrap();
        deactivate_profile(db.pool(), a.id).await.unwrap();

        let active = list_active_profiles(db.pool()).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].chat_id, Some(2));
    }

    #[tokio::test]
    async fn test_profile_without_tags() {
        let db = test_db().await;

        let mut profile = new_profile(3);
        profile.tags = BTreeSet::new();
        let created = create_profile(db.pool(), &profile).await.unwrap();
        assert!(created.tags.is_empty());
    }
}

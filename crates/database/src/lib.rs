//! SQLite persistence layer for the training coach bot.
//!
//! This crate provides async database operations for profiles, the exercise
//! catalog, daily workout logs, feedback and admin questions using SQLx with
//! SQLite.
//!
//! # Example
//!
//! ```no_run
//! use database::{daily_log, profile, Database, NewProfile};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:coach.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     // Register a profile
//!     let new = NewProfile {
//!         name: "Anna".to_string(),
//!         age: 31,
//!         fitness_level: 3,
//!         reminder_time: "08:00".to_string(),
//!         chat_id: 123456789,
//!         created_on: chrono::Local::now().date_naive(),
//!         tags: ["Back".to_string()].into_iter().collect(),
//!     };
//!     let profile = profile::create_profile(db.pool(), &new).await?;
//!
//!     // Log today's workout
//!     daily_log::record_day(db.pool(), profile.id, new.created_on, true).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod daily_log;
pub mod error;
pub mod exercise;
pub mod feedback;
pub mod models;
pub mod profile;
pub mod question;
pub mod validation;

pub use error::{DatabaseError, Result};
pub use models::{DailyLog, Exercise, Feedback, NewExercise, NewProfile, Profile, Question};
pub use validation::ValidationError;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    /// The conversation handler and the reminder loop share the pool.
    const DEFAULT_POOL_SIZE: u32 = 8;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> database::Result<()> {
    /// // File database
    /// let db = database::Database::connect("sqlite:data/coach.db?mode=rwc").await?;
    ///
    /// // In-memory database (for testing)
    /// let db = database::Database::connect("sqlite::memory:").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(
            "Connected to database: {} (pool size: {})",
            url,
            pool_size
        );

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

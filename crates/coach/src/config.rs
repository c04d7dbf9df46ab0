//! Configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use chrono::Duration as ChronoDuration;
use thiserror::Error;

use crate::streak::DEFAULT_HISTORY_DAYS;

/// Longest follow-up grace period: one day.
pub const MAX_FOLLOW_UP_MINUTES: i64 = 24 * 60;

/// Longest history strip.
pub const MAX_HISTORY_DAYS: u32 = 366;

/// Default SQLite location.
pub const DEFAULT_SQLITE_PATH: &str = "./data/coach.db";

/// Coach bot configuration.
#[derive(Clone)]
pub struct CoachConfig {
    /// Bot API token.
    pub bot_token: String,
    /// Chat id of the administrator who answers questions.
    pub admin_chat_id: i64,
    /// SQLite connection URL.
    pub database_url: String,
    /// Scheduler tick interval.
    pub tick_interval: Duration,
    /// How long a reminder may stay unacknowledged before the follow-up.
    pub follow_up_after: ChronoDuration,
    /// Days shown in the history strip.
    pub history_days: u32,
    /// Bot API base URL override.
    pub api_url: Option<String>,
    /// Long-poll timeout for getUpdates.
    pub poll_timeout: Duration,
}

impl CoachConfig {
    /// Configuration with defaults for everything but the credentials.
    pub fn new(bot_token: impl Into<String>, admin_chat_id: i64) -> Self {
        Self {
            bot_token: bot_token.into(),
            admin_chat_id,
            database_url: sqlite_url(DEFAULT_SQLITE_PATH),
            tick_interval: Duration::from_secs(60),
            follow_up_after: ChronoDuration::minutes(15),
            history_days: DEFAULT_HISTORY_DAYS,
            api_url: None,
            poll_timeout: Duration::from_secs(30),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `TELEGRAM_BOT_TOKEN` | Bot API token | (required) |
    /// | `COACH_ADMIN_CHAT_ID` | Administrator chat id | (required) |
    /// | `SQLITE_PATH` | SQLite path or `sqlite:` URL | `./data/coach.db` |
    /// | `COACH_TICK_SECS` | Scheduler tick interval | `60` |
    /// | `COACH_FOLLOW_UP_MINUTES` | Follow-up grace period, 1 to 1440 | `15` |
    /// | `COACH_HISTORY_DAYS` | History strip length, 1 to 366 | `28` |
    /// | `TELEGRAM_API_URL` | Bot API base URL | `https://api.telegram.org` |
    /// | `TELEGRAM_POLL_TIMEOUT_SECS` | Long-poll timeout | `30` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let bot_token = env::var("TELEGRAM_BOT_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::Missing("TELEGRAM_BOT_TOKEN"))?;

        let admin_chat_id = env::var("COACH_ADMIN_CHAT_ID")
            .map_err(|_| ConfigError::Missing("COACH_ADMIN_CHAT_ID"))
            .and_then(|raw| parse_var("COACH_ADMIN_CHAT_ID", &raw))?;

        let mut config = Self::new(bot_token, admin_chat_id);

        if let Ok(path) = env::var("SQLITE_PATH") {
            config.database_url = sqlite_url(&path);
        }
        if let Some(secs) = optional_var::<u64>("COACH_TICK_SECS")? {
            if secs == 0 {
                return Err(ConfigError::Invalid {
                    name: "COACH_TICK_SECS",
                    value: secs.to_string(),
                });
            }
            config.tick_interval = Duration::from_secs(secs);
        }
        if let Some(minutes) = optional_var::<i64>("COACH_FOLLOW_UP_MINUTES")? {
            config.follow_up_after = follow_up_grace(minutes)?;
        }
        if let Some(days) = optional_var::<u32>("COACH_HISTORY_DAYS")? {
            config.history_days = history_window(days)?;
        }
        config.api_url = env::var("TELEGRAM_API_URL").ok();
        if let Some(secs) = optional_var::<u64>("TELEGRAM_POLL_TIMEOUT_SECS")? {
            config.poll_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

// The token is a credential; keep it out of logs.
impl std::fmt::Debug for CoachConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoachConfig")
            .field("admin_chat_id", &self.admin_chat_id)
            .field("database_url", &self.database_url)
            .field("tick_interval", &self.tick_interval)
            .field("follow_up_after", &self.follow_up_after)
            .field("history_days", &self.history_days)
            .field("api_url", &self.api_url)
            .field("poll_timeout", &self.poll_timeout)
            .finish_non_exhaustive()
    }
}

/// Turn a bare file path into a SQLite URL that creates the file on demand.
pub fn sqlite_url(path: &str) -> String {
    if path.starts_with("sqlite:") {
        path.to_string()
    } else {
        format!("sqlite:{}?mode=rwc", path)
    }
}

/// The follow-up must come strictly after the reminder's own tick.
fn follow_up_grace(minutes: i64) -> Result<ChronoDuration, ConfigError> {
    if !(1..=MAX_FOLLOW_UP_MINUTES).contains(&minutes) {
        return Err(ConfigError::Invalid {
            name: "COACH_FOLLOW_UP_MINUTES",
            value: minutes.to_string(),
        });
    }
    Ok(ChronoDuration::minutes(minutes))
}

fn history_window(days: u32) -> Result<u32, ConfigError> {
    if !(1..=MAX_HISTORY_DAYS).contains(&days) {
        return Err(ConfigError::Invalid {
            name: "COACH_HISTORY_DAYS",
            value: days.to_string(),
        });
    }
    Ok(days)
}

fn parse_var<T: FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: raw.to_string(),
    })
}

fn optional_var<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => parse_var(name, &raw).map(Some),
        Err(_) => Ok(None),
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_url() {
        assert_eq!(sqlite_url("./data/coach.db"), "sqlite:./data/coach.db?mode=rwc");
        assert_eq!(sqlite_url("sqlite::memory:"), "sqlite::memory:");
        assert_eq!(sqlite_url("sqlite:x.db?mode=ro"), "sqlite:x.db?mode=ro");
    }

    #[test]
    fn test_defaults() {
        let config = CoachConfig::new("1:abc", 42);
        assert_eq!(config.admin_chat_id, 42);
        assert_eq!(config.tick_interval, Duration::from_secs(60));
        assert_eq!(config.follow_up_after, ChronoDuration::minutes(15));
        assert_eq!(config.history_days, 28);
        assert!(!format!("{:?}", config).contains("1:abc"));
    }

    #[test]
    fn test_follow_up_grace_bounds() {
        assert_eq!(follow_up_grace(15).unwrap(), ChronoDuration::minutes(15));
        assert_eq!(follow_up_grace(1).unwrap(), ChronoDuration::minutes(1));
        assert!(follow_up_grace(MAX_FOLLOW_UP_MINUTES).is_ok());

        for bad in [0, -5, MAX_FOLLOW_UP_MINUTES + 1] {
            assert!(matches!(
                follow_up_grace(bad),
                Err(ConfigError::Invalid { name: "COACH_FOLLOW_UP_MINUTES", .. })
            ));
        }
    }

    #[test]
    fn test_history_window_bounds() {
        assert_eq!(history_window(28).unwrap(), 28);
        assert_eq!(history_window(MAX_HISTORY_DAYS).unwrap(), MAX_HISTORY_DAYS);

        for bad in [0, MAX_HISTORY_DAYS + 1, 1_000_000_000] {
            assert!(matches!(
                history_window(bad),
                Err(ConfigError::Invalid { name: "COACH_HISTORY_DAYS", .. })
            ));
        }
    }

    #[test]
    fn test_parse_var() {
        assert_eq!(parse_var::<i64>("X", " -100 ").unwrap(), -100);
        assert!(matches!(
            parse_var::<u64>("X", "soon"),
            Err(ConfigError::Invalid { name: "X", .. })
        ));
    }
}

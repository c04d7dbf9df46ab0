//! Input validation for profile and feedback fields.
//!
//! Every parser here takes raw chat text and either returns the normalized
//! value or a [`ValidationError`] the conversation layer turns into a
//! re-prompt.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Validation error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Age is not a non-negative integer.
    InvalidAge(String),
    /// Fitness level outside 1..=5 or not a number.
    InvalidFitnessLevel(String),
    /// Rating outside 1..=5 or not a number.
    InvalidRating(String),
    /// Reminder time does not look like `HH:MM`.
    InvalidTimeFormat(String),
    /// Reminder time has an hour above 23 or a minute above 59.
    TimeOutOfRange { hour: u32, minute: u32 },
    /// Empty value where one is required.
    Empty(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidAge(input) => write!(f, "Invalid age: {:?}", input),
            ValidationError::InvalidFitnessLevel(input) => {
                write!(f, "Invalid fitness level: {:?} (expected 1-5)", input)
            }
            ValidationError::InvalidRating(input) => {
                write!(f, "Invalid rating: {:?} (expected 1-5)", input)
            }
            ValidationError::InvalidTimeFormat(input) => {
                write!(f, "Invalid time: {:?} (expected HH:MM)", input)
            }
            ValidationError::TimeOutOfRange { hour, minute } => {
                write!(f, "Time {}:{} is out of range (00:00-23:59)", hour, minute)
            }
            ValidationError::Empty(field) => write!(f, "{} cannot be empty", field),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Lowest fitness level / rating.
pub const MIN_SCALE: u8 = 1;

/// Highest fitness level / rating.
pub const MAX_SCALE: u8 = 5;

static TIME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{1,2}):([0-9]{1,2})$").expect("static regex"));

/// Parse an age. Only plain ASCII digits are accepted.
pub fn parse_age(input: &str) -> Result<u32, ValidationError> {
    if input.is_empty() || !input.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidAge(input.to_string()));
    }

    input
        .parse::<u32>()
        .map_err(|_| ValidationError::InvalidAge(input.to_string()))
}

fn parse_scale(input: &str) -> Option<u8> {
    match input {
        "1" | "2" | "3" | "4" | "5" => input.parse().ok(),
        _ => None,
    }
}

/// Parse a fitness level. Input must be exactly one of `1`..`5`.
pub fn parse_fitness_level(input: &str) -> Result<u8, ValidationError> {
    parse_scale(input).ok_or_else(|| ValidationError::InvalidFitnessLevel(input.to_string()))
}

/// Parse a feedback rating. Input must be exactly one of `1`..`5`.
pub fn parse_rating(input: &str) -> Result<u8, ValidationError> {
    parse_scale(input).ok_or_else(|| ValidationError::InvalidRating(input.to_string()))
}

/// Parse and normalize a reminder time.
///
/// Accepts one or two digits for the hour and the minute (`7:5`, `07:05`,
/// `23:59`) and returns the zero-padded `HH:MM` form. Surrounding whitespace
/// is ignored.
pub fn normalize_reminder_time(input: &str) -> Result<String, ValidationError> {
    let input = input.trim();

    let caps = TIME_PATTERN
        .captures(input)
        .ok_or_else(|| ValidationError::InvalidTimeFormat(input.to_string()))?;

    // At most two ASCII digits each, so these cannot overflow.
    let hour: u32 = caps[1].parse().map_err(|_| ValidationError::InvalidTimeFormat(input.to_string()))?;
    let minute: u32 = caps[2].parse().map_err(|_| ValidationError::InvalidTimeFormat(input.to_string()))?;

    if hour > 23 || minute > 59 {
        return Err(ValidationError::TimeOutOfRange { hour, minute });
    }

    Ok(format!("{:02}:{:02}", hour, minute))
}

/// Normalize a tag token for storage.
pub fn normalize_tag(input: &str) -> Result<String, ValidationError> {
    let tag = input.trim();
    if tag.is_empty() {
        return Err(ValidationError::Empty("tag".to_string()));
    }
    Ok(tag.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_age() {
        assert_eq!(parse_age("0"), Ok(0));
        assert_eq!(parse_age("34"), Ok(34));

        assert!(matches!(parse_age(""), Err(ValidationError::InvalidAge(_))));
        assert!(matches!(parse_age("-3"), Err(ValidationError::InvalidAge(_))));
        assert!(matches!(parse_age("+3"), Err(ValidationError::InvalidAge(_))));
        assert!(matches!(parse_age("thirty"), Err(ValidationError::InvalidAge(_))));
        assert!(matches!(parse_age("3.5"), Err(ValidationError::InvalidAge(_))));
        // Overflows u32
        assert!(matches!(parse_age("99999999999"), Err(ValidationError::InvalidAge(_))));
    }

    #[test]
    fn test_parse_scales() {
        for n in MIN_SCALE..=MAX_SCALE {
            assert_eq!(parse_fitness_level(&n.to_string()), Ok(n));
            assert_eq!(parse_rating(&n.to_string()), Ok(n));
        }

        for bad in ["0", "6", "", "01", " 3", "five"] {
            assert!(matches!(
                parse_fitness_level(bad),
                Err(ValidationError::InvalidFitnessLevel(_))
            ));
            assert!(matches!(parse_rating(bad), Err(ValidationError::InvalidRating(_))));
        }
    }

    #[test]
    fn test_reminder_time_normalized() {
        assert_eq!(normalize_reminder_time("8:00").unwrap(), "08:00");
        assert_eq!(normalize_reminder_time("7:5").unwrap(), "07:05");
        assert_eq!(normalize_reminder_time("00:00").unwrap(), "00:00");
        assert_eq!(normalize_reminder_time("23:59").unwrap(), "23:59");
        assert_eq!(normalize_reminder_time(" 19:30 ").unwrap(), "19:30");
    }

    #[test]
    fn test_reminder_time_exhaustive_range() {
        for hour in 0..=23u32 {
            for minute in 0..=59u32 {
                let expected = format!("{:02}:{:02}", hour, minute);
                assert_eq!(normalize_reminder_time(&format!("{}:{}", hour, minute)).unwrap(), expected);
                assert_eq!(normalize_reminder_time(&expected).unwrap(), expected);
            }
        }
    }

    #[test]
    fn test_reminder_time_rejected() {
        assert!(matches!(
            normalize_reminder_time("24:00"),
            Err(ValidationError::TimeOutOfRange { hour: 24, minute: 0 })
        ));
        assert!(matches!(
            normalize_reminder_time("12:60"),
            Err(ValidationError::TimeOutOfRange { .. })
        ));

        for bad in ["", "8", "8:", ":30", "8.30", "008:00", "08:000", "8h30", "08:00pm", "a:b", "08 : 00"] {
            assert!(
                matches!(normalize_reminder_time(bad), Err(ValidationError::InvalidTimeFormat(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_normalize_tag() {
        assert_eq!(normalize_tag("  Back "), Ok("Back".to_string()));
        assert!(matches!(normalize_tag("   "), Err(ValidationError::Empty(_))));
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::TimeOutOfRange { hour: 25, minute: 0 };
        assert_eq!(err.to_string(), "Time 25:0 is out of range (00:00-23:59)");

        let err = ValidationError::Empty("tag".to_string());
        assert_eq!(err.to_string(), "tag cannot be empty");
    }
}

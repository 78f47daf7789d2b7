//! Countdown formatting module
//!
//! Turns an episode air time into the short "time left" label shown next to
//! every upcoming episode, e.g. `2d 4h 13m`.

use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;

/// Time remaining until an episode airs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    /// The air time is now or in the past
    AlreadyAired,
    /// The air time is in the future
    Remaining { days: i64, hours: i64, minutes: i64 },
    /// The air date could not be parsed
    InvalidDate,
}

impl Countdown {
    /// Whether a countdown should be displayed at all
    pub fn is_upcoming(&self) -> bool {
        matches!(self, Countdown::Remaining { .. })
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Countdown::AlreadyAired => write!(f, "Already aired"),
            Countdown::Remaining {
                days,
                hours,
                minutes,
            } => write!(f, "{}d {}h {}m", days, hours, minutes),
            Countdown::InvalidDate => write!(f, "Invalid date"),
        }
    }
}

/// Computes the countdown from `now` to `target`
///
/// Seconds are discarded, so 90 seconds left renders as `0d 0h 1m`.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, Utc};
/// use showdown::countdown::countdown;
///
/// let now = Utc::now();
/// let label = countdown(now + Duration::minutes(90), now).to_string();
/// assert_eq!(label, "0d 1h 30m");
/// ```
pub fn countdown(target: DateTime<Utc>, now: DateTime<Utc>) -> Countdown {
    if target <= now {
        return Countdown::AlreadyAired;
    }

    let diff = (target - now).num_seconds();

    Countdown::Remaining {
        days: diff / DAY,
        hours: (diff % DAY) / HOUR,
        minutes: (diff % HOUR) / MINUTE,
    }
}

/// Computes the countdown for an air date given as text
///
/// Accepts RFC 3339 timestamps (`2025-03-01T01:00:00+00:00`) and plain dates
/// (`2025-03-01`, interpreted as midnight UTC).
pub fn countdown_from_str(airdate: &str, now: DateTime<Utc>) -> Countdown {
    match parse_air_time(airdate) {
        Some(target) => countdown(target, now),
        None => Countdown::InvalidDate,
    }
}

/// Parses an upstream air date or air stamp into an instant
pub fn parse_air_time(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(stamp) = DateTime::parse_from_rfc3339(value) {
        return Some(stamp.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Formats an air time as `DD-MM-YYYY` for display next to a countdown
pub fn format_airdate(airdate: DateTime<Utc>) -> String {
    airdate.format("%d-%m-%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_past_and_present_are_already_aired() {
        assert_eq!(countdown(now(), now()), Countdown::AlreadyAired);
        assert_eq!(
            countdown(now() - Duration::days(3), now()),
            Countdown::AlreadyAired
        );
        assert!(!Countdown::AlreadyAired.is_upcoming());
        assert_eq!(Countdown::AlreadyAired.to_string(), "Already aired");
    }

    #[test]
    fn test_ninety_minutes() {
        let result = countdown(now() + Duration::minutes(90), now());
        assert_eq!(result.to_string(), "0d 1h 30m");
        assert!(result.is_upcoming());
    }

    #[test]
    fn test_days_hours_minutes() {
        let target = now() + Duration::days(1) + Duration::hours(2) + Duration::minutes(5);
        assert_eq!(countdown(target, now()).to_string(), "1d 2h 5m");
    }

    #[test]
    fn test_seconds_are_floored() {
        let target = now() + Duration::minutes(10) + Duration::seconds(59);
        assert_eq!(countdown(target, now()).to_string(), "0d 0h 10m");

        // Less than a minute left is still upcoming
        let target = now() + Duration::seconds(30);
        assert_eq!(countdown(target, now()).to_string(), "0d 0h 0m");
        assert!(countdown(target, now()).is_upcoming());
    }

    #[test]
    fn test_no_upper_bound_on_days() {
        let target = now() + Duration::days(400) + Duration::hours(23);
        assert_eq!(countdown(target, now()).to_string(), "400d 23h 0m");
    }

    #[test]
    fn test_from_str_accepts_dates_and_stamps() {
        assert_eq!(
            countdown_from_str("2025-03-02", now()).to_string(),
            "0d 12h 0m"
        );
        assert_eq!(
            countdown_from_str("2025-03-01T13:30:00+00:00", now()).to_string(),
            "0d 1h 30m"
        );
        assert_eq!(
            countdown_from_str("2025-02-01", now()),
            Countdown::AlreadyAired
        );
    }

    #[test]
    fn test_from_str_invalid_date() {
        assert_eq!(countdown_from_str("", now()), Countdown::InvalidDate);
        assert_eq!(
            countdown_from_str("next tuesday", now()).to_string(),
            "Invalid date"
        );
    }

    #[test]
    fn test_format_airdate() {
        assert_eq!(format_airdate(now()), "01-03-2025");
    }
}

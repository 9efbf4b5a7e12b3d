//! Time formatting for progress and status output.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Format a timestamp relative to now (e.g. "3 hours ago").
pub fn format_relative_time(timestamp: DateTime<Utc>) -> String {
    let seconds = Utc::now().signed_duration_since(timestamp).num_seconds();
    if seconds < 60 {
        return "just now".to_string();
    }

    const UNITS: [(i64, &str); 4] = [
        (60 * 60 * 24 * 365, "year"),
        (60 * 60 * 24, "day"),
        (60 * 60, "hour"),
        (60, "minute"),
    ];

    for (size, unit) in UNITS {
        let count = seconds / size;
        if count >= 1 {
            let plural = if count == 1 { "" } else { "s" };
            return format!("{} {}{} ago", count, unit, plural);
        }
    }

    "just now".to_string()
}

/// Format a duration for display.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 1.0 {
        format!("{}ms", d.as_millis())
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.1}m", secs / 60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_time_just_now() {
        assert_eq!(format_relative_time(Utc::now()), "just now");
    }

    #[test]
    fn relative_time_future_shows_just_now() {
        let ts = Utc::now() + chrono::Duration::hours(1);
        assert_eq!(format_relative_time(ts), "just now");
    }

    #[test]
    fn relative_time_one_minute() {
        let ts = Utc::now() - chrono::Duration::minutes(1);
        assert_eq!(format_relative_time(ts), "1 minute ago");
    }

    #[test]
    fn relative_time_hours() {
        let ts = Utc::now() - chrono::Duration::hours(5);
        assert_eq!(format_relative_time(ts), "5 hours ago");
    }

    #[test]
    fn relative_time_days() {
        let ts = Utc::now() - chrono::Duration::days(12);
        assert_eq!(format_relative_time(ts), "12 days ago");
    }

    #[test]
    fn relative_time_years() {
        let ts = Utc::now() - chrono::Duration::days(800);
        assert_eq!(format_relative_time(ts), "2 years ago");
    }

    #[test]
    fn format_duration_milliseconds() {
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
    }

    #[test]
    fn format_duration_seconds() {
        assert_eq!(format_duration(Duration::from_secs_f64(5.3)), "5.3s");
    }

    #[test]
    fn format_duration_minutes() {
        assert_eq!(format_duration(Duration::from_secs(90)), "1.5m");
    }
}

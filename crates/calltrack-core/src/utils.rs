//! Formatting and input helpers for calltrack

use crate::Result;
use chrono::{DateTime, Utc};

/// Format a call length as `Duration: {m}m {s}s`
#[must_use]
pub fn format_call_duration(seconds: u32) -> String {
    let minutes = seconds / 60;
    let secs = seconds % 60;
    format!("Duration: {minutes}m {secs}s")
}

/// Describe when an appointment is scheduled, e.g. `Scheduled for Jan 5, 2026 at 2:30 PM`
#[must_use]
pub fn format_scheduled_for(scheduled: &DateTime<Utc>) -> String {
    format!(
        "Scheduled for {} at {}",
        scheduled.format("%b %-d, %Y"),
        scheduled.format("%-I:%M %p")
    )
}

/// Calendar date used once a timestamp is a week or more old
#[must_use]
pub fn format_calendar_date(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%-m/%-d/%Y").to_string()
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("{count} {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}

/// Format `timestamp` relative to `now`
///
/// Minutes below an hour, hours below a day, days below a week, otherwise a
/// calendar date. Units are singular exactly when the count is 1. Timestamps
/// after `now` count as zero elapsed.
#[must_use]
pub fn format_relative_time(timestamp: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(*timestamp);

    let minutes = elapsed.num_minutes().max(0);
    if minutes < 60 {
        return plural(minutes, "min");
    }

    let hours = elapsed.num_hours();
    if hours < 24 {
        return plural(hours, "hour");
    }

    let days = elapsed.num_days();
    if days < 7 {
        return plural(days, "day");
    }

    format_calendar_date(timestamp)
}

/// Keep only the ASCII digits of a one-time code typed by the user
#[must_use]
pub fn sanitize_otp_input(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

/// Sanitize `input` and require exactly `digits` digits
///
/// # Errors
///
/// Returns a validation error on the `code` field when the sanitized input
/// has the wrong length.
pub fn parse_otp_code(input: &str, digits: usize) -> Result<String> {
    let code = sanitize_otp_input(input);
    if code.len() == digits {
        Ok(code)
    } else {
        Err(crate::Error::validation(
            "code",
            format!("Code must be exactly {digits} digits"),
        ))
    }
}

/// Render backup codes for download, one code per line
#[must_use]
pub fn backup_codes_text(codes: &[String]) -> String {
    let mut text = codes.join("\n");
    if !text.is_empty() {
        text.push('\n');
    }
    text
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap()
    }

    #[rstest]
    #[case(Duration::zero(), "0 mins ago")]
    #[case(Duration::minutes(1), "1 min ago")]
    #[case(Duration::minutes(5), "5 mins ago")]
    #[case(Duration::minutes(59), "59 mins ago")]
    #[case(Duration::minutes(60), "1 hour ago")]
    #[case(Duration::hours(2), "2 hours ago")]
    #[case(Duration::hours(23), "23 hours ago")]
    #[case(Duration::hours(25), "1 day ago")]
    #[case(Duration::days(6), "6 days ago")]
    fn test_format_relative_time(#[case] ago: Duration, #[case] expected: &str) {
        let now = now();
        assert_eq!(format_relative_time(&(now - ago), &now), expected);
    }

    #[test]
    fn test_format_relative_time_falls_back_to_date() {
        let now = now();
        let week_old = now - Duration::days(7);
        assert_eq!(format_relative_time(&week_old, &now), "3/8/2026");
    }

    #[test]
    fn test_format_relative_time_future_clamps() {
        let now = now();
        let future = now + Duration::minutes(10);
        assert_eq!(format_relative_time(&future, &now), "0 mins ago");
    }

    #[rstest]
    #[case(0, "Duration: 0m 0s")]
    #[case(59, "Duration: 0m 59s")]
    #[case(125, "Duration: 2m 5s")]
    #[case(3600, "Duration: 60m 0s")]
    fn test_format_call_duration(#[case] seconds: u32, #[case] expected: &str) {
        assert_eq!(format_call_duration(seconds), expected);
    }

    #[test]
    fn test_format_scheduled_for() {
        let scheduled = Utc.with_ymd_and_hms(2026, 1, 5, 14, 30, 0).unwrap();
        assert_eq!(
            format_scheduled_for(&scheduled),
            "Scheduled for Jan 5, 2026 at 2:30 PM"
        );
    }

    #[test]
    fn test_parse_otp_code() {
        assert_eq!(parse_otp_code("123456", 6).unwrap(), "123456");
        assert_eq!(parse_otp_code("123 456", 6).unwrap(), "123456");
        assert_eq!(parse_otp_code("12-34-56", 6).unwrap(), "123456");
        assert!(parse_otp_code("12345", 6).is_err());
        assert!(parse_otp_code("1234567", 6).is_err());
        assert!(parse_otp_code("abcdef", 6).is_err());
    }

    #[test]
    fn test_parse_otp_code_error_names_field() {
        match parse_otp_code("12345", 6) {
            Err(crate::Error::Validation { field, .. }) => assert_eq!(field, "code"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_backup_codes_text() {
        let codes = vec!["AAAA-1111".to_string(), "BBBB-2222".to_string()];
        assert_eq!(backup_codes_text(&codes), "AAAA-1111\nBBBB-2222\n");
        assert_eq!(backup_codes_text(&[]), "");
    }

    proptest! {
        #[test]
        fn sanitized_otp_is_all_digits(input in ".*") {
            let sanitized = sanitize_otp_input(&input);
            prop_assert!(sanitized.chars().all(|c| c.is_ascii_digit()));
        }

        #[test]
        fn relative_time_under_an_hour_counts_minutes(minutes in 0i64..60) {
            let now = now();
            let formatted = format_relative_time(&(now - Duration::minutes(minutes)), &now);
            let expected = format!("{minutes} min");
            prop_assert!(formatted.starts_with(&expected));
        }
    }
}

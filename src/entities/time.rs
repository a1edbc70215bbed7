//! Natural-language time parsing
//!
//! Resolves English date/time phrases ("tomorrow at 10:30", "next friday
//! 9am", "Make it 11:00") to an absolute UTC instant against a reference
//! clock. Date-only phrases land on noon; time-only phrases land on the
//! next occurrence of that clock time.

use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Utc, Weekday};
use regex::Regex;
use std::sync::OnceLock;

fn hour_minute_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(\d{1,2}):(\d{2})\s*(am|pm)?").expect("valid clock regex"))
}

fn hour_meridiem_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(\d{1,2})\s*(am|pm)\b").expect("valid clock regex"))
}

fn at_hour_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bat\s+(\d{1,2})\b").expect("valid clock regex"))
}

const WEEKDAYS: &[(&str, Weekday)] = &[
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("sunday", Weekday::Sun),
];

fn adjust_meridiem(hour: u32, meridiem: Option<&str>) -> u32 {
    match meridiem {
        Some("am") if hour == 12 => 0,
        Some("pm") if hour < 12 => hour + 12,
        _ => hour,
    }
}

/// Find a clock time, most specific form first: `10:30[am]`, `9am`, `at 9`
fn parse_clock(lower: &str) -> Option<NaiveTime> {
    if let Some(captures) = hour_minute_re().captures(lower) {
        let hour = captures[1].parse::<u32>().ok()?;
        let minute = captures[2].parse::<u32>().ok()?;
        let hour = adjust_meridiem(hour, captures.get(3).map(|m| m.as_str()));
        return NaiveTime::from_hms_opt(hour, minute, 0);
    }

    if let Some(captures) = hour_meridiem_re().captures(lower) {
        let hour = captures[1].parse::<u32>().ok()?;
        let hour = adjust_meridiem(hour, Some(&captures[2]));
        return NaiveTime::from_hms_opt(hour, 0, 0);
    }

    if let Some(captures) = at_hour_re().captures(lower) {
        let hour = captures[1].parse::<u32>().ok()?;
        return NaiveTime::from_hms_opt(hour, 0, 0);
    }

    None
}

/// Parse a date/time phrase against the given reference instant
pub fn parse_time_at(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let lower = text.to_lowercase();

    let date = if lower.contains("tomorrow") {
        Some(now.date_naive() + Duration::days(1))
    } else if lower.contains("today") {
        Some(now.date_naive())
    } else {
        WEEKDAYS
            .iter()
            .find(|(word, _)| lower.contains(word))
            .map(|(_, weekday)| {
                let today = now.date_naive();
                let ahead = (weekday.num_days_from_monday() + 7
                    - today.weekday().num_days_from_monday())
                    % 7;
                // A bare weekday always means a future one.
                let ahead = if ahead == 0 { 7 } else { ahead };
                today + Duration::days(ahead as i64)
            })
    };

    let time = parse_clock(&lower);

    let naive = match (date, time) {
        (None, None) => return None,
        (Some(date), Some(time)) => date.and_time(time),
        (Some(date), None) => date.and_time(NaiveTime::from_hms_opt(12, 0, 0)?),
        (None, Some(time)) => {
            let candidate = now.date_naive().and_time(time);
            if candidate <= now.naive_utc() {
                candidate + Duration::days(1)
            } else {
                candidate
            }
        }
    };

    Utc.from_local_datetime(&naive).single()
}

/// Parse a date/time phrase against the server clock, returning ISO-8601 UTC
pub fn parse_time(text: &str) -> Option<DateTime<Utc>> {
    parse_time_at(text, Utc::now())
}

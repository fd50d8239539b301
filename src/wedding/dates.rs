// SPDX-License-Identifier: PMPL-1.0-or-later

//! Date and time helpers for the event details section.

use anyhow::{anyhow, Result};
use chrono::{
    DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc,
};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use tracing::error;
use url::form_urlencoded;

pub const DEFAULT_DATE_PATTERN: &str = "%B %d, %Y";
const CALENDAR_BASE: &str = "https://calendar.google.com/calendar/render";
const MAPS_BASE: &str = "https://www.google.com/maps/search/";
const DEFAULT_EVENT_HOURS: i64 = 2;

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM[:SS]`, or RFC 3339. Offsets
/// are dropped and the wall-clock time kept.
pub fn parse_iso(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(value) {
        return Some(with_offset.naive_local());
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, pattern) {
            return Some(parsed);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN))
}

/// `HH:MM` or `HH:MM:SS`, 24-hour.
pub fn parse_clock_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

/// `+07:00`, `-0330`, `Z`.
pub fn parse_utc_offset(value: &str) -> Option<FixedOffset> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("z") || value.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0);
    }
    let (sign, rest) = match value.as_bytes().first()? {
        b'+' => (1, &value[1..]),
        b'-' => (-1, &value[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    if hours > 14 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Format an ISO date with a strftime pattern. Unparseable input or an
/// unusable pattern returns `value` unchanged.
pub fn format_event_date(value: &str, pattern: Option<&str>) -> String {
    let pattern = pattern.unwrap_or(DEFAULT_DATE_PATTERN);
    let Some(parsed) = parse_iso(value) else {
        error!(value, "error formatting date");
        return value.to_string();
    };
    let mut out = String::new();
    if write!(out, "{}", parsed.format(pattern)).is_err() {
        error!(value, pattern, "error formatting date");
        return value.to_string();
    }
    out
}

/// Whole days from `now` to `value`, truncated toward zero. Negative once
/// the date has passed; 0 if `value` does not parse.
pub fn days_until(value: &str, now: NaiveDateTime) -> i64 {
    match parse_iso(value) {
        Some(target) => (target - now).num_days(),
        None => {
            error!(value, "error calculating days until");
            0
        }
    }
}

/// `18:30` becomes `6:30 PM`. Malformed input is returned unchanged.
pub fn format_time(value: &str) -> String {
    let Some((hours, minutes)) = value.split_once(':') else {
        return value.to_string();
    };
    let Ok(hour) = hours.trim().parse::<u32>() else {
        error!(value, "error formatting time");
        return value.to_string();
    };
    let meridiem = if hour >= 12 { "PM" } else { "AM" };
    let display_hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{}:{} {}", display_hour, minutes, meridiem)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub title: String,
    pub start_date: String,
    pub start_time: String,
    /// Defaults to two hours after the start.
    pub end_time: Option<String>,
    /// Venue offset such as `+07:00`; UTC when absent.
    pub utc_offset: Option<String>,
    pub location: String,
    pub description: Option<String>,
}

fn calendar_stamp(instant: DateTime<Utc>) -> String {
    instant.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Google Calendar "add event" link.
pub fn calendar_url(event: &CalendarEvent) -> Result<String> {
    let offset = match event.utc_offset.as_deref() {
        Some(raw) => {
            parse_utc_offset(raw).ok_or_else(|| anyhow!("invalid utc offset '{}'", raw))?
        }
        None => Utc.fix(),
    };
    let date = NaiveDate::parse_from_str(event.start_date.trim(), "%Y-%m-%d")
        .map_err(|err| anyhow!("invalid start date '{}': {}", event.start_date, err))?;
    let at = |time: &str| -> Result<DateTime<Utc>> {
        let time = parse_clock_time(time).ok_or_else(|| anyhow!("invalid time '{}'", time))?;
        offset
            .from_local_datetime(&date.and_time(time))
            .single()
            .map(|local| local.with_timezone(&Utc))
            .ok_or_else(|| anyhow!("ambiguous local time {}", time))
    };

    let start = at(&event.start_time)?;
    let end = match event.end_time.as_deref() {
        Some(end) => at(end)?,
        None => start + Duration::hours(DEFAULT_EVENT_HOURS),
    };

    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("action", "TEMPLATE")
        .append_pair("text", &event.title)
        .append_pair(
            "dates",
            &format!("{}/{}", calendar_stamp(start), calendar_stamp(end)),
        )
        .append_pair("location", &event.location)
        .append_pair("details", event.description.as_deref().unwrap_or(""))
        .finish();
    Ok(format!("{}?{}", CALENDAR_BASE, query))
}

/// Google Maps search link for a venue address.
pub fn directions_url(address: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("api", "1")
        .append_pair("query", address)
        .finish();
    format!("{}?{}", MAPS_BASE, query)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noon(date: &str) -> NaiveDateTime {
        parse_iso(date).unwrap() + Duration::hours(12)
    }

    #[test]
    fn event_date_patterns() {
        assert_eq!(format_event_date("2025-06-15", None), "June 15, 2025");
        assert_eq!(format_event_date("2025-06-05", Some("%b %Y")), "Jun 2025");
        assert_eq!(
            format_event_date("2025-06-15", Some("%A, %B %d, %Y")),
            "Sunday, June 15, 2025"
        );
        assert_eq!(format_event_date("someday", None), "someday");
    }

    #[test]
    fn bad_pattern_returns_input() {
        assert_eq!(format_event_date("2025-06-15", Some("%Q")), "2025-06-15");
        assert_eq!(format_event_date("not a date", Some("%Q")), "not a date");
    }

    #[test]
    fn days_until_truncates() {
        let now = noon("2025-06-01");
        assert_eq!(days_until("2025-06-15", now), 13);
        assert_eq!(days_until("2025-06-15T12:00", now), 14);
        assert_eq!(days_until("2025-05-31", now), -1);
        assert_eq!(days_until("soon", now), 0);
    }

    #[test]
    fn twelve_hour_times() {
        assert_eq!(format_time("18:30"), "6:30 PM");
        assert_eq!(format_time("00:05"), "12:05 AM");
        assert_eq!(format_time("12:00"), "12:00 PM");
        assert_eq!(format_time("09:15"), "9:15 AM");
        assert_eq!(format_time("noon"), "noon");
        assert_eq!(format_time("xx:10"), "xx:10");
    }

    #[test]
    fn offsets() {
        assert_eq!(parse_utc_offset("+07:00"), FixedOffset::east_opt(7 * 3600));
        assert_eq!(parse_utc_offset("-0330"), FixedOffset::west_opt(3 * 3600 + 1800));
        assert_eq!(parse_utc_offset("Z"), FixedOffset::east_opt(0));
        assert_eq!(parse_utc_offset("+7"), None);
        assert_eq!(parse_utc_offset("+25:00"), None);
    }

    #[test]
    fn calendar_link_uses_utc_stamps() {
        let event = CalendarEvent {
            title: "Sari & Kenji - Wedding Ceremony".to_string(),
            start_date: "2025-06-15".to_string(),
            start_time: "09:00".to_string(),
            end_time: Some("10:30".to_string()),
            utc_offset: Some("+07:00".to_string()),
            location: "Gereja Katedral, Jakarta".to_string(),
            description: Some("Join us for our special day!".to_string()),
        };
        let url = calendar_url(&event).unwrap();
        assert!(url.starts_with("https://calendar.google.com/calendar/render?action=TEMPLATE&"));
        assert!(url.contains("text=Sari+%26+Kenji+-+Wedding+Ceremony"));
        assert!(url.contains("dates=20250615T020000Z%2F20250615T033000Z"));
        assert!(url.contains("details=Join+us+for+our+special+day%21"));
    }

    #[test]
    fn calendar_link_defaults_end_time() {
        let event = CalendarEvent {
            title: "Reception".to_string(),
            start_date: "2025-06-15".to_string(),
            start_time: "12:00".to_string(),
            end_time: None,
            utc_offset: None,
            location: "Hall".to_string(),
            description: None,
        };
        let url = calendar_url(&event).unwrap();
        assert!(url.contains("dates=20250615T120000Z%2F20250615T140000Z"));
        assert!(url.ends_with("details="));
    }

    #[test]
    fn calendar_link_rejects_bad_time() {
        let event = CalendarEvent {
            title: "x".to_string(),
            start_date: "2025-06-15".to_string(),
            start_time: "late".to_string(),
            end_time: None,
            utc_offset: None,
            location: String::new(),
            description: None,
        };
        assert!(calendar_url(&event).is_err());
    }

    #[test]
    fn directions_link_encodes_address() {
        assert_eq!(
            directions_url("Jl. Katedral 7B, Jakarta"),
            "https://www.google.com/maps/search/?api=1&query=Jl.+Katedral+7B%2C+Jakarta"
        );
    }
}

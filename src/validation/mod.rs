// SPDX-License-Identifier: PMPL-1.0-or-later

//! RSVP field validation.
//!
//! Pure predicates plus an aggregate check that reports every failing
//! rule, in a fixed order, so the form can show all problems at once.
//! The phone rule is intentionally loose: optional `+`, a non-zero first
//! digit, at most 16 digits, no country awareness.

use crate::rsvp::RsvpPayload;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[1-9][0-9]{0,15}$").expect("phone pattern"));

static PHONE_SEPARATORS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\-()]").expect("separator pattern"));

pub const MIN_GUESTS: i64 = 1;
pub const MAX_GUESTS: i64 = 10;

/// One RSVP rule. Declaration order is reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RsvpRule {
    Name,
    Email,
    Phone,
    Attendance,
    GuestCount,
}

impl RsvpRule {
    pub fn message(self) -> &'static str {
        match self {
            RsvpRule::Name => "Name must be at least 2 characters long",
            RsvpRule::Email => "Please enter a valid email address",
            RsvpRule::Phone => "Please enter a valid phone number",
            RsvpRule::Attendance => "Please select your attendance status",
            RsvpRule::GuestCount => "Guest count must be between 1 and 10",
        }
    }
}

impl fmt::Display for RsvpRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    #[serde(skip)]
    pub failed: Vec<RsvpRule>,
}

impl ValidationReport {
    fn from_failures(failed: Vec<RsvpRule>) -> Self {
        Self {
            is_valid: failed.is_empty(),
            errors: failed.iter().map(|rule| rule.message().to_string()).collect(),
            failed,
        }
    }
}

/// Length is measured in UTF-16 code units, as a browser form reports it.
pub fn is_valid_name(name: &str) -> bool {
    name.trim().encode_utf16().count() >= 2
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Whitespace, hyphens and parentheses are stripped before matching.
pub fn is_valid_phone(phone: &str) -> bool {
    let cleaned = PHONE_SEPARATORS_RE.replace_all(phone, "");
    PHONE_RE.is_match(&cleaned)
}

/// Trim and drop angle brackets from free text. Not a substitute for
/// escaping on output.
pub fn sanitize(input: &str) -> String {
    input.trim().chars().filter(|c| !matches!(c, '<' | '>')).collect()
}

pub fn is_valid_guest_count(count: i64) -> bool {
    (MIN_GUESTS..=MAX_GUESTS).contains(&count)
}

/// Run every rule and collect all failures.
pub fn validate_rsvp(payload: &RsvpPayload) -> ValidationReport {
    let checks = [
        (RsvpRule::Name, is_valid_name(&payload.name)),
        (RsvpRule::Email, is_valid_email(&payload.email)),
        (RsvpRule::Phone, is_valid_phone(&payload.phone)),
        (RsvpRule::Attendance, payload.attendance.is_some()),
        (RsvpRule::GuestCount, is_valid_guest_count(payload.guest_count)),
    ];
    let failed = checks
        .into_iter()
        .filter_map(|(rule, ok)| (!ok).then_some(rule))
        .collect();
    ValidationReport::from_failures(failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rsvp::Attendance;

    fn payload(name: &str, email: &str, phone: &str, attendance: Option<Attendance>, guests: i64) -> RsvpPayload {
        RsvpPayload {
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            attendance,
            guest_count: guests,
            ..RsvpPayload::default()
        }
    }

    #[test]
    fn names_need_two_visible_characters() {
        assert!(is_valid_name("Jo"));
        assert!(is_valid_name("  Ana  "));
        assert!(!is_valid_name(" A "));
        assert!(!is_valid_name(""));
        assert!(is_valid_name("李明"));
        assert!(!is_valid_name("李"));
        // One astral-plane character is two UTF-16 units.
        assert!(is_valid_name("😀"));
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email("jane@example.com"));
        assert!(is_valid_email("a.b+c@sub.domain.id"));
        assert!(!is_valid_email("jane@example"));
        assert!(!is_valid_email("jane example@x.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("jane@@example.com"));
    }

    #[test]
    fn phone_shape() {
        assert!(is_valid_phone("+15551234567"));
        assert!(is_valid_phone("+62 812-3456-7890"));
        assert!(is_valid_phone("(555) 123 4567"));
        assert!(!is_valid_phone("0812345678"));
        assert!(!is_valid_phone("+1234567890123456789"));
        assert!(!is_valid_phone("call me"));
        assert!(!is_valid_phone(""));
        assert!(!is_valid_phone("+"));
    }

    #[test]
    fn phone_allows_sixteen_digits() {
        assert!(is_valid_phone("1234567890123456"));
        assert!(!is_valid_phone("12345678901234567"));
    }

    #[test]
    fn sanitize_strips_markup_brackets() {
        assert_eq!(sanitize("  <b>hello</b>  "), "bhello/b");
        assert_eq!(sanitize("no tags"), "no tags");
    }

    #[test]
    fn all_failures_reported_in_order() {
        let report = validate_rsvp(&payload("A", "bad", "bad", None, 0));
        assert!(!report.is_valid);
        assert_eq!(
            report.failed,
            vec![
                RsvpRule::Name,
                RsvpRule::Email,
                RsvpRule::Phone,
                RsvpRule::Attendance,
                RsvpRule::GuestCount
            ]
        );
        assert_eq!(report.errors.len(), 5);
        assert_eq!(report.errors[0], "Name must be at least 2 characters long");
        assert_eq!(report.errors[4], "Guest count must be between 1 and 10");
    }

    #[test]
    fn valid_payload_accepted() {
        let report = validate_rsvp(&payload(
            "Jane Doe",
            "jane@example.com",
            "+15551234567",
            Some(Attendance::Yes),
            2,
        ));
        assert!(report.is_valid);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn guest_count_bounds() {
        assert!(!is_valid_guest_count(0));
        assert!(is_valid_guest_count(1));
        assert!(is_valid_guest_count(10));
        assert!(!is_valid_guest_count(11));
        assert!(!is_valid_guest_count(-3));
    }
}

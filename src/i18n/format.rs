// SPDX-License-Identifier: PMPL-1.0-or-later

//! Locale-aware date and number formatting.
//!
//! Dates go through chrono's localized strftime (month and weekday names
//! come from the locale database). Numbers use a small per-locale symbol
//! table: group separator, decimal mark, digit set, and minimum grouping
//! digits.

use crate::i18n::language::locale_tag_for;
use crate::i18n::LanguageCode;
use chrono::{DateTime, Locale, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateStyle {
    /// Weekday, long month, day, year.
    Full,
    /// Long month, numeric day and year.
    #[default]
    Long,
    /// Abbreviated month.
    Medium,
    /// All numeric.
    Short,
}

impl DateStyle {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "full" => Some(DateStyle::Full),
            "long" => Some(DateStyle::Long),
            "medium" => Some(DateStyle::Medium),
            "short" => Some(DateStyle::Short),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateFormatOptions {
    pub style: DateStyle,
    /// Append the time of day (12-hour for en-US, 24-hour elsewhere).
    pub include_time: bool,
}

/// Upper bound for either fraction digit option. Larger values are clamped.
pub const MAX_FRACTION_DIGITS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberFormatOptions {
    pub minimum_fraction_digits: usize,
    pub maximum_fraction_digits: usize,
    pub use_grouping: bool,
}

impl Default for NumberFormatOptions {
    fn default() -> Self {
        Self {
            minimum_fraction_digits: 0,
            maximum_fraction_digits: 3,
            use_grouping: true,
        }
    }
}

const ARABIC_INDIC_DIGITS: [char; 10] = ['٠', '١', '٢', '٣', '٤', '٥', '٦', '٧', '٨', '٩'];

struct LocaleRules {
    chrono: Locale,
    group: &'static str,
    decimal: &'static str,
    digits: Option<[char; 10]>,
    min_grouping: usize,
    full: &'static str,
    long: &'static str,
    medium: &'static str,
    short: &'static str,
    time: &'static str,
}

fn rules_for(tag: &str) -> LocaleRules {
    match tag {
        "id-ID" => LocaleRules {
            chrono: Locale::id_ID,
            group: ".",
            decimal: ",",
            digits: None,
            min_grouping: 1,
            full: "%A, %-d %B %Y",
            long: "%-d %B %Y",
            medium: "%-d %b %Y",
            short: "%d/%m/%y",
            time: "%H.%M",
        },
        "ja-JP" => LocaleRules {
            chrono: Locale::ja_JP,
            group: ",",
            decimal: ".",
            digits: None,
            min_grouping: 1,
            full: "%Y年%-m月%-d日%A",
            long: "%Y年%-m月%-d日",
            medium: "%Y/%m/%d",
            short: "%Y/%m/%d",
            time: "%H:%M",
        },
        "ko-KR" => LocaleRules {
            chrono: Locale::ko_KR,
            group: ",",
            decimal: ".",
            digits: None,
            min_grouping: 1,
            full: "%Y년 %-m월 %-d일 %A",
            long: "%Y년 %-m월 %-d일",
            medium: "%Y. %-m. %-d.",
            short: "%y. %-m. %-d.",
            time: "%H:%M",
        },
        "zh-CN" => LocaleRules {
            chrono: Locale::zh_CN,
            group: ",",
            decimal: ".",
            digits: None,
            min_grouping: 1,
            full: "%Y年%-m月%-d日%A",
            long: "%Y年%-m月%-d日",
            medium: "%Y年%-m月%-d日",
            short: "%Y/%-m/%-d",
            time: "%H:%M",
        },
        "es-ES" => LocaleRules {
            chrono: Locale::es_ES,
            group: ".",
            decimal: ",",
            digits: None,
            min_grouping: 2,
            full: "%A, %-d de %B de %Y",
            long: "%-d de %B de %Y",
            medium: "%-d %b %Y",
            short: "%-d/%-m/%y",
            time: "%-H:%M",
        },
        "fr-FR" => LocaleRules {
            chrono: Locale::fr_FR,
            group: "\u{202f}",
            decimal: ",",
            digits: None,
            min_grouping: 1,
            full: "%A %-d %B %Y",
            long: "%-d %B %Y",
            medium: "%-d %b %Y",
            short: "%d/%m/%Y",
            time: "%H:%M",
        },
        "ar-SA" => LocaleRules {
            chrono: Locale::ar_SA,
            group: "٬",
            decimal: "٫",
            digits: Some(ARABIC_INDIC_DIGITS),
            min_grouping: 1,
            full: "%A، %-d %B %Y",
            long: "%-d %B %Y",
            medium: "%-d %b %Y",
            short: "%-d/%-m/%Y",
            time: "%H:%M",
        },
        _ => LocaleRules {
            chrono: Locale::en_US,
            group: ",",
            decimal: ".",
            digits: None,
            min_grouping: 1,
            full: "%A, %B %-d, %Y",
            long: "%B %-d, %Y",
            medium: "%b %-d, %Y",
            short: "%-m/%-d/%y",
            time: "%-I:%M %p",
        },
    }
}

fn localize_digits(text: &str, digits: Option<[char; 10]>) -> String {
    match digits {
        None => text.to_string(),
        Some(table) => text
            .chars()
            .map(|c| match c.to_digit(10) {
                Some(d) if c.is_ascii_digit() => table[d as usize],
                _ => c,
            })
            .collect(),
    }
}

/// Format `date` in `language`'s locale.
pub fn format_date<Tz>(
    date: &DateTime<Tz>,
    language: LanguageCode,
    options: &DateFormatOptions,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    format_date_for_tag(date, language.locale_tag(), options)
}

/// Like [`format_date`], keyed by a raw language code. Unmapped codes use `en-US`.
pub fn format_date_for_code<Tz>(date: &DateTime<Tz>, code: &str, options: &DateFormatOptions) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    format_date_for_tag(date, locale_tag_for(code), options)
}

/// Calendar dates without a time zone are formatted as midnight UTC.
pub fn format_naive_date(date: NaiveDate, language: LanguageCode, options: &DateFormatOptions) -> String {
    let at_midnight: DateTime<Utc> = date.and_time(chrono::NaiveTime::MIN).and_utc();
    format_date(&at_midnight, language, options)
}

fn format_date_for_tag<Tz>(date: &DateTime<Tz>, tag: &str, options: &DateFormatOptions) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let rules = rules_for(tag);
    let pattern = match options.style {
        DateStyle::Full => rules.full,
        DateStyle::Long => rules.long,
        DateStyle::Medium => rules.medium,
        DateStyle::Short => rules.short,
    };
    let mut out = date.format_localized(pattern, rules.chrono).to_string();
    if options.include_time {
        out.push(' ');
        out.push_str(&date.format_localized(rules.time, rules.chrono).to_string());
    }
    localize_digits(&out, rules.digits)
}

/// Format `value` in `language`'s locale.
pub fn format_number(value: f64, language: LanguageCode, options: &NumberFormatOptions) -> String {
    format_number_for_tag(value, language.locale_tag(), options)
}

/// Like [`format_number`], keyed by a raw language code. Unmapped codes use `en-US`.
pub fn format_number_for_code(value: f64, code: &str, options: &NumberFormatOptions) -> String {
    format_number_for_tag(value, locale_tag_for(code), options)
}

fn format_number_for_tag(value: f64, tag: &str, options: &NumberFormatOptions) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value < 0.0 { "-∞" } else { "∞" }.to_string();
    }

    let rules = rules_for(tag);
    let min_fraction = options.minimum_fraction_digits.min(MAX_FRACTION_DIGITS);
    let max_fraction = options
        .maximum_fraction_digits
        .min(MAX_FRACTION_DIGITS)
        .max(min_fraction);
    let rounded = format!("{:.*}", max_fraction, value.abs());
    let (integer, fraction) = match rounded.split_once('.') {
        Some((integer, fraction)) => (integer, fraction),
        None => (rounded.as_str(), ""),
    };

    let mut fraction = fraction.to_string();
    while fraction.len() > min_fraction && fraction.ends_with('0') {
        fraction.pop();
    }

    let mut out = String::new();
    let is_zero = integer.bytes().all(|b| b == b'0') && fraction.bytes().all(|b| b == b'0');
    if value < 0.0 && !is_zero {
        out.push('-');
    }
    if options.use_grouping && integer.len() >= 3 + rules.min_grouping {
        out.push_str(&group_digits(integer, rules.group));
    } else {
        out.push_str(integer);
    }
    if !fraction.is_empty() {
        out.push_str(rules.decimal);
        out.push_str(&fraction);
    }
    localize_digits(&out, rules.digits)
}

fn group_digits(integer: &str, separator: &str) -> String {
    let mut out = String::with_capacity(integer.len() + integer.len() / 3 * separator.len());
    let lead = integer.len() % 3;
    for (index, ch) in integer.chars().enumerate() {
        if index > 0 && (index + 3 - lead) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn wedding_day() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 16, 30, 0).unwrap()
    }

    #[test]
    fn long_dates_per_locale() {
        let date = wedding_day();
        let opts = DateFormatOptions::default();
        assert_eq!(format_date(&date, LanguageCode::En, &opts), "June 15, 2025");
        assert_eq!(format_date(&date, LanguageCode::Ja, &opts), "2025年6月15日");
        assert_eq!(format_date(&date, LanguageCode::Ko, &opts), "2025년 6월 15일");
        assert_eq!(format_date(&date, LanguageCode::Es, &opts), "15 de junio de 2025");
        assert_eq!(format_date(&date, LanguageCode::Fr, &opts), "15 juin 2025");
    }

    #[test]
    fn full_and_short_styles() {
        let date = wedding_day();
        let full = DateFormatOptions {
            style: DateStyle::Full,
            include_time: false,
        };
        assert_eq!(format_date(&date, LanguageCode::En, &full), "Sunday, June 15, 2025");

        let short = DateFormatOptions {
            style: DateStyle::Short,
            include_time: true,
        };
        assert_eq!(format_date(&date, LanguageCode::En, &short), "6/15/25 4:30 PM");
        assert_eq!(format_date(&date, LanguageCode::Ja, &short), "2025/06/15 16:30");
    }

    #[test]
    fn arabic_dates_use_arabic_indic_digits() {
        let short = DateFormatOptions {
            style: DateStyle::Short,
            include_time: false,
        };
        assert_eq!(format_date(&wedding_day(), LanguageCode::Ar, &short), "١٥/٦/٢٠٢٥");
    }

    #[test]
    fn unmapped_code_formats_as_en_us() {
        let opts = DateFormatOptions::default();
        assert_eq!(format_date_for_code(&wedding_day(), "pt", &opts), "June 15, 2025");
        assert_eq!(format_number_for_code(1234.5, "pt", &NumberFormatOptions::default()), "1,234.5");
    }

    #[test]
    fn naive_dates_format_without_shift() {
        let date = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        assert_eq!(
            format_naive_date(date, LanguageCode::En, &DateFormatOptions::default()),
            "December 31, 2025"
        );
    }

    #[test]
    fn numbers_per_locale() {
        let opts = NumberFormatOptions::default();
        assert_eq!(format_number(1234567.891, LanguageCode::En, &opts), "1,234,567.891");
        assert_eq!(format_number(1234567.891, LanguageCode::Id, &opts), "1.234.567,891");
        assert_eq!(
            format_number(1234567.891, LanguageCode::Fr, &opts),
            "1\u{202f}234\u{202f}567,891"
        );
        assert_eq!(format_number(1234.5, LanguageCode::Ar, &opts), "١٬٢٣٤٫٥");
    }

    #[test]
    fn spanish_groups_from_five_digits() {
        let opts = NumberFormatOptions::default();
        assert_eq!(format_number(1234.0, LanguageCode::Es, &opts), "1234");
        assert_eq!(format_number(12345.0, LanguageCode::Es, &opts), "12.345");
    }

    #[test]
    fn fraction_digit_bounds() {
        let money = NumberFormatOptions {
            minimum_fraction_digits: 2,
            maximum_fraction_digits: 2,
            use_grouping: true,
        };
        assert_eq!(format_number(1500000.0, LanguageCode::Id, &money), "1.500.000,00");
        assert_eq!(format_number(2.005, LanguageCode::En, &NumberFormatOptions::default()), "2.005");
        assert_eq!(format_number(2.0004, LanguageCode::En, &NumberFormatOptions::default()), "2");

        let plain = NumberFormatOptions {
            use_grouping: false,
            ..NumberFormatOptions::default()
        };
        assert_eq!(format_number(98765.0, LanguageCode::En, &plain), "98765");
    }

    #[test]
    fn negative_and_special_values() {
        let opts = NumberFormatOptions::default();
        assert_eq!(format_number(-1234.0, LanguageCode::En, &opts), "-1,234");
        assert_eq!(format_number(-0.0001, LanguageCode::En, &opts), "0");
        assert_eq!(format_number(f64::NAN, LanguageCode::En, &opts), "NaN");
        assert_eq!(format_number(f64::NEG_INFINITY, LanguageCode::En, &opts), "-∞");
    }

    #[test]
    fn fraction_digits_are_clamped() {
        let huge = NumberFormatOptions {
            minimum_fraction_digits: 70_000,
            maximum_fraction_digits: 70_000,
            use_grouping: true,
        };
        let formatted = format_number(1.5, LanguageCode::En, &huge);
        let (_, fraction) = formatted.split_once('.').unwrap();
        assert_eq!(fraction.len(), MAX_FRACTION_DIGITS);
        assert!(fraction.starts_with('5'));

        let wide_max = NumberFormatOptions {
            maximum_fraction_digits: usize::MAX,
            ..NumberFormatOptions::default()
        };
        assert_eq!(format_number(1.5, LanguageCode::En, &wide_max), "1.5");
    }

    #[test]
    fn group_digits_boundaries() {
        assert_eq!(group_digits("100", ","), "100");
        assert_eq!(group_digits("1000", ","), "1,000");
        assert_eq!(group_digits("100000", ","), "100,000");
        assert_eq!(group_digits("1000000", ","), "1,000,000");
    }
}

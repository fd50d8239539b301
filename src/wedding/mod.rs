// SPDX-License-Identifier: PMPL-1.0-or-later

//! Static wedding content: couple, event, story, gallery, gift registry.
//!
//! Loaded once from a JSON data file. Sections of the page only read it.

pub mod dates;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub use dates::{calendar_url, days_until, directions_url, format_event_date, format_time, CalendarEvent};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub parents: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Couple {
    pub bride: Person,
    pub groom: Person,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    /// `HH:MM`, local to the event.
    pub time: String,
    /// Optional `HH:MM` end, used for calendar entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    pub venue: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Ceremony,
    Reception,
}

impl EventKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ceremony" => Some(EventKind::Ceremony),
            "reception" => Some(EventKind::Reception),
            _ => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            EventKind::Ceremony => "Wedding Ceremony",
            EventKind::Reception => "Reception",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeddingEvent {
    /// ISO date, `YYYY-MM-DD`.
    pub date: String,
    /// UTC offset of the venue, e.g. `+07:00`. Missing means UTC.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utc_offset: Option<String>,
    pub ceremony: Venue,
    pub reception: Venue,
}

impl WeddingEvent {
    pub fn venue(&self, kind: EventKind) -> &Venue {
        match kind {
            EventKind::Ceremony => &self.ceremony,
            EventKind::Reception => &self.reception,
        }
    }

    pub fn offset(&self) -> Result<FixedOffset> {
        match self.utc_offset.as_deref() {
            None => Ok(Utc.fix()),
            Some(raw) => dates::parse_utc_offset(raw)
                .ok_or_else(|| anyhow!("invalid utc offset '{}'", raw)),
        }
    }

    /// Instant of `time` on the wedding date, at the venue's offset.
    pub fn instant_at(&self, time: &str) -> Result<DateTime<Utc>> {
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
            .with_context(|| format!("parsing wedding date '{}'", self.date))?;
        let time = dates::parse_clock_time(time)
            .ok_or_else(|| anyhow!("invalid time '{}'", time))?;
        local_to_utc(date, time, self.offset()?)
    }

    /// The countdown runs to the start of the ceremony.
    pub fn countdown_target(&self) -> Result<DateTime<Utc>> {
        self.instant_at(&self.ceremony.time)
    }
}

fn local_to_utc(date: NaiveDate, time: NaiveTime, offset: FixedOffset) -> Result<DateTime<Utc>> {
    offset
        .from_local_datetime(&date.and_time(time))
        .single()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| anyhow!("ambiguous local time {} {}", date, time))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    pub date: String,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub timeline: Vec<TimelineEvent>,
    pub how_we_met: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GalleryCategory {
    Engagement,
    Prewedding,
    Couple,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryImage {
    pub id: String,
    pub src: String,
    pub alt: String,
    pub category: GalleryCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDetails {
    pub bank_name: String,
    pub account_number: String,
    pub account_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftRegistry {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_details: Option<AccountDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeddingData {
    pub couple: Couple,
    pub wedding: WeddingEvent,
    pub story: Story,
    #[serde(default)]
    pub gallery: Vec<GalleryImage>,
    #[serde(default)]
    pub registry: Vec<GiftRegistry>,
}

impl WeddingData {
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("parsing wedding data")
    }

    pub fn gallery_in(&self, category: GalleryCategory) -> impl Iterator<Item = &GalleryImage> {
        self.gallery
            .iter()
            .filter(move |image| image.category == category)
    }

    pub fn countdown_target(&self) -> Result<DateTime<Utc>> {
        self.wedding.countdown_target()
    }

    /// "Bride & Groom - Wedding Ceremony" style calendar entry.
    pub fn calendar_event(&self, kind: EventKind) -> CalendarEvent {
        let venue = self.wedding.venue(kind);
        CalendarEvent {
            title: format!(
                "{} & {} - {}",
                self.couple.bride.name,
                self.couple.groom.name,
                kind.title()
            ),
            start_date: self.wedding.date.clone(),
            start_time: venue.time.clone(),
            end_time: venue.end_time.clone(),
            utc_offset: self.wedding.utc_offset.clone(),
            location: format!("{}, {}", venue.venue, venue.address),
            description: Some("Join us for our special day!".to_string()),
        }
    }
}

pub fn load_wedding_data(path: &Path) -> Result<WeddingData> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading wedding data {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("parsing wedding data {}", path.display()))
}

// SPDX-License-Identifier: PMPL-1.0-or-later

//! RSVP payload and the submission flow.
//!
//! There is no backend. [`SimulatedSubmitter`] waits, logs the cleaned
//! payload, and reports success. A real backend would implement
//! [`Submitter`] and receive the same validated, sanitized payload.

use crate::validation::{self, ValidationReport};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::thread;
use std::time::Duration;
use tracing::{error, info};

pub const DEFAULT_SUBMIT_DELAY: Duration = Duration::from_millis(2_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attendance {
    Yes,
    No,
    Maybe,
}

impl Attendance {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" => Some(Attendance::Yes),
            "no" | "n" => Some(Attendance::No),
            "maybe" => Some(Attendance::Maybe),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Attendance::Yes => "yes",
            Attendance::No => "no",
            Attendance::Maybe => "maybe",
        }
    }
}

impl fmt::Display for Attendance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Form payload as posted by the page (camelCase JSON).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RsvpPayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    /// An unselected radio group posts `""`, which reads as `None`.
    #[serde(default, deserialize_with = "deserialize_attendance")]
    pub attendance: Option<Attendance>,
    #[serde(default)]
    pub guest_count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dietary_restrictions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub song_request: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn deserialize_attendance<'de, D>(deserializer: D) -> Result<Option<Attendance>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => Attendance::parse(value)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown attendance '{value}'"))),
    }
}

impl RsvpPayload {
    /// Copy with every text field passed through [`validation::sanitize`].
    /// Empty optional fields become `None`.
    pub fn sanitized(&self) -> Self {
        let optional = |field: &Option<String>| {
            field
                .as_deref()
                .map(validation::sanitize)
                .filter(|value| !value.is_empty())
        };
        Self {
            name: validation::sanitize(&self.name),
            email: validation::sanitize(&self.email),
            phone: validation::sanitize(&self.phone),
            attendance: self.attendance,
            guest_count: self.guest_count,
            dietary_restrictions: optional(&self.dietary_restrictions),
            song_request: optional(&self.song_request),
            message: optional(&self.message),
        }
    }

    pub fn validate(&self) -> ValidationReport {
        validation::validate_rsvp(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub received_at: DateTime<Utc>,
    pub guest_name: String,
    pub attendance: Attendance,
    pub guest_count: i64,
}

/// Accepts a validated, sanitized payload.
pub trait Submitter {
    fn submit(&self, payload: &RsvpPayload) -> Result<SubmissionReceipt>;
}

/// Stand-in for a backend call: waits `delay`, logs, succeeds.
#[derive(Debug, Clone)]
pub struct SimulatedSubmitter {
    pub delay: Duration,
}

impl Default for SimulatedSubmitter {
    fn default() -> Self {
        Self {
            delay: DEFAULT_SUBMIT_DELAY,
        }
    }
}

impl Submitter for SimulatedSubmitter {
    fn submit(&self, payload: &RsvpPayload) -> Result<SubmissionReceipt> {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        let attendance = payload
            .attendance
            .ok_or_else(|| anyhow::anyhow!("attendance missing from validated payload"))?;
        info!(
            name = %payload.name,
            email = %payload.email,
            %attendance,
            guests = payload.guest_count,
            "RSVP received"
        );
        Ok(SubmissionReceipt {
            received_at: Utc::now(),
            guest_name: payload.name.clone(),
            attendance,
            guest_count: payload.guest_count,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmitStatus {
    #[default]
    Idle,
    Submitting,
    Success,
    Error,
}

/// State of one RSVP form on the page.
#[derive(Debug, Default)]
pub struct RsvpForm {
    status: SubmitStatus,
    errors: Vec<String>,
    receipt: Option<SubmissionReceipt>,
}

impl RsvpForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> SubmitStatus {
        self.status
    }

    pub fn is_submitting(&self) -> bool {
        self.status == SubmitStatus::Submitting
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn receipt(&self) -> Option<&SubmissionReceipt> {
        self.receipt.as_ref()
    }

    /// Validate, sanitize, and hand off to `submitter`. Invalid payloads
    /// never reach the submitter.
    pub fn submit(&mut self, payload: &RsvpPayload, submitter: &dyn Submitter) -> SubmitStatus {
        match self.begin(payload) {
            Some(clean) => self.finish(submitter.submit(&clean)),
            None => self.status,
        }
    }

    /// First half of a submission. Returns the sanitized payload to send,
    /// or `None` when validation fails or a submission is already in
    /// flight. The form stays `Submitting` until [`RsvpForm::finish`].
    pub fn begin(&mut self, payload: &RsvpPayload) -> Option<RsvpPayload> {
        if self.is_submitting() {
            return None;
        }
        self.receipt = None;

        let report = payload.validate();
        if !report.is_valid {
            self.errors = report.errors;
            self.status = SubmitStatus::Error;
            return None;
        }
        self.status = SubmitStatus::Submitting;
        Some(payload.sanitized())
    }

    /// Record the submitter's outcome for the submission in flight.
    pub fn finish(&mut self, outcome: Result<SubmissionReceipt>) -> SubmitStatus {
        match outcome {
            Ok(receipt) => {
                self.errors.clear();
                self.receipt = Some(receipt);
                self.status = SubmitStatus::Success;
            }
            Err(err) => {
                error!(%err, "RSVP submission error");
                self.errors = vec![err.to_string()];
                self.status = SubmitStatus::Error;
            }
        }
        self.status
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

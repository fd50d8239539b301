// SPDX-License-Identifier: PMPL-1.0-or-later

//! Site configuration.
//!
//! Read from a JSON or YAML file picked by extension. Every field has a
//! default, so an empty file (or no file) yields a working setup.

use crate::i18n::LanguageCode;
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SiteConfig {
    /// Language used when detection finds nothing and for fallback loads
    pub default_language: LanguageCode,
    /// Languages offered in the switcher
    pub supported_languages: Vec<LanguageCode>,
    /// Directory holding `<code>.json` dictionaries
    pub translations_dir: PathBuf,
    /// JSON file backing the preference store
    pub storage_path: PathBuf,
    /// Wedding content data file
    pub wedding_data: PathBuf,
    /// Overrides the ceremony start as countdown target
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countdown_target: Option<DateTime<Utc>>,
    pub tick_interval_ms: u64,
    /// Simulated RSVP round-trip
    pub submit_delay_ms: u64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            default_language: LanguageCode::En,
            supported_languages: LanguageCode::all().to_vec(),
            translations_dir: PathBuf::from("translations"),
            storage_path: PathBuf::from(".wedding-site/storage.json"),
            wedding_data: PathBuf::from("data/wedding.json"),
            countdown_target: None,
            tick_interval_ms: 1_000,
            submit_delay_ms: 2_000,
        }
    }
}

impl SiteConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.submit_delay_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.supported_languages.is_empty() {
            bail!("supported_languages must not be empty");
        }
        if !self.supported_languages.contains(&self.default_language) {
            bail!(
                "default_language '{}' is not in supported_languages",
                self.default_language
            );
        }
        if self.tick_interval_ms == 0 {
            bail!("tick_interval_ms must be greater than zero");
        }
        Ok(())
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("yaml") | Some("yml")
    )
}

pub fn load_config(path: &Path) -> Result<SiteConfig> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
    let config: SiteConfig = if content.trim().is_empty() {
        SiteConfig::default()
    } else if is_yaml(path) {
        serde_yaml::from_str(&content)
            .with_context(|| format!("parsing yaml config {}", path.display()))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("parsing json config {}", path.display()))?
    };
    config
        .validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(config)
}

/// Load `path` when given, defaults otherwise.
pub fn load_or_default(path: Option<&Path>) -> Result<SiteConfig> {
    match path {
        Some(path) => load_config(path),
        None => Ok(SiteConfig::default()),
    }
}

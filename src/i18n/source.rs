// SPDX-License-Identifier: PMPL-1.0-or-later

//! Where dictionaries come from, and the one-retry fallback policy.

use crate::i18n::{Dictionary, I18nError, LanguageCode};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, error};

/// A per-language dictionary resource, addressed by code. May fail.
pub trait DictionarySource: Send {
    fn load(&self, language: LanguageCode) -> Result<Dictionary, I18nError>;
}

/// `<dir>/<code>.json`, one file per language.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, language: LanguageCode) -> PathBuf {
        self.dir.join(format!("{}.json", language.code()))
    }
}

impl DictionarySource for DirectorySource {
    fn load(&self, language: LanguageCode) -> Result<Dictionary, I18nError> {
        let path = self.path_for(language);
        let raw = fs::read_to_string(&path).map_err(|source| I18nError::DictionaryUnavailable {
            language: language.code().to_string(),
            path: path.clone(),
            source,
        })?;
        debug!(%language, path = %path.display(), "loaded translations");
        Dictionary::parse(language.code(), &raw)
    }
}

/// Dictionaries held in memory. Languages without an entry fail to load.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    dictionaries: HashMap<LanguageCode, Dictionary>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, language: LanguageCode, dictionary: Dictionary) -> Self {
        self.dictionaries.insert(language, dictionary);
        self
    }
}

impl DictionarySource for StaticSource {
    fn load(&self, language: LanguageCode) -> Result<Dictionary, I18nError> {
        self.dictionaries
            .get(&language)
            .cloned()
            .ok_or_else(|| I18nError::UnsupportedLanguage(language.code().to_string()))
    }
}

/// Result of a load attempt, including whether the fallback was served.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOutcome {
    /// Language that was asked for.
    pub language: LanguageCode,
    /// Language whose dictionary is actually held, `None` when both loads failed.
    pub served: Option<LanguageCode>,
    pub dictionary: Dictionary,
    pub error: Option<String>,
}

impl LoadOutcome {
    pub fn used_fallback(&self) -> bool {
        matches!(self.served, Some(served) if served != self.language)
    }
}

/// Load `language`, retrying once with `fallback` if it is a different
/// language. If nothing loads, the outcome carries an empty dictionary
/// and an error message instead of failing.
pub fn load_with_fallback(
    source: &dyn DictionarySource,
    language: LanguageCode,
    fallback: LanguageCode,
) -> LoadOutcome {
    let first_err = match source.load(language) {
        Ok(dictionary) => {
            return LoadOutcome {
                language,
                served: Some(language),
                dictionary,
                error: None,
            }
        }
        Err(err) => err,
    };
    error!(%language, err = %first_err, "error loading translations");

    if language == fallback {
        return LoadOutcome {
            language,
            served: None,
            dictionary: Dictionary::default(),
            error: Some(format!("Failed to load {} translations", language.code())),
        };
    }

    match source.load(fallback) {
        Ok(dictionary) => LoadOutcome {
            language,
            served: Some(fallback),
            dictionary,
            error: None,
        },
        Err(err) => {
            error!(%fallback, %err, "error loading fallback translations");
            LoadOutcome {
                language,
                served: None,
                dictionary: Dictionary::default(),
                error: Some("Failed to load translations".to_string()),
            }
        }
    }
}

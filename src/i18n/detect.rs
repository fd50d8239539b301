// SPDX-License-Identifier: PMPL-1.0-or-later

//! Preferred-language detection from the environment's locale list.

use crate::i18n::{I18nError, LanguageCode};
use std::env;
use tracing::warn;

/// Ordered locale tags describing the user's preference, most preferred first.
pub trait LocaleEnvironment: Send {
    fn preferred_locales(&self) -> Result<Vec<String>, I18nError>;
}

/// Reads POSIX locale variables: `LANGUAGE` (colon separated), then
/// `LC_ALL`, `LC_MESSAGES`, `LANG`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLocales;

impl LocaleEnvironment for SystemLocales {
    fn preferred_locales(&self) -> Result<Vec<String>, I18nError> {
        let mut tags = Vec::new();
        if let Ok(list) = env::var("LANGUAGE") {
            tags.extend(list.split(':').filter_map(normalize_posix_locale));
        }
        for var in ["LC_ALL", "LC_MESSAGES", "LANG"] {
            if let Ok(value) = env::var(var) {
                tags.extend(normalize_posix_locale(&value));
            }
        }
        if tags.is_empty() {
            return Err(I18nError::LocalesUnavailable(
                "no locale variables set".to_string(),
            ));
        }
        Ok(tags)
    }
}

/// A fixed list, for tests and for callers that already know the list
/// (e.g. an `Accept-Language` header split by the host).
#[derive(Debug, Default, Clone)]
pub struct FixedLocales(pub Vec<String>);

impl FixedLocales {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(tags.into_iter().map(Into::into).collect())
    }
}

impl LocaleEnvironment for FixedLocales {
    fn preferred_locales(&self) -> Result<Vec<String>, I18nError> {
        Ok(self.0.clone())
    }
}

/// `en_US.UTF-8@euro` becomes `en-US`. `C` and `POSIX` carry no preference.
fn normalize_posix_locale(raw: &str) -> Option<String> {
    let base = raw.split(['.', '@']).next()?.trim();
    if base.is_empty() || base == "C" || base == "POSIX" {
        return None;
    }
    Some(base.replace('_', "-"))
}

/// Pick the first candidate whose primary subtag is supported.
///
/// `"fr-CA"` contributes `fr`, `"EN"` contributes `en`. When nothing
/// matches, `fallback` is returned.
pub fn detect_preferred_language<S: AsRef<str>>(
    candidates: &[S],
    supported: &[LanguageCode],
    fallback: LanguageCode,
) -> LanguageCode {
    candidates
        .iter()
        .filter_map(|tag| {
            let primary = tag.as_ref().split('-').next().unwrap_or_default();
            LanguageCode::from_code(&primary.to_lowercase())
        })
        .find(|lang| supported.contains(lang))
        .unwrap_or(fallback)
}

/// Detection against a live environment. An unreadable environment
/// degrades to `fallback`.
pub fn detect_from_environment(
    environment: &dyn LocaleEnvironment,
    supported: &[LanguageCode],
    fallback: LanguageCode,
) -> LanguageCode {
    match environment.preferred_locales() {
        Ok(candidates) => detect_preferred_language(&candidates, supported, fallback),
        Err(err) => {
            warn!(%err, %fallback, "error detecting user language");
            fallback
        }
    }
}

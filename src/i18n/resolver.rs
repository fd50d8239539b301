// SPDX-License-Identifier: PMPL-1.0-or-later

//! The localization resolver owned by the application context.
//!
//! Lifecycle: `Uninitialized -> Detecting -> Loaded(lang) -> Loaded(other) ...`.
//! `init()` reads the persisted preference (detecting and persisting one
//! if absent), then loads that language's dictionary. Loading never fails
//! outward: a broken dictionary falls back once, and a double failure
//! leaves an empty dictionary plus an `error()` message.
//!
//! Loads can be split into [`LocalizationResolver::request`] and
//! [`LocalizationResolver::apply`] so the host can fetch dictionaries off
//! the UI thread. Each request gets a monotonically increasing token and
//! only the most recent token's outcome is applied.

use crate::i18n::detect::{detect_from_environment, LocaleEnvironment};
use crate::i18n::format::{self, DateFormatOptions, NumberFormatOptions};
use crate::i18n::source::{load_with_fallback, DictionarySource, LoadOutcome};
use crate::i18n::{Dictionary, LanguageCode, TextDirection};
use crate::storage::{self, KeyValueStore, LANGUAGE_KEY};
use chrono::{DateTime, TimeZone};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

/// Document-level attributes the host applies after a language change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Presentation {
    pub lang_tag: &'static str,
    pub direction: TextDirection,
    /// `None` means "clear any override and use the site default".
    pub font_family: Option<&'static str>,
    pub requires_special_typography: bool,
    pub line_height: f32,
}

impl Presentation {
    pub fn for_language(language: LanguageCode) -> Self {
        let special = language.requires_special_typography();
        Self {
            lang_tag: language.code(),
            direction: language.direction(),
            font_family: special.then(|| language.font_family()),
            requires_special_typography: special,
            line_height: language.line_height(),
        }
    }
}

/// Where the resolver is in its lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolverState {
    Uninitialized,
    Detecting,
    Loaded {
        language: LanguageCode,
        dictionary: Dictionary,
    },
}

/// Proof that a load was requested. Stale tickets are ignored by `apply`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub token: u64,
    pub language: LanguageCode,
}

/// Languages the site offers and the one served when others fail.
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    pub supported: Vec<LanguageCode>,
    pub fallback: LanguageCode,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            supported: LanguageCode::all().to_vec(),
            fallback: LanguageCode::En,
        }
    }
}

pub struct LocalizationResolver {
    store: Box<dyn KeyValueStore>,
    source: Box<dyn DictionarySource>,
    environment: Box<dyn LocaleEnvironment>,
    options: ResolverOptions,
    state: ResolverState,
    current: LanguageCode,
    latest_token: u64,
    loading: bool,
    error: Option<String>,
}

impl fmt::Debug for LocalizationResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalizationResolver")
            .field("current", &self.current)
            .field("state", &self.state)
            .field("latest_token", &self.latest_token)
            .field("loading", &self.loading)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl LocalizationResolver {
    pub fn new(
        store: Box<dyn KeyValueStore>,
        source: Box<dyn DictionarySource>,
        environment: Box<dyn LocaleEnvironment>,
        options: ResolverOptions,
    ) -> Self {
        let current = options.fallback;
        Self {
            store,
            source,
            environment,
            options,
            state: ResolverState::Uninitialized,
            current,
            latest_token: 0,
            loading: false,
            error: None,
        }
    }

    /// Settle on a language and load it. Safe to call again after `dispose`.
    pub fn init(&mut self) -> Presentation {
        self.state = ResolverState::Detecting;
        let language = self.read_or_detect_preference();
        self.current = language;
        let ticket = self.request(language);
        let outcome = self.fetch(language);
        self.apply(ticket, outcome);
        Presentation::for_language(language)
    }

    fn read_or_detect_preference(&mut self) -> LanguageCode {
        let saved: Option<String> = storage::get_item(self.store.as_ref(), LANGUAGE_KEY, None);
        let saved = saved
            .as_deref()
            .and_then(LanguageCode::from_code)
            .filter(|lang| self.options.supported.contains(lang));
        if let Some(language) = saved {
            debug!(%language, "using saved language preference");
            return language;
        }

        let detected = detect_from_environment(
            self.environment.as_ref(),
            &self.options.supported,
            self.options.fallback,
        );
        info!(language = %detected, "detected language preference");
        storage::set_item(self.store.as_mut(), LANGUAGE_KEY, detected.code());
        detected
    }

    /// Switch language, persist it, and return the attributes to apply.
    /// Choosing the current language changes nothing.
    pub fn set_language(&mut self, language: LanguageCode) -> Presentation {
        if language == self.current && matches!(self.state, ResolverState::Loaded { .. }) {
            return Presentation::for_language(language);
        }
        let ticket = self.begin_change(language);
        let outcome = self.fetch(language);
        self.apply(ticket, outcome);
        Presentation::for_language(language)
    }

    /// First half of an asynchronous language change: record and persist
    /// the choice, then hand back a ticket for the pending load.
    pub fn begin_change(&mut self, language: LanguageCode) -> LoadTicket {
        self.current = language;
        storage::set_item(self.store.as_mut(), LANGUAGE_KEY, language.code());
        self.request(language)
    }

    /// Issue a new load ticket. Earlier tickets become stale.
    pub fn request(&mut self, language: LanguageCode) -> LoadTicket {
        self.latest_token += 1;
        self.loading = true;
        self.error = None;
        LoadTicket {
            token: self.latest_token,
            language,
        }
    }

    /// Load synchronously from the configured source, with fallback.
    pub fn fetch(&self, language: LanguageCode) -> LoadOutcome {
        load_with_fallback(self.source.as_ref(), language, self.options.fallback)
    }

    /// Install `outcome` if `ticket` is the latest one issued. Returns
    /// whether it was applied.
    pub fn apply(&mut self, ticket: LoadTicket, outcome: LoadOutcome) -> bool {
        if ticket.token != self.latest_token {
            debug!(
                token = ticket.token,
                latest = self.latest_token,
                language = %ticket.language,
                "discarding stale translation load"
            );
            return false;
        }
        self.loading = false;
        self.error = outcome.error;
        self.state = ResolverState::Loaded {
            language: ticket.language,
            dictionary: outcome.dictionary,
        };
        true
    }

    /// Drop loaded state and invalidate outstanding tickets. The persisted
    /// preference is left alone.
    pub fn dispose(&mut self) {
        self.latest_token += 1;
        self.loading = false;
        self.state = ResolverState::Uninitialized;
    }

    pub fn state(&self) -> &ResolverState {
        &self.state
    }

    pub fn current_language(&self) -> LanguageCode {
        self.current
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dictionary(&self) -> Option<&Dictionary> {
        match &self.state {
            ResolverState::Loaded { dictionary, .. } => Some(dictionary),
            _ => None,
        }
    }

    /// Translate a dotted key.
    pub fn t(&self, key: &str) -> String {
        self.resolve(key, None)
    }

    /// Translate a dotted key with an explicit fallback.
    pub fn t_or(&self, key: &str, fallback: &str) -> String {
        self.resolve(key, Some(fallback))
    }

    fn resolve(&self, key: &str, fallback: Option<&str>) -> String {
        match self.dictionary() {
            Some(dictionary) => dictionary.resolve(key, fallback),
            None => Dictionary::default().resolve(key, fallback),
        }
    }

    pub fn presentation(&self) -> Presentation {
        Presentation::for_language(self.current)
    }

    pub fn direction(&self) -> TextDirection {
        self.current.direction()
    }

    pub fn display_name(&self) -> &'static str {
        self.current.display_name()
    }

    pub fn format_date<Tz>(&self, date: &DateTime<Tz>, options: &DateFormatOptions) -> String
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        format::format_date(date, self.current, options)
    }

    pub fn format_number(&self, value: f64, options: &NumberFormatOptions) -> String {
        format::format_number(value, self.current, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::detect::FixedLocales;
    use crate::i18n::source::StaticSource;
    use crate::i18n::I18nError;
    use crate::storage::{FileStore, MemoryStore};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn dictionaries() -> StaticSource {
        StaticSource::new()
            .with(
                LanguageCode::En,
                Dictionary::from_json(r#"{"hero":{"saveTheDate":"Save the Date"}}"#).unwrap(),
            )
            .with(
                LanguageCode::Id,
                Dictionary::from_json(r#"{"hero":{"saveTheDate":"Simpan Tanggal"}}"#).unwrap(),
            )
            .with(
                LanguageCode::Ar,
                Dictionary::from_json(r#"{"hero":{"saveTheDate":"احفظ التاريخ"}}"#).unwrap(),
            )
    }

    fn resolver(store: Box<dyn KeyValueStore>, locales: &[&str]) -> LocalizationResolver {
        LocalizationResolver::new(
            store,
            Box::new(dictionaries()),
            Box::new(FixedLocales::new(locales.iter().copied())),
            ResolverOptions::default(),
        )
    }

    struct CountingEnvironment(Arc<AtomicUsize>);

    impl LocaleEnvironment for CountingEnvironment {
        fn preferred_locales(&self) -> Result<Vec<String>, I18nError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(vec!["ja-JP".to_string()])
        }
    }

    #[test]
    fn starts_uninitialized_with_raw_key_fallbacks() {
        let resolver = resolver(Box::new(MemoryStore::default()), &[]);
        assert_eq!(resolver.state(), &ResolverState::Uninitialized);
        assert_eq!(resolver.t("hero.saveTheDate"), "saveTheDate");
    }

    #[test]
    fn init_detects_and_persists() {
        let mut resolver = resolver(Box::new(MemoryStore::default()), &["id-ID", "en-US"]);
        let presentation = resolver.init();
        assert_eq!(resolver.current_language(), LanguageCode::Id);
        assert_eq!(presentation.lang_tag, "id");
        assert_eq!(resolver.t("hero.saveTheDate"), "Simpan Tanggal");
        assert!(!resolver.is_loading());
        assert!(resolver.error().is_none());

        let saved: Option<String> = storage::get_item(resolver.store.as_ref(), LANGUAGE_KEY, None);
        assert_eq!(saved.as_deref(), Some("id"));
    }

    #[test]
    fn saved_preference_skips_detection() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut store = MemoryStore::default();
        storage::set_item(&mut store, LANGUAGE_KEY, "ar");
        let mut resolver = LocalizationResolver::new(
            Box::new(store),
            Box::new(dictionaries()),
            Box::new(CountingEnvironment(calls.clone())),
            ResolverOptions::default(),
        );
        let presentation = resolver.init();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(resolver.current_language(), LanguageCode::Ar);
        assert_eq!(presentation.direction, TextDirection::Rtl);
        assert_eq!(resolver.direction(), TextDirection::Rtl);
    }

    #[test]
    fn unsupported_saved_value_triggers_detection() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut store = MemoryStore::default();
        storage::set_item(&mut store, LANGUAGE_KEY, "klingon");
        let mut resolver = LocalizationResolver::new(
            Box::new(store),
            Box::new(dictionaries()),
            Box::new(CountingEnvironment(calls.clone())),
            ResolverOptions::default(),
        );
        resolver.init();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.current_language(), LanguageCode::Ja);
        // No ja dictionary: English is served without surfacing an error.
        assert_eq!(resolver.t("hero.saveTheDate"), "Save the Date");
        assert!(resolver.error().is_none());
    }

    #[test]
    fn set_language_survives_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.json");

        let mut first = resolver(Box::new(FileStore::new(&path)), &["en-US"]);
        first.init();
        assert_eq!(first.current_language(), LanguageCode::En);
        first.set_language(LanguageCode::Id);

        let calls = Arc::new(AtomicUsize::new(0));
        let mut reloaded = LocalizationResolver::new(
            Box::new(FileStore::new(&path)),
            Box::new(dictionaries()),
            Box::new(CountingEnvironment(calls.clone())),
            ResolverOptions::default(),
        );
        reloaded.init();
        assert_eq!(reloaded.current_language(), LanguageCode::Id);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn set_language_reports_presentation() {
        let mut resolver = resolver(Box::new(MemoryStore::default()), &["en"]);
        resolver.init();

        let ar = resolver.set_language(LanguageCode::Ar);
        assert_eq!(ar.direction, TextDirection::Rtl);
        assert!(ar.requires_special_typography);
        assert_eq!(ar.font_family, Some(LanguageCode::Ar.font_family()));
        assert_eq!(ar.line_height, 1.8);

        let en = resolver.set_language(LanguageCode::En);
        assert_eq!(en.direction, TextDirection::Ltr);
        assert_eq!(en.font_family, None);
        assert_eq!(resolver.display_name(), "English");
    }

    #[test]
    fn same_language_is_a_no_op() {
        let mut resolver = resolver(Box::new(MemoryStore::default()), &["en"]);
        resolver.init();
        let before = resolver.latest_token;
        resolver.set_language(LanguageCode::En);
        assert_eq!(resolver.latest_token, before);
    }

    #[test]
    fn latest_request_wins() {
        let mut resolver = resolver(Box::new(MemoryStore::default()), &["en"]);
        resolver.init();

        let slow = resolver.begin_change(LanguageCode::Id);
        let fast = resolver.begin_change(LanguageCode::Ar);
        assert!(resolver.is_loading());

        let ar = resolver.fetch(LanguageCode::Ar);
        assert!(resolver.apply(fast, ar));
        let id = resolver.fetch(LanguageCode::Id);
        assert!(!resolver.apply(slow, id));

        assert_eq!(resolver.current_language(), LanguageCode::Ar);
        assert_eq!(resolver.t("hero.saveTheDate"), "احفظ التاريخ");
        assert!(!resolver.is_loading());
    }

    #[test]
    fn double_failure_surfaces_error_field() {
        let mut resolver = LocalizationResolver::new(
            Box::new(MemoryStore::default()),
            Box::new(StaticSource::new()),
            Box::new(FixedLocales::new(["ko-KR"])),
            ResolverOptions::default(),
        );
        resolver.init();
        assert_eq!(resolver.error(), Some("Failed to load translations"));
        assert_eq!(resolver.t("rsvp.title"), "title");
        assert_eq!(resolver.t_or("rsvp.title", "RSVP"), "RSVP");
    }

    #[test]
    fn dispose_invalidates_pending_loads_and_keeps_preference() {
        let mut resolver = resolver(Box::new(MemoryStore::default()), &["id"]);
        resolver.init();
        let pending = resolver.begin_change(LanguageCode::Ar);
        resolver.dispose();
        let outcome = resolver.fetch(LanguageCode::Ar);
        assert!(!resolver.apply(pending, outcome));
        assert_eq!(resolver.state(), &ResolverState::Uninitialized);

        resolver.init();
        assert_eq!(resolver.current_language(), LanguageCode::Ar);
    }

    #[test]
    fn formats_with_current_language() {
        let mut resolver = resolver(Box::new(MemoryStore::default()), &["id"]);
        resolver.init();
        assert_eq!(
            resolver.format_number(1500000.0, &NumberFormatOptions::default()),
            "1.500.000"
        );
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later

//! Internationalisation for the wedding site.
//!
//! Dictionaries are nested JSON objects, one file per language, looked up
//! with dotted keys such as `"hero.saveTheDate"`. The [`LocalizationResolver`]
//! owns the active language, persists the user's choice, and hands the
//! host the document attributes (direction, font, line height) to apply.
//!
//! ## Supported languages
//!
//! | Code | Language   | Native name      | Locale |
//! |------|------------|------------------|--------|
//! | en   | English    | English          | en-US  |
//! | id   | Indonesian | Bahasa Indonesia | id-ID  |
//! | ja   | Japanese   | 日本語            | ja-JP  |
//! | ko   | Korean     | 한국어            | ko-KR  |
//! | zh   | Chinese    | 中文              | zh-CN  |
//! | es   | Spanish    | Español          | es-ES  |
//! | fr   | French     | Français         | fr-FR  |
//! | ar   | Arabic     | العربية           | ar-SA  |
//!
//! ## Failure handling
//!
//! Nothing here panics or returns an error to the page. Key misses resolve
//! to the explicit fallback, then the last key segment, then the key.
//! Dictionary load failures retry the fallback language once; if that also
//! fails the resolver exposes an error message and an empty dictionary.

mod detect;
mod dictionary;
pub mod format;
mod language;
mod resolver;
mod source;

use std::path::PathBuf;
use thiserror::Error;

pub use detect::{
    detect_from_environment, detect_preferred_language, FixedLocales, LocaleEnvironment,
    SystemLocales,
};
pub use dictionary::{Dictionary, DictionaryNode};
pub use format::{
    format_date, format_date_for_code, format_naive_date, format_number, format_number_for_code,
    DateFormatOptions, DateStyle, NumberFormatOptions, MAX_FRACTION_DIGITS,
};
pub use language::{locale_tag_for, LanguageCode, TextDirection};
pub use resolver::{LoadTicket, LocalizationResolver, Presentation, ResolverOptions, ResolverState};
pub use source::{load_with_fallback, DictionarySource, DirectorySource, LoadOutcome, StaticSource};

#[derive(Debug, Error)]
pub enum I18nError {
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),
    #[error("translations for {language} unavailable at {path}: {source}")]
    DictionaryUnavailable {
        language: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("translations for {language} are malformed: {source}")]
    DictionaryParse {
        language: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("locale list unavailable: {0}")]
    LocalesUnavailable(String),
}

// SPDX-License-Identifier: PMPL-1.0-or-later

//! Supported UI languages and their per-language presentation metadata.
//!
//! ## Adding a new language
//!
//! 1. Add a variant to [`LanguageCode`]
//! 2. Add arms to `code()`, `from_code()` and each metadata table below
//! 3. Drop a `<code>.json` dictionary into the translations directory

use serde::{Deserialize, Serialize};
use std::fmt;

/// A UI language the site ships a dictionary for.
///
/// Serialized as its lowercase ISO 639-1 code, which is also the value
/// persisted under the `"language"` storage key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageCode {
    En,
    Id,
    Ja,
    Ko,
    Zh,
    Es,
    Fr,
    Ar,
}

/// Writing direction applied to the document root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    Ltr,
    Rtl,
}

impl TextDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            TextDirection::Ltr => "ltr",
            TextDirection::Rtl => "rtl",
        }
    }
}

impl fmt::Display for TextDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const DEFAULT_FONT: &str = "\"Inter\", system-ui, sans-serif";

impl LanguageCode {
    pub fn code(&self) -> &'static str {
        match self {
            LanguageCode::En => "en",
            LanguageCode::Id => "id",
            LanguageCode::Ja => "ja",
            LanguageCode::Ko => "ko",
            LanguageCode::Zh => "zh",
            LanguageCode::Es => "es",
            LanguageCode::Fr => "fr",
            LanguageCode::Ar => "ar",
        }
    }

    /// Parse a language code. Surrounding whitespace and case are ignored.
    pub fn from_code(code: &str) -> Option<LanguageCode> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" => Some(LanguageCode::En),
            "id" => Some(LanguageCode::Id),
            "ja" => Some(LanguageCode::Ja),
            "ko" => Some(LanguageCode::Ko),
            "zh" => Some(LanguageCode::Zh),
            "es" => Some(LanguageCode::Es),
            "fr" => Some(LanguageCode::Fr),
            "ar" => Some(LanguageCode::Ar),
            _ => None,
        }
    }

    /// All supported languages, in language-switcher order.
    pub fn all() -> &'static [LanguageCode] {
        &[
            LanguageCode::En,
            LanguageCode::Id,
            LanguageCode::Ja,
            LanguageCode::Ko,
            LanguageCode::Zh,
            LanguageCode::Es,
            LanguageCode::Fr,
            LanguageCode::Ar,
        ]
    }

    /// BCP 47 tag handed to locale-aware formatters.
    pub fn locale_tag(&self) -> &'static str {
        match self {
            LanguageCode::En => "en-US",
            LanguageCode::Id => "id-ID",
            LanguageCode::Ja => "ja-JP",
            LanguageCode::Ko => "ko-KR",
            LanguageCode::Zh => "zh-CN",
            LanguageCode::Es => "es-ES",
            LanguageCode::Fr => "fr-FR",
            LanguageCode::Ar => "ar-SA",
        }
    }

    /// Name of the language in its own script.
    pub fn display_name(&self) -> &'static str {
        match self {
            LanguageCode::En => "English",
            LanguageCode::Id => "Bahasa Indonesia",
            LanguageCode::Ja => "日本語",
            LanguageCode::Ko => "한국어",
            LanguageCode::Zh => "中文",
            LanguageCode::Es => "Español",
            LanguageCode::Fr => "Français",
            LanguageCode::Ar => "العربية",
        }
    }

    pub fn english_name(&self) -> &'static str {
        match self {
            LanguageCode::En => "English",
            LanguageCode::Id => "Indonesian",
            LanguageCode::Ja => "Japanese",
            LanguageCode::Ko => "Korean",
            LanguageCode::Zh => "Chinese",
            LanguageCode::Es => "Spanish",
            LanguageCode::Fr => "French",
            LanguageCode::Ar => "Arabic",
        }
    }

    pub fn flag(&self) -> &'static str {
        match self {
            LanguageCode::En => "🇺🇸",
            LanguageCode::Id => "🇮🇩",
            LanguageCode::Ja => "🇯🇵",
            LanguageCode::Ko => "🇰🇷",
            LanguageCode::Zh => "🇨🇳",
            LanguageCode::Es => "🇪🇸",
            LanguageCode::Fr => "🇫🇷",
            LanguageCode::Ar => "🇸🇦",
        }
    }

    pub fn direction(&self) -> TextDirection {
        match self {
            LanguageCode::Ar => TextDirection::Rtl,
            _ => TextDirection::Ltr,
        }
    }

    /// CSS font stack suited to the language's script.
    pub fn font_family(&self) -> &'static str {
        match self {
            LanguageCode::Ja => "\"Noto Sans JP\", \"Hiragino Sans\", \"Yu Gothic\", sans-serif",
            LanguageCode::Ko => {
                "\"Noto Sans KR\", \"Apple SD Gothic Neo\", \"Malgun Gothic\", sans-serif"
            }
            LanguageCode::Zh => "\"Noto Sans SC\", \"PingFang SC\", \"Microsoft YaHei\", sans-serif",
            LanguageCode::Ar => "\"Noto Sans Arabic\", \"Tahoma\", sans-serif",
            LanguageCode::En | LanguageCode::Id | LanguageCode::Es | LanguageCode::Fr => {
                DEFAULT_FONT
            }
        }
    }

    /// CJK and Arabic scripts get their own font stack and taller lines.
    pub fn requires_special_typography(&self) -> bool {
        matches!(
            self,
            LanguageCode::Ja | LanguageCode::Ko | LanguageCode::Zh | LanguageCode::Ar
        )
    }

    pub fn line_height(&self) -> f32 {
        match self {
            LanguageCode::Ja | LanguageCode::Zh | LanguageCode::Ar => 1.8,
            LanguageCode::Ko => 1.7,
            LanguageCode::En | LanguageCode::Id | LanguageCode::Es | LanguageCode::Fr => 1.6,
        }
    }
}

impl Default for LanguageCode {
    fn default() -> Self {
        LanguageCode::En
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Locale tag for an arbitrary code string; unmapped codes get `en-US`.
pub fn locale_tag_for(code: &str) -> &'static str {
    LanguageCode::from_code(code)
        .map(|lang| lang.locale_tag())
        .unwrap_or("en-US")
}

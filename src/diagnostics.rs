// SPDX-License-Identifier: PMPL-1.0-or-later

use crate::config::SiteConfig;
use crate::i18n::{Dictionary, DictionarySource, DirectorySource, LanguageCode};
use crate::wedding;
use anyhow::{anyhow, Result};
use colored::Colorize;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs::{self, OpenOptions};
use std::path::Path;

pub fn run_self_diagnostics(config: &SiteConfig) -> Result<()> {
    println!("wedding-site self-diagnostics");

    let checks = collect(config);

    println!();
    for entry in &checks {
        entry.print();
    }

    if checks
        .iter()
        .any(|entry| matches!(entry.level, Level::Error))
    {
        Err(anyhow!("self-diagnostics reported issues"))
    } else {
        Ok(())
    }
}

fn collect(config: &SiteConfig) -> Vec<Diagnostic> {
    let mut checks = Vec::new();
    checks.push(Diagnostic::ok(
        "version",
        format!("wedding-site {}", env!("CARGO_PKG_VERSION")),
    ));
    checks.push(check_directory(
        "translations directory",
        &config.translations_dir,
    ));

    let source = DirectorySource::new(&config.translations_dir);
    let reference = source.load(config.default_language).ok();
    for &language in &config.supported_languages {
        checks.push(check_dictionary(&source, language, reference.as_ref()));
    }

    checks.push(check_wedding_data(&config.wedding_data));
    checks.push(check_storage(&config.storage_path));
    checks
}

#[derive(Debug, PartialEq, Eq)]
enum Level {
    Ok,
    Warn,
    Error,
}

struct Diagnostic {
    label: String,
    level: Level,
    detail: String,
}

impl Diagnostic {
    fn new(label: impl Into<String>, level: Level, detail: String) -> Self {
        Self {
            label: label.into(),
            level,
            detail,
        }
    }

    fn ok(label: impl Into<String>, detail: String) -> Self {
        Self::new(label, Level::Ok, detail)
    }

    fn warning(label: impl Into<String>, detail: String) -> Self {
        Self::new(label, Level::Warn, detail)
    }

    fn error(label: impl Into<String>, detail: String) -> Self {
        Self::new(label, Level::Error, detail)
    }

    fn print(&self) {
        let tag = match self.level {
            Level::Ok => self.level.tag().green(),
            Level::Warn => self.level.tag().yellow(),
            Level::Error => self.level.tag().red().bold(),
        };
        println!("  [{}] {:24} {}", tag, self.label, self.detail);
    }
}

impl Level {
    fn tag(&self) -> &'static str {
        match self {
            Level::Ok => "OK",
            Level::Warn => "WARN",
            Level::Error => "ERR",
        }
    }
}

/// Keys of a reference dictionary and the ones another dictionary lacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageReport {
    pub total: usize,
    pub missing: Vec<String>,
}

impl CoverageReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn covered(&self) -> usize {
        self.total - self.missing.len()
    }
}

pub fn coverage(reference: &Dictionary, other: &Dictionary) -> CoverageReport {
    let present: BTreeSet<String> = other.keys().into_iter().collect();
    let expected = reference.keys();
    let missing = expected
        .iter()
        .filter(|key| !present.contains(*key))
        .cloned()
        .collect();
    CoverageReport {
        total: expected.len(),
        missing,
    }
}

fn check_directory(label: &'static str, path: &Path) -> Diagnostic {
    if path.is_dir() {
        Diagnostic::ok(label, format!("{} exists", path.display()))
    } else if path.exists() {
        Diagnostic::error(
            label,
            format!("{} exists but is not a directory", path.display()),
        )
    } else {
        Diagnostic::error(label, format!("{} missing", path.display()))
    }
}

fn check_dictionary(
    source: &DirectorySource,
    language: LanguageCode,
    reference: Option<&Dictionary>,
) -> Diagnostic {
    let label = format!("dictionary {}", language.code());
    let dictionary = match source.load(language) {
        Ok(dictionary) => dictionary,
        Err(err) => return Diagnostic::error(label, err.to_string()),
    };
    let Some(reference) = reference else {
        return Diagnostic::ok(label, format!("{} keys", dictionary.len()));
    };
    let report = coverage(reference, &dictionary);
    if report.is_complete() {
        Diagnostic::ok(label, format!("{} keys", dictionary.len()))
    } else {
        Diagnostic::warning(
            label,
            format!(
                "{}/{} keys (missing {}, first: {})",
                report.covered(),
                report.total,
                report.missing.len(),
                report.missing[0]
            ),
        )
    }
}

fn check_wedding_data(path: &Path) -> Diagnostic {
    match wedding::load_wedding_data(path) {
        Ok(data) => match data.countdown_target() {
            Ok(target) => Diagnostic::ok(
                "wedding data",
                format!(
                    "{} & {}, ceremony at {}",
                    data.couple.bride.name, data.couple.groom.name, target
                ),
            ),
            Err(err) => Diagnostic::error("wedding data", format!("{:#}", err)),
        },
        Err(err) => Diagnostic::error("wedding data", format!("{:#}", err)),
    }
}

fn check_storage(path: &Path) -> Diagnostic {
    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return writable("preference storage", path);
    };
    if let Err(err) = fs::create_dir_all(parent) {
        return Diagnostic::warning(
            "preference storage",
            format!("cannot create {}: {}", parent.display(), err),
        );
    }
    writable("preference storage", path)
}

fn writable(label: &'static str, path: &Path) -> Diagnostic {
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(_) => Diagnostic::ok(label, format!("{} writable", path.display())),
        Err(err) => Diagnostic::warning(
            label,
            format!("{} not writable: {}", path.display(), err),
        ),
    }
}

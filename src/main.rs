// SPDX-License-Identifier: PMPL-1.0-or-later

//! wedding-site: command-line driver for the invitation page logic
//!
//! Runs the countdown, resolves translations, formats dates and numbers in
//! any supported locale, validates and submits RSVPs, and prints event links.

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use colored::*;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use wedding_site::config::{self, SiteConfig};
use wedding_site::countdown::{CountdownClock, CountdownSnapshot, SystemTime};
use wedding_site::diagnostics;
use wedding_site::i18n::{
    self, detect_from_environment, detect_preferred_language, load_with_fallback,
    DateFormatOptions, DateStyle, DirectorySource, LanguageCode, LocalizationResolver,
    NumberFormatOptions, Presentation, ResolverOptions, SystemLocales,
};
use wedding_site::rsvp::{RsvpForm, RsvpPayload, SimulatedSubmitter, SubmitStatus};
use wedding_site::storage::{self, StorageMode};
use wedding_site::wedding::{self, EventKind, WeddingData};

#[derive(Parser)]
#[command(name = "wedding-site")]
#[command(version)]
#[command(about = "Countdown, translations and RSVP handling for a wedding invitation site")]
#[command(long_about = None)]
struct Cli {
    /// Site configuration (.json, .yaml or .yml)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Preference storage backend: filesystem or memory
    #[arg(long, global = true, default_value = "filesystem")]
    storage: String,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the time left until the ceremony
    Countdown {
        /// RFC 3339 target; defaults to config, then the wedding data
        #[arg(short, long)]
        target: Option<DateTime<Utc>>,

        /// Keep printing one line per tick
        #[arg(short, long)]
        watch: bool,

        /// Stop watching after this many ticks
        #[arg(long)]
        ticks: Option<usize>,
    },

    /// Resolve a dotted translation key
    Translate {
        #[arg(value_name = "KEY")]
        key: String,

        /// Language code; defaults to the saved preference
        #[arg(short, long)]
        lang: Option<String>,

        /// Text to show when the key is missing
        #[arg(short, long)]
        fallback: Option<String>,
    },

    /// Pick a supported language from the environment or a tag list
    Detect {
        /// Comma-separated BCP 47 tags instead of the environment
        #[arg(long, value_delimiter = ',')]
        locales: Option<Vec<String>>,
    },

    /// Read or change the saved language preference
    Language {
        #[command(subcommand)]
        action: LanguageAction,
    },

    /// Format a date in a locale
    FormatDate {
        /// RFC 3339 timestamp or YYYY-MM-DD
        #[arg(value_name = "DATE")]
        date: String,

        #[arg(short, long, default_value = "en")]
        lang: String,

        /// full, long, medium or short
        #[arg(short, long, default_value = "long")]
        style: String,

        /// Append the time of day
        #[arg(long)]
        time: bool,
    },

    /// Format a number in a locale
    FormatNumber {
        #[arg(value_name = "NUMBER", allow_hyphen_values = true)]
        value: f64,

        #[arg(short, long, default_value = "en")]
        lang: String,

        #[arg(long, default_value = "0")]
        min_fraction: usize,

        #[arg(long, default_value = "3")]
        max_fraction: usize,

        #[arg(long)]
        no_grouping: bool,
    },

    /// Validate and submit an RSVP read from a JSON file (or - for stdin)
    Rsvp {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Skip the simulated network delay
        #[arg(long)]
        no_delay: bool,
    },

    /// Print date, time, venue and links for an event
    Event {
        /// ceremony or reception
        #[arg(value_name = "KIND", default_value = "ceremony")]
        kind: String,
    },

    /// Check translations, data files and storage
    Diagnostics,
}

#[derive(Subcommand)]
enum LanguageAction {
    /// Show the active language (detecting and saving one if unset)
    Get,
    /// Switch to a language and save the choice
    Set {
        #[arg(value_name = "CODE")]
        code: String,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = config::load_or_default(cli.config.as_deref())?;
    let storage_mode = StorageMode::parse(&cli.storage)
        .ok_or_else(|| anyhow!("unknown storage mode '{}'", cli.storage))?;

    match cli.command {
        Commands::Countdown {
            target,
            watch,
            ticks,
        } => {
            let target = match target.or(config.countdown_target) {
                Some(target) => target,
                None => load_wedding(&config)?.countdown_target()?,
            };
            run_countdown(&config, target, watch, ticks);
        }

        Commands::Translate {
            key,
            lang,
            fallback,
        } => {
            let text = match lang {
                Some(code) => {
                    let language = parse_language(&code)?;
                    let source = DirectorySource::new(&config.translations_dir);
                    let outcome = load_with_fallback(&source, language, config.default_language);
                    if let Some(err) = &outcome.error {
                        eprintln!("{} {}", "warning:".yellow(), err);
                    }
                    outcome.dictionary.resolve(&key, fallback.as_deref())
                }
                None => {
                    let mut resolver = build_resolver(&config, storage_mode);
                    resolver.init();
                    match fallback {
                        Some(fallback) => resolver.t_or(&key, &fallback),
                        None => resolver.t(&key),
                    }
                }
            };
            println!("{}", text);
        }

        Commands::Detect { locales } => {
            let language = match locales {
                Some(tags) => detect_preferred_language(
                    &tags,
                    &config.supported_languages,
                    config.default_language,
                ),
                None => detect_from_environment(
                    &SystemLocales,
                    &config.supported_languages,
                    config.default_language,
                ),
            };
            println!(
                "{} ({}, {})",
                language.code().bold(),
                language.display_name(),
                language.locale_tag()
            );
        }

        Commands::Language { action } => {
            let mut resolver = build_resolver(&config, storage_mode);
            let presentation = match action {
                LanguageAction::Get => resolver.init(),
                LanguageAction::Set { code } => {
                    let language = parse_language(&code)?;
                    if !config.supported_languages.contains(&language) {
                        bail!("language '{}' is not enabled for this site", code);
                    }
                    resolver.init();
                    resolver.set_language(language)
                }
            };
            print_presentation(&resolver, &presentation);
        }

        Commands::FormatDate {
            date,
            lang,
            style,
            time,
        } => {
            let style =
                DateStyle::parse(&style).ok_or_else(|| anyhow!("unknown date style '{}'", style))?;
            let options = DateFormatOptions {
                style,
                include_time: time,
            };
            let formatted = match DateTime::parse_from_rfc3339(date.trim()) {
                Ok(instant) => i18n::format_date_for_code(&instant, &lang, &options),
                Err(_) => {
                    let day = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
                        .with_context(|| format!("parsing date '{}'", date))?;
                    let at_midnight = day.and_time(chrono::NaiveTime::MIN).and_utc();
                    i18n::format_date_for_code(&at_midnight, &lang, &options)
                }
            };
            println!("{}", formatted);
        }

        Commands::FormatNumber {
            value,
            lang,
            min_fraction,
            max_fraction,
            no_grouping,
        } => {
            if max_fraction > i18n::MAX_FRACTION_DIGITS {
                bail!(
                    "--max-fraction must be at most {}",
                    i18n::MAX_FRACTION_DIGITS
                );
            }
            if min_fraction > max_fraction {
                bail!("--min-fraction must not exceed --max-fraction");
            }
            let options = NumberFormatOptions {
                minimum_fraction_digits: min_fraction,
                maximum_fraction_digits: max_fraction,
                use_grouping: !no_grouping,
            };
            println!("{}", i18n::format_number_for_code(value, &lang, &options));
        }

        Commands::Rsvp { input, no_delay } => {
            let raw = read_input(&input)?;
            let payload: RsvpPayload = serde_json::from_str(&raw)
                .with_context(|| format!("parsing RSVP payload {}", input.display()))?;
            let submitter = SimulatedSubmitter {
                delay: if no_delay {
                    Duration::ZERO
                } else {
                    config.submit_delay()
                },
            };
            let mut form = RsvpForm::new();
            match form.submit(&payload, &submitter) {
                SubmitStatus::Success => {
                    println!("{}", "RSVP received".green().bold());
                    if let Some(receipt) = form.receipt() {
                        println!("{}", serde_json::to_string_pretty(receipt)?);
                    }
                }
                _ => {
                    println!("{}", "RSVP rejected".red().bold());
                    for error in form.errors() {
                        println!("  - {}", error);
                    }
                    bail!("RSVP was not submitted");
                }
            }
        }

        Commands::Event { kind } => {
            let kind =
                EventKind::parse(&kind).ok_or_else(|| anyhow!("unknown event '{}'", kind))?;
            let data = load_wedding(&config)?;
            print_event(&data, kind)?;
        }

        Commands::Diagnostics => {
            diagnostics::run_self_diagnostics(&config)?;
        }
    }

    Ok(())
}

fn parse_language(code: &str) -> Result<LanguageCode> {
    LanguageCode::from_code(code).ok_or_else(|| anyhow!("unsupported language '{}'", code))
}

fn build_resolver(config: &SiteConfig, mode: StorageMode) -> LocalizationResolver {
    LocalizationResolver::new(
        storage::open_store(mode, &config.storage_path),
        Box::new(DirectorySource::new(&config.translations_dir)),
        Box::new(SystemLocales),
        ResolverOptions {
            supported: config.supported_languages.clone(),
            fallback: config.default_language,
        },
    )
}

fn load_wedding(config: &SiteConfig) -> Result<WeddingData> {
    wedding::load_wedding_data(&config.wedding_data)
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut raw = String::new();
        io::stdin()
            .read_to_string(&mut raw)
            .context("reading RSVP payload from stdin")?;
        Ok(raw)
    } else {
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
    }
}

fn run_countdown(config: &SiteConfig, target: DateTime<Utc>, watch: bool, ticks: Option<usize>) {
    let mut clock = CountdownClock::new(Arc::new(SystemTime), config.tick_interval());
    let (tx, rx) = mpsc::channel::<CountdownSnapshot>();
    if watch {
        clock.on_tick(move |snapshot| {
            let _ = tx.send(snapshot);
        });
    }

    let first = clock.start(target);
    if !watch {
        print_snapshot(&first);
        return;
    }

    let mut seen = 0;
    for snapshot in rx.iter() {
        print_snapshot(&snapshot);
        seen += 1;
        if snapshot.is_expired || ticks.is_some_and(|limit| seen >= limit) {
            break;
        }
    }
    clock.stop();
}

fn print_snapshot(snapshot: &CountdownSnapshot) {
    if snapshot.is_expired {
        println!("{}", "The celebration has begun".magenta().bold());
    } else {
        println!(
            "{} days  {:02} hours  {:02} minutes  {:02} seconds",
            snapshot.days.to_string().bold(),
            snapshot.hours,
            snapshot.minutes,
            snapshot.seconds
        );
    }
}

fn print_presentation(resolver: &LocalizationResolver, presentation: &Presentation) {
    let language = resolver.current_language();
    println!(
        "{} {} ({}, {})",
        language.flag(),
        resolver.display_name().bold(),
        language.english_name(),
        presentation.lang_tag
    );
    println!("  dir:         {}", presentation.direction);
    println!(
        "  font:        {}",
        presentation.font_family.unwrap_or("(page default)")
    );
    println!("  line height: {}", presentation.line_height);
    if let Some(err) = resolver.error() {
        println!("  {} {}", "error:".red(), err);
    }
}

fn print_event(data: &WeddingData, kind: EventKind) -> Result<()> {
    let venue = data.wedding.venue(kind);
    let days = wedding::days_until(&data.wedding.date, Utc::now().naive_utc());
    println!("{}", kind.title().bold().cyan());
    println!(
        "  {}",
        wedding::format_event_date(&data.wedding.date, Some("%A, %B %d, %Y"))
    );
    match &venue.end_time {
        Some(end) => println!(
            "  {} - {}",
            wedding::format_time(&venue.time),
            wedding::format_time(end)
        ),
        None => println!("  {}", wedding::format_time(&venue.time)),
    }
    println!("  {}", venue.venue);
    println!("  {}", venue.address);
    if days > 0 {
        println!("  {} days to go", days);
    }
    println!();
    println!(
        "  {} {}",
        "calendar:".yellow(),
        wedding::calendar_url(&data.calendar_event(kind))?
    );
    println!(
        "  {} {}",
        "directions:".yellow(),
        wedding::directions_url(&venue.address)
    );
    Ok(())
}

// SPDX-License-Identifier: PMPL-1.0-or-later

//! Wedding-site: the logic behind a multilingual wedding invitation page.
//!
//! The page itself is static markup. Everything with behaviour lives here
//! and is driven either by the page host or by the `wedding-site` CLI.
//!
//! COMPONENTS:
//! 1. **i18n**: Dictionary translation, language detection, persisted
//!    preference, and locale-aware date and number formatting.
//! 2. **countdown**: A self-stopping timer counting down to the ceremony.
//! 3. **validation** and **rsvp**: RSVP field rules and the simulated
//!    submission flow.
//! 4. **wedding**: The content model, event dates, and calendar links.

pub mod config;
pub mod countdown;
pub mod diagnostics;
pub mod i18n;
pub mod rsvp;
pub mod storage;
pub mod validation;
pub mod wedding;

#![forbid(unsafe_code)]

//! Localization for VookiImageViewer.
//!
//! Loads Qt Linguist `.ts` translation catalogs, resolves them against the
//! user's locale, and serves translated UI strings with source-text fallback.
//! A [`LocalizationStore`] holds the active locale and switches it atomically
//! at runtime.

pub mod catalog;
pub mod config;
pub mod error;
pub mod locale;
pub mod plural;
pub mod store;
pub mod ts;

pub use catalog::{
    Catalog, CatalogBuilder, Context, ContextCoverage, CoverageReport, EntryStatus, Location,
    Lookup, Message, Translation, TranslationStatus,
};
pub use config::{I18nConfig, I18nConfigError, I18nConfigParse};
pub use error::{I18nError, ParseError};
pub use locale::LanguageTag;
pub use plural::PluralRule;
pub use store::{ActiveLocale, LocalizationStore};
pub use ts::{load, parse_str};

//! Localization configuration (deterministic, env-overridable).
//!
//! # Environment Variables
//! - `VIV_I18N_DIR` (path to the directory holding `.ts` resources)
//! - `VIV_I18N_PREFIXES` (comma-separated resource prefixes, installation order)
//! - `VIV_I18N_USE_SYSTEM` (bool)
//! - `VIV_I18N_LANGUAGE` (language code, used when `VIV_I18N_USE_SYSTEM` is off)
//! - `VIV_I18N_SOURCE_LANGUAGE` (language the source strings are written in)

use std::env;
use std::fmt;
use std::path::PathBuf;

use crate::locale::{self, DEFAULT_LANGUAGE_CODE, LanguageTag};

const ENV_I18N_DIR: &str = "VIV_I18N_DIR";
const ENV_I18N_PREFIXES: &str = "VIV_I18N_PREFIXES";
const ENV_I18N_USE_SYSTEM: &str = "VIV_I18N_USE_SYSTEM";
const ENV_I18N_LANGUAGE: &str = "VIV_I18N_LANGUAGE";
const ENV_I18N_SOURCE_LANGUAGE: &str = "VIV_I18N_SOURCE_LANGUAGE";

/// Resource prefix of the application's own translations.
pub const DEFAULT_RESOURCE_PREFIX: &str = "VookiImageViewer";

/// Localization settings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct I18nConfig {
    /// Directory searched for resources.
    pub resource_dir: PathBuf,
    /// Resource name prefixes; later prefixes take precedence on lookup.
    pub file_prefixes: Vec<String>,
    /// Follow the system locale instead of `language_code`.
    pub use_system_language: bool,
    /// Explicitly chosen language (e.g. `cs_CZ`).
    pub language_code: String,
    /// Language the untranslated source strings are written in.
    pub source_language: String,
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            resource_dir: PathBuf::from("i18n"),
            file_prefixes: vec![DEFAULT_RESOURCE_PREFIX.to_string()],
            use_system_language: true,
            language_code: DEFAULT_LANGUAGE_CODE.to_string(),
            source_language: "en".to_string(),
        }
    }
}

/// Configuration parse diagnostics (env + validation).
#[derive(Debug, Clone)]
pub struct I18nConfigParse {
    pub config: I18nConfig,
    pub errors: Vec<I18nConfigError>,
}

/// Configuration error with field context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct I18nConfigError {
    pub field: &'static str,
    pub value: String,
    pub message: String,
}

impl I18nConfigError {
    fn new(field: &'static str, value: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for I18nConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={} ({})", self.field, self.value, self.message)
    }
}

impl std::error::Error for I18nConfigError {}

impl I18nConfig {
    /// Parse config from environment variables.
    #[must_use]
    pub fn from_env() -> I18nConfig {
        Self::from_env_with_diagnostics().config
    }

    /// Parse config from environment variables and return diagnostics.
    #[must_use]
    pub fn from_env_with_diagnostics() -> I18nConfigParse {
        from_env_with(|key| env::var(key).ok())
    }

    /// Validate config constraints and return all violations.
    pub fn validate(&self) -> Result<(), Vec<I18nConfigError>> {
        let mut errors = Vec::new();
        if self.file_prefixes.is_empty() {
            errors.push(I18nConfigError::new(
                "file_prefixes",
                "",
                "at least one resource prefix is required",
            ));
        }
        for prefix in &self.file_prefixes {
            if prefix.trim().is_empty() || prefix.contains(['/', '\\']) {
                errors.push(I18nConfigError::new(
                    "file_prefixes",
                    prefix.clone(),
                    "prefix must be a non-empty file name",
                ));
            }
        }
        if LanguageTag::parse(&self.language_code).is_err() {
            errors.push(I18nConfigError::new(
                "language_code",
                self.language_code.clone(),
                "expected a language tag such as cs_CZ",
            ));
        }
        if LanguageTag::parse(&self.source_language).is_err() {
            errors.push(I18nConfigError::new(
                "source_language",
                self.source_language.clone(),
                "expected a language tag such as en",
            ));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// The locale this configuration asks for.
    ///
    /// With `use_system_language`, the system locale wins when it can be
    /// detected; otherwise (or when it cannot) `language_code` is used.
    /// `None` when neither yields a valid tag.
    #[must_use]
    pub fn requested_locale(&self) -> Option<LanguageTag> {
        self.requested_locale_with(locale::detect_system_locale)
    }

    /// Like [`requested_locale`](Self::requested_locale) with an injected
    /// system locale detector.
    pub fn requested_locale_with<F>(&self, detect: F) -> Option<LanguageTag>
    where
        F: FnOnce() -> Option<LanguageTag>,
    {
        let system = if self.use_system_language {
            detect()
        } else {
            None
        };
        system.or_else(|| LanguageTag::parse(&self.language_code).ok())
    }

    /// Parsed source language, defaulting to English when invalid.
    #[must_use]
    pub fn source_language_tag(&self) -> LanguageTag {
        LanguageTag::parse(&self.source_language)
            .unwrap_or_else(|_| LanguageTag::from_primary("en"))
    }
}

fn from_env_with<F>(mut get: F) -> I18nConfigParse
where
    F: FnMut(&str) -> Option<String>,
{
    let mut config = I18nConfig::default();
    let mut errors = Vec::new();

    if let Some(value) = get(ENV_I18N_DIR) {
        if value.trim().is_empty() {
            errors.push(I18nConfigError::new(
                "resource_dir",
                value,
                "expected a directory path",
            ));
        } else {
            config.resource_dir = PathBuf::from(value);
        }
    }

    if let Some(value) = get(ENV_I18N_PREFIXES) {
        let prefixes: Vec<String> = value
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        if prefixes.is_empty() {
            errors.push(I18nConfigError::new(
                "file_prefixes",
                value,
                "expected comma-separated prefixes",
            ));
        } else {
            config.file_prefixes = prefixes;
        }
    }

    if let Some(value) = get(ENV_I18N_USE_SYSTEM) {
        match parse_bool(&value) {
            Some(parsed) => config.use_system_language = parsed,
            None => errors.push(I18nConfigError::new(
                "use_system_language",
                value,
                "expected bool (1/0/true/false)",
            )),
        }
    }

    if let Some(value) = get(ENV_I18N_LANGUAGE) {
        match LanguageTag::parse(&value) {
            Ok(tag) => config.language_code = tag.name(),
            Err(_) => errors.push(I18nConfigError::new(
                "language_code",
                value,
                "expected a language tag such as cs_CZ",
            )),
        }
    }

    if let Some(value) = get(ENV_I18N_SOURCE_LANGUAGE) {
        match LanguageTag::parse(&value) {
            Ok(tag) => config.source_language = tag.name(),
            Err(_) => errors.push(I18nConfigError::new(
                "source_language",
                value,
                "expected a language tag such as en",
            )),
        }
    }

    if let Err(mut validation) = config.validate() {
        errors.append(&mut validation);
    }

    I18nConfigParse { config, errors }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

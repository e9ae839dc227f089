//! Language tags, resource file resolution, and system locale detection.
//!
//! Tags are accepted in both BCP 47 (`cs-CZ`) and POSIX (`cs_CZ.UTF-8`)
//! spellings and normalized to `language[_Script][_REGION]`, the form used in
//! resource file names.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::I18nError;

/// File extension of translation resources.
pub const RESOURCE_EXTENSION: &str = "ts";

/// Separator between the resource prefix and the locale name.
pub const RESOURCE_SEPARATOR: char = '_';

/// Language code used when nothing else is configured.
pub const DEFAULT_LANGUAGE_CODE: &str = "en_US";

/// Environment variables consulted for the system locale, in priority order.
const LOCALE_ENV_VARS: [&str; 3] = ["LC_ALL", "LC_MESSAGES", "LANG"];

/// A validated language tag (e.g. `cs`, `cs_CZ`, `zh_Hant_TW`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct LanguageTag {
    language: String,
    script: Option<String>,
    region: Option<String>,
    variants: Vec<String>,
}

impl LanguageTag {
    /// Parse a BCP 47 or POSIX locale string.
    ///
    /// Encoding (`.UTF-8`) and modifier (`@euro`) suffixes are dropped.
    /// `C` and `POSIX` are rejected: they name no language.
    pub fn parse(input: &str) -> Result<Self, I18nError> {
        let invalid = || I18nError::InvalidLocale(input.to_string());

        let trimmed = input.trim();
        let base = trimmed.split(['.', '@']).next().unwrap_or_default();
        if base.is_empty() || base.eq_ignore_ascii_case("c") || base.eq_ignore_ascii_case("posix") {
            return Err(invalid());
        }

        let mut subtags = base.split(['-', '_']);
        let language = subtags.next().unwrap_or_default();
        let lang_len = language.len();
        if !((2..=3).contains(&lang_len) || (5..=8).contains(&lang_len))
            || !language.bytes().all(|b| b.is_ascii_alphabetic())
        {
            return Err(invalid());
        }

        let mut tag = Self {
            language: language.to_ascii_lowercase(),
            script: None,
            region: None,
            variants: Vec::new(),
        };

        for subtag in subtags {
            let len = subtag.len();
            let alpha = subtag.bytes().all(|b| b.is_ascii_alphabetic());
            let digits = subtag.bytes().all(|b| b.is_ascii_digit());
            let alnum = subtag.bytes().all(|b| b.is_ascii_alphanumeric());

            if len == 4
                && alpha
                && tag.script.is_none()
                && tag.region.is_none()
                && tag.variants.is_empty()
            {
                let mut script = subtag.to_ascii_lowercase();
                script[..1].make_ascii_uppercase();
                tag.script = Some(script);
            } else if ((len == 2 && alpha) || (len == 3 && digits))
                && tag.region.is_none()
                && tag.variants.is_empty()
            {
                tag.region = Some(subtag.to_ascii_uppercase());
            } else if alnum
                && ((5..=8).contains(&len)
                    || (len == 4 && subtag.as_bytes()[0].is_ascii_digit()))
            {
                tag.variants.push(subtag.to_ascii_lowercase());
            } else {
                return Err(invalid());
            }
        }

        Ok(tag)
    }

    /// Tag consisting of a primary language subtag only.
    pub(crate) fn from_primary(language: &str) -> Self {
        Self {
            language: language.to_ascii_lowercase(),
            script: None,
            region: None,
            variants: Vec::new(),
        }
    }

    /// Primary language subtag, lowercase (e.g. `cs`).
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Script subtag, titlecase (e.g. `Hant`).
    #[must_use]
    pub fn script(&self) -> Option<&str> {
        self.script.as_deref()
    }

    /// Region subtag, uppercase (e.g. `CZ`).
    #[must_use]
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Underscore-joined name used in resource file names (e.g. `cs_CZ`).
    #[must_use]
    pub fn name(&self) -> String {
        self.join(RESOURCE_SEPARATOR)
    }

    /// Resource names to try, most specific first.
    ///
    /// `zh_Hant_TW` yields `zh_Hant_TW`, `zh_Hant`, `zh_TW`, `zh`.
    #[must_use]
    pub fn candidates(&self) -> Vec<String> {
        let mut parts: Vec<&str> = self.parts().collect();
        let mut names = Vec::with_capacity(parts.len() + 1);
        while !parts.is_empty() {
            names.push(parts.join("_"));
            parts.pop();
        }
        if let (Some(region), Some(_)) = (&self.region, &self.script) {
            let without_script = format!("{}_{region}", self.language);
            let at = names.len().saturating_sub(1);
            names.insert(at, without_script);
        }
        names.dedup();
        names
    }

    /// Whether both tags share the primary language subtag.
    #[must_use]
    pub fn same_language(&self, other: &LanguageTag) -> bool {
        self.language == other.language
    }

    fn parts(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.language.as_str())
            .chain(self.script.as_deref())
            .chain(self.region.as_deref())
            .chain(self.variants.iter().map(String::as_str))
    }

    fn join(&self, sep: char) -> String {
        let mut out = String::with_capacity(16);
        for (i, part) in self.parts().enumerate() {
            if i > 0 {
                out.push(sep);
            }
            out.push_str(part);
        }
        out
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.join('-'))
    }
}

impl FromStr for LanguageTag {
    type Err = I18nError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for LanguageTag {
    type Error = I18nError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<LanguageTag> for String {
    fn from(tag: LanguageTag) -> Self {
        tag.name()
    }
}

/// Candidate resource paths for `prefix` and `tag` in `dir`, most specific first.
///
/// Mirrors the translator search order: each candidate name as-is, then its
/// lowercase spelling when that differs.
#[must_use]
pub fn resource_candidates(dir: &Path, prefix: &str, tag: &LanguageTag) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for name in tag.candidates() {
        let lower = name.to_ascii_lowercase();
        paths.push(dir.join(resource_file_name(prefix, &name)));
        if lower != name {
            paths.push(dir.join(resource_file_name(prefix, &lower)));
        }
    }
    paths
}

/// First existing resource file for `prefix` and `tag`.
#[must_use]
pub fn locate_resource(dir: &Path, prefix: &str, tag: &LanguageTag) -> Option<PathBuf> {
    resource_candidates(dir, prefix, tag)
        .into_iter()
        .find(|path| path.is_file())
}

fn resource_file_name(prefix: &str, name: &str) -> String {
    format!("{prefix}{RESOURCE_SEPARATOR}{name}.{RESOURCE_EXTENSION}")
}

/// Detect the user's locale from the process environment.
#[must_use]
pub fn detect_system_locale() -> Option<LanguageTag> {
    detect_system_locale_with(|key| std::env::var(key).ok())
}

/// Detect a locale using `get` to read environment variables.
///
/// The first non-empty variable among `LC_ALL`, `LC_MESSAGES`, `LANG` decides;
/// a `C`/`POSIX` value there means no language preference.
pub fn detect_system_locale_with<F>(mut get: F) -> Option<LanguageTag>
where
    F: FnMut(&str) -> Option<String>,
{
    LOCALE_ENV_VARS
        .iter()
        .filter_map(|key| get(key))
        .find(|value| !value.trim().is_empty())
        .and_then(|value| LanguageTag::parse(&value).ok())
}

/// A language offered in the preferences language picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageRecord {
    /// Resource name of the locale (e.g. `cs_CZ`).
    pub code: &'static str,
    /// Name of the language in that language.
    pub name: &'static str,
}

/// Languages the application ships translations for.
pub const SUPPORTED_LANGUAGES: &[LanguageRecord] = &[
    LanguageRecord {
        code: "en_US",
        name: "English",
    },
    LanguageRecord {
        code: "cs_CZ",
        name: "Čeština",
    },
];

/// Look up a supported language by code.
#[must_use]
pub fn find_language(code: &str) -> Option<&'static LanguageRecord> {
    SUPPORTED_LANGUAGES.iter().find(|record| record.code == code)
}

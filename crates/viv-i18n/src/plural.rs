//! Numerus rules: which `<numerusform>` a count selects.
//!
//! Forms are stored in the order translators enter them, so a rule maps a
//! count to a form index rather than to a CLDR category name.

use crate::locale::LanguageTag;

/// Plural selection rule for a language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluralRule {
    /// One form for every count (Japanese, Chinese, Korean, ...).
    Single,
    /// `1` vs. everything else (English, German, ...).
    OneOther,
    /// `0` and `1` vs. everything else (French, Brazilian Portuguese).
    French,
    /// `1`, `2..=4`, everything else.
    CzechSlovak,
    /// Russian-style rule based on the last one and two digits.
    EastSlavic,
    /// `1`, `2..=4` (except teens) by last digit, everything else.
    Polish,
}

impl PluralRule {
    /// Pick the rule for a language tag.
    #[must_use]
    pub fn for_language(tag: &LanguageTag) -> Self {
        match tag.language() {
            "ja" | "zh" | "ko" | "vi" | "th" | "id" | "ms" | "tr" => Self::Single,
            "fr" => Self::French,
            "pt" if tag.region() == Some("BR") => Self::French,
            "cs" | "sk" => Self::CzechSlovak,
            "ru" | "uk" | "be" | "sr" | "hr" | "bs" => Self::EastSlavic,
            "pl" => Self::Polish,
            _ => Self::OneOther,
        }
    }

    /// Number of numerus forms a complete translation carries.
    #[must_use]
    pub const fn form_count(self) -> usize {
        match self {
            Self::Single => 1,
            Self::OneOther | Self::French => 2,
            Self::CzechSlovak | Self::EastSlavic | Self::Polish => 3,
        }
    }

    /// Index of the numerus form selected by `n`.
    #[must_use]
    pub fn form_index(self, n: u64) -> usize {
        let mod10 = n % 10;
        let mod100 = n % 100;
        match self {
            Self::Single => 0,
            Self::OneOther => usize::from(n != 1),
            Self::French => usize::from(n > 1),
            Self::CzechSlovak => match n {
                1 => 0,
                2..=4 => 1,
                _ => 2,
            },
            Self::EastSlavic => {
                if mod10 == 1 && mod100 != 11 {
                    0
                } else if (2..=4).contains(&mod10) && !(12..=14).contains(&mod100) {
                    1
                } else {
                    2
                }
            }
            Self::Polish => {
                if n == 1 {
                    0
                } else if (2..=4).contains(&mod10) && !(12..=14).contains(&mod100) {
                    1
                } else {
                    2
                }
            }
        }
    }
}

//! Error types for catalog loading and locale handling.
//!
//! Lookups never fail; only `load` and locale parsing return errors.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Malformed resource, with a 1-based position in the source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// 1-based line number.
    pub line: u64,
    /// 1-based column number.
    pub column: u64,
    /// Human-readable description.
    pub message: String,
}

impl ParseError {
    pub(crate) fn new(line: u64, column: u64, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

impl std::error::Error for ParseError {}

/// Errors from i18n operations.
#[derive(Debug)]
pub enum I18nError {
    /// The requested resource file does not exist.
    NotFound { path: PathBuf },
    /// The resource exists but could not be read.
    Io { path: PathBuf, source: io::Error },
    /// The resource could not be parsed.
    Parse {
        path: Option<PathBuf>,
        error: ParseError,
    },
    /// A locale string was malformed.
    InvalidLocale(String),
}

impl I18nError {
    /// Whether this error means "no resource for the requested locale".
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Parse position, if this is a parse failure.
    #[must_use]
    pub fn parse_error(&self) -> Option<&ParseError> {
        match self {
            Self::Parse { error, .. } => Some(error),
            _ => None,
        }
    }

    pub(crate) fn with_path(self, path: impl Into<PathBuf>) -> Self {
        match self {
            Self::Parse { path: None, error } => Self::Parse {
                path: Some(path.into()),
                error,
            },
            other => other,
        }
    }
}

impl From<ParseError> for I18nError {
    fn from(error: ParseError) -> Self {
        Self::Parse { path: None, error }
    }
}

impl fmt::Display for I18nError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { path } => write!(f, "resource not found: {}", path.display()),
            Self::Io { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            Self::Parse {
                path: Some(path),
                error,
            } => write!(f, "parse error in {}:{error}", path.display()),
            Self::Parse { path: None, error } => write!(f, "parse error at {error}"),
            Self::InvalidLocale(l) => write!(f, "invalid locale: {l}"),
        }
    }
}

impl std::error::Error for I18nError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { error, .. } => Some(error),
            _ => None,
        }
    }
}

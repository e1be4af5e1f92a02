//! Error types for the command finder.
//!
//! Only [`Error::CatalogLoad`] aborts a search; everything else degrades
//! locally. A corrupt personal catalog surfaces as a [`CatalogParseWarning`]
//! on the loaded catalog, never as an `Err`.

use std::fmt;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No usable primary catalog after retries and every fallback path.
    #[error("could not load command catalog: {reason}")]
    CatalogLoad {
        attempted: Vec<PathBuf>,
        reason: String,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("config error: {0}")]
    Config(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Raised by a [`SuggestionProvider`](crate::collab::SuggestionProvider).
    #[error("suggestion provider failed: {0}")]
    Suggestion(String),
}

impl Error {
    /// Remediation hints shown alongside a fatal error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Error::CatalogLoad { attempted, .. } => {
                let mut hints = vec![
                    "Check that the command catalog file exists and is readable".to_string(),
                    "Reinstall the catalog or re-run setup to recreate it".to_string(),
                ];
                if let Some(first) = attempted.first() {
                    hints.push(format!("Expected the catalog at '{}'", first.display()));
                }
                hints
            }
            Error::Validation(ValidationError::Empty) => {
                vec!["Describe what you want to do, e.g. \"compress a directory\"".to_string()]
            }
            Error::Validation(ValidationError::TooLong { max, .. }) => {
                vec![format!("Shorten the query to at most {max} characters")]
            }
            _ => Vec::new(),
        }
    }

    /// Whether retrying the same read could plausibly succeed.
    pub(crate) fn is_transient(&self) -> bool {
        match self {
            Error::Io { source, .. } => !matches!(
                source.kind(),
                std::io::ErrorKind::NotFound
                    | std::io::ErrorKind::PermissionDenied
                    | std::io::ErrorKind::InvalidData
            ),
            _ => false,
        }
    }
}

/// A query rejected before normalization.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("query cannot be empty")]
    Empty,
    #[error("query too long ({len} characters, max {max})")]
    TooLong { len: usize, max: usize },
}

/// The personal catalog (or one record of a catalog) could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogParseWarning {
    pub path: PathBuf,
    pub message: String,
}

impl fmt::Display for CatalogParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_validation() {
        let err: Error = ValidationError::TooLong { len: 1200, max: 1000 }.into();
        assert_eq!(err.to_string(), "query too long (1200 characters, max 1000)");
        assert_eq!(Error::from(ValidationError::Empty).to_string(), "query cannot be empty");
    }

    #[test]
    fn catalog_load_carries_suggestions() {
        let err = Error::CatalogLoad {
            attempted: vec![PathBuf::from("/tmp/commands.yml")],
            reason: "not found".into(),
        };
        let hints = err.suggestions();
        assert_eq!(hints.len(), 3);
        assert!(hints[2].contains("/tmp/commands.yml"));
    }

    #[test]
    fn not_found_is_not_transient() {
        let err = Error::Io {
            path: PathBuf::from("x"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(!err.is_transient());

        let err = Error::Io {
            path: PathBuf::from("x"),
            source: std::io::Error::from(std::io::ErrorKind::Interrupted),
        };
        assert!(err.is_transient());
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}

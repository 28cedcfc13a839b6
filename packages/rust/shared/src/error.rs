//! Error types for DraftForge.
//!
//! Library crates use [`DraftForgeError`] via `thiserror`.
//! App crates (cli) wrap this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all DraftForge operations.
#[derive(Debug, thiserror::Error)]
pub enum DraftForgeError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error from the search-data API.
    #[error("search fetch error: {0}")]
    Network(String),

    /// Generative-text API error (transport, status, or response shape).
    #[error("generation error: {0}")]
    Generation(String),

    /// Database or storage layer error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (template set too short, invalid status, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Article assembly failed; detail is logged, not exposed to the caller.
    #[error("error in creating article")]
    ArticleCreation,

    /// No article matched the requested user/article pair.
    #[error("article not found")]
    ArticleNotFound,

    /// Article read failed for a reason other than a missing row.
    #[error("error in fetching article")]
    ArticleFetch,
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DraftForgeError>;

impl DraftForgeError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for errors surfaced to API consumers as a 404-class condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ArticleNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = DraftForgeError::config("missing API key");
        assert_eq!(err.to_string(), "config error: missing API key");

        let err = DraftForgeError::validation("usecase set has 5 entries, expected at least 7");
        assert!(err.to_string().contains("5 entries"));
    }

    #[test]
    fn user_facing_errors_hide_detail() {
        // The creation error carries no inner detail; it is logged instead.
        assert_eq!(
            DraftForgeError::ArticleCreation.to_string(),
            "error in creating article"
        );
        assert_eq!(
            DraftForgeError::ArticleNotFound.to_string(),
            "article not found"
        );
    }

    #[test]
    fn not_found_classification() {
        assert!(DraftForgeError::ArticleNotFound.is_not_found());
        assert!(!DraftForgeError::ArticleFetch.is_not_found());
        assert!(!DraftForgeError::Network("boom".into()).is_not_found());
    }
}

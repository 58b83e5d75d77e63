//! Error types for the gallery client core.
//!
//! Two failure families are kept deliberately distinct:
//! - `ParseError`: a downloaded page no longer matches the structural
//!   contract the extraction engine relies on. These fail fast; the caller
//!   shows a failed-load state, never a partially decoded gallery.
//! - `ValidationError`: a user-written search phrase broke a documented
//!   limit. User-facing, never a defect.

use thiserror::Error;

/// Longest markup fragment carried inside a `ParseError`.
const EXCERPT_LEN: usize = 120;

/// A structurally required element, attribute or pattern was missing or
/// unrecognized while decoding a page.
#[derive(Debug, Clone, Error)]
#[error("failed to parse `{field}` near: {excerpt:?}")]
pub struct ParseError {
    /// Name of the field or structure that could not be decoded.
    pub field: &'static str,
    /// Excerpt of the markup that was being examined.
    pub excerpt: String,
}

impl ParseError {
    pub fn new(field: &'static str, fragment: &str) -> Self {
        let trimmed = fragment.trim();
        let excerpt = if trimmed.len() > EXCERPT_LEN {
            let mut end = EXCERPT_LEN;
            while !trimmed.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}…", &trimmed[..end])
        } else {
            trimmed.to_string()
        };
        Self { field, excerpt }
    }
}

/// A search phrase violated one of the documented limits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

/// Application-wide error type for the collaborator layers (fetcher, store).
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Network request failed before any parser ran
    #[error("network error: {0}")]
    Network(String),

    /// Local catalogue operation failed
    #[error("database error: {0}")]
    Database(String),

    /// Generic error with context
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a database error
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }
}

/// Result type alias using AppError.
pub type Result<T> = std::result::Result<T, AppError>;

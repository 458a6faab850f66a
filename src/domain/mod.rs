//! Core domain types
//!
//! This module contains the domain model shared across the pipeline:
//! entity spans, languages, and the error hierarchy.

pub mod errors;
pub mod span;

pub use errors::VeilError;
pub use span::{EntitySpan, SpanSource};

/// Result type alias using [`VeilError`]
pub type Result<T> = std::result::Result<T, VeilError>;

/// Language profile for entity recognition
///
/// Selects both the token-classification model id and the heuristic
/// detector's date/format assumptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    English,
    Spanish,
}

impl Language {
    /// Short language code used in logs and cache keys
    pub fn code(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Spanish => "es",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

//! Entity span data model

use serde::{Deserialize, Serialize};

/// Which backend produced a span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanSource {
    /// Remote token-classification model
    Model,
    /// Deterministic heuristic detector
    Heuristic,
}

/// A detected entity span
///
/// `start` and `end` are a half-open **character** offset range into a
/// specific text snapshot. The invariant `0 <= start <= end <= char_len`
/// is not enforced here; the masker clamps spans against the snapshot it
/// actually slices, so spans computed against a slightly different text
/// never cause a panic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySpan {
    /// Start character offset (inclusive)
    pub start: usize,
    /// End character offset (exclusive)
    pub end: usize,
    /// Normalized category label (e.g., PER, LOC, DATE, EMAIL)
    pub group: String,
    /// Confidence score in [0, 1]
    pub score: f32,
    /// Backend that produced this span
    pub source: SpanSource,
}

impl EntitySpan {
    /// Create a new span, clamping the score into [0, 1]
    pub fn new(
        start: usize,
        end: usize,
        group: impl Into<String>,
        score: f32,
        source: SpanSource,
    ) -> Self {
        Self {
            start,
            end,
            group: group.into(),
            score: score.clamp(0.0, 1.0),
            source,
        }
    }

    /// Span length in characters (zero for inverted ranges)
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the span covers no characters
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

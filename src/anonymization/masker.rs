//! Span masking
//!
//! Rewrites text by replacing entity spans with category placeholder
//! tags. Spans are processed strictly right-to-left (descending start
//! offset), so the coordinates of spans that haven't been processed yet
//! remain valid throughout - only text to their right is ever mutated.
//! Offsets are clamped against the current snapshot before slicing, so
//! spans computed against a slightly different text never panic.

use crate::config::MaskingConfig;
use crate::domain::EntitySpan;
use std::collections::HashMap;

/// Fallback tag for categories without a mapping
const GENERIC_TAG: &str = "<ENT>";

/// Mapping from normalized entity category to placeholder tag
pub struct MaskingPolicy {
    tags: HashMap<&'static str, &'static str>,
    min_span_chars: usize,
}

impl MaskingPolicy {
    /// Build the policy from configuration
    pub fn new(config: &MaskingConfig) -> Self {
        let tags: HashMap<&'static str, &'static str> = [
            ("PER", "<NAME>"),
            ("LOC", "<LOC>"),
            ("ORG", "<ORG>"),
            ("DATE", "<DATE>"),
            ("ID", "<ID>"),
            ("CASE", "<USCIS_CASE>"),
            ("PHONE", "<PHONE>"),
            ("EMAIL", "<EMAIL>"),
        ]
        .into_iter()
        .collect();

        Self {
            tags,
            min_span_chars: config.min_span_chars,
        }
    }

    /// Placeholder tag for a normalized category
    pub fn tag_for(&self, group: &str) -> &'static str {
        self.tags.get(group).copied().unwrap_or(GENERIC_TAG)
    }

    /// Minimum span length accepted by the masker
    pub fn min_span_chars(&self) -> usize {
        self.min_span_chars
    }
}

impl Default for MaskingPolicy {
    fn default() -> Self {
        Self::new(&MaskingConfig::default())
    }
}

/// Replace entity spans in `text` with the policy's placeholder tags
///
/// Spans without a category or shorter than the policy minimum are
/// dropped as tokenization noise. Categories are uppercased before
/// lookup; unknown categories map to the generic tag.
pub fn mask(text: &str, spans: &[EntitySpan], policy: &MaskingPolicy) -> String {
    let mut accepted: Vec<(usize, usize, &'static str)> = spans
        .iter()
        .filter(|s| !s.group.trim().is_empty() && s.len() >= policy.min_span_chars())
        .map(|s| {
            let group = s.group.trim().to_uppercase();
            (s.start, s.end, policy.tag_for(&group))
        })
        .collect();

    // Rightmost span first; earlier spans' coordinates stay valid since
    // only text to their right gets mutated.
    accepted.sort_by(|a, b| b.0.cmp(&a.0));

    let mut masked = text.to_string();
    for (start, end, tag) in accepted {
        let char_len = masked.chars().count();
        let end = end.min(char_len);
        let start = start.min(end);
        if start == end {
            continue;
        }
        let byte_start = byte_at(&masked, start);
        let byte_end = byte_at(&masked, end);
        masked.replace_range(byte_start..byte_end, tag);
    }
    masked
}

/// Byte offset of the given character offset (text length when past the end)
fn byte_at(text: &str, char_idx: usize) -> usize {
    text.char_indices()
        .nth(char_idx)
        .map(|(b, _)| b)
        .unwrap_or(text.len())
}

//! Deterministic heuristic entity detector
//!
//! The fallback recognizer used whenever the remote model is disabled,
//! still loading, or has failed. Detection is conservative: labeled
//! fields, a few strongly-shaped unlabeled patterns (dates, addresses,
//! case numbers), and contact details. Spans may overlap; the masker
//! reconciles them downstream.
//!
//! `detect` is pure and never fails - an empty input produces an empty
//! span list.

use crate::domain::{EntitySpan, Language, SpanSource};
use anyhow::{Context, Result};
use regex::Regex;

/// English month abbreviations for unlabeled date detection
const MONTHS_EN: &str = "Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Sept|Oct|Nov|Dec";
/// Spanish month abbreviations
const MONTHS_ES: &str = "Ene|Feb|Mar|Abr|May|Jun|Jul|Ago|Sep|Sept|Oct|Nov|Dic";

/// Deterministic entity detector over contextual patterns
pub struct HeuristicDetector {
    name_label: Regex,
    first_label: Regex,
    last_label: Regex,
    uppercase_for: Regex,
    title_name_context: Regex,
    date: Regex,
    passport: Regex,
    case_number: Regex,
    address: Regex,
    city_state_zip: Regex,
    phone: Regex,
    email: Regex,
}

impl HeuristicDetector {
    /// Compile the detector for a language profile
    pub fn new(language: Language) -> Result<Self> {
        let months = match language {
            Language::English => MONTHS_EN,
            Language::Spanish => MONTHS_ES,
        };

        let compile = |name: &str, pattern: &str| {
            Regex::new(pattern).with_context(|| format!("invalid heuristic pattern '{name}'"))
        };

        Ok(Self {
            // Label values stop at a column boundary (double space or line
            // end), like the rule table, so one field never swallows the
            // next field's anchor on two-column form layouts.
            name_label: compile(
                "name_label",
                r"(?i)\b(?:Name|Full Name|Applicant Name|Client Name|Beneficiary Name|Person Name)\s*[:\-]\s*([^\n]{2,150}?)(?:\s{2}|\n|$)",
            )?,
            first_label: compile(
                "first_label",
                r"(?i)\b(?:First|Given)\s*(?:Name)?\s*[:\-]\s*([^\n]{2,80}?)(?:\s{2}|\n|$)",
            )?,
            last_label: compile(
                "last_label",
                r"(?i)\b(?:Last|Surname|Family)\s*(?:Name)?\s*[:\-]\s*([^\n]{2,80}?)(?:\s{2}|\n|$)",
            )?,
            uppercase_for: compile("uppercase_for", r"\bFor:\s*([A-Z][A-Z\s.'-]{2,200})")?,
            title_name_context: compile(
                "title_name_context",
                r"(?:Mr\.?|Ms\.?|Mrs\.?|Dr\.?|Name|Full Name)\s*[:\-]?\s*([A-Z][a-z]{2,}\s+[A-Z][a-z]{2,}(?:\s+[A-Z][a-z]{2,})?)",
            )?,
            date: compile(
                "date",
                &format!(
                    r"(?i)\b(\d{{1,2}}[/\-]\d{{1,2}}[/\-]\d{{2,4}}|\d{{4}}\s+(?:{months})[A-Za-z]*\s+\d{{1,2}}|(?:{months})\s+\d{{1,2}},?\s+\d{{4}})\b"
                ),
            )?,
            passport: compile(
                "passport",
                r"(?i)\bPassport\s*(?:No\.?|Number)?\s*[:\-]?\s*([A-Z0-9\-]{5,20})\b",
            )?,
            case_number: compile(
                "case_number",
                r"(?i)\b(?:IOE|EAC|WAC|LIN|SRC|MSC|NBC|YSC)\d{10}\b",
            )?,
            address: compile(
                "address",
                r"(?i)\b\d{1,5}\s+[A-Za-z0-9.\s]{2,100}\s+(?:Street|St|Avenue|Ave|Road|Rd|Boulevard|Blvd|Lane|Ln|Drive|Dr|Court|Ct)\b",
            )?,
            city_state_zip: compile(
                "city_state_zip",
                r"\b([A-Za-z\s\-]{2,80}),\s*([A-Z]{2})\s*(\d{5}(?:-\d{4})?)\b",
            )?,
            phone: compile("phone", r"(?:(?:\+?\d[\s\-()])?(?:\d[\s\-()]){7,}\d)")?,
            email: compile("email", r"(?i)[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}")?,
        })
    }

    /// Detect entity spans in the text
    ///
    /// Returns spans with **character** offsets, sorted by descending
    /// start offset - a stable contract relied on by callers that may
    /// not re-sort.
    pub fn detect(&self, text: &str) -> Vec<EntitySpan> {
        let mut spans = Vec::new();
        if text.is_empty() {
            return spans;
        }

        let offsets = CharOffsets::new(text);
        let mut push = |group: &str, start: usize, end: usize, score: f32| {
            spans.push(EntitySpan::new(
                offsets.at(start),
                offsets.at(end),
                group,
                score,
                SpanSource::Heuristic,
            ));
        };

        for caps in self.name_label.captures_iter(text) {
            if let Some(g) = caps.get(1) {
                push("PER", g.start(), g.end(), 0.99);
            }
        }
        for caps in self.first_label.captures_iter(text) {
            if let Some(g) = caps.get(1) {
                push("PER", g.start(), g.end(), 0.95);
            }
        }
        for caps in self.last_label.captures_iter(text) {
            if let Some(g) = caps.get(1) {
                push("PER", g.start(), g.end(), 0.95);
            }
        }
        for caps in self.uppercase_for.captures_iter(text) {
            if let Some(g) = caps.get(1) {
                let trimmed = g.as_str().trim_end();
                if trimmed.len() >= 3 {
                    push("PER", g.start(), g.start() + trimmed.len(), 0.95);
                }
            }
        }
        for caps in self.title_name_context.captures_iter(text) {
            if let Some(g) = caps.get(1) {
                push("PER", g.start(), g.end(), 0.9);
            }
        }
        for m in self.date.find_iter(text) {
            push("DATE", m.start(), m.end(), 0.98);
        }
        for caps in self.passport.captures_iter(text) {
            if let Some(g) = caps.get(1) {
                push("ID", g.start(), g.end(), 0.9);
            }
        }
        for m in self.case_number.find_iter(text) {
            push("CASE", m.start(), m.end(), 0.98);
        }
        for m in self.address.find_iter(text) {
            push("LOC", m.start(), m.end(), 0.9);
        }
        for caps in self.city_state_zip.captures_iter(text) {
            // City and state are locations; the zip is tagged DATE purely
            // for downstream masking-tag selection (legacy behavior).
            if let Some(g) = caps.get(1) {
                let trimmed = g.as_str().trim();
                let lead = g.as_str().len() - g.as_str().trim_start().len();
                if !trimmed.is_empty() {
                    push("LOC", g.start() + lead, g.start() + lead + trimmed.len(), 0.9);
                }
            }
            if let Some(g) = caps.get(2) {
                push("LOC", g.start(), g.end(), 0.9);
            }
            if let Some(g) = caps.get(3) {
                push("DATE", g.start(), g.end(), 0.9);
            }
        }
        for m in self.phone.find_iter(text) {
            push("PHONE", m.start(), m.end(), 0.95);
        }
        for m in self.email.find_iter(text) {
            push("EMAIL", m.start(), m.end(), 0.99);
        }

        spans.sort_by(|a, b| b.start.cmp(&a.start));
        spans
    }
}

/// Byte-offset to character-offset translation for one text snapshot
struct CharOffsets {
    // Sorted (byte, char) pairs, one per character boundary.
    boundaries: Vec<(usize, usize)>,
}

impl CharOffsets {
    fn new(text: &str) -> Self {
        let mut boundaries: Vec<(usize, usize)> = text
            .char_indices()
            .enumerate()
            .map(|(ci, (bi, _))| (bi, ci))
            .collect();
        boundaries.push((text.len(), boundaries.len()));
        Self { boundaries }
    }

    /// Character offset for a byte offset on a char boundary
    fn at(&self, byte: usize) -> usize {
        match self.boundaries.binary_search_by_key(&byte, |&(b, _)| b) {
            Ok(i) => self.boundaries[i].1,
            Err(i) => self.boundaries[i.saturating_sub(1)].1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> HeuristicDetector {
        HeuristicDetector::new(Language::English).expect("heuristic patterns should compile")
    }

    fn groups_at(spans: &[EntitySpan], group: &str) -> usize {
        spans.iter().filter(|s| s.group == group).count()
    }

    #[test]
    fn test_empty_input() {
        assert!(detector().detect("").is_empty());
    }

    #[test]
    fn test_labeled_name() {
        // Both the label detector and the title-case detector fire here;
        // overlapping spans are reconciled downstream by the masker.
        let spans = detector().detect("Name: John Smith");
        assert!(groups_at(&spans, "PER") >= 1);
        assert!(spans
            .iter()
            .any(|s| s.group == "PER" && (s.start, s.end) == (6, 16)));
        assert!(spans.iter().all(|s| s.source == SpanSource::Heuristic));
    }

    #[test]
    fn test_label_value_stops_at_column_boundary() {
        let text = "Last Name: RIVERA  First Name: ANA";
        let spans = detector().detect(text);
        let chars: Vec<char> = text.chars().collect();
        let values: Vec<String> = spans
            .iter()
            .filter(|s| s.group == "PER")
            .map(|s| chars[s.start..s.end].iter().collect())
            .collect();
        assert!(values.contains(&"RIVERA".to_string()), "got: {values:?}");
        assert!(values.contains(&"ANA".to_string()), "got: {values:?}");
        assert!(
            values.iter().all(|v| !v.contains("First")),
            "a value swallowed the next field's anchor: {values:?}"
        );
    }

    #[test]
    fn test_uppercase_for_name() {
        let spans = detector().detect("For: JOHN DOE  Case");
        assert!(spans.iter().any(|s| s.group == "PER"));
    }

    #[test]
    fn test_date_formats() {
        let spans = detector().detect("born 04/03/1990 and Mar 4, 1990");
        assert_eq!(groups_at(&spans, "DATE"), 2);
    }

    #[test]
    fn test_passport_and_case_number() {
        let spans = detector().detect("Passport No: X1234567 receipt IOE1234567890");
        assert_eq!(groups_at(&spans, "ID"), 1);
        assert_eq!(groups_at(&spans, "CASE"), 1);
    }

    #[test]
    fn test_street_address() {
        let spans = detector().detect("lives at 123 Main Street in town");
        assert_eq!(groups_at(&spans, "LOC"), 1);
    }

    #[test]
    fn test_city_state_zip_contributes_three_spans() {
        let spans = detector().detect("Springfield, IL 62704");
        assert_eq!(groups_at(&spans, "LOC"), 2);
        // Zip is tagged DATE for downstream tag selection
        assert_eq!(groups_at(&spans, "DATE"), 1);
    }

    #[test]
    fn test_email() {
        let spans = detector().detect("mail jane@example.com now");
        assert_eq!(groups_at(&spans, "EMAIL"), 1);
    }

    #[test]
    fn test_sorted_by_descending_start() {
        let spans = detector().detect("Name: John Smith mail jane@example.com on 04/03/1990");
        let starts: Vec<usize> = spans.iter().map(|s| s.start).collect();
        let mut sorted = starts.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(starts, sorted);
    }

    #[test]
    fn test_char_offsets_with_multibyte_text() {
        // The label value starts after a multi-byte prefix; offsets must
        // be character offsets, not byte offsets.
        let text = "日本語 Name: John Smith";
        let spans = detector().detect(text);
        let chars: Vec<char> = text.chars().collect();
        let values: Vec<String> = spans
            .iter()
            .filter(|s| s.group == "PER")
            .map(|s| chars[s.start..s.end].iter().collect())
            .collect();
        assert!(!values.is_empty());
        assert!(values.iter().all(|v| v == "John Smith"));
    }

    #[test]
    fn test_spanish_profile_dates() {
        let detector = HeuristicDetector::new(Language::Spanish).unwrap();
        let spans = detector.detect("fecha 04/03/1990 y Ene 4, 1990");
        assert_eq!(spans.iter().filter(|s| s.group == "DATE").count(), 2);
    }

    #[test]
    fn test_determinism() {
        let text = "Name: John Smith mail jane@example.com";
        assert_eq!(detector().detect(text), detector().detect(text));
    }
}

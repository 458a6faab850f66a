//! Ordered regex rule table
//!
//! The rule table is the deterministic backbone of the pipeline: it runs
//! once before the recognizer and once after, so rule-based coverage is
//! guaranteed regardless of recognizer health. Rules are declarative
//! records (pattern + replacement strategy) interpreted by one small
//! evaluator, and are applied in a fixed priority order - each rule is
//! matched and replaced globally across the whole text before the next
//! rule runs, so later rules never re-match text already replaced.
//!
//! The table targets structured and labeled PII found in migration and
//! identity documents: form numbers, contact details, payment cards,
//! labeled name/date/address fields, case and passport numbers.
//!
//! `apply` is total: a replacement failure for one match keeps that match
//! unmodified and continues, and a runtime match error (possible with
//! backtracking patterns) leaves the remainder of the text untouched for
//! that rule only.

use anyhow::{Context, Result};
use fancy_regex::{Captures, Match, Regex};

/// Month name alternation (long and short forms) for date detectors
const MONTHS: &str = "January|February|March|April|May|June|July|August|September|October|November|December|Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Sept|Oct|Nov|Dec";

/// Replacement strategy for a rule
#[derive(Debug, Clone)]
enum Replacement {
    /// Replace the whole match with a fixed tag
    Tag(&'static str),
    /// Replace the whole match with a tag suffixed by the last four
    /// digits of the match (bare tag when the match has no digits)
    KeepLastFour(&'static str),
    /// Replace only the listed capture groups inside the match, leaving
    /// surrounding label text intact. Substitution uses the groups' own
    /// offsets within the match, so identical literal values elsewhere in
    /// the text are never disturbed.
    Groups(Vec<(usize, &'static str)>),
}

impl Replacement {
    fn render(&self, caps: &Captures<'_>, m: &Match<'_>) -> Result<String> {
        match self {
            Replacement::Tag(tag) => Ok((*tag).to_string()),
            Replacement::KeepLastFour(tag) => {
                let digits: String = m
                    .as_str()
                    .chars()
                    .filter(|c| c.is_ascii_digit())
                    .collect();
                let keep = &digits[digits.len().saturating_sub(4)..];
                if keep.is_empty() {
                    Ok((*tag).to_string())
                } else {
                    Ok(format!("{tag}_{keep}"))
                }
            }
            Replacement::Groups(groups) => {
                let mut located: Vec<(usize, usize, &str)> = Vec::new();
                for (idx, tag) in groups {
                    if let Some(g) = caps.get(*idx) {
                        // Trim the captured value so surrounding whitespace
                        // survives the substitution (a city capture can end
                        // in a space before the comma).
                        let value = g.as_str();
                        let lead = value.len() - value.trim_start().len();
                        let trimmed = value.trim();
                        if trimmed.is_empty() {
                            continue;
                        }
                        let start = g.start() - m.start() + lead;
                        located.push((start, start + trimmed.len(), tag));
                    }
                }
                if located.is_empty() {
                    anyhow::bail!("no capture group participated in match");
                }
                // Rightmost group first so earlier offsets stay valid.
                located.sort_by(|a, b| b.0.cmp(&a.0));
                let mut rendered = m.as_str().to_string();
                for (start, end, tag) in located {
                    rendered.replace_range(start..end, tag);
                }
                Ok(rendered)
            }
        }
    }
}

/// A single masking rule: compiled pattern plus replacement strategy
#[derive(Debug)]
struct MaskRule {
    name: &'static str,
    pattern: Regex,
    action: Replacement,
}

impl MaskRule {
    fn new(name: &'static str, pattern: &str, action: Replacement) -> Result<Self> {
        let pattern = Regex::new(pattern)
            .with_context(|| format!("invalid pattern for rule '{name}'"))?;
        Ok(Self {
            name,
            pattern,
            action,
        })
    }
}

/// The ordered rule table
pub struct RuleSet {
    rules: Vec<MaskRule>,
}

impl RuleSet {
    /// Compile the built-in rule table
    pub fn new() -> Result<Self> {
        let date = format!(
            r"\d{{4}}\s+(?:{MONTHS})\s+\d{{1,2}}|\d{{1,2}}[/\-]\d{{1,2}}[/\-]\d{{2,4}}|(?:{MONTHS})\s+\d{{1,2}},?\s+\d{{4}}"
        );

        let rules = vec![
            // Shield OMB form numbers before anything else can eat the digits
            MaskRule::new(
                "omb_number",
                r"(?i)\bOMB\s*No\.?\s*\d{4}-\d{4}\b",
                Replacement::Tag("<OMB_NO>"),
            )?,
            MaskRule::new(
                "url",
                r"(?i)\b[a-z][a-z0-9+.\-]*://[^\s)]+",
                Replacement::Tag("<URL>"),
            )?,
            MaskRule::new(
                "email",
                r"(?i)[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}",
                Replacement::Tag("<EMAIL>"),
            )?,
            MaskRule::new(
                "phone",
                r"(?:(?:\+?\d[\s\-()])?(?:\d[\s\-()]){9,14}\d)",
                Replacement::Tag("<PHONE>"),
            )?,
            MaskRule::new(
                "us_ssn",
                r"\b\d{3}-?\d{2}-?\d{4}\b",
                Replacement::Tag("<US_SSN>"),
            )?,
            MaskRule::new(
                "payment_card",
                r"\b(?:\d[ -]?){13,19}\b",
                Replacement::KeepLastFour("<CARD>"),
            )?,
            // Labeled name fields (conservative): replace only the value
            MaskRule::new(
                "labeled_name",
                r"(?i)\b(Name|Full Name|Applicant Name|Client Name|Beneficiary Name|Person Name)\s*[:\-]\s*([^\n]{2,150})",
                Replacement::Groups(vec![(2, "<NAME>")]),
            )?,
            // Name-part labels stop at a column boundary (double space or
            // line end) so a following field's anchor is never consumed.
            MaskRule::new(
                "labeled_last_name",
                r"(?i)\b(Last|Surname|Family)\s*(?:Name)?\s*[:\-]\s*([^\n]{2,80}?)(?=\s{2,}|\n|$)",
                Replacement::Groups(vec![(2, "<NAME_LAST>")]),
            )?,
            MaskRule::new(
                "labeled_first_name",
                r"(?i)\b(First|Given)\s*(?:Name)?\s*[:\-]\s*([^\n]{2,80}?)(?=\s{2,}|\n|$)",
                Replacement::Groups(vec![(2, "<NAME_FIRST>")]),
            )?,
            // Uppercase 'For: NAME' form convention; surrounding whitespace kept
            MaskRule::new(
                "for_name_uppercase",
                r"\bFor:(\s+)([A-Z][A-Z\s.'-]{2,}?)(\s{2,})",
                Replacement::Groups(vec![(2, "<NAME>")]),
            )?,
            // Last/Surname ... First - never eat the 'First' anchor
            MaskRule::new(
                "last_surname_field",
                r"Last/Surname:(\s+)([A-Z][A-Z\s.'-]*?)(\s{2,})First\b",
                Replacement::Groups(vec![(2, "<NAME_LAST>")]),
            )?,
            MaskRule::new(
                "first_given_name_field",
                r"First\s*\(Given\)\s*Name:(\s+)([A-Z][A-Z\s.'-]*?)(?=\s{2,}|$)",
                Replacement::Groups(vec![(2, "<NAME_FIRST>")]),
            )?,
            MaskRule::new(
                "labeled_dob",
                &format!(
                    r"(?i)\b(Date\s+of\s+Birth|Birth\s*Date|DOB|D\.?O\.?B\.)\s*[:\-]?\s*({date})\b"
                ),
                Replacement::Groups(vec![(2, "<DOB>")]),
            )?,
            MaskRule::new(
                "labeled_date",
                &format!(
                    r"(?i)\b(Arrival/Issued\s*Date|Admit\s*Until\s*Date|Issued\s*Date|Issue\s*Date):\s*({date})\b"
                ),
                Replacement::Groups(vec![(2, "<DATE>")]),
            )?,
            // Unlabeled month-name dates, after the labeled variants
            MaskRule::new(
                "month_name_date",
                &format!(r"(?i)\b(?:{MONTHS})\s+\d{{1,2}},?\s+\d{{4}}\b"),
                Replacement::Tag("<DATE>"),
            )?,
            // I-94 record numbers: alphanumeric when labeled, at least one digit
            MaskRule::new(
                "admission_i94",
                r"(?i)\bAdmission\s*I-94\s*Record\s*Number:\s*((?=[A-Z0-9-]*\d)[A-Z0-9-]{9,15})\b",
                Replacement::Groups(vec![(1, "<I94>")]),
            )?,
            MaskRule::new(
                "i94_number",
                r"(?i)\bI[\s-]?94(?:/I[\s-]?95)?\s*(?:No\.?|Number|#|Núm\.?|Nº)?\s*[:#-]?\s*((?=[A-Z0-9-]*\d)[A-Z0-9-]{9,15})\b",
                Replacement::Groups(vec![(1, "<I94>")]),
            )?,
            MaskRule::new(
                "uscis_case",
                r"(?i)\b(?:IOE|EAC|WAC|LIN|SRC|MSC|NBC|YSC)[0-9]{10}\b",
                Replacement::Tag("<USCIS_CASE>"),
            )?,
            MaskRule::new(
                "document_number",
                r"(?i)\bDocument\s*Number:\s*([A-Z0-9]{6,12})\b",
                Replacement::Groups(vec![(1, "<DOC_NO>")]),
            )?,
            // Stop before 'Effective', punctuation, or a double space
            MaskRule::new(
                "country_of_citizenship",
                r"(?i)\bCountry\s+of\s+Citizenship:\s*([A-Z][A-Za-z \-']{1,50}?)(?=\s{2,}|,?\s+Effective\b|[.;]|$)",
                Replacement::Groups(vec![(1, "<COUNTRY>")]),
            )?,
            MaskRule::new(
                "labeled_address",
                r"(?i)\b(Address|Residence|Street|Mailing Address|Home Address)\s*[:\-]\s*([^\n]{3,300})",
                Replacement::Groups(vec![(2, "<ADDRESS>")]),
            )?,
            // City, ST ZIP triples: three independent tags within one match
            MaskRule::new(
                "city_state_zip",
                r"\b([A-Za-z\s\-]{2,80}),\s*([A-Z]{2})\s*(\d{5}(?:-\d{4})?)\b",
                Replacement::Groups(vec![(1, "<CITY>"), (2, "<STATE>"), (3, "<ZIP>")]),
            )?,
            MaskRule::new(
                "zip_code",
                r"\b\d{5}(?:-\d{4})?\b",
                Replacement::Tag("<ZIP>"),
            )?,
            MaskRule::new(
                "labeled_passport",
                r"(?i)\bPassport\s*(?:No\.?|Number)?\s*[:\-]?\s*([A-Z0-9\-]{5,20})\b",
                Replacement::Groups(vec![(1, "<PASSPORT>")]),
            )?,
            MaskRule::new(
                "ipv4",
                r"\b(?:(?:25[0-5]|2[0-4]\d|1?\d?\d)\.){3}(?:25[0-5]|2[0-4]\d|1?\d?\d)\b",
                Replacement::Tag("<IP>"),
            )?,
        ];

        Ok(Self { rules })
    }

    /// Apply every rule in priority order. Always returns a string.
    pub fn apply(&self, text: &str) -> String {
        let mut out = text.to_string();
        for rule in &self.rules {
            out = self.apply_rule(rule, &out);
        }
        out
    }

    fn apply_rule(&self, rule: &MaskRule, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for caps in rule.pattern.captures_iter(text) {
            let caps = match caps {
                Ok(caps) => caps,
                Err(e) => {
                    // Backtracking limit or similar runtime error: keep the
                    // remainder of the text unmodified for this rule.
                    tracing::warn!(rule = rule.name, error = %e, "rule match failed");
                    break;
                }
            };
            let m = match caps.get(0) {
                Some(m) => m,
                None => break,
            };
            out.push_str(&text[last..m.start()]);
            match rule.action.render(&caps, &m) {
                Ok(replacement) => out.push_str(&replacement),
                Err(e) => {
                    tracing::warn!(
                        rule = rule.name,
                        error = %e,
                        "rule replacement failed; keeping original match"
                    );
                    out.push_str(m.as_str());
                }
            }
            last = m.end();
        }
        out.push_str(&text[last..]);
        out
    }
}

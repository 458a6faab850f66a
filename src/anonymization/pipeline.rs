//! Pipeline orchestration
//!
//! Wires the rule table, the recognizer provider, and the span masker
//! into the single entry point the rest of the system consumes. The
//! two-pass-regex-around-recognition structure is the key design
//! decision: the stage-1 pass catches structured PII before any model
//! sees the text, and the stage-2 pass catches what the recognizer
//! missed or what masking newly exposed. Recognizer failures are
//! bounded to one component whose failure mode is "use the heuristic",
//! never "fail the pipeline".

use crate::anonymization::masker::{self, MaskingPolicy};
use crate::anonymization::recognizer::RecognizerProvider;
use crate::anonymization::rules::RuleSet;
use crate::config::VeilConfig;
use crate::domain::Language;
use anyhow::{Context, Result};

/// Per-call options
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymizeOptions {
    /// Use the Spanish language profile for both the model id and the
    /// heuristic detector's date/format assumptions
    pub prefer_spanish: bool,
}

impl AnonymizeOptions {
    fn language(&self) -> Language {
        if self.prefer_spanish {
            Language::Spanish
        } else {
            Language::English
        }
    }
}

/// The text anonymization pipeline
///
/// Construction compiles the rule tables and may fail; [`anonymize`]
/// itself is total and always returns a string.
///
/// [`anonymize`]: Self::anonymize
pub struct AnonymizationPipeline {
    rules: RuleSet,
    provider: RecognizerProvider,
    policy: MaskingPolicy,
}

impl AnonymizationPipeline {
    /// Build the pipeline from configuration
    pub fn new(config: &VeilConfig) -> Result<Self> {
        config.validate().context("invalid configuration")?;

        Ok(Self {
            rules: RuleSet::new().context("failed to compile rule table")?,
            provider: RecognizerProvider::new(config.recognizer.clone())
                .context("failed to create recognizer provider")?,
            policy: MaskingPolicy::new(&config.masking),
        })
    }

    /// Anonymize text, replacing detected PII with category placeholders
    ///
    /// Always returns a string for any input; safe to call repeatedly on
    /// already-masked text. Failures inside the recognizer stage degrade
    /// to the heuristic detector for that call.
    pub async fn anonymize(&self, text: &str, options: &AnonymizeOptions) -> String {
        let language = options.language();

        let stage1 = self.rules.apply(text);

        let recognizer = self.provider.resolve(language).await;
        let spans = match recognizer.detect(&stage1).await {
            Ok(spans) => spans,
            Err(e) => {
                tracing::warn!(
                    language = %language,
                    error = %e,
                    "recognizer invocation failed; substituting heuristic output"
                );
                self.provider.heuristic(language).detect(&stage1)
            }
        };

        let masked = masker::mask(&stage1, &spans, &self.policy);

        self.rules.apply(&masked)
    }
}

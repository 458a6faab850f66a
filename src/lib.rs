// Veil - Text Anonymization Pipeline
// Copyright (c) 2025 Veil Contributors
// Licensed under the MIT License

//! # Veil - Text Anonymization Pipeline
//!
//! Veil replaces personally identifying information (PII) in free-form text
//! with category placeholders so the text can be forwarded to an external,
//! untrusted service. A single unmasked leak defeats the purpose of the
//! product, so the pipeline is built around strict never-fail guarantees:
//! every stage is total, and every failure mode degrades to a deterministic
//! fallback rather than an error.
//!
//! ## Architecture
//!
//! The pipeline runs text through four stages:
//!
//! 1. **Stage-1 rule pass** - an ordered table of regex detectors catches
//!    structured and labeled PII cheaply, before any model sees the text.
//! 2. **Entity recognition** - a remote token-classification model (one per
//!    language, loaded once with a fixed timeout) or, when disabled or
//!    unavailable, a deterministic heuristic detector.
//! 3. **Span masking** - detected spans are normalized, filtered, and
//!    replaced right-to-left by category tag.
//! 4. **Stage-2 rule pass** - the rule table runs again to catch PII the
//!    recognizer missed or that masking newly exposed.
//!
//! Modules:
//!
//! - [`anonymization`] - rule table, heuristic detector, recognizer
//!   provider, span masker, and the pipeline orchestrator
//! - [`cli`] - command-line interface and argument parsing
//! - [`config`] - configuration management
//! - [`domain`] - core domain types and errors
//! - [`logging`] - structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use veil::anonymization::{AnonymizationPipeline, AnonymizeOptions};
//! use veil::config::VeilConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = VeilConfig::default();
//!     let pipeline = AnonymizationPipeline::new(&config)?;
//!
//!     let masked = pipeline
//!         .anonymize("Name: John Smith", &AnonymizeOptions::default())
//!         .await;
//!
//!     assert_eq!(masked, "Name: <NAME>");
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Construction paths (config loading, pattern compilation) return errors;
//! the anonymization call path does not. [`AnonymizationPipeline::anonymize`]
//! always returns a string: per-match replacement failures keep the original
//! substring, recognizer failures substitute the heuristic detector, and
//! malformed spans are clamped or dropped by the masker. Error reporting
//! upward is advisory `tracing` logging only.
//!
//! [`AnonymizationPipeline::anonymize`]: anonymization::AnonymizationPipeline::anonymize

pub mod anonymization;
pub mod cli;
pub mod config;
pub mod domain;
pub mod logging;

//! Text anonymization for Veil
//!
//! This module provides PII detection and masking for free-form text.
//! It combines deterministic regex rules with an optional ML-backed
//! entity recognizer and a heuristic fallback.
//!
//! # Architecture
//!
//! The anonymization pipeline consists of:
//! - **Rules**: Ordered regex table for structured PII (stage 1 and 2)
//! - **Recognizer**: Per-language remote model backend with lifecycle
//!   caching, or the deterministic heuristic detector when the model is
//!   disabled, loading, or failed
//! - **Masking**: Right-to-left span replacement with category tags
//!
//! # Usage
//!
//! ```rust,ignore
//! use veil::anonymization::{AnonymizationPipeline, AnonymizeOptions};
//! use veil::config::VeilConfig;
//!
//! let pipeline = AnonymizationPipeline::new(&VeilConfig::default())?;
//! let masked = pipeline.anonymize("Name: John Smith", &AnonymizeOptions::default()).await;
//! ```

pub mod heuristic;
pub mod masker;
pub mod pipeline;
pub mod recognizer;
pub mod rules;

// Re-export main types
pub use heuristic::HeuristicDetector;
pub use masker::MaskingPolicy;
pub use pipeline::{AnonymizationPipeline, AnonymizeOptions};
pub use recognizer::{EntityRecognizer, RecognizerProvider, RecognizerState};
pub use rules::RuleSet;

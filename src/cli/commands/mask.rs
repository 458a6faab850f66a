//! Mask command implementation
//!
//! This module implements the `mask` command: read text from a file or
//! stdin, run it through the anonymization pipeline, and write the
//! masked result to a file or stdout.

use crate::anonymization::{AnonymizationPipeline, AnonymizeOptions};
use crate::config::VeilConfig;
use anyhow::Context;
use clap::Args;
use std::io::Read;
use std::path::Path;

/// Arguments for the mask command
#[derive(Args, Debug)]
pub struct MaskArgs {
    /// Input file to anonymize (reads stdin when omitted)
    #[arg(short, long)]
    pub input: Option<String>,

    /// Output file (writes stdout when omitted)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Use the Spanish language profile
    #[arg(long)]
    pub spanish: bool,
}

impl MaskArgs {
    /// Execute the mask command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        // Missing config file is fine for masking; defaults run the
        // pipeline in rule+heuristic mode with no network dependency.
        let config = if Path::new(config_path).exists() {
            VeilConfig::from_file(config_path)
                .with_context(|| format!("failed to load configuration from {config_path}"))?
        } else {
            tracing::debug!(config_path = %config_path, "No config file found, using defaults");
            VeilConfig::default()
        };

        let pipeline = AnonymizationPipeline::new(&config)?;
        let options = AnonymizeOptions {
            prefer_spanish: self.spanish,
        };

        let text = match &self.input {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read input file {path}"))?,
            None => {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .context("failed to read stdin")?;
                buf
            }
        };

        tracing::info!(
            input_chars = text.chars().count(),
            spanish = self.spanish,
            "Anonymizing text"
        );

        let masked = pipeline.anonymize(&text, &options).await;

        match &self.output {
            Some(path) => {
                std::fs::write(path, &masked)
                    .with_context(|| format!("failed to write output file {path}"))?;
                println!("✅ Masked output written to {path}");
            }
            None => print!("{masked}"),
        }

        Ok(0)
    }
}

//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Veil configuration file.

use crate::config::VeilConfig;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match VeilConfig::from_file(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Recognizer Enabled: {}", config.recognizer.enabled);
        if config.recognizer.enabled {
            println!("  Inference Endpoint: {}", config.recognizer.endpoint);
            println!("  Model (en): {}", config.recognizer.model_en);
            println!("  Model (es): {}", config.recognizer.model_es);
            println!(
                "  Load Timeout: {}s",
                config.recognizer.load_timeout_secs
            );
            println!(
                "  API Token: {}",
                if config.recognizer.api_token.is_some() {
                    "set"
                } else {
                    "not set"
                }
            );
        }
        println!("  Min Span Chars: {}", config.masking.min_span_chars);
        println!("  File Logging: {}", config.logging.local_enabled);
        if config.logging.local_enabled {
            println!("  Log Path: {}", config.logging.local_path);
            println!("  Log Rotation: {}", config.logging.local_rotation);
        }
        println!();
        Ok(0)
    }
}

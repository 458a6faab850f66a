//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "veil.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Veil configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2); // Configuration error exit code
        }

        match fs::write(&self.output, Self::generate_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. To use a remote model, set recognizer.enabled = true");
                println!("     and export VEIL_RECOGNIZER_API_TOKEN if your endpoint needs one");
                println!("  3. Validate configuration: veil validate-config");
                println!("  4. Anonymize text: veil mask --input notes.txt");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5) // Fatal error exit code
            }
        }
    }

    /// Generate the starter configuration
    fn generate_config() -> String {
        r#"# Veil Configuration File
# Text Anonymization Tool

[recognizer]
# Whether the remote model backend may ever be attempted.
# When false, Veil runs rule+heuristic only with no network dependency.
enabled = false

# Hosted inference endpoint (one model id appended per language)
endpoint = "https://api-inference.huggingface.co/models"

# Model ids per language
model_en = "dslim/bert-base-NER"
model_es = "PlanTL-GOB-ES/roberta-base-bne-ner"

# Model load timeout in seconds; on timeout the heuristic detector is
# used and the model is not retried for the process lifetime
load_timeout_secs = 15

# Optional bearer token (prefer VEIL_RECOGNIZER_API_TOKEN)
# api_token = "${VEIL_RECOGNIZER_API_TOKEN}"

[masking]
# Minimum entity span length in characters; shorter spans are dropped
min_span_chars = 3

[logging]
# Enable local file logging
local_enabled = false

# Local log file path
local_path = "./logs"

# Log rotation (daily or hourly)
local_rotation = "daily"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VeilConfig;

    #[test]
    fn test_generated_config_parses() {
        let config = VeilConfig::from_toml(&InitArgs::generate_config()).unwrap();
        assert!(!config.recognizer.enabled);
        assert_eq!(config.masking.min_span_chars, 3);
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("veil.toml");
        std::fs::write(&path, "existing").unwrap();

        let args = InitArgs {
            output: path.to_string_lossy().into_owned(),
            force: false,
        };
        let code = args.execute().await.unwrap();
        assert_eq!(code, 2);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "existing");
    }

    #[tokio::test]
    async fn test_init_force_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("veil.toml");
        std::fs::write(&path, "existing").unwrap();

        let args = InitArgs {
            output: path.to_string_lossy().into_owned(),
            force: true,
        };
        let code = args.execute().await.unwrap();
        assert_eq!(code, 0);
        assert!(std::fs::read_to_string(&path)
            .unwrap()
            .contains("[recognizer]"));
    }
}

//! Remote token-classification backend
//!
//! Talks to a hosted inference endpoint (one model id per language).
//! Loading performs a warmup request so model availability is proven
//! before the backend is cached as ready; detection posts the text and
//! normalizes the returned entity list into [`EntitySpan`]s, accepting
//! the field-name variations different serving stacks use.

use crate::anonymization::recognizer::EntityRecognizer;
use crate::config::RecognizerConfig;
use crate::domain::{EntitySpan, Language, SpanSource};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

/// Wire-format entity from the inference endpoint
///
/// Different serving stacks name the category field differently
/// (`entity_group` with an aggregation strategy, `entity` or `label`
/// without); offsets and score may be absent for malformed rows.
#[derive(Debug, Deserialize)]
struct WireEntity {
    #[serde(alias = "entity", alias = "label", default)]
    entity_group: String,
    #[serde(default)]
    start: Option<usize>,
    #[serde(default)]
    end: Option<usize>,
    #[serde(default)]
    score: Option<f32>,
}

impl WireEntity {
    fn into_span(self) -> EntitySpan {
        let start = self.start.unwrap_or(0);
        // A row without an end offset is treated as a single character,
        // matching the clamping the masker applies anyway.
        let end = self.end.unwrap_or(start + 1);
        EntitySpan::new(
            start,
            end,
            self.entity_group.to_uppercase(),
            self.score.unwrap_or(0.0),
            SpanSource::Model,
        )
    }
}

/// Loaded remote model backend for one language
pub struct RemoteNerBackend {
    client: reqwest::Client,
    url: String,
    api_token: Option<String>,
}

impl RemoteNerBackend {
    /// Load the backend for a language, proving availability with a
    /// warmup request
    pub async fn load(
        client: reqwest::Client,
        config: &RecognizerConfig,
        language: Language,
    ) -> Result<Self> {
        let model = config.model_for(language);
        let url = format!("{}/{}", config.endpoint.trim_end_matches('/'), model);

        let mut request = client.post(&url).json(&serde_json::json!({
            "inputs": "warmup",
            "options": { "wait_for_model": true }
        }));
        if let Some(ref token) = config.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("model warmup request failed for {model}"))?;
        if !response.status().is_success() {
            anyhow::bail!("model warmup for {model} returned {}", response.status());
        }

        Ok(Self {
            client,
            url,
            api_token: config.api_token.clone(),
        })
    }
}

#[async_trait]
impl EntityRecognizer for RemoteNerBackend {
    async fn detect(&self, text: &str) -> Result<Vec<EntitySpan>> {
        let mut request = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({ "inputs": text }));
        if let Some(ref token) = self.api_token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.context("inference request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("inference endpoint returned {}", response.status());
        }

        let entities: Vec<WireEntity> = response
            .json()
            .await
            .context("malformed inference response")?;

        Ok(entities.into_iter().map(WireEntity::into_span).collect())
    }
}

//! Entity recognizer provider
//!
//! Resolves, loads, and caches one recognizer backend per language. The
//! remote model load is raced against a fixed timeout; losing the race
//! or failing the load commits the language to the heuristic fallback
//! for the process lifetime (no automatic retry). A load that loses the
//! race is not cancelled - if it later completes it may still populate
//! the cache for future calls, but the call that already fell back is
//! never blocked or retried.
//!
//! The state cache is shared and deliberately not single-flighted:
//! concurrent first-use calls for the same language may each attempt a
//! load. A successful load is idempotent to cache (last writer wins),
//! so the worst case is one wasted model load.

pub mod remote;

use crate::anonymization::heuristic::HeuristicDetector;
use crate::config::RecognizerConfig;
use crate::domain::{EntitySpan, Language};
use anyhow::{Context, Result};
use async_trait::async_trait;
use remote::RemoteNerBackend;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::oneshot;

/// A recognizer backend: turns text into entity spans
#[async_trait]
pub trait EntityRecognizer: Send + Sync {
    /// Detect entity spans in the text
    async fn detect(&self, text: &str) -> Result<Vec<EntitySpan>>;
}

#[async_trait]
impl EntityRecognizer for HeuristicDetector {
    async fn detect(&self, text: &str) -> Result<Vec<EntitySpan>> {
        Ok(HeuristicDetector::detect(self, text))
    }
}

/// Per-language recognizer state
///
/// `Unattempted` is represented by absence from the cache. Entries are
/// created on first request and live for the process lifetime.
#[derive(Clone)]
pub enum RecognizerState {
    /// ML backend disabled by configuration; never attempt a load
    Disabled,
    /// A load is in flight; new callers may attempt their own
    Loading,
    /// Backend loaded and ready
    Ready(Arc<RemoteNerBackend>),
    /// Load failed or timed out; heuristic for the process lifetime
    Failed,
}

type StateMap = Arc<RwLock<HashMap<Language, RecognizerState>>>;

/// Resolves and caches recognizer backends per language
pub struct RecognizerProvider {
    config: RecognizerConfig,
    client: reqwest::Client,
    states: StateMap,
    heuristic_en: Arc<HeuristicDetector>,
    heuristic_es: Arc<HeuristicDetector>,
}

impl RecognizerProvider {
    /// Create a provider from configuration
    pub fn new(config: RecognizerConfig) -> Result<Self> {
        // No whole-request deadline on the client: the resolve race
        // enforces its own timeout, and a load that loses the race must
        // be able to finish in the background and cache a late success.
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.load_timeout_secs.max(1)))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            config,
            client,
            states: Arc::new(RwLock::new(HashMap::new())),
            heuristic_en: Arc::new(HeuristicDetector::new(Language::English)?),
            heuristic_es: Arc::new(HeuristicDetector::new(Language::Spanish)?),
        })
    }

    /// The heuristic detector for a language
    pub fn heuristic(&self, language: Language) -> Arc<HeuristicDetector> {
        match language {
            Language::English => Arc::clone(&self.heuristic_en),
            Language::Spanish => Arc::clone(&self.heuristic_es),
        }
    }

    /// Resolve the recognizer for a language
    ///
    /// Always returns a usable recognizer; failure modes degrade to the
    /// heuristic detector, never to an error.
    pub async fn resolve(&self, language: Language) -> Arc<dyn EntityRecognizer> {
        if !self.config.enabled {
            self.set_state(language, RecognizerState::Disabled);
            return self.heuristic(language);
        }

        match self.state(language) {
            Some(RecognizerState::Ready(backend)) => return backend,
            Some(RecognizerState::Disabled) | Some(RecognizerState::Failed) => {
                return self.heuristic(language)
            }
            Some(RecognizerState::Loading) | None => {}
        }

        self.set_state(language, RecognizerState::Loading);
        let (tx, rx) = oneshot::channel();
        let states = Arc::clone(&self.states);
        let client = self.client.clone();
        let config = self.config.clone();
        tokio::spawn(async move {
            match RemoteNerBackend::load(client, &config, language).await {
                Ok(backend) => {
                    let backend = Arc::new(backend);
                    tracing::info!(language = %language, "recognizer backend loaded");
                    if let Ok(mut map) = states.write() {
                        map.insert(language, RecognizerState::Ready(Arc::clone(&backend)));
                    }
                    let _ = tx.send(Ok(backend));
                }
                Err(e) => {
                    tracing::error!(language = %language, error = %e, "recognizer load failed");
                    if let Ok(mut map) = states.write() {
                        map.insert(language, RecognizerState::Failed);
                    }
                    let _ = tx.send(Err(e));
                }
            }
        });

        let timeout = Duration::from_secs(self.config.load_timeout_secs);
        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(Ok(backend))) => backend,
            Ok(Ok(Err(_))) => self.heuristic(language),
            Ok(Err(_closed)) => self.heuristic(language),
            Err(_elapsed) => {
                // The load task keeps running; mark Failed so later calls
                // short-circuit unless a late success overwrites it.
                tracing::warn!(
                    language = %language,
                    timeout_secs = self.config.load_timeout_secs,
                    "recognizer load timed out; using heuristic detector"
                );
                if matches!(self.state(language), Some(RecognizerState::Loading)) {
                    self.set_state(language, RecognizerState::Failed);
                }
                self.heuristic(language)
            }
        }
    }

    fn state(&self, language: Language) -> Option<RecognizerState> {
        self.states
            .read()
            .ok()
            .and_then(|map| map.get(&language).cloned())
    }

    fn set_state(&self, language: Language, state: RecognizerState) {
        if let Ok(mut map) = self.states.write() {
            map.insert(language, state);
        }
    }
}

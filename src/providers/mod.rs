// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Clients for the third-party detection services

pub mod aiornot;
pub mod elevenlabs;
pub mod gptzero;
pub mod hive;
pub mod huggingface;

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ProviderConfig;
use crate::{Result, TruthScanError};

pub use aiornot::AiOrNotClient;
pub use elevenlabs::ElevenLabsClient;
pub use gptzero::{GptZeroClient, GptZeroDocument};
pub use hive::HiveClient;
pub use huggingface::HuggingFaceClient;

const PLACEHOLDER_KEYS: &[&str] = &["your_key_here", "changeme", "replace_me"];

/// True when a key is present and not a template placeholder
pub fn is_key_configured(key: &str) -> bool {
    let key = key.trim();
    !key.is_empty() && !PLACEHOLDER_KEYS.iter().any(|p| key.eq_ignore_ascii_case(p))
}

pub(crate) fn http_client(timeout_secs: u64) -> Result<Client> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?)
}

/// Use the configured URL, or the service's public endpoint when unset
pub(crate) fn url_or(configured: &str, fallback: &str) -> String {
    if configured.trim().is_empty() {
        fallback.to_string()
    } else {
        configured.trim().to_string()
    }
}

/// Read a JSON body, turning non-2xx statuses into provider errors
pub(crate) async fn read_json(
    provider: &'static str,
    response: reqwest::Response,
) -> Result<serde_json::Value> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let snippet: String = body.chars().take(200).collect();
        return Err(TruthScanError::provider(
            provider,
            format!("HTTP {}: {}", status, snippet),
        ));
    }
    Ok(response.json().await?)
}

/// A service that returns the probability that an image is AI-generated
#[async_trait]
pub trait ImageScorer: Send + Sync {
    /// Display name, also used as `model_used`
    fn name(&self) -> &'static str;

    /// Whether credentials are present
    fn is_configured(&self) -> bool;

    /// Score one image; 0.0 is human, 1.0 is AI
    async fn score(&self, bytes: &[u8], filename: &str, content_type: &str) -> Result<f64>;
}

/// Ordered list of image scorers; the first to answer wins
#[derive(Default)]
pub struct ScorerChain {
    scorers: Vec<Box<dyn ImageScorer>>,
}

impl ScorerChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hive first, then AI-or-Not, keeping only configured services
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let mut chain = Self::new();
        chain.register(Box::new(HiveClient::new(&config.hive)?));
        chain.register(Box::new(AiOrNotClient::new(&config.aiornot)?));
        Ok(chain)
    }

    /// Add a scorer at the end of the chain; unconfigured scorers are skipped
    pub fn register(&mut self, scorer: Box<dyn ImageScorer>) {
        if scorer.is_configured() {
            self.scorers.push(scorer);
        } else {
            debug!("Image scorer '{}' not configured", scorer.name());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.scorers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.scorers.len()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.scorers.iter().map(|s| s.name()).collect()
    }

    /// Name of the scorer tried first
    pub fn primary(&self) -> Option<&'static str> {
        self.scorers.first().map(|s| s.name())
    }

    /// Try each scorer in order; failures are logged and skipped
    pub async fn score(
        &self,
        bytes: &[u8],
        filename: &str,
        content_type: &str,
    ) -> Option<(f64, &'static str)> {
        for scorer in &self.scorers {
            match scorer.score(bytes, filename, content_type).await {
                Ok(score) => {
                    debug!("{} scored {} at {:.4}", scorer.name(), filename, score);
                    return Some((score.clamp(0.0, 1.0), scorer.name()));
                }
                Err(e) => warn!("{} failed: {}", scorer.name(), e),
            }
        }
        None
    }
}

/// Every client the detectors need, built once from configuration
pub struct Providers {
    pub gptzero: GptZeroClient,
    pub huggingface: HuggingFaceClient,
    pub images: ScorerChain,
    pub elevenlabs: ElevenLabsClient,
}

impl Providers {
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            gptzero: GptZeroClient::new(&config.gptzero)?,
            huggingface: HuggingFaceClient::new(&config.huggingface)?,
            images: ScorerChain::from_config(config)?,
            elevenlabs: ElevenLabsClient::new(&config.elevenlabs)?,
        })
    }

    /// Names of the configured services, for status output
    pub fn configured(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.huggingface.is_configured() {
            names.push("Hugging Face");
        }
        if self.gptzero.is_configured() {
            names.push("GPTZero");
        }
        names.extend(self.images.names());
        if self.elevenlabs.is_configured() {
            names.push("ElevenLabs");
        }
        names
    }
}

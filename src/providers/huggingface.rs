// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Hugging Face inference API text classifier

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{http_client, is_key_configured, read_json, url_or};
use crate::config::HuggingFaceConfig;
use crate::{Result, TruthScanError};

pub const DEFAULT_URL: &str = "https://api-inference.huggingface.co/models";

const PROVIDER: &str = "Hugging Face";
const AI_TOKENS: &[&str] = &["fake", "ai", "generated", "machine"];
const HUMAN_TOKENS: &[&str] = &["real", "human"];

pub struct HuggingFaceClient {
    client: Client,
    url: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    #[serde(default)]
    label: String,
    #[serde(default)]
    score: f64,
}

impl HuggingFaceClient {
    pub fn new(config: &HuggingFaceConfig) -> Result<Self> {
        let base = url_or(&config.url, DEFAULT_URL);
        Ok(Self {
            client: http_client(config.timeout_secs)?,
            url: format!("{}/{}", base.trim_end_matches('/'), config.model),
            model: config.model.clone(),
            api_key: config.api_key.trim().to_string(),
        })
    }

    pub fn is_configured(&self) -> bool {
        is_key_configured(&self.api_key)
    }

    /// `model_used` label for results from this classifier
    pub fn model_label(&self) -> String {
        format!("Hugging Face ({})", self.model)
    }

    /// Return the AI probability of a text
    pub async fn classify(&self, text: &str) -> Result<f64> {
        if !self.is_configured() {
            return Err(TruthScanError::provider(PROVIDER, "HF_API_KEY missing"));
        }

        debug!("Sending {} chars to {}", text.len(), self.url);

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&json!({ "inputs": text }))
            .send()
            .await?;

        let value = read_json(PROVIDER, response).await?;
        parse_ai_probability(&value)
    }
}

/// Map classifier labels onto an AI probability
///
/// Accepts both `[[{label, score}]]` and `[{label, score}]`. When only one
/// side is labeled the other is its complement.
pub fn parse_ai_probability(value: &serde_json::Value) -> Result<f64> {
    let candidates = match value.as_array() {
        Some(outer) => match outer.first() {
            Some(first) if first.is_array() => first.clone(),
            _ => value.clone(),
        },
        None => {
            return Err(TruthScanError::provider(PROVIDER, "Unexpected HF response format"));
        }
    };

    let labels: Vec<LabelScore> = serde_json::from_value(candidates)
        .map_err(|e| TruthScanError::provider(PROVIDER, format!("Unexpected HF response format: {}", e)))?;

    let mut ai: Option<f64> = None;
    let mut human: Option<f64> = None;

    for item in &labels {
        let label = item.label.to_lowercase();
        if AI_TOKENS.iter().any(|t| label.contains(t)) {
            ai = Some(ai.map_or(item.score, |a| a.max(item.score)));
        }
        if HUMAN_TOKENS.iter().any(|t| label.contains(t)) {
            human = Some(human.map_or(item.score, |h| h.max(item.score)));
        }
    }

    let ai = match (ai, human) {
        (Some(ai), _) => ai,
        (None, Some(human)) => 1.0 - human,
        (None, None) => {
            return Err(TruthScanError::provider(
                PROVIDER,
                "Could not map HF labels to AI/Human probabilities",
            ));
        }
    };

    Ok(ai.clamp(0.0, 1.0))
}

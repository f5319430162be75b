// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! ElevenLabs AI speech classifier

use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use tracing::warn;

use super::{http_client, is_key_configured, read_json};
use crate::config::ServiceConfig;
use crate::{Result, TruthScanError};

pub const NAME: &str = "ElevenLabs AI Speech Classifier";

const PROVIDER: &str = "ElevenLabs";

pub struct ElevenLabsClient {
    client: Client,
    url: String,
    api_key: String,
}

impl ElevenLabsClient {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config.timeout_secs)?,
            url: config.url.trim().to_string(),
            api_key: config.api_key.trim().to_string(),
        })
    }

    /// Both a key and an endpoint URL are required
    pub fn is_configured(&self) -> bool {
        is_key_configured(&self.api_key) && !self.url.is_empty()
    }

    /// Return the AI probability of an audio clip
    pub async fn classify(&self, bytes: &[u8], filename: &str, content_type: &str) -> Result<f64> {
        if !self.is_configured() {
            return Err(TruthScanError::provider(PROVIDER, "API key or URL not configured"));
        }

        let part = Part::bytes(bytes.to_vec())
            .file_name(filename.to_string())
            .mime_str(content_type)?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&self.url)
            .header("xi-api-key", &self.api_key)
            .multipart(form)
            .send()
            .await?;

        if matches!(response.status(), StatusCode::NOT_FOUND | StatusCode::METHOD_NOT_ALLOWED) {
            warn!("ElevenLabs audio detection endpoint unavailable; using local fallback");
            return Err(TruthScanError::provider(PROVIDER, "audio detection endpoint unavailable"));
        }

        let value = read_json(PROVIDER, response).await?;
        parse_probability(&value)
            .ok_or_else(|| TruthScanError::provider(PROVIDER, "response carries no probability"))
    }
}

/// `probability`, falling back to `ai_probability`
pub fn parse_probability(value: &serde_json::Value) -> Option<f64> {
    value
        .get("probability")
        .and_then(|p| p.as_f64())
        .or_else(|| value.get("ai_probability").and_then(|p| p.as_f64()))
        .map(|p| p.clamp(0.0, 1.0))
}

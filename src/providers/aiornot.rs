// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! AI-or-Not image reports

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;

use super::{http_client, is_key_configured, read_json, url_or, ImageScorer};
use crate::config::ServiceConfig;
use crate::Result;

pub const DEFAULT_URL: &str = "https://api.aiornot.com/v1/reports/image";
pub const NAME: &str = "AI-or-Not";

pub struct AiOrNotClient {
    client: Client,
    url: String,
    api_key: String,
}

impl AiOrNotClient {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config.timeout_secs)?,
            url: url_or(&config.url, DEFAULT_URL),
            api_key: config.api_key.trim().to_string(),
        })
    }
}

#[async_trait]
impl ImageScorer for AiOrNotClient {
    fn name(&self) -> &'static str {
        NAME
    }

    fn is_configured(&self) -> bool {
        is_key_configured(&self.api_key)
    }

    async fn score(&self, bytes: &[u8], filename: &str, content_type: &str) -> Result<f64> {
        let part = Part::bytes(bytes.to_vec())
            .file_name(filename.to_string())
            .mime_str(content_type)?;
        let form = Form::new().part("object", part);

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        let value = read_json(NAME, response).await?;
        Ok(parse_ai_score(&value))
    }
}

/// `report.ai.confidence` is a percentage
pub fn parse_ai_score(value: &serde_json::Value) -> f64 {
    value
        .pointer("/report/ai/confidence")
        .and_then(|c| c.as_f64())
        .unwrap_or(0.0)
        / 100.0
}

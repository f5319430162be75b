// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Hive Moderation synchronous task API

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;

use super::{http_client, is_key_configured, read_json, url_or, ImageScorer};
use crate::config::ServiceConfig;
use crate::{Result, TruthScanError};

pub const DEFAULT_URL: &str = "https://api.thehive.ai/api/v2/task/sync";
pub const NAME: &str = "Hive Moderation";

const AI_CLASS: &str = "ai_generated";

pub struct HiveClient {
    client: Client,
    url: String,
    api_key: String,
}

impl HiveClient {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config.timeout_secs)?,
            url: url_or(&config.url, DEFAULT_URL),
            api_key: config.api_key.trim().to_string(),
        })
    }
}

#[async_trait]
impl ImageScorer for HiveClient {
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
        let form = Form::new().part("image", part);

        let response = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Token {}", self.api_key))
            .multipart(form)
            .send()
            .await?;

        let value = read_json(NAME, response).await?;
        parse_ai_score(&value)
            .ok_or_else(|| TruthScanError::provider(NAME, "no ai_generated class in response"))
    }
}

/// Score of the `ai_generated` class in `status[0].response.output[0].classes`
pub fn parse_ai_score(value: &serde_json::Value) -> Option<f64> {
    value
        .pointer("/status/0/response/output/0/classes")?
        .as_array()?
        .iter()
        .find(|c| c.get("class").and_then(|n| n.as_str()) == Some(AI_CLASS))
        .map(|c| c.get("score").and_then(|s| s.as_f64()).unwrap_or(0.0))
}

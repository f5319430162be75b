// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! GPTZero text classifier

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{http_client, is_key_configured, read_json, url_or};
use crate::config::ServiceConfig;
use crate::{Result, TruthScanError};

pub const DEFAULT_URL: &str = "https://api.gptzero.me/v2/predict/text";
pub const MODEL_NAME: &str = "GPTZero v2";

const PROVIDER: &str = "GPTZero";

pub struct GptZeroClient {
    client: Client,
    url: String,
    api_key: String,
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    document: &'a str,
    multilingual: bool,
}

#[derive(Deserialize)]
struct PredictResponse {
    #[serde(default)]
    documents: Vec<GptZeroDocument>,
}

/// Per-document scores returned by GPTZero
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GptZeroDocument {
    #[serde(default)]
    pub completely_generated_prob: f64,
    #[serde(default)]
    pub average_generated_prob: f64,
    #[serde(default)]
    pub burstiness: Option<f64>,
    #[serde(default)]
    pub perplexity: Option<f64>,
}

impl GptZeroClient {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config.timeout_secs)?,
            url: url_or(&config.url, DEFAULT_URL),
            api_key: config.api_key.trim().to_string(),
        })
    }

    pub fn is_configured(&self) -> bool {
        is_key_configured(&self.api_key)
    }

    /// Classify a document; the first document of the response is returned
    pub async fn predict(&self, text: &str) -> Result<GptZeroDocument> {
        if !self.is_configured() {
            return Err(TruthScanError::provider(PROVIDER, "GPTZERO_API_KEY missing"));
        }

        debug!("Sending {} chars to GPTZero", text.len());

        let response = self
            .client
            .post(&self.url)
            .header("x-api-key", &self.api_key)
            .json(&PredictRequest {
                document: text,
                multilingual: false,
            })
            .send()
            .await?;

        let value = read_json(PROVIDER, response).await?;
        parse_document(value)
    }
}

/// Extract the first document from a GPTZero response body
pub fn parse_document(value: serde_json::Value) -> Result<GptZeroDocument> {
    let response: PredictResponse = serde_json::from_value(value)
        .map_err(|e| TruthScanError::provider(PROVIDER, format!("unexpected response: {}", e)))?;
    Ok(response.documents.into_iter().next().unwrap_or_default())
}

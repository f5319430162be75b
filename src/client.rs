// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Client for the TruthScan detection API
//!
//! Every submission is one request. Failures are reported as
//! `TruthScanError::Api` carrying the message to show the user.

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::media::{self, MediaKind};
use crate::verdict::DetectionResult;
use crate::{Result, TruthScanError};

pub const REQUEST_FAILED: &str = "Request failed";

#[derive(Serialize)]
struct TextRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct Banner {
    message: String,
}

/// A parsed result together with the body it was read from
///
/// The raw body is what JSON output prints, so fields the result type
/// normalizes (unknown verdicts, extra keys) reach the user unchanged.
#[derive(Debug, Clone)]
pub struct Detection {
    pub result: DetectionResult,
    pub raw: Value,
}

impl Detection {
    /// Wrap a result produced in-process
    pub fn local(result: DetectionResult) -> Result<Self> {
        let raw = serde_json::to_value(&result)?;
        Ok(Self { result, raw })
    }
}

/// Detection API client
pub struct DetectClient {
    client: Client,
    base_url: String,
}

impl DetectClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Submit text for detection; blank text is rejected without a request
    pub async fn detect_text(&self, text: &str) -> Result<Detection> {
        if text.trim().is_empty() {
            return Err(TruthScanError::Validation("Please enter some text to analyze.".to_string()));
        }

        debug!("POST {} ({} chars)", MediaKind::Text.endpoint(), text.chars().count());
        let response = self
            .client
            .post(self.url(MediaKind::Text.endpoint()))
            .json(&TextRequest { text })
            .send()
            .await
            .map_err(transport_error)?;

        read_result(response).await
    }

    /// Upload a file for detection
    ///
    /// The size limit is checked against file metadata first, so an
    /// oversized file never leaves the machine.
    pub async fn detect_file(&self, kind: MediaKind, path: &Path, max_bytes: u64) -> Result<Detection> {
        if !kind.is_upload() {
            return Err(TruthScanError::Validation(format!("{} is not a file upload", kind)));
        }

        let size = tokio::fs::metadata(path).await?.len();
        media::check_size(size, max_bytes)?;

        let bytes = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        let content_type = media::guess_content_type(path);

        debug!("POST {} ({}, {})", kind.endpoint(), content_type, media::format_bytes(size));
        let part = Part::bytes(bytes).file_name(filename).mime_str(content_type)?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.url(kind.endpoint()))
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;

        read_result(response).await
    }

    /// Fetch the service banner
    pub async fn health(&self) -> Result<String> {
        let response = self
            .client
            .get(self.url("/health"))
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(transport_error)?;
        if !status.is_success() {
            return Err(TruthScanError::Api(error_message(&body, &status.to_string())));
        }
        let banner: Banner = serde_json::from_slice(&body)
            .map_err(|_| TruthScanError::Api(REQUEST_FAILED.to_string()))?;
        Ok(banner.message)
    }
}

fn transport_error(e: reqwest::Error) -> TruthScanError {
    TruthScanError::Api(e.to_string())
}

async fn read_result(response: Response) -> Result<Detection> {
    let status = response.status();
    let body = response.bytes().await.map_err(transport_error)?;

    if !status.is_success() {
        return Err(TruthScanError::Api(error_message(&body, &status.to_string())));
    }

    parse_result(&body)
}

/// Parse a success body; anything that is not a result object is a failed request
pub fn parse_result(body: &[u8]) -> Result<Detection> {
    match serde_json::from_slice::<Value>(body) {
        Ok(raw) if raw.is_object() => {
            let result = DetectionResult::deserialize(&raw)
                .map_err(|_| TruthScanError::Api(REQUEST_FAILED.to_string()))?;
            Ok(Detection { result, raw })
        }
        _ => Err(TruthScanError::Api(REQUEST_FAILED.to_string())),
    }
}

/// Message for an error body: `detail`, then `message`, then `error`, then the status line
///
/// Empty strings, `false`, `0` and `null` are skipped like absent keys.
pub fn error_message(body: &[u8], status_line: &str) -> String {
    let value: Value = serde_json::from_slice(body).unwrap_or_default();

    ["detail", "message", "error"]
        .iter()
        .find_map(|key| match value.get(key)? {
            Value::Null | Value::Bool(false) => None,
            Value::String(s) if s.is_empty() => None,
            Value::Number(n) if n.as_f64() == Some(0.0) => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        })
        .unwrap_or_else(|| status_line.to_string())
}

// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Configuration management for TruthScan

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::media::{MediaKind, AUDIO_MAX_BYTES, IMAGE_MAX_BYTES, VIDEO_MAX_BYTES};

/// Main application configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    /// Detection API server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Command-line client settings
    #[serde(default)]
    pub client: ClientConfig,

    /// Third-party detection services
    #[serde(default)]
    pub providers: ProviderConfig,

    /// Upload size limits
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Frame sampling for video detection
    #[serde(default)]
    pub video: VideoConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Browser origins allowed to call the API
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ClientConfig {
    /// Base URL of the detection API
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_client_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    #[serde(default = "default_gptzero")]
    pub gptzero: ServiceConfig,
    #[serde(default)]
    pub huggingface: HuggingFaceConfig,
    #[serde(default = "default_hive")]
    pub hive: ServiceConfig,
    #[serde(default = "default_aiornot")]
    pub aiornot: ServiceConfig,
    #[serde(default = "default_elevenlabs")]
    pub elevenlabs: ServiceConfig,
}

/// Endpoint, key and timeout of one detection service
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ServiceConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HuggingFaceConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_hf_model")]
    pub model: String,
    /// Inference base URL; the model id is appended
    #[serde(default = "default_hf_url")]
    pub url: String,
    #[serde(default = "default_hf_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LimitsConfig {
    #[serde(default = "default_image_max")]
    pub image_max_bytes: u64,
    #[serde(default = "default_video_max")]
    pub video_max_bytes: u64,
    #[serde(default = "default_audio_max")]
    pub audio_max_bytes: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct VideoConfig {
    /// Evenly spaced frames sampled per video
    #[serde(default = "default_frames")]
    pub frames: u32,
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: String,
    #[serde(default = "default_ffprobe")]
    pub ffprobe: String,
}

// Default value functions
fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8000 }
fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:5173".to_string(), "http://localhost:3000".to_string()]
}
fn default_api_url() -> String { "http://localhost:8000".to_string() }
fn default_client_timeout() -> u64 { 120 }
fn default_provider_timeout() -> u64 { 30 }
fn default_hf_model() -> String { "openai-community/roberta-base-openai-detector".to_string() }
fn default_hf_url() -> String { "https://api-inference.huggingface.co/models".to_string() }
fn default_hf_timeout() -> u64 { 45 }
fn default_image_max() -> u64 { IMAGE_MAX_BYTES }
fn default_video_max() -> u64 { VIDEO_MAX_BYTES }
fn default_audio_max() -> u64 { AUDIO_MAX_BYTES }
fn default_frames() -> u32 { 10 }
fn default_ffmpeg() -> String { "ffmpeg".to_string() }
fn default_ffprobe() -> String { "ffprobe".to_string() }

fn default_gptzero() -> ServiceConfig {
    ServiceConfig {
        api_key: String::new(),
        url: "https://api.gptzero.me/v2/predict/text".to_string(),
        timeout_secs: 30,
    }
}

fn default_hive() -> ServiceConfig {
    ServiceConfig {
        api_key: String::new(),
        url: "https://api.thehive.ai/api/v2/task/sync".to_string(),
        timeout_secs: 30,
    }
}

fn default_aiornot() -> ServiceConfig {
    ServiceConfig {
        api_key: String::new(),
        url: "https://api.aiornot.com/v1/reports/image".to_string(),
        timeout_secs: 30,
    }
}

fn default_elevenlabs() -> ServiceConfig {
    // No public default endpoint: the URL must be configured
    ServiceConfig {
        api_key: String::new(),
        url: String::new(),
        timeout_secs: 60,
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_secs: default_client_timeout(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            gptzero: default_gptzero(),
            huggingface: HuggingFaceConfig::default(),
            hive: default_hive(),
            aiornot: default_aiornot(),
            elevenlabs: default_elevenlabs(),
        }
    }
}

impl Default for HuggingFaceConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_hf_model(),
            url: default_hf_url(),
            timeout_secs: default_hf_timeout(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            image_max_bytes: IMAGE_MAX_BYTES,
            video_max_bytes: VIDEO_MAX_BYTES,
            audio_max_bytes: AUDIO_MAX_BYTES,
        }
    }
}

impl LimitsConfig {
    /// Upload limit for a media kind; text has none
    pub fn max_bytes(&self, kind: MediaKind) -> Option<u64> {
        match kind {
            MediaKind::Text => None,
            MediaKind::Image => Some(self.image_max_bytes),
            MediaKind::Video => Some(self.video_max_bytes),
            MediaKind::Audio => Some(self.audio_max_bytes),
        }
    }

    /// Largest upload limit across all kinds
    pub fn largest(&self) -> u64 {
        self.image_max_bytes
            .max(self.video_max_bytes)
            .max(self.audio_max_bytes)
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            frames: default_frames(),
            ffmpeg: default_ffmpeg(),
            ffprobe: default_ffprobe(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&content)
                .map_err(|e| crate::TruthScanError::Config(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply API keys and URLs from the process environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup; empty values are ignored
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("GPTZERO_API_KEY") {
            self.providers.gptzero.api_key = v;
        }
        if let Some(v) = get("HF_API_KEY") {
            self.providers.huggingface.api_key = v;
        }
        if let Some(v) = get("HF_TEXT_MODEL") {
            self.providers.huggingface.model = v;
        }
        if let Some(v) = get("HIVE_API_KEY") {
            self.providers.hive.api_key = v;
        }
        if let Some(v) = get("AIORNOT_API_KEY") {
            self.providers.aiornot.api_key = v;
        }
        if let Some(v) = get("ELEVENLABS_API_KEY") {
            self.providers.elevenlabs.api_key = v;
        }
        if let Some(v) = get("ELEVENLABS_AUDIO_DETECTION_URL") {
            self.providers.elevenlabs.url = v;
        }
        if let Some(v) = get("TRUTHSCAN_API_URL") {
            self.client.api_url = v;
        }
    }

    /// Check values that would make the service unusable
    pub fn validate(&self) -> crate::Result<()> {
        if self.video.frames == 0 {
            return Err(crate::TruthScanError::Config(
                "video.frames must be at least 1".to_string(),
            ));
        }
        for kind in MediaKind::ALL {
            if self.limits.max_bytes(kind) == Some(0) {
                return Err(crate::TruthScanError::Config(format!(
                    "limits for {} must be greater than zero",
                    kind
                )));
            }
        }
        if !self.client.api_url.starts_with("http://") && !self.client.api_url.starts_with("https://") {
            return Err(crate::TruthScanError::Config(format!(
                "client.api_url must be an http(s) URL, got '{}'",
                self.client.api_url
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.video.frames, 10);
        assert_eq!(config.limits.max_bytes(MediaKind::Image), Some(20 * 1024 * 1024));
        assert_eq!(config.limits.max_bytes(MediaKind::Text), None);
        assert_eq!(config.limits.largest(), 500 * 1024 * 1024);
        assert!(config.providers.hive.url.contains("thehive.ai"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"providers": {"hive": {"api_key": "abc"}}}"#).unwrap();
        assert_eq!(config.providers.hive.api_key, "abc");
        assert_eq!(config.providers.hive.timeout_secs, 30);
        assert!(config.providers.gptzero.url.contains("gptzero"));
        assert_eq!(config.server.allowed_origins.len(), 2);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("HIVE_API_KEY", "hive-key"),
            ("HF_TEXT_MODEL", "org/model"),
            ("GPTZERO_API_KEY", "  "),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.providers.gptzero.api_key = "from-file".to_string();
        config.apply_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.providers.hive.api_key, "hive-key");
        assert_eq!(config.providers.huggingface.model, "org/model");
        assert_eq!(config.providers.gptzero.api_key, "from-file");
    }

    #[test]
    fn test_validate_rejects_zero_frames() {
        let mut config = AppConfig::default();
        config.video.frames = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config.client.api_url, "http://localhost:8000");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = AppConfig::default();
        config.server.port = 9100;
        config.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.server.port, 9100);
    }
}

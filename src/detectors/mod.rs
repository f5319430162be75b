// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Detection pipelines, one per media kind

pub mod audio;
pub mod image;
pub mod text;
pub mod video;

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::config::{AppConfig, LimitsConfig};
use crate::media::{self, MediaKind};
use crate::providers::Providers;
use crate::verdict::DetectionResult;
use crate::{Result, TruthScanError};

/// An uploaded file as received from a form or read from disk
#[derive(Debug, Clone)]
pub struct Upload {
    pub bytes: Bytes,
    pub filename: String,
    pub content_type: String,
}

impl Upload {
    pub fn new(bytes: impl Into<Bytes>, filename: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            filename: filename.into(),
            content_type: content_type.into(),
        }
    }

    /// Read a file, guessing its content type from the extension
    pub fn from_path(path: &std::path::Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        Ok(Self::new(bytes, filename, media::guess_content_type(path)))
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Lowercased extension of the original filename
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }
}

/// Detector for one kind of uploaded file
#[async_trait]
pub trait UploadDetector: Send + Sync {
    fn kind(&self) -> MediaKind;

    /// Run detection on an upload that already passed the type and size gates
    async fn detect(&self, upload: &Upload) -> Result<DetectionResult>;
}

/// All detectors behind one entry point
pub struct DetectionService {
    text: text::TextDetector,
    image: image::ImageDetector,
    video: video::VideoDetector,
    audio: audio::AudioDetector,
    providers: Arc<Providers>,
    limits: LimitsConfig,
}

impl DetectionService {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let providers = Arc::new(Providers::from_config(&config.providers)?);
        let frames = video::FfmpegFrames::new(&config.video.ffmpeg, &config.video.ffprobe);
        Ok(Self::new(
            providers,
            config.limits.clone(),
            Box::new(frames),
            config.video.frames,
        ))
    }

    pub fn new(
        providers: Arc<Providers>,
        limits: LimitsConfig,
        frames: Box<dyn video::FrameSource>,
        frame_count: u32,
    ) -> Self {
        Self {
            text: text::TextDetector::new(providers.clone()),
            image: image::ImageDetector::new(providers.clone()),
            video: video::VideoDetector::new(providers.clone(), frames, frame_count),
            audio: audio::AudioDetector::new(providers.clone()),
            providers,
            limits,
        }
    }

    pub fn providers(&self) -> &Providers {
        &self.providers
    }

    pub fn limits(&self) -> &LimitsConfig {
        &self.limits
    }

    pub async fn detect_text(&self, text: &str) -> DetectionResult {
        self.text.detect(text).await
    }

    fn detector(&self, kind: MediaKind) -> Option<&dyn UploadDetector> {
        match kind {
            MediaKind::Text => None,
            MediaKind::Image => Some(&self.image),
            MediaKind::Video => Some(&self.video),
            MediaKind::Audio => Some(&self.audio),
        }
    }

    /// Gate an upload by content type and size, then run its detector
    pub async fn detect_upload(&self, kind: MediaKind, upload: &Upload) -> Result<DetectionResult> {
        let detector = self.detector(kind).ok_or_else(|| {
            TruthScanError::Validation(format!("{} is not a file upload", kind))
        })?;

        media::check_content_type(kind, &upload.content_type)?;
        if let Some(max) = self.limits.max_bytes(kind) {
            media::check_size(upload.len(), max)?;
        }

        info!(
            "Detecting {} upload '{}' ({}, {})",
            kind,
            upload.filename,
            upload.content_type,
            media::format_bytes(upload.len())
        );
        detector.detect(upload).await
    }
}

pub(crate) fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Video detection by scoring evenly spaced frames

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::{elapsed_ms, Upload, UploadDetector};
use crate::dsp;
use crate::media::MediaKind;
use crate::providers::Providers;
use crate::verdict::{DetectionResult, Signal};
use crate::{Result, TruthScanError};

pub const FRAME_MODEL: &str = "Frame-based detection";

/// Seeking exactly to the end yields no frame
const END_MARGIN_SECS: f64 = 0.1;
const VARIANCE_THRESHOLD: f64 = 0.05;

/// Source of JPEG frames for a video
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// Extract up to `count` evenly spaced frames; an empty list means none could be read
    async fn extract(&self, video: &[u8], extension: &str, count: u32) -> Result<Vec<Vec<u8>>>;
}

/// Frame extraction through the `ffprobe` and `ffmpeg` binaries
pub struct FfmpegFrames {
    ffmpeg: String,
    ffprobe: String,
}

/// Temporary copy of an upload, removed on drop
struct TempVideo(PathBuf);

impl TempVideo {
    async fn write(bytes: &[u8], extension: &str) -> Result<Self> {
        let path = std::env::temp_dir().join(format!("truthscan-{}.{}", uuid::Uuid::new_v4(), extension));
        tokio::fs::write(&path, bytes).await?;
        Ok(Self(path))
    }

    fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for TempVideo {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.0) {
            debug!("Failed to remove {:?}: {}", self.0, e);
        }
    }
}

impl FfmpegFrames {
    pub fn new(ffmpeg: &str, ffprobe: &str) -> Self {
        Self {
            ffmpeg: ffmpeg.to_string(),
            ffprobe: ffprobe.to_string(),
        }
    }

    async fn duration_secs(&self, path: &Path) -> Result<f64> {
        let output = Command::new(&self.ffprobe)
            .args(["-v", "quiet", "-print_format", "json", "-show_format"])
            .arg(path)
            .output()
            .await
            .map_err(|e| TruthScanError::Media(format!("cannot run {}: {}", self.ffprobe, e)))?;

        if !output.status.success() {
            return Err(TruthScanError::Media("ffprobe could not read the video".to_string()));
        }

        let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;
        parse_duration(&json)
            .ok_or_else(|| TruthScanError::Media("video has no duration".to_string()))
    }

    async fn frame_at(&self, path: &Path, timestamp: f64) -> Option<Vec<u8>> {
        let output = Command::new(&self.ffmpeg)
            .args(["-v", "error", "-ss", &format!("{:.3}", timestamp), "-i"])
            .arg(path)
            .args(["-frames:v", "1", "-f", "image2pipe", "-vcodec", "mjpeg", "-"])
            .output()
            .await
            .ok()?;

        if output.status.success() && !output.stdout.is_empty() {
            Some(output.stdout)
        } else {
            None
        }
    }
}

#[async_trait]
impl FrameSource for FfmpegFrames {
    async fn extract(&self, video: &[u8], extension: &str, count: u32) -> Result<Vec<Vec<u8>>> {
        let temp = TempVideo::write(video, extension).await?;

        let duration = match self.duration_secs(temp.path()).await {
            Ok(d) => d,
            Err(e) => {
                warn!("Frame extraction error: {}", e);
                return Ok(Vec::new());
            }
        };

        let mut frames = Vec::new();
        for timestamp in frame_timestamps(duration, count) {
            match self.frame_at(temp.path(), timestamp).await {
                Some(frame) => frames.push(frame),
                None => debug!("No frame at {:.3}s", timestamp),
            }
        }
        Ok(frames)
    }
}

/// `format.duration` from ffprobe JSON
pub fn parse_duration(json: &serde_json::Value) -> Option<f64> {
    json.pointer("/format/duration")
        .and_then(|d| d.as_str())
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0)
}

/// `count` timestamps spread evenly from the start to just before the end
pub fn frame_timestamps(duration: f64, count: u32) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }
    let last = (duration - END_MARGIN_SECS).max(0.0);
    if count == 1 {
        return vec![0.0];
    }
    let step = last / (count - 1) as f64;
    (0..count).map(|i| step * i as f64).collect()
}

pub struct VideoDetector {
    providers: Arc<Providers>,
    frames: Box<dyn FrameSource>,
    frame_count: u32,
}

impl VideoDetector {
    pub fn new(providers: Arc<Providers>, frames: Box<dyn FrameSource>, frame_count: u32) -> Self {
        Self {
            providers,
            frames,
            frame_count,
        }
    }
}

#[async_trait]
impl UploadDetector for VideoDetector {
    fn kind(&self) -> MediaKind {
        MediaKind::Video
    }

    async fn detect(&self, upload: &Upload) -> Result<DetectionResult> {
        let start = Instant::now();
        let chain = &self.providers.images;

        if chain.is_empty() {
            return Ok(DetectionResult::error(super::image::KEYS_MISSING, FRAME_MODEL, 0));
        }

        let extension = upload.extension().unwrap_or_else(|| "mp4".to_string());
        let frames = self.frames.extract(&upload.bytes, &extension, self.frame_count).await?;
        if frames.is_empty() {
            return Err(TruthScanError::UnsupportedMedia(
                "Could not extract frames from video. Ensure the file is a valid video.".to_string(),
            ));
        }

        let mut scores = Vec::with_capacity(frames.len());
        for frame in &frames {
            if let Some((score, _)) = chain.score(frame, "frame.jpg", "image/jpeg").await {
                scores.push(score);
            }
        }

        if scores.is_empty() {
            return Ok(DetectionResult::error(
                "Frame analysis API calls all failed. Check API keys and logs.",
                FRAME_MODEL,
                elapsed_ms(start),
            ));
        }

        let mean = dsp::mean(&scores);
        let variance = dsp::variance(&scores);
        info!(
            "Video '{}': {} of {} frames scored, mean {:.4}, variance {:.4}",
            upload.filename,
            scores.len(),
            frames.len(),
            mean,
            variance
        );

        let model = format!("{} (frames)", chain.primary().unwrap_or("Unknown"));
        let signals = video_signals(mean, variance, scores.len(), frames.len());
        Ok(DetectionResult::from_probability(mean, signals, model, elapsed_ms(start)))
    }
}

/// Signals from frame score statistics
pub fn video_signals(mean: f64, variance: f64, scored: usize, extracted: usize) -> Vec<Signal> {
    let mut signals = Vec::new();

    if variance > VARIANCE_THRESHOLD {
        signals.push(Signal::medium("Inconsistent AI generation across frames"));
    }
    if mean > 0.7 && variance < VARIANCE_THRESHOLD {
        signals.push(Signal::high("Consistent deepfake patterns"));
    }
    if mean > 0.5 {
        signals.push(Signal::high("Synthetic facial features detected"));
    } else {
        signals.push(Signal::low("Natural motion patterns"));
    }
    signals.push(Signal::low(format!("Analyzed {} of {} frames", scored, extracted)));
    signals
}

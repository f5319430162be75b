// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Media kinds and the upload rules of each detection panel

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::{Result, TruthScanError};

pub const MB: u64 = 1024 * 1024;

pub const IMAGE_MAX_BYTES: u64 = 20 * MB;
pub const VIDEO_MAX_BYTES: u64 = 500 * MB;
pub const AUDIO_MAX_BYTES: u64 = 100 * MB;

const IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp", "image/gif"];
const VIDEO_TYPES: &[&str] = &["video/mp4", "video/quicktime", "video/webm", "video/x-msvideo"];
const AUDIO_TYPES: &[&str] = &[
    "audio/mpeg", "audio/mp3", "audio/wav", "audio/x-wav", "audio/aac", "audio/flac", "audio/x-flac",
];

const OCTET_STREAM: &str = "application/octet-stream";

/// The kind of content a panel submits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Text,
    Image,
    Video,
    Audio,
}

impl MediaKind {
    pub const ALL: [MediaKind; 4] = [
        MediaKind::Text,
        MediaKind::Image,
        MediaKind::Video,
        MediaKind::Audio,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Text => "text",
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
        }
    }

    /// Path of the detection endpoint for this kind
    pub fn endpoint(&self) -> &'static str {
        match self {
            MediaKind::Text => "/detect/text",
            MediaKind::Image => "/detect/image",
            MediaKind::Video => "/detect/video",
            MediaKind::Audio => "/detect/audio",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MediaKind::Text => "Text",
            MediaKind::Image => "Image",
            MediaKind::Video => "Video",
            MediaKind::Audio => "Audio",
        }
    }

    /// Accent colour of the panel (tab highlight, spinner, scan button)
    pub fn accent(&self) -> &'static str {
        match self {
            MediaKind::Text => "yellow",
            MediaKind::Image => "orange",
            MediaKind::Video => "pink",
            MediaKind::Audio => "cyan",
        }
    }

    pub fn loading_message(&self) -> &'static str {
        match self {
            MediaKind::Text => "Analyzing writing patterns...",
            MediaKind::Image => "Scanning for synthetic artifacts...",
            MediaKind::Video => "Extracting and scanning frames...",
            MediaKind::Audio => "Listening for synthetic voice patterns...",
        }
    }

    /// MIME list handed to the file picker
    pub fn accept(&self) -> &'static [&'static str] {
        match self {
            MediaKind::Text => &[],
            MediaKind::Image => IMAGE_TYPES,
            MediaKind::Video => VIDEO_TYPES,
            MediaKind::Audio => AUDIO_TYPES,
        }
    }

    pub fn formats_label(&self) -> &'static str {
        match self {
            MediaKind::Text => "Plain text",
            MediaKind::Image => "JPG · PNG · WEBP · GIF",
            MediaKind::Video => "MP4 · MOV · WEBM",
            MediaKind::Audio => "MP3 · WAV · AAC · FLAC",
        }
    }

    /// Default upload limit; `None` for text
    pub fn default_max_bytes(&self) -> Option<u64> {
        match self {
            MediaKind::Text => None,
            MediaKind::Image => Some(IMAGE_MAX_BYTES),
            MediaKind::Video => Some(VIDEO_MAX_BYTES),
            MediaKind::Audio => Some(AUDIO_MAX_BYTES),
        }
    }

    pub fn is_upload(&self) -> bool {
        !matches!(self, MediaKind::Text)
    }

    /// Server-side content type gate
    pub fn accepts_content_type(&self, content_type: &str) -> bool {
        let ct = content_type.trim().to_ascii_lowercase();
        match self {
            MediaKind::Text => ct.starts_with("text/") || ct == "application/json",
            MediaKind::Image => IMAGE_TYPES.contains(&ct.as_str()),
            MediaKind::Video => ct.starts_with("video/") || ct == OCTET_STREAM,
            MediaKind::Audio => ct.starts_with("audio/") || ct == OCTET_STREAM,
        }
    }

    fn unsupported_message(&self, content_type: &str) -> String {
        match self {
            MediaKind::Image => format!(
                "Unsupported file type: {}. Allowed: JPG, PNG, WEBP, GIF",
                content_type
            ),
            MediaKind::Video => "Unsupported file type. Allowed: MP4, MOV, WEBM".to_string(),
            MediaKind::Audio => "Unsupported file type. Allowed: MP3, WAV, AAC, FLAC".to_string(),
            MediaKind::Text => format!("Unsupported content type: {}", content_type),
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human-readable byte count as used in the upload preview
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    }
}

/// Label for an upload limit, e.g. "20 MB"
pub fn size_label(max_bytes: u64) -> String {
    if max_bytes % MB == 0 {
        format!("{} MB", max_bytes / MB)
    } else {
        format_bytes(max_bytes)
    }
}

/// Share of the limit used by a file, capped at 100
pub fn fill_percent(size: u64, max_bytes: u64) -> f64 {
    if max_bytes == 0 {
        return 100.0;
    }
    (size as f64 / max_bytes as f64 * 100.0).min(100.0)
}

/// Reject a file that exceeds the limit
pub fn check_size(size: u64, max_bytes: u64) -> Result<()> {
    if size > max_bytes {
        return Err(TruthScanError::TooLarge(format!(
            "File too large. Max size is {}.",
            size_label(max_bytes)
        )));
    }
    Ok(())
}

/// Reject a content type the endpoint does not accept
pub fn check_content_type(kind: MediaKind, content_type: &str) -> Result<()> {
    if kind.accepts_content_type(content_type) {
        Ok(())
    } else {
        Err(TruthScanError::UnsupportedMedia(kind.unsupported_message(content_type)))
    }
}

/// Guess a MIME type from a file extension
pub fn guess_content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "avi" => "video/x-msvideo",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "aac" => "audio/aac",
        "flac" => "audio/flac",
        "ogg" => "audio/ogg",
        "m4a" => "audio/mp4",
        "txt" | "md" => "text/plain",
        _ => OCTET_STREAM,
    }
}

// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Image detection through the scorer chain, plus an EXIF presence check

use async_trait::async_trait;
use image::{ImageDecoder, ImageReader};
use std::io::Cursor;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use super::{elapsed_ms, Upload, UploadDetector};
use crate::media::MediaKind;
use crate::providers::Providers;
use crate::verdict::{DetectionResult, Signal};
use crate::{Result, TruthScanError};

pub const UNCONFIGURED_MODEL: &str = "Hive / AI-or-Not";

pub const KEYS_MISSING: &str = "API key not configured. Add HIVE_API_KEY or AIORNOT_API_KEY to .env";

pub struct ImageDetector {
    providers: Arc<Providers>,
}

impl ImageDetector {
    pub fn new(providers: Arc<Providers>) -> Self {
        Self { providers }
    }
}

#[async_trait]
impl UploadDetector for ImageDetector {
    fn kind(&self) -> MediaKind {
        MediaKind::Image
    }

    async fn detect(&self, upload: &Upload) -> Result<DetectionResult> {
        let start = Instant::now();
        let chain = &self.providers.images;

        if chain.is_empty() {
            return Ok(DetectionResult::error(KEYS_MISSING, UNCONFIGURED_MODEL, 0));
        }

        let format = image::guess_format(&upload.bytes).map_err(|_| {
            TruthScanError::UnsupportedMedia(
                "File content is not a readable image. Allowed: JPG, PNG, WEBP, GIF".to_string(),
            )
        })?;
        let has_exif = has_exif(&upload.bytes);
        debug!("Image format {:?}, EXIF present: {}", format, has_exif);

        let Some((ai, model)) = chain
            .score(&upload.bytes, &upload.filename, &upload.content_type)
            .await
        else {
            let tried = chain.names().last().copied().unwrap_or("Unknown");
            return Ok(DetectionResult::error(
                "All image detection APIs failed. Check your API keys and logs.",
                tried,
                elapsed_ms(start),
            ));
        };

        info!("Image '{}' scored {:.4} by {}", upload.filename, ai, model);
        Ok(DetectionResult::from_probability(ai, image_signals(ai, has_exif), model, elapsed_ms(start)))
    }
}

/// Signals for an image score and its metadata
pub fn image_signals(ai: f64, has_exif: bool) -> Vec<Signal> {
    let mut signals = Vec::new();

    if ai > 0.7 {
        signals.push(Signal::high("GAN fingerprint detected"));
        signals.push(Signal::high("Synthetic texture patterns"));
    } else if ai > 0.4 {
        signals.push(Signal::medium("Possible AI upscaling"));
        signals.push(Signal::medium("Inconsistent lighting gradients"));
    }

    if has_exif {
        signals.push(Signal::low("Natural EXIF metadata present"));
    } else {
        signals.push(Signal::medium("No EXIF metadata found"));
    }
    signals
}

/// Whether the container carries an EXIF block
pub fn has_exif(bytes: &[u8]) -> bool {
    let decoder = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()
        .and_then(|reader| reader.into_decoder().ok());

    match decoder {
        Some(mut decoder) => matches!(decoder.exif_metadata(), Ok(Some(_))),
        None => false,
    }
}

// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Audio detection: ElevenLabs when configured, otherwise a spectral heuristic

use async_trait::async_trait;
use bytes::Bytes;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Instant;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{info, warn};

use super::{elapsed_ms, Upload, UploadDetector};
use crate::dsp::{self, FRAME_LENGTH, HOP_LENGTH};
use crate::media::MediaKind;
use crate::providers::{elevenlabs, Providers};
use crate::verdict::{DetectionResult, Signal};
use crate::{Result, TruthScanError};

pub const HEURISTIC_MODEL: &str = "local spectral heuristic (no API key)";
pub const HEURISTIC_FALLBACK_MODEL: &str = "local spectral heuristic (API unavailable)";
pub const HEURISTIC_FAILED_MODEL: &str = "local spectral heuristic failed";

const NOISE_FLOOR: f32 = 0.001;
const ZCR_STD_THRESHOLD: f64 = 0.02;
const FLATNESS_THRESHOLD: f64 = 0.1;

/// Probability and signals from the local heuristic
#[derive(Debug, Clone, PartialEq)]
pub struct AudioScore {
    pub ai_probability: f64,
    pub signals: Vec<Signal>,
}

pub struct AudioDetector {
    providers: Arc<Providers>,
}

impl AudioDetector {
    pub fn new(providers: Arc<Providers>) -> Self {
        Self { providers }
    }
}

#[async_trait]
impl UploadDetector for AudioDetector {
    fn kind(&self) -> MediaKind {
        MediaKind::Audio
    }

    async fn detect(&self, upload: &Upload) -> Result<DetectionResult> {
        let start = Instant::now();
        let client = &self.providers.elevenlabs;

        if client.is_configured() {
            match client
                .classify(&upload.bytes, &upload.filename, &upload.content_type)
                .await
            {
                Ok(ai) => {
                    info!("Audio '{}' scored {:.4} by ElevenLabs", upload.filename, ai);
                    return Ok(DetectionResult::from_probability(
                        ai,
                        classifier_signals(ai),
                        elevenlabs::NAME,
                        elapsed_ms(start),
                    ));
                }
                Err(e) => warn!("ElevenLabs API error: {}", e),
            }
        }

        let bytes = upload.bytes.clone();
        let extension = upload.extension();
        let decoded = tokio::task::spawn_blocking(move || decode_mono(bytes, extension.as_deref()))
            .await
            .map_err(|e| TruthScanError::Media(format!("audio analysis task failed: {}", e)))?;

        let (score, model) = match decoded {
            Ok(samples) => {
                let model = if client.is_configured() {
                    HEURISTIC_FALLBACK_MODEL
                } else {
                    HEURISTIC_MODEL
                };
                (spectral_heuristic(&samples), model)
            }
            Err(e) => {
                warn!("Audio heuristic error: {}", e);
                let score = AudioScore {
                    ai_probability: 0.5,
                    signals: vec![Signal::medium("Audio analysis unavailable")],
                };
                (score, HEURISTIC_FAILED_MODEL)
            }
        };

        info!("Audio '{}' scored {:.4} by {}", upload.filename, score.ai_probability, model);
        Ok(DetectionResult::from_probability(
            score.ai_probability,
            score.signals,
            model,
            elapsed_ms(start),
        ))
    }
}

/// Signals for a classifier probability
pub fn classifier_signals(ai: f64) -> Vec<Signal> {
    if ai > 0.7 {
        vec![
            Signal::high("Synthetic breath patterns detected"),
            Signal::high("Unnatural pitch consistency"),
        ]
    } else if ai > 0.4 {
        vec![
            Signal::medium("No background room noise"),
            Signal::medium("Waveform irregularities found"),
        ]
    } else {
        vec![
            Signal::low("Natural vocal variation detected"),
            Signal::low("Background ambience present"),
        ]
    }
}

/// Score mono samples by noise floor, zero-crossing steadiness and spectral flatness
pub fn spectral_heuristic(samples: &[f32]) -> AudioScore {
    let mut signals = Vec::new();
    let mut indicators = 0u32;

    let magnitudes: Vec<f32> = samples.iter().map(|s| s.abs()).collect();
    if dsp::percentile(&magnitudes, 5.0) < NOISE_FLOOR {
        signals.push(Signal::medium("No background room noise"));
        indicators += 1;
    } else {
        signals.push(Signal::low("Natural background noise present"));
    }

    let zcr = dsp::zero_crossing_rate(samples, FRAME_LENGTH, HOP_LENGTH);
    if dsp::std_dev(&zcr) < ZCR_STD_THRESHOLD {
        signals.push(Signal::high("Unnatural pitch consistency"));
        indicators += 2;
    }

    let flatness = dsp::spectral_flatness(samples, FRAME_LENGTH, HOP_LENGTH);
    if dsp::mean(&flatness) > FLATNESS_THRESHOLD {
        signals.push(Signal::medium("Waveform irregularities found"));
        indicators += 1;
    }

    AudioScore {
        ai_probability: f64::min(0.95, indicators as f64 / 4.0),
        signals,
    }
}

/// Decode an in-memory clip to mono samples in [-1.0, 1.0]
pub fn decode_mono(bytes: Bytes, extension: Option<&str>) -> Result<Vec<f32>> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let mut probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| TruthScanError::Media(format!("unrecognised audio format: {}", e)))?;

    let track = probed
        .format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| TruthScanError::Media("no supported audio track".to_string()))?;
    let track_id = track.id;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| TruthScanError::Media(format!("no decoder for codec: {}", e)))?;

    let mut interleaved: Vec<f32> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;
    let mut channels = 1;

    loop {
        let packet = match probed.format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(e) => return Err(TruthScanError::Media(e.to_string())),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(buf) => buf,
            Err(SymphoniaError::DecodeError(_)) => continue,
            Err(e) => return Err(TruthScanError::Media(e.to_string())),
        };

        channels = decoded.spec().channels.count().max(1);
        let buf = sample_buf.get_or_insert_with(|| SampleBuffer::new(decoded.capacity() as u64, *decoded.spec()));
        buf.copy_interleaved_ref(decoded);
        interleaved.extend_from_slice(buf.samples());
    }

    if interleaved.is_empty() {
        return Err(TruthScanError::Media("no audio samples decoded".to_string()));
    }

    Ok(interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect())
}

// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Provider fallback order in the text and audio detectors

mod common;

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;

use common::spawn;
use truthscan::config::ProviderConfig;
use truthscan::detectors::audio::{AudioDetector, HEURISTIC_FALLBACK_MODEL};
use truthscan::detectors::text::{TextDetector, LOCAL_MODEL};
use truthscan::detectors::{Upload, UploadDetector};
use truthscan::providers::{elevenlabs, gptzero, Providers};
use truthscan::verdict::{Severity, Verdict};

const ESSAY: &str = "The committee reviewed the proposal and agreed to revisit it next quarter.";

/// Mock serving every third-party endpoint the detectors call
fn services(hf: StatusCode, gptzero: StatusCode, elevenlabs: StatusCode) -> Router {
    Router::new()
        .route(
            "/models/acme/detector",
            post(move || async move { (hf, Json(json!([[{"label": "Fake", "score": 0.82}]]))) }),
        )
        .route(
            "/gptzero",
            post(move || async move {
                (
                    gptzero,
                    Json(json!({"documents": [{
                        "completely_generated_prob": 0.91,
                        "average_generated_prob": 0.88,
                        "burstiness": 12.0
                    }]})),
                )
            }),
        )
        .route(
            "/speech",
            post(move || async move { (elevenlabs, Json(json!({"probability": 0.93}))) }),
        )
}

async fn providers(router: Router, configure: impl FnOnce(&mut ProviderConfig)) -> Arc<Providers> {
    let addr = spawn(router).await;
    let base = format!("http://{}", addr);

    let mut config = ProviderConfig::default();
    config.huggingface.model = "acme/detector".to_string();
    config.huggingface.url = format!("{}/models", base);
    config.gptzero.url = format!("{}/gptzero", base);
    config.elevenlabs.url = format!("{}/speech", base);
    configure(&mut config);

    Arc::new(Providers::from_config(&config).unwrap())
}

fn tone_wav() -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for i in 0..16_000 {
            let s = (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 16_000.0).sin() * 0.5;
            writer.write_sample((s * i16::MAX as f32) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

#[tokio::test]
async fn huggingface_answers_first() {
    let router = services(StatusCode::OK, StatusCode::OK, StatusCode::OK);
    let providers = providers(router, |config| {
        config.huggingface.api_key = "hf-key".to_string();
        config.gptzero.api_key = "gz-key".to_string();
    })
    .await;

    let result = TextDetector::new(providers).detect(ESSAY).await;
    assert_eq!(result.model_used.as_deref(), Some("Hugging Face (acme/detector)"));
    assert_eq!(result.ai_probability, 0.82);
    assert_eq!(result.verdict, Verdict::Ai);
    assert_eq!(result.signals[0].label, "Strong classifier AI signal");
}

#[tokio::test]
async fn failing_huggingface_falls_back_to_gptzero() {
    let router = services(StatusCode::SERVICE_UNAVAILABLE, StatusCode::OK, StatusCode::OK);
    let providers = providers(router, |config| {
        config.huggingface.api_key = "hf-key".to_string();
        config.gptzero.api_key = "gz-key".to_string();
    })
    .await;

    let result = TextDetector::new(providers).detect(ESSAY).await;
    assert_eq!(result.model_used.as_deref(), Some(gptzero::MODEL_NAME));
    assert_eq!(result.ai_probability, 0.91);
    let labels: Vec<&str> = result.signals.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, vec!["High AI probability score", "Low text burstiness"]);
}

#[tokio::test]
async fn failing_gptzero_falls_back_to_local_heuristic() {
    let router = services(StatusCode::OK, StatusCode::UNAUTHORIZED, StatusCode::OK);
    let providers = providers(router, |config| {
        config.gptzero.api_key = "gz-key".to_string();
    })
    .await;

    let result = TextDetector::new(providers).detect(ESSAY).await;
    assert_eq!(result.model_used.as_deref(), Some(LOCAL_MODEL));
    assert_ne!(result.verdict, Verdict::Error);
}

#[tokio::test]
async fn elevenlabs_scores_audio_when_configured() {
    let router = services(StatusCode::OK, StatusCode::OK, StatusCode::OK);
    let providers = providers(router, |config| {
        config.elevenlabs.api_key = "xi-key".to_string();
    })
    .await;

    let upload = Upload::new(tone_wav(), "voice.wav", "audio/wav");
    let result = AudioDetector::new(providers).detect(&upload).await.unwrap();
    assert_eq!(result.model_used.as_deref(), Some(elevenlabs::NAME));
    assert_eq!(result.ai_probability, 0.93);
    assert_eq!(result.verdict, Verdict::Ai);
    assert!(result.signals.iter().all(|s| s.severity == Severity::High));
}

#[tokio::test]
async fn failing_elevenlabs_uses_spectral_heuristic() {
    let router = services(StatusCode::OK, StatusCode::OK, StatusCode::INTERNAL_SERVER_ERROR);
    let providers = providers(router, |config| {
        config.elevenlabs.api_key = "xi-key".to_string();
    })
    .await;

    let upload = Upload::new(tone_wav(), "voice.wav", "audio/wav");
    let result = AudioDetector::new(providers).detect(&upload).await.unwrap();
    assert_eq!(result.model_used.as_deref(), Some(HEURISTIC_FALLBACK_MODEL));
    assert_eq!(result.ai_probability, 0.5);
    let labels: Vec<&str> = result.signals.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, vec!["Natural background noise present", "Unnatural pitch consistency"]);
}

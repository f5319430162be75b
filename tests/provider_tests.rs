// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Third-party clients against mock services

mod common;

use axum::extract::{Multipart, Path};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use common::spawn;
use truthscan::config::{HuggingFaceConfig, ServiceConfig};
use truthscan::providers::{
    AiOrNotClient, ElevenLabsClient, GptZeroClient, HiveClient, HuggingFaceClient, ImageScorer,
};

fn service(url: String) -> ServiceConfig {
    ServiceConfig {
        api_key: "test-key".to_string(),
        url,
        timeout_secs: 5,
    }
}

fn header(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[tokio::test]
async fn gptzero_sends_key_and_document() {
    let router = Router::new().route(
        "/predict",
        post(|headers: HeaderMap, Json(body): Json<Value>| async move {
            if header(&headers, "x-api-key") != "test-key" || body["document"] != "an essay" {
                return (StatusCode::UNAUTHORIZED, Json(json!({})));
            }
            (
                StatusCode::OK,
                Json(json!({"documents": [{"completely_generated_prob": 0.77, "perplexity": 14.0}]})),
            )
        }),
    );
    let addr = spawn(router).await;

    let client = GptZeroClient::new(&service(format!("http://{}/predict", addr))).unwrap();
    let doc = client.predict("an essay").await.unwrap();
    assert_eq!(doc.completely_generated_prob, 0.77);
    assert_eq!(doc.perplexity, Some(14.0));
}

#[tokio::test]
async fn gptzero_http_error_names_status() {
    let router = Router::new().route(
        "/predict",
        post(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
    );
    let addr = spawn(router).await;

    let client = GptZeroClient::new(&service(format!("http://{}/predict", addr))).unwrap();
    let err = client.predict("an essay").await.unwrap_err().to_string();
    assert!(err.contains("429"), "unexpected error: {}", err);
    assert!(err.contains("slow down"));
}

#[tokio::test]
async fn huggingface_appends_model_and_uses_bearer() {
    let router = Router::new().route(
        "/models/:owner/:name",
        post(|Path((owner, name)): Path<(String, String)>, headers: HeaderMap| async move {
            assert_eq!(format!("{}/{}", owner, name), "acme/detector");
            assert_eq!(header(&headers, "authorization"), "Bearer test-key");
            Json(json!([[{"label": "Human", "score": 0.25}]]))
        }),
    );
    let addr = spawn(router).await;

    let client = HuggingFaceClient::new(&HuggingFaceConfig {
        api_key: "test-key".to_string(),
        model: "acme/detector".to_string(),
        url: format!("http://{}/models/", addr),
        timeout_secs: 5,
    })
    .unwrap();

    assert_eq!(client.model_label(), "Hugging Face (acme/detector)");
    assert_eq!(client.classify("some text").await.unwrap(), 0.75);
}

#[tokio::test]
async fn hive_posts_image_field_with_token_auth() {
    let router = Router::new().route(
        "/task",
        post(|headers: HeaderMap, mut multipart: Multipart| async move {
            let field = multipart.next_field().await.unwrap().unwrap();
            let ok = header(&headers, "authorization") == "Token test-key"
                && field.name() == Some("image")
                && field.file_name() == Some("cat.png");
            if !ok {
                return (StatusCode::BAD_REQUEST, Json(json!({})));
            }
            (
                StatusCode::OK,
                Json(json!({"status": [{"response": {"output": [{"classes": [
                    {"class": "not_ai_generated", "score": 0.12},
                    {"class": "ai_generated", "score": 0.88}
                ]}]}}]})),
            )
        }),
    );
    let addr = spawn(router).await;

    let client = HiveClient::new(&service(format!("http://{}/task", addr))).unwrap();
    assert!(client.is_configured());
    assert_eq!(client.score(b"png", "cat.png", "image/png").await.unwrap(), 0.88);
}

#[tokio::test]
async fn hive_without_ai_class_is_an_error() {
    let router = Router::new().route(
        "/task",
        post(|| async { Json(json!({"status": [{"response": {"output": [{"classes": []}]}}]})) }),
    );
    let addr = spawn(router).await;

    let client = HiveClient::new(&service(format!("http://{}/task", addr))).unwrap();
    assert!(client.score(b"png", "cat.png", "image/png").await.is_err());
}

#[tokio::test]
async fn aiornot_converts_percentage() {
    let router = Router::new().route(
        "/reports/image",
        post(|mut multipart: Multipart| async move {
            let field = multipart.next_field().await.unwrap().unwrap();
            assert_eq!(field.name(), Some("object"));
            Json(json!({"report": {"ai": {"confidence": 64.0}}}))
        }),
    );
    let addr = spawn(router).await;

    let client = AiOrNotClient::new(&service(format!("http://{}/reports/image", addr))).unwrap();
    assert_eq!(client.score(b"jpg", "dog.jpg", "image/jpeg").await.unwrap(), 0.64);
}

#[tokio::test]
async fn elevenlabs_missing_endpoint_is_an_error() {
    let router = Router::new();
    let addr = spawn(router).await;

    let client = ElevenLabsClient::new(&service(format!("http://{}/speech", addr))).unwrap();
    assert!(client.is_configured());
    assert!(client.classify(b"RIFF", "voice.wav", "audio/wav").await.is_err());
}

#[tokio::test]
async fn elevenlabs_reads_probability() {
    let router = Router::new().route(
        "/speech",
        post(|headers: HeaderMap| async move {
            assert_eq!(header(&headers, "xi-api-key"), "test-key");
            Json(json!({"ai_probability": 0.42}))
        }),
    );
    let addr = spawn(router).await;

    let client = ElevenLabsClient::new(&service(format!("http://{}/speech", addr))).unwrap();
    assert_eq!(client.classify(b"RIFF", "voice.wav", "audio/wav").await.unwrap(), 0.42);
}

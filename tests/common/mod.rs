// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Shared fixtures for the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;

use truthscan::config::{AppConfig, LimitsConfig, ProviderConfig};
use truthscan::detectors::video::FrameSource;
use truthscan::detectors::DetectionService;
use truthscan::providers::{ImageScorer, Providers};
use truthscan::web::AppState;
use truthscan::{Result, TruthScanError};

pub const BOUNDARY: &str = "truthscan-test-boundary";

/// Image scorer with a canned answer
pub struct FixedScorer {
    pub name: &'static str,
    pub score: Option<f64>,
}

#[async_trait]
impl ImageScorer for FixedScorer {
    fn name(&self) -> &'static str {
        self.name
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn score(&self, _bytes: &[u8], _filename: &str, _content_type: &str) -> Result<f64> {
        self.score
            .ok_or_else(|| TruthScanError::provider(self.name, "service unavailable"))
    }
}

/// Frame source returning the same frames for every video
pub struct CannedFrames(pub usize);

#[async_trait]
impl FrameSource for CannedFrames {
    async fn extract(&self, _video: &[u8], _extension: &str, count: u32) -> Result<Vec<Vec<u8>>> {
        Ok(vec![b"jpeg".to_vec(); self.0.min(count as usize)])
    }
}

/// State with no external services, optionally with image scorers
pub fn app_state(limits: LimitsConfig, scorers: Vec<FixedScorer>, frames: usize) -> Arc<AppState> {
    let mut providers = Providers::from_config(&ProviderConfig::default()).unwrap();
    for scorer in scorers {
        providers.images.register(Box::new(scorer));
    }
    let service = DetectionService::new(Arc::new(providers), limits.clone(), Box::new(CannedFrames(frames)), 10);

    let mut config = AppConfig::default();
    config.limits = limits;
    Arc::new(AppState::new(config, service).unwrap())
}

/// A one-field multipart body
pub fn multipart_body(field: &str, filename: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}

/// A small valid PNG
pub fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(8, 8, image::Rgb([40, 120, 200]));
    let mut buffer = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buffer, image::ImageFormat::Png).unwrap();
    buffer.into_inner()
}

/// Serve a router on an ephemeral local port
pub async fn spawn(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

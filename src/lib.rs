// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! TruthScan: AI-content detection for text, images, video and audio
//!
//! The library holds the detection API (server, detectors, provider
//! clients) and the front end pieces shared by the browser UI and the
//! command-line client.

pub mod client;
pub mod config;
pub mod detectors;
pub mod dsp;
pub mod error;
pub mod media;
pub mod providers;
pub mod render;
pub mod verdict;
pub mod web;

pub use config::AppConfig;
pub use error::{Result, TruthScanError};

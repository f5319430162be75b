// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! The detection result shared by every panel and endpoint

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Above this AI probability the verdict is `ai`
pub const AI_THRESHOLD: f64 = 0.7;
/// Below this AI probability the verdict is `human`
pub const HUMAN_THRESHOLD: f64 = 0.35;

/// Classification label returned by the detection API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Ai,
    Human,
    Mixed,
    /// Also used for any label this client does not know
    #[default]
    #[serde(other)]
    Error,
}

impl Verdict {
    pub fn from_probability(ai_probability: f64) -> Self {
        if ai_probability > AI_THRESHOLD {
            Verdict::Ai
        } else if ai_probability < HUMAN_THRESHOLD {
            Verdict::Human
        } else {
            Verdict::Mixed
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Ai => "ai",
            Verdict::Human => "human",
            Verdict::Mixed => "mixed",
            Verdict::Error => "error",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
    #[serde(other)]
    Other,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Other => "other",
        }
    }
}

/// A labeled, severity-tagged sub-indicator returned alongside a verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub label: String,
    pub severity: Severity,
}

impl Signal {
    pub fn new(label: impl Into<String>, severity: Severity) -> Self {
        Self {
            label: label.into(),
            severity,
        }
    }

    pub fn high(label: impl Into<String>) -> Self {
        Self::new(label, Severity::High)
    }

    pub fn medium(label: impl Into<String>) -> Self {
        Self::new(label, Severity::Medium)
    }

    pub fn low(label: impl Into<String>) -> Self {
        Self::new(label, Severity::Low)
    }
}

/// Result of a detection request
///
/// Every field tolerates absence on the way in, so partially filled
/// payloads still render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    #[serde(default)]
    pub verdict: Verdict,
    #[serde(default)]
    pub ai_probability: f64,
    #[serde(default)]
    pub human_probability: f64,
    /// Percentage, 0-100
    #[serde(default, deserialize_with = "deserialize_percent")]
    pub confidence: u32,
    #[serde(default)]
    pub signals: Vec<Signal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DetectionResult {
    /// Build a scored result from an AI probability
    pub fn from_probability(
        ai_probability: f64,
        signals: Vec<Signal>,
        model_used: impl Into<String>,
        processing_time_ms: u64,
    ) -> Self {
        let ai = ai_probability.clamp(0.0, 1.0);
        let human = round4(1.0 - ai);

        Self {
            verdict: Verdict::from_probability(ai),
            ai_probability: round4(ai),
            human_probability: human,
            confidence: (ai.max(human) * 100.0) as u32,
            signals,
            model_used: Some(model_used.into()),
            processing_time_ms: Some(processing_time_ms),
            message: None,
        }
    }

    /// Build an error result; scores are zeroed and no signals are attached
    pub fn error(
        message: impl Into<String>,
        model_used: impl Into<String>,
        processing_time_ms: u64,
    ) -> Self {
        Self {
            verdict: Verdict::Error,
            ai_probability: 0.0,
            human_probability: 0.0,
            confidence: 0,
            signals: Vec::new(),
            model_used: Some(model_used.into()),
            processing_time_ms: Some(processing_time_ms),
            message: Some(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.verdict == Verdict::Error
    }
}

/// Round to four decimal places
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

fn deserialize_percent<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value.map(|v| v.clamp(0.0, 100.0).round() as u32).unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_thresholds() {
        assert_eq!(Verdict::from_probability(0.71), Verdict::Ai);
        assert_eq!(Verdict::from_probability(0.7), Verdict::Mixed);
        assert_eq!(Verdict::from_probability(0.35), Verdict::Mixed);
        assert_eq!(Verdict::from_probability(0.3499), Verdict::Human);
    }

    #[test]
    fn test_from_probability_fills_scores() {
        let result = DetectionResult::from_probability(0.8234, vec![], "GPTZero v2", 12);
        assert_eq!(result.verdict, Verdict::Ai);
        assert_eq!(result.ai_probability, 0.8234);
        assert_eq!(result.human_probability, 0.1766);
        assert_eq!(result.confidence, 82);
        assert_eq!(result.model_used.as_deref(), Some("GPTZero v2"));
        assert!(result.message.is_none());
    }

    #[test]
    fn test_confidence_uses_larger_side() {
        let result = DetectionResult::from_probability(0.1, vec![], "m", 0);
        assert_eq!(result.verdict, Verdict::Human);
        assert_eq!(result.confidence, 90);
    }

    #[test]
    fn test_error_result_is_zeroed() {
        let result = DetectionResult::error("boom", "Hive / AI-or-Not", 0);
        assert!(result.is_error());
        assert_eq!(result.confidence, 0);
        assert!(result.signals.is_empty());
        assert_eq!(result.message.as_deref(), Some("boom"));
    }

    #[test]
    fn test_serializes_api_shape() {
        let result = DetectionResult::from_probability(
            0.5,
            vec![Signal::medium("Possible AI upscaling")],
            "Hive Moderation",
            40,
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["verdict"], "mixed");
        assert_eq!(json["signals"][0]["severity"], "medium");
        assert_eq!(json["processing_time_ms"], 40);
        assert!(json.get("message").is_none());
    }

    #[test]
    fn test_partial_payload_deserializes() {
        let result: DetectionResult =
            serde_json::from_str(r#"{"verdict": "human", "ai_probability": 0.2}"#).unwrap();
        assert_eq!(result.verdict, Verdict::Human);
        assert_eq!(result.human_probability, 0.0);
        assert!(result.signals.is_empty());
        assert!(result.model_used.is_none());
    }

    #[test]
    fn test_unknown_labels_fall_back() {
        let result: DetectionResult = serde_json::from_str(
            r#"{"verdict": "maybe", "confidence": 87.6,
                "signals": [{"label": "x", "severity": "critical"}]}"#,
        )
        .unwrap();
        assert_eq!(result.verdict, Verdict::Error);
        assert_eq!(result.confidence, 88);
        assert_eq!(result.signals[0].severity, Severity::Other);
    }
}

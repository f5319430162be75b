// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Text detection: Hugging Face, then GPTZero, then a local heuristic

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use super::elapsed_ms;
use crate::providers::{gptzero, GptZeroDocument, Providers};
use crate::verdict::{DetectionResult, Signal};

pub const LOCAL_MODEL: &str = "Local heuristic";

const STRIP_CHARS: &[char] = &['.', ',', '!', '?', ';', ':', '"', '(', ')', '[', ']', '{', '}'];
const PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', '-'];

/// Probability, model and signals before they are folded into a result
#[derive(Debug, Clone, PartialEq)]
pub struct TextScore {
    pub ai_probability: f64,
    pub model: String,
    pub signals: Vec<Signal>,
}

pub struct TextDetector {
    providers: Arc<Providers>,
}

impl TextDetector {
    pub fn new(providers: Arc<Providers>) -> Self {
        Self { providers }
    }

    pub async fn detect(&self, text: &str) -> DetectionResult {
        let start = Instant::now();
        let score = self.score(text).await;
        info!("Text scored {:.4} by {}", score.ai_probability, score.model);
        DetectionResult::from_probability(score.ai_probability, score.signals, score.model, elapsed_ms(start))
    }

    async fn score(&self, text: &str) -> TextScore {
        let hf = &self.providers.huggingface;
        if hf.is_configured() {
            match hf.classify(text).await {
                Ok(ai) => {
                    return TextScore {
                        ai_probability: ai,
                        model: hf.model_label(),
                        signals: classifier_signals(ai),
                    }
                }
                Err(e) => warn!("Text detector error: {}", e),
            }
        }

        let gz = &self.providers.gptzero;
        if gz.is_configured() {
            match gz.predict(text).await {
                Ok(doc) => {
                    return TextScore {
                        ai_probability: doc.completely_generated_prob,
                        model: gptzero::MODEL_NAME.to_string(),
                        signals: gptzero_signals(&doc),
                    }
                }
                Err(e) => warn!("Text detector fallback error: {}", e),
            }
        }

        local_heuristic(text)
    }
}

/// Signals for a plain classifier probability
pub fn classifier_signals(ai: f64) -> Vec<Signal> {
    if ai > 0.7 {
        vec![Signal::high("Strong classifier AI signal")]
    } else if ai > 0.45 {
        vec![Signal::medium("Moderate classifier AI signal")]
    } else {
        vec![Signal::low("Classifier leans human-written")]
    }
}

/// Signals derived from GPTZero's document statistics
pub fn gptzero_signals(doc: &GptZeroDocument) -> Vec<Signal> {
    let mut signals = Vec::new();

    if doc.average_generated_prob > 0.6 {
        signals.push(Signal::high("High AI probability score"));
    }
    if doc.burstiness.is_some_and(|b| b < 20.0) {
        signals.push(Signal::high("Low text burstiness"));
    }
    if doc.perplexity.is_some_and(|p| p < 30.0) {
        signals.push(Signal::high("Low perplexity score"));
    }
    if signals.is_empty() {
        signals.push(Signal::low("Natural sentence variety"));
    }
    signals
}

/// Scoring used when no service answers
///
/// Long texts, a small vocabulary and sparse punctuation each push the
/// score towards AI. The result stays within [0.05, 0.95].
pub fn local_heuristic(text: &str) -> TextScore {
    let normalized = text.trim();
    if normalized.is_empty() {
        return TextScore {
            ai_probability: 0.5,
            model: LOCAL_MODEL.to_string(),
            signals: vec![Signal::medium("Empty text content")],
        };
    }

    let words: Vec<&str> = normalized.split_whitespace().collect();
    let word_count = words.len();
    let unique: HashSet<String> = words
        .iter()
        .map(|w| w.to_lowercase().trim_matches(STRIP_CHARS).to_string())
        .collect();
    let unique_ratio = unique.len() as f64 / word_count.max(1) as f64;

    let char_count = normalized.chars().count();
    let punctuation_count = normalized.chars().filter(|c| PUNCTUATION.contains(c)).count();
    let punctuation_density = punctuation_count as f64 / char_count.max(1) as f64;

    let low_variety = unique_ratio < 0.42;
    let sparse_punctuation = punctuation_density < 0.015;

    let mut score = 0.5;
    if word_count > 200 {
        score += 0.06;
    }
    if low_variety {
        score += 0.12;
    }
    if sparse_punctuation {
        score += 0.08;
    }

    let mut signals = vec![Signal::medium("Fallback heuristic used (no valid API response)")];
    if low_variety {
        signals.push(Signal::medium("Low vocabulary variety"));
    }
    if sparse_punctuation {
        signals.push(Signal::medium("Low punctuation density"));
    }

    TextScore {
        ai_probability: f64::clamp(score, 0.05, 0.95),
        model: LOCAL_MODEL.to_string(),
        signals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;
    use crate::verdict::{Severity, Verdict};

    #[test]
    fn test_empty_text() {
        let score = local_heuristic("   \n ");
        assert_eq!(score.ai_probability, 0.5);
        assert_eq!(score.signals, vec![Signal::medium("Empty text content")]);
    }

    #[test]
    fn test_varied_punctuated_text_stays_neutral() {
        let score = local_heuristic("Well, I never! Did you see that? Honestly, it was wild.");
        assert_eq!(score.ai_probability, 0.5);
        assert_eq!(score.signals.len(), 1);
    }

    #[test]
    fn test_repetitive_unpunctuated_text_scores_high() {
        let text = "the model writes the same words again and again ".repeat(30);
        let score = local_heuristic(&text);
        // > 200 words, low variety, sparse punctuation
        assert!((score.ai_probability - 0.76).abs() < 1e-9);
        let labels: Vec<&str> = score.signals.iter().map(|s| s.label.as_str()).collect();
        assert!(labels.contains(&"Low vocabulary variety"));
        assert!(labels.contains(&"Low punctuation density"));
    }

    #[test]
    fn test_classifier_signal_bands() {
        assert_eq!(classifier_signals(0.9)[0].severity, Severity::High);
        assert_eq!(classifier_signals(0.5)[0].severity, Severity::Medium);
        assert_eq!(classifier_signals(0.45)[0].severity, Severity::Low);
    }

    #[test]
    fn test_gptzero_signals() {
        let doc = GptZeroDocument {
            completely_generated_prob: 0.9,
            average_generated_prob: 0.8,
            burstiness: Some(10.0),
            perplexity: Some(50.0),
        };
        let labels: Vec<String> = gptzero_signals(&doc).into_iter().map(|s| s.label).collect();
        assert_eq!(labels, vec!["High AI probability score", "Low text burstiness"]);

        let human = GptZeroDocument::default();
        assert_eq!(gptzero_signals(&human), vec![Signal::low("Natural sentence variety")]);
    }

    #[tokio::test]
    async fn test_unconfigured_uses_local_heuristic() {
        let providers = Arc::new(Providers::from_config(&ProviderConfig::default()).unwrap());
        let result = TextDetector::new(providers).detect("Short, simple; human text!").await;
        assert_eq!(result.model_used.as_deref(), Some(LOCAL_MODEL));
        assert_eq!(result.verdict, Verdict::Mixed);
        assert_eq!(result.confidence, 50);
    }
}

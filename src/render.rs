// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Terminal rendering of the result card

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt::Write;
use std::time::Duration;

use crate::media::MediaKind;
use crate::verdict::{DetectionResult, Severity, Verdict};

pub const DISCLAIMER: &str = "Results are probabilistic and intended as guidance only.";

const BAR_WIDTH: usize = 30;

/// Badge, title and colour for a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerdictMeta {
    pub badge: &'static str,
    pub title: &'static str,
    pub color: console::Color,
}

impl VerdictMeta {
    pub fn for_verdict(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Ai => Self {
                badge: "AI-GENERATED",
                title: "AI-Generated Content",
                color: console::Color::Red,
            },
            Verdict::Human => Self {
                badge: "LIKELY HUMAN",
                title: "Likely Human-Made",
                color: console::Color::Green,
            },
            Verdict::Mixed => Self {
                badge: "UNCERTAIN",
                title: "Mixed / Uncertain",
                color: console::Color::Yellow,
            },
            Verdict::Error => Self {
                badge: "ERROR",
                title: "Detection Failed",
                color: console::Color::Magenta,
            },
        }
    }
}

fn style(color: bool) -> Style {
    Style::new().force_styling(color)
}

/// Whole-number percent shown next to a bar
pub fn percent(probability: f64) -> u32 {
    (probability.clamp(0.0, 1.0) * 100.0).round() as u32
}

fn bar(label: &str, probability: f64, fill: Style) -> String {
    let pct = percent(probability);
    let filled = (pct as usize * BAR_WIDTH + 50) / 100;
    format!(
        "  {:<6} {}{} {:>3}%",
        label,
        fill.apply_to("█".repeat(filled)),
        "░".repeat(BAR_WIDTH - filled),
        pct
    )
}

fn severity_marker(severity: Severity, color: bool) -> String {
    let s = style(color);
    match severity {
        Severity::High => s.red().bold().apply_to("▲ high  ").to_string(),
        Severity::Medium => s.yellow().apply_to("● medium").to_string(),
        Severity::Low => s.green().apply_to("▼ low   ").to_string(),
        Severity::Other => s.dim().apply_to("· other ").to_string(),
    }
}

/// Render a result as a multi-line card
///
/// Sections absent from the payload are left out, so partial results
/// still render.
pub fn render_card(result: &DetectionResult, color: bool) -> String {
    let meta = VerdictMeta::for_verdict(result.verdict);
    let mut out = String::new();

    let badge = style(color).fg(meta.color).bold().reverse();
    let _ = writeln!(out, "{} {}", badge.apply_to(format!(" {} ", meta.badge)), style(color).bold().apply_to(meta.title));

    if result.is_error() {
        if let Some(message) = result.message.as_deref().filter(|m| !m.is_empty()) {
            let _ = writeln!(out, "  {}", message);
        }
    } else {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", bar("AI", result.ai_probability, style(color).red()));
        let _ = writeln!(out, "{}", bar("Human", result.human_probability, style(color).green()));
    }

    if !result.signals.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", style(color).bold().apply_to("Detection signals"));
        for signal in &result.signals {
            let _ = writeln!(out, "  {}  {}", severity_marker(signal.severity, color), signal.label);
        }
    }

    let mut meta_line = Vec::new();
    if let Some(model) = &result.model_used {
        meta_line.push(format!("Model: {}", model));
    }
    if !result.is_error() {
        meta_line.push(format!("Confidence: {}%", result.confidence));
    }
    if let Some(ms) = result.processing_time_ms {
        meta_line.push(format!("Time: {}ms", ms));
    }
    if !meta_line.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", style(color).dim().apply_to(meta_line.join("  ·  ")));
    }

    let _ = writeln!(out);
    let _ = write!(out, "{}", style(color).dim().italic().apply_to(DISCLAIMER));
    out
}

/// Nearest terminal colour to a panel accent
fn terminal_color(kind: MediaKind) -> &'static str {
    match kind.accent() {
        "orange" => "208",
        "pink" => "magenta",
        other => other,
    }
}

/// Spinner text for a panel
pub fn loading_line(kind: MediaKind) -> String {
    format!("Scanning {}: {}", kind.label().to_lowercase(), kind.loading_message())
}

/// Start a spinner on stderr; `None` when hidden
pub fn spinner(kind: MediaKind, visible: bool) -> Option<ProgressBar> {
    if !visible {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    let template = format!("{{spinner:.{}}} {{msg}}", terminal_color(kind));
    if let Ok(style) = ProgressStyle::with_template(&template) {
        pb.set_style(style);
    }
    pb.set_message(loading_line(kind));
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verdict::Signal;

    #[test]
    fn test_verdict_meta_table() {
        assert_eq!(VerdictMeta::for_verdict(Verdict::Ai).badge, "AI-GENERATED");
        assert_eq!(VerdictMeta::for_verdict(Verdict::Human).title, "Likely Human-Made");
        assert_eq!(VerdictMeta::for_verdict(Verdict::Mixed).title, "Mixed / Uncertain");
        assert_eq!(VerdictMeta::for_verdict(Verdict::Error).title, "Detection Failed");
    }

    #[test]
    fn test_percent_rounds() {
        assert_eq!(percent(0.8234), 82);
        assert_eq!(percent(0.1766), 18);
        assert_eq!(percent(0.005), 1);
    }

    #[test]
    fn test_scored_card() {
        let result = DetectionResult::from_probability(
            0.8234,
            vec![Signal::high("Low text burstiness")],
            "GPTZero v2",
            1234,
        );
        let card = render_card(&result, false);

        assert!(card.starts_with(" AI-GENERATED  AI-Generated Content"));
        assert!(card.contains(" 82%"));
        assert!(card.contains(" 18%"));
        assert!(card.contains("▲ high    Low text burstiness"));
        assert!(card.contains("Model: GPTZero v2  ·  Confidence: 82%  ·  Time: 1234ms"));
        assert!(card.ends_with(DISCLAIMER));
    }

    #[test]
    fn test_error_card_hides_bars_and_confidence() {
        let result = DetectionResult::error("API key not configured", "Hive / AI-or-Not", 0);
        let card = render_card(&result, false);

        assert!(card.contains("Detection Failed"));
        assert!(card.contains("API key not configured"));
        assert!(!card.contains('%'));
        assert!(!card.contains("Detection signals"));
        assert!(card.contains("Model: Hive / AI-or-Not  ·  Time: 0ms"));
    }

    #[test]
    fn test_partial_payload_renders() {
        let result: DetectionResult = serde_json::from_str(r#"{"verdict": "human"}"#).unwrap();
        let card = render_card(&result, false);
        assert!(card.contains("Likely Human-Made"));
        assert!(card.contains("Confidence: 0%"));
        assert!(!card.contains("Model:"));
        assert!(!card.contains("Time:"));
    }

    #[test]
    fn test_loading_line() {
        assert_eq!(loading_line(MediaKind::Video), "Scanning video: Extracting and scanning frames...");
    }
}

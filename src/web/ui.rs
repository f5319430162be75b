// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! The browser UI: tab selector, one panel per media kind, shared result card

use minijinja::{context, Environment, Value};
use serde::Serialize;

use crate::config::LimitsConfig;
use crate::media::{self, MediaKind};
use crate::render::{VerdictMeta, DISCLAIMER};
use crate::verdict::Verdict;
use crate::Result;

const INDEX_TEMPLATE: &str = include_str!("templates/index.html");

/// Everything a panel needs on the page
#[derive(Debug, Serialize)]
struct Panel {
    id: &'static str,
    label: &'static str,
    icon: &'static str,
    accent: &'static str,
    endpoint: &'static str,
    is_upload: bool,
    accept: String,
    formats: &'static str,
    max_bytes: u64,
    size_label: String,
    loading_message: &'static str,
}

#[derive(Serialize)]
struct VerdictView {
    badge: &'static str,
    title: &'static str,
    badge_class: String,
    title_class: String,
}

fn icon(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Text => "📝",
        MediaKind::Image => "🖼️",
        MediaKind::Video => "🎬",
        MediaKind::Audio => "🎵",
    }
}

fn panels(limits: &LimitsConfig) -> Vec<Panel> {
    MediaKind::ALL
        .iter()
        .map(|&kind| {
            let max_bytes = limits.max_bytes(kind).unwrap_or(0);
            Panel {
                id: kind.as_str(),
                label: kind.label(),
                icon: icon(kind),
                accent: kind.accent(),
                endpoint: kind.endpoint(),
                is_upload: kind.is_upload(),
                accept: kind.accept().join(","),
                formats: kind.formats_label(),
                max_bytes,
                size_label: media::size_label(max_bytes),
                loading_message: kind.loading_message(),
            }
        })
        .collect()
}

fn verdicts() -> serde_json::Map<String, serde_json::Value> {
    [Verdict::Ai, Verdict::Human, Verdict::Mixed, Verdict::Error]
        .into_iter()
        .map(|verdict| {
            let meta = VerdictMeta::for_verdict(verdict);
            let view = VerdictView {
                badge: meta.badge,
                title: meta.title,
                badge_class: format!("badge-{}", verdict.as_str()),
                title_class: format!("verdict-{}", verdict.as_str()),
            };
            (
                verdict.as_str().to_string(),
                serde_json::to_value(view).unwrap_or_default(),
            )
        })
        .collect()
}

/// JSON safe to drop into a `<script>` block
fn script_json<T: Serialize>(value: &T) -> Result<Value> {
    let json = serde_json::to_string(value)?.replace("</", "<\\/");
    Ok(Value::from_safe_string(json))
}

/// Render the index page for the configured limits
pub fn render_index(limits: &LimitsConfig) -> Result<String> {
    let mut env = Environment::new();
    env.add_template("index.html", INDEX_TEMPLATE)?;

    let panels = panels(limits);
    let html = env.get_template("index.html")?.render(context! {
        panels_json => script_json(&panels)?,
        verdicts_json => script_json(&verdicts())?,
        disclaimer_json => script_json(&DISCLAIMER)?,
        panels => panels,
    })?;
    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_has_every_panel() {
        let html = render_index(&LimitsConfig::default()).unwrap();
        for kind in MediaKind::ALL {
            assert!(html.contains(&format!("id=\"panel-{}\"", kind.as_str())));
        }
        assert!(html.contains("JPG · PNG · WEBP · GIF · Max 20 MB"));
        assert!(html.contains("Extracting and scanning frames..."));
        assert!(html.contains("\"LIKELY HUMAN\""));
    }

    #[test]
    fn test_limits_flow_into_page() {
        let mut limits = LimitsConfig::default();
        limits.image_max_bytes = 5 * media::MB;
        let html = render_index(&limits).unwrap();
        assert!(html.contains("Max 5 MB"));
        assert!(html.contains(&format!("\"max_bytes\":{}", 5 * media::MB)));
    }
}

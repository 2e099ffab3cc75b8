//! Recover a structured document from raw model text.
//!
//! Services routinely wrap JSON in prose despite instructions. Strategies are tried in order:
//! the whole trimmed text, then the widest `{...}` or `[...]` span.

use serde_json::Value;

use crate::provider::{LLMError, Result};

type Strategy = fn(&str) -> Option<Value>;

const STRATEGIES: &[(&str, Strategy)] = &[
    ("direct", parse_direct),
    ("enclosed span", parse_enclosed_span),
];

/// Parse the first document any strategy recovers, or fail with the raw text attached.
pub fn extract(raw: &str) -> Result<Value> {
    for (name, strategy) in STRATEGIES {
        if let Some(document) = strategy(raw) {
            log::debug!("Recovered document with '{}' strategy", name);
            return Ok(document);
        }
        log::debug!("Strategy '{}' found no document", name);
    }

    log::warn!("No structured document in model response ({} bytes)", raw.len());
    Err(LLMError::UpstreamParse {
        raw: raw.to_string(),
    })
}

fn parse_direct(raw: &str) -> Option<Value> {
    serde_json::from_str(raw.trim()).ok()
}

fn parse_enclosed_span(raw: &str) -> Option<Value> {
    serde_json::from_str(enclosed_span(raw)?).ok()
}

/// From the first `{` (or `[`) to the last `}` (or `]`) after it, whichever opener comes first.
pub fn enclosed_span(text: &str) -> Option<&str> {
    let last_brace = text.rfind('}');
    let last_bracket = text.rfind(']');

    text.char_indices().find_map(|(start, c)| {
        let end = match c {
            '{' => last_brace?,
            '[' => last_bracket?,
            _ => return None,
        };
        (end > start).then(|| &text[start..=end])
    })
}

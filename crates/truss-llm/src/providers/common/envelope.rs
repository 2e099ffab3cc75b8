//! Response envelope probing.
//!
//! Services disagree (and change across versions) about where generated text lives in the
//! response body. Probes are tried in order and the first non-empty hit wins.

use serde_json::Value;

type Probe = fn(&Value) -> Option<&Value>;

const PROBES: &[(&str, Probe)] = &[
    ("response", response),
    ("output", output),
    ("text", text),
    ("results[0]", first_result),
    ("choices[0].message.content", chat_message),
    ("choices[0].text", completion_text),
    ("[0].generated_text", generated_text),
];

fn response(body: &Value) -> Option<&Value> {
    body.get("response")
}

fn output(body: &Value) -> Option<&Value> {
    body.get("output")
}

fn text(body: &Value) -> Option<&Value> {
    body.get("text")
}

fn first_result(body: &Value) -> Option<&Value> {
    let first = body.get("results")?.get(0)?;
    ["response", "output", "content"]
        .iter()
        .filter_map(move |key| first.get(*key))
        .find(|v| !is_blank(v))
}

fn chat_message(body: &Value) -> Option<&Value> {
    body.get("choices")?.get(0)?.get("message")?.get("content")
}

fn completion_text(body: &Value) -> Option<&Value> {
    body.get("choices")?.get(0)?.get("text")
}

fn generated_text(body: &Value) -> Option<&Value> {
    body.get(0)?.get("generated_text")
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Pull generated text out of a response body.
///
/// A body that is not JSON is taken verbatim. A non-string hit is re-serialized as JSON text.
/// When nothing matches the result is empty.
pub fn raw_text(body: &str) -> String {
    let Ok(envelope) = serde_json::from_str::<Value>(body) else {
        log::debug!("Response body is not JSON, using it as raw text");
        return body.trim().to_string();
    };

    for (name, probe) in PROBES {
        let Some(hit) = probe(&envelope).filter(|v| !is_blank(v)) else {
            continue;
        };
        log::debug!("Found generated text at '{}'", name);
        return match hit {
            Value::String(s) => s.trim().to_string(),
            other => other.to_string(),
        };
    }

    log::warn!("No generated text found in response envelope");
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_envelope() {
        let body = r#"{"model":"qwen2","response":" {\"span\": 24} ","done":true}"#;
        assert_eq!(raw_text(body), r#"{"span": 24}"#);
    }

    #[test]
    fn falls_through_empty_fields() {
        let body = r#"{"response":"","output":null,"text":"hello"}"#;
        assert_eq!(raw_text(body), "hello");
    }

    #[test]
    fn results_list_shape() {
        let body = r#"{"results":[{"response":"","content":"{}"}]}"#;
        assert_eq!(raw_text(body), "{}");
    }

    #[test]
    fn chat_completion_shape() {
        let body = r#"{"id":"chatcmpl-1","choices":[{"index":0,"message":{"role":"assistant","content":"Here: {\"type\":\"truss\"}"}}]}"#;
        assert_eq!(raw_text(body), r#"Here: {"type":"truss"}"#);
    }

    #[test]
    fn legacy_completion_and_hosted_inference_shapes() {
        assert_eq!(raw_text(r#"{"choices":[{"text":"abc"}]}"#), "abc");
        assert_eq!(raw_text(r#"[{"generated_text":"def"}]"#), "def");
    }

    #[test]
    fn non_string_hit_is_serialized() {
        let body = r#"{"response":{"type":"truss","span":12}}"#;
        let text = raw_text(body);
        let reparsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(reparsed["span"], 12);
    }

    #[test]
    fn non_json_body_is_verbatim() {
        assert_eq!(raw_text("  plain words  "), "plain words");
    }

    #[test]
    fn unknown_envelope_is_empty() {
        assert_eq!(raw_text(r#"{"status":"ok"}"#), "");
    }
}

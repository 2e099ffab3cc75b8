//! Lenient schema normalization.
//!
//! [`normalize`] never fails. Top-level fields that are missing or malformed take their
//! engineering defaults; array entries that cannot be fully coerced are dropped one by one
//! so the surviving model is smaller but consistent.

use serde_json::{Map, Value};

use crate::model::{
    Element, Load, Node, Support, SupportKind, TrussModel, DEFAULT_HEIGHT, DEFAULT_MATERIAL,
    DEFAULT_SPAN, DEFAULT_TYPE,
};

/// Per-entry coercion: either a fully typed value or `None`, which rejects the entry.
pub trait CoerceEntry: Sized {
    /// Array name in the document, used for logging.
    const FIELD: &'static str;

    fn coerce(entry: &Map<String, Value>) -> Option<Self>;
}

impl CoerceEntry for Node {
    const FIELD: &'static str = "nodes";

    fn coerce(entry: &Map<String, Value>) -> Option<Self> {
        Some(Node {
            id: entry.get("id").and_then(coerce_int)?,
            x: real_or_zero(entry, "x")?,
            y: real_or_zero(entry, "y")?,
            z: real_or_zero(entry, "z")?,
        })
    }
}

impl CoerceEntry for Element {
    const FIELD: &'static str = "elements";

    fn coerce(entry: &Map<String, Value>) -> Option<Self> {
        Some(Element {
            id: entry.get("id").and_then(coerce_int)?,
            from: entry.get("from").and_then(coerce_int)?,
            to: entry.get("to").and_then(coerce_int)?,
        })
    }
}

impl CoerceEntry for Support {
    const FIELD: &'static str = "supports";

    fn coerce(entry: &Map<String, Value>) -> Option<Self> {
        let node = entry.get("node").and_then(coerce_int)?;
        let kind = match entry.get("type") {
            Some(Value::String(tag)) => SupportKind::from_tag(tag),
            _ => SupportKind::Pin,
        };
        Some(Support { node, kind })
    }
}

impl CoerceEntry for Load {
    const FIELD: &'static str = "loads";

    fn coerce(entry: &Map<String, Value>) -> Option<Self> {
        Some(Load {
            node: entry.get("node").and_then(coerce_int)?,
            fx: real_or_zero(entry, "fx")?,
            fy: real_or_zero(entry, "fy")?,
            fz: real_or_zero(entry, "fz")?,
        })
    }
}

/// Coerce an arbitrary parsed document into the canonical truss schema.
pub fn normalize(document: &Value) -> TrussModel {
    let Some(doc) = document.as_object() else {
        log::debug!("Document is not an object, using the default model");
        return TrussModel::default();
    };

    TrussModel {
        kind: string_or(doc, "type", DEFAULT_TYPE),
        span: positive_real_or(doc, "span", DEFAULT_SPAN),
        height: positive_real_or(doc, "height", DEFAULT_HEIGHT),
        material: string_or(doc, "material", DEFAULT_MATERIAL),
        nodes: filter_entries(doc.get(Node::FIELD)),
        elements: filter_entries(doc.get(Element::FIELD)),
        supports: filter_entries(doc.get(Support::FIELD)),
        loads: filter_entries(doc.get(Load::FIELD)),
    }
}

/// Run [`CoerceEntry::coerce`] over every entry of an array, keeping the survivors in order.
pub fn filter_entries<T: CoerceEntry>(value: Option<&Value>) -> Vec<T> {
    let Some(value) = value else {
        return Vec::new();
    };
    let Some(entries) = value.as_array() else {
        log::debug!("'{}' is not an array, treating it as empty", T::FIELD);
        return Vec::new();
    };

    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let coerced = entry.as_object().and_then(T::coerce);
            if coerced.is_none() {
                log::debug!("Dropping malformed {} entry at index {}", T::FIELD, index);
            }
            coerced
        })
        .collect()
}

/// Integer coercion: integers pass, finite reals truncate, integer strings parse.
pub fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(i);
            }
            let f = n.as_f64()?;
            let truncated = f.trunc();
            if truncated.is_finite()
                && truncated >= i64::MIN as f64
                && truncated < i64::MAX as f64
            {
                Some(truncated as i64)
            } else {
                None
            }
        }
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Real coercion: numbers and numeric strings, finite values only.
pub fn coerce_real(value: &Value) -> Option<f64> {
    let f = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    f.is_finite().then_some(f)
}

// Absent key defaults to zero; a present value must coerce.
fn real_or_zero(entry: &Map<String, Value>, key: &str) -> Option<f64> {
    match entry.get(key) {
        None => Some(0.0),
        Some(value) => coerce_real(value),
    }
}

fn positive_real_or(doc: &Map<String, Value>, key: &str, default: f64) -> f64 {
    match doc.get(key).and_then(coerce_real) {
        Some(v) if v > 0.0 => v,
        _ => {
            if doc.contains_key(key) {
                log::debug!("'{}' is not a positive number, using default {}", key, default);
            }
            default
        }
    }
}

fn string_or(doc: &Map<String, Value>, key: &str, default: &str) -> String {
    match doc.get(key) {
        Some(Value::String(s)) => s.clone(),
        _ => default.to_string(),
    }
}

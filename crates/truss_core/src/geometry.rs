//! Deterministic planar truss synthesis.
//!
//! Builds a Pratt-style mesh from two scalars recovered from the description text. This path
//! has no external dependency and always succeeds.

use lazy_static::lazy_static;
use regex::Regex;

use crate::mesh::PlanarMesh;
use crate::model::{DEFAULT_HEIGHT, DEFAULT_SPAN};

/// Fewest segments a synthesized truss is ever split into.
pub const MIN_SEGMENTS: usize = 6;
/// Target segment length in meters.
pub const SEGMENT_LENGTH: f64 = 3.0;
/// Parsed dimensions above this many meters are ignored.
pub const MAX_DIMENSION: f64 = 10_000.0;

lazy_static! {
    static ref SPAN_PATTERN: Regex =
        Regex::new(r"(?i)([0-9０-９]+)\s?m(?:跨度|[\s-]span)").expect("span pattern");
    static ref HEIGHT_PATTERN: Regex =
        Regex::new(r"(?i)([0-9０-９]+)\s?m(?:高度|[\s-](?:height|high|tall))").expect("height pattern");
}

/// Span and height recovered from free text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrussParameters {
    pub span: f64,
    pub height: f64,
}

impl Default for TrussParameters {
    fn default() -> Self {
        Self {
            span: DEFAULT_SPAN,
            height: DEFAULT_HEIGHT,
        }
    }
}

impl TrussParameters {
    /// Match the first `<int>m跨度` / `<int>m span` and `<int>m高度` / `<int>m height` cues.
    pub fn from_text(text: &str) -> Self {
        let defaults = Self::default();
        Self {
            span: first_dimension(&SPAN_PATTERN, text).unwrap_or(defaults.span),
            height: first_dimension(&HEIGHT_PATTERN, text).unwrap_or(defaults.height),
        }
    }
}

fn first_dimension(pattern: &Regex, text: &str) -> Option<f64> {
    let captures = pattern.captures(text)?;
    let value = parse_digits(captures.get(1)?.as_str())?;
    if value > 0.0 && value <= MAX_DIMENSION {
        Some(value)
    } else {
        log::debug!("Ignoring out-of-range dimension {} in description", value);
        None
    }
}

/// ASCII or full-width decimal digits, as typed through CJK input methods.
fn parse_digits(digits: &str) -> Option<f64> {
    digits.chars().try_fold(0u32, |acc, c| {
        let digit = match c {
            '0'..='9' => c as u32 - '0' as u32,
            '０'..='９' => c as u32 - '０' as u32,
            _ => return None,
        };
        acc.checked_mul(10)?.checked_add(digit)
    })
    .map(f64::from)
}

/// `max(6, floor(span / 3))`.
pub fn segment_count(span: f64) -> usize {
    let by_length = (span / SEGMENT_LENGTH).floor();
    if by_length.is_finite() && by_length > MIN_SEGMENTS as f64 {
        by_length as usize
    } else {
        MIN_SEGMENTS
    }
}

/// Recover parameters from `text` and build the mesh.
pub fn synthesize(text: &str) -> PlanarMesh {
    let params = TrussParameters::from_text(text);
    log::debug!(
        "Synthesizing truss with span={} height={}",
        params.span,
        params.height
    );
    build_mesh(params)
}

/// Bottom and top chord nodes per station (positions `2i` and `2i + 1`), chord bars per
/// segment and one alternating web member per segment.
pub fn build_mesh(params: TrussParameters) -> PlanarMesh {
    let TrussParameters { span, height } = params;
    let segments = segment_count(span);

    let mut nodes = Vec::with_capacity(2 * (segments + 1));
    for i in 0..=segments {
        let x = i as f64 * span / segments as f64;
        nodes.push([x, 0.0, 0.0]);
        nodes.push([x, height, 0.0]);
    }

    let mut elements = Vec::with_capacity(3 * segments);
    for i in 0..segments {
        let bottom = 2 * i;
        let top = bottom + 1;
        let next_bottom = 2 * (i + 1);
        let next_top = next_bottom + 1;

        elements.push([bottom, next_bottom]);
        elements.push([top, next_top]);
        if i % 2 == 0 {
            elements.push([bottom, top]);
        } else {
            elements.push([top, next_bottom]);
        }
    }

    PlanarMesh {
        nodes,
        elements,
        span,
        height,
    }
}

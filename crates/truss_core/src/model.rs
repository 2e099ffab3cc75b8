//! Canonical truss model.
//!
//! This is the wire contract downstream consumers (visualization, analysis) depend on.
//! Every extraction or synthesis path converges to [`TrussModel`].

use serde::{Deserialize, Serialize};

/// Structure tag used when the document does not carry one.
pub const DEFAULT_TYPE: &str = "truss";
/// Default span in meters.
pub const DEFAULT_SPAN: f64 = 18.0;
/// Default height in meters.
pub const DEFAULT_HEIGHT: f64 = 3.0;
/// Default material tag.
pub const DEFAULT_MATERIAL: &str = "steel";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrussModel {
    #[serde(rename = "type")]
    pub kind: String,
    pub span: f64,
    pub height: f64,
    pub material: String,
    pub nodes: Vec<Node>,
    pub elements: Vec<Element>,
    pub supports: Vec<Support>,
    pub loads: Vec<Load>,
}

impl Default for TrussModel {
    fn default() -> Self {
        Self {
            kind: DEFAULT_TYPE.to_string(),
            span: DEFAULT_SPAN,
            height: DEFAULT_HEIGHT,
            material: DEFAULT_MATERIAL.to_string(),
            nodes: Vec::new(),
            elements: Vec::new(),
            supports: Vec::new(),
            loads: Vec::new(),
        }
    }
}

impl TrussModel {
    /// Whether the model carries any geometry at all.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.elements.is_empty()
    }
}

/// A joint. Ids are caller-supplied and not deduplicated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: i64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// A bar between two node ids. The ids are not checked against the node set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: i64,
    pub from: i64,
    pub to: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Support {
    pub node: i64,
    #[serde(rename = "type")]
    pub kind: SupportKind,
}

/// Boundary condition kinds. Anything unrecognized is a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportKind {
    #[default]
    Pin,
    Roller,
    Fixed,
    Guide,
}

impl SupportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SupportKind::Pin => "pin",
            SupportKind::Roller => "roller",
            SupportKind::Fixed => "fixed",
            SupportKind::Guide => "guide",
        }
    }

    /// Exact, case-sensitive match against the four wire names; everything else clamps to `Pin`.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "roller" => SupportKind::Roller,
            "fixed" => SupportKind::Fixed,
            "guide" => SupportKind::Guide,
            _ => SupportKind::Pin,
        }
    }
}

/// Force vector applied at a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Load {
    pub node: i64,
    pub fx: f64,
    pub fy: f64,
    pub fz: f64,
}

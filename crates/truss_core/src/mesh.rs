//! The two structural mesh shapes and the adapter between them.
//!
//! The language-model path produces the id-based [`TrussModel`]; the deterministic fallback
//! produces a positional [`PlanarMesh`] (coordinate triples and index pairs).

use serde::{Deserialize, Serialize};

use crate::model::{Element, Node, TrussModel, DEFAULT_MATERIAL, DEFAULT_TYPE};

/// Positional geometry: node identity is the index in `nodes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanarMesh {
    pub nodes: Vec<[f64; 3]>,
    pub elements: Vec<[usize; 2]>,
    pub span: f64,
    pub height: f64,
}

impl PlanarMesh {
    /// Lift into the canonical schema. Node and element ids equal their position index and
    /// element endpoints keep their positional indices. Supports and loads stay empty.
    pub fn to_truss_model(&self) -> TrussModel {
        let nodes = self
            .nodes
            .iter()
            .enumerate()
            .map(|(index, [x, y, z])| Node {
                id: index as i64,
                x: *x,
                y: *y,
                z: *z,
            })
            .collect();

        let elements = self
            .elements
            .iter()
            .enumerate()
            .map(|(index, [from, to])| Element {
                id: index as i64,
                from: *from as i64,
                to: *to as i64,
            })
            .collect();

        TrussModel {
            kind: DEFAULT_TYPE.to_string(),
            span: self.span,
            height: self.height,
            material: DEFAULT_MATERIAL.to_string(),
            nodes,
            elements,
            supports: Vec::new(),
            loads: Vec::new(),
        }
    }
}

impl From<PlanarMesh> for TrussModel {
    fn from(mesh: PlanarMesh) -> Self {
        mesh.to_truss_model()
    }
}

/// Either output shape, tagged so consumers can tell which path produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuralMesh {
    Canonical(TrussModel),
    Positional(PlanarMesh),
}

impl StructuralMesh {
    pub fn is_positional(&self) -> bool {
        matches!(self, StructuralMesh::Positional(_))
    }

    pub fn into_canonical(self) -> TrussModel {
        match self {
            StructuralMesh::Canonical(model) => model,
            StructuralMesh::Positional(mesh) => mesh.into(),
        }
    }
}

impl From<TrussModel> for StructuralMesh {
    fn from(model: TrussModel) -> Self {
        StructuralMesh::Canonical(model)
    }
}

impl From<PlanarMesh> for StructuralMesh {
    fn from(mesh: PlanarMesh) -> Self {
        StructuralMesh::Positional(mesh)
    }
}

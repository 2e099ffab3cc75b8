//! truss_core - canonical truss model and the pure pipeline stages
//!
//! - `model` - TrussModel, Node, Element, Support, Load
//! - `normalize` - lenient coercion of arbitrary documents into the model
//! - `geometry` - deterministic planar truss synthesis from text cues
//! - `mesh` - positional vs canonical mesh shapes and the adapter between them
//! - `integrity` - dangling reference report
//! - `config` - generation service configuration

pub mod config;
pub mod geometry;
pub mod integrity;
pub mod mesh;
pub mod model;
pub mod normalize;

pub use config::{BackendKind, Config, ConfigError};
pub use geometry::{build_mesh, synthesize, TrussParameters};
pub use integrity::{check_references, DanglingReference, IntegrityReport};
pub use mesh::{PlanarMesh, StructuralMesh};
pub use model::{Element, Load, Node, Support, SupportKind, TrussModel};
pub use normalize::normalize;

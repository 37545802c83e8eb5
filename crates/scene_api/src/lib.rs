//! Boundary between the interaction core and the rendering engine.
//!
//! The rendering engine owns the real scene graph; this crate models the part
//! of it the core needs: named nodes with parent links, drawable bounds and
//! material colors, and a "nearest surface along a ray" query.

mod color;
mod description;
mod geometry;
mod graph;

use thiserror::Error;

pub use color::{Color, ColorParseError};
pub use description::{load_scene_file, MeshDescription, NodeDescription, SceneDescription};
pub use geometry::{Aabb, Ray};
pub use graph::{Ancestors, Mesh, NodeId, QueryScope, RayHit, SceneGraph, SceneNode, SurfaceQuery};

/// Convenience alias for fallible scene operations.
pub type SceneResult<T> = Result<T, SceneError>;

/// Errors raised while loading or building a scene.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid scene file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid node `{name}`: {reason}")]
    InvalidNode { name: String, reason: String },
}

//! Interaction core of the scene viewer: entity registry, picking, hover and
//! click handling, label placement, camera orbiting and the overlay toggle.
//!
//! Everything here is synchronous and surface-free; a host feeds it pointer
//! events and frame ticks through [`ViewerContext`] and draws what it reports.

pub mod camera;
pub mod hit;
pub mod interaction;
pub mod labels;
pub mod overlay;
pub mod registry;

mod context;
#[cfg(test)]
mod test_support;

pub use camera::{ease_in_out_cubic, CameraController, Projection};
pub use context::{FrameReport, ViewerContext, ViewerEvent};
pub use interaction::{CursorStyle, InteractionState, PointerPhase};
pub use labels::{distance_fade, update_labels, LabelStats, ScreenRect};
pub use registry::{
    Entity, EntityDescriptor, EntityId, EntityPart, LabelBinding, LabelState, SceneRegistry,
};

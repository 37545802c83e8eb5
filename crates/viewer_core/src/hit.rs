use glam::Vec2;
use scene_api::{QueryScope, Ray, SceneGraph, SurfaceQuery};

use crate::{
    camera::CameraController,
    registry::{EntityId, SceneRegistry},
};

/// Entity under a viewport pixel.
///
/// Only the subtrees of registered entities are candidates. The struck
/// drawable is walked up through its parents until a node carries a
/// registered name.
pub fn resolve(
    screen: Vec2,
    camera: &CameraController,
    graph: &SceneGraph,
    surfaces: &dyn SurfaceQuery,
    registry: &SceneRegistry,
) -> Option<EntityId> {
    if registry.is_empty() {
        return None;
    }
    let ray = camera.ray_through(screen)?;
    resolve_ray(&ray, graph, surfaces, registry)
}

pub fn resolve_ray(
    ray: &Ray,
    graph: &SceneGraph,
    surfaces: &dyn SurfaceQuery,
    registry: &SceneRegistry,
) -> Option<EntityId> {
    let hit = surfaces.nearest_hit(ray, QueryScope::Subtrees(registry.roots()))?;
    graph
        .ancestors(hit.node)
        .find_map(|node| registry.lookup(graph.name(node)?))
}

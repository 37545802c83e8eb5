use glam::{Affine3A, Vec3};
use scene_api::{Aabb, Color, Mesh, NodeId, SceneGraph};

/// Small scenes of axis-aligned boxes for unit tests.
pub(crate) struct SceneBuilder {
    graph: SceneGraph,
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self {
            graph: SceneGraph::new(),
        }
    }

    pub fn group(&mut self, name: &str, parent: Option<NodeId>) -> NodeId {
        self.graph.add_node(name, parent)
    }

    /// Cube of edge `size` whose local origin is placed at `center`.
    pub fn drawable(
        &mut self,
        name: &str,
        parent: Option<NodeId>,
        center: Vec3,
        size: f32,
    ) -> NodeId {
        self.colored(name, parent, center, size, Color::default())
    }

    pub fn colored(
        &mut self,
        name: &str,
        parent: Option<NodeId>,
        center: Vec3,
        size: f32,
        color: Color,
    ) -> NodeId {
        let id = self.graph.add_node(name, parent);
        self.graph
            .set_transform(id, Affine3A::from_translation(center));
        self.graph.set_mesh(
            id,
            Mesh {
                bounds: Aabb::from_center_size(Vec3::ZERO, Vec3::splat(size)),
                color,
            },
        );
        id
    }

    pub fn finish(self) -> SceneGraph {
        self.graph
    }
}

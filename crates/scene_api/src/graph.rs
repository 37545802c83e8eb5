use glam::{Affine3A, Vec3, Vec3A};

use crate::{Aabb, Color, Ray};

/// Stable index of a node inside a [`SceneGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Drawable geometry attached to a node: local-space bounds and a material color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mesh {
    pub bounds: Aabb,
    pub color: Color,
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    transform: Affine3A,
    mesh: Option<Mesh>,
}

impl SceneNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn transform(&self) -> Affine3A {
        self.transform
    }

    pub fn mesh(&self) -> Option<&Mesh> {
        self.mesh.as_ref()
    }

    pub fn is_drawable(&self) -> bool {
        self.mesh.is_some()
    }
}

/// Nearest surface struck by a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub node: NodeId,
    pub distance: f32,
    pub point: Vec3,
}

/// Which part of the scene a ray query may strike.
#[derive(Debug, Clone, Copy)]
pub enum QueryScope<'a> {
    Everything,
    /// Only drawables inside the subtrees rooted at these nodes.
    Subtrees(&'a [NodeId]),
}

/// "Nearest drawable surface along a ray."
pub trait SurfaceQuery {
    fn nearest_hit(&self, ray: &Ray, scope: QueryScope<'_>) -> Option<RayHit>;
}

/// Arena of scene nodes with parent links.
///
/// Node ids are indices into the arena and stay valid for the lifetime of the
/// graph; nodes are never removed.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    roots: Vec<NodeId>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, name: impl Into<String>, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let parent = parent.filter(|p| p.index() < self.nodes.len());
        self.nodes.push(SceneNode {
            name: name.into(),
            parent,
            children: Vec::new(),
            transform: Affine3A::IDENTITY,
            mesh: None,
        });
        match parent {
            Some(p) => self.nodes[p.index()].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId(i as u32), node))
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.node(id).map(|n| n.name.as_str())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// The node itself followed by each of its ancestors up to the root.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            graph: self,
            next: self.node(id).map(|_| id),
        }
    }

    /// True when `node` is `ancestor` or lies somewhere beneath it.
    pub fn is_within(&self, node: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(node).any(|id| id == ancestor)
    }

    /// Depth-first list of `root` and everything below it.
    pub fn subtree(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if self.node(root).is_none() {
            return out;
        }
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(node) = self.node(id) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Depth-first traversal of the whole graph, roots in insertion order.
    pub fn traverse(&self) -> Vec<NodeId> {
        self.roots.iter().flat_map(|&r| self.subtree(r)).collect()
    }

    pub fn set_transform(&mut self, id: NodeId, transform: Affine3A) {
        if let Some(node) = self.nodes.get_mut(id.index()) {
            node.transform = transform;
        }
    }

    pub fn translate(&mut self, id: NodeId, offset: Vec3) {
        if let Some(node) = self.nodes.get_mut(id.index()) {
            node.transform.translation += Vec3A::from(offset);
        }
    }

    pub fn set_mesh(&mut self, id: NodeId, mesh: Mesh) {
        if let Some(node) = self.nodes.get_mut(id.index()) {
            node.mesh = Some(mesh);
        }
    }

    pub fn color(&self, id: NodeId) -> Option<Color> {
        self.node(id).and_then(|n| n.mesh.map(|m| m.color))
    }

    /// Sets the displayed material color; ignored for non-drawable nodes.
    pub fn set_color(&mut self, id: NodeId, color: Color) {
        if let Some(mesh) = self
            .nodes
            .get_mut(id.index())
            .and_then(|n| n.mesh.as_mut())
        {
            mesh.color = color;
        }
    }

    pub fn world_transform(&self, id: NodeId) -> Affine3A {
        self.ancestors(id)
            .filter_map(|a| self.node(a))
            .fold(Affine3A::IDENTITY, |acc, node| node.transform * acc)
    }

    /// World bounds of a single drawable node.
    pub fn drawable_bounds(&self, id: NodeId) -> Option<Aabb> {
        let mesh = self.node(id)?.mesh?;
        Some(mesh.bounds.transformed(&self.world_transform(id)))
    }

    /// World bounds of every drawable in the subtree under `id`, recomputed on
    /// each call.
    pub fn world_bounds(&self, id: NodeId) -> Option<Aabb> {
        self.subtree(id)
            .into_iter()
            .filter_map(|n| self.drawable_bounds(n))
            .reduce(|a, b| a.union(&b))
    }

    pub fn scene_bounds(&self) -> Option<Aabb> {
        self.roots
            .iter()
            .filter_map(|&r| self.world_bounds(r))
            .reduce(|a, b| a.union(&b))
    }

    fn nearest_among(&self, ray: &Ray, candidates: impl Iterator<Item = NodeId>) -> Option<RayHit> {
        candidates
            .filter_map(|id| {
                let distance = self.drawable_bounds(id)?.intersect_ray(ray)?;
                Some(RayHit {
                    node: id,
                    distance,
                    point: ray.point_at(distance),
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

impl SurfaceQuery for SceneGraph {
    fn nearest_hit(&self, ray: &Ray, scope: QueryScope<'_>) -> Option<RayHit> {
        match scope {
            QueryScope::Everything => self.nearest_among(
                ray,
                self.iter().filter(|(_, n)| n.is_drawable()).map(|(id, _)| id),
            ),
            QueryScope::Subtrees(roots) => self.nearest_among(
                ray,
                roots.iter().flat_map(|&r| self.subtree(r)),
            ),
        }
    }
}

pub struct Ancestors<'a> {
    graph: &'a SceneGraph,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.graph.parent(current);
        Some(current)
    }
}

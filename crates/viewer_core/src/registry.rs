//! Named interactive entities and the scene nodes that make them up.

use std::collections::{HashMap, HashSet};

use glam::{Vec2, Vec3};
use scene_api::{Color, NodeId, SceneGraph};
use tracing::warn;

/// Index of an entity inside a [`SceneRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub(crate) usize);

impl EntityId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A drawable belonging to an entity, with the two color bases it can show.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityPart {
    pub node: NodeId,
    /// Color authored in the asset.
    pub exported: Color,
    /// Color supplied by the CMS, or `exported` when it gave none.
    pub cms: Color,
    /// Color shown when the part is not highlighted.
    pub baseline: Color,
}

/// Screen state of a floating label, rewritten every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelState {
    pub visible: bool,
    /// Center of the label in viewport pixels.
    pub position: Vec2,
    pub opacity: f32,
}

impl Default for LabelState {
    fn default() -> Self {
        Self {
            visible: false,
            position: Vec2::ZERO,
            opacity: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelBinding {
    pub text: String,
    /// Rendered size in pixels.
    pub size: Vec2,
    pub state: LabelState,
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub name: String,
    pub node: NodeId,
    pub parts: Vec<EntityPart>,
    pub link: Option<String>,
    pub title: Option<String>,
    pub label: Option<LabelBinding>,
}

/// What the host supplies for a newly registered entity.
#[derive(Debug, Clone, Default)]
pub struct EntityDescriptor {
    /// CMS color; `None` keeps the exported color.
    pub color: Option<Color>,
    pub link: Option<String>,
    pub title: Option<String>,
    pub label: Option<(String, Vec2)>,
}

#[derive(Debug, Default)]
pub struct SceneRegistry {
    entities: Vec<Entity>,
    by_name: HashMap<String, EntityId>,
    by_root: HashMap<NodeId, EntityId>,
    roots: Vec<NodeId>,
}

impl SceneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `node` under `name`. The entity takes every drawable in its
    /// subtree whose nearest registered ancestor is `node`, including ones an
    /// enclosing entity held until now. The first registration of a name wins.
    pub fn register(
        &mut self,
        graph: &SceneGraph,
        name: &str,
        node: NodeId,
        descriptor: EntityDescriptor,
    ) -> Option<EntityId> {
        if name.is_empty() || graph.node(node).is_none() {
            return None;
        }
        if let Some(&existing) = self.by_name.get(name) {
            warn!(name, "duplicate interactive name; keeping the first node");
            return Some(existing);
        }
        if let Some(&existing) = self.by_root.get(&node) {
            warn!(name, "node already registered under another name");
            return Some(existing);
        }

        let parts: Vec<EntityPart> = graph
            .subtree(node)
            .into_iter()
            .filter(|&id| self.nearest_root(graph, id, node) == Some(node))
            .filter_map(|id| {
                let exported = graph.color(id)?;
                let cms = descriptor.color.unwrap_or(exported);
                Some(EntityPart {
                    node: id,
                    exported,
                    cms,
                    baseline: exported,
                })
            })
            .collect();

        let claimed: HashSet<NodeId> = parts.iter().map(|p| p.node).collect();
        if !claimed.is_empty() {
            for entity in &mut self.entities {
                entity.parts.retain(|p| !claimed.contains(&p.node));
            }
        }

        let id = EntityId(self.entities.len());
        self.entities.push(Entity {
            name: name.to_owned(),
            node,
            parts,
            link: descriptor.link,
            title: descriptor.title,
            label: descriptor.label.map(|(text, size)| LabelBinding {
                text,
                size,
                state: LabelState::default(),
            }),
        });
        self.by_name.insert(name.to_owned(), id);
        self.by_root.insert(node, id);
        self.roots.push(node);
        Some(id)
    }

    pub fn lookup(&self, name: &str) -> Option<EntityId> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.0)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id.0)
    }

    pub fn name(&self, id: EntityId) -> Option<&str> {
        self.get(id).map(|e| e.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities
            .iter()
            .enumerate()
            .map(|(i, e)| (EntityId(i), e))
    }

    pub(crate) fn entities_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    /// Root nodes of every interactive entity; the candidate set for picking.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Live world-space center of the entity's bounds. `None` when the entity
    /// has no drawable geometry.
    pub fn anchor_of(&self, graph: &SceneGraph, id: EntityId) -> Option<Vec3> {
        let entity = self.get(id)?;
        graph.world_bounds(entity.node).map(|b| b.center())
    }

    /// First node on the way up from `id` that roots an entity or is `pending`.
    fn nearest_root(&self, graph: &SceneGraph, id: NodeId, pending: NodeId) -> Option<NodeId> {
        graph
            .ancestors(id)
            .find(|n| *n == pending || self.by_root.contains_key(n))
    }

    /// Node ids of every part of the entity, for outline rendering.
    pub fn part_nodes(&self, id: EntityId) -> Vec<NodeId> {
        self.get(id)
            .map(|e| e.parts.iter().map(|p| p.node).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::SceneBuilder;

    #[test]
    fn register_and_lookup() {
        let mut builder = SceneBuilder::new();
        let a = builder.group("A", None);
        builder.drawable("A_wall", Some(a), Vec3::ZERO, 1.0);
        builder.drawable("A_roof", Some(a), Vec3::new(0.0, 1.0, 0.0), 1.0);
        let graph = builder.finish();

        let mut registry = SceneRegistry::new();
        let id = registry
            .register(&graph, "A", a, EntityDescriptor::default())
            .unwrap();
        assert_eq!(registry.lookup("A"), Some(id));
        assert_eq!(registry.lookup("missing"), None);
        assert_eq!(registry.get(id).unwrap().parts.len(), 2);
        assert_eq!(registry.roots(), &[a]);
    }

    #[test]
    fn empty_and_duplicate_names() {
        let mut builder = SceneBuilder::new();
        let first = builder.drawable("A", None, Vec3::ZERO, 1.0);
        let second = builder.drawable("A", None, Vec3::X * 3.0, 1.0);
        let graph = builder.finish();

        let mut registry = SceneRegistry::new();
        assert!(registry
            .register(&graph, "", first, EntityDescriptor::default())
            .is_none());
        let id = registry
            .register(&graph, "A", first, EntityDescriptor::default())
            .unwrap();
        assert_eq!(
            registry.register(&graph, "A", second, EntityDescriptor::default()),
            Some(id)
        );
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(id).unwrap().node, first);
    }

    #[test]
    fn anchor_is_recomputed_from_live_transforms() {
        let mut builder = SceneBuilder::new();
        let a = builder.drawable("A", None, Vec3::ZERO, 1.0);
        let empty = builder.group("Empty", None);
        let mut graph = builder.finish();

        let mut registry = SceneRegistry::new();
        let id = registry
            .register(&graph, "A", a, EntityDescriptor::default())
            .unwrap();
        let hollow = registry
            .register(&graph, "Empty", empty, EntityDescriptor::default())
            .unwrap();

        assert_eq!(registry.anchor_of(&graph, id), Some(Vec3::ZERO));
        graph.translate(a, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(registry.anchor_of(&graph, id), Some(Vec3::new(2.0, 0.0, 0.0)));
        assert_eq!(registry.anchor_of(&graph, hollow), None);
    }

    fn nested() -> (SceneGraph, NodeId, NodeId, NodeId, NodeId) {
        let mut builder = SceneBuilder::new();
        let building = builder.group("Building", None);
        let hall = builder.drawable("Hall", Some(building), Vec3::ZERO, 1.0);
        let unit = builder.group("Unit", Some(building));
        let room = builder.drawable("Room", Some(unit), Vec3::X * 2.0, 1.0);
        (builder.finish(), building, hall, unit, room)
    }

    fn part_nodes_of(registry: &SceneRegistry, name: &str) -> Vec<NodeId> {
        registry.part_nodes(registry.lookup(name).unwrap())
    }

    #[test]
    fn nested_entity_owns_its_own_drawables() {
        let (graph, building, hall, unit, room) = nested();

        let mut outer_first = SceneRegistry::new();
        outer_first.register(&graph, "Building", building, EntityDescriptor::default());
        assert_eq!(part_nodes_of(&outer_first, "Building"), vec![hall, room]);
        outer_first.register(&graph, "Unit", unit, EntityDescriptor::default());
        assert_eq!(part_nodes_of(&outer_first, "Building"), vec![hall]);
        assert_eq!(part_nodes_of(&outer_first, "Unit"), vec![room]);

        let mut inner_first = SceneRegistry::new();
        inner_first.register(&graph, "Unit", unit, EntityDescriptor::default());
        inner_first.register(&graph, "Building", building, EntityDescriptor::default());
        assert_eq!(part_nodes_of(&inner_first, "Building"), vec![hall]);
        assert_eq!(part_nodes_of(&inner_first, "Unit"), vec![room]);
    }

    #[test]
    fn cms_color_applies_to_every_part() {
        let mut builder = SceneBuilder::new();
        let a = builder.group("A", None);
        builder.drawable("part", Some(a), Vec3::ZERO, 1.0);
        let graph = builder.finish();

        let mut registry = SceneRegistry::new();
        let id = registry
            .register(
                &graph,
                "A",
                a,
                EntityDescriptor {
                    color: Some(Color::new(1.0, 0.0, 0.0)),
                    ..EntityDescriptor::default()
                },
            )
            .unwrap();
        let part = registry.get(id).unwrap().parts[0];
        assert_eq!(part.cms, Color::new(1.0, 0.0, 0.0));
        assert_eq!(part.exported, Color::default());
    }
}

//! Hover, press and click tracking for a single pointer.

use glam::Vec2;
use scene_api::{NodeId, SceneGraph};

use crate::registry::{EntityId, SceneRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorStyle {
    #[default]
    Default,
    Pointer,
}

/// Observable phase of the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerPhase {
    Idle,
    Hovering(EntityId),
    Pressed {
        entity: Option<EntityId>,
        origin: Vec2,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Press {
    entity: Option<EntityId>,
    origin: Vec2,
}

#[derive(Debug, Default)]
pub struct InteractionState {
    hovered: Option<EntityId>,
    press: Option<Press>,
    outline: Vec<NodeId>,
    cursor: CursorStyle,
}

impl InteractionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> PointerPhase {
        match (self.press, self.hovered) {
            (Some(press), _) => PointerPhase::Pressed {
                entity: press.entity,
                origin: press.origin,
            },
            (None, Some(entity)) => PointerPhase::Hovering(entity),
            (None, None) => PointerPhase::Idle,
        }
    }

    pub fn hovered(&self) -> Option<EntityId> {
        self.hovered
    }

    pub fn pressed_entity(&self) -> Option<EntityId> {
        self.press.and_then(|p| p.entity)
    }

    pub fn is_pressed(&self) -> bool {
        self.press.is_some()
    }

    /// Nodes the renderer should outline.
    pub fn outline(&self) -> &[NodeId] {
        &self.outline
    }

    pub fn cursor(&self) -> CursorStyle {
        self.cursor
    }

    /// Move the hover to `hit`. The previous hover gets its baseline color
    /// back before the new one is brightened by `highlight_factor`.
    pub fn hover(
        &mut self,
        hit: Option<EntityId>,
        registry: &SceneRegistry,
        graph: &mut SceneGraph,
        highlight_factor: f32,
    ) {
        if hit == self.hovered {
            return;
        }
        self.clear_hover(registry, graph);

        let Some(entity) = hit.filter(|&id| registry.get(id).is_some()) else {
            return;
        };
        paint(registry, graph, entity, highlight_factor);
        self.hovered = Some(entity);
        self.outline = registry.part_nodes(entity);
        self.cursor = CursorStyle::Pointer;
    }

    pub fn press(&mut self, hit: Option<EntityId>, position: Vec2) {
        self.press = Some(Press {
            entity: hit,
            origin: position,
        });
    }

    /// The camera began a drag; the press can no longer become a click.
    pub fn drag_started(&mut self) {
        if let Some(press) = self.press.as_mut() {
            press.entity = None;
        }
    }

    /// Finish a press. Returns the entity to activate when the pointer moved
    /// no more than `click_distance` and `resolve_at_release` names the same
    /// entity that was pressed. The press is cleared either way.
    pub fn release(
        &mut self,
        position: Vec2,
        click_distance: f32,
        resolve_at_release: impl FnOnce() -> Option<EntityId>,
    ) -> Option<EntityId> {
        let press = self.press.take()?;
        let entity = press.entity?;
        if position.distance(press.origin) > click_distance {
            return None;
        }
        (resolve_at_release() == Some(entity)).then_some(entity)
    }

    /// Pointer cancel or leave: drop the press and the hover.
    pub fn cancel(&mut self, registry: &SceneRegistry, graph: &mut SceneGraph) {
        self.press = None;
        self.clear_hover(registry, graph);
    }

    /// Re-apply the hovered entity's baseline without highlight and refresh
    /// its outline. Used after the baselines change underneath the hover.
    pub fn settle_hover(&mut self, registry: &SceneRegistry, graph: &mut SceneGraph) {
        if let Some(entity) = self.hovered {
            paint(registry, graph, entity, 1.0);
            self.outline = registry.part_nodes(entity);
        }
    }

    /// Forget everything without touching colors; the scene it referred to is gone.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn clear_hover(&mut self, registry: &SceneRegistry, graph: &mut SceneGraph) {
        if let Some(previous) = self.hovered.take() {
            paint(registry, graph, previous, 1.0);
        }
        self.outline.clear();
        self.cursor = CursorStyle::Default;
    }
}

/// Write every part's baseline, scaled by `factor`, into the scene.
fn paint(registry: &SceneRegistry, graph: &mut SceneGraph, entity: EntityId, factor: f32) {
    let Some(entity) = registry.get(entity) else {
        return;
    };
    for part in &entity.parts {
        let color = if factor == 1.0 {
            part.baseline
        } else {
            part.baseline.scaled(factor)
        };
        graph.set_color(part.node, color);
    }
}

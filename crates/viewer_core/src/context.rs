use std::time::Duration;

use glam::Vec2;
use scene_api::{Aabb, Color, NodeId, SceneGraph};
use settings::{CmsConfig, EntityConfig, ViewerSettings};
use tracing::{debug, info, trace, warn};

use crate::{
    camera::CameraController,
    hit,
    interaction::{CursorStyle, InteractionState},
    labels::{update_labels, LabelStats},
    overlay::apply_overlay,
    registry::{EntityDescriptor, EntityId, LabelBinding, SceneRegistry},
};

/// Something the host has to act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerEvent {
    /// An entity was clicked; open `link` when present.
    Activated {
        entity: String,
        link: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameReport {
    pub camera_moved: bool,
    pub labels: LabelStats,
}

/// Owns every piece of mutable viewer state and routes input into it.
///
/// All calls are expected from one thread, in event order; a frame reads
/// whatever the preceding handlers left behind.
pub struct ViewerContext {
    settings: ViewerSettings,
    graph: SceneGraph,
    registry: SceneRegistry,
    camera: CameraController,
    interaction: InteractionState,
    overlay_on: bool,
    events: Vec<ViewerEvent>,
    last_frame: Option<Duration>,
}

impl ViewerContext {
    pub fn new(settings: ViewerSettings, viewport: (u32, u32)) -> Self {
        let camera = CameraController::new(&settings.camera, viewport);
        Self {
            settings,
            graph: SceneGraph::new(),
            registry: SceneRegistry::new(),
            camera,
            interaction: InteractionState::new(),
            overlay_on: false,
            events: Vec::new(),
            last_frame: None,
        }
    }

    /// Replace the scene, recenter it on the origin, frame it and register
    /// every node named in `cms`.
    pub fn install_scene(&mut self, mut graph: SceneGraph, cms: &CmsConfig) {
        self.interaction.reset();
        self.registry = SceneRegistry::new();

        if let Some(bounds) = graph.scene_bounds() {
            let offset = -bounds.center();
            for root in graph.roots().to_vec() {
                graph.translate(root, offset);
            }
            self.camera
                .reset_to_fit(&Aabb::from_center_size(glam::Vec3::ZERO, bounds.size()));
        }
        self.graph = graph;

        for node in self.graph.traverse() {
            let Some(config) = self.graph.name(node).and_then(|name| cms.get(name)) else {
                continue;
            };
            let descriptor = entity_descriptor(config);
            self.registry
                .register(&self.graph, &config.mesh, node, descriptor);
        }
        for missing in cms.names().filter(|name| self.registry.lookup(name).is_none()) {
            warn!(entity = missing, "configured entity not found in scene");
        }

        self.overlay_on = cms.overlay_on;
        apply_overlay(
            self.overlay_on,
            &mut self.registry,
            &mut self.graph,
            &mut self.interaction,
        );

        info!(
            entities = self.registry.len(),
            nodes = self.graph.len(),
            overlay_on = self.overlay_on,
            "scene installed"
        );
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.camera.update_viewport((width, height));
    }

    pub fn pointer_move(&mut self, position: Vec2) {
        if self.interaction.is_pressed() {
            let threshold = self.settings.interaction.click_distance_px;
            if self.camera.drag_to(position, threshold) {
                self.interaction.drag_started();
            }
            return;
        }
        let hit = self.resolve(position);
        self.interaction.hover(
            hit,
            &self.registry,
            &mut self.graph,
            self.settings.interaction.highlight_factor,
        );
    }

    pub fn pointer_down(&mut self, position: Vec2) {
        let hit = self.resolve(position);
        self.interaction.press(hit, position);
        self.camera.begin_drag(position);
    }

    pub fn pointer_up(&mut self, position: Vec2) {
        self.camera.end_drag();
        let (camera, graph, registry) = (&self.camera, &self.graph, &self.registry);
        let activated = self.interaction.release(
            position,
            self.settings.interaction.click_distance_px,
            || hit::resolve(position, camera, graph, graph, registry),
        );
        if let Some(entity) = activated {
            self.activate_entity(entity);
        }
    }

    pub fn pointer_cancel(&mut self) {
        self.camera.end_drag();
        self.interaction.cancel(&self.registry, &mut self.graph);
    }

    pub fn pointer_leave(&mut self) {
        self.pointer_cancel();
    }

    pub fn zoom(&mut self, amount: f32) {
        self.camera.zoom(amount);
    }

    pub fn set_overlay(&mut self, on: bool) {
        self.overlay_on = on;
        apply_overlay(on, &mut self.registry, &mut self.graph, &mut self.interaction);
        debug!(on, "overlay applied");
    }

    pub fn toggle_overlay(&mut self) -> bool {
        self.set_overlay(!self.overlay_on);
        self.overlay_on
    }

    /// Orbit to `name` over the configured duration. Unknown names and
    /// entities without geometry are ignored; returns whether an orbit began.
    pub fn orbit_to(&mut self, name: &str, now: Duration) -> bool {
        let duration = Duration::from_millis(self.settings.orbit.duration_ms);
        self.orbit_to_with(name, duration, now)
    }

    pub fn orbit_to_with(&mut self, name: &str, duration: Duration, now: Duration) -> bool {
        let Some(id) = self.registry.lookup(name) else {
            debug!(entity = name, "orbit to unknown entity ignored");
            return false;
        };
        let Some(anchor) = self.registry.anchor_of(&self.graph, id) else {
            debug!(entity = name, "orbit to entity without geometry ignored");
            return false;
        };
        self.camera.orbit_to(anchor, now, duration);
        true
    }

    /// Activate `name` as if it had been clicked, e.g. from its label.
    pub fn activate(&mut self, name: &str) -> bool {
        match self.registry.lookup(name) {
            Some(id) => {
                self.activate_entity(id);
                true
            }
            None => false,
        }
    }

    /// Report a label's rendered size in pixels.
    pub fn set_label_size(&mut self, name: &str, size: Vec2) {
        if let Some(label) = self
            .registry
            .lookup(name)
            .and_then(|id| self.registry.get_mut(id))
            .and_then(|e| e.label.as_mut())
        {
            label.size = size;
        }
    }

    /// Advance the camera and place labels for the frame at `now`.
    pub fn frame(&mut self, now: Duration) -> FrameReport {
        let dt = self
            .last_frame
            .map_or(0.0, |last| now.saturating_sub(last).as_secs_f32());
        self.last_frame = Some(now);

        let camera_moved = self.camera.update(now, dt);
        let labels = update_labels(
            &mut self.registry,
            &self.graph,
            &self.graph,
            &self.camera,
            &self.settings.labels,
            self.interaction.hovered(),
        );
        trace!(
            shown = labels.shown,
            offscreen = labels.offscreen,
            over_budget = labels.over_budget,
            occluded = labels.occluded,
            overlapping = labels.overlapping,
            "labels placed"
        );

        FrameReport {
            camera_moved,
            labels,
        }
    }

    pub fn drain_events(&mut self) -> Vec<ViewerEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn settings(&self) -> &ViewerSettings {
        &self.settings
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    /// For hosts that animate scene nodes; anchors follow on the next frame.
    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    pub fn registry(&self) -> &SceneRegistry {
        &self.registry
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut CameraController {
        &mut self.camera
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn overlay_on(&self) -> bool {
        self.overlay_on
    }

    pub fn hovered(&self) -> Option<&str> {
        self.interaction
            .hovered()
            .and_then(|id| self.registry.name(id))
    }

    pub fn cursor(&self) -> CursorStyle {
        self.interaction.cursor()
    }

    pub fn outline(&self) -> &[NodeId] {
        self.interaction.outline()
    }

    pub fn label(&self, name: &str) -> Option<&LabelBinding> {
        let id = self.registry.lookup(name)?;
        self.registry.get(id)?.label.as_ref()
    }

    fn resolve(&self, position: Vec2) -> Option<EntityId> {
        hit::resolve(position, &self.camera, &self.graph, &self.graph, &self.registry)
    }

    fn activate_entity(&mut self, id: EntityId) {
        let Some(entity) = self.registry.get(id) else {
            return;
        };
        info!(entity = %entity.name, link = ?entity.link, "entity activated");
        self.events.push(ViewerEvent::Activated {
            entity: entity.name.clone(),
            link: entity.link.clone(),
        });
    }
}

fn entity_descriptor(config: &EntityConfig) -> EntityDescriptor {
    let color = config
        .color
        .as_deref()
        .and_then(|value| match Color::from_css(value) {
            Ok(color) => Some(color),
            Err(error) => {
                warn!(entity = %config.mesh, value, %error, "malformed CMS color; using exported color");
                None
            }
        });
    let label = config.label.as_ref().map(|label| {
        let text = label
            .text
            .clone()
            .or_else(|| config.title.clone())
            .unwrap_or_else(|| config.mesh.clone());
        let size = label.size.map(Vec2::from_array).unwrap_or(Vec2::ZERO);
        (text, size)
    });
    EntityDescriptor {
        color,
        link: config.link.clone(),
        title: config.title.clone(),
        label,
    }
}

//! Per-frame placement of floating labels.
//!
//! Candidates are ranked hovered-first, then nearest-first, and placed
//! greedily: each one must fit the visible budget, have an unobstructed line
//! of sight and keep its distance from labels already placed. The hovered
//! entity's label is exempt from all three and always ends up visible.

use std::cmp::Ordering;

use glam::{Vec2, Vec3};
use scene_api::{NodeId, QueryScope, Ray, SceneGraph, SurfaceQuery};
use settings::LabelSettings;

use crate::{
    camera::CameraController,
    registry::{EntityId, LabelState, SceneRegistry},
};

/// Axis-aligned rectangle in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub min: Vec2,
    pub max: Vec2,
}

impl ScreenRect {
    pub fn centered(center: Vec2, size: Vec2) -> Self {
        let half = size.abs() * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// True when the rectangles intersect after growing `other` by `pad`.
    pub fn overlaps(&self, other: &ScreenRect, pad: f32) -> bool {
        !(self.max.x < other.min.x - pad
            || self.min.x > other.max.x + pad
            || self.max.y < other.min.y - pad
            || self.min.y > other.max.y + pad)
    }
}

/// Outcome counts of one placement pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelStats {
    pub shown: usize,
    pub offscreen: usize,
    pub over_budget: usize,
    pub occluded: usize,
    pub overlapping: usize,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    entity: EntityId,
    node: NodeId,
    size: Vec2,
    /// `None` when the anchor is off-screen.
    placement: Option<Placement>,
}

#[derive(Debug, Clone, Copy)]
struct Placement {
    world: Vec3,
    screen: Vec2,
    depth: f32,
}

impl Candidate {
    fn depth(&self) -> f32 {
        self.placement.map_or(f32::INFINITY, |p| p.depth)
    }
}

/// Opacity for a label `distance` away from the eye: linear falloff clamped
/// to `[fade_floor, fade_ceiling]`.
pub fn distance_fade(distance: f32, settings: &LabelSettings) -> f32 {
    let lo = settings.fade_floor.min(settings.fade_ceiling);
    let hi = settings.fade_floor.max(settings.fade_ceiling);
    let range = settings.fade_range.max(f32::EPSILON);
    (settings.fade_offset - distance / range).clamp(lo, hi)
}

/// Run one placement pass and write the result into every label binding.
pub fn update_labels(
    registry: &mut SceneRegistry,
    graph: &SceneGraph,
    surfaces: &dyn SurfaceQuery,
    camera: &CameraController,
    settings: &LabelSettings,
    hovered: Option<EntityId>,
) -> LabelStats {
    let eye = camera.position();
    let default_size = Vec2::from_array(settings.default_label_size);

    let mut candidates: Vec<Candidate> = registry
        .iter()
        .filter_map(|(id, entity)| {
            let label = entity.label.as_ref()?;
            let size = if label.size.cmpgt(Vec2::ZERO).all() {
                label.size
            } else {
                default_size
            };
            let placement = registry
                .anchor_of(graph, id)
                .and_then(|world| place(camera, eye, world, settings.offscreen_margin));
            Some(Candidate {
                entity: id,
                node: entity.node,
                size,
                placement,
            })
        })
        .collect();

    candidates.sort_by(|a, b| {
        let a_forced = Some(a.entity) == hovered;
        let b_forced = Some(b.entity) == hovered;
        match (a_forced, b_forced) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => a.depth().total_cmp(&b.depth()),
        }
    });

    let mut stats = LabelStats::default();
    let mut placed: Vec<ScreenRect> = Vec::new();

    for candidate in &candidates {
        let forced = Some(candidate.entity) == hovered;

        let Some(placement) = candidate.placement else {
            hide(registry, candidate.entity);
            stats.offscreen += 1;
            continue;
        };

        if stats.shown >= settings.max_visible && !forced {
            hide(registry, candidate.entity);
            stats.over_budget += 1;
            continue;
        }

        if settings.occlusion
            && !forced
            && is_occluded(graph, surfaces, eye, placement.world, candidate.node)
        {
            hide(registry, candidate.entity);
            stats.occluded += 1;
            continue;
        }

        let rect = ScreenRect::centered(placement.screen, candidate.size);
        if !forced
            && placed
                .iter()
                .any(|other| other.overlaps(&rect, settings.min_separation_px))
        {
            hide(registry, candidate.entity);
            stats.overlapping += 1;
            continue;
        }

        write_state(
            registry,
            candidate.entity,
            LabelState {
                visible: true,
                position: placement.screen,
                opacity: distance_fade(placement.depth, settings),
            },
        );
        placed.push(rect);
        stats.shown += 1;
    }

    if let Some(label) = hovered
        .and_then(|id| registry.get_mut(id))
        .and_then(|entity| entity.label.as_mut())
    {
        label.state.visible = true;
        label.state.opacity = 1.0;
    }

    stats
}

/// Screen placement of an anchor, or `None` when it falls outside the clip
/// depth range or too far past the viewport edges.
fn place(camera: &CameraController, eye: Vec3, world: Vec3, margin: f32) -> Option<Placement> {
    let projection = camera.project(world);
    let ndc = projection.ndc;
    let offscreen = !projection.in_front
        || !ndc.is_finite()
        || ndc.z < -1.0
        || ndc.z > 1.0
        || ndc.x.abs() > margin
        || ndc.y.abs() > margin;
    if offscreen {
        return None;
    }
    Some(Placement {
        world,
        screen: projection.screen,
        depth: eye.distance(world),
    })
}

/// True when the first surface between the eye and `anchor` belongs to
/// something outside the subtree at `owner`.
fn is_occluded(
    graph: &SceneGraph,
    surfaces: &dyn SurfaceQuery,
    eye: Vec3,
    anchor: Vec3,
    owner: NodeId,
) -> bool {
    let Some(ray) = Ray::towards(eye, anchor) else {
        return false;
    };
    match surfaces.nearest_hit(&ray, QueryScope::Everything) {
        Some(hit) => !graph.is_within(hit.node, owner),
        None => false,
    }
}

fn hide(registry: &mut SceneRegistry, id: EntityId) {
    if let Some(label) = registry.get_mut(id).and_then(|e| e.label.as_mut()) {
        label.state.visible = false;
    }
}

fn write_state(registry: &mut SceneRegistry, id: EntityId, state: LabelState) {
    if let Some(label) = registry.get_mut(id).and_then(|e| e.label.as_mut()) {
        label.state = state;
    }
}

#[cfg(test)]
mod tests {
    use settings::CameraSettings;

    use super::*;
    use crate::{registry::EntityDescriptor, test_support::SceneBuilder};

    struct Row {
        graph: SceneGraph,
        registry: SceneRegistry,
        ids: Vec<EntityId>,
        camera: CameraController,
    }

    fn labelled(name: &str) -> EntityDescriptor {
        EntityDescriptor {
            label: Some((name.to_owned(), Vec2::splat(10.0))),
            ..EntityDescriptor::default()
        }
    }

    /// Small boxes along +x, one unit apart, seen from straight ahead.
    fn row(positions: &[Vec3], size: f32) -> Row {
        let mut builder = SceneBuilder::new();
        let nodes: Vec<NodeId> = positions
            .iter()
            .enumerate()
            .map(|(i, &p)| builder.drawable(&format!("E{i}"), None, p, size))
            .collect();
        let graph = builder.finish();

        let mut registry = SceneRegistry::new();
        let ids = nodes
            .iter()
            .enumerate()
            .map(|(i, &node)| {
                let name = format!("E{i}");
                registry
                    .register(&graph, &name, node, labelled(&name))
                    .unwrap()
            })
            .collect();

        let mut camera = CameraController::new(&CameraSettings::default(), (2000, 1200));
        camera.look_from(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        Row {
            graph,
            registry,
            ids,
            camera,
        }
    }

    fn ten_in_a_row() -> Row {
        let positions: Vec<Vec3> = (0..10).map(|i| Vec3::new(i as f32, 0.0, 0.0)).collect();
        row(&positions, 0.2)
    }

    fn visible(row: &Row) -> Vec<usize> {
        row.ids
            .iter()
            .enumerate()
            .filter(|(_, &id)| {
                row.registry
                    .get(id)
                    .and_then(|e| e.label.as_ref())
                    .is_some_and(|l| l.state.visible)
            })
            .map(|(i, _)| i)
            .collect()
    }

    fn run(row: &mut Row, settings: &LabelSettings, hovered: Option<EntityId>) -> LabelStats {
        update_labels(
            &mut row.registry,
            &row.graph,
            &row.graph,
            &row.camera,
            settings,
            hovered,
        )
    }

    #[test]
    fn budget_keeps_the_nearest() {
        let mut row = ten_in_a_row();
        let stats = run(&mut row, &LabelSettings::default(), None);
        assert_eq!(stats.shown, 6);
        assert_eq!(stats.over_budget, 4);
        assert_eq!(visible(&row), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn hovered_label_is_always_included() {
        let mut row = ten_in_a_row();
        let hovered = row.ids[9];
        let stats = run(&mut row, &LabelSettings::default(), Some(hovered));
        assert_eq!(stats.shown, 6);
        assert_eq!(visible(&row), vec![0, 1, 2, 3, 4, 9]);

        let state = row.registry.get(hovered).unwrap().label.as_ref().unwrap().state;
        assert_eq!(state.opacity, 1.0);
    }

    #[test]
    fn label_is_centered_on_projected_anchor() {
        let mut row = ten_in_a_row();
        run(&mut row, &LabelSettings::default(), None);
        let state = row.registry.get(row.ids[0]).unwrap().label.as_ref().unwrap().state;
        assert!((state.position - Vec2::new(1000.0, 600.0)).length() < 1e-2);
        assert_eq!(state.opacity, distance_fade(10.0, &LabelSettings::default()));
    }

    #[test]
    fn occluded_label_is_hidden_unless_hovered() {
        let mut builder = SceneBuilder::new();
        let target = builder.drawable("Target", None, Vec3::ZERO, 1.0);
        builder.drawable("Blocker", None, Vec3::new(0.0, 0.0, 3.0), 1.0);
        let graph = builder.finish();
        let mut registry = SceneRegistry::new();
        let id = registry
            .register(&graph, "Target", target, labelled("Target"))
            .unwrap();
        let mut camera = CameraController::new(&CameraSettings::default(), (800, 600));
        camera.look_from(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        let settings = LabelSettings::default();

        let is_visible = |registry: &SceneRegistry| {
            registry.get(id).unwrap().label.as_ref().unwrap().state.visible
        };

        let stats = update_labels(&mut registry, &graph, &graph, &camera, &settings, None);
        assert_eq!(stats.occluded, 1);
        assert!(!is_visible(&registry));

        update_labels(&mut registry, &graph, &graph, &camera, &settings, Some(id));
        assert!(is_visible(&registry));

        let no_occlusion = LabelSettings {
            occlusion: false,
            ..LabelSettings::default()
        };
        update_labels(&mut registry, &graph, &graph, &camera, &no_occlusion, None);
        assert!(is_visible(&registry));
    }

    #[test]
    fn later_overlapping_label_is_hidden() {
        let mut row = row(&[Vec3::ZERO, Vec3::new(0.3, 0.0, 0.0)], 0.1);
        let stats = run(&mut row, &LabelSettings::default(), None);
        assert_eq!(stats.overlapping, 1);
        assert_eq!(visible(&row), vec![0]);

        // the hovered one wins the contested space and the other yields
        let hovered = row.ids[1];
        run(&mut row, &LabelSettings::default(), Some(hovered));
        assert_eq!(visible(&row), vec![1]);
    }

    #[test]
    fn anchor_behind_the_eye_is_offscreen() {
        let mut row = row(&[Vec3::ZERO, Vec3::new(0.0, 0.0, 20.0)], 0.2);
        let stats = run(&mut row, &LabelSettings::default(), None);
        assert_eq!(stats.offscreen, 1);
        assert_eq!(visible(&row), vec![0]);
    }

    /// World x at depth zero whose projection lands at `ndc_x`.
    fn x_at_ndc(camera: &CameraController, ndc_x: f32) -> f32 {
        ndc_x / camera.project(Vec3::X).ndc.x
    }

    #[test]
    fn anchor_past_the_viewport_margin_is_offscreen() {
        let mut row = row(&[Vec3::ZERO, Vec3::ZERO, Vec3::ZERO], 0.2);
        let margin = LabelSettings::default().offscreen_margin;
        let inside = x_at_ndc(&row.camera, margin - 0.05);
        let outside = x_at_ndc(&row.camera, margin + 0.05);
        let inside_node = row.registry.get(row.ids[1]).unwrap().node;
        let outside_node = row.registry.get(row.ids[2]).unwrap().node;
        row.graph.translate(inside_node, Vec3::new(inside, 0.0, 0.0));
        row.graph.translate(outside_node, Vec3::new(-outside, 0.0, 0.0));

        let stats = run(&mut row, &LabelSettings::default(), None);
        assert_eq!(stats.offscreen, 1);
        assert_eq!(visible(&row), vec![0, 1]);

        // just inside the margin still counts even though it is past the edge
        let state = row.registry.get(row.ids[1]).unwrap().label.as_ref().unwrap().state;
        assert!(state.position.x > 2000.0);
    }

    #[test]
    fn offscreen_hovered_label_stays_visible_where_it_was() {
        let mut row = row(&[Vec3::ZERO], 0.2);
        let id = row.ids[0];
        run(&mut row, &LabelSettings::default(), None);
        let before = row.registry.get(id).unwrap().label.as_ref().unwrap().state;
        assert!(before.visible);
        assert!(before.opacity < 1.0);

        let node = row.registry.get(id).unwrap().node;
        row.graph.translate(node, Vec3::new(0.0, 0.0, 20.0));
        let stats = run(&mut row, &LabelSettings::default(), Some(id));
        assert_eq!(stats.offscreen, 1);
        let after = row.registry.get(id).unwrap().label.as_ref().unwrap().state;
        assert!(after.visible);
        assert_eq!(after.opacity, 1.0);
        assert_eq!(after.position, before.position);
    }

    #[test]
    fn fade_is_clamped_and_non_increasing() {
        let settings = LabelSettings::default();
        assert_eq!(distance_fade(0.0, &settings), 1.0);
        assert!((distance_fade(9.6, &settings) - 0.4).abs() < 1e-6);
        assert_eq!(distance_fade(50.0, &settings), 0.4);
        let mut previous = distance_fade(0.0, &settings);
        for step in 1..200 {
            let fade = distance_fade(step as f32 * 0.1, &settings);
            assert!(fade <= previous);
            assert!((0.4..=1.0).contains(&fade));
            previous = fade;
        }
    }

    #[test]
    fn rect_overlap_uses_padding() {
        let a = ScreenRect::centered(Vec2::ZERO, Vec2::splat(10.0));
        let b = ScreenRect::centered(Vec2::new(40.0, 0.0), Vec2::splat(10.0));
        assert!(!a.overlaps(&b, 0.0));
        assert!(a.overlaps(&b, 52.0));
    }
}

use scene_api::SceneGraph;

use crate::{interaction::InteractionState, registry::SceneRegistry};

/// Switch every interactive part between its CMS color (`on`) and its
/// exported color, making that the new hover baseline.
///
/// A hovered entity is left at its plain baseline, without highlight.
pub fn apply_overlay(
    on: bool,
    registry: &mut SceneRegistry,
    graph: &mut SceneGraph,
    interaction: &mut InteractionState,
) {
    for entity in registry.entities_mut() {
        for part in &mut entity.parts {
            part.baseline = if on { part.cms } else { part.exported };
            graph.set_color(part.node, part.baseline);
        }
    }
    interaction.settle_hover(registry, graph);
}

//! JSON scene description used as the asset-loader stand-in.

use std::{fs::File, io::BufReader, path::Path};

use glam::{Affine3A, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::{Aabb, Color, Mesh, NodeId, SceneError, SceneGraph, SceneResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneDescription {
    #[serde(default)]
    pub nodes: Vec<NodeDescription>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeDescription {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub translation: Option<[f32; 3]>,
    /// Quaternion as `[x, y, z, w]`.
    #[serde(default)]
    pub rotation: Option<[f32; 4]>,
    #[serde(default)]
    pub scale: Option<[f32; 3]>,
    #[serde(default)]
    pub mesh: Option<MeshDescription>,
    #[serde(default)]
    pub children: Vec<NodeDescription>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshDescription {
    pub min: [f32; 3],
    pub max: [f32; 3],
    /// Linear RGB; drawables without a color get `#aaaaaa`.
    #[serde(default)]
    pub color: Option<[f32; 3]>,
}

impl SceneDescription {
    pub fn from_json(json: &str) -> SceneResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn build(&self) -> SceneResult<SceneGraph> {
        let mut graph = SceneGraph::new();
        for node in &self.nodes {
            node.insert(&mut graph, None)?;
        }
        Ok(graph)
    }
}

impl NodeDescription {
    fn insert(&self, graph: &mut SceneGraph, parent: Option<NodeId>) -> SceneResult<()> {
        let id = graph.add_node(self.name.clone(), parent);
        graph.set_transform(id, self.transform()?);
        if let Some(mesh) = &self.mesh {
            graph.set_mesh(id, mesh.to_mesh(&self.name)?);
        }
        for child in &self.children {
            child.insert(graph, Some(id))?;
        }
        Ok(())
    }

    fn transform(&self) -> SceneResult<Affine3A> {
        let translation = Vec3::from_array(self.translation.unwrap_or([0.0; 3]));
        let scale = Vec3::from_array(self.scale.unwrap_or([1.0; 3]));
        let rotation = self
            .rotation
            .map(Quat::from_array)
            .unwrap_or(Quat::IDENTITY);

        if !translation.is_finite() || !scale.is_finite() || !rotation.is_finite() {
            return Err(self.invalid("non-finite transform"));
        }
        if rotation.length_squared() == 0.0 {
            return Err(self.invalid("zero-length rotation"));
        }
        let rotation = rotation.normalize();

        Ok(Affine3A::from_scale_rotation_translation(
            scale,
            rotation,
            translation,
        ))
    }

    fn invalid(&self, reason: &str) -> SceneError {
        SceneError::InvalidNode {
            name: self.name.clone(),
            reason: reason.to_owned(),
        }
    }
}

impl MeshDescription {
    fn to_mesh(&self, name: &str) -> SceneResult<Mesh> {
        let min = Vec3::from_array(self.min);
        let max = Vec3::from_array(self.max);
        if !min.is_finite() || !max.is_finite() {
            return Err(SceneError::InvalidNode {
                name: name.to_owned(),
                reason: "non-finite bounds".into(),
            });
        }
        if min.cmpgt(max).any() {
            return Err(SceneError::InvalidNode {
                name: name.to_owned(),
                reason: "mesh bounds min exceeds max".into(),
            });
        }
        Ok(Mesh {
            bounds: Aabb::new(min, max),
            color: self.color.map(Color::from).unwrap_or_default(),
        })
    }
}

/// Read and build a scene from a JSON description on disk.
pub fn load_scene_file(path: impl AsRef<Path>) -> SceneResult<SceneGraph> {
    let file = File::open(path.as_ref())?;
    let description: SceneDescription = serde_json::from_reader(BufReader::new(file))?;
    description.build()
}

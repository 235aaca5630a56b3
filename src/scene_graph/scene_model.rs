use id_arena::Id;

use crate::{
    geometry::{LineVertex, MeshVertex},
    rendering::render_model::RenderModelId,
};

pub type SceneModelId = Id<SceneModel>;

/// CPU-side geometry and how it should be drawn.
pub enum ModelKind {
    /// Lit, gradient-textured triangles.
    Shaded(Vec<MeshVertex>),
    /// Unlit segments, two vertices per line.
    Lines(Vec<LineVertex>),
    /// Unlit points.
    Points(Vec<LineVertex>),
}

pub struct SceneModel {
    pub name: String,
    pub kind: ModelKind,
    pub render_model: Option<RenderModelId>,
}

impl SceneModel {
    pub fn new(name: impl Into<String>, kind: ModelKind) -> Self {
        Self {
            name: name.into(),
            kind,
            render_model: None,
        }
    }

    pub fn vertex_count(&self) -> usize {
        match &self.kind {
            ModelKind::Shaded(vertices) => vertices.len(),
            ModelKind::Lines(vertices) | ModelKind::Points(vertices) => vertices.len(),
        }
    }
}

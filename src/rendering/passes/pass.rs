use std::sync::Arc;

use id_arena::Arena;

use crate::rendering::{
    common::RenderCommon,
    render_model::RenderModel,
    shader_loader::{PipelineCache, PipelineCacheBuilder},
};

pub(crate) trait Pass {
    type TextureViews;

    fn create(
        device: &wgpu::Device,
        common: Arc<RenderCommon>,
        cache_builder: &mut PipelineCacheBuilder,
    ) -> anyhow::Result<Self>
    where
        Self: Sized;

    fn render(
        &self,
        texture_views: &Self::TextureViews,
        encoder: &mut wgpu::CommandEncoder,
        pipeline_cache: &PipelineCache,
        render_models: &Arena<RenderModel>,
    );
}

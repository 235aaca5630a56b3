use std::sync::Arc;

use id_arena::Arena;
use wgpu::RenderPassDescriptor;

use crate::rendering::{
    common::RenderCommon,
    passes::pass::Pass,
    render_model::RenderModel,
    shader_loader::{PipelineCache, PipelineCacheBuilder},
};

/// Clears the output to transparent black.
pub struct BackgroundPass {
    clear_color: wgpu::Color,
}

pub struct BackgroundPassTextureViews {
    pub color: wgpu::TextureView,
}

impl Pass for BackgroundPass {
    type TextureViews = BackgroundPassTextureViews;

    fn create(
        _device: &wgpu::Device,
        _common: Arc<RenderCommon>,
        _cache_builder: &mut PipelineCacheBuilder,
    ) -> anyhow::Result<BackgroundPass> {
        Ok(Self {
            clear_color: wgpu::Color::TRANSPARENT,
        })
    }

    fn render(
        &self,
        texture_views: &Self::TextureViews,
        encoder: &mut wgpu::CommandEncoder,
        _pipeline_cache: &PipelineCache,
        _render_models: &Arena<RenderModel>,
    ) {
        encoder.begin_render_pass(&RenderPassDescriptor {
            label: Some("Background Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &texture_views.color,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });
    }
}

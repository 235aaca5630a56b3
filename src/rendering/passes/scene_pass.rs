use std::sync::Arc;

use id_arena::Arena;
use wgpu::{
    DepthBiasState, Device, MultisampleState, PipelineCompilationOptions, RenderPassDescriptor,
    ShaderSource, StencilState,
};

use crate::rendering::{
    common::RenderCommon,
    instance::Instance,
    passes::pass::Pass,
    render_model::{DrawKind, RenderModel, LINE_VBL, MESH_VBL},
    shader_loader::{
        PipelineCache, PipelineCacheBuilder, PipelineFactory, PipelineId, ShaderDefinition,
    },
    texture::DepthTexture,
};

const MESH_SHADER: ShaderDefinition = ShaderDefinition {
    name: "Gradient mesh",
    path: "mesh.wgsl",
    source: include_str!("../../../assets/shaders/mesh.wgsl"),
};

const UNLIT_SHADER: ShaderDefinition = ShaderDefinition {
    name: "Unlit",
    path: "unlit.wgsl",
    source: include_str!("../../../assets/shaders/unlit.wgsl"),
};

/// Draws every render model: shaded triangles, then lines, then points.
pub struct ScenePass {
    mesh_pipeline_id: PipelineId,
    line_pipeline_id: PipelineId,
    point_pipeline_id: PipelineId,
    camera_bind_group: wgpu::BindGroup,
    common: Arc<RenderCommon>,
}

pub struct ScenePassTextureViews {
    pub color: wgpu::TextureView,
    pub depth: wgpu::TextureView,
}

impl Pass for ScenePass {
    type TextureViews = ScenePassTextureViews;

    fn create(
        device: &wgpu::Device,
        common: Arc<RenderCommon>,
        cache_builder: &mut PipelineCacheBuilder,
    ) -> anyhow::Result<Self> {
        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("camera_bind_group_layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("camera_bind_group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: common.camera_uniform_buffer.as_entire_binding(),
            }],
        });

        let mesh_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Gradient mesh pipeline layout"),
            bind_group_layouts: &[
                &camera_bind_group_layout,
                &common.global_uniform.bind_group_layout,
                &common.gradient.bind_group_layout,
            ],
            push_constant_ranges: &[],
        });

        let unlit_layout = Arc::new(device.create_pipeline_layout(
            &wgpu::PipelineLayoutDescriptor {
                label: Some("Unlit pipeline layout"),
                bind_group_layouts: &[&camera_bind_group_layout],
                push_constant_ranges: &[],
            },
        ));

        let mesh_pipeline_id = cache_builder.add_shader(
            MESH_SHADER,
            pipeline_factory(
                common.clone(),
                Arc::new(mesh_layout),
                MESH_VBL,
                wgpu::PrimitiveTopology::TriangleList,
            ),
        );

        let line_pipeline_id = cache_builder.add_shader(
            UNLIT_SHADER,
            pipeline_factory(
                common.clone(),
                unlit_layout.clone(),
                LINE_VBL,
                wgpu::PrimitiveTopology::LineList,
            ),
        );

        let point_pipeline_id = cache_builder.add_shader(
            UNLIT_SHADER,
            pipeline_factory(
                common.clone(),
                unlit_layout,
                LINE_VBL,
                wgpu::PrimitiveTopology::PointList,
            ),
        );

        Ok(ScenePass {
            mesh_pipeline_id,
            line_pipeline_id,
            point_pipeline_id,
            camera_bind_group,
            common,
        })
    }

    fn render(
        &self,
        texture_views: &Self::TextureViews,
        encoder: &mut wgpu::CommandEncoder,
        pipeline_cache: &PipelineCache,
        render_models: &Arena<RenderModel>,
    ) {
        let mut render_pass = encoder.begin_render_pass(&RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &texture_views.color,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &texture_views.depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        render_pass.set_bind_group(0, &self.camera_bind_group, &[]);

        for kind in [DrawKind::Shaded, DrawKind::Lines, DrawKind::Points] {
            let pipeline_id = match kind {
                DrawKind::Shaded => self.mesh_pipeline_id,
                DrawKind::Lines => self.line_pipeline_id,
                DrawKind::Points => self.point_pipeline_id,
            };

            let Some(pipeline) = pipeline_cache.get(pipeline_id) else {
                log::error!("No pipeline for {:?} models", kind);
                continue;
            };

            render_pass.set_pipeline(pipeline);
            if kind == DrawKind::Shaded {
                render_pass.set_bind_group(1, &self.common.global_uniform.bind_group, &[]);
                render_pass.set_bind_group(2, &self.common.gradient.bind_group, &[]);
            }

            for (_id, render_model) in render_models.iter() {
                if render_model.kind == kind {
                    render_model.draw(&mut render_pass);
                }
            }
        }
    }
}

fn pipeline_factory(
    common: Arc<RenderCommon>,
    layout: Arc<wgpu::PipelineLayout>,
    vertex_layout: wgpu::VertexBufferLayout<'static>,
    topology: wgpu::PrimitiveTopology,
) -> PipelineFactory {
    Box::new(
        move |device: &Device, shader_def: &ShaderDefinition, source: &str| {
            let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(shader_def.name),
                source: ShaderSource::Wgsl(source.into()),
            });

            let label = format!("{} pipeline ({:?})", shader_def.name, topology);

            let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(&label),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[vertex_layout.clone(), Instance::LAYOUT],
                    compilation_options: PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: common.output_format(),
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    // Negative scale flips the winding, so nothing is culled.
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DepthTexture::DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: StencilState::default(),
                    bias: DepthBiasState::default(),
                }),
                multisample: MultisampleState::default(),
                multiview: None,
                cache: None,
            });

            Ok(pipeline)
        },
    )
}

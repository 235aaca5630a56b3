use std::sync::RwLock;

use anyhow::Context;
use wgpu::SurfaceConfiguration;
use winit::dpi::PhysicalSize;

use crate::{
    gradient::GradientTexture,
    rendering::{
        global_uniform::{GlobalUniform, GlobalUniformState},
        texture::Texture,
    },
    scene_builder::hemisphere_light,
};

/// Resources shared by every pass.
pub struct RenderCommon {
    pub output_surface_config: RwLock<SurfaceConfiguration>,
    pub camera_uniform_buffer: wgpu::Buffer,
    pub global_uniform: GlobalUniform,
    pub gradient: GradientMaterial,
}

impl RenderCommon {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        adapter: &wgpu::Adapter,
        surface: &wgpu::Surface,
        size: PhysicalSize<u32>,
        camera_uniform_buffer: wgpu::Buffer,
        gradient: &GradientTexture,
    ) -> anyhow::Result<Self> {
        let surface_caps = surface.get_capabilities(adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or(surface_caps.formats.first())
            .copied()
            .context("Surface reports no supported formats")?;

        let output_surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(device, &output_surface_config);

        let global_uniform = GlobalUniform::new(
            device,
            GlobalUniformState::hemisphere(hemisphere_light()),
        );

        Ok(Self {
            output_surface_config: RwLock::new(output_surface_config),
            camera_uniform_buffer,
            global_uniform,
            gradient: GradientMaterial::new(device, queue, gradient),
        })
    }

    pub fn output_format(&self) -> wgpu::TextureFormat {
        self.output_surface_config
            .read()
            .map(|config| config.format)
            .unwrap_or_else(|poisoned| poisoned.into_inner().format)
    }
}

/// Gradient texture and its sampler, bound as one group.
pub struct GradientMaterial {
    _texture: Texture,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl GradientMaterial {
    fn new(device: &wgpu::Device, queue: &wgpu::Queue, gradient: &GradientTexture) -> Self {
        let texture = Texture::from_gradient(device, queue, gradient);

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Gradient bind group layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Gradient bind group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        });

        Self {
            _texture: texture,
            bind_group,
            bind_group_layout,
        }
    }
}

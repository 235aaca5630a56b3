use std::sync::Arc;

use anyhow::Context;
use id_arena::Arena;
use wgpu::CommandEncoderDescriptor;
use winit::{dpi::PhysicalSize, window::Window};

use crate::{
    camera::CameraUniform,
    demo::{output_sizes, DemoState},
    rendering::{
        common::RenderCommon,
        imgui_renderer::ImguiRendererState,
        instance::gather_instances,
        passes::{
            background_pass::{BackgroundPass, BackgroundPassTextureViews},
            pass::Pass,
            scene_pass::{ScenePass, ScenePassTextureViews},
            upscale_pass::{UpscalePass, UpscalePassTextureViews},
        },
        render_model::RenderModel,
        shader_loader::{PipelineCacheBuilder, ShaderLoader},
        texture::{ColorTarget, DepthTexture},
    },
};

pub struct Renderer {
    pub window: Arc<Window>,
    /// Window size in physical pixels.
    pub size: PhysicalSize<u32>,
    max_pixel_ratio: f64,

    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,

    common: Arc<RenderCommon>,
    scene_target: ColorTarget,
    depth_texture: DepthTexture,
    render_models: Arena<RenderModel>,

    camera_uniform: CameraUniform,

    shader_loader: ShaderLoader,

    background_pass: BackgroundPass,
    scene_pass: ScenePass,
    upscale_pass: UpscalePass,
    imgui_renderer: ImguiRendererState,
}

/// A frame whose scene passes are recorded but not yet submitted.
pub struct FrameInProgress {
    output: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
    encoder: wgpu::CommandEncoder,
}

impl Renderer {
    pub async fn new(
        window: Arc<Window>,
        demo_state: &DemoState,
        imgui_context: &mut imgui::Context,
    ) -> anyhow::Result<Renderer> {
        let size = window.inner_size();
        let max_pixel_ratio = demo_state.config.max_pixel_ratio;
        let sizes = output_sizes(size, window.scale_factor(), max_pixel_ratio);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window.clone())
            .context("Failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("No suitable graphics adapter")?;

        log::info!("Using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                label: None,
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("Failed to create device")?;

        let mut camera_uniform = CameraUniform::default();
        camera_uniform.update(&demo_state.camera);
        let camera_uniform_buffer = camera_uniform.create_buffer(&device);

        let common = Arc::new(RenderCommon::new(
            &device,
            &queue,
            &adapter,
            &surface,
            sizes.surface,
            camera_uniform_buffer,
            &demo_state.gradient,
        )?);

        let scene_target = ColorTarget::new(
            &device,
            sizes.scene,
            common.output_format(),
            "Scene color target",
        );
        let depth_texture = DepthTexture::new(&device, sizes.scene, "Depth Texture");

        let mut cache_builder = PipelineCacheBuilder::new();

        let background_pass = BackgroundPass::create(&device, common.clone(), &mut cache_builder)?;
        let scene_pass = ScenePass::create(&device, common.clone(), &mut cache_builder)?;
        let upscale_pass = UpscalePass::create(&device, common.clone(), &mut cache_builder)?;

        let shader_loader = ShaderLoader::new(device.clone(), cache_builder)?;

        let imgui_renderer =
            ImguiRendererState::new(&device, &queue, common.output_format(), imgui_context);

        Ok(Self {
            window,
            size,
            max_pixel_ratio,
            surface,
            device,
            queue,
            common,
            scene_target,
            depth_texture,
            render_models: Arena::new(),
            camera_uniform,
            shader_loader,
            background_pass,
            scene_pass,
            upscale_pass,
            imgui_renderer,
        })
    }

    pub fn load_models(&mut self, demo_state: &mut DemoState) -> anyhow::Result<()> {
        for (_id, scene_model) in demo_state.scene.models.iter_mut() {
            let render_model = RenderModel::from_scene_model(&self.device, scene_model);
            scene_model.render_model = Some(self.render_models.alloc(render_model));
            log::info!(
                "Loaded model {} with {} vertices",
                scene_model.name,
                scene_model.vertex_count()
            );
        }

        Ok(())
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        self.size = new_size;
        let sizes = output_sizes(new_size, self.window.scale_factor(), self.max_pixel_ratio);

        let mut config = match self.common.output_surface_config.write() {
            Ok(config) => config,
            Err(poisoned) => poisoned.into_inner(),
        };
        config.width = sizes.surface.width;
        config.height = sizes.surface.height;
        self.surface.configure(&self.device, &config);

        if sizes.scene != sizes.surface {
            log::debug!(
                "Rendering scene at {}x{} for a {}x{} surface",
                sizes.scene.width,
                sizes.scene.height,
                sizes.surface.width,
                sizes.surface.height
            );
        }
        self.scene_target.resize(&self.device, sizes.scene);
        self.depth_texture.resize(&self.device, sizes.scene);
    }

    pub fn render(&mut self, demo_state: &DemoState) -> Result<FrameInProgress, wgpu::SurfaceError> {
        self.shader_loader.load_pending_shaders();

        self.camera_uniform.update(&demo_state.camera);
        self.camera_uniform
            .update_buffer(&self.queue, &self.common.camera_uniform_buffer);

        gather_instances(&demo_state.scene, &mut self.render_models);
        for (_id, render_model) in self.render_models.iter() {
            render_model.upload_instances(&self.queue);
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let pipeline_cache = &self.shader_loader.cache;

        let scene_view = self.scene_target.view().clone();

        self.background_pass.render(
            &BackgroundPassTextureViews {
                color: scene_view.clone(),
            },
            &mut encoder,
            pipeline_cache,
            &self.render_models,
        );

        self.scene_pass.render(
            &ScenePassTextureViews {
                color: scene_view.clone(),
                depth: self.depth_texture.view().clone(),
            },
            &mut encoder,
            pipeline_cache,
            &self.render_models,
        );

        self.upscale_pass.render(
            &UpscalePassTextureViews {
                source: scene_view,
                sampler: self.scene_target.sampler().clone(),
                color: view.clone(),
            },
            &mut encoder,
            pipeline_cache,
            &self.render_models,
        );

        Ok(FrameInProgress {
            output,
            view,
            encoder,
        })
    }

    /// Draws the UI overlay, then submits and presents.
    pub fn finish_frame(&mut self, frame: FrameInProgress, imgui_context: &mut imgui::Context) {
        let FrameInProgress {
            output,
            view,
            mut encoder,
        } = frame;

        self.imgui_renderer.render(
            &view,
            imgui_context,
            &self.device,
            &self.queue,
            &mut encoder,
        );

        self.queue.submit([encoder.finish()]);
        output.present();
    }
}

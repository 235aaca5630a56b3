use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use glam::{Vec2, Vec3};
use winit::dpi::PhysicalSize;

use crate::{
    animation::{AnimationCommand, AnimationController, FrameContext, FrameScheduler},
    camera::{Camera, OrbitControls},
    config::DemoConfig,
    gradient::GradientTexture,
    rendering::surface::RenderSurface,
    scene_builder::{build_scene, SceneHandles},
    scene_graph::Scene,
};

pub const CAMERA_EYE: Vec3 = Vec3::new(0.0, 0.0, 2.0);
pub const ORBIT_DAMPING: f32 = 0.03;

pub struct DemoState {
    pub config: DemoConfig,
    pub camera: Camera,
    pub controls: OrbitControls,
    pub scene: Scene,
    pub handles: SceneHandles,
    pub gradient: GradientTexture,
    pub scheduler: FrameScheduler,
    pub controller: AnimationController,
}

impl DemoState {
    pub fn new(config: DemoConfig) -> anyhow::Result<Self> {
        config.validate().context("Invalid configuration")?;

        let setup = build_scene(&config).context("Failed to build scene")?;

        let mut scheduler = FrameScheduler::new();
        let controller =
            AnimationController::start(&mut scheduler, config.transitions, config.variant);

        log::info!(
            "Starting {:?} variant with {:?} transitions",
            config.variant,
            config.transitions
        );

        Ok(Self {
            camera: Camera::perspective(CAMERA_EYE, 1.0),
            controls: OrbitControls::new(ORBIT_DAMPING),
            scene: setup.scene,
            handles: setup.handles,
            gradient: setup.gradient,
            scheduler,
            controller,
            config,
        })
    }

    pub fn apply_command(&mut self, command: AnimationCommand) {
        self.controller.apply(command, &mut self.scheduler);
    }

    /// Updates the controls, then runs one iteration of every live loop.
    pub fn update(&mut self, surface: &mut dyn RenderSurface) -> usize {
        self.controls.update(&mut self.camera);

        let mut ctx = FrameContext {
            scene: &mut self.scene,
            camera: &self.camera,
            handles: &self.handles,
            now_ms: wall_clock_ms(),
        };

        self.scheduler.tick(&mut ctx, surface)
    }

    /// Only the projection follows the viewport; animation state is untouched.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.camera
            .set_aspect(Vec2::new(width as f32, height as f32));
    }
}

fn wall_clock_ms() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64() * 1000.0)
        .unwrap_or_default()
}

/// Output size for a window of `physical` pixels at `scale_factor`, with the
/// effective pixel ratio capped at `max_pixel_ratio`.
pub fn render_size(
    physical: PhysicalSize<u32>,
    scale_factor: f64,
    max_pixel_ratio: f64,
) -> PhysicalSize<u32> {
    if scale_factor <= max_pixel_ratio || scale_factor <= 0.0 {
        return physical;
    }

    let ratio = max_pixel_ratio / scale_factor;
    PhysicalSize::new(
        ((physical.width as f64 * ratio).round() as u32).max(1),
        ((physical.height as f64 * ratio).round() as u32).max(1),
    )
}

/// Extents of the presented surface and of the offscreen scene target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputSizes {
    pub surface: PhysicalSize<u32>,
    pub scene: PhysicalSize<u32>,
}

/// The surface always matches the window. Only the scene target shrinks when
/// the pixel ratio is capped; it is upscaled onto the surface when presenting.
pub fn output_sizes(
    window: PhysicalSize<u32>,
    scale_factor: f64,
    max_pixel_ratio: f64,
) -> OutputSizes {
    OutputSizes {
        surface: window,
        scene: render_size(window, scale_factor, max_pixel_ratio),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{animation::AnimationMode, rendering::surface::FrameRequests};

    #[test]
    fn resize_only_touches_the_camera() {
        let mut state = DemoState::new(DemoConfig {
            particles: 8,
            ..DemoConfig::default()
        })
        .unwrap();
        let mut requests = FrameRequests::default();

        state.apply_command(AnimationCommand::ScaleUp);
        state.update(&mut requests);

        let mesh = state.scene.get_object_transform(state.handles.mesh).unwrap();
        let (scale, rotation) = (mesh.scale(), mesh.rotation());

        state.resize(1920, 1080);
        state.resize(0, 0);
        state.resize(640, 480);

        let mesh = state.scene.get_object_transform(state.handles.mesh).unwrap();
        assert_eq!(mesh.scale(), scale);
        assert_eq!(mesh.rotation(), rotation);
        assert_eq!(state.controller.mode(), AnimationMode::ScaleUp);
        assert_eq!(state.scheduler.live_loops(), 1);
        assert!((state.camera.aspect - 640.0 / 480.0).abs() < 1e-6);
    }

    #[test]
    fn update_issues_one_draw_per_live_loop() {
        let mut state = DemoState::new(DemoConfig::default()).unwrap();
        let mut requests = FrameRequests::default();

        requests.begin_frame();
        assert_eq!(state.update(&mut requests), 1);
        assert_eq!(requests.count(), 1);
    }

    #[test]
    fn rejects_invalid_config() {
        let config = DemoConfig {
            particle_extent: -1.0,
            ..DemoConfig::default()
        };

        assert!(DemoState::new(config).is_err());
    }

    #[test]
    fn pixel_ratio_is_capped() {
        let size = PhysicalSize::new(3000, 1500);

        assert_eq!(render_size(size, 1.0, 2.0), size);
        assert_eq!(render_size(size, 2.0, 2.0), size);
        assert_eq!(render_size(size, 3.0, 2.0), PhysicalSize::new(2000, 1000));
    }

    #[test]
    fn surface_matches_window_when_ratio_is_capped() {
        let window = PhysicalSize::new(3000, 1500);
        let sizes = output_sizes(window, 3.0, 2.0);

        assert_eq!(sizes.surface, window);
        assert_eq!(sizes.scene, PhysicalSize::new(2000, 1000));

        let uncapped = output_sizes(window, 1.5, 2.0);
        assert_eq!(uncapped.surface, window);
        assert_eq!(uncapped.scene, window);
    }
}

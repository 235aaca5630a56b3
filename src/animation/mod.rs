pub mod behavior;
pub mod controller;
pub mod scheduler;

pub use behavior::{AnimationMode, FrameContext, LoopBehavior};
pub use controller::{AnimationCommand, AnimationController};
pub use scheduler::{FrameScheduler, LoopHandle};

#[cfg(test)]
pub(crate) mod test_support {
    use glam::Vec3;

    use crate::{
        animation::{FrameContext, FrameScheduler},
        camera::Camera,
        config::{DemoConfig, Variant},
        rendering::surface::RenderSurface,
        scene_builder::{build_scene, SceneHandles},
        scene_graph::Scene,
    };

    #[derive(Default)]
    pub struct RecordingSurface {
        pub draws: usize,
    }

    impl RenderSurface for RecordingSurface {
        fn draw(&mut self, _scene: &Scene, _camera: &Camera) {
            self.draws += 1;
        }
    }

    pub struct Fixture {
        pub scene: Scene,
        pub handles: SceneHandles,
        pub camera: Camera,
        pub now_ms: f64,
    }

    impl Fixture {
        pub fn new(variant: Variant) -> Self {
            let config = DemoConfig {
                variant,
                particles: 16,
                ..DemoConfig::default()
            };
            let setup = build_scene(&config).unwrap();

            Self {
                scene: setup.scene,
                handles: setup.handles,
                camera: Camera::perspective(Vec3::new(0.0, 0.0, 2.0), 1.0),
                now_ms: 0.0,
            }
        }

        pub fn tick(
            &mut self,
            scheduler: &mut FrameScheduler,
            surface: &mut dyn RenderSurface,
        ) -> usize {
            let mut ctx = FrameContext {
                scene: &mut self.scene,
                camera: &self.camera,
                handles: &self.handles,
                now_ms: self.now_ms,
            };
            scheduler.tick(&mut ctx, surface)
        }

        pub fn mesh_scale(&self) -> Vec3 {
            self.scene
                .get_object_transform(self.handles.mesh)
                .unwrap()
                .scale()
        }

        pub fn mesh_rotation_y(&self) -> f32 {
            self.scene
                .get_object_transform(self.handles.mesh)
                .unwrap()
                .rotation()
                .y
        }

        pub fn wireframe_scale(&self) -> Vec3 {
            self.scene
                .get_object_transform(self.handles.wireframe)
                .unwrap()
                .scale()
        }

        pub fn particle_rotation_y(&self) -> Option<f32> {
            self.handles.particles.map(|particles| {
                self.scene
                    .get_object_transform(particles)
                    .unwrap()
                    .rotation()
                    .y
            })
        }
    }
}

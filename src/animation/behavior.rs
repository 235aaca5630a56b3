use crate::{
    camera::Camera,
    config::Variant,
    scene_builder::{SceneHandles, WIREFRAME_SCALE},
    scene_graph::Scene,
};

pub const MESH_ROTATION_SPEED: f32 = 0.005;
pub const PARTICLE_ROTATION_SPEED: f32 = 0.001;
pub const SCALE_STEP: f32 = 0.01;
pub const PULSE_AMPLITUDE: f64 = 0.1;
pub const PULSE_FREQUENCY: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationMode {
    Default,
    ScaleUp,
    ScaleDown,
}

impl AnimationMode {
    pub const ALL: [AnimationMode; 3] = [
        AnimationMode::Default,
        AnimationMode::ScaleUp,
        AnimationMode::ScaleDown,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AnimationMode::Default => "default",
            AnimationMode::ScaleUp => "scale up",
            AnimationMode::ScaleDown => "scale down",
        }
    }
}

/// Everything a loop iteration may touch.
pub struct FrameContext<'a> {
    pub scene: &'a mut Scene,
    pub camera: &'a Camera,
    pub handles: &'a SceneHandles,
    /// Wall-clock milliseconds since the Unix epoch.
    pub now_ms: f64,
}

/// The per-frame transform mutation of one loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopBehavior {
    /// Idle spin. The pulse variant also breathes the mesh scale.
    Idle(Variant),
    Grow,
    Shrink,
}

impl LoopBehavior {
    pub fn for_mode(mode: AnimationMode, variant: Variant) -> Self {
        match mode {
            AnimationMode::Default => LoopBehavior::Idle(variant),
            AnimationMode::ScaleUp => LoopBehavior::Grow,
            AnimationMode::ScaleDown => LoopBehavior::Shrink,
        }
    }

    pub fn step(&self, ctx: &mut FrameContext) {
        let handles = ctx.handles;

        match *self {
            LoopBehavior::Idle(variant) => {
                if variant == Variant::Pulse {
                    let scale = 1.0 + (ctx.now_ms * PULSE_FREQUENCY).sin() * PULSE_AMPLITUDE;
                    ctx.scene.update_object_transform(handles.mesh, |t| {
                        t.set_uniform_scale(scale as f32)
                    });
                }

                ctx.scene
                    .update_object_transform(handles.mesh, |t| t.rotate_y(MESH_ROTATION_SPEED));
                ctx.scene.update_object_transform(handles.wireframe, |t| {
                    t.set_uniform_scale(WIREFRAME_SCALE)
                });

                if let Some(particles) = handles.particles {
                    ctx.scene.update_object_transform(particles, |t| {
                        t.rotate_y(PARTICLE_ROTATION_SPEED)
                    });
                }
            }
            LoopBehavior::Grow => {
                ctx.scene
                    .update_object_transform(handles.mesh, |t| t.add_uniform_scale(SCALE_STEP));
            }
            LoopBehavior::Shrink => {
                ctx.scene
                    .update_object_transform(handles.mesh, |t| t.add_uniform_scale(-SCALE_STEP));
            }
        }
    }
}

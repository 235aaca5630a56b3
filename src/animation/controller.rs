use std::collections::HashMap;

use crate::{
    animation::{
        behavior::{AnimationMode, LoopBehavior},
        scheduler::{live_flag, FrameScheduler, LiveFlag, LoopHandle},
    },
    config::{TransitionPolicy, Variant},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationCommand {
    ScaleUp,
    ScaleDown,
    Reset,
}

impl AnimationCommand {
    pub const ALL: [AnimationCommand; 3] = [
        AnimationCommand::ScaleUp,
        AnimationCommand::ScaleDown,
        AnimationCommand::Reset,
    ];

    /// Fixed identifier of the trigger bound to this command.
    pub fn trigger_id(self) -> &'static str {
        match self {
            AnimationCommand::ScaleUp => "scale-up",
            AnimationCommand::ScaleDown => "scale-down",
            AnimationCommand::Reset => "reset",
        }
    }

    pub fn target(self) -> AnimationMode {
        match self {
            AnimationCommand::ScaleUp => AnimationMode::ScaleUp,
            AnimationCommand::ScaleDown => AnimationMode::ScaleDown,
            AnimationCommand::Reset => AnimationMode::Default,
        }
    }
}

#[derive(Debug)]
struct ActiveLoop {
    handle: LoopHandle,
    alive: LiveFlag,
}

/// Owns the current animation mode and the last loop started for each mode.
pub struct AnimationController {
    mode: AnimationMode,
    policy: TransitionPolicy,
    variant: Variant,
    loops: HashMap<AnimationMode, ActiveLoop>,
}

impl AnimationController {
    /// Enters `Default` immediately.
    pub fn start(
        scheduler: &mut FrameScheduler,
        policy: TransitionPolicy,
        variant: Variant,
    ) -> Self {
        let mut controller = Self {
            mode: AnimationMode::Default,
            policy,
            variant,
            loops: HashMap::new(),
        };
        controller.enter(AnimationMode::Default, scheduler);
        controller
    }

    pub fn apply(&mut self, command: AnimationCommand, scheduler: &mut FrameScheduler) {
        let target = command.target();
        log::debug!("{:?}: {:?} -> {:?}", command, self.mode, target);

        for mode in AnimationMode::ALL {
            if mode != target {
                self.cancel(mode, scheduler);
            }
        }

        if self.policy == TransitionPolicy::Idempotent {
            self.cancel(target, scheduler);
        }

        self.enter(target, scheduler);
    }

    pub fn mode(&self) -> AnimationMode {
        self.mode
    }

    /// Handle of the most recent loop started for `mode`, if not cancelled.
    pub fn active_handle(&self, mode: AnimationMode) -> Option<LoopHandle> {
        self.loops.get(&mode).map(|active| active.handle)
    }

    fn cancel(&mut self, mode: AnimationMode, scheduler: &mut FrameScheduler) {
        let Some(active) = self.loops.remove(&mode) else {
            return;
        };

        active.alive.set(false);
        if scheduler.cancel(active.handle) {
            log::debug!("Cancelled {} loop {:?}", mode.label(), active.handle);
        }
    }

    fn enter(&mut self, mode: AnimationMode, scheduler: &mut FrameScheduler) {
        let alive = live_flag();
        let behavior = LoopBehavior::for_mode(mode, self.variant);
        let handle = scheduler.schedule(mode, behavior, alive.clone());

        if let Some(previous) = self.loops.insert(mode, ActiveLoop { handle, alive }) {
            log::warn!(
                "{} loop {:?} is still running alongside {:?}",
                mode.label(),
                previous.handle,
                handle
            );
        }

        self.mode = mode;
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::TAU;

    use glam::Vec3;

    use super::*;
    use crate::animation::test_support::{Fixture, RecordingSurface};

    const EPSILON: f32 = 1e-4;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    struct Harness {
        fixture: Fixture,
        scheduler: FrameScheduler,
        controller: AnimationController,
        surface: RecordingSurface,
    }

    impl Harness {
        fn new(policy: TransitionPolicy, variant: Variant) -> Self {
            let fixture = Fixture::new(variant);
            let mut scheduler = FrameScheduler::new();
            let controller = AnimationController::start(&mut scheduler, policy, variant);

            Self {
                fixture,
                scheduler,
                controller,
                surface: RecordingSurface::default(),
            }
        }

        fn apply(&mut self, command: AnimationCommand) {
            self.controller.apply(command, &mut self.scheduler);
        }

        fn run(&mut self, frames: usize) {
            for _ in 0..frames {
                self.fixture.tick(&mut self.scheduler, &mut self.surface);
            }
        }
    }

    #[test]
    fn starts_in_default() {
        let harness = Harness::new(TransitionPolicy::Idempotent, Variant::Particles);

        assert_eq!(harness.controller.mode(), AnimationMode::Default);
        assert!(harness
            .controller
            .active_handle(AnimationMode::Default)
            .is_some());
        assert_eq!(harness.scheduler.live_loops(), 1);
    }

    #[test]
    fn scale_up_grows_linearly() {
        let mut harness = Harness::new(TransitionPolicy::Idempotent, Variant::Particles);
        harness.apply(AnimationCommand::ScaleUp);

        for n in 1..=300 {
            harness.run(1);
            let scale = harness.fixture.mesh_scale();
            let expected = 1.0 + 0.01 * n as f32;
            assert!(approx(scale.x, expected), "frame {n}: {scale}");
            assert!(approx(scale.y, expected) && approx(scale.z, expected));
        }
    }

    #[test]
    fn scale_down_goes_negative() {
        let mut harness = Harness::new(TransitionPolicy::Idempotent, Variant::Particles);
        harness.apply(AnimationCommand::ScaleDown);
        harness.run(150);

        let scale = harness.fixture.mesh_scale();
        assert!(approx(scale.x, -0.5), "{scale}");
        assert_eq!(harness.controller.mode(), AnimationMode::ScaleDown);
    }

    #[test]
    fn default_rotates_mesh_and_particles() {
        let mut harness = Harness::new(TransitionPolicy::Idempotent, Variant::Particles);
        harness.run(2000);

        // Accumulated, not wrapped. f32 drift over 2000 additions stays below 1e-3.
        let rotation = harness.fixture.mesh_rotation_y();
        assert!((rotation - 10.0).abs() < 1e-3, "{rotation}");
        assert!(rotation > TAU);

        let particles = harness.fixture.particle_rotation_y().unwrap();
        assert!((particles - 2.0).abs() < 1e-3);
        assert_eq!(harness.fixture.mesh_scale(), Vec3::ONE);
        assert_eq!(harness.fixture.wireframe_scale(), Vec3::splat(1.001));
    }

    #[test]
    fn pulse_variant_breathes_with_wall_clock() {
        let mut harness = Harness::new(TransitionPolicy::Idempotent, Variant::Pulse);

        harness.fixture.now_ms = 0.0;
        harness.run(1);
        assert!(approx(harness.fixture.mesh_scale().x, 1.0));

        harness.fixture.now_ms = std::f64::consts::FRAC_PI_2 * 1000.0;
        harness.run(1);
        assert!(approx(harness.fixture.mesh_scale().x, 1.1));
        assert!(approx(harness.fixture.mesh_rotation_y(), 0.01));
        assert!(harness.fixture.particle_rotation_y().is_none());
    }

    #[test]
    fn reset_keeps_scale_and_resumes_rotation() {
        let mut harness = Harness::new(TransitionPolicy::Idempotent, Variant::Particles);
        harness.run(10);
        harness.apply(AnimationCommand::ScaleUp);
        harness.run(20);

        let rotation_before = harness.fixture.mesh_rotation_y();
        harness.apply(AnimationCommand::Reset);
        assert_eq!(harness.controller.mode(), AnimationMode::Default);
        harness.run(10);

        assert!(approx(harness.fixture.mesh_scale().x, 1.2));
        assert!(approx(
            harness.fixture.mesh_rotation_y(),
            rotation_before + 0.05
        ));
        assert_eq!(harness.scheduler.live_loops(), 1);
    }

    #[test]
    fn repeated_scale_up_is_idempotent() {
        let mut harness = Harness::new(TransitionPolicy::Idempotent, Variant::Particles);
        harness.apply(AnimationCommand::ScaleUp);
        let first = harness.controller.active_handle(AnimationMode::ScaleUp);
        harness.apply(AnimationCommand::ScaleUp);

        assert_ne!(harness.controller.active_handle(AnimationMode::ScaleUp), first);
        assert_eq!(harness.scheduler.live_loops(), 1);

        harness.run(10);
        assert!(approx(harness.fixture.mesh_scale().x, 1.1));
    }

    #[test]
    fn repeated_scale_up_compounds() {
        let mut harness = Harness::new(TransitionPolicy::Compounding, Variant::Particles);
        harness.apply(AnimationCommand::ScaleUp);
        harness.apply(AnimationCommand::ScaleUp);

        assert_eq!(harness.scheduler.live_loops_for(AnimationMode::ScaleUp), 2);
        harness.run(10);
        assert!(approx(harness.fixture.mesh_scale().x, 1.2));
        assert_eq!(harness.surface.draws, 20);

        // Reset only knows the newest handle; the leaked loop keeps growing.
        harness.apply(AnimationCommand::Reset);
        assert_eq!(harness.scheduler.live_loops_for(AnimationMode::ScaleUp), 1);
        assert_eq!(harness.scheduler.live_loops_for(AnimationMode::Default), 1);
        harness.run(10);
        assert!(approx(harness.fixture.mesh_scale().x, 1.3));
    }

    #[test]
    fn switching_modes_cancels_the_others() {
        let mut harness = Harness::new(TransitionPolicy::Compounding, Variant::Particles);
        harness.apply(AnimationCommand::ScaleUp);
        harness.apply(AnimationCommand::ScaleDown);

        assert_eq!(harness.scheduler.live_loops(), 1);
        assert!(harness
            .controller
            .active_handle(AnimationMode::ScaleUp)
            .is_none());
        assert!(harness
            .controller
            .active_handle(AnimationMode::Default)
            .is_none());

        harness.run(5);
        assert!(approx(harness.fixture.mesh_scale().x, 0.95));
    }

    #[test]
    fn cancelling_stale_handles_changes_nothing() {
        let mut harness = Harness::new(TransitionPolicy::Idempotent, Variant::Particles);
        let default_handle = harness
            .controller
            .active_handle(AnimationMode::Default)
            .unwrap();
        harness.apply(AnimationCommand::ScaleUp);

        assert!(!harness.scheduler.cancel(default_handle));
        assert!(!harness.scheduler.cancel(default_handle));
        assert_eq!(harness.controller.mode(), AnimationMode::ScaleUp);
        assert_eq!(harness.scheduler.live_loops(), 1);

        harness.run(3);
        assert!(approx(harness.fixture.mesh_scale().x, 1.03));
    }

    #[test]
    fn every_command_has_a_trigger_id() {
        let ids: Vec<_> = AnimationCommand::ALL
            .iter()
            .map(|command| command.trigger_id())
            .collect();

        assert_eq!(ids, ["scale-up", "scale-down", "reset"]);
    }
}

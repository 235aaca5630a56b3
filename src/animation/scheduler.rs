use std::{cell::Cell, rc::Rc};

use crate::{
    animation::behavior::{AnimationMode, FrameContext, LoopBehavior},
    rendering::surface::RenderSurface,
};

/// Cancellation token for a scheduled loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoopHandle(u64);

/// Shared between a loop and whoever may cancel it. A loop whose flag is
/// cleared never runs again.
pub type LiveFlag = Rc<Cell<bool>>;

pub fn live_flag() -> LiveFlag {
    Rc::new(Cell::new(true))
}

struct ScheduledLoop {
    handle: LoopHandle,
    mode: AnimationMode,
    behavior: LoopBehavior,
    alive: LiveFlag,
}

/// Runs every scheduled loop once per display refresh, in scheduling order.
#[derive(Default)]
pub struct FrameScheduler {
    next_handle: u64,
    frame: u64,
    loops: Vec<ScheduledLoop>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(
        &mut self,
        mode: AnimationMode,
        behavior: LoopBehavior,
        alive: LiveFlag,
    ) -> LoopHandle {
        self.next_handle += 1;
        let handle = LoopHandle(self.next_handle);

        self.loops.push(ScheduledLoop {
            handle,
            mode,
            behavior,
            alive,
        });

        handle
    }

    /// Removes the loop behind `handle`. Unknown and already cancelled
    /// handles are ignored; returns whether anything was removed.
    pub fn cancel(&mut self, handle: LoopHandle) -> bool {
        let Some(index) = self.loops.iter().position(|l| l.handle == handle) else {
            return false;
        };

        let scheduled = self.loops.remove(index);
        scheduled.alive.set(false);
        true
    }

    /// Advances one frame. Each live loop mutates the scene and issues
    /// exactly one draw request. Returns the number of draw requests.
    pub fn tick(&mut self, ctx: &mut FrameContext, surface: &mut dyn RenderSurface) -> usize {
        self.frame += 1;
        self.loops.retain(|l| l.alive.get());

        let mut draws = 0;
        for scheduled in &self.loops {
            scheduled.behavior.step(ctx);
            surface.draw(ctx.scene, ctx.camera);
            draws += 1;
        }

        log::trace!("Frame {}: {} loop(s) ran", self.frame, draws);

        draws
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn live_loops(&self) -> usize {
        self.loops.iter().filter(|l| l.alive.get()).count()
    }

    pub fn live_loops_for(&self, mode: AnimationMode) -> usize {
        self.loops
            .iter()
            .filter(|l| l.mode == mode && l.alive.get())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::{
        animation::test_support::{Fixture, RecordingSurface},
        config::Variant,
    };

    #[test]
    fn unknown_and_repeated_cancels_are_no_ops() {
        let mut fixture = Fixture::new(Variant::Particles);
        let mut scheduler = FrameScheduler::new();

        assert!(!scheduler.cancel(LoopHandle(42)));

        let handle = scheduler.schedule(AnimationMode::ScaleUp, LoopBehavior::Grow, live_flag());
        assert!(scheduler.cancel(handle));
        assert!(!scheduler.cancel(handle));
        assert_eq!(scheduler.live_loops(), 0);

        let mut surface = RecordingSurface::default();
        assert_eq!(fixture.tick(&mut scheduler, &mut surface), 0);
        assert_eq!(fixture.mesh_scale(), Vec3::ONE);
    }

    #[test]
    fn cleared_flag_stops_a_loop_without_the_scheduler() {
        let mut fixture = Fixture::new(Variant::Particles);
        let mut scheduler = FrameScheduler::new();
        let mut surface = RecordingSurface::default();

        let alive = live_flag();
        scheduler.schedule(AnimationMode::ScaleUp, LoopBehavior::Grow, alive.clone());
        fixture.tick(&mut scheduler, &mut surface);

        alive.set(false);
        assert_eq!(scheduler.live_loops(), 0);
        assert_eq!(fixture.tick(&mut scheduler, &mut surface), 0);
        assert!((fixture.mesh_scale().x - 1.01).abs() < 1e-6);
        assert_eq!(scheduler.frame(), 2);
    }

    #[test]
    fn each_iteration_draws_once() {
        let mut fixture = Fixture::new(Variant::Particles);
        let mut scheduler = FrameScheduler::new();
        let mut surface = RecordingSurface::default();

        scheduler.schedule(AnimationMode::ScaleUp, LoopBehavior::Grow, live_flag());
        scheduler.schedule(
            AnimationMode::Default,
            LoopBehavior::Idle(Variant::Particles),
            live_flag(),
        );

        for _ in 0..5 {
            assert_eq!(fixture.tick(&mut scheduler, &mut surface), 2);
        }
        assert_eq!(surface.draws, 10);
        assert_eq!(scheduler.live_loops_for(AnimationMode::ScaleUp), 1);
    }
}

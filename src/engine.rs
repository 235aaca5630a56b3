use crate::{animation::AnimationCommand, demo::DemoState, rendering::surface::FrameRequests};

/// One display refresh: pending commands first, then the animation loops.
pub fn update(
    state: &mut DemoState,
    requests: &mut FrameRequests,
    commands: impl IntoIterator<Item = AnimationCommand>,
) -> anyhow::Result<()> {
    requests.begin_frame();

    for command in commands {
        state.apply_command(command);
    }

    state.update(requests);
    state.scene.late_update();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{animation::AnimationMode, config::DemoConfig};

    #[test]
    fn commands_apply_before_the_frame_runs() {
        let mut state = DemoState::new(DemoConfig::default()).unwrap();
        let mut requests = FrameRequests::default();

        update(&mut state, &mut requests, [AnimationCommand::ScaleDown]).unwrap();

        assert_eq!(state.controller.mode(), AnimationMode::ScaleDown);
        let mesh = state.scene.get_object_transform(state.handles.mesh).unwrap();
        assert!((mesh.scale().x - 0.99).abs() < 1e-6);
        assert!(requests.should_present());
    }

    #[test]
    fn world_matrices_are_current_after_update() {
        let mut state = DemoState::new(DemoConfig::default()).unwrap();
        let mut requests = FrameRequests::default();

        for _ in 0..3 {
            update(&mut state, &mut requests, [AnimationCommand::ScaleUp]).unwrap();
        }

        let wireframe = state
            .scene
            .get_object_transform(state.handles.wireframe)
            .unwrap();
        let tip = wireframe.get_world_matrix().transform_point3(glam::Vec3::X);
        assert!((tip.x - 1.03 * 1.001).abs() < 1e-5);
    }
}

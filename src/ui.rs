use imgui::Condition;

use crate::animation::{AnimationCommand, AnimationController, FrameScheduler};

/// Draws the scale-up / scale-down / reset panel and returns the command of
/// the button clicked this frame, if any.
pub fn control_panel(
    ui: &imgui::Ui,
    controller: &AnimationController,
    scheduler: &FrameScheduler,
) -> Option<AnimationCommand> {
    ui.window("Controls")
        .position([16.0, 16.0], Condition::FirstUseEver)
        .always_auto_resize(true)
        .build(|| {
            let mut clicked = None;

            for command in AnimationCommand::ALL {
                if ui.button(button_label(command)) {
                    clicked = Some(command);
                }
                ui.same_line();
            }
            ui.new_line();

            ui.text(format!("Mode: {}", controller.mode().label()));
            ui.text(format!("Live loops: {}", scheduler.live_loops()));

            clicked
        })
        .flatten()
}

/// Visible caption plus the fixed trigger id, in imgui's `caption##id` form.
pub fn button_label(command: AnimationCommand) -> String {
    let caption = match command {
        AnimationCommand::ScaleUp => "Scale up",
        AnimationCommand::ScaleDown => "Scale down",
        AnimationCommand::Reset => "Reset",
    };

    format!("{caption}##{}", command.trigger_id())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_carry_trigger_ids() {
        assert_eq!(button_label(AnimationCommand::ScaleUp), "Scale up##scale-up");
        assert_eq!(
            button_label(AnimationCommand::ScaleDown),
            "Scale down##scale-down"
        );
        assert_eq!(button_label(AnimationCommand::Reset), "Reset##reset");
    }
}

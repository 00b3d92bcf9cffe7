//! Per-frame input polling turned into drawing intents.
//!
//! Input arrives as a snapshot of held controls plus the pointer delta.
//! Draw-release and flatten are edge triggered and need one bit of
//! state each; clear is level triggered and fires every frame it is
//! held.

use std::collections::BTreeSet;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::camera::FirstPersonCamera;
use crate::types::SketchConfig;

/// A logical control, independent of any key binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Control {
    /// Request shutdown.
    Quit,
    /// Lay down points while held.
    Draw,
    /// Move along the view direction.
    MoveForward,
    /// Move against the view direction.
    MoveBack,
    /// Move left, perpendicular to the view direction.
    StrafeLeft,
    /// Move right, perpendicular to the view direction.
    StrafeRight,
    /// Unroll and capture on release.
    Flatten,
    /// Wipe the drawing while held.
    Clear,
}

/// One frame of polled input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameInput {
    /// Seconds since the previous frame.
    pub delta_time: f64,
    /// Pointer movement in screen pixels, `+y` downward.
    pub look_delta: [f64; 2],
    /// Controls held during this frame.
    pub held: BTreeSet<Control>,
}

impl FrameInput {
    /// Whether `control` is held.
    #[must_use]
    pub fn is_held(&self, control: Control) -> bool {
        self.held.contains(&control)
    }
}

/// What the frame's input asks the session to do.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameIntents {
    /// Quit was held.
    pub quit: bool,
    /// Candidate point for the active strip.
    pub draw_point: Option<DVec3>,
    /// Draw was released this frame.
    pub end_stroke: bool,
    /// Flatten was released this frame.
    pub flatten_and_save: bool,
    /// Clear was held.
    pub clear_scene: bool,
}

/// Camera plus the edge-trigger latches.
#[derive(Debug, Clone, PartialEq)]
pub struct InputController {
    camera: FirstPersonCamera,
    sensitivity: f64,
    move_speed: f64,
    reach: f64,
    draw_held: bool,
    flatten_held: bool,
}

impl InputController {
    /// Controller at the home pose `(0, axis_height, 0)` looking down `-Z`.
    #[must_use]
    pub fn new(config: &SketchConfig) -> Self {
        Self {
            camera: FirstPersonCamera::new(DVec3::new(0.0, config.axis_height, 0.0)),
            sensitivity: config.mouse_sensitivity,
            move_speed: config.move_speed,
            reach: config.radius,
            draw_held: false,
            flatten_held: false,
        }
    }

    /// The camera being driven.
    #[must_use]
    pub const fn camera(&self) -> &FirstPersonCamera {
        &self.camera
    }

    /// Whether a stroke is in progress.
    #[must_use]
    pub const fn is_drawing(&self) -> bool {
        self.draw_held
    }

    /// Restore the home pose and clear both latches.
    pub fn reset(&mut self) {
        self.camera.reset();
        self.draw_held = false;
        self.flatten_held = false;
    }

    /// Process one frame of input.
    pub fn update(&mut self, input: &FrameInput) -> FrameIntents {
        let mut intents = FrameIntents::default();

        let [dx, dy] = input.look_delta;
        self.camera
            .turn(dx * self.sensitivity, -dy * self.sensitivity);

        intents.quit = input.is_held(Control::Quit);

        if input.is_held(Control::Draw) {
            self.draw_held = true;
            intents.draw_point = Some(self.camera.point_ahead(self.reach));
        } else if self.draw_held {
            self.draw_held = false;
            intents.end_stroke = true;
        }

        if input.is_held(Control::Flatten) {
            self.flatten_held = true;
        } else if self.flatten_held {
            self.flatten_held = false;
            intents.flatten_and_save = true;
        }

        intents.clear_scene = input.is_held(Control::Clear);

        let step = self.move_speed * input.delta_time;
        if input.is_held(Control::MoveForward) {
            self.camera.advance(step);
        }
        if input.is_held(Control::MoveBack) {
            self.camera.advance(-step);
        }
        if input.is_held(Control::StrafeLeft) {
            self.camera.strafe(-step);
        }
        if input.is_held(Control::StrafeRight) {
            self.camera.strafe(step);
        }

        intents
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::camera::PITCH_LIMIT;

    fn holding(controls: &[Control]) -> FrameInput {
        FrameInput {
            delta_time: 0.016,
            held: controls.iter().copied().collect(),
            ..FrameInput::default()
        }
    }

    fn controller() -> InputController {
        InputController::new(&SketchConfig::default())
    }

    #[test]
    fn draw_point_is_radius_ahead_of_eye() {
        let mut c = controller();
        let intents = c.update(&holding(&[Control::Draw]));
        let p = intents.draw_point.unwrap();
        assert!(p.distance(DVec3::new(0.0, 1.0, -0.7)) < 1e-12);
        assert!(c.is_drawing());
    }

    #[test]
    fn releasing_draw_ends_the_stroke_once() {
        let mut c = controller();
        c.update(&holding(&[Control::Draw]));
        let released = c.update(&holding(&[]));
        assert!(released.end_stroke);
        assert!(released.draw_point.is_none());
        assert!(!c.update(&holding(&[])).end_stroke);
    }

    #[test]
    fn flatten_fires_on_release_only() {
        let mut c = controller();
        assert!(!c.update(&holding(&[Control::Flatten])).flatten_and_save);
        assert!(!c.update(&holding(&[Control::Flatten])).flatten_and_save);
        assert!(c.update(&holding(&[])).flatten_and_save);
        assert!(!c.update(&holding(&[])).flatten_and_save);
    }

    #[test]
    fn clear_fires_every_frame_it_is_held() {
        let mut c = controller();
        for _ in 0..3 {
            assert!(c.update(&holding(&[Control::Clear])).clear_scene);
        }
        assert!(!c.update(&holding(&[])).clear_scene);
    }

    #[test]
    fn pointer_up_pitches_up_and_clamps() {
        let mut c = controller();
        let input = FrameInput {
            look_delta: [0.0, -10_000.0],
            ..FrameInput::default()
        };
        c.update(&input);
        assert!((c.camera().pitch() - PITCH_LIMIT).abs() < f64::EPSILON);
        assert!(c.camera().pose().forward.y > 0.99);
    }

    #[test]
    fn pointer_right_turns_right() {
        let mut c = controller();
        let input = FrameInput {
            look_delta: [100.0, 0.0],
            ..FrameInput::default()
        };
        c.update(&input);
        assert!((c.camera().yaw() - (-90.0 + 7.0)).abs() < 1e-9);
        assert!(c.camera().pose().forward.x > 0.0);
    }

    #[test]
    fn movement_scales_with_delta_time() {
        let mut c = controller();
        let input = FrameInput {
            delta_time: 0.5,
            held: [Control::MoveForward].into_iter().collect(),
            ..FrameInput::default()
        };
        c.update(&input);
        let pos = c.camera().pose().position;
        assert!(pos.distance(DVec3::new(0.0, 1.0, -1.25)) < 1e-12);
    }

    #[test]
    fn opposite_movements_cancel() {
        let mut c = controller();
        c.update(&holding(&[
            Control::MoveForward,
            Control::MoveBack,
            Control::StrafeLeft,
            Control::StrafeRight,
        ]));
        assert!(c.camera().pose().position.distance(DVec3::new(0.0, 1.0, 0.0)) < 1e-12);
    }

    #[test]
    fn reset_clears_latches() {
        let mut c = controller();
        c.update(&holding(&[Control::Draw, Control::Flatten]));
        c.reset();
        let next = c.update(&holding(&[]));
        assert!(!next.end_stroke);
        assert!(!next.flatten_and_save);
    }

    #[test]
    fn frame_input_parses_from_partial_json() {
        let input: FrameInput =
            serde_json::from_str(r#"{"held": ["Draw", "StrafeLeft"]}"#).unwrap();
        assert!(input.is_held(Control::Draw));
        assert!(input.is_held(Control::StrafeLeft));
        assert_eq!(input.look_delta, [0.0, 0.0]);
    }
}

//! First-person camera: position plus a forward vector from yaw/pitch.

use glam::{DMat4, DVec3};
use serde::{Deserialize, Serialize};

/// Fixed world up vector.
pub const UP: DVec3 = DVec3::Y;

/// Pitch is kept strictly inside ±90° so the view never flips.
pub const PITCH_LIMIT: f64 = 89.0;

/// Initial yaw: looking down `-Z`.
pub const HOME_YAW: f64 = -90.0;

/// Position and facing of the camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    /// World-space eye position.
    pub position: DVec3,
    /// Unit forward direction.
    pub forward: DVec3,
}

impl CameraPose {
    /// View matrix looking along `forward` with `+Y` up.
    #[must_use]
    pub fn view_matrix(&self) -> DMat4 {
        DMat4::look_at_rh(self.position, self.position + self.forward, UP)
    }

    /// Unit vector to the camera's right.
    #[must_use]
    pub fn right(&self) -> DVec3 {
        self.forward.cross(UP).normalize_or_zero()
    }
}

/// Unit forward vector for yaw/pitch in degrees.
#[must_use]
pub fn forward_from_angles(yaw: f64, pitch: f64) -> DVec3 {
    let (sin_yaw, cos_yaw) = yaw.to_radians().sin_cos();
    let (sin_pitch, cos_pitch) = pitch.to_radians().sin_cos();
    DVec3::new(cos_yaw * cos_pitch, sin_pitch, sin_yaw * cos_pitch).normalize()
}

/// Yaw/pitch camera with a home position it can be reset to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FirstPersonCamera {
    home: DVec3,
    yaw: f64,
    pitch: f64,
    pose: CameraPose,
}

impl FirstPersonCamera {
    /// Camera at `home`, looking down `-Z`.
    #[must_use]
    pub fn new(home: DVec3) -> Self {
        Self {
            home,
            yaw: HOME_YAW,
            pitch: 0.0,
            pose: CameraPose {
                position: home,
                forward: forward_from_angles(HOME_YAW, 0.0),
            },
        }
    }

    /// Current pose.
    #[must_use]
    pub const fn pose(&self) -> &CameraPose {
        &self.pose
    }

    /// The position [`reset`](Self::reset) returns to.
    #[must_use]
    pub const fn home(&self) -> DVec3 {
        self.home
    }

    /// Yaw in degrees.
    #[must_use]
    pub const fn yaw(&self) -> f64 {
        self.yaw
    }

    /// Pitch in degrees, always within `±PITCH_LIMIT`.
    #[must_use]
    pub const fn pitch(&self) -> f64 {
        self.pitch
    }

    /// Turn by the given yaw/pitch offsets in degrees.
    pub fn turn(&mut self, yaw_offset: f64, pitch_offset: f64) {
        self.yaw += yaw_offset;
        self.pitch = (self.pitch + pitch_offset).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.pose.forward = forward_from_angles(self.yaw, self.pitch);
    }

    /// Move along the forward vector (negative moves back).
    pub fn advance(&mut self, distance: f64) {
        self.pose.position += self.pose.forward * distance;
    }

    /// Move sideways (positive moves right).
    pub fn strafe(&mut self, distance: f64) {
        self.pose.position += self.pose.right() * distance;
    }

    /// Point `distance` units straight ahead of the eye.
    #[must_use]
    pub fn point_ahead(&self, distance: f64) -> DVec3 {
        self.pose.position + self.pose.forward.normalize() * distance
    }

    /// Return to the home position and orientation.
    pub fn reset(&mut self) {
        *self = Self::new(self.home);
    }
}

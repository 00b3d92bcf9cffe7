//! Stage 3: unroll the cylinder into a flat strip of (angle, height).
//!
//! Azimuth is measured from straight ahead (`-Z`), positive towards
//! `+X`, and reaches `±π` at the back seam. Because stage 2 has already
//! cut every strip at the seam, no strip jumps between `+π` and `-π`.

use std::f64::consts::FRAC_PI_2;

use crate::cylinder::clamp_unit;
use crate::types::{CylinderVertex, Strip, UnrolledVertex};

/// Azimuth of a point on a cylinder of the given radius.
///
/// The branch is chosen by the sign bit of `x`, the same rule the seam
/// split uses, so `-0.0` lands on the negative side.
#[must_use]
pub fn azimuth(vertex: &CylinderVertex, radius: f64) -> f64 {
    let (s, _) = clamp_unit(-vertex.z / radius);
    if vertex.x.is_sign_negative() {
        -FRAC_PI_2 + s.asin()
    } else {
        FRAC_PI_2 - s.asin()
    }
}

/// Unroll one vertex.
#[must_use]
pub fn unfold_vertex(vertex: &CylinderVertex, radius: f64) -> UnrolledVertex {
    UnrolledVertex {
        angle: azimuth(vertex, radius),
        height: vertex.y,
        color: vertex.color,
    }
}

/// Unroll every strip.
#[must_use = "returns the unrolled strips"]
pub fn unfold_strips(strips: &[Strip<CylinderVertex>], radius: f64) -> Vec<Strip<UnrolledVertex>> {
    strips
        .iter()
        .map(|strip| strip.points().iter().map(|v| unfold_vertex(v, radius)).collect())
        .collect()
}

//! Homogeneous clipping against the near and far planes.
//!
//! Only depth is clipped here; anything outside the viewport sideways is
//! left to the rasterizer, which discards off-image coverage. After
//! this step every vertex has `w > 0` and can be divided through.

use cylsketch_core::Rgb;
use glam::{DMat4, DVec2, DVec4};

/// A vertex after projection, before the perspective divide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipVertex {
    /// Clip-space position.
    pub position: DVec4,
    /// Vertex color.
    pub color: Rgb,
}

impl ClipVertex {
    /// Transform a world-space vertex into clip space.
    #[must_use]
    pub fn project(matrix: &DMat4, vertex: &cylsketch_core::Vertex) -> Self {
        Self {
            position: *matrix * vertex.position.extend(1.0),
            color: vertex.color,
        }
    }

    fn lerp(&self, other: &Self, t: f64) -> Self {
        Self {
            position: self.position.lerp(other.position, t),
            color: Rgb::new(
                t.mul_add(other.color.r - self.color.r, self.color.r),
                t.mul_add(other.color.g - self.color.g, self.color.g),
                t.mul_add(other.color.b - self.color.b, self.color.b),
            ),
        }
    }

    /// Map to pixel coordinates, `y` growing downward.
    #[must_use]
    pub fn to_screen(&self, width: f64, height: f64) -> DVec2 {
        let ndc = self.position.truncate() / self.position.w;
        DVec2::new(
            (ndc.x + 1.0) * 0.5 * width,
            (1.0 - ndc.y) * 0.5 * height,
        )
    }
}

/// Signed distance to each plane, positive inside.
fn plane_distances(p: DVec4) -> [f64; 2] {
    [p.z + p.w, p.w - p.z]
}

/// Clip a segment to the depth range. `None` if it lies wholly outside.
#[must_use]
pub fn clip_segment(a: ClipVertex, b: ClipVertex) -> Option<(ClipVertex, ClipVertex)> {
    let da = plane_distances(a.position);
    let db = plane_distances(b.position);
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    for (pa, pb) in da.into_iter().zip(db) {
        if pa < 0.0 && pb < 0.0 {
            return None;
        }
        if pa < 0.0 {
            t0 = t0.max(pa / (pa - pb));
        } else if pb < 0.0 {
            t1 = t1.min(pa / (pa - pb));
        }
    }
    if t0 > t1 {
        return None;
    }
    Some((a.lerp(&b, t0), a.lerp(&b, t1)))
}

/// Clip a convex polygon to the depth range. Returns the clipped
/// polygon, empty if nothing survives.
#[must_use]
pub fn clip_polygon(vertices: &[ClipVertex]) -> Vec<ClipVertex> {
    let mut poly = vertices.to_vec();
    for plane in 0..2 {
        if poly.is_empty() {
            break;
        }
        let mut out = Vec::with_capacity(poly.len() + 1);
        for (i, curr) in poly.iter().enumerate() {
            let next = &poly[(i + 1) % poly.len()];
            let dc = plane_distances(curr.position)[plane];
            let dn = plane_distances(next.position)[plane];
            if dc >= 0.0 {
                out.push(*curr);
            }
            if (dc >= 0.0) != (dn >= 0.0) {
                out.push(curr.lerp(next, dc / (dc - dn)));
            }
        }
        poly = out;
    }
    if poly.len() < 3 {
        poly.clear();
    }
    poly
}

//! Stage 1: push stroke points radially onto the projection cylinder.
//!
//! The cylinder's axis is the vertical line through the camera's home
//! position. Each point keeps its azimuth; its horizontal distance from
//! the axis becomes exactly `R`, and its height becomes the arc length
//! `R·asin((y - h) / R)` on a sphere of radius `R`, offset back by `h`.

use crate::types::{CylinderVertex, SketchConfig, Strip, Vertex};

/// Points closer than this to the vertical axis have no usable azimuth.
pub const MIN_AXIS_DISTANCE: f64 = 1e-9;

/// The projection cylinder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cylinder {
    /// Cylinder radius `R`.
    pub radius: f64,
    /// Height `h` of the reference plane (the camera's home height).
    pub axis_height: f64,
}

impl Cylinder {
    /// Cylinder described by a session configuration.
    #[must_use]
    pub const fn from_config(config: &SketchConfig) -> Self {
        Self {
            radius: config.radius,
            axis_height: config.axis_height,
        }
    }
}

/// Result of mapping a single vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mapping {
    /// The vertex was placed on the cylinder surface.
    Surface {
        /// The mapped vertex.
        vertex: CylinderVertex,
        /// Whether the vertical `asin` argument had to be clamped.
        clamped: bool,
    },
    /// The vertex lies on the vertical axis and cannot be mapped.
    OnAxis,
}

/// Per-stage counters for [`map_strips`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapCounts {
    /// Points dropped because they lay on the axis.
    pub dropped_on_axis: usize,
    /// Points whose vertical `asin` argument was outside `[-1, 1]`.
    pub clamped: usize,
}

/// Clamp an `asin` argument into its domain, reporting whether it moved.
///
/// NaN is mapped to `0.0` and reported as clamped.
pub(crate) fn clamp_unit(value: f64) -> (f64, bool) {
    if value.is_nan() {
        return (0.0, true);
    }
    let in_domain = (-1.0..=1.0).contains(&value);
    (value.clamp(-1.0, 1.0), !in_domain)
}

/// Map one vertex onto the cylinder.
#[must_use]
pub fn map_vertex(vertex: &Vertex, cylinder: &Cylinder) -> Mapping {
    let p = vertex.position;
    let r = cylinder.radius;
    let planar = p.x.hypot(p.z);
    if planar.is_nan() || planar < MIN_AXIS_DISTANCE {
        return Mapping::OnAxis;
    }

    let (sin_elevation, clamped) = clamp_unit((p.y - cylinder.axis_height) / r);
    Mapping::Surface {
        vertex: CylinderVertex {
            x: p.x / planar * r,
            y: r.mul_add(sin_elevation.asin(), cylinder.axis_height),
            z: p.z / planar * r,
            color: vertex.color,
        },
        clamped,
    }
}

/// Map every strip onto the cylinder. On-axis points are dropped from
/// their strip; strip count and order are preserved.
#[must_use = "returns the mapped strips"]
pub fn map_strips(strips: &[Strip], cylinder: &Cylinder) -> (Vec<Strip<CylinderVertex>>, MapCounts) {
    let mut counts = MapCounts::default();
    let mapped = strips
        .iter()
        .enumerate()
        .map(|(strip_index, strip)| {
            strip
                .points()
                .iter()
                .filter_map(|v| match map_vertex(v, cylinder) {
                    Mapping::Surface { vertex, clamped } => {
                        if clamped {
                            counts.clamped += 1;
                        }
                        Some(vertex)
                    }
                    Mapping::OnAxis => {
                        counts.dropped_on_axis += 1;
                        tracing::warn!(
                            strip_index,
                            x = v.position.x,
                            y = v.position.y,
                            z = v.position.z,
                            "dropping point on the cylinder axis"
                        );
                        None
                    }
                })
                .collect()
        })
        .collect();

    if counts.clamped > 0 {
        tracing::warn!(
            clamped = counts.clamped,
            "clamped points lying above or below the drawing sphere"
        );
    }
    (mapped, counts)
}

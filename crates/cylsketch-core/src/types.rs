//! Shared types for the cylsketch drawing model and unroll pipeline.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Number of scalars per vertex in the raw strip layout: `x y z r g b`.
pub const VERTEX_COMPONENTS: usize = 6;

/// An RGB color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    /// Red channel.
    pub r: f64,
    /// Green channel.
    pub g: f64,
    /// Blue channel.
    pub b: f64,
}

impl Rgb {
    /// Pure white, the stroke color.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);
    /// Pure black.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);

    /// Create a new color.
    #[must_use]
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Uniform grey of the given intensity.
    #[must_use]
    pub const fn grey(v: f64) -> Self {
        Self::new(v, v, v)
    }
}

/// A colored point in world space (the live drawing).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    /// World-space position.
    pub position: DVec3,
    /// Vertex color.
    pub color: Rgb,
}

impl Vertex {
    /// Create a new vertex.
    #[must_use]
    pub const fn new(position: DVec3, color: Rgb) -> Self {
        Self { position, color }
    }

    /// The vertex as `[x, y, z, r, g, b]`.
    #[must_use]
    pub const fn to_raw(self) -> [f64; VERTEX_COMPONENTS] {
        [
            self.position.x,
            self.position.y,
            self.position.z,
            self.color.r,
            self.color.g,
            self.color.b,
        ]
    }

    /// Build a vertex from `[x, y, z, r, g, b]`.
    #[must_use]
    pub const fn from_raw(raw: [f64; VERTEX_COMPONENTS]) -> Self {
        Self {
            position: DVec3::new(raw[0], raw[1], raw[2]),
            color: Rgb::new(raw[3], raw[4], raw[5]),
        }
    }
}

/// A point lying on the surface of the projection cylinder.
///
/// `x` and `z` satisfy `x² + z² = R²`; `y` is the arc-length height
/// measured from the cylinder's base plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CylinderVertex {
    /// Horizontal position on the cylinder (side of the seam is its sign).
    pub x: f64,
    /// Arc-length height.
    pub y: f64,
    /// Depth on the cylinder; positive values are behind the viewer.
    pub z: f64,
    /// Vertex color.
    pub color: Rgb,
}

/// A point on the unrolled cylinder surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnrolledVertex {
    /// Azimuth in radians, `-π..=π`, with `0` straight ahead.
    pub angle: f64,
    /// Arc-length height (unchanged from the cylinder stage).
    pub height: f64,
    /// Vertex color.
    pub color: Rgb,
}

impl UnrolledVertex {
    /// Place the unrolled point on the capture plane at `z = plane_z`.
    #[must_use]
    pub const fn to_vertex(self, plane_z: f64) -> Vertex {
        Vertex::new(DVec3::new(self.angle, self.height, plane_z), self.color)
    }
}

/// An ordered sequence of points rendered as one connected primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strip<V = Vertex>(Vec<V>);

impl<V> Strip<V> {
    /// Create a strip from a vector of points.
    #[must_use]
    pub const fn new(points: Vec<V>) -> Self {
        Self(points)
    }

    /// Create an empty strip.
    #[must_use]
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// Returns `true` if the strip has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of points in the strip.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the first point, if any.
    #[must_use]
    pub fn first(&self) -> Option<&V> {
        self.0.first()
    }

    /// Returns the last point, if any.
    #[must_use]
    pub fn last(&self) -> Option<&V> {
        self.0.last()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[V] {
        &self.0
    }

    /// Consumes the strip and returns the underlying vector of points.
    #[must_use]
    pub fn into_points(self) -> Vec<V> {
        self.0
    }

    pub(crate) fn push(&mut self, point: V) {
        self.0.push(point);
    }
}

impl<V> Default for Strip<V> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<V> FromIterator<V> for Strip<V> {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Strip<Vertex> {
    /// Flatten the strip into the raw `x y z r g b` layout.
    #[must_use]
    pub fn to_raw(&self) -> Vec<f64> {
        self.0.iter().flat_map(|v| v.to_raw()).collect()
    }

    /// Parse a strip from the raw `x y z r g b` layout.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::MalformedStrip`] if `raw.len()` is not a
    /// multiple of [`VERTEX_COMPONENTS`].
    pub fn from_raw(raw: &[f64]) -> Result<Self, SketchError> {
        let chunks = raw.chunks_exact(VERTEX_COMPONENTS);
        if !chunks.remainder().is_empty() {
            return Err(SketchError::MalformedStrip { len: raw.len() });
        }
        Ok(chunks
            .map(|c| Vertex::from_raw([c[0], c[1], c[2], c[3], c[4], c[5]]))
            .collect())
    }
}

/// Configuration for the sketching session and the unroll pipeline.
///
/// Every field has a default; missing JSON fields take it.
/// Call [`validate`](Self::validate) on configs that come from outside
/// the program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SketchConfig {
    /// Radius of the drawing sphere and the projection cylinder.
    /// New stroke points are placed this far in front of the camera.
    pub radius: f64,

    /// Height of the camera's home position and of the cylinder's
    /// reference plane.
    pub axis_height: f64,

    /// Degrees of yaw/pitch per pixel of pointer motion.
    pub mouse_sensitivity: f64,

    /// Camera translation speed in world units per second.
    pub move_speed: f64,

    /// Vertical field of view of the live perspective view, in degrees.
    pub field_of_view: f64,

    /// Minimum distance between consecutive samples of one stroke.
    pub min_sample_spacing: f64,

    /// Half-height of the orthographic capture volume.
    pub capture_scale: f64,
}

impl SketchConfig {
    /// Default drawing radius.
    pub const DEFAULT_RADIUS: f64 = 0.7;
    /// Default camera home height.
    pub const DEFAULT_AXIS_HEIGHT: f64 = 1.0;
    /// Default pointer sensitivity in degrees per pixel.
    pub const DEFAULT_MOUSE_SENSITIVITY: f64 = 0.07;
    /// Default camera speed in units per second.
    pub const DEFAULT_MOVE_SPEED: f64 = 2.5;
    /// Default vertical field of view in degrees.
    pub const DEFAULT_FIELD_OF_VIEW: f64 = 60.0;
    /// Default minimum stroke sample spacing.
    pub const DEFAULT_MIN_SAMPLE_SPACING: f64 = 1e-4;
    /// Default orthographic capture half-height.
    pub const DEFAULT_CAPTURE_SCALE: f64 = 1.9;

    /// Check that every parameter is usable.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::InvalidConfig`] naming the first offending
    /// field.
    pub fn validate(&self) -> Result<(), SketchError> {
        let positive = [
            ("radius", self.radius),
            ("mouse_sensitivity", self.mouse_sensitivity),
            ("move_speed", self.move_speed),
            ("min_sample_spacing", self.min_sample_spacing),
            ("capture_scale", self.capture_scale),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(SketchError::InvalidConfig(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }
        if !self.axis_height.is_finite() {
            return Err(SketchError::InvalidConfig(format!(
                "axis_height must be finite, got {}",
                self.axis_height
            )));
        }
        if !(self.field_of_view > 0.0 && self.field_of_view < 180.0) {
            return Err(SketchError::InvalidConfig(format!(
                "field_of_view must be in (0, 180) degrees, got {}",
                self.field_of_view
            )));
        }
        Ok(())
    }
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self {
            radius: Self::DEFAULT_RADIUS,
            axis_height: Self::DEFAULT_AXIS_HEIGHT,
            mouse_sensitivity: Self::DEFAULT_MOUSE_SENSITIVITY,
            move_speed: Self::DEFAULT_MOVE_SPEED,
            field_of_view: Self::DEFAULT_FIELD_OF_VIEW,
            min_sample_spacing: Self::DEFAULT_MIN_SAMPLE_SPACING,
            capture_scale: Self::DEFAULT_CAPTURE_SCALE,
        }
    }
}

/// Errors raised by the drawing model.
#[derive(Debug, thiserror::Error)]
pub enum SketchError {
    /// A raw strip buffer's length is not a whole number of vertices.
    #[error("raw strip length {len} is not a multiple of {VERTEX_COMPONENTS}")]
    MalformedStrip {
        /// Length of the rejected buffer.
        len: usize,
    },

    /// Attempted to modify the floor strip.
    #[error("the floor strip cannot be modified")]
    FloorIsImmutable,

    /// Strip index past the end of the store.
    #[error("strip index {index} out of range (store has {len} strips)")]
    StripOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of strips in the store.
        len: usize,
    },

    /// Configuration is invalid.
    #[error("invalid sketch configuration: {0}")]
    InvalidConfig(String),
}

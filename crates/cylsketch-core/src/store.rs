//! The strip store: the floor quad followed by user-drawn strips.
//!
//! Strips are append-only while drawing. The store itself never splits
//! or truncates strips; the unroll pipeline works on a clone and builds
//! a fresh store from its output.

use glam::DVec3;
use serde::Serialize;

use crate::types::{Rgb, SketchError, Strip, Vertex};

/// Index of the floor strip.
pub const FLOOR_INDEX: usize = 0;

/// Height of the floor quad.
pub const FLOOR_HEIGHT: f64 = -0.1;

/// Half extent of the floor quad along X and Z.
pub const FLOOR_HALF_EXTENT: f64 = 10.0;

/// Build the fixed floor strip: a 20×20 quad at `y = -0.1`, drawn as a
/// five-vertex triangle strip with a black-to-white gradient.
#[must_use]
pub fn floor_strip() -> Strip {
    let e = FLOOR_HALF_EXTENT;
    let y = FLOOR_HEIGHT;
    Strip::new(vec![
        Vertex::new(DVec3::new(e, y, e), Rgb::BLACK),
        Vertex::new(DVec3::new(e, y, -e), Rgb::grey(0.5)),
        Vertex::new(DVec3::new(-e, y, -e), Rgb::WHITE),
        Vertex::new(DVec3::new(-e, y, e), Rgb::grey(0.5)),
        Vertex::new(DVec3::new(e, y, e), Rgb::BLACK),
    ])
}

/// Ordered collection of strips. Index 0 is always the floor and at
/// least one user strip follows it as the append target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StripStore {
    strips: Vec<Strip>,
}

impl StripStore {
    /// A fresh store: the floor plus one empty strip ready for drawing.
    #[must_use]
    pub fn new() -> Self {
        Self {
            strips: vec![floor_strip(), Strip::empty()],
        }
    }

    /// Assemble a store from the floor and a list of user strips.
    ///
    /// An empty append target is added when `user` is empty.
    #[must_use]
    pub fn from_user_strips(floor: Strip, user: impl IntoIterator<Item = Strip>) -> Self {
        let mut strips = vec![floor];
        strips.extend(user);
        if strips.len() == 1 {
            strips.push(Strip::empty());
        }
        Self { strips }
    }

    /// Parse a store from raw strip buffers (`x y z r g b` per vertex).
    /// The first buffer is taken as the floor; with no buffers the
    /// standard floor is used. An empty append target is added when no
    /// user strip is given.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::MalformedStrip`] if any buffer is not a
    /// whole number of vertices.
    pub fn from_raw(raw: &[Vec<f64>]) -> Result<Self, SketchError> {
        let mut strips = raw.iter().map(|r| Strip::from_raw(r));
        let floor = strips.next().transpose()?.unwrap_or_else(floor_strip);
        let user = strips.collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_user_strips(floor, user))
    }

    /// Every strip in the raw `x y z r g b` layout, floor first.
    #[must_use]
    pub fn to_raw(&self) -> Vec<Vec<f64>> {
        self.strips.iter().map(Strip::to_raw).collect()
    }

    /// Append a point to an existing user strip.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::FloorIsImmutable`] for index 0 and
    /// [`SketchError::StripOutOfRange`] for an index past the end.
    pub fn append_point(&mut self, strip_index: usize, point: Vertex) -> Result<(), SketchError> {
        if strip_index == FLOOR_INDEX {
            return Err(SketchError::FloorIsImmutable);
        }
        let len = self.strips.len();
        let strip = self
            .strips
            .get_mut(strip_index)
            .ok_or(SketchError::StripOutOfRange {
                index: strip_index,
                len,
            })?;
        strip.push(point);
        Ok(())
    }

    /// Append an empty strip; it becomes the new append target.
    pub fn start_new_strip(&mut self) {
        self.strips.push(Strip::empty());
    }

    /// Discard all user strips, leaving the floor and one empty strip.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Index of the strip new points are appended to (the last one).
    #[must_use]
    pub const fn active_index(&self) -> usize {
        self.strips.len() - 1
    }

    /// Last point of the given strip, if the strip exists and is non-empty.
    #[must_use]
    pub fn last_point(&self, strip_index: usize) -> Option<&Vertex> {
        self.strips.get(strip_index).and_then(Strip::last)
    }

    /// The floor strip.
    #[must_use]
    pub fn floor(&self) -> &Strip {
        &self.strips[FLOOR_INDEX]
    }

    /// All strips after the floor.
    #[must_use]
    pub fn user_strips(&self) -> &[Strip] {
        &self.strips[FLOOR_INDEX + 1..]
    }

    /// All strips, floor first.
    #[must_use]
    pub fn strips(&self) -> &[Strip] {
        &self.strips
    }

    /// Number of strips including the floor.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.strips.len()
    }

    /// A store always holds at least the floor.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Total number of user-drawn points.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.user_strips().iter().map(Strip::len).sum()
    }

    /// Whether the first user strip has any points.
    ///
    /// Flattening is only meaningful once the first stroke exists.
    #[must_use]
    pub fn has_drawing(&self) -> bool {
        self.strips
            .get(FLOOR_INDEX + 1)
            .is_some_and(|s| !s.is_empty())
    }
}

impl Default for StripStore {
    fn default() -> Self {
        Self::new()
    }
}

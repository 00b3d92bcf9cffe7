//! Incremental unroll pipeline: advance stage-by-stage, inspecting each
//! intermediate result before continuing.
//!
//! [`crate::flatten`] runs everything in one call. [`Pipeline`] lets the
//! caller drive execution one step at a time:
//!
//! ```rust
//! # use cylsketch_core::{Cylinder, Pipeline, StripStore};
//! let store = StripStore::new();
//! let cylinder = Cylinder { radius: 0.7, axis_height: 1.0 };
//! let flattened = Pipeline::new(&store, cylinder)
//!     .map_to_cylinder()
//!     .split_at_seam()
//!     .unfold()
//!     .into_result();
//! assert_eq!(flattened.store.floor(), store.floor());
//! ```
//!
//! Each stage method consumes `self` and returns the next state. The
//! floor is carried through untouched; only user strips are transformed.

use std::time::Instant;

use crate::cylinder::{Cylinder, map_strips};
use crate::diagnostics::{FlattenDiagnostics, StageDiagnostics};
use crate::seam::split_at_seam;
use crate::store::StripStore;
use crate::types::{CylinderVertex, Strip, UnrolledVertex};
use crate::unfold::unfold_strips;

/// Entry point for the incremental pipeline.
pub struct Pipeline;

impl Pipeline {
    /// Start a pipeline over a copy of `store`'s strips.
    ///
    /// The source store is not modified and does not alias the result.
    pub fn new(store: &StripStore, cylinder: Cylinder) -> Pending {
        Pending {
            cylinder,
            floor: store.floor().clone(),
            strips: store.user_strips().to_vec(),
        }
    }
}

// ───────────────────────── Stage 0: Pending ──────────────────────────

/// Pipeline state before any processing.
#[must_use = "pipeline stages are consumed by advancing; call .map_to_cylinder() to continue"]
pub struct Pending {
    cylinder: Cylinder,
    floor: Strip,
    strips: Vec<Strip>,
}

impl Pending {
    /// The user strips that will be transformed.
    #[must_use]
    pub fn strips(&self) -> &[Strip] {
        &self.strips
    }

    /// Push every point onto the cylinder and advance to [`Mapped`].
    pub fn map_to_cylinder(self) -> Mapped {
        let input_points = self.strips.iter().map(Strip::len).sum();
        let start = Instant::now();
        let (strips, counts) = map_strips(&self.strips, &self.cylinder);
        let diagnostics = FlattenDiagnostics {
            map: StageDiagnostics::new(start.elapsed()),
            input_points,
            dropped_on_axis: counts.dropped_on_axis,
            clamped: counts.clamped,
            ..FlattenDiagnostics::default()
        };
        Mapped {
            cylinder: self.cylinder,
            floor: self.floor,
            strips,
            diagnostics,
        }
    }
}

// ───────────────────────── Stage 1: Mapped ───────────────────────────

/// Pipeline state after mapping onto the cylinder.
#[must_use = "pipeline stages are consumed by advancing; call .split_at_seam() to continue"]
pub struct Mapped {
    cylinder: Cylinder,
    floor: Strip,
    strips: Vec<Strip<CylinderVertex>>,
    diagnostics: FlattenDiagnostics,
}

impl Mapped {
    /// Strips on the cylinder surface, not yet split.
    #[must_use]
    pub fn strips(&self) -> &[Strip<CylinderVertex>] {
        &self.strips
    }

    /// Cut strips at the back seam and advance to [`Split`].
    pub fn split_at_seam(self) -> Split {
        let start = Instant::now();
        let (strips, crossings) = split_at_seam(&self.strips);
        let mut diagnostics = self.diagnostics;
        diagnostics.split = StageDiagnostics::new(start.elapsed());
        diagnostics.crossings = crossings;
        Split {
            cylinder: self.cylinder,
            floor: self.floor,
            strips,
            diagnostics,
        }
    }
}

// ───────────────────────── Stage 2: Split ────────────────────────────

/// Pipeline state after seam splitting.
#[must_use = "pipeline stages are consumed by advancing; call .unfold() to continue"]
pub struct Split {
    cylinder: Cylinder,
    floor: Strip,
    strips: Vec<Strip<CylinderVertex>>,
    diagnostics: FlattenDiagnostics,
}

impl Split {
    /// Strips on the cylinder surface, none crossing the seam.
    #[must_use]
    pub fn strips(&self) -> &[Strip<CylinderVertex>] {
        &self.strips
    }

    /// Unroll the cylinder and advance to [`Unfolded`].
    pub fn unfold(self) -> Unfolded {
        let start = Instant::now();
        let strips = unfold_strips(&self.strips, self.cylinder.radius);
        let mut diagnostics = self.diagnostics;
        diagnostics.unfold = StageDiagnostics::new(start.elapsed());
        diagnostics.output_strips = strips.len();
        diagnostics.output_points = strips.iter().map(Strip::len).sum();
        Unfolded {
            cylinder: self.cylinder,
            floor: self.floor,
            strips,
            diagnostics,
        }
    }
}

// ───────────────────────── Stage 3: Unfolded ─────────────────────────

/// Pipeline state after unrolling.
#[must_use = "call .into_result() to obtain the flattened store"]
pub struct Unfolded {
    cylinder: Cylinder,
    floor: Strip,
    strips: Vec<Strip<UnrolledVertex>>,
    diagnostics: FlattenDiagnostics,
}

impl Unfolded {
    /// Unrolled strips as (angle, height).
    #[must_use]
    pub fn strips(&self) -> &[Strip<UnrolledVertex>] {
        &self.strips
    }

    /// Diagnostics collected so far.
    #[must_use]
    pub const fn diagnostics(&self) -> &FlattenDiagnostics {
        &self.diagnostics
    }

    /// Place the unrolled strips on the capture plane `z = -R` and
    /// assemble the transformed store.
    pub fn into_result(self) -> Flattened {
        let plane_z = -self.cylinder.radius;
        let user = self.strips.into_iter().map(|strip| {
            strip
                .into_points()
                .into_iter()
                .map(|v| v.to_vertex(plane_z))
                .collect()
        });
        Flattened {
            store: StripStore::from_user_strips(self.floor, user),
            diagnostics: self.diagnostics,
        }
    }
}

/// Output of the full unroll pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Flattened {
    /// The transformed store: the source floor followed by unrolled
    /// strips lying in the plane `z = -R`.
    pub store: StripStore,
    /// Per-stage timing and counts.
    pub diagnostics: FlattenDiagnostics,
}

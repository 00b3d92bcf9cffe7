//! cylsketch-core: drawing model and cylindrical unroll (sans-IO).
//!
//! Points laid down on a sphere around the viewer are projected onto a
//! vertical cylinder, cut at the back seam, and unrolled into a flat
//! panorama through:
//! map to cylinder -> split at seam -> unfold -> place on capture plane.
//!
//! This crate has **no I/O dependencies**. Rasterizing, snapshot files,
//! and resource loading live in `cylsketch-render`.

pub mod camera;
pub mod cylinder;
pub mod diagnostics;
pub mod input;
pub mod pipeline;
pub mod seam;
pub mod session;
pub mod store;
pub mod types;
pub mod unfold;

pub use camera::{CameraPose, FirstPersonCamera};
pub use cylinder::Cylinder;
pub use diagnostics::FlattenDiagnostics;
pub use input::{Control, FrameInput, FrameIntents, InputController};
pub use pipeline::{Flattened, Pipeline};
pub use session::{FrameOutcome, RenderFrame, Session, ViewMode};
pub use store::StripStore;
pub use types::{
    CylinderVertex, Rgb, SketchConfig, SketchError, Strip, UnrolledVertex, Vertex,
};

/// Unroll every user strip of `store` onto the capture plane.
///
/// Returns a new store holding the untouched floor followed by the
/// unrolled strips at `z = -radius`, together with per-stage
/// diagnostics. `store` itself is not modified.
///
/// # Pipeline steps
///
/// 1. Project each point radially onto the cylinder; heights follow
///    the arc length on the drawing sphere
/// 2. Split strips where they cross the back seam
/// 3. Convert each point to (azimuth, height)
/// 4. Place the result in the plane `z = -radius`
#[must_use = "returns the unrolled store"]
pub fn flatten(store: &StripStore, config: &SketchConfig) -> Flattened {
    let flattened = Pipeline::new(store, Cylinder::from_config(config))
        .map_to_cylinder()
        .split_at_seam()
        .unfold()
        .into_result();
    tracing::info!("flattened drawing: {}", flattened.diagnostics.summary());
    flattened
}

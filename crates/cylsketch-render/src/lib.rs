//! cylsketch-render: everything between a [`RenderFrame`] and a PNG on
//! disk.
//!
//! - [`draw`]: strips to draw calls, plus the reference box mesh
//! - [`clip`]: near/far clipping in homogeneous clip space
//! - [`raster`]: the [`RenderSubmitter`] seam and its tiny-skia backend
//! - [`program`] and [`resources`]: render programs loaded from disk
//! - [`snapshot`]: numbered PNG output
//!
//! [`RenderFrame`]: cylsketch_core::RenderFrame

pub mod clip;
pub mod draw;
pub mod program;
pub mod raster;
pub mod resources;
pub mod snapshot;

pub use draw::{DrawCall, Primitive, draw_calls};
pub use program::{ProgramError, RenderProgram};
pub use raster::{DrawStyle, RenderSubmitter, SoftwareRenderer, submit_frame};
pub use resources::ResourceManager;
pub use snapshot::{SnapshotError, SnapshotWriter};

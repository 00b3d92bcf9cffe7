//! Replay scripts: a JSON array of input frames with repeat counts.
//!
//! ```json
//! [
//!   { "held": ["Draw"], "look_delta": [20.0, 0.0], "frames": 250 },
//!   { "held": ["Flatten"] },
//!   {}
//! ]
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use cylsketch_core::FrameInput;
use serde::{Deserialize, Serialize};

/// Frame time used when a step leaves `delta_time` unset.
pub const DEFAULT_DELTA_TIME: f64 = 1.0 / 60.0;

/// One input state held for a number of frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Input applied on every frame of this step.
    #[serde(flatten)]
    pub input: FrameInput,
    /// How many consecutive frames the input is applied for.
    #[serde(default = "one_frame")]
    pub frames: u32,
}

const fn one_frame() -> u32 {
    1
}

/// Parse a script, filling in the default frame time.
///
/// # Errors
///
/// Fails if `text` is not a JSON array of steps.
pub fn parse(text: &str) -> Result<Vec<Step>> {
    let mut steps: Vec<Step> = serde_json::from_str(text).context("invalid replay script")?;
    for step in &mut steps {
        if step.input.delta_time <= 0.0 {
            step.input.delta_time = DEFAULT_DELTA_TIME;
        }
    }
    Ok(steps)
}

/// Read and parse a script file.
///
/// # Errors
///
/// Fails if the file cannot be read or does not parse.
pub fn load(path: &Path) -> Result<Vec<Step>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read script {}", path.display()))?;
    parse(&text).with_context(|| format!("in {}", path.display()))
}

/// Total frames the script runs for, ignoring early quits.
#[must_use]
pub fn frame_count(steps: &[Step]) -> u64 {
    steps.iter().map(|s| u64::from(s.frames)).sum()
}

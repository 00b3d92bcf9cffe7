//! Render programs: the software renderer's stand-in for a linked
//! vertex + fragment shader pair.
//!
//! Each stage is a small JSON document. The vertex stage controls how
//! geometry is rasterized, the fragment stage how it is colored.

use cylsketch_core::Rgb;
use serde::{Deserialize, Serialize};

/// Pipeline stage a piece of program source belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Geometry stage.
    Vertex,
    /// Coloring stage.
    Fragment,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vertex => f.write_str("vertex"),
            Self::Fragment => f.write_str("fragment"),
        }
    }
}

/// Errors building a [`RenderProgram`].
#[derive(Debug, thiserror::Error)]
pub enum ProgramError {
    /// The stage source is missing or empty.
    #[error("no {0} stage source")]
    EmptyStage(Stage),

    /// The stage source failed to parse.
    #[error("{stage} stage failed to compile: {source}")]
    Compile {
        /// Stage that failed.
        stage: Stage,
        /// Parse error.
        source: serde_json::Error,
    },

    /// The stage parsed but holds unusable values.
    #[error("{stage} stage is invalid: {reason}")]
    Invalid {
        /// Stage that failed.
        stage: Stage,
        /// What is wrong.
        reason: String,
    },
}

/// Rasterization parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VertexStage {
    /// Stroke width of line strips in pixels.
    pub line_width: f32,
    /// Anti-alias lines and triangle edges.
    pub anti_alias: bool,
}

impl VertexStage {
    /// Default line width in pixels.
    pub const DEFAULT_LINE_WIDTH: f32 = 3.0;
}

impl Default for VertexStage {
    fn default() -> Self {
        Self {
            line_width: Self::DEFAULT_LINE_WIDTH,
            anti_alias: true,
        }
    }
}

/// Coloring parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FragmentStage {
    /// Background color.
    pub clear_color: Rgb,
    /// Multiplier applied to the floor's vertex colors.
    pub floor_tint: Rgb,
}

impl Default for FragmentStage {
    fn default() -> Self {
        Self {
            clear_color: Rgb::BLACK,
            floor_tint: Rgb::WHITE,
        }
    }
}

/// A compiled vertex + fragment pair.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderProgram {
    /// Geometry parameters.
    pub vertex: VertexStage,
    /// Coloring parameters.
    pub fragment: FragmentStage,
}

impl RenderProgram {
    /// Compile a program from the two stage sources.
    ///
    /// # Errors
    ///
    /// Returns [`ProgramError::EmptyStage`] if either source is blank,
    /// [`ProgramError::Compile`] if it does not parse, and
    /// [`ProgramError::Invalid`] for a non-positive line width or
    /// out-of-range color.
    pub fn compile(vertex_source: &str, fragment_source: &str) -> Result<Self, ProgramError> {
        let vertex: VertexStage = parse_stage(Stage::Vertex, vertex_source)?;
        let fragment: FragmentStage = parse_stage(Stage::Fragment, fragment_source)?;

        if !(vertex.line_width.is_finite() && vertex.line_width > 0.0) {
            return Err(ProgramError::Invalid {
                stage: Stage::Vertex,
                reason: format!("line_width must be positive, got {}", vertex.line_width),
            });
        }
        for (name, c) in [
            ("clear_color", fragment.clear_color),
            ("floor_tint", fragment.floor_tint),
        ] {
            if ![c.r, c.g, c.b].iter().all(|v| (0.0..=1.0).contains(v)) {
                return Err(ProgramError::Invalid {
                    stage: Stage::Fragment,
                    reason: format!("{name} channels must be within [0, 1]"),
                });
            }
        }
        Ok(Self { vertex, fragment })
    }
}

fn parse_stage<T: serde::de::DeserializeOwned>(stage: Stage, source: &str) -> Result<T, ProgramError> {
    if source.trim().is_empty() {
        return Err(ProgramError::EmptyStage(stage));
    }
    serde_json::from_str(source).map_err(|source| ProgramError::Compile { stage, source })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_takes_defaults() {
        let p = RenderProgram::compile("{}", "{}").unwrap();
        assert_eq!(p.vertex, VertexStage::default());
        assert_eq!(p.fragment, FragmentStage::default());
    }

    #[test]
    fn stage_values_are_read() {
        let p = RenderProgram::compile(
            r#"{"line_width": 5.5, "anti_alias": false}"#,
            r#"{"clear_color": {"r": 0.1, "g": 0.2, "b": 0.3}}"#,
        )
        .unwrap();
        assert!((p.vertex.line_width - 5.5).abs() < f32::EPSILON);
        assert!(!p.vertex.anti_alias);
        assert_eq!(p.fragment.clear_color, Rgb::new(0.1, 0.2, 0.3));
    }

    #[test]
    fn blank_stage_is_rejected() {
        let err = RenderProgram::compile("{}", "  \n").unwrap_err();
        assert!(matches!(err, ProgramError::EmptyStage(Stage::Fragment)));
    }

    #[test]
    fn syntax_error_fails_to_compile() {
        let err = RenderProgram::compile("{line_width: 3", "{}").unwrap_err();
        assert!(matches!(err, ProgramError::Compile { stage: Stage::Vertex, .. }));
        assert!(err.to_string().starts_with("vertex stage failed to compile"));
    }

    #[test]
    fn unknown_field_fails_to_compile() {
        let err = RenderProgram::compile(r#"{"linewidth": 3}"#, "{}").unwrap_err();
        assert!(matches!(err, ProgramError::Compile { .. }));
    }

    #[test]
    fn bad_values_are_invalid() {
        let err = RenderProgram::compile(r#"{"line_width": 0}"#, "{}").unwrap_err();
        assert!(matches!(err, ProgramError::Invalid { stage: Stage::Vertex, .. }));
        let err = RenderProgram::compile(
            "{}",
            r#"{"floor_tint": {"r": 2.0, "g": 0.0, "b": 0.0}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ProgramError::Invalid { stage: Stage::Fragment, .. }));
    }
}

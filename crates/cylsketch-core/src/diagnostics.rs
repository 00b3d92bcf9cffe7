//! Flatten diagnostics: timing and counts for each unroll stage.
//!
//! Every call to [`flatten`](crate::flatten) collects these alongside
//! the transformed store. Durations are serialized as fractional
//! seconds (`f64`) since `std::time::Duration` has no serde support.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from a single flatten run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlattenDiagnostics {
    /// Stage 1: mapping onto the cylinder.
    pub map: StageDiagnostics,
    /// Stage 2: seam splitting.
    pub split: StageDiagnostics,
    /// Stage 3: unrolling.
    pub unfold: StageDiagnostics,
    /// User points fed into stage 1.
    pub input_points: usize,
    /// Points dropped by stage 1 for lying on the cylinder axis.
    pub dropped_on_axis: usize,
    /// Points whose height was clamped onto the drawing sphere.
    pub clamped: usize,
    /// Seam crossings found by stage 2.
    pub crossings: usize,
    /// User strips in the output (floor excluded).
    pub output_strips: usize,
    /// User points in the output.
    pub output_points: usize,
}

impl FlattenDiagnostics {
    /// Total wall-clock time across all stages.
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.map.duration + self.split.duration + self.unfold.duration
    }

    /// Human-readable one-line summary for logs and reports.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} points in, {} out ({} strips); {} seam crossings, {} dropped on axis, {} clamped; {:.3} ms",
            self.input_points,
            self.output_points,
            self.output_strips,
            self.crossings,
            self.dropped_on_axis,
            self.clamped,
            self.total_duration().as_secs_f64() * 1000.0,
        )
    }
}

/// Timing for a single stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
}

impl StageDiagnostics {
    pub(crate) const fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn total_duration_sums_stages() {
        let d = FlattenDiagnostics {
            map: StageDiagnostics::new(Duration::from_millis(2)),
            split: StageDiagnostics::new(Duration::from_millis(3)),
            unfold: StageDiagnostics::new(Duration::from_millis(5)),
            ..FlattenDiagnostics::default()
        };
        assert_eq!(d.total_duration(), Duration::from_millis(10));
    }

    #[test]
    fn summary_mentions_counts() {
        let d = FlattenDiagnostics {
            input_points: 12,
            output_points: 14,
            output_strips: 2,
            crossings: 1,
            ..FlattenDiagnostics::default()
        };
        let s = d.summary();
        assert!(s.starts_with("12 points in, 14 out (2 strips); 1 seam crossings"), "{s}");
    }

    #[test]
    fn durations_serialize_as_seconds() {
        let d = StageDiagnostics::new(Duration::from_millis(1500));
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, r#"{"duration":1.5}"#);
        let back: StageDiagnostics = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
    }

    #[test]
    fn negative_duration_is_rejected() {
        let result: Result<StageDiagnostics, _> = serde_json::from_str(r#"{"duration":-1.0}"#);
        assert!(result.is_err());
    }
}

//! Stage 2: split strips where they cross the cylinder's back seam.
//!
//! The seam is the half-plane `x = 0, z > 0` behind the viewer, where
//! the unrolled azimuth wraps from `+π` to `-π`. A segment whose
//! endpoints sit on opposite sides of it would be drawn straight across
//! the whole unrolled image, so every such segment is cut at `x = 0`
//! and the remainder continues as a new strip.
//!
//! Splitting runs in two passes: [`find_crossings`] inspects a strip
//! without touching it, then [`split_strip`] assembles the pieces.

use crate::types::{CylinderVertex, Strip};

/// A segment only counts as crossing the seam when its second point is
/// at least this far behind the viewer. Segments crossing `x = 0` in
/// front of the viewer are ordinary.
pub const SEAM_DEPTH_EPSILON: f64 = 1e-5;

/// Distance from `x = 0` at which the two halves of a split end.
///
/// Each half ends on its own side of the seam so neither has a point
/// at exactly zero.
pub const SEAM_OFFSET: f64 = 1e-6;

/// Segments narrower than this in `x` are not interpolated; the
/// crossing takes the second point's height and depth.
const MIN_CROSSING_SPAN: f64 = 1e-12;

/// A seam crossing between points `index - 1` and `index` of a strip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeamCrossing {
    /// Index of the first point past the seam.
    pub index: usize,
    /// Interpolated crossing point on the side of point `index - 1`.
    pub vertex: CylinderVertex,
}

impl SeamCrossing {
    /// The same crossing point seen from the far side of the seam.
    #[must_use]
    pub const fn mirrored(&self) -> CylinderVertex {
        CylinderVertex {
            x: -self.vertex.x,
            ..self.vertex
        }
    }
}

/// Whether the segment `prev -> curr` crosses the back seam.
///
/// Sides are compared by sign bit, so `-0.0` is on the negative side.
#[must_use]
pub fn crosses_seam(prev: &CylinderVertex, curr: &CylinderVertex) -> bool {
    prev.x.is_sign_negative() != curr.x.is_sign_negative() && curr.z > SEAM_DEPTH_EPSILON
}

/// Pass 1: locate every seam crossing in a strip.
#[must_use]
pub fn find_crossings(strip: &Strip<CylinderVertex>) -> Vec<SeamCrossing> {
    strip
        .points()
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| crosses_seam(&pair[0], &pair[1]))
        .map(|(i, pair)| SeamCrossing {
            index: i + 1,
            vertex: crossing_vertex(&pair[0], &pair[1]),
        })
        .collect()
}

/// Pass 2: cut a strip at the given crossings.
///
/// A strip with `k` crossings yields `k + 1` pieces. Every piece but
/// the last ends with the crossing point; every piece but the first
/// starts with the mirrored crossing point.
#[must_use = "returns the split pieces"]
pub fn split_strip(
    strip: &Strip<CylinderVertex>,
    crossings: &[SeamCrossing],
) -> Vec<Strip<CylinderVertex>> {
    if crossings.is_empty() {
        return vec![strip.clone()];
    }

    let points = strip.points();
    let mut pieces = Vec::with_capacity(crossings.len() + 1);
    let mut start = 0;
    let mut head: Option<CylinderVertex> = None;

    for crossing in crossings {
        let mut piece = Vec::with_capacity(crossing.index - start + 2);
        piece.extend(head);
        piece.extend_from_slice(&points[start..crossing.index]);
        piece.push(crossing.vertex);
        pieces.push(Strip::new(piece));

        start = crossing.index;
        head = Some(crossing.mirrored());
    }

    let mut tail = Vec::with_capacity(points.len() - start + 1);
    tail.extend(head);
    tail.extend_from_slice(&points[start..]);
    pieces.push(Strip::new(tail));
    pieces
}

/// Split every strip at its seam crossings, keeping each strip's pieces
/// in place of the input strip. Returns the new strips and the number of
/// crossings found.
#[must_use = "returns the split strips"]
pub fn split_at_seam(strips: &[Strip<CylinderVertex>]) -> (Vec<Strip<CylinderVertex>>, usize) {
    let plans: Vec<Vec<SeamCrossing>> = strips.iter().map(find_crossings).collect();
    let crossings = plans.iter().map(Vec::len).sum();

    let mut out = Vec::with_capacity(strips.len() + crossings);
    for (strip_index, (strip, plan)) in strips.iter().zip(&plans).enumerate() {
        if !plan.is_empty() {
            tracing::debug!(strip_index, crossings = plan.len(), "splitting strip at seam");
        }
        out.extend(split_strip(strip, plan));
    }
    (out, crossings)
}

/// Interpolate the point where `prev -> curr` meets `x = 0`, nudged to
/// `prev`'s side of the seam and carrying `prev`'s color.
fn crossing_vertex(prev: &CylinderVertex, curr: &CylinderVertex) -> CylinderVertex {
    let span = prev.x - curr.x;
    let (y, z) = if span.abs() < MIN_CROSSING_SPAN {
        (curr.y, curr.z)
    } else {
        let t = -curr.x / span;
        (t.mul_add(prev.y - curr.y, curr.y), t.mul_add(prev.z - curr.z, curr.z))
    };
    CylinderVertex {
        x: SEAM_OFFSET.copysign(prev.x),
        y,
        z,
        color: prev.color,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Rgb;

    fn cv(x: f64, y: f64, z: f64) -> CylinderVertex {
        CylinderVertex {
            x,
            y,
            z,
            color: Rgb::WHITE,
        }
    }

    fn colored(x: f64, y: f64, z: f64, color: Rgb) -> CylinderVertex {
        CylinderVertex { x, y, z, color }
    }

    fn total_points(strips: &[Strip<CylinderVertex>]) -> usize {
        strips.iter().map(Strip::len).sum()
    }

    #[test]
    fn straddling_pair_behind_viewer_is_split() {
        // Two points straddling x = 0 behind the viewer (z = 0.5, R = 0.7).
        let strip = Strip::new(vec![cv(-0.2, 1.0, 0.5), cv(0.3, 1.5, 0.5)]);
        let (out, crossings) = split_at_seam(&[strip]);
        assert_eq!(crossings, 1);
        assert_eq!(out.len(), 2);

        let first = out[0].points();
        assert_eq!(first.len(), 2);
        let seam = first[1];
        assert!((seam.x + SEAM_OFFSET).abs() < f64::EPSILON);
        // t = 0.3 / 0.5 along curr -> prev.
        assert!((seam.y - 1.2).abs() < 1e-12, "y = {}", seam.y);
        assert!((seam.z - 0.5).abs() < 1e-12);

        let second = out[1].points();
        assert_eq!(second.len(), 2);
        assert!((second[0].x - SEAM_OFFSET).abs() < f64::EPSILON);
        assert!((second[0].y - seam.y).abs() < f64::EPSILON);
        assert_eq!(second[1], cv(0.3, 1.5, 0.5));
    }

    #[test]
    fn depth_is_interpolated() {
        let strip = Strip::new(vec![cv(0.4, 1.0, 0.2), cv(-0.4, 1.0, 0.6)]);
        let crossings = find_crossings(&strip);
        assert_eq!(crossings.len(), 1);
        assert_eq!(crossings[0].index, 1);
        assert!((crossings[0].vertex.z - 0.4).abs() < 1e-12);
        assert!(crossings[0].vertex.x > 0.0);
    }

    #[test]
    fn crossing_in_front_is_not_split() {
        let strip = Strip::new(vec![cv(-0.2, 1.0, -0.5), cv(0.3, 1.0, -0.5)]);
        let (out, crossings) = split_at_seam(&[strip.clone()]);
        assert_eq!(crossings, 0);
        assert_eq!(out, vec![strip]);
    }

    #[test]
    fn crossing_requires_current_point_behind() {
        // Previous point behind, current at the threshold: not a crossing.
        assert!(!crosses_seam(&cv(-0.1, 1.0, 0.6), &cv(0.1, 1.0, SEAM_DEPTH_EPSILON)));
        assert!(crosses_seam(&cv(-0.1, 1.0, -0.6), &cv(0.1, 1.0, 0.6)));
    }

    #[test]
    fn negative_zero_counts_as_negative_side() {
        assert!(crosses_seam(&cv(-0.0, 1.0, 0.7), &cv(0.0, 1.0, 0.7)));
    }

    #[test]
    fn degenerate_span_takes_current_point() {
        let strip = Strip::new(vec![cv(-0.0, 1.0, 0.7), cv(0.0, 2.0, 0.7)]);
        let crossings = find_crossings(&strip);
        assert_eq!(crossings.len(), 1);
        let v = crossings[0].vertex;
        assert!(v.y.is_finite() && v.z.is_finite());
        assert!((v.y - 2.0).abs() < f64::EPSILON);
        assert!(v.x < 0.0);
    }

    #[test]
    fn inserted_point_takes_previous_color() {
        let red = Rgb::new(1.0, 0.0, 0.0);
        let blue = Rgb::new(0.0, 0.0, 1.0);
        let strip = Strip::new(vec![
            colored(0.2, 1.0, 0.6, red),
            colored(-0.2, 1.0, 0.6, blue),
        ]);
        let (out, _) = split_at_seam(&[strip]);
        assert_eq!(out[0].last().unwrap().color, red);
        assert_eq!(out[1].first().unwrap().color, red);
        assert_eq!(out[1].last().unwrap().color, blue);
    }

    #[test]
    fn multiple_crossings_produce_consecutive_pieces() {
        let strip = Strip::new(vec![
            cv(-0.3, 1.0, 0.6),
            cv(0.3, 1.0, 0.6),
            cv(0.5, 1.0, 0.4),
            cv(-0.3, 1.0, 0.6),
        ]);
        let other = Strip::new(vec![cv(0.1, 1.0, -0.6), cv(0.2, 1.0, -0.6)]);
        let (out, crossings) = split_at_seam(&[strip.clone(), other.clone()]);
        assert_eq!(crossings, 2);
        assert_eq!(out.len(), 4);
        assert_eq!(out[0].len(), 2);
        assert_eq!(out[1].len(), 4);
        assert_eq!(out[2].len(), 2);
        assert_eq!(out[3], other);
        assert_eq!(total_points(&out), total_points(&[strip, other]) + 2 * crossings);
    }

    #[test]
    fn splitting_is_idempotent() {
        let strips = vec![
            Strip::new(vec![
                cv(-0.3, 1.0, 0.6),
                cv(0.3, 1.1, 0.6),
                cv(0.6, 1.2, 0.3),
                cv(0.1, 1.3, -0.7),
                cv(-0.4, 1.4, -0.5),
                cv(-0.3, 1.5, 0.6),
                cv(0.3, 1.6, 0.6),
            ]),
            Strip::new(vec![cv(0.0, 1.0, 0.7)]),
            Strip::empty(),
        ];
        let (once, crossings) = split_at_seam(&strips);
        assert_eq!(crossings, 2);
        let (twice, again) = split_at_seam(&once);
        assert_eq!(again, 0);
        assert_eq!(twice, once);
    }

    #[test]
    fn single_point_and_empty_strips_pass_through() {
        let strips = vec![Strip::new(vec![cv(0.1, 1.0, 0.7)]), Strip::empty()];
        let (out, crossings) = split_at_seam(&strips);
        assert_eq!(crossings, 0);
        assert_eq!(out, strips);
    }

    #[test]
    fn halves_end_on_opposite_sides() {
        let strip = Strip::new(vec![cv(0.3, 1.0, 0.6), cv(-0.3, 1.0, 0.6)]);
        let (out, _) = split_at_seam(&[strip]);
        for piece in &out {
            let first_sign = piece.first().unwrap().x.is_sign_negative();
            assert!(
                piece
                    .points()
                    .iter()
                    .all(|p| p.x.is_sign_negative() == first_sign),
                "piece mixes seam sides: {piece:?}"
            );
        }
    }
}

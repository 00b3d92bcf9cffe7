//! Draw-call classification and the reference box mesh.

use cylsketch_core::store::FLOOR_INDEX;
use cylsketch_core::{StripStore, Vertex};

/// How a run of vertices is assembled into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    /// Every three vertices form a filled triangle.
    Triangles,
    /// Each vertex after the second closes a filled triangle with the
    /// two before it.
    TriangleStrip,
    /// Consecutive vertices are joined by line segments.
    LineStrip,
}

/// One batch of vertices sharing a primitive type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall<'a> {
    /// Assembly rule.
    pub primitive: Primitive,
    /// Vertices in submission order.
    pub vertices: &'a [Vertex],
}

impl<'a> DrawCall<'a> {
    /// Triangles as index triples into [`vertices`](Self::vertices).
    ///
    /// Empty for line strips.
    #[must_use]
    pub fn triangles(&self) -> Vec<[usize; 3]> {
        let n = self.vertices.len();
        match self.primitive {
            Primitive::Triangles => (0..n / 3).map(|t| [3 * t, 3 * t + 1, 3 * t + 2]).collect(),
            Primitive::TriangleStrip => (2..n).map(|i| [i - 2, i - 1, i]).collect(),
            Primitive::LineStrip => Vec::new(),
        }
    }

    /// Consecutive vertex pairs of a line strip.
    pub fn segments(&self) -> impl Iterator<Item = (&'a Vertex, &'a Vertex)> + 'a {
        let pairs: &'a [Vertex] = if self.primitive == Primitive::LineStrip {
            self.vertices
        } else {
            &[]
        };
        pairs.windows(2).map(|w| (&w[0], &w[1]))
    }
}

/// One draw call per non-empty strip: the floor as a filled triangle
/// strip, every other strip as a line strip.
#[must_use]
pub fn draw_calls(store: &StripStore) -> Vec<DrawCall<'_>> {
    store
        .strips()
        .iter()
        .enumerate()
        .filter(|(_, strip)| !strip.is_empty())
        .map(|(i, strip)| DrawCall {
            primitive: if i == FLOOR_INDEX {
                Primitive::TriangleStrip
            } else {
                Primitive::LineStrip
            },
            vertices: strip.points(),
        })
        .collect()
}

/// Raw `x y z r g b` data for a unit cube centred on the origin.
const REFERENCE_BOX: [[f64; 6]; 36] = [
    // back
    [-0.5, -0.5, -0.5, 0.0, 0.0, 0.0],
    [0.5, -0.5, -0.5, 0.0, 0.0, 0.0],
    [0.5, 0.5, -0.5, 0.0, 1.0, 0.0],
    [0.5, 0.5, -0.5, 0.0, 1.0, 0.0],
    [-0.5, 0.5, -0.5, 0.2, 0.6, 0.3],
    [-0.5, -0.5, -0.5, 0.0, 0.0, 0.0],
    // front
    [-0.5, -0.5, 0.5, 0.0, 0.0, 0.0],
    [0.5, -0.5, 0.5, 0.0, 0.0, 0.0],
    [0.5, 0.5, 0.5, 0.5, 0.5, 0.5],
    [0.5, 0.5, 0.5, 0.5, 0.5, 0.5],
    [-0.5, 0.5, 0.5, 0.7, 0.3, 0.1],
    [-0.5, -0.5, 0.5, 0.0, 0.0, 0.0],
    // left
    [-0.5, 0.5, 0.5, 0.7, 0.3, 0.1],
    [-0.5, 0.5, -0.5, 0.2, 0.6, 0.3],
    [-0.5, -0.5, -0.5, 0.0, 0.0, 0.0],
    [-0.5, -0.5, -0.5, 0.0, 0.0, 0.0],
    [-0.5, -0.5, 0.5, 0.0, 0.0, 0.0],
    [-0.5, 0.5, 0.5, 0.7, 0.3, 0.1],
    // right
    [0.5, 0.5, 0.5, 0.5, 0.5, 0.5],
    [0.5, 0.5, -0.5, 0.0, 1.0, 0.0],
    [0.5, -0.5, -0.5, 0.0, 0.0, 0.0],
    [0.5, -0.5, -0.5, 0.0, 0.0, 0.0],
    [0.5, -0.5, 0.5, 0.0, 0.0, 0.0],
    [0.5, 0.5, 0.5, 0.5, 0.5, 0.5],
    // bottom
    [-0.5, -0.5, -0.5, 0.0, 0.0, 0.0],
    [0.5, -0.5, -0.5, 0.0, 0.0, 0.0],
    [0.5, -0.5, 0.5, 0.0, 0.0, 0.0],
    [0.5, -0.5, 0.5, 0.0, 0.0, 0.0],
    [-0.5, -0.5, 0.5, 0.0, 0.0, 0.0],
    [-0.5, -0.5, -0.5, 0.0, 0.0, 0.0],
    // top
    [-0.5, 0.5, -0.5, 0.2, 0.6, 0.3],
    [0.5, 0.5, -0.5, 0.0, 1.0, 0.0],
    [0.5, 0.5, 0.5, 0.5, 0.5, 0.5],
    [0.5, 0.5, 0.5, 0.5, 0.5, 0.5],
    [-0.5, 0.5, 0.5, 0.7, 0.3, 0.1],
    [-0.5, 0.5, -0.5, 0.2, 0.6, 0.3],
];

/// The 36-vertex reference box, in model space.
#[must_use]
pub fn reference_box() -> Vec<Vertex> {
    REFERENCE_BOX.iter().copied().map(Vertex::from_raw).collect()
}

//! Triangle adjacency: finding the edge two triangles share.

use std::fmt;

use crate::geometry::Triangle;

/// An undirected edge between two vertices, packed into one comparable key with the smaller
/// index in the low half.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Edge(u64);

impl Edge {
    /// The edge between `v0` and `v1`, in either order.
    #[inline(always)]
    pub const fn new(v0: u32, v1: u32) -> Self {
        let (lo, hi) = if v0 < v1 { (v0, v1) } else { (v1, v0) };
        Self(((hi as u64) << 32) | lo as u64)
    }

    #[inline(always)]
    pub const fn key(self) -> u64 {
        self.0
    }

    /// Both endpoints, smaller first.
    #[inline(always)]
    pub const fn vertices(self) -> (u32, u32) {
        (self.0 as u32, (self.0 >> 32) as u32)
    }

    /// The three edges of `tri`, in winding order starting at `v[0]`.
    #[inline(always)]
    pub fn of(tri: &Triangle) -> [Edge; 3] {
        let [a, b, c] = tri.v;
        [Edge::new(a, b), Edge::new(b, c), Edge::new(c, a)]
    }
}

/// Where two triangles meet.
///
/// Packs a rotation of the first triangle's corners, one corner per byte, which moves the shared
/// edge between its last and first corner, followed by the corner of the second triangle that's
/// off the shared edge.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SharedEdge(u32);

impl SharedEdge {
    #[inline(always)]
    const fn new(r0: u32, r1: u32, r2: u32, opposite: u32) -> Self {
        Self(r0 | (r1 << 8) | (r2 << 16) | (opposite << 24))
    }

    /// The packed form, `r0 | r1 << 8 | r2 << 16 | opposite << 24`.
    #[inline(always)]
    pub const fn packed(self) -> u32 {
        self.0
    }

    /// Corner indices of the first triangle, reordered so that the shared edge runs from the
    /// last to the first.
    #[inline(always)]
    pub const fn rotation(self) -> [usize; 3] {
        [
            (self.0 & 0xff) as usize,
            ((self.0 >> 8) & 0xff) as usize,
            ((self.0 >> 16) & 0xff) as usize,
        ]
    }

    /// The corner index (`0..3`) of the second triangle that isn't on the shared edge.
    #[inline(always)]
    pub const fn opposite(self) -> usize {
        (self.0 >> 24) as usize
    }

    /// The first triangle's vertices in [rotated](Self::rotation) order.
    #[inline]
    pub fn rotate(self, tri0: &Triangle) -> Triangle {
        let [a, b, c] = self.rotation();
        Triangle::new(tri0.v[a], tri0.v[b], tri0.v[c])
    }

    /// The vertex of the second triangle that isn't on the shared edge.
    #[inline]
    pub fn opposite_vertex(self, tri1: &Triangle) -> u32 {
        tri1.v[self.opposite()]
    }
}

impl fmt::Debug for SharedEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedEdge")
            .field("rotation", &self.rotation())
            .field("opposite", &self.opposite())
            .finish()
    }
}

#[inline(always)]
fn sorted(tri: &Triangle) -> [u32; 3] {
    let mut v = tri.v;
    v.sort_unstable();
    v
}

/// Find an edge shared by `tri0` and `tri1`.
///
/// Edges of `tri1` are tried in order, each against the edges of `tri0` in order, and the first
/// match wins, so degenerate triangles resolve deterministically. Triangles sharing fewer than two
/// vertices, or all three, have no shared edge.
pub fn shared_edge(tri0: &Triangle, tri1: &Triangle) -> Option<SharedEdge> {
    if sorted(tri0) == sorted(tri1) {
        return None;
    }
    // rotations of tri0 that put each of its edges between the last and first corner
    const ROTATIONS: [[u32; 3]; 3] = [[1, 2, 0], [2, 0, 1], [0, 1, 2]];
    // the tri1 corner off each of its edges
    const OPPOSITE: [u32; 3] = [2, 0, 1];

    let edges0 = Edge::of(tri0);
    let edges1 = Edge::of(tri1);
    for (e1, &opposite) in edges1.iter().zip(OPPOSITE.iter()) {
        for (e0, &[r0, r1, r2]) in edges0.iter().zip(ROTATIONS.iter()) {
            if e0 == e1 {
                return Some(SharedEdge::new(r0, r1, r2, opposite));
            }
        }
    }
    None
}

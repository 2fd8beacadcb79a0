//! Deformable primitive geometry: triangle meshes and curves sampled at discrete time steps.

mod curves;
pub use curves::*;
mod mesh;
pub use mesh::*;

use crate::{
    bounds::{motion, Aabb, LinearAabb},
    time::TimeRange,
    Error,
};

/// The largest number of time steps a geometry may be sampled at.
pub const MAX_TIME_STEPS: u32 = 129;

/// Identifies one of the buffers a geometry reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferSlot {
    /// Triangle vertex indices, or curve start indices
    Index,
    /// Positions (and curve radii)
    Vertex,
    /// Curve normals
    Normal,
    /// Hermite curve tangents
    Tangent,
    /// Per-segment curve start/end flags
    Flags,
    /// The `n`th user vertex attribute channel
    VertexAttribute(usize),
}

/// Fields shared by every kind of geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryInfo {
    enabled: bool,
    mask: u32,
    num_time_steps: u32,
    /// `num_time_steps - 1`, kept pre-divided for time mapping
    time_segments: f32,
    vertex_attribute_count: u32,
}

impl Default for GeometryInfo {
    fn default() -> Self {
        Self {
            enabled: true,
            mask: u32::MAX,
            num_time_steps: 1,
            time_segments: 0.0,
            vertex_attribute_count: 0,
        }
    }
}

impl GeometryInfo {
    /// # Errors
    ///
    /// * [`InvalidTimeStepCount`](Error::InvalidTimeStepCount) if `num_time_steps` ∉ `1..=MAX_TIME_STEPS`
    pub fn new(num_time_steps: u32) -> Result<Self, Error> {
        let mut res = Self::default();
        res.set_num_time_steps(num_time_steps)?;
        Ok(res)
    }

    /// Whether the geometry takes part in builds and traversal.
    #[inline(always)]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Let the geometry take part in builds and traversal.
    pub fn enable(&mut self) {
        if !self.enabled {
            crate::log::debug!("enabling geometry");
        }
        self.enabled = true;
    }

    /// Exclude the geometry from builds and traversal, keeping its buffers.
    pub fn disable(&mut self) {
        if self.enabled {
            crate::log::debug!("disabling geometry");
        }
        self.enabled = false;
    }

    /// The ray mask; a ray only sees this geometry if their masks share a bit.
    #[inline(always)]
    pub fn mask(&self) -> u32 {
        self.mask
    }

    /// Replace the ray mask.
    pub fn set_mask(&mut self, mask: u32) {
        self.mask = mask;
    }

    /// The number of time steps vertex data is sampled at.
    #[inline(always)]
    pub fn num_time_steps(&self) -> usize {
        self.num_time_steps as usize
    }

    /// The number of time segments, as a float ready for time mapping.
    #[inline(always)]
    pub fn time_segments(&self) -> f32 {
        self.time_segments
    }

    /// The number of user vertex attribute channels.
    #[inline(always)]
    pub fn vertex_attribute_count(&self) -> usize {
        self.vertex_attribute_count as usize
    }

    /// Only the owning geometry may change this, since its buffers must be resized to match.
    pub(crate) fn set_num_time_steps(&mut self, num_time_steps: u32) -> Result<(), Error> {
        if !(1..=MAX_TIME_STEPS).contains(&num_time_steps) {
            return Err(Error::InvalidTimeStepCount(num_time_steps));
        }
        self.num_time_steps = num_time_steps;
        self.time_segments = (num_time_steps - 1) as f32;
        Ok(())
    }

    pub(crate) fn set_vertex_attribute_count(&mut self, count: u32) {
        self.vertex_attribute_count = count;
    }
}

/// Bound and validity queries shared by every kind of geometry.
///
/// Implementors provide the per-step queries; the time-dependent ones are derived from them
/// through [motion]. Nothing here allocates, locks, or mutates, so any number of threads may
/// query the same geometry at once.
///
/// Every query takes a primitive index `i < len()`. The unchecked bound queries
/// ([bounds](Self::bounds), [first_bounds](Self::first_bounds), [bounds_at](Self::bounds_at),
/// [linear_bounds](Self::linear_bounds)) additionally require the primitive to be
/// [valid](Self::valid_range) at every time step they read, and panic on indices past the end of
/// a buffer or on buffers which were never set. The checked variants
/// ([linear_bounds_checked](Self::linear_bounds_checked),
/// [linear_bounds_segment](Self::linear_bounds_segment), [build_bounds](Self::build_bounds),
/// [build_bounds_segment](Self::build_bounds_segment)) validate first and return `None` instead.
pub trait Primitives {
    /// The settings shared by every kind of geometry.
    fn info(&self) -> &GeometryInfo;

    /// The number of primitives.
    fn len(&self) -> usize;

    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Exact bounds of the `i`th primitive at the `itime`th time step.
    ///
    /// # Panics
    ///
    /// * if the primitive references data missing at that step; check [valid](Self::valid) first
    ///
    /// Non-finite vertices don't panic, but make the result meaningless.
    fn bounds(&self, i: usize, itime: usize) -> Aabb<f32>;

    /// Whether the `i`th primitive references only existing vertices, all of which are finite
    /// at every time step in `itime_lower..=itime_upper`.
    ///
    /// A range reaching past the last time step is clamped to it; one starting past it is never
    /// valid.
    fn valid_range(&self, i: usize, itime_lower: usize, itime_upper: usize) -> bool;

    /// Bounds of the `i`th primitive at the first time step.
    #[inline]
    fn first_bounds(&self, i: usize) -> Aabb<f32> {
        self.bounds(i, 0)
    }

    /// Whether the `i`th primitive is usable at the `itime`th time step, which must exist.
    #[inline]
    fn valid(&self, i: usize, itime: usize) -> bool {
        self.valid_range(i, itime, itime)
    }

    /// Approximate bounds of the `i`th primitive at continuous `time`.
    #[inline]
    fn bounds_at(&self, i: usize, time: f32) -> Aabb<f32> {
        motion::bounds_at(time, self.info().time_segments(), |itime| self.bounds(i, itime))
    }

    /// Conservative linear bounds of the `i`th primitive over `range`.
    #[inline]
    fn linear_bounds(&self, i: usize, range: TimeRange) -> LinearAabb<f32> {
        motion::linear_bounds(range, self.info().time_segments(), |itime| {
            self.bounds(i, itime)
        })
    }

    /// [Linear bounds](Self::linear_bounds) over `range`, if the `i`th primitive is valid at
    /// every time step they depend on.
    #[inline]
    fn linear_bounds_checked(&self, i: usize, range: TimeRange) -> Option<LinearAabb<f32>> {
        let (lower, upper) = motion::covering_steps(range, self.info().time_segments());
        if !self.valid_range(i, lower, upper) {
            return None;
        }
        Some(self.linear_bounds(i, range))
    }

    /// Conservative linear bounds of the `i`th primitive over the `itime_global`th segment of a
    /// structure built with `num_global` time steps, if it's valid throughout.
    #[inline]
    fn linear_bounds_segment(
        &self,
        i: usize,
        itime_global: usize,
        num_global: usize,
    ) -> Option<LinearAabb<f32>> {
        let num_segments = num_global.saturating_sub(1).max(1);
        if itime_global >= num_segments {
            return None;
        }
        let range = TimeRange::segment(itime_global, num_segments);
        self.linear_bounds_checked(i, range)
    }

    /// Bounds for builders of static structures: the first time step's bounds, if the `i`th
    /// primitive is valid at every time step.
    #[inline]
    fn build_bounds(&self, i: usize) -> Option<Aabb<f32>> {
        if !self.valid_range(i, 0, self.info().num_time_steps() - 1) {
            return None;
        }
        Some(self.first_bounds(i))
    }

    /// Bounds of the `i`th primitive for building the `itime_global`th time step of a structure
    /// built with `num_global` time steps, if the local time steps involved are valid.
    #[inline]
    fn build_bounds_segment(
        &self,
        i: usize,
        itime_global: usize,
        num_global: usize,
    ) -> Option<Aabb<f32>> {
        motion::build_bounds_segment(
            itime_global,
            num_global,
            self.info().num_time_steps(),
            |itime| self.valid(i, itime).then(|| self.bounds(i, itime)),
        )
    }
}

/// Any kind of geometry, dispatched by tag rather than through a vtable.
#[derive(Debug, Clone)]
pub enum Geometry<'buf> {
    Triangles(TriangleMesh<'buf>),
    Curves(Curves<'buf>),
}

impl<'buf> From<TriangleMesh<'buf>> for Geometry<'buf> {
    fn from(mesh: TriangleMesh<'buf>) -> Self {
        Self::Triangles(mesh)
    }
}

impl<'buf> From<Curves<'buf>> for Geometry<'buf> {
    fn from(curves: Curves<'buf>) -> Self {
        Self::Curves(curves)
    }
}

/// Forward a call to whichever geometry `$self` holds.
macro_rules! dispatch {
    ($self:ident, $g:ident => $call:expr) => {
        match $self {
            Geometry::Triangles($g) => $call,
            Geometry::Curves($g) => $call,
        }
    };
}

impl<'buf> Geometry<'buf> {
    /// Mutable access to the shared settings.
    pub fn info_mut(&mut self) -> &mut GeometryInfo {
        dispatch!(self, g => g.info_mut())
    }

    /// The number of vertices per time step.
    pub fn num_vertices(&self) -> usize {
        dispatch!(self, g => g.num_vertices())
    }

    /// Re-cache the first time step of a buffer after it changed.
    pub fn update_buffer(&mut self, slot: BufferSlot) {
        dispatch!(self, g => g.update_buffer(slot))
    }

    /// Change the number of time steps, resizing every time-sampled buffer to match.
    pub fn set_num_time_steps(&mut self, num_time_steps: u32) -> Result<(), Error> {
        dispatch!(self, g => g.set_num_time_steps(num_time_steps))
    }

    /// Commit-time check that every buffer is consistent and every vertex usable.
    pub fn verify(&self) -> Result<(), Error> {
        dispatch!(self, g => g.verify())
    }
}

impl<'buf> Primitives for Geometry<'buf> {
    #[inline]
    fn info(&self) -> &GeometryInfo {
        dispatch!(self, g => g.info())
    }

    #[inline]
    fn len(&self) -> usize {
        dispatch!(self, g => g.len())
    }

    #[inline]
    fn bounds(&self, i: usize, itime: usize) -> Aabb<f32> {
        dispatch!(self, g => g.bounds(i, itime))
    }

    #[inline]
    fn valid_range(&self, i: usize, itime_lower: usize, itime_upper: usize) -> bool {
        dispatch!(self, g => g.valid_range(i, itime_lower, itime_upper))
    }

    #[inline]
    fn first_bounds(&self, i: usize) -> Aabb<f32> {
        dispatch!(self, g => g.first_bounds(i))
    }

    #[inline]
    fn bounds_at(&self, i: usize, time: f32) -> Aabb<f32> {
        dispatch!(self, g => g.bounds_at(i, time))
    }

    #[inline]
    fn linear_bounds(&self, i: usize, range: TimeRange) -> LinearAabb<f32> {
        dispatch!(self, g => g.linear_bounds(i, range))
    }

    #[inline]
    fn linear_bounds_checked(&self, i: usize, range: TimeRange) -> Option<LinearAabb<f32>> {
        dispatch!(self, g => g.linear_bounds_checked(i, range))
    }

    #[inline]
    fn build_bounds(&self, i: usize) -> Option<Aabb<f32>> {
        dispatch!(self, g => g.build_bounds(i))
    }

    #[inline]
    fn build_bounds_segment(
        &self,
        i: usize,
        itime_global: usize,
        num_global: usize,
    ) -> Option<Aabb<f32>> {
        dispatch!(self, g => g.build_bounds_segment(i, itime_global, num_global))
    }
}

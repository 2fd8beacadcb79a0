use nalgebra::{Point3, Vector3, Vector4};
use rtgeom_common::impl_op;

use crate::{
    bounds::Aabb,
    buffer::{BufferView, TimeSeries},
    geometry::{BufferSlot, GeometryInfo, Primitives},
    time::{lerp, map_time, TimeSegment},
    Error,
};

/// The default number of pieces each curve segment is split into when tessellated.
pub const DEFAULT_TESSELLATION_RATE: u32 = 4;

/// How the control points of a curve segment are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CurveBasis {
    /// Cubic bezier: four consecutive control points per segment
    Bezier,
    /// Cubic hermite: two consecutive control points per segment, each with a tangent
    Hermite,
}

impl CurveBasis {
    /// The number of consecutive vertices each segment reads.
    #[inline]
    pub const fn control_points(self) -> usize {
        match self {
            CurveBasis::Bezier => 4,
            CurveBasis::Hermite => 2,
        }
    }
}

/// The control points of a hermite segment. Positions carry the radius in `w`; tangents carry
/// its derivative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HermiteSegment {
    /// Start point
    pub p0: Vector4<f32>,
    /// Tangent at the start
    pub t0: Vector4<f32>,
    /// End point
    pub p1: Vector4<f32>,
    /// Tangent at the end
    pub t1: Vector4<f32>,
}

impl HermiteSegment {
    /// The equivalent cubic bezier control points.
    #[inline]
    pub fn to_bezier(&self) -> [Vector4<f32>; 4] {
        [
            self.p0,
            self.p0 + self.t0 / 3.0,
            self.p1 - self.t1 / 3.0,
            self.p1,
        ]
    }
}

impl_op! {Mul, mul, MulAssign, mul_assign;
    self: HermiteSegment, rhs: f32;
    HermiteSegment {
        p0: self.p0 * rhs.to_owned(),
        t0: self.t0 * rhs.to_owned(),
        p1: self.p1 * rhs.to_owned(),
        t1: self.t1 * rhs.to_owned(),
    };
    *self = *self * rhs.to_owned()}

impl_op! {Add, add, AddAssign, add_assign;
    self: HermiteSegment, rhs: HermiteSegment;
    HermiteSegment {
        p0: self.p0 + rhs.p0,
        t0: self.t0 + rhs.t0,
        p1: self.p1 + rhs.p1,
        t1: self.t1 + rhs.t1,
    };
    *self = *self + rhs}

#[inline(always)]
fn lerp_each<V, const N: usize>(a: [V; N], b: [V; N], f: f32) -> [V; N]
where
    V: Copy + std::ops::Mul<f32, Output = V> + std::ops::Add<Output = V>,
{
    std::array::from_fn(|k| lerp(a[k], b[k], f))
}

/// An array of cubic curves sharing one pool of control points which may move across several
/// time steps.
///
/// Each curve is identified by the index of its first control point; the rest follow it
/// consecutively.
#[derive(Debug, Clone)]
pub struct Curves<'buf> {
    info: GeometryInfo,
    basis: CurveBasis,
    tessellation_rate: u32,
    curves: BufferView<'buf, u32>,
    vertices: TimeSeries<'buf, Vector4<f32>>,
    normals: TimeSeries<'buf, Vector3<f32>>,
    tangents: TimeSeries<'buf, Vector4<f32>>,
    flags: BufferView<'buf, u8>,
    vertex_attribs: Vec<BufferView<'buf, Vector4<f32>>>,
}

impl<'buf> Curves<'buf> {
    /// Construct curves of `basis` sampled at `num_time_steps` time steps, with no buffers set.
    pub fn new(basis: CurveBasis, num_time_steps: u32) -> Result<Self, Error> {
        let steps = num_time_steps as usize;
        Ok(Self {
            info: GeometryInfo::new(num_time_steps)?,
            basis,
            tessellation_rate: DEFAULT_TESSELLATION_RATE,
            curves: BufferView::empty(),
            vertices: TimeSeries::new(steps),
            normals: TimeSeries::new(steps),
            tangents: TimeSeries::new(steps),
            flags: BufferView::empty(),
            vertex_attribs: Vec::new(),
        })
    }

    /// Mutable access to the shared settings.
    #[inline(always)]
    pub fn info_mut(&mut self) -> &mut GeometryInfo {
        &mut self.info
    }

    #[inline(always)]
    pub fn basis(&self) -> CurveBasis {
        self.basis
    }

    /// The number of pieces each segment is split into when tessellated.
    #[inline(always)]
    pub fn tessellation_rate(&self) -> u32 {
        self.tessellation_rate
    }

    /// Set the tessellation rate, truncated and clamped to `1..=16`.
    pub fn set_tessellation_rate(&mut self, rate: f32) {
        self.tessellation_rate = (rate as i32).clamp(1, 16) as u32;
    }

    /// Change the number of time steps; buffers of the remaining steps are kept.
    pub fn set_num_time_steps(&mut self, num_time_steps: u32) -> Result<(), Error> {
        self.info.set_num_time_steps(num_time_steps)?;
        let steps = num_time_steps as usize;
        self.vertices.resize(steps);
        self.normals.resize(steps);
        self.tangents.resize(steps);
        crate::log::debug!(num_time_steps, "resized curve time steps");
        Ok(())
    }

    /// Change the number of user vertex attribute channels.
    pub fn set_vertex_attribute_count(&mut self, count: u32) {
        self.info.set_vertex_attribute_count(count);
        self.vertex_attribs
            .resize(count as usize, BufferView::empty());
    }

    /// Set the index of each curve's first control point.
    pub fn set_curve_buffer(&mut self, curves: BufferView<'buf, u32>) {
        crate::log::trace!(count = curves.len(), "set curve index buffer");
        self.curves = curves;
    }

    /// Set the control points (radius in `w`) of the `itime`th time step.
    pub fn set_vertex_buffer(
        &mut self,
        itime: usize,
        vertices: BufferView<'buf, Vector4<f32>>,
    ) -> Result<(), Error> {
        crate::log::trace!(itime, count = vertices.len(), "set curve vertex buffer");
        self.vertices.set(itime, vertices)
    }

    /// Set the control point normals of the `itime`th time step.
    pub fn set_normal_buffer(
        &mut self,
        itime: usize,
        normals: BufferView<'buf, Vector3<f32>>,
    ) -> Result<(), Error> {
        crate::log::trace!(itime, count = normals.len(), "set curve normal buffer");
        self.normals.set(itime, normals)
    }

    /// Set the control point tangents of the `itime`th time step.
    pub fn set_tangent_buffer(
        &mut self,
        itime: usize,
        tangents: BufferView<'buf, Vector4<f32>>,
    ) -> Result<(), Error> {
        crate::log::trace!(itime, count = tangents.len(), "set curve tangent buffer");
        self.tangents.set(itime, tangents)
    }

    /// Set the per-segment start/end flags.
    pub fn set_flag_buffer(&mut self, flags: BufferView<'buf, u8>) {
        self.flags = flags;
    }

    /// Set the `slot`th user vertex attribute channel.
    pub fn set_vertex_attribute_buffer(
        &mut self,
        slot: usize,
        attribs: BufferView<'buf, Vector4<f32>>,
    ) -> Result<(), Error> {
        let count = self.vertex_attribs.len();
        *self
            .vertex_attribs
            .get_mut(slot)
            .ok_or(Error::AttributeSlotOutOfRange { slot, count })? = attribs;
        Ok(())
    }

    /// The `n`th user vertex attribute channel, if it exists.
    pub fn vertex_attribute(&self, slot: usize) -> Option<&BufferView<'buf, Vector4<f32>>> {
        self.vertex_attribs.get(slot)
    }

    /// Re-cache the first time step of a buffer after it changed.
    pub fn update_buffer(&mut self, slot: BufferSlot) {
        crate::log::trace!(?slot, "refreshing cached curve buffer");
        match slot {
            BufferSlot::Vertex => self.vertices.refresh(),
            BufferSlot::Normal => self.normals.refresh(),
            BufferSlot::Tangent => self.tangents.refresh(),
            _ => {}
        }
    }

    /// The number of control points per time step.
    #[inline(always)]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// The index of the first control point of the `i`th curve.
    #[inline(always)]
    pub fn curve(&self, i: usize) -> u32 {
        self.curves.get(i)
    }

    /// Start/end flags of the `i`th segment, in the top two bits.
    #[inline]
    pub fn start_end_bit_mask(&self, i: usize) -> u32 {
        if self.flags.is_empty() {
            return 0;
        }
        ((self.flags.get(i) & 0x3) as u32) << 30
    }

    /// The `i`th control point of the first time step.
    #[inline(always)]
    pub fn vertex(&self, i: usize) -> Vector4<f32> {
        self.vertices.first().get(i)
    }

    #[inline(always)]
    pub fn normal(&self, i: usize) -> Vector3<f32> {
        self.normals.first().get(i)
    }

    #[inline(always)]
    pub fn tangent(&self, i: usize) -> Vector4<f32> {
        self.tangents.first().get(i)
    }

    /// The radius of the `i`th control point of the first time step.
    #[inline(always)]
    pub fn radius(&self, i: usize) -> f32 {
        self.vertex(i).w
    }

    /// The `i`th control point of the `itime`th time step.
    #[inline(always)]
    pub fn vertex_at(&self, i: usize, itime: usize) -> Vector4<f32> {
        self.vertices.get(i, itime)
    }

    #[inline(always)]
    pub fn normal_at(&self, i: usize, itime: usize) -> Vector3<f32> {
        self.normals.get(i, itime)
    }

    #[inline(always)]
    pub fn tangent_at(&self, i: usize, itime: usize) -> Vector4<f32> {
        self.tangents.get(i, itime)
    }

    #[inline(always)]
    pub fn radius_at(&self, i: usize, itime: usize) -> f32 {
        self.vertex_at(i, itime).w
    }

    /// The address of the `i`th control point of the first time step, for cache hints.
    #[inline(always)]
    pub fn vertex_address(&self, i: usize) -> *const u8 {
        self.vertices.first().address(i)
    }

    /// Blend two gathers around continuous `time`, or take the only one there is.
    #[inline(always)]
    fn blend_steps<T>(
        &self,
        time: f32,
        gather: impl Fn(usize) -> T,
        blend: impl Fn(T, T, f32) -> T,
    ) -> T {
        let num_segments = self.info.time_segments();
        if num_segments <= 0.0 {
            return gather(0);
        }
        let TimeSegment { segment, fraction } = map_time(time, num_segments);
        blend(gather(segment), gather(segment + 1), fraction)
    }

    /// The bezier control points starting at the `i`th vertex of the first time step.
    #[inline]
    pub fn gather(&self, i: usize) -> [Vector4<f32>; 4] {
        std::array::from_fn(|k| self.vertex(i + k))
    }

    /// The bezier control points starting at the `i`th vertex of the `itime`th time step.
    #[inline]
    pub fn gather_step(&self, i: usize, itime: usize) -> [Vector4<f32>; 4] {
        std::array::from_fn(|k| self.vertex_at(i + k, itime))
    }

    /// The bezier control points starting at the `i`th vertex, at continuous `time`.
    #[inline]
    pub fn gather_at(&self, i: usize, time: f32) -> [Vector4<f32>; 4] {
        self.blend_steps(time, |itime| self.gather_step(i, itime), lerp_each)
    }

    /// [gather](Self::gather), plus the normals of the first two control points.
    #[inline]
    pub fn gather_oriented(&self, i: usize) -> ([Vector4<f32>; 4], [Vector3<f32>; 2]) {
        (self.gather(i), [self.normal(i), self.normal(i + 1)])
    }

    #[inline]
    pub fn gather_oriented_step(
        &self,
        i: usize,
        itime: usize,
    ) -> ([Vector4<f32>; 4], [Vector3<f32>; 2]) {
        (
            self.gather_step(i, itime),
            [self.normal_at(i, itime), self.normal_at(i + 1, itime)],
        )
    }

    #[inline]
    pub fn gather_oriented_at(&self, i: usize, time: f32) -> ([Vector4<f32>; 4], [Vector3<f32>; 2]) {
        self.blend_steps(
            time,
            |itime| self.gather_oriented_step(i, itime),
            |(pa, na), (pb, nb), f| (lerp_each(pa, pb, f), lerp_each(na, nb, f)),
        )
    }

    /// The hermite control points starting at the `i`th vertex of the first time step.
    #[inline]
    pub fn gather_hermite(&self, i: usize) -> HermiteSegment {
        HermiteSegment {
            p0: self.vertex(i),
            t0: self.tangent(i),
            p1: self.vertex(i + 1),
            t1: self.tangent(i + 1),
        }
    }

    #[inline]
    pub fn gather_hermite_step(&self, i: usize, itime: usize) -> HermiteSegment {
        HermiteSegment {
            p0: self.vertex_at(i, itime),
            t0: self.tangent_at(i, itime),
            p1: self.vertex_at(i + 1, itime),
            t1: self.tangent_at(i + 1, itime),
        }
    }

    /// The hermite control points starting at the `i`th vertex, at continuous `time`.
    #[inline]
    pub fn gather_hermite_at(&self, i: usize, time: f32) -> HermiteSegment {
        self.blend_steps(time, |itime| self.gather_hermite_step(i, itime), lerp)
    }

    /// [gather_hermite](Self::gather_hermite), plus the normals of both control points.
    #[inline]
    pub fn gather_hermite_oriented(&self, i: usize) -> (HermiteSegment, [Vector3<f32>; 2]) {
        (self.gather_hermite(i), [self.normal(i), self.normal(i + 1)])
    }

    #[inline]
    pub fn gather_hermite_oriented_step(
        &self,
        i: usize,
        itime: usize,
    ) -> (HermiteSegment, [Vector3<f32>; 2]) {
        (
            self.gather_hermite_step(i, itime),
            [self.normal_at(i, itime), self.normal_at(i + 1, itime)],
        )
    }

    #[inline]
    pub fn gather_hermite_oriented_at(
        &self,
        i: usize,
        time: f32,
    ) -> (HermiteSegment, [Vector3<f32>; 2]) {
        self.blend_steps(
            time,
            |itime| self.gather_hermite_oriented_step(i, itime),
            |(ha, na), (hb, nb), f| (lerp(ha, hb, f), lerp_each(na, nb, f)),
        )
    }

    /// Commit-time check that every buffer the basis needs is present and consistent, and that
    /// every control point is finite with a non-negative radius.
    pub fn verify(&self) -> Result<(), Error> {
        let num_vertices = self.num_vertices();
        self.vertices.check_counts(BufferSlot::Vertex)?;
        if self.basis == CurveBasis::Hermite {
            if self.tangents.is_empty() && num_vertices > 0 {
                return Err(Error::MissingBuffer(BufferSlot::Tangent));
            }
            check_len(&self.tangents, BufferSlot::Tangent, num_vertices)?;
        }
        if !self.normals.is_empty() {
            check_len(&self.normals, BufferSlot::Normal, num_vertices)?;
        }
        if !self.flags.is_empty() && self.flags.len() < self.curves.len() {
            return Err(Error::MismatchedElementCount {
                slot: BufferSlot::Flags,
                itime: 0,
                expected: self.curves.len(),
                actual: self.flags.len(),
            });
        }
        for (itime, view) in self.vertices.iter().enumerate() {
            if let Some(index) = view.iter().position(|p| !is_finite4(&p) || p.w < 0.0) {
                crate::log::warning!(itime, index, "curves have an unusable control point");
                return Err(Error::InvalidElement {
                    slot: BufferSlot::Vertex,
                    itime,
                    index,
                });
            }
        }
        if self.basis == CurveBasis::Hermite {
            for (itime, view) in self.tangents.iter().enumerate() {
                if let Some(index) = view.iter().position(|t| !is_finite4(&t)) {
                    crate::log::warning!(itime, index, "curves have an unusable tangent");
                    return Err(Error::InvalidElement {
                        slot: BufferSlot::Tangent,
                        itime,
                        index,
                    });
                }
            }
        }
        Ok(())
    }

    /// Bounds of the segment whose control points are `cp`: their hull, grown by the largest
    /// radius. A bezier segment never leaves the hull of its control points.
    #[inline]
    fn segment_bounds(cp: &[Vector4<f32>; 4]) -> Aabb<f32> {
        let mut res = Aabb::empty();
        let mut radius = 0.0f32;
        for p in cp {
            res.extend(&Point3::new(p.x, p.y, p.z));
            radius = radius.max(p.w.abs());
        }
        res.dilated(radius)
    }
}

fn check_len<T: crate::buffer::Element>(
    series: &TimeSeries<'_, T>,
    slot: BufferSlot,
    expected: usize,
) -> Result<(), Error> {
    series.check_counts(slot)?;
    if series.len() != expected {
        return Err(Error::MismatchedElementCount {
            slot,
            itime: 0,
            expected,
            actual: series.len(),
        });
    }
    Ok(())
}

#[inline(always)]
fn is_finite4(v: &Vector4<f32>) -> bool {
    v.x.is_finite() && v.y.is_finite() && v.z.is_finite() && v.w.is_finite()
}

#[inline(always)]
fn is_finite3(v: &Vector3<f32>) -> bool {
    v.x.is_finite() && v.y.is_finite() && v.z.is_finite()
}

impl<'buf> Primitives for Curves<'buf> {
    #[inline(always)]
    fn info(&self) -> &GeometryInfo {
        &self.info
    }

    #[inline(always)]
    fn len(&self) -> usize {
        self.curves.len()
    }

    #[inline]
    fn bounds(&self, i: usize, itime: usize) -> Aabb<f32> {
        let start = self.curve(i) as usize;
        let cp = match self.basis {
            CurveBasis::Bezier => self.gather_step(start, itime),
            CurveBasis::Hermite => self.gather_hermite_step(start, itime).to_bezier(),
        };
        Self::segment_bounds(&cp)
    }

    #[inline]
    fn first_bounds(&self, i: usize) -> Aabb<f32> {
        let start = self.curve(i) as usize;
        let cp = match self.basis {
            CurveBasis::Bezier => self.gather(start),
            CurveBasis::Hermite => self.gather_hermite(start).to_bezier(),
        };
        Self::segment_bounds(&cp)
    }

    #[inline]
    fn valid_range(&self, i: usize, itime_lower: usize, itime_upper: usize) -> bool {
        let start = self.curve(i) as usize;
        let end = start + self.basis.control_points();
        let hermite = self.basis == CurveBasis::Hermite;
        let oriented = !self.normals.is_empty();
        if end > self.num_vertices()
            || (hermite && end > self.tangents.len())
            || (oriented && start + 2 > self.normals.len())
        {
            return false;
        }
        let itime_upper = itime_upper.min(self.info.num_time_steps() - 1);
        if itime_lower > itime_upper {
            return false;
        }
        (itime_lower..=itime_upper).all(|itime| {
            (start..end).all(|k| {
                is_finite4(&self.vertex_at(k, itime))
                    && (!hermite || is_finite4(&self.tangent_at(k, itime)))
            }) && (!oriented || (start..start + 2).all(|k| is_finite3(&self.normal_at(k, itime))))
        })
    }
}

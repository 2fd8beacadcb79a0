use std::fmt;

use nalgebra::{Point3, Vector4};

use crate::{
    bounds::Aabb,
    buffer::{BufferView, TimeSeries},
    geometry::{BufferSlot, GeometryInfo, Primitives},
    topology::{shared_edge, SharedEdge},
    Error,
};

/// Vertex indices of one triangle.
///
/// Indices aren't checked against the vertex count until a primitive is queried.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Triangle {
    /// Vertex indices, in winding order
    pub v: [u32; 3],
}

impl Triangle {
    #[inline]
    pub const fn new(v0: u32, v1: u32, v2: u32) -> Self {
        Self { v: [v0, v1, v2] }
    }
}

impl From<[u32; 3]> for Triangle {
    fn from(v: [u32; 3]) -> Self {
        Self { v }
    }
}

impl fmt::Display for Triangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Triangle {{ {}, {}, {} }}", self.v[0], self.v[1], self.v[2])
    }
}

/// Which per-vertex data to [interpolate](TriangleMesh::interpolate) across a triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterpolationSource {
    /// Positions of the first time step, with `w = 0`
    Vertex,
    /// The `n`th user vertex attribute channel
    VertexAttribute(usize),
}

/// A value interpolated across a triangle, with its derivatives along the barycentric `u` and
/// `v` directions. Second derivatives of a linear triangle are always zero, so they're omitted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interpolated {
    /// The interpolated value.
    pub value: Vector4<f32>,
    /// Derivative along `u`.
    pub du: Vector4<f32>,
    /// Derivative along `v`.
    pub dv: Vector4<f32>,
}

/// A triangle mesh whose vertices may move across several time steps.
#[derive(Debug, Clone)]
pub struct TriangleMesh<'buf> {
    info: GeometryInfo,
    triangles: BufferView<'buf, Triangle>,
    vertices: TimeSeries<'buf, Point3<f32>>,
    vertex_attribs: Vec<BufferView<'buf, Vector4<f32>>>,
}

impl<'buf> TriangleMesh<'buf> {
    /// Construct a mesh sampled at `num_time_steps` time steps, with no buffers set.
    pub fn new(num_time_steps: u32) -> Result<Self, Error> {
        Ok(Self {
            info: GeometryInfo::new(num_time_steps)?,
            triangles: BufferView::empty(),
            vertices: TimeSeries::new(num_time_steps as usize),
            vertex_attribs: Vec::new(),
        })
    }

    /// Mutable access to the shared settings.
    #[inline(always)]
    pub fn info_mut(&mut self) -> &mut GeometryInfo {
        &mut self.info
    }

    /// Change the number of time steps; vertex buffers of the remaining steps are kept.
    pub fn set_num_time_steps(&mut self, num_time_steps: u32) -> Result<(), Error> {
        self.info.set_num_time_steps(num_time_steps)?;
        self.vertices.resize(num_time_steps as usize);
        crate::log::debug!(num_time_steps, "resized triangle mesh time steps");
        Ok(())
    }

    /// Change the number of user vertex attribute channels.
    pub fn set_vertex_attribute_count(&mut self, count: u32) {
        self.info.set_vertex_attribute_count(count);
        self.vertex_attribs
            .resize(count as usize, BufferView::empty());
    }

    /// Set the triangles.
    pub fn set_index_buffer(&mut self, triangles: BufferView<'buf, Triangle>) {
        crate::log::trace!(count = triangles.len(), "set triangle index buffer");
        self.triangles = triangles;
    }

    /// Set the vertex positions of the `itime`th time step.
    pub fn set_vertex_buffer(
        &mut self,
        itime: usize,
        vertices: BufferView<'buf, Point3<f32>>,
    ) -> Result<(), Error> {
        crate::log::trace!(itime, count = vertices.len(), "set triangle vertex buffer");
        self.vertices.set(itime, vertices)
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

    /// Re-cache the first time step of a buffer after it changed.
    pub fn update_buffer(&mut self, slot: BufferSlot) {
        if slot == BufferSlot::Vertex {
            crate::log::trace!("refreshing cached triangle vertices");
            self.vertices.refresh();
        }
    }

    /// The number of vertices per time step.
    #[inline(always)]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// The vertex indices of the `i`th triangle.
    #[inline(always)]
    pub fn triangle(&self, i: usize) -> Triangle {
        self.triangles.get(i)
    }

    /// The `i`th vertex of the first time step.
    #[inline(always)]
    pub fn vertex(&self, i: usize) -> Point3<f32> {
        self.vertices.first().get(i)
    }

    /// The `i`th vertex of the `itime`th time step.
    #[inline(always)]
    pub fn vertex_at(&self, i: usize, itime: usize) -> Point3<f32> {
        self.vertices.get(i, itime)
    }

    /// The address of the `i`th vertex of the `itime`th time step, for cache hints.
    #[inline(always)]
    pub fn vertex_address(&self, i: usize, itime: usize) -> *const u8 {
        self.vertices.step(itime).address(i)
    }

    /// Look for an edge shared by the `i`th and `j`th triangles.
    #[inline]
    pub fn shared_edge(&self, i: usize, j: usize) -> Option<SharedEdge> {
        shared_edge(&self.triangle(i), &self.triangle(j))
    }

    /// Interpolate per-vertex data across the `prim`th triangle at barycentric `(u, v)`.
    ///
    /// Returns `None` if the triangle references vertices missing from `source`, or if `source`
    /// names a channel that doesn't exist.
    pub fn interpolate(
        &self,
        prim: usize,
        u: f32,
        v: f32,
        source: InterpolationSource,
    ) -> Option<Interpolated> {
        let tri = self.triangle(prim);
        let [p0, p1, p2] = match source {
            InterpolationSource::Vertex => {
                let first = self.vertices.first();
                if tri.v.iter().any(|&vi| vi as usize >= first.len()) {
                    return None;
                }
                tri.v.map(|vi| {
                    let p = first.get(vi as usize);
                    Vector4::new(p.x, p.y, p.z, 0.0)
                })
            }
            InterpolationSource::VertexAttribute(slot) => {
                let attribs = self.vertex_attribs.get(slot)?;
                if tri.v.iter().any(|&vi| vi as usize >= attribs.len()) {
                    return None;
                }
                tri.v.map(|vi| attribs.get(vi as usize))
            }
        };
        let w = 1.0 - u - v;
        Some(Interpolated {
            value: p0 * w + p1 * u + p2 * v,
            du: p1 - p0,
            dv: p2 - p0,
        })
    }

    /// Commit-time check that every time step holds the same number of vertices and that all
    /// of them are finite.
    pub fn verify(&self) -> Result<(), Error> {
        self.vertices.check_counts(BufferSlot::Vertex)?;
        for (itime, view) in self.vertices.iter().enumerate() {
            if let Some(index) = view.iter().position(|p| !is_finite(&p)) {
                crate::log::warning!(itime, index, "triangle mesh has an unusable vertex");
                return Err(Error::InvalidElement {
                    slot: BufferSlot::Vertex,
                    itime,
                    index,
                });
            }
        }
        Ok(())
    }
}

#[inline(always)]
fn is_finite(p: &Point3<f32>) -> bool {
    p.x.is_finite() && p.y.is_finite() && p.z.is_finite()
}

impl<'buf> Primitives for TriangleMesh<'buf> {
    #[inline(always)]
    fn info(&self) -> &GeometryInfo {
        &self.info
    }

    #[inline(always)]
    fn len(&self) -> usize {
        self.triangles.len()
    }

    #[inline]
    fn bounds(&self, i: usize, itime: usize) -> Aabb<f32> {
        let tri = self.triangle(i);
        let v0 = self.vertex_at(tri.v[0] as usize, itime);
        let v1 = self.vertex_at(tri.v[1] as usize, itime);
        let v2 = self.vertex_at(tri.v[2] as usize, itime);
        Aabb::new(v0.inf(&v1).inf(&v2), v0.sup(&v1).sup(&v2))
    }

    #[inline]
    fn first_bounds(&self, i: usize) -> Aabb<f32> {
        let tri = self.triangle(i);
        let v0 = self.vertex(tri.v[0] as usize);
        let v1 = self.vertex(tri.v[1] as usize);
        let v2 = self.vertex(tri.v[2] as usize);
        Aabb::new(v0.inf(&v1).inf(&v2), v0.sup(&v1).sup(&v2))
    }

    #[inline]
    fn valid_range(&self, i: usize, itime_lower: usize, itime_upper: usize) -> bool {
        let tri = self.triangle(i);
        let num_vertices = self.num_vertices();
        if tri.v.iter().any(|&v| v as usize >= num_vertices) {
            return false;
        }
        let itime_upper = itime_upper.min(self.info.num_time_steps() - 1);
        if itime_lower > itime_upper {
            return false;
        }
        (itime_lower..=itime_upper).all(|itime| {
            tri.v
                .iter()
                .all(|&v| is_finite(&self.vertex_at(v as usize, itime)))
        })
    }
}

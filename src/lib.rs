//! Deformable primitive geometry for ray tracing: triangle meshes and cubic curves whose
//! vertices are sampled at several time steps, with the time-interpolation, bounding, and
//! adjacency queries acceleration structure builders need.
//!
//! Vertex data is never copied; geometries hold strided [views](buffer::BufferView) into
//! caller-owned memory.
#![cfg_attr(not(debug_assertions), warn(missing_docs))]

pub mod bounds;
pub mod buffer;
pub mod error;
pub mod geometry;
mod log;
pub mod time;
pub mod topology;

pub use bounds::{Aabb, LinearAabb};
pub use buffer::{BufferView, TimeSeries};
pub use error::Error;
pub use geometry::{
    BufferSlot, CurveBasis, Curves, Geometry, GeometryInfo, Primitives, Triangle, TriangleMesh,
};
pub use time::{TimeRange, TimeSegment};
pub use topology::{shared_edge, Edge, SharedEdge};

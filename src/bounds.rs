//! Axis-aligned bounds of primitives, both at discrete time steps and moving linearly through
//! time.

mod aabb;
pub use aabb::*;
mod linear;
pub use linear::*;
pub mod motion;
mod traits;
pub use traits::*;

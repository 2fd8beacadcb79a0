use rtgeom_common::item_with;

mod sealed {
    pub trait Sealed {}
}

/// Scalar types a bounding box may be stored in.
///
/// Primitive queries always produce `Aabb<f32>`; `f64` is there for callers merging many boxes
/// who'd rather not round at every step. Sealed, since [Aabb](super::Aabb)'s empty box and
/// containment tests assume IEEE float semantics.
pub trait Float:
    sealed::Sealed
    + num_traits::Float
    + nalgebra::Scalar
    + simba::simd::SimdPartialOrd
    + std::ops::AddAssign
    + std::ops::SubAssign
    + std::ops::MulAssign
    + Send
    + Sync
{
    const ZERO: Self;
    const ONE: Self;
    const HALF: Self;

    /// The lowest finite value; the upper corner of an empty box.
    const LOWEST: Self;
    /// The highest finite value; the lower corner of an empty box.
    const HIGHEST: Self;

    /// Widen (or keep) an `f32`, e.g. a time step's position within a range.
    fn from_f32(v: f32) -> Self;
}

item_with! {Real: f32, f64 => impl sealed::Sealed for Real {}}

item_with! {Real: f32, f64 => impl Float for Real {
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;
    const HALF: Self = 0.5;

    const LOWEST: Self = Self::MIN;
    const HIGHEST: Self = Self::MAX;

    #[inline(always)]
    fn from_f32(v: f32) -> Self {
        v as Real
    }
}}

use super::{Aabb, Float};

/// Bounds moving linearly through a time interval: [bounds0](Self::bounds0) at its start and
/// [bounds1](Self::bounds1) at its end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearAabb<Real: Float> {
    pub bounds0: Aabb<Real>,
    pub bounds1: Aabb<Real>,
}

impl<Real: Float> LinearAabb<Real> {
    #[inline]
    pub fn new(bounds0: Aabb<Real>, bounds1: Aabb<Real>) -> Self {
        Self { bounds0, bounds1 }
    }

    /// Bounds which don't move.
    #[inline]
    pub fn fixed(bounds: Aabb<Real>) -> Self {
        Self {
            bounds0: bounds,
            bounds1: bounds,
        }
    }

    /// The bounds at relative time `t` within the interval.
    #[inline]
    pub fn interpolate(&self, t: f32) -> Aabb<Real> {
        self.bounds0.blend(&self.bounds1, Real::from_f32(t))
    }

    /// The smallest static box containing the moving bounds over the whole interval.
    #[inline]
    pub fn global(&self) -> Aabb<Real> {
        self.bounds0.merged(&self.bounds1)
    }
}

impl<Real: Float> From<Aabb<Real>> for LinearAabb<Real> {
    fn from(bounds: Aabb<Real>) -> Self {
        Self::fixed(bounds)
    }
}

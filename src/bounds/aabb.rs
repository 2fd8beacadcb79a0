use nalgebra::{point, Point3, Vector3};
use rtgeom_common::{impl_op, item_with};

use super::Float;

/// Axis-Aligned Bounding Box
///
/// Generic over the Real type; primitive queries produce `Aabb<f32>`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb<Real: Float> {
    /// Lower corner
    pub mins: Point3<Real>,
    /// Upper corner
    pub maxs: Point3<Real>,
}

impl<Real: Float> Default for Aabb<Real> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<Real: Float> Aabb<Real> {
    #[inline]
    pub fn new(mins: Point3<Real>, maxs: Point3<Real>) -> Self {
        Self { mins, maxs }
    }

    /// An inverted box which contains nothing, such that extending it by any point yields a box
    /// around just that point.
    #[inline]
    pub fn empty() -> Self {
        Self {
            mins: point![Real::HIGHEST, Real::HIGHEST, Real::HIGHEST],
            maxs: point![Real::LOWEST, Real::LOWEST, Real::LOWEST],
        }
    }

    /// The smallest box containing every point of `points`.
    pub fn from_points(points: impl IntoIterator<Item = Point3<Real>>) -> Self {
        points.into_iter().fold(Self::empty(), |mut res, p| {
            res.extend(&p);
            res
        })
    }

    /// Whether `self` contains no points at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        let Self { mins: i, maxs: a } = self;
        i.x > a.x || i.y > a.y || i.z > a.z
    }

    /// Whether `p` lies within `self`, boundary included.
    #[inline]
    pub fn contains(&self, p: &Point3<Real>) -> bool {
        let Self { mins: i, maxs: a } = self;
        (p.x >= i.x && p.y >= i.y && p.z >= i.z) && (p.x <= a.x && p.y <= a.y && p.z <= a.z)
    }

    /// Determine whether `other` lies entirely within `self`.
    #[inline]
    pub fn contains_aabb(&self, other: &Self) -> bool {
        self.contains(&other.mins) && self.contains(&other.maxs)
    }

    /// Determine the center of `self`.
    #[inline]
    pub fn center(&self) -> Point3<Real> {
        let Self { mins: i, maxs: a } = self;
        point![
            (i.x + a.x) * Real::HALF,
            (i.y + a.y) * Real::HALF,
            (i.z + a.z) * Real::HALF
        ]
    }

    /// The extent of `self` along each axis.
    #[inline]
    pub fn size(&self) -> Vector3<Real> {
        self.maxs.coords.zip_map(&self.mins.coords, |a, i| a - i)
    }

    /// Grow `self` such that it contains `p`.
    #[inline]
    pub fn extend(&mut self, p: &Point3<Real>) {
        self.mins = self.mins.inf(p);
        self.maxs = self.maxs.sup(p);
    }

    /// The smallest box containing both `self` and `other`.
    #[inline]
    pub fn merged(&self, other: &Self) -> Self {
        Self {
            mins: self.mins.inf(&other.mins),
            maxs: self.maxs.sup(&other.maxs),
        }
    }

    /// Move the lower corner of `self` by `lower` and the upper corner by `upper`.
    #[inline]
    pub fn shift_corners(&mut self, lower: &Vector3<Real>, upper: &Vector3<Real>) {
        self.mins.coords = self.mins.coords.zip_map(lower, |m, d| m + d);
        self.maxs.coords = self.maxs.coords.zip_map(upper, |m, d| m + d);
    }

    /// Grow `self` by `r` in every direction.
    #[inline]
    pub fn dilated(&self, r: Real) -> Self {
        Self {
            mins: self.mins.map(|m| m - r),
            maxs: self.maxs.map(|m| m + r),
        }
    }

    /// Whether every coordinate of `self` is finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.mins.iter().chain(self.maxs.iter()).all(|c| c.is_finite())
    }

    /// Combine the corners of `self` and `other` coordinate by coordinate.
    #[inline]
    pub fn zip_map(&self, other: &Self, f: impl Fn(Real, Real) -> Real) -> Self {
        Self {
            mins: self.mins.coords.zip_map(&other.mins.coords, &f).into(),
            maxs: self.maxs.coords.zip_map(&other.maxs.coords, &f).into(),
        }
    }

    /// Scale every coordinate of `self` by `s`.
    #[inline]
    pub fn scaled(&self, s: Real) -> Self {
        Self {
            mins: self.mins.map(|m| m * s),
            maxs: self.maxs.map(|m| m * s),
        }
    }

    /// Blend the corners of `self` towards those of `other` by `t`, as `self * (1 - t) + other * t`.
    #[inline]
    pub fn blend(&self, other: &Self, t: Real) -> Self {
        let s = Real::ONE - t;
        self.zip_map(other, |a, b| a * s + b * t)
    }
}

// operators, so that boxes can go through the same `lerp` as any other time-sampled value
item_with! {Real: f32, f64 => impl_op! {Mul, mul, MulAssign, mul_assign;
    self: Aabb<Real>, rhs: Real;
    self.scaled(rhs.to_owned());
    *self = self.scaled(rhs.to_owned())}}

item_with! {Real: f32, f64 => impl_op! {Add, add, AddAssign, add_assign;
    self: Aabb<Real>, rhs: Aabb<Real>;
    self.zip_map(&rhs, |a, b| a + b);
    *self = self.zip_map(&rhs, |a, b| a + b)}}

//! Bounds of primitives moving through time, computed from their per-step bounds.
//!
//! Every function here takes the per-step bounds of a single primitive as a closure, so the
//! same code serves every kind of geometry without any dynamic dispatch. `num_segments` is
//! always the pre-divided `num_time_steps - 1` of the primitive's geometry.

use nalgebra::Vector3;

use crate::{
    bounds::{Aabb, LinearAabb},
    time::{lerp, map_time, step_time, TimeRange, TimeSegment},
};

/// Approximate bounds at continuous `time`: the blend of the bounds at the two time steps
/// around it.
///
/// This is a first-order approximation of the swept bounds; motion between steps isn't linear
/// in general.
#[inline]
pub fn bounds_at(time: f32, num_segments: f32, bounds: impl Fn(usize) -> Aabb<f32>) -> Aabb<f32> {
    if num_segments <= 0.0 {
        return bounds(0);
    }
    let TimeSegment { segment, fraction } = map_time(time, num_segments);
    lerp(bounds(segment), bounds(segment + 1), fraction)
}

/// Conservative linear bounds over `range`.
///
/// Starts from the [approximate bounds](bounds_at) at both ends of `range`, then for each time
/// step within `range` pushes both ends outward by however far the true bounds at that step
/// stick out of the interpolated ones. Corrections only ever grow the result, so every step
/// checked earlier stays contained.
pub fn linear_bounds(
    range: TimeRange,
    num_segments: f32,
    bounds: impl Fn(usize) -> Aabb<f32>,
) -> LinearAabb<f32> {
    if num_segments <= 0.0 {
        return LinearAabb::fixed(bounds(0));
    }
    let mut b0 = bounds_at(range.lower, num_segments, &bounds);
    let mut b1 = bounds_at(range.upper, num_segments, &bounds);
    let size = range.size();
    let ilower = (range.lower * num_segments).ceil().max(0.0);
    let iupper = (range.upper * num_segments).floor().min(num_segments);
    if !(ilower <= iupper) {
        return LinearAabb::new(b0, b1);
    }
    for itime in ilower as usize..=iupper as usize {
        let f = if size > 0.0 {
            (step_time(itime, num_segments) - range.lower) / size
        } else {
            0.0
        };
        let bt = lerp(b0, b1, f);
        let bi = bounds(itime);
        let dlower: Vector3<f32> = bi.mins.coords.zip_map(&bt.mins.coords, |i, t| (i - t).min(0.0));
        let dupper: Vector3<f32> = bi.maxs.coords.zip_map(&bt.maxs.coords, |i, t| (i - t).max(0.0));
        b0.shift_corners(&dlower, &dupper);
        b1.shift_corners(&dlower, &dupper);
    }
    LinearAabb::new(b0, b1)
}

/// The inclusive range of time steps whose data contributes to bounds over `range`.
#[inline]
pub fn covering_steps(range: TimeRange, num_segments: f32) -> (usize, usize) {
    let lower = (range.lower * num_segments).floor().max(0.0).min(num_segments);
    let upper = (range.upper * num_segments).ceil().max(lower).min(num_segments);
    (lower as usize, upper as usize)
}

/// Bounds for building the `itime_global`th of `num_global` time steps of a structure, from a
/// primitive sampled at `num_local` time steps.
///
/// `valid_bounds` yields the bounds at a local time step, or `None` if the primitive is unusable
/// there. A global step past the last one has no bounds. When the samplings differ, the global
/// step's time is mapped onto the local sampling and both local steps around it must be usable.
pub fn build_bounds_segment(
    itime_global: usize,
    num_global: usize,
    num_local: usize,
    valid_bounds: impl Fn(usize) -> Option<Aabb<f32>>,
) -> Option<Aabb<f32>> {
    if itime_global >= num_global {
        return None;
    }
    if num_global == num_local {
        return valid_bounds(itime_global);
    }
    if num_local <= 1 {
        return valid_bounds(0);
    }
    let time = step_time(itime_global, num_global.saturating_sub(1) as f32);
    let TimeSegment { segment, fraction } = map_time(time, (num_local - 1) as f32);
    let b0 = valid_bounds(segment)?;
    let b1 = valid_bounds(segment + 1)?;
    Some(lerp(b0, b1, fraction))
}

#[cfg(test)]
mod test {
    use nalgebra::point;

    use super::{bounds_at, build_bounds_segment, covering_steps, linear_bounds};
    use crate::{bounds::Aabb, time::TimeRange};

    /// A unit box which jumps up by 10 at the middle of three steps.
    fn spike(itime: usize) -> Aabb<f32> {
        let y = if itime == 1 { 10.0 } else { 0.0 };
        Aabb::new(point![0.0, y, 0.0], point![1.0, y + 1.0, 1.0])
    }

    #[test]
    fn approximate() {
        let b = bounds_at(0.25, 2.0, spike);
        assert_eq!(b, Aabb::new(point![0.0, 5.0, 0.0], point![1.0, 6.0, 1.0]));
        assert_eq!(bounds_at(0.9, 0.0, spike), spike(0));
    }

    #[test]
    fn conservative_spike() {
        let lb = linear_bounds(TimeRange::FULL, 2.0, spike);
        for itime in 0..3 {
            let t = itime as f32 / 2.0;
            assert!(lb.interpolate(t).contains_aabb(&spike(itime)));
        }
        // both ends grow by the same amount
        assert_eq!(lb.bounds0.size(), lb.bounds1.size());
    }

    #[test]
    fn degenerate_range() {
        let lb = linear_bounds(TimeRange::new(0.5, 0.5), 2.0, spike);
        assert!(lb.bounds0.contains_aabb(&spike(1)));
    }

    #[test]
    fn covering() {
        assert_eq!(covering_steps(TimeRange::FULL, 4.0), (0, 4));
        assert_eq!(covering_steps(TimeRange::new(0.3, 0.6), 4.0), (1, 3));
        assert_eq!(covering_steps(TimeRange::new(0.25, 0.5), 4.0), (1, 2));
        assert_eq!(covering_steps(TimeRange::new(0.2, 0.7), 0.0), (0, 0));
    }

    #[test]
    fn build_segment() {
        let valid = |itime: usize| (itime != 2).then(|| spike(itime));
        assert_eq!(build_bounds_segment(1, 3, 3, valid), Some(spike(1)));
        assert_eq!(build_bounds_segment(2, 3, 3, valid), None);
        // global step 1 of 5 sits halfway between local steps 0 and 1
        assert_eq!(
            build_bounds_segment(1, 5, 3, valid),
            Some(Aabb::new(point![0.0, 5.0, 0.0], point![1.0, 6.0, 1.0]))
        );
        assert_eq!(build_bounds_segment(3, 5, 3, valid), None);
        assert_eq!(build_bounds_segment(3, 5, 1, valid), Some(spike(0)));
        // steps past the last one are never handed to `valid_bounds`
        let strict = |itime: usize| {
            assert!(itime < 3);
            Some(spike(itime))
        };
        assert_eq!(build_bounds_segment(3, 3, 3, strict), None);
        assert_eq!(build_bounds_segment(5, 5, 3, strict), None);
    }
}

//! Mapping continuous time onto discrete time steps.
//!
//! A geometry with `N` time steps has `N - 1` segments; time step `i` sits at parametric time
//! `i / (N - 1)` within `[0, 1]`.

use std::ops::{Add, Mul};

/// The segment of a time-sampled attribute containing some point in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSegment {
    /// Index of the time step at the start of the segment. `segment + 1` is always a valid time
    /// step whenever there are at least two.
    pub segment: usize,
    /// Position within the segment; `0` at `segment`, `1` at `segment + 1`.
    pub fraction: f32,
}

/// Map `time` onto one of `num_segments` equal segments of `[0, 1]`.
///
/// `time` is clamped to `[0, 1]` (NaN maps to `0`), so the result always describes a valid
/// segment. `num_segments` is the pre-divided `num_time_steps - 1`.
#[inline]
pub fn map_time(time: f32, num_segments: f32) -> TimeSegment {
    let time = time.max(0.0).min(1.0);
    let scaled = time * num_segments;
    let segment = scaled.floor().max(0.0).min((num_segments - 1.0).max(0.0));
    TimeSegment {
        segment: segment as usize,
        fraction: scaled - segment,
    }
}

/// The parametric time of the `itime`th time step.
#[inline]
pub fn step_time(itime: usize, num_segments: f32) -> f32 {
    if num_segments > 0.0 {
        itime as f32 / num_segments
    } else {
        0.0
    }
}

/// Blend `a` towards `b` by `f`, as `a * (1 - f) + b * f`.
///
/// Unlike `a + (b - a) * f`, this reproduces `a` exactly at `f = 0` and `b` exactly at `f = 1`.
#[inline(always)]
pub fn lerp<V>(a: V, b: V, f: f32) -> V
where
    V: Mul<f32, Output = V> + Add<Output = V>,
{
    a * (1.0 - f) + b * f
}

/// A closed interval of parametric time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    /// Start of the interval.
    pub lower: f32,
    /// End of the interval.
    pub upper: f32,
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::FULL
    }
}

impl TimeRange {
    /// The whole shutter interval.
    pub const FULL: Self = Self {
        lower: 0.0,
        upper: 1.0,
    };

    /// The interval `lower..=upper`.
    #[inline]
    pub fn new(lower: f32, upper: f32) -> Self {
        Self { lower, upper }
    }

    /// The time range covered by the `itime`th of `num_segments` segments.
    #[inline]
    pub fn segment(itime: usize, num_segments: usize) -> Self {
        let n = num_segments as f32;
        Self {
            lower: itime as f32 / n,
            upper: (itime + 1) as f32 / n,
        }
    }

    /// The length of the interval.
    #[inline]
    pub fn size(&self) -> f32 {
        self.upper - self.lower
    }

    /// Whether `time` lies within the closed interval.
    #[inline]
    pub fn contains(&self, time: f32) -> bool {
        time >= self.lower && time <= self.upper
    }
}

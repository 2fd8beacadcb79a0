use crate::geometry::BufferSlot;

/// Errors raised while registering buffers or committing a geometry.
///
/// Queries made while building or traversing an acceleration structure never produce these;
/// an unusable primitive is reported by returning `None` instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A view would read past the end of its storage.
    #[error("buffer view out of range of storage: {offset} + ({count} - 1) * {stride} + {size} > {len}")]
    RangeOverflow {
        offset: usize,
        stride: usize,
        count: usize,
        size: usize,
        len: usize,
    },
    /// Consecutive elements of a view would overlap.
    #[error("buffer view stride {stride} is smaller than its element size {size}")]
    StrideTooSmall { stride: usize, size: usize },
    /// A time step index was at or past the number of time steps.
    #[error("time step out of range: 0..{num_time_steps} ∌ {itime}")]
    TimeStepOutOfRange { itime: usize, num_time_steps: usize },
    /// A geometry was asked for zero time steps, or too many.
    #[error("invalid number of time steps: 1..={max} ∌ {0}", max = crate::geometry::MAX_TIME_STEPS)]
    InvalidTimeStepCount(u32),
    /// A user vertex attribute slot was at or past the configured count.
    #[error("user vertex attribute slot out of range: 0..{count} ∌ {slot}")]
    AttributeSlotOutOfRange { slot: usize, count: usize },
    /// A time step holds a different number of elements than expected.
    #[error("buffer {slot:?} at time step {itime} holds {actual} elements, expected {expected}")]
    MismatchedElementCount {
        slot: BufferSlot,
        itime: usize,
        expected: usize,
        actual: usize,
    },
    /// A buffer the geometry needs was never provided.
    #[error("required buffer {0:?} was never set")]
    MissingBuffer(BufferSlot),
    /// An element is non-finite, or otherwise unusable.
    #[error("element {index} of buffer {slot:?} at time step {itime} is not usable")]
    InvalidElement {
        slot: BufferSlot,
        itime: usize,
        index: usize,
    },
}

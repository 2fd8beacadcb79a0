//! Non-owning, strided read views over attribute storage owned by someone else.

mod series;
pub use series::*;

use std::{fmt, marker::PhantomData, mem::size_of};

use nalgebra::{Point3, Point4, Vector3, Vector4};

use crate::{geometry::Triangle, Error};

/// Trait for types which can be read directly out of raw attribute storage.
///
/// # Safety
///
/// Implementing types must contain no padding and must be valid for every possible bit pattern;
/// i.e. they must be plain aggregates of `u8`, `u32`, or `f32`. A [BufferView] reinterprets the
/// bytes of its storage as `Self` without any validation.
#[allow(unsafe_code)]
pub unsafe trait Element: Copy + 'static {}

macro_rules! impl_element {
    ($($Target:ty: [$Scalar:ty; $n:literal]),+ $(,)?) => {
        $(
            // "size of $Target == size of $n tightly packed $Scalar"
            static_assertions::const_assert_eq!(size_of::<$Target>(), size_of::<$Scalar>() * $n);
            #[allow(unsafe_code)]
            unsafe impl Element for $Target {}
        )+
    };
}

impl_element! {
    u8: [u8; 1],
    u32: [u32; 1],
    f32: [f32; 1],
    [u32; 3]: [u32; 3],
    [f32; 3]: [f32; 3],
    [f32; 4]: [f32; 4],
    Point3<f32>: [f32; 3],
    Vector3<f32>: [f32; 3],
    Point4<f32>: [f32; 4],
    Vector4<f32>: [f32; 4],
    Triangle: [u32; 3],
}

/// A typed, strided window into a byte buffer owned elsewhere.
///
/// Element `i` lives at `offset + i * stride`. The view never copies or frees its storage; it
/// only borrows it, so any number of views may alias the same bytes (e.g. interleaved vertex
/// attributes).
///
/// Indexing past [len](Self::len) is a caller error. Debug builds assert against it; release
/// builds only keep reads within the borrowed storage.
#[derive(Clone, Copy)]
pub struct BufferView<'buf, T: Element> {
    data: &'buf [u8],
    offset: usize,
    stride: usize,
    count: usize,
    _ty: PhantomData<T>,
}

impl<'buf, T: Element> fmt::Debug for BufferView<'buf, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferView")
            .field("storage", &self.data.as_ptr())
            .field("offset", &self.offset)
            .field("stride", &self.stride)
            .field("count", &self.count)
            .finish()
    }
}

impl<'buf, T: Element> Default for BufferView<'buf, T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'buf, T: Element> BufferView<'buf, T> {
    /// A view of zero elements, standing in for a buffer which hasn't been set.
    #[inline]
    pub const fn empty() -> Self {
        Self {
            data: &[],
            offset: 0,
            stride: size_of::<T>(),
            count: 0,
            _ty: PhantomData,
        }
    }

    /// Construct a view over `count` elements of `data`, the first at `offset` and each
    /// subsequent one `stride` bytes after the last.
    ///
    /// # Errors
    ///
    /// * [`StrideTooSmall`](Error::StrideTooSmall) if consecutive elements would overlap
    /// * [`RangeOverflow`](Error::RangeOverflow) if the last element would end past `data`
    pub fn new(data: &'buf [u8], offset: usize, stride: usize, count: usize) -> Result<Self, Error> {
        let size = size_of::<T>();
        if stride < size {
            return Err(Error::StrideTooSmall { stride, size });
        }
        let overflow = || Error::RangeOverflow {
            offset,
            stride,
            count,
            size,
            len: data.len(),
        };
        if count > 0 {
            let end = (count - 1)
                .checked_mul(stride)
                .and_then(|last| last.checked_add(offset))
                .and_then(|last| last.checked_add(size))
                .ok_or_else(overflow)?;
            if end > data.len() {
                return Err(overflow());
            }
        } else if offset > data.len() {
            return Err(overflow());
        }
        Ok(Self {
            data,
            offset,
            stride,
            count,
            _ty: PhantomData,
        })
    }

    /// Construct a tightly packed view over a slice of elements.
    #[allow(unsafe_code)]
    pub fn from_elements(elements: &'buf [T]) -> Self {
        // SAFETY: `Element` types have no padding, so every byte of the slice is initialized
        let data = unsafe {
            std::slice::from_raw_parts(elements.as_ptr().cast::<u8>(), std::mem::size_of_val(elements))
        };
        Self {
            data,
            offset: 0,
            stride: size_of::<T>(),
            count: elements.len(),
            _ty: PhantomData,
        }
    }

    /// The number of elements in this view.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether this view has no elements.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Byte offset of the first element within the storage.
    #[inline(always)]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes between the starts of consecutive elements.
    #[inline(always)]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Read the `i`th element.
    ///
    /// # Panics
    ///
    /// * in debug builds, if `i >= self.len()`
    /// * if the `i`th element would lie outside the borrowed storage
    #[inline]
    #[allow(unsafe_code)]
    pub fn get(&self, i: usize) -> T {
        debug_assert!(i < self.count, "buffer view index out of range: 0..{} ∌ {i}", self.count);
        let start = self.offset + i * self.stride;
        let bytes = &self.data[start..start + size_of::<T>()];
        // SAFETY: `bytes` spans exactly one `T`, and `Element` types accept any bit pattern
        unsafe { bytes.as_ptr().cast::<T>().read_unaligned() }
    }

    /// Read the `i`th element without any checks.
    ///
    /// # Safety
    ///
    /// * `i < self.len()`
    #[inline]
    #[allow(unsafe_code)]
    pub unsafe fn get_unchecked(&self, i: usize) -> T {
        debug_assert!(i < self.count);
        // SAFETY: the constructors ensure every index below `count` lies within `data`
        unsafe {
            self.data
                .as_ptr()
                .add(self.offset + i * self.stride)
                .cast::<T>()
                .read_unaligned()
        }
    }

    /// The address of the `i`th element, for cache hints or direct vector loads.
    ///
    /// Computing the address is always safe; dereferencing it is only sound if `i < self.len()`.
    #[inline]
    pub fn address(&self, i: usize) -> *const u8 {
        self.data.as_ptr().wrapping_add(self.offset + i * self.stride)
    }

    /// Iterate through every element of this view, in order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = T> + '_ {
        (0..self.count).map(move |i| self.get(i))
    }
}

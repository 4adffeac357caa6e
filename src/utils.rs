use std::alloc::{alloc_zeroed, dealloc, Layout};
use std::fmt;
use std::mem;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

use crate::error::{allocation_error, layout_error, Result};

/// Element types for which an all-zero bit pattern is a valid value.
///
/// # Safety
///
/// Implementors must accept any buffer of zero bytes as an initialized value.
pub unsafe trait ZeroBits: Copy {}

unsafe impl ZeroBits for f32 {}
unsafe impl ZeroBits for f64 {}

/// An owning, explicitly aligned buffer.
///
/// The matrices of this crate live in one `AlignedVec` each so that the tile
/// kernels can use aligned vector loads and stores. The buffer is released
/// with the exact `Layout` it was allocated with when it goes out of scope.
///
/// # Example
///
/// ```rust
/// use tilegemm::utils::AlignedVec;
///
/// let buffer = AlignedVec::<f32>::zeroed(64, 32).unwrap();
/// assert_eq!(buffer.len(), 64);
/// assert_eq!(buffer.as_ptr() as usize % 32, 0);
/// assert!(buffer.iter().all(|&x| x == 0.0));
/// ```
pub struct AlignedVec<T> {
    ptr: NonNull<T>,
    len: usize,
    layout: Layout,
}

// SAFETY: AlignedVec uniquely owns its allocation, like Vec<T>.
unsafe impl<T: Send> Send for AlignedVec<T> {}
unsafe impl<T: Sync> Sync for AlignedVec<T> {}

impl<T: ZeroBits> AlignedVec<T> {
    /// Allocates `len` zero-initialized elements aligned to `align` bytes.
    ///
    /// # Errors
    ///
    /// * [`LayoutError`](crate::error::TileGemmError::LayoutError) if `align`
    ///   is not a power of two, is smaller than the natural alignment of `T`,
    ///   or the total size overflows.
    /// * [`AllocationError`](crate::error::TileGemmError::AllocationError) if
    ///   the allocator returns null.
    pub fn zeroed(len: usize, align: usize) -> Result<Self> {
        let size = len
            .checked_mul(mem::size_of::<T>())
            .ok_or_else(|| layout_error(usize::MAX, align, "total size overflows usize"))?;

        if align < mem::align_of::<T>() {
            return Err(layout_error(
                size,
                align,
                "alignment is smaller than the element alignment",
            ));
        }

        let layout = Layout::from_size_align(size, align)
            .map_err(|e| layout_error(size, align, e.to_string()))?;

        // Zero-sized allocations are undefined behavior; hand out a dangling pointer.
        if size == 0 {
            return Ok(AlignedVec {
                ptr: NonNull::dangling(),
                len,
                layout,
            });
        }

        // SAFETY: the layout has a non-zero size.
        let raw = unsafe { alloc_zeroed(layout) } as *mut T;

        let ptr = NonNull::new(raw)
            .ok_or_else(|| allocation_error(size, align, "allocator returned null"))?;

        Ok(AlignedVec { ptr, len, layout })
    }

    /// Allocates a new buffer with the same alignment and copies `self` into it.
    pub fn try_clone(&self) -> Result<Self> {
        let mut copy = Self::zeroed(self.len, self.layout.align())?;
        copy.copy_from_slice(self);
        Ok(copy)
    }
}

impl<T> AlignedVec<T> {
    /// Byte alignment the buffer was allocated with.
    pub fn alignment(&self) -> usize {
        self.layout.align()
    }
}

impl<T> Drop for AlignedVec<T> {
    fn drop(&mut self) {
        if self.layout.size() > 0 {
            // SAFETY: ptr was returned by alloc_zeroed for exactly this layout.
            unsafe {
                dealloc(self.ptr.as_ptr() as *mut u8, self.layout);
            }
        }
    }
}

impl<T> Deref for AlignedVec<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        // SAFETY: ptr is valid for len initialized elements, or dangling with len * size 0.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl<T> DerefMut for AlignedVec<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        // SAFETY: as in deref, and &mut self guarantees exclusive access.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl<T: fmt::Debug> fmt::Debug for AlignedVec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlignedVec")
            .field("len", &self.len)
            .field("align", &self.layout.align())
            .field("data", &self.deref())
            .finish()
    }
}

/// Returns `true` if `ptr` is a multiple of `align` bytes.
#[inline(always)]
pub fn is_aligned_to<T>(ptr: *const T, align: usize) -> bool {
    (ptr as usize) % align == 0
}

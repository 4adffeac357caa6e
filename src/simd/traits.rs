/// Operations a tile micro-kernel needs from one vector register of `f32`.
///
/// Implemented by [`F32x8`](crate::simd::avx2::f32x8::F32x8) (AVX2) and
/// [`F32x16`](crate::simd::avx512::f32x16::F32x16) (AVX-512F). Every method
/// compiles down to a single instruction when inlined into a function built
/// with the matching target features.
pub trait SimdVec: Copy {
    /// Number of `f32` lanes.
    const LANES: usize;

    /// Register size in bytes; aligned loads and stores need this alignment.
    const ALIGNMENT: usize;

    /// All lanes zero.
    ///
    /// # Safety
    ///
    /// The CPU must support the instruction set of the implementation.
    unsafe fn zero() -> Self;

    /// All lanes set to `value`.
    ///
    /// # Safety
    ///
    /// The CPU must support the instruction set of the implementation.
    unsafe fn splat(value: f32) -> Self;

    /// All lanes set to `*ptr`.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for one read.
    unsafe fn broadcast(ptr: *const f32) -> Self;

    fn is_aligned(ptr: *const f32) -> bool;

    /// Loads `LANES` values from an aligned address.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for `LANES` reads and aligned to `ALIGNMENT`.
    unsafe fn load_aligned(ptr: *const f32) -> Self;

    /// Loads `LANES` values from any address.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for `LANES` reads.
    unsafe fn load_unaligned(ptr: *const f32) -> Self;

    /// Stores all lanes to an aligned address.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for `LANES` writes and aligned to `ALIGNMENT`.
    unsafe fn store_aligned_at(&self, ptr: *mut f32);

    /// Stores all lanes to any address.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for `LANES` writes.
    unsafe fn store_unaligned_at(&self, ptr: *mut f32);

    /// Fused `self * a + b` with a single rounding.
    ///
    /// # Safety
    ///
    /// The CPU must support FMA for the implementation's width.
    unsafe fn fmadd(&self, a: Self, b: Self) -> Self;
}

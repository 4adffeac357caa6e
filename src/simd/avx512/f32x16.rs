//! AVX-512F 16-lane f32 SIMD vector.
//!
//! `F32x16` wraps an `__m512` register holding 16 single-precision values.
//!
//! # Architecture Requirements
//!
//! - **CPU Support**: AVX-512F (Intel Skylake-SP, AMD Zen 4 and later)
//! - **Compiler**: rustc 1.89 or newer (stable AVX-512 intrinsics)
//! - **Memory Alignment**: aligned loads and stores need 64-byte boundaries

#[cfg(target_arch = "x86")]
use std::arch::x86::*;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use crate::simd::SimdVec;

/// AVX-512 memory alignment requirement in bytes.
pub(crate) const AVX512_ALIGNMENT: usize = 64;

/// Number of f32 elements that fit in an AVX-512 512-bit vector.
pub(crate) const LANE_COUNT: usize = 16;

/// AVX-512 SIMD vector containing 16 packed f32 values.
#[derive(Copy, Clone, Debug)]
pub struct F32x16 {
    /// AVX-512 512-bit vector register containing 16 packed f32 values
    pub elements: __m512,
}

impl F32x16 {
    /// Copies the lanes out into an array.
    pub fn to_array(self) -> [f32; LANE_COUNT] {
        let mut out = [0.0f32; LANE_COUNT];
        // SAFETY: out holds LANE_COUNT floats; the unaligned store has no alignment need.
        unsafe { self.store_unaligned_at(out.as_mut_ptr()) };
        out
    }
}

impl SimdVec for F32x16 {
    const LANES: usize = LANE_COUNT;
    const ALIGNMENT: usize = AVX512_ALIGNMENT;

    #[inline(always)]
    unsafe fn zero() -> Self {
        F32x16 {
            elements: _mm512_setzero_ps(),
        }
    }

    #[inline(always)]
    unsafe fn splat(value: f32) -> Self {
        F32x16 {
            elements: _mm512_set1_ps(value),
        }
    }

    #[inline(always)]
    unsafe fn broadcast(ptr: *const f32) -> Self {
        Self::splat(*ptr)
    }

    #[inline(always)]
    fn is_aligned(ptr: *const f32) -> bool {
        let ptr = ptr as usize;

        ptr % core::mem::align_of::<__m512>() == 0
    }

    #[inline(always)]
    unsafe fn load_aligned(ptr: *const f32) -> Self {
        debug_assert!(Self::is_aligned(ptr), "pointer is not 64-byte aligned");
        F32x16 {
            elements: _mm512_load_ps(ptr),
        }
    }

    #[inline(always)]
    unsafe fn load_unaligned(ptr: *const f32) -> Self {
        F32x16 {
            elements: _mm512_loadu_ps(ptr),
        }
    }

    #[inline(always)]
    unsafe fn store_aligned_at(&self, ptr: *mut f32) {
        debug_assert!(Self::is_aligned(ptr), "pointer is not 64-byte aligned");
        _mm512_store_ps(ptr, self.elements)
    }

    #[inline(always)]
    unsafe fn store_unaligned_at(&self, ptr: *mut f32) {
        _mm512_storeu_ps(ptr, self.elements)
    }

    #[inline(always)]
    unsafe fn fmadd(&self, a: Self, b: Self) -> Self {
        F32x16 {
            elements: _mm512_fmadd_ps(self.elements, a.elements, b.elements),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::AlignedVec;

    #[test]
    fn test_aligned_round_trip_and_fmadd() {
        let mut buffer = AlignedVec::<f32>::zeroed(32, AVX512_ALIGNMENT).unwrap();
        for (i, x) in buffer.iter_mut().enumerate() {
            *x = i as f32;
        }
        assert!(F32x16::is_aligned(buffer.as_ptr()));

        let result = unsafe {
            let lo = F32x16::load_aligned(buffer.as_ptr());
            let hi = F32x16::load_aligned(buffer.as_ptr().add(16));
            lo.fmadd(F32x16::splat(2.0), hi)
        };

        let expected: Vec<f32> = (0..16).map(|i| (i * 2 + 16 + i) as f32).collect();
        assert_eq!(result.to_array().to_vec(), expected);
    }
}

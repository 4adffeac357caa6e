//! AVX2 8-lane f32 SIMD vector.
//!
//! `F32x8` wraps an AVX `__m256` register holding 8 single-precision values.
//! Only the handful of operations the 8×8×8 tile micro-kernel needs are
//! provided: aligned/unaligned load and store, broadcast, and fused
//! multiply-add (FMA3).
//!
//! # Architecture Requirements
//!
//! - **CPU Support**: AVX2 and FMA (Intel Haswell, AMD Piledriver and later)
//! - **Memory Alignment**: aligned loads and stores need 32-byte boundaries

#[cfg(target_arch = "x86")]
use std::arch::x86::*;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use crate::simd::SimdVec;

/// AVX2 memory alignment requirement in bytes.
pub(crate) const AVX_ALIGNMENT: usize = 32;

/// Number of f32 elements that fit in an AVX2 256-bit vector.
pub(crate) const LANE_COUNT: usize = 8;

/// AVX2 SIMD vector containing 8 packed f32 values.
#[derive(Copy, Clone, Debug)]
pub struct F32x8 {
    /// AVX2 256-bit vector register containing 8 packed f32 values
    pub elements: __m256,
}

impl F32x8 {
    /// Copies the lanes out into an array.
    pub fn to_array(self) -> [f32; LANE_COUNT] {
        let mut out = [0.0f32; LANE_COUNT];
        // SAFETY: out holds LANE_COUNT floats; the unaligned store has no alignment need.
        unsafe { self.store_unaligned_at(out.as_mut_ptr()) };
        out
    }
}

impl SimdVec for F32x8 {
    const LANES: usize = LANE_COUNT;
    const ALIGNMENT: usize = AVX_ALIGNMENT;

    #[inline(always)]
    unsafe fn zero() -> Self {
        F32x8 {
            elements: _mm256_setzero_ps(),
        }
    }

    #[inline(always)]
    unsafe fn splat(value: f32) -> Self {
        F32x8 {
            elements: _mm256_set1_ps(value),
        }
    }

    #[inline(always)]
    unsafe fn broadcast(ptr: *const f32) -> Self {
        F32x8 {
            elements: _mm256_broadcast_ss(&*ptr),
        }
    }

    #[inline(always)]
    fn is_aligned(ptr: *const f32) -> bool {
        let ptr = ptr as usize;

        ptr % core::mem::align_of::<__m256>() == 0
    }

    #[inline(always)]
    unsafe fn load_aligned(ptr: *const f32) -> Self {
        debug_assert!(Self::is_aligned(ptr), "pointer is not 32-byte aligned");
        F32x8 {
            elements: _mm256_load_ps(ptr),
        }
    }

    #[inline(always)]
    unsafe fn load_unaligned(ptr: *const f32) -> Self {
        F32x8 {
            elements: _mm256_loadu_ps(ptr),
        }
    }

    #[inline(always)]
    unsafe fn store_aligned_at(&self, ptr: *mut f32) {
        debug_assert!(Self::is_aligned(ptr), "pointer is not 32-byte aligned");
        _mm256_store_ps(ptr, self.elements)
    }

    #[inline(always)]
    unsafe fn store_unaligned_at(&self, ptr: *mut f32) {
        _mm256_storeu_ps(ptr, self.elements)
    }

    #[inline(always)]
    unsafe fn fmadd(&self, a: Self, b: Self) -> Self {
        F32x8 {
            elements: _mm256_fmadd_ps(self.elements, a.elements, b.elements),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::AlignedVec;

    #[test]
    fn test_splat_and_broadcast() {
        let value = 2.5f32;
        let splat = unsafe { F32x8::splat(value) };
        let broadcast = unsafe { F32x8::broadcast(&value) };
        assert_eq!(splat.to_array(), [2.5; 8]);
        assert_eq!(broadcast.to_array(), [2.5; 8]);
    }

    #[test]
    fn test_aligned_round_trip() {
        let mut buffer = AlignedVec::<f32>::zeroed(16, AVX_ALIGNMENT).unwrap();
        for (i, x) in buffer.iter_mut().enumerate() {
            *x = i as f32;
        }
        assert!(F32x8::is_aligned(buffer.as_ptr()));
        assert!(!F32x8::is_aligned(buffer[1..].as_ptr()));

        unsafe {
            let v = F32x8::load_aligned(buffer.as_ptr().add(8));
            v.store_aligned_at(buffer.as_mut_ptr());
        }
        assert_eq!(&buffer[..8], &[8.0, 9.0, 10.0, 11.0, 12.0, 13.0, 14.0, 15.0]);
    }

    #[test]
    fn test_fmadd() {
        let a: Vec<f32> = (1..=8).map(|x| x as f32).collect();
        let result = unsafe {
            let va = F32x8::load_unaligned(a.as_ptr());
            let two = F32x8::splat(2.0);
            let one = F32x8::splat(1.0);
            va.fmadd(two, one)
        };
        assert_eq!(
            result.to_array(),
            [3.0, 5.0, 7.0, 9.0, 11.0, 13.0, 15.0, 17.0]
        );
    }
}

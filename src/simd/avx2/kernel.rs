//! 8×8×8 AVX2 + FMA tile micro-kernel.
//!
//! Register blocking: eight accumulators hold eight rows of an 8×8 block of
//! C. For each of the eight reduction steps one row of B is loaded once and
//! reused by all eight rows, each of which broadcasts its own element of A and
//! issues one FMA. That gives 8 FMAs per vector load of B.

use super::f32x8::{F32x8, LANE_COUNT};
use crate::simd::SimdVec;

const LANES: usize = LANE_COUNT;

/// `C[0..8][0..8] += A[0..8][0..8] * B[0..8][0..8]` for 8×8 blocks inside
/// `m`-wide tiles.
///
/// # Safety
///
/// Each pointer must address the top-left element of an 8×8 block whose rows
/// are `m` elements apart and stay in bounds. `b` and `c` rows must be 32-byte
/// aligned. The CPU must support AVX2 and FMA.
#[inline]
#[target_feature(enable = "avx2,fma")]
unsafe fn micro_kernel_8x8x8(a: *const f32, b: *const f32, c: *mut f32, m: usize) {
    let mut acc = [F32x8::zero(); LANES];
    for (row, vc) in acc.iter_mut().enumerate() {
        *vc = F32x8::load_aligned(c.add(row * m));
    }

    for k in 0..LANES {
        let vb = F32x8::load_aligned(b.add(k * m));
        for (row, vc) in acc.iter_mut().enumerate() {
            *vc = F32x8::broadcast(a.add(row * m + k)).fmadd(vb, *vc);
        }
    }

    for (row, vc) in acc.iter().enumerate() {
        vc.store_aligned_at(c.add(row * m));
    }
}

/// `C += A * B` for one `m × m` tile, as an `(m/8) × (m/8)` grid of 8×8×8
/// micro-kernel calls with `m/8` reduction steps each.
///
/// # Safety
///
/// The CPU must support AVX2 and FMA. All slices must hold `m * m` elements,
/// `m` must be a multiple of 8 and the slices must be 32-byte aligned.
#[target_feature(enable = "avx2,fma")]
pub unsafe fn accumulate_tile(a: &[f32], b: &[f32], c: &mut [f32], m: usize) {
    debug_assert_eq!(m % LANES, 0, "tile size {m} is not a multiple of {LANES}");
    debug_assert!(a.len() == m * m && b.len() == m * m && c.len() == m * m);
    debug_assert!(
        F32x8::is_aligned(a.as_ptr()) && F32x8::is_aligned(b.as_ptr()) && F32x8::is_aligned(c.as_ptr()),
        "tiles must be {}-byte aligned",
        F32x8::ALIGNMENT
    );

    let blocks = m / LANES;
    let (a, b, c) = (a.as_ptr(), b.as_ptr(), c.as_mut_ptr());

    for i in 0..blocks {
        for j in 0..blocks {
            for k in 0..blocks {
                micro_kernel_8x8x8(
                    a.add(m * LANES * i + LANES * k),
                    b.add(m * LANES * k + LANES * j),
                    c.add(m * LANES * i + LANES * j),
                    m,
                );
            }
        }
    }
}

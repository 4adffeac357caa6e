//! 16×16×16 AVX-512F tile micro-kernel.
//!
//! Same register blocking as the AVX2 kernel at twice the width: sixteen
//! accumulators for sixteen rows of C, one load of B per reduction step shared
//! by sixteen broadcast FMAs.

use super::f32x16::{F32x16, LANE_COUNT};
use crate::simd::SimdVec;

const LANES: usize = LANE_COUNT;

/// # Safety
///
/// Each pointer must address the top-left element of a 16×16 block whose rows
/// are `m` elements apart and stay in bounds. `b` and `c` rows must be 64-byte
/// aligned. The CPU must support AVX-512F.
#[inline]
#[target_feature(enable = "avx512f")]
unsafe fn micro_kernel_16x16x16(a: *const f32, b: *const f32, c: *mut f32, m: usize) {
    let mut acc = [F32x16::zero(); LANES];
    for (row, vc) in acc.iter_mut().enumerate() {
        *vc = F32x16::load_aligned(c.add(row * m));
    }

    for k in 0..LANES {
        let vb = F32x16::load_aligned(b.add(k * m));
        for (row, vc) in acc.iter_mut().enumerate() {
            *vc = F32x16::broadcast(a.add(row * m + k)).fmadd(vb, *vc);
        }
    }

    for (row, vc) in acc.iter().enumerate() {
        vc.store_aligned_at(c.add(row * m));
    }
}

/// `C += A * B` for one `m × m` tile, as an `(m/16) × (m/16)` grid of
/// 16×16×16 micro-kernel calls with `m/16` reduction steps each.
///
/// # Safety
///
/// The CPU must support AVX-512F. All slices must hold `m * m` elements, `m`
/// must be a multiple of 16 and the slices must be 64-byte aligned.
#[target_feature(enable = "avx512f")]
pub unsafe fn accumulate_tile(a: &[f32], b: &[f32], c: &mut [f32], m: usize) {
    debug_assert_eq!(m % LANES, 0, "tile size {m} is not a multiple of {LANES}");
    debug_assert!(a.len() == m * m && b.len() == m * m && c.len() == m * m);
    debug_assert!(
        F32x16::is_aligned(a.as_ptr())
            && F32x16::is_aligned(b.as_ptr())
            && F32x16::is_aligned(c.as_ptr()),
        "tiles must be {}-byte aligned",
        F32x16::ALIGNMENT
    );

    let blocks = m / LANES;
    let (a, b, c) = (a.as_ptr(), b.as_ptr(), c.as_mut_ptr());

    for i in 0..blocks {
        for j in 0..blocks {
            for k in 0..blocks {
                micro_kernel_16x16x16(
                    a.add(m * LANES * i + LANES * k),
                    b.add(m * LANES * k + LANES * j),
                    c.add(m * LANES * i + LANES * j),
                    m,
                );
            }
        }
    }
}

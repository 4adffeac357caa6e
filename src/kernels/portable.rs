//! Portable form of the vector micro-kernels.
//!
//! Used for a vector kernel whose hardware backend was not compiled in. The
//! structure is the same as the intrinsic versions (an `L × L` accumulator
//! block, one row of B per reduction step shared by `L` broadcasts) but the
//! lanes are fixed-trip-count loops over arrays, left to the auto-vectorizer.
//! Multiply and add are separate roundings here, and throughput is well below
//! the intrinsic kernels.

/// `C += A * B` for one `m × m` tile, as an `(m/L) × (m/L)` grid of
/// `L × L × L` micro-kernel calls.
pub fn accumulate_tile<const L: usize>(a: &[f32], b: &[f32], c: &mut [f32], m: usize) {
    debug_assert_eq!(m % L, 0, "tile size {m} is not a multiple of {L}");
    debug_assert!(a.len() == m * m && b.len() == m * m && c.len() == m * m);

    let blocks = m / L;
    for i in 0..blocks {
        for j in 0..blocks {
            for k in 0..blocks {
                micro_kernel::<L>(
                    a,
                    b,
                    c,
                    m,
                    m * L * i + L * k,
                    m * L * k + L * j,
                    m * L * i + L * j,
                );
            }
        }
    }
}

#[inline(always)]
fn micro_kernel<const L: usize>(
    a: &[f32],
    b: &[f32],
    c: &mut [f32],
    m: usize,
    a0: usize,
    b0: usize,
    c0: usize,
) {
    let mut acc = [[0.0f32; L]; L];
    for (row, vc) in acc.iter_mut().enumerate() {
        vc.copy_from_slice(&c[c0 + row * m..c0 + row * m + L]);
    }

    let mut vb = [0.0f32; L];
    for k in 0..L {
        vb.copy_from_slice(&b[b0 + k * m..b0 + k * m + L]);
        for (row, vc) in acc.iter_mut().enumerate() {
            let va = a[a0 + row * m + k];
            for (x, &y) in vc.iter_mut().zip(vb.iter()) {
                *x += va * y;
            }
        }
    }

    for (row, vc) in acc.iter().enumerate() {
        c[c0 + row * m..c0 + row * m + L].copy_from_slice(vc);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::scalar;

    #[test]
    fn test_matches_scalar_on_small_integers() {
        for m in [8, 16, 32] {
            let a: Vec<f32> = (0..m * m).map(|idx| (idx % 7) as f32 - 3.0).collect();
            let b: Vec<f32> = (0..m * m).map(|idx| (idx % 5) as f32).collect();
            let c0: Vec<f32> = (0..m * m).map(|idx| (idx % 3) as f32).collect();

            let mut c_scalar = c0.clone();
            scalar::accumulate_tile(&a, &b, &mut c_scalar, m);

            let mut c8 = c0.clone();
            accumulate_tile::<8>(&a, &b, &mut c8, m);
            assert_eq!(c8, c_scalar, "8 lanes, tile size {m}");

            if m % 16 == 0 {
                let mut c16 = c0.clone();
                accumulate_tile::<16>(&a, &b, &mut c16, m);
                assert_eq!(c16, c_scalar, "16 lanes, tile size {m}");
            }
        }
    }
}

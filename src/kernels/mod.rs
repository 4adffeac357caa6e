//! Tile multiply-accumulate kernels.
//!
//! Every kernel computes `C[i][j] += Σ_k A[i][k] · B[k][j]` for one `M × M`
//! tile. They differ only in how, so the orchestrator picks one with a
//! [`Kernel`] value and never looks inside. Results agree within
//! floating-point tolerance, not bit for bit.

pub mod portable;
pub mod scalar;

use std::fmt;

use crate::simd::{HAS_AVX2, HAS_AVX512};
use crate::utils::is_aligned_to;

/// A tile multiply-accumulate strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kernel {
    /// Triple loop, any tile size.
    Scalar,
    /// 8×8×8 broadcast/FMA micro-kernel; tile size must be a multiple of 8.
    Vector8,
    /// 16×16×16 broadcast/FMA micro-kernel; tile size must be a multiple of 16.
    Vector16,
}

impl Kernel {
    pub const ALL: [Kernel; 3] = [Kernel::Scalar, Kernel::Vector8, Kernel::Vector16];

    /// Vector width in `f32` lanes; 1 for the scalar kernel.
    pub fn lanes(self) -> usize {
        match self {
            Kernel::Scalar => 1,
            Kernel::Vector8 => 8,
            Kernel::Vector16 => 16,
        }
    }

    /// Byte alignment the kernel needs for its tiles in this build.
    ///
    /// The register size for a hardware-backed vector kernel, otherwise the
    /// natural alignment of `f32`.
    pub fn alignment(self) -> usize {
        if self != Kernel::Scalar && self.is_hardware_accelerated() {
            self.lanes() * std::mem::size_of::<f32>()
        } else {
            std::mem::align_of::<f32>()
        }
    }

    /// Whether tiles of `tile × tile` can be handled.
    pub fn supports(self, tile: usize) -> bool {
        tile > 0 && tile % self.lanes() == 0
    }

    /// Whether the kernel runs on real vector instructions in this build.
    ///
    /// `false` means [`accumulate`](Self::accumulate) falls back to the
    /// portable loops of [`portable`].
    pub fn is_hardware_accelerated(self) -> bool {
        match self {
            Kernel::Scalar => true,
            Kernel::Vector8 => HAS_AVX2,
            Kernel::Vector16 => HAS_AVX512,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Kernel::Scalar => "scalar",
            Kernel::Vector8 => "vector8",
            Kernel::Vector16 => "vector16",
        }
    }

    /// `C += A * B` for one `m × m` tile.
    ///
    /// # Panics
    ///
    /// Panics if a slice does not hold `m * m` elements, if `m` is not a
    /// multiple of [`lanes`](Self::lanes), or if a vector kernel gets a tile
    /// that is not aligned to [`alignment`](Self::alignment). These checks run
    /// once per tile; the inner loops are unchecked.
    #[inline]
    pub fn accumulate(self, a: &[f32], b: &[f32], c: &mut [f32], m: usize) {
        let len = m * m;
        assert!(
            a.len() == len && b.len() == len && c.len() == len,
            "tiles must hold {len} elements (got {}, {}, {})",
            a.len(),
            b.len(),
            c.len()
        );
        assert!(self.supports(m), "{self} kernel cannot handle tile size {m}");

        let align = self.alignment();
        if align > std::mem::align_of::<f32>() {
            assert!(
                is_aligned_to(a.as_ptr(), align)
                    && is_aligned_to(b.as_ptr(), align)
                    && is_aligned_to(c.as_ptr(), align),
                "{self} kernel needs {align}-byte aligned tiles"
            );
        }

        match self {
            Kernel::Scalar => scalar::accumulate_tile(a, b, c, m),
            Kernel::Vector8 => {
                // SAFETY: build.rs only sets cfg(avx2) after finding avx2 and fma
                // on this machine; shape and alignment were checked above.
                #[cfg(all(avx2, any(target_arch = "x86", target_arch = "x86_64")))]
                unsafe {
                    crate::simd::avx2::kernel::accumulate_tile(a, b, c, m);
                }
                #[cfg(not(all(avx2, any(target_arch = "x86", target_arch = "x86_64"))))]
                portable::accumulate_tile::<8>(a, b, c, m);
            }
            Kernel::Vector16 => {
                // SAFETY: as above, with cfg(avx512) and avx512f.
                #[cfg(all(avx512, any(target_arch = "x86", target_arch = "x86_64")))]
                unsafe {
                    crate::simd::avx512::kernel::accumulate_tile(a, b, c, m);
                }
                #[cfg(not(all(avx512, any(target_arch = "x86", target_arch = "x86_64"))))]
                portable::accumulate_tile::<16>(a, b, c, m);
            }
        }
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

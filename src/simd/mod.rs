//! Hardware vector backends for the tile kernels.
//!
//! Each backend is compiled only when `build.rs` detected its instruction set
//! on the build machine (`cfg(avx2)`, `cfg(avx512)`). Nothing in here is
//! selected at run time.

#[cfg(all(avx2, any(target_arch = "x86", target_arch = "x86_64")))]
pub mod avx2;

#[cfg(all(avx512, any(target_arch = "x86", target_arch = "x86_64")))]
pub mod avx512;

pub mod traits;

pub use traits::SimdVec;

/// `true` when the AVX2 + FMA backend of [`Kernel::Vector8`](crate::Kernel::Vector8) is compiled in.
pub const HAS_AVX2: bool = cfg!(all(avx2, any(target_arch = "x86", target_arch = "x86_64")));

/// `true` when the AVX-512F backend of [`Kernel::Vector16`](crate::Kernel::Vector16) is compiled in.
pub const HAS_AVX512: bool = cfg!(all(avx512, any(target_arch = "x86", target_arch = "x86_64")));

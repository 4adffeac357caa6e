//! AVX2 + FMA backend: 256-bit vectors, 8 × f32 per register.
//!
//! Compiled only when `build.rs` found both `avx2` and `fma` on the build
//! machine. Backs [`Kernel::Vector8`](crate::Kernel::Vector8).
//!
//! # Usage Example
//!
//! ```rust
//! # #[cfg(avx2)]
//! # {
//! use tilegemm::simd::avx2::kernel::accumulate_tile;
//! use tilegemm::utils::AlignedVec;
//!
//! let m = 8;
//! let a = AlignedVec::<f32>::zeroed(m * m, 32).unwrap();
//! let b = AlignedVec::<f32>::zeroed(m * m, 32).unwrap();
//! let mut c = AlignedVec::<f32>::zeroed(m * m, 32).unwrap();
//! unsafe { accumulate_tile(&a, &b, &mut c, m) };
//! # }
//! ```

pub mod f32x8;

pub mod kernel;

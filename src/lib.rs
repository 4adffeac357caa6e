//! Blocked, SIMD-accelerated, multithreaded multiplication of square `f32` matrices.
//!
//! The product `C = A * B` of two `N × N` matrices is computed on a *tiled*
//! layout: each matrix is repacked into `(N/M)²` contiguous `M × M` tiles, and
//! the tile grid is traversed in a fixed `(I, J, K)` order, accumulating
//! `C(I,J) += A(I,K) * B(K,J)` with one of three interchangeable tile kernels:
//!
//! - [`Kernel::Scalar`]: plain triple loop.
//! - [`Kernel::Vector8`]: 8×8×8 broadcast/FMA micro-kernel (AVX2 + FMA).
//! - [`Kernel::Vector16`]: 16×16×16 broadcast/FMA micro-kernel (AVX-512F).
//!
//! Which hardware backends exist is decided at build time by `build.rs`; a
//! vector kernel whose backend was not compiled in runs the same micro-kernel
//! as portable fixed-trip-count loops.
//!
//! # Example
//!
//! ```rust
//! use tilegemm::{generate, multiply, to_row_major, to_tiled, Strategy, TiledMatrix};
//!
//! let (a, b) = generate(0.4, 64).unwrap();
//! let a = to_tiled(&a, 16).unwrap();
//! let b = to_tiled(&b, 16).unwrap();
//! let mut c = TiledMatrix::zeros(a.grid()).unwrap();
//!
//! multiply(&a, &b, &mut c, Strategy::Vector8Parallel).unwrap();
//!
//! let c = to_row_major(&c).unwrap();
//! assert!(c.trace() > 0.0);
//! ```

pub mod bench;
pub mod diagnostics;
pub mod error;
pub mod gemm;
pub mod kernels;
pub mod matrix;
pub mod simd;
pub mod utils;

pub use diagnostics::{max_abs_difference, trace, Difference, ReferenceLayout};
pub use error::{Result, TileGemmError};
pub use gemm::{multiply, multiply_naive, multiply_tiled, Execution, Strategy};
pub use kernels::Kernel;
pub use matrix::generate::generate;
pub use matrix::layout::{to_row_major, to_tiled};
pub use matrix::{Matrix, TileGrid, TiledMatrix};

/// Byte alignment of every matrix buffer.
///
/// 64 bytes (512 bits) when the AVX-512 backend is compiled in, otherwise
/// 32 bytes (256 bits). Tile kernels rely on it for aligned vector access.
#[cfg(avx512)]
pub const ALIGNMENT: usize = 64;

/// Byte alignment of every matrix buffer.
///
/// 64 bytes (512 bits) when the AVX-512 backend is compiled in, otherwise
/// 32 bytes (256 bits). Tile kernels rely on it for aligned vector access.
#[cfg(not(avx512))]
pub const ALIGNMENT: usize = 32;

/// Default matrix dimension of the benchmark driver.
pub const DEFAULT_N: usize = 4096;

/// Default tile size of the benchmark driver.
pub const DEFAULT_TILE: usize = 64;

/// Default generator seed of the benchmark driver.
pub const DEFAULT_SEED: f32 = 0.4;

//! AVX-512F backend: 512-bit vectors, 16 × f32 per register.
//!
//! Compiled only when `build.rs` found `avx512f` on the build machine and the
//! compiler ships stable AVX-512 intrinsics. Backs
//! [`Kernel::Vector16`](crate::Kernel::Vector16) and raises
//! [`ALIGNMENT`](crate::ALIGNMENT) to 64 bytes.

pub mod f32x16;

pub mod kernel;

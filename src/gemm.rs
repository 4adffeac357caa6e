//! Tile-grid orchestration of `C += A * B`.
//!
//! Every strategy walks the same index space: for `I`, then `J`, then `K`
//! (nested in that order), tile `(I, K)` of A times tile `(K, J)` of B is
//! accumulated into tile `(I, J)` of C by the selected [`Kernel`]. Only the
//! kernel and the scheduling of the `I` loop vary.
//!
//! # Parallel execution
//!
//! C is split into its `G` tile rows (`G * M * M` contiguous elements each) and
//! rayon hands each worker whole rows. Distinct `I` values write disjoint C
//! tiles, so every worker holds the only `&mut` to its row while A and B are
//! shared read-only; no locks or atomics are involved. Within a row the
//! `(J, K)` order is the serial one, which makes serial and parallel results
//! identical for the same kernel. The call returns after every row is written.

use std::fmt;

use clap::ValueEnum;
use rayon::prelude::*;
use tracing::instrument;

use crate::error::{validation_error, Result};
use crate::kernels::Kernel;
use crate::matrix::{Matrix, TiledMatrix};

/// How the outer tile-row loop is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Execution {
    /// The calling thread runs the whole `(I, J, K)` space.
    Serial,
    /// Tile rows are distributed over the current rayon pool.
    Parallel,
}

/// The benchmarked combinations of kernel and execution mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Strategy {
    #[value(name = "scalar")]
    Scalar,
    #[value(name = "vector8")]
    Vector8,
    #[value(name = "vector16")]
    Vector16,
    #[value(name = "vector8-parallel")]
    Vector8Parallel,
    #[value(name = "vector16-parallel")]
    Vector16Parallel,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::Scalar,
        Strategy::Vector8,
        Strategy::Vector16,
        Strategy::Vector8Parallel,
        Strategy::Vector16Parallel,
    ];

    pub fn kernel(self) -> Kernel {
        match self {
            Strategy::Scalar => Kernel::Scalar,
            Strategy::Vector8 | Strategy::Vector8Parallel => Kernel::Vector8,
            Strategy::Vector16 | Strategy::Vector16Parallel => Kernel::Vector16,
        }
    }

    pub fn execution(self) -> Execution {
        match self {
            Strategy::Scalar | Strategy::Vector8 | Strategy::Vector16 => Execution::Serial,
            Strategy::Vector8Parallel | Strategy::Vector16Parallel => Execution::Parallel,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Strategy::Scalar => "scalar",
            Strategy::Vector8 => "vector8",
            Strategy::Vector16 => "vector16",
            Strategy::Vector8Parallel => "vector8-parallel",
            Strategy::Vector16Parallel => "vector16-parallel",
        }
    }

    /// Strategies whose kernel has a hardware backend in this build, scalar first.
    pub fn hardware_defaults() -> Vec<Strategy> {
        Self::ALL
            .into_iter()
            .filter(|s| s.kernel().is_hardware_accelerated())
            .collect()
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accumulates `A * B` into `C` on the tile grid.
///
/// `c` must start zeroed (e.g. from [`TiledMatrix::zeros`]) to receive the
/// product; calling twice without clearing adds the product twice.
///
/// # Errors
///
/// Returns a validation error if the three grids differ or `kernel` cannot
/// handle the tile size.
#[instrument(
    level = "debug",
    skip_all,
    fields(grid = %a.grid(), kernel = %kernel, execution = ?execution)
)]
pub fn multiply_tiled(
    a: &TiledMatrix,
    b: &TiledMatrix,
    c: &mut TiledMatrix,
    kernel: Kernel,
    execution: Execution,
) -> Result<()> {
    let grid = a.grid();
    if b.grid() != grid || c.grid() != grid {
        return Err(validation_error(format!(
            "tile grids differ: A is {}, B is {}, C is {}",
            grid,
            b.grid(),
            c.grid()
        )));
    }
    if !kernel.supports(grid.tile()) {
        return Err(validation_error(format!(
            "{kernel} kernel needs a tile size that is a multiple of {}, got {}",
            kernel.lanes(),
            grid.tile()
        )));
    }

    let tile_row_len = grid.tile_row_len();
    match execution {
        Execution::Serial => c
            .as_mut_slice()
            .chunks_exact_mut(tile_row_len)
            .enumerate()
            .for_each(|(i, c_row)| multiply_tile_row(a, b, c_row, i, kernel)),
        Execution::Parallel => c
            .as_mut_slice()
            .par_chunks_exact_mut(tile_row_len)
            .enumerate()
            .for_each(|(i, c_row)| multiply_tile_row(a, b, c_row, i, kernel)),
    }

    Ok(())
}

/// Runs the `(J, K)` loops for tile row `i` of C.
#[inline]
fn multiply_tile_row(a: &TiledMatrix, b: &TiledMatrix, c_row: &mut [f32], i: usize, kernel: Kernel) {
    let grid = a.grid();
    let m = grid.tile();

    for (j, c_tile) in c_row.chunks_exact_mut(grid.tile_len()).enumerate() {
        for k in 0..grid.grid() {
            kernel.accumulate(a.tile(i, k), b.tile(k, j), c_tile, m);
        }
    }
}

/// [`multiply_tiled`] with the kernel and execution mode of `strategy`.
pub fn multiply(a: &TiledMatrix, b: &TiledMatrix, c: &mut TiledMatrix, strategy: Strategy) -> Result<()> {
    multiply_tiled(a, b, c, strategy.kernel(), strategy.execution())
}

/// Row-major triple-loop product, the untiled baseline.
#[instrument(level = "debug", skip_all, fields(n = a.n()))]
pub fn multiply_naive(a: &Matrix, b: &Matrix) -> Result<Matrix> {
    let n = a.n();
    if b.n() != n {
        return Err(validation_error(format!(
            "cannot multiply a {n}x{n} matrix by a {m}x{m} matrix",
            m = b.n()
        )));
    }

    let mut c = Matrix::zeros(n)?;
    let (a, b) = (a.as_slice(), b.as_slice());

    for (a_row, c_row) in a.chunks_exact(n).zip(c.as_mut_slice().chunks_exact_mut(n)) {
        for (j, out) in c_row.iter_mut().enumerate() {
            let mut sum = 0.0f32;
            for (k, &a_ik) in a_row.iter().enumerate() {
                sum += a_ik * b[k * n + j];
            }
            *out = sum;
        }
    }

    Ok(c)
}

//! Result checking and inspection.
//!
//! Numeric helpers compare a candidate product with a reference and sum
//! diagonals; printers dump small matrices in one of three views so tiling
//! bugs are visible at a glance.

use std::io::{self, Write};

use tracing::instrument;

use crate::error::{validation_error, Result};
use crate::matrix::layout::pack_tiles;
use crate::matrix::{Matrix, TileGrid};
use crate::utils::AlignedVec;
use crate::ALIGNMENT;

/// Layout of the reference buffer passed to [`max_abs_difference`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceLayout {
    /// Row-major; repacked to tiled before comparing.
    RowMajor,
    /// Already tiled with the same grid as the candidate.
    Tiled,
}

/// Outcome of [`max_abs_difference`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Difference {
    /// Largest `|reference - candidate|` over all elements.
    pub max_abs_diff: f32,
    /// Largest magnitude in the reference.
    pub reference_max: f32,
    /// Largest magnitude in the candidate.
    pub candidate_max: f32,
}

impl Difference {
    /// `max_abs_diff` relative to the larger input magnitude; 0 for all-zero inputs.
    pub fn relative(&self) -> f32 {
        let scale = self.reference_max.max(self.candidate_max);
        if scale > 0.0 {
            self.max_abs_diff / scale
        } else {
            self.max_abs_diff
        }
    }
}

/// Maximum element-wise absolute difference between two `N × N` buffers.
///
/// `candidate` is in tiled layout for `grid`. With
/// [`ReferenceLayout::RowMajor`] the reference is repacked into a temporary
/// tiled buffer first so both are compared element for element.
///
/// # Errors
///
/// Returns a validation error if either buffer does not hold `grid.len()`
/// elements, or an allocation error for the temporary buffer.
#[instrument(level = "debug", skip(reference, candidate), fields(grid = %grid))]
pub fn max_abs_difference(
    reference: &[f32],
    candidate: &[f32],
    grid: TileGrid,
    layout: ReferenceLayout,
) -> Result<Difference> {
    if reference.len() != grid.len() || candidate.len() != grid.len() {
        return Err(validation_error(format!(
            "buffers of {} and {} elements cannot be compared on {grid}",
            reference.len(),
            candidate.len()
        )));
    }

    let repacked;
    let reference = match layout {
        ReferenceLayout::Tiled => reference,
        ReferenceLayout::RowMajor => {
            let mut tiled = AlignedVec::<f32>::zeroed(grid.len(), ALIGNMENT)?;
            pack_tiles(reference, &mut tiled, grid);
            repacked = tiled;
            &repacked[..]
        }
    };

    Ok(reference
        .iter()
        .zip(candidate)
        .fold(Difference::default(), |acc, (&r, &c)| Difference {
            max_abs_diff: acc.max_abs_diff.max((r - c).abs()),
            reference_max: acc.reference_max.max(r.abs()),
            candidate_max: acc.candidate_max.max(c.abs()),
        }))
}

/// Sum of the diagonal of a row-major matrix.
pub fn trace(matrix: &Matrix) -> f32 {
    trace_row_major(matrix.as_slice(), matrix.n())
}

/// Sum of the diagonal of a row-major `n × n` buffer, accumulated in `f32`
/// from `(0, 0)` down.
pub fn trace_row_major(data: &[f32], n: usize) -> f32 {
    debug_assert!(data.len() >= n * n);
    (0..n).map(|i| data[i * n + i]).sum()
}

/// Writes a row-major `n × n` buffer, one matrix row per line.
pub fn write_row_major<W: Write>(out: &mut W, data: &[f32], n: usize) -> io::Result<()> {
    for row in data.chunks_exact(n).take(n) {
        for x in row {
            write!(out, "{x:.3} ")?;
        }
        writeln!(out)?;
    }
    writeln!(out)
}

/// Writes a tiled buffer in logical row order, followed by a blank line per row.
pub fn write_tiled<W: Write>(out: &mut W, data: &[f32], grid: TileGrid) -> io::Result<()> {
    let (m, g) = (grid.tile(), grid.grid());
    for i in 0..g {
        for row in 0..m {
            for j in 0..g {
                let start = grid.tile_offset(i, j) + row * m;
                for x in &data[start..start + m] {
                    write!(out, "{x:.3} ")?;
                }
            }
            writeln!(out)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Writes a row-major buffer with `|` between tile columns and dashed rules
/// between tile rows.
pub fn write_partitioned<W: Write>(out: &mut W, data: &[f32], grid: TileGrid) -> io::Result<()> {
    let (n, m, g) = (grid.n(), grid.tile(), grid.grid());
    // Each "{:.3} " cell is 6 wide for values in [0, 10).
    let rule = n * 6 + g * 2 + 1;

    writeln!(out, "{}", "-".repeat(rule + 1))?;
    for (r, row) in data.chunks_exact(n).take(n).enumerate() {
        write!(out, "| ")?;
        for (c, x) in row.iter().enumerate() {
            write!(out, "{x:.3} ")?;
            if c % m == m - 1 {
                write!(out, "| ")?;
            }
        }
        writeln!(out)?;
        if r % m == m - 1 {
            write!(out, "{}", "-".repeat(rule))?;
        }
        writeln!(out)?;
    }
    writeln!(out)
}

/// [`write_row_major`] to stdout.
pub fn print_row_major(data: &[f32], n: usize) -> io::Result<()> {
    write_row_major(&mut io::stdout().lock(), data, n)
}

/// [`write_tiled`] to stdout.
pub fn print_tiled(data: &[f32], grid: TileGrid) -> io::Result<()> {
    write_tiled(&mut io::stdout().lock(), data, grid)
}

/// [`write_partitioned`] to stdout.
pub fn print_partitioned(data: &[f32], grid: TileGrid) -> io::Result<()> {
    write_partitioned(&mut io::stdout().lock(), data, grid)
}

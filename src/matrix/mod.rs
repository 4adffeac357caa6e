//! Square `f32` matrices in row-major and tiled layout.
//!
//! A [`Matrix`] stores element `(r, c)` at `r * N + c`. A [`TiledMatrix`]
//! partitions the same `N × N` grid into `G × G` tiles of `M × M` elements
//! (`G = N / M`): tile `(I, J)` is the contiguous block starting at
//! `(I * G + J) * M * M`, and inside a tile element `(i, j)` sits at `i * M + j`.
//! [`TileGrid`] carries `(N, M, G)` and does all of this offset arithmetic.

pub mod generate;
pub mod layout;

use std::fmt;
use std::ops::Range;

use crate::error::{validation_error, Result};
use crate::utils::AlignedVec;
use crate::ALIGNMENT;

/// Shape of a tiled `N × N` matrix: dimension, tile size and grid size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileGrid {
    n: usize,
    tile: usize,
    grid: usize,
}

impl TileGrid {
    /// Describes an `n × n` matrix cut into `tile × tile` tiles.
    ///
    /// # Errors
    ///
    /// Returns a validation error if either size is zero or `n` is not a
    /// multiple of `tile`.
    pub fn new(n: usize, tile: usize) -> Result<Self> {
        if n == 0 || tile == 0 {
            return Err(validation_error(format!(
                "matrix dimension ({n}) and tile size ({tile}) must be non-zero"
            )));
        }
        if n % tile != 0 {
            return Err(validation_error(format!(
                "matrix dimension {n} is not a multiple of tile size {tile}"
            )));
        }

        Ok(TileGrid {
            n,
            tile,
            grid: n / tile,
        })
    }

    /// Matrix dimension `N`.
    #[inline(always)]
    pub fn n(&self) -> usize {
        self.n
    }

    /// Tile dimension `M`.
    #[inline(always)]
    pub fn tile(&self) -> usize {
        self.tile
    }

    /// Number of tiles along one side, `G = N / M`.
    #[inline(always)]
    pub fn grid(&self) -> usize {
        self.grid
    }

    /// Elements per tile, `M * M`.
    #[inline(always)]
    pub fn tile_len(&self) -> usize {
        self.tile * self.tile
    }

    /// Elements per row of tiles, `G * M * M`.
    #[inline(always)]
    pub fn tile_row_len(&self) -> usize {
        self.grid * self.tile_len()
    }

    /// Elements in the whole matrix, `N * N`.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.n * self.n
    }

    /// Always `false`; a grid has at least one element.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Offset of the first element of tile `(i, j)`.
    #[inline(always)]
    pub fn tile_offset(&self, i: usize, j: usize) -> usize {
        debug_assert!(
            i < self.grid && j < self.grid,
            "tile ({i}, {j}) outside a {g}x{g} grid",
            g = self.grid
        );
        (i * self.grid + j) * self.tile_len()
    }

    /// Range of tile `(i, j)` inside a tiled buffer.
    #[inline(always)]
    pub fn tile_range(&self, i: usize, j: usize) -> Range<usize> {
        let start = self.tile_offset(i, j);
        start..start + self.tile_len()
    }

    /// Offset of logical element `(row, col)` inside a tiled buffer.
    #[inline(always)]
    pub fn element_offset(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.n && col < self.n);
        let m = self.tile;
        self.tile_offset(row / m, col / m) + (row % m) * m + col % m
    }
}

impl fmt::Display for TileGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{n}x{n} as {g}x{g} tiles of {m}x{m}",
            n = self.n,
            g = self.grid,
            m = self.tile
        )
    }
}

/// Row-major `N × N` matrix backed by one aligned buffer.
#[derive(Debug)]
pub struct Matrix {
    n: usize,
    data: AlignedVec<f32>,
}

impl Matrix {
    /// Zero-filled `n × n` matrix.
    pub fn zeros(n: usize) -> Result<Self> {
        if n == 0 {
            return Err(validation_error("matrix dimension must be non-zero"));
        }
        let len = n
            .checked_mul(n)
            .ok_or_else(|| validation_error(format!("matrix dimension {n} is too large")))?;

        Ok(Matrix {
            n,
            data: AlignedVec::zeroed(len, ALIGNMENT)?,
        })
    }

    /// Copies `values` (row-major, `n * n` elements) into a new matrix.
    pub fn from_slice(n: usize, values: &[f32]) -> Result<Self> {
        let mut matrix = Self::zeros(n)?;
        if values.len() != matrix.data.len() {
            return Err(validation_error(format!(
                "expected {} elements for a {n}x{n} matrix, got {}",
                n * n,
                values.len()
            )));
        }
        matrix.data.copy_from_slice(values);
        Ok(matrix)
    }

    /// Builds a matrix from a function of `(row, col)`.
    pub fn from_fn(n: usize, mut f: impl FnMut(usize, usize) -> f32) -> Result<Self> {
        let mut matrix = Self::zeros(n)?;
        for (idx, x) in matrix.data.iter_mut().enumerate() {
            *x = f(idx / n, idx % n);
        }
        Ok(matrix)
    }

    /// Matrix dimension `N`.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Element `(row, col)`.
    #[inline(always)]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.n + col]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Sum of the diagonal.
    pub fn trace(&self) -> f32 {
        crate::diagnostics::trace_row_major(&self.data, self.n)
    }

    /// Copies the matrix into a new, identically aligned buffer.
    pub fn try_clone(&self) -> Result<Self> {
        Ok(Matrix {
            n: self.n,
            data: self.data.try_clone()?,
        })
    }
}

/// Tiled `N × N` matrix backed by one aligned buffer.
#[derive(Debug)]
pub struct TiledMatrix {
    grid: TileGrid,
    data: AlignedVec<f32>,
}

impl TiledMatrix {
    /// Zero-filled tiled matrix; the required starting state of a product.
    pub fn zeros(grid: TileGrid) -> Result<Self> {
        Ok(TiledMatrix {
            grid,
            data: AlignedVec::zeroed(grid.len(), ALIGNMENT)?,
        })
    }

    pub fn grid(&self) -> TileGrid {
        self.grid
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Tile `(i, j)` as a contiguous `M * M` slice.
    #[inline(always)]
    pub fn tile(&self, i: usize, j: usize) -> &[f32] {
        &self.data[self.grid.tile_range(i, j)]
    }

    /// Mutable tile `(i, j)`.
    #[inline(always)]
    pub fn tile_mut(&mut self, i: usize, j: usize) -> &mut [f32] {
        let range = self.grid.tile_range(i, j);
        &mut self.data[range]
    }

    /// Logical element `(row, col)`.
    #[inline(always)]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[self.grid.element_offset(row, col)]
    }

    /// Resets every element to zero so the matrix can receive a new product.
    pub fn clear(&mut self) {
        self.data.fill(0.0);
    }

    /// Copies the matrix into a new, identically aligned buffer.
    pub fn try_clone(&self) -> Result<Self> {
        Ok(TiledMatrix {
            grid: self.grid,
            data: self.data.try_clone()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TileGemmError;
    use crate::utils::is_aligned_to;

    #[test]
    fn test_grid_rejects_bad_shapes() {
        assert!(matches!(
            TileGrid::new(10, 4),
            Err(TileGemmError::ValidationError { .. })
        ));
        assert!(TileGrid::new(0, 4).is_err());
        assert!(TileGrid::new(8, 0).is_err());
    }

    #[test]
    fn test_grid_offsets() {
        let grid = TileGrid::new(8, 4).unwrap();
        assert_eq!(grid.grid(), 2);
        assert_eq!(grid.tile_len(), 16);
        assert_eq!(grid.tile_row_len(), 32);
        assert_eq!(grid.tile_offset(0, 1), 16);
        assert_eq!(grid.tile_offset(1, 0), 32);
        assert_eq!(grid.tile_range(1, 1), 48..64);

        // row 5, col 2 -> tile (1, 0), local (1, 2)
        assert_eq!(grid.element_offset(5, 2), 32 + 4 + 2);
        assert_eq!(grid.element_offset(7, 7), 63);
        assert_eq!(grid.to_string(), "8x8 as 2x2 tiles of 4x4");
    }

    #[test]
    fn test_buffers_are_aligned() {
        let grid = TileGrid::new(16, 8).unwrap();
        let tiled = TiledMatrix::zeros(grid).unwrap();
        let matrix = Matrix::zeros(16).unwrap();
        assert!(is_aligned_to(tiled.as_slice().as_ptr(), ALIGNMENT));
        assert!(is_aligned_to(matrix.as_slice().as_ptr(), ALIGNMENT));
        assert!(is_aligned_to(tiled.tile(1, 1).as_ptr(), ALIGNMENT));
    }

    #[test]
    fn test_from_slice_checks_length() {
        assert!(Matrix::from_slice(2, &[1.0, 2.0, 3.0]).is_err());
        let m = Matrix::from_slice(2, &[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(m.get(1, 0), 3.0);
        assert_eq!(m.trace(), 5.0);
    }

    #[test]
    fn test_from_fn_and_clear() {
        let m = Matrix::from_fn(3, |r, c| (r * 10 + c) as f32).unwrap();
        assert_eq!(m.get(2, 1), 21.0);

        let mut tiled = TiledMatrix::zeros(TileGrid::new(4, 2).unwrap()).unwrap();
        tiled.tile_mut(1, 0).fill(3.0);
        assert_eq!(tiled.get(2, 1), 3.0);
        assert_eq!(tiled.get(1, 2), 0.0);
        tiled.clear();
        assert!(tiled.as_slice().iter().all(|&x| x == 0.0));
    }
}

//! Conversions between row-major and tiled layout.
//!
//! Both directions are pure data movement: every tile row is one `M`-element
//! run, copied with `copy_from_slice`. Tiles are visited in `(I, J)` row-major
//! order and the `M` rows of a tile top to bottom, so the tiled side is written
//! (or read) strictly sequentially.

use tracing::instrument;

use super::{Matrix, TileGrid, TiledMatrix};
use crate::error::Result;

/// Repacks a row-major buffer into tiled layout.
///
/// Both slices must hold exactly `grid.len()` elements.
pub fn pack_tiles(src: &[f32], dst: &mut [f32], grid: TileGrid) {
    assert_eq!(src.len(), grid.len(), "source length does not match {grid}");
    assert_eq!(dst.len(), grid.len(), "destination length does not match {grid}");

    let (n, m, g) = (grid.n(), grid.tile(), grid.grid());
    let mut runs = dst.chunks_exact_mut(m);

    for i in 0..g {
        for j in 0..g {
            for row in 0..m {
                let start = (i * m + row) * n + j * m;
                if let Some(run) = runs.next() {
                    run.copy_from_slice(&src[start..start + m]);
                }
            }
        }
    }
}

/// Repacks a tiled buffer back into row-major layout.
///
/// Inverse of [`pack_tiles`]; both slices must hold exactly `grid.len()` elements.
pub fn unpack_tiles(src: &[f32], dst: &mut [f32], grid: TileGrid) {
    assert_eq!(src.len(), grid.len(), "source length does not match {grid}");
    assert_eq!(dst.len(), grid.len(), "destination length does not match {grid}");

    let (n, m, g) = (grid.n(), grid.tile(), grid.grid());
    let mut runs = src.chunks_exact(m);

    for i in 0..g {
        for j in 0..g {
            for row in 0..m {
                let start = (i * m + row) * n + j * m;
                if let Some(run) = runs.next() {
                    dst[start..start + m].copy_from_slice(run);
                }
            }
        }
    }
}

/// Returns a tiled copy of `src` with `tile × tile` tiles.
///
/// # Errors
///
/// Fails if `src.n()` is not a multiple of `tile` or the output buffer cannot
/// be allocated.
#[instrument(level = "debug", skip(src), fields(n = src.n()))]
pub fn to_tiled(src: &Matrix, tile: usize) -> Result<TiledMatrix> {
    let grid = TileGrid::new(src.n(), tile)?;
    let mut tiled = TiledMatrix::zeros(grid)?;
    pack_tiles(src.as_slice(), tiled.as_mut_slice(), grid);
    Ok(tiled)
}

/// Returns a row-major copy of a tiled matrix.
#[instrument(level = "debug", skip_all, fields(grid = %src.grid()))]
pub fn to_row_major(src: &TiledMatrix) -> Result<Matrix> {
    let grid = src.grid();
    let mut matrix = Matrix::zeros(grid.n())?;
    unpack_tiles(src.as_slice(), matrix.as_mut_slice(), grid);
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_4x4_into_2x2_tiles() {
        let src: Vec<f32> = (0..16).map(|x| x as f32).collect();
        let grid = TileGrid::new(4, 2).unwrap();
        let mut dst = vec![0.0; 16];

        pack_tiles(&src, &mut dst, grid);

        #[rustfmt::skip]
        let expected = [
            0.0, 1.0, 4.0, 5.0,
            2.0, 3.0, 6.0, 7.0,
            8.0, 9.0, 12.0, 13.0,
            10.0, 11.0, 14.0, 15.0,
        ];
        assert_eq!(dst, expected);
    }

    #[test]
    fn test_single_tile_is_identity() {
        let src: Vec<f32> = (0..9).map(|x| x as f32 * 0.5).collect();
        let grid = TileGrid::new(3, 3).unwrap();
        let mut dst = vec![0.0; 9];
        pack_tiles(&src, &mut dst, grid);
        assert_eq!(dst, src);
    }

    #[test]
    fn test_unit_tiles_are_identity() {
        let src: Vec<f32> = (0..25).map(|x| x as f32).collect();
        let grid = TileGrid::new(5, 1).unwrap();
        let mut dst = vec![0.0; 25];
        pack_tiles(&src, &mut dst, grid);
        assert_eq!(dst, src);
    }

    #[test]
    fn test_round_trip_is_exact() {
        let matrix = Matrix::from_fn(12, |r, c| (r as f32).sin() + c as f32 * 1e-3).unwrap();
        for tile in [1, 2, 3, 4, 6, 12] {
            let tiled = to_tiled(&matrix, tile).unwrap();
            let back = to_row_major(&tiled).unwrap();
            assert_eq!(back.as_slice(), matrix.as_slice(), "tile size {tile}");
        }
    }

    #[test]
    fn test_tiled_get_matches_row_major() {
        let matrix = Matrix::from_fn(8, |r, c| (r * 8 + c) as f32).unwrap();
        let tiled = to_tiled(&matrix, 4).unwrap();
        for r in 0..8 {
            for c in 0..8 {
                assert_eq!(tiled.get(r, c), matrix.get(r, c));
            }
        }
    }

    #[test]
    fn test_to_tiled_rejects_bad_tile() {
        let matrix = Matrix::zeros(6).unwrap();
        assert!(to_tiled(&matrix, 4).is_err());
    }
}

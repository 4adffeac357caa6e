use rand::prelude::*;
use tilegemm::matrix::layout::{pack_tiles, unpack_tiles};
use tilegemm::{to_row_major, to_tiled, Matrix, TileGrid};

fn random_matrix(n: usize, rng: &mut StdRng) -> Matrix {
    Matrix::from_fn(n, |_, _| rng.random_range(-1.0..1.0)).unwrap()
}

#[test]
fn test_round_trip_is_exact() {
    let mut rng = StdRng::seed_from_u64(7);

    for (n, tile) in [(1, 1), (6, 3), (16, 4), (32, 8), (48, 16), (64, 64)] {
        let src = random_matrix(n, &mut rng);
        let tiled = to_tiled(&src, tile).unwrap();
        let back = to_row_major(&tiled).unwrap();
        assert_eq!(back.as_slice(), src.as_slice(), "n = {n}, tile = {tile}");
    }
}

#[test]
fn test_tiled_elements_match_row_major() {
    let mut rng = StdRng::seed_from_u64(11);
    let src = random_matrix(24, &mut rng);
    let tiled = to_tiled(&src, 8).unwrap();

    for row in 0..24 {
        for col in 0..24 {
            assert_eq!(tiled.get(row, col), src.get(row, col));
        }
    }

    // Tile (1, 2) starts at logical (8, 16).
    assert_eq!(tiled.tile(1, 2)[0], src.get(8, 16));
    assert_eq!(tiled.tile(1, 2)[8 * 8 - 1], src.get(15, 23));
}

#[test]
fn test_slice_level_round_trip() {
    let grid = TileGrid::new(12, 4).unwrap();
    let src: Vec<f32> = (0..144).map(|x| x as f32).collect();
    let mut tiled = vec![0.0; 144];
    let mut back = vec![0.0; 144];

    pack_tiles(&src, &mut tiled, grid);
    unpack_tiles(&tiled, &mut back, grid);

    assert_ne!(tiled, src);
    assert_eq!(back, src);
}

#[test]
fn test_rejects_tile_not_dividing_n() {
    let src = Matrix::zeros(10).unwrap();
    assert!(to_tiled(&src, 4).is_err());
}

#[test]
#[should_panic(expected = "source length")]
fn test_pack_rejects_short_source() {
    let grid = TileGrid::new(4, 2).unwrap();
    let mut dst = vec![0.0; 16];
    pack_tiles(&[0.0; 15], &mut dst, grid);
}

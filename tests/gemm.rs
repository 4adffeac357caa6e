use ndarray::Array2;
use rand::prelude::*;
use tilegemm::matrix::generate::LogisticMap;
use tilegemm::{
    generate, max_abs_difference, multiply, multiply_naive, multiply_tiled, to_row_major, to_tiled,
    Difference, Execution, Kernel, Matrix, ReferenceLayout, Strategy, TiledMatrix,
};

fn product(a: &Matrix, b: &Matrix, tile: usize, strategy: Strategy) -> TiledMatrix {
    let a = to_tiled(a, tile).unwrap();
    let b = to_tiled(b, tile).unwrap();
    let mut c = TiledMatrix::zeros(a.grid()).unwrap();
    multiply(&a, &b, &mut c, strategy).unwrap();
    c
}

fn ndarray_product(a: &Matrix, b: &Matrix) -> Vec<f32> {
    let n = a.n();
    let a = Array2::from_shape_vec((n, n), a.as_slice().to_vec()).unwrap();
    let b = Array2::from_shape_vec((n, n), b.as_slice().to_vec()).unwrap();
    a.dot(&b).iter().copied().collect()
}

/// Summation error bound for an `n`-term dot product at the observed magnitude.
fn assert_close(d: Difference, n: usize, what: &str) {
    let epsilon = n as f32 * f32::EPSILON * d.reference_max.max(1.0);
    assert!(
        d.max_abs_diff <= epsilon,
        "{what}: max |diff| {} exceeds {epsilon}",
        d.max_abs_diff
    );
}

#[test]
fn test_2x2_scalar_product_is_exact() {
    let a = Matrix::from_slice(2, &[1.0, 2.0, 3.0, 4.0]).unwrap();
    let b = Matrix::from_slice(2, &[5.0, 6.0, 7.0, 8.0]).unwrap();
    let c = to_row_major(&product(&a, &b, 2, Strategy::Scalar)).unwrap();
    assert_eq!(c.as_slice(), &[19.0, 22.0, 43.0, 50.0]);
}

#[test]
fn test_generator_is_deterministic_for_seed_0_4() {
    let (a, b) = generate(0.4, 8).unwrap();
    let (a2, b2) = generate(0.4, 8).unwrap();
    assert_eq!(a.as_slice(), a2.as_slice());
    assert_eq!(b.as_slice(), b2.as_slice());

    let first = 0.4f32 * (1.0 - 0.4) * 4.0;
    assert_eq!(a.get(0, 0), first);
    assert_eq!(b.get(0, 0), first * (1.0 - first) * 4.0);

    let stream: Vec<f32> = LogisticMap::new(0.4).take(128).collect();
    assert_eq!(a.get(7, 7), stream[126]);
    assert_eq!(b.get(7, 7), stream[127]);

    let c1 = product(&a, &b, 4, Strategy::Scalar);
    let c2 = product(&a2, &b2, 4, Strategy::Scalar);
    assert_eq!(c1.as_slice(), c2.as_slice());
}

#[test]
fn test_all_strategies_match_scalar() {
    let n = 128;
    let (a, b) = generate(0.4, n).unwrap();
    let reference = product(&a, &b, 32, Strategy::Scalar);

    for strategy in Strategy::ALL {
        let c = product(&a, &b, 32, strategy);
        let d = max_abs_difference(reference.as_slice(), c.as_slice(), c.grid(), ReferenceLayout::Tiled)
            .unwrap();
        assert_close(d, n, strategy.name());
    }
}

#[test]
fn test_tiled_matches_ndarray_dot() {
    let n = 96;
    let mut rng = StdRng::seed_from_u64(2024);
    let a = Matrix::from_fn(n, |_, _| rng.random_range(-1.0..1.0)).unwrap();
    let b = Matrix::from_fn(n, |_, _| rng.random_range(-1.0..1.0)).unwrap();
    let expected = ndarray_product(&a, &b);

    for strategy in [Strategy::Scalar, Strategy::Vector8, Strategy::Vector8Parallel] {
        let c = product(&a, &b, 24, strategy);
        let d = max_abs_difference(&expected, c.as_slice(), c.grid(), ReferenceLayout::RowMajor).unwrap();
        assert_close(d, n, strategy.name());
    }

    let c = product(&a, &b, 48, Strategy::Vector16Parallel);
    let d = max_abs_difference(&expected, c.as_slice(), c.grid(), ReferenceLayout::RowMajor).unwrap();
    assert_close(d, n, "vector16-parallel");
}

#[test]
fn test_naive_matches_tiled() {
    let n = 64;
    let (a, b) = generate(0.3, n).unwrap();
    let naive = multiply_naive(&a, &b).unwrap();
    let c = product(&a, &b, 16, Strategy::Vector16);
    let d = max_abs_difference(naive.as_slice(), c.as_slice(), c.grid(), ReferenceLayout::RowMajor).unwrap();
    assert_close(d, n, "naive");
}

#[test]
fn test_serial_and_parallel_are_identical() {
    let (a, b) = generate(0.4, 128).unwrap();
    let a = to_tiled(&a, 16).unwrap();
    let b = to_tiled(&b, 16).unwrap();

    for kernel in Kernel::ALL {
        let mut serial = TiledMatrix::zeros(a.grid()).unwrap();
        let mut parallel = TiledMatrix::zeros(a.grid()).unwrap();
        multiply_tiled(&a, &b, &mut serial, kernel, Execution::Serial).unwrap();
        multiply_tiled(&a, &b, &mut parallel, kernel, Execution::Parallel).unwrap();
        assert_eq!(serial.as_slice(), parallel.as_slice(), "{kernel}");
    }
}

#[test]
fn test_second_call_accumulates() {
    let (a, b) = generate(0.4, 32).unwrap();
    let a = to_tiled(&a, 32).unwrap();
    let b = to_tiled(&b, 32).unwrap();

    let mut once = TiledMatrix::zeros(a.grid()).unwrap();
    multiply(&a, &b, &mut once, Strategy::Scalar).unwrap();

    let mut twice = TiledMatrix::zeros(a.grid()).unwrap();
    multiply(&a, &b, &mut twice, Strategy::Scalar).unwrap();
    multiply(&a, &b, &mut twice, Strategy::Scalar).unwrap();

    // One tile and the scalar kernel: C gets a single finished sum per call.
    let doubled: Vec<f32> = once.as_slice().iter().map(|x| 2.0 * x).collect();
    assert_eq!(twice.as_slice(), &doubled[..]);

    twice.clear();
    multiply(&a, &b, &mut twice, Strategy::Vector8Parallel).unwrap();
    let d = max_abs_difference(once.as_slice(), twice.as_slice(), a.grid(), ReferenceLayout::Tiled).unwrap();
    assert_close(d, 32, "cleared");
}

#[test]
fn test_trace_agrees_between_scalar_and_parallel_vector() {
    let n = 128;
    let (a, b) = generate(0.4, n).unwrap();
    let scalar = to_row_major(&product(&a, &b, 64, Strategy::Scalar)).unwrap();
    let vector = to_row_major(&product(&a, &b, 64, Strategy::Vector16Parallel)).unwrap();

    let (t1, t2) = (scalar.trace(), vector.trace());
    let epsilon = (n * n) as f32 * f32::EPSILON * t1.abs();
    assert!((t1 - t2).abs() <= epsilon, "{t1} vs {t2}");
}

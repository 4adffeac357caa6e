use tilegemm::bench::{run, BenchConfig};
use tilegemm::{generate, multiply, to_row_major, to_tiled, Strategy, TiledMatrix};

fn config(strategies: &[Strategy]) -> BenchConfig {
    BenchConfig {
        n: 128,
        tile: 32,
        strategies: strategies.to_vec(),
        ..BenchConfig::default()
    }
}

#[test]
fn test_report_trace_matches_last_strategy() {
    let strategies = [Strategy::Scalar, Strategy::Vector8Parallel];
    let report = run(&config(&strategies)).unwrap();

    let (a, b) = generate(0.4, 128).unwrap();
    let a = to_tiled(&a, 32).unwrap();
    let b = to_tiled(&b, 32).unwrap();
    let mut c = TiledMatrix::zeros(a.grid()).unwrap();
    multiply(&a, &b, &mut c, Strategy::Vector8Parallel).unwrap();

    assert_eq!(report.trace, to_row_major(&c).unwrap().trace());
    assert_eq!(report.products.len(), 2);
    assert_eq!(report.products[1].label, "vector8-parallel");
}

#[test]
fn test_verified_run_stays_within_tolerance() {
    let config = BenchConfig {
        baseline: true,
        threads: Some(3),
        ..config(&Strategy::ALL)
    };
    let report = run(&config).unwrap();

    let worst = report.max_difference().unwrap();
    assert!(worst < 128.0 * f32::EPSILON * 64.0, "max difference {worst}");
    assert_eq!(report.threads, 3);
}

#[test]
fn test_single_strategy_run() {
    let report = run(&config(&[Strategy::Vector16])).unwrap();
    assert_eq!(report.products.len(), 1);
    assert!(report.products[0].difference.is_none());
    assert!(report.baseline.is_none());
    assert!(report.trace.is_finite());
}

#[test]
fn test_report_display() {
    let report = run(&config(&[Strategy::Scalar, Strategy::Vector8])).unwrap();
    let text = report.to_string();

    assert!(text.starts_with("run started "));
    assert!(text.contains("128x128 as 4x4 tiles of 32x32"));
    for label in ["generate", "tile", "untile", "scalar", "vector8"] {
        assert!(text.contains(label), "missing {label}");
    }
}

#[test]
fn test_invalid_configs_are_rejected() {
    let bad_tile = BenchConfig {
        tile: 24,
        ..config(&[Strategy::Scalar])
    };
    assert!(run(&bad_tile).is_err());

    let bad_kernel = BenchConfig {
        tile: 8,
        ..config(&[Strategy::Vector16Parallel])
    };
    assert!(run(&bad_kernel).is_err());

    assert!(run(&config(&[])).is_err());
}

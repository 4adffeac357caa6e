//! End-to-end benchmark of the tiled multiplication strategies.
//!
//! [`run`] generates A and B, repacks them into tiles, times every requested
//! [`Strategy`] into a fresh zeroed C, optionally times the naive row-major
//! product, unpacks the last result and reports its trace. With verification
//! on, every strategy is compared with the first one and the naive product
//! with the tiled result.

use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{info, info_span, warn};

use crate::diagnostics::{max_abs_difference, Difference, ReferenceLayout};
use crate::error::{thread_pool_error, validation_error, Result};
use crate::gemm::{multiply, multiply_naive, Strategy};
use crate::matrix::generate::generate;
use crate::matrix::layout::{to_row_major, to_tiled};
use crate::matrix::{TileGrid, TiledMatrix};
use crate::{DEFAULT_N, DEFAULT_SEED, DEFAULT_TILE};

/// What to benchmark.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchConfig {
    /// Matrix dimension `N`.
    pub n: usize,
    /// Tile dimension `M`.
    pub tile: usize,
    /// Generator seed.
    pub seed: f32,
    /// Strategies to time, in order. The first one is the reference for verification.
    pub strategies: Vec<Strategy>,
    /// Worker count for parallel strategies; `None` uses the global rayon pool.
    pub threads: Option<usize>,
    /// Also time the naive row-major product.
    pub baseline: bool,
    /// Compare results between strategies.
    pub verify: bool,
}

impl Default for BenchConfig {
    fn default() -> Self {
        BenchConfig {
            n: DEFAULT_N,
            tile: DEFAULT_TILE,
            seed: DEFAULT_SEED,
            strategies: Strategy::hardware_defaults(),
            threads: None,
            baseline: false,
            verify: true,
        }
    }
}

impl BenchConfig {
    /// Checks that the shape, strategies and thread count fit together.
    pub fn validate(&self) -> Result<TileGrid> {
        let grid = TileGrid::new(self.n, self.tile)?;

        if self.strategies.is_empty() {
            return Err(validation_error("at least one strategy is required"));
        }
        if let Some(strategy) = self.strategies.iter().find(|s| !s.kernel().supports(self.tile)) {
            return Err(validation_error(format!(
                "strategy {strategy} needs a tile size that is a multiple of {}, got {}",
                strategy.kernel().lanes(),
                self.tile
            )));
        }
        if self.threads == Some(0) {
            return Err(validation_error("thread count must be at least 1"));
        }

        Ok(grid)
    }
}

/// Wall-clock time of one driver stage.
#[derive(Debug, Clone, PartialEq)]
pub struct StageTiming {
    pub label: &'static str,
    pub elapsed: Duration,
}

/// Timing and verification outcome of one multiplication.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRun {
    pub label: String,
    pub elapsed: Duration,
    /// Difference to the reference, when verification ran.
    pub difference: Option<Difference>,
}

/// Everything [`run`] measured.
#[derive(Debug, Clone)]
pub struct BenchReport {
    pub started_at: DateTime<Local>,
    pub grid: TileGrid,
    pub seed: f32,
    pub threads: usize,
    /// Generation, tiling and untiling.
    pub stages: Vec<StageTiming>,
    /// One entry per strategy, in the configured order.
    pub products: Vec<ProductRun>,
    pub baseline: Option<ProductRun>,
    /// Trace of the last strategy's product.
    pub trace: f32,
}

impl BenchReport {
    /// Largest difference seen by any verified run.
    pub fn max_difference(&self) -> Option<f32> {
        self.products
            .iter()
            .chain(self.baseline.as_ref())
            .filter_map(|run| run.difference.map(|d| d.max_abs_diff))
            .reduce(f32::max)
    }
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1e3
}

/// Runs the benchmark described by `config`.
///
/// # Errors
///
/// Returns a validation error for an inconsistent configuration, a thread
/// pool error if the dedicated pool cannot be built, and allocation errors
/// from the matrix buffers.
pub fn run(config: &BenchConfig) -> Result<BenchReport> {
    let grid = config.validate()?;
    let started_at = Local::now();
    let _span = info_span!("bench", %grid).entered();

    let pool = config.threads.map(build_pool).transpose()?;
    let threads = pool
        .as_ref()
        .map_or_else(rayon::current_num_threads, ThreadPool::current_num_threads);

    for strategy in &config.strategies {
        if !strategy.kernel().is_hardware_accelerated() {
            warn!(%strategy, "no hardware backend in this build, running portable loops");
        }
    }

    let mut stages = Vec::with_capacity(3);

    let start = Instant::now();
    let (a, b) = generate(config.seed, config.n)?;
    stages.push(stage("generate", start));

    let start = Instant::now();
    let a_tiled = to_tiled(&a, config.tile)?;
    let b_tiled = to_tiled(&b, config.tile)?;
    stages.push(stage("tile", start));

    let mut products = Vec::with_capacity(config.strategies.len());
    let mut reference: Option<TiledMatrix> = None;
    let mut latest: Option<TiledMatrix> = None;

    for &strategy in &config.strategies {
        let mut c = TiledMatrix::zeros(grid)?;

        let start = Instant::now();
        match &pool {
            Some(pool) => pool.install(|| multiply(&a_tiled, &b_tiled, &mut c, strategy))?,
            None => multiply(&a_tiled, &b_tiled, &mut c, strategy)?,
        }
        let elapsed = start.elapsed();
        info!(%strategy, elapsed_ms = millis(elapsed), "multiplied");

        let difference = match (&reference, config.verify) {
            (Some(reference), true) => Some(max_abs_difference(
                reference.as_slice(),
                c.as_slice(),
                grid,
                ReferenceLayout::Tiled,
            )?),
            _ => None,
        };

        products.push(ProductRun {
            label: strategy.to_string(),
            elapsed,
            difference,
        });

        if reference.is_none() {
            reference = Some(c);
        } else {
            latest = Some(c);
        }
    }

    let result = latest
        .as_ref()
        .or(reference.as_ref())
        .ok_or_else(|| validation_error("no strategy was run"))?;

    let baseline = if config.baseline {
        let start = Instant::now();
        let naive = multiply_naive(&a, &b)?;
        let elapsed = start.elapsed();
        info!(elapsed_ms = millis(elapsed), "naive baseline");

        let difference = if config.verify {
            Some(max_abs_difference(
                naive.as_slice(),
                result.as_slice(),
                grid,
                ReferenceLayout::RowMajor,
            )?)
        } else {
            None
        };

        Some(ProductRun {
            label: "naive".to_string(),
            elapsed,
            difference,
        })
    } else {
        None
    };

    let start = Instant::now();
    let product = to_row_major(result)?;
    stages.push(stage("untile", start));

    let trace = product.trace();
    info!(trace, "done");

    Ok(BenchReport {
        started_at,
        grid,
        seed: config.seed,
        threads,
        stages,
        products,
        baseline,
        trace,
    })
}

fn build_pool(threads: usize) -> Result<ThreadPool> {
    ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| thread_pool_error(e.to_string()))
}

fn stage(label: &'static str, start: Instant) -> StageTiming {
    let elapsed = start.elapsed();
    info!(stage = label, elapsed_ms = millis(elapsed));
    StageTiming { label, elapsed }
}

impl fmt::Display for BenchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "run started {}", self.started_at.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(f, "{}, seed {}, {} threads", self.grid, self.seed, self.threads)?;
        writeln!(f)?;

        writeln!(f, "{:<20} {:>12} {:>14}", "stage", "time (ms)", "max |diff|")?;
        for s in &self.stages {
            writeln!(f, "{:<20} {:>12.3} {:>14}", s.label, millis(s.elapsed), "")?;
        }
        for run in self.products.iter().chain(self.baseline.as_ref()) {
            match run.difference {
                Some(d) => writeln!(
                    f,
                    "{:<20} {:>12.3} {:>14.6e}",
                    run.label,
                    millis(run.elapsed),
                    d.max_abs_diff
                )?,
                None => writeln!(f, "{:<20} {:>12.3} {:>14}", run.label, millis(run.elapsed), "-")?,
            }
        }

        writeln!(f)?;
        write!(f, "trace {}", self.trace)
    }
}

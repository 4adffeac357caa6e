use std::process::ExitCode;

use clap::Parser;
use tilegemm::bench::{run, BenchConfig};
use tilegemm::{Strategy, DEFAULT_N, DEFAULT_SEED, DEFAULT_TILE};
use tracing_forest::util::LevelFilter;
use tracing_forest::ForestLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

#[derive(Parser, Debug)]
#[command(version, about = "Benchmark blocked SIMD matrix multiplication", long_about = None)]
struct Args {
    /// Matrix dimension N.
    #[arg(default_value_t = DEFAULT_N)]
    n: usize,

    /// Tile dimension M; must divide N.
    #[arg(default_value_t = DEFAULT_TILE)]
    tile: usize,

    /// Seed of the logistic-map generator.
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    seed: f32,

    /// Strategy to time; repeat for several. Defaults to every hardware-backed one.
    #[arg(long = "strategy", ignore_case = true, value_enum)]
    strategies: Vec<Strategy>,

    /// Worker threads for parallel strategies.
    #[arg(short, long)]
    threads: Option<usize>,

    /// Also time the naive row-major product.
    #[arg(long)]
    baseline: bool,

    /// Skip the result comparisons.
    #[arg(long)]
    no_verify: bool,
}

impl From<Args> for BenchConfig {
    fn from(args: Args) -> Self {
        let strategies = if args.strategies.is_empty() {
            Strategy::hardware_defaults()
        } else {
            args.strategies
        };

        BenchConfig {
            n: args.n,
            tile: args.tile,
            seed: args.seed,
            strategies,
            threads: args.threads,
            baseline: args.baseline,
            verify: !args.no_verify,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    Registry::default()
        .with(env_filter)
        .with(ForestLayer::default())
        .init();

    match run(&BenchConfig::from(args)) {
        Ok(report) => {
            println!("{report}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

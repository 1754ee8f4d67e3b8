//! MIXR Runner
//!
//! Loads a component tree from a document and drives it in real time.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use mixr::default_factory;
use mixr::runner::Runner;
use mixr::settings::Overrides;

/// MIXR component tree runner
#[derive(Parser, Debug)]
#[command(name = "mixr")]
#[command(about = "Run a MIXR component tree", long_about = None)]
struct Args {
    /// Component document (TOML, or JSON with a .json extension)
    config: PathBuf,

    /// Time-critical update rate in Hz
    #[arg(long)]
    tc_rate: Option<f64>,

    /// Background update rate in Hz
    #[arg(long)]
    background_rate: Option<f64>,

    /// Stop after this many seconds
    #[arg(short, long)]
    duration: Option<f64>,

    /// Collect frame timing statistics on the root component
    #[arg(long)]
    timing_stats: bool,

    /// Periodically log the frame timing statistics
    #[arg(long)]
    print_timing_stats: bool,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            tc_rate_hz: self.tc_rate,
            background_rate_hz: self.background_rate,
            duration_secs: self.duration,
            timing_stats: self.timing_stats || self.print_timing_stats,
            print_timing_stats: self.print_timing_stats,
        }
    }
}

fn main() -> Result<()> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?
        .block_on(async_main())
}

async fn async_main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mixr=info,mixr_base=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting MIXR runner v{}", env!("CARGO_PKG_VERSION"));
    info!("Loading component tree from: {}", args.config.display());

    let factory = default_factory();
    let mut runner = Runner::load(&args.config, &factory)?;
    *runner.config_mut() = runner.config().clone().with_overrides(&args.overrides());

    let summary = runner.run().await?;
    info!("Runner stopped ({})", summary.reason);
    Ok(())
}

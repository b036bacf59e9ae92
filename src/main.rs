use amdahl::{cli::Cli, driver, model::RunConfig};
use anyhow::Result;
use clap::Parser;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() -> Result<()> {
    // Clock starts at process start so the closing line covers everything.
    let start = Instant::now();

    let args = Cli::parse();
    init_tracing(args.debug);

    let config = RunConfig::new(args.work_seconds, args.parallel_proportion)?;

    let report = driver::run_simulation(config, args.workers as usize)?;
    tracing::debug!(?report, "run finished");

    println!();
    println!(
        "Total execution time (according to rank 0): {:.6} seconds",
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

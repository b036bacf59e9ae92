//! CLI argument parsing for the Amdahl workload simulator

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "amdahl")]
#[command(version)]
#[command(
    about = "Illustrate Amdahl's law with a simulated serial/parallel workload",
    long_about = None
)]
pub struct Cli {
    /// Proportion of the workload that benefits from parallel workers, in (0, 1]
    #[arg(
        short = 'p',
        long = "parallel-proportion",
        value_name = "FLOAT",
        default_value_t = 0.8,
        value_parser = parse_proportion
    )]
    pub parallel_proportion: f64,

    /// Total seconds of simulated workload, a positive integer
    #[arg(
        short = 'w',
        long = "work-seconds",
        value_name = "SECONDS",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub work_seconds: u64,

    /// Number of cooperating workers (default: available parallelism)
    #[arg(
        short = 'n',
        long = "workers",
        value_name = "COUNT",
        default_value_t = default_workers(),
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub workers: u64,

    /// Enable debug logging to stderr
    #[arg(long)]
    pub debug: bool,
}

/// Stand-in for the MPI launcher's rank count: one worker per core.
fn default_workers() -> u64 {
    std::thread::available_parallelism()
        .map(|n| n.get() as u64)
        .unwrap_or(1)
}

fn parse_proportion(text: &str) -> Result<f64, String> {
    let value: f64 = text
        .parse()
        .map_err(|e| format!("not a valid float: {e}"))?;
    if value > 0.0 && value <= 1.0 {
        Ok(value)
    } else {
        Err(format!(
            "parallel proportion must be within (0, 1], got {value}"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["amdahl"]);
        assert_eq!(cli.parallel_proportion, 0.8);
        assert_eq!(cli.work_seconds, 30);
        assert!(cli.workers >= 1);
        assert!(!cli.debug);
    }

    #[test]
    fn test_cli_parses_short_flags() {
        let cli = Cli::parse_from(["amdahl", "-p", "0.5", "-w", "10", "-n", "4"]);
        assert_eq!(cli.parallel_proportion, 0.5);
        assert_eq!(cli.work_seconds, 10);
        assert_eq!(cli.workers, 4);
    }

    #[test]
    fn test_cli_parses_long_flags() {
        let cli = Cli::parse_from([
            "amdahl",
            "--parallel-proportion",
            "1.0",
            "--work-seconds",
            "1",
            "--workers",
            "2",
            "--debug",
        ]);
        assert_eq!(cli.parallel_proportion, 1.0);
        assert_eq!(cli.work_seconds, 1);
        assert_eq!(cli.workers, 2);
        assert!(cli.debug);
    }

    #[test]
    fn test_cli_rejects_proportion_above_one() {
        assert!(Cli::try_parse_from(["amdahl", "-p", "1.5"]).is_err());
    }

    #[test]
    fn test_cli_rejects_zero_proportion() {
        assert!(Cli::try_parse_from(["amdahl", "-p", "0"]).is_err());
    }

    #[test]
    fn test_cli_rejects_zero_work_seconds() {
        assert!(Cli::try_parse_from(["amdahl", "-w", "0"]).is_err());
    }

    #[test]
    fn test_cli_rejects_zero_workers() {
        assert!(Cli::try_parse_from(["amdahl", "-n", "0"]).is_err());
    }
}

//! partplace CLI: floorplans partial-reconfiguration designs.
//!
//! Provides `partplace solve` to search for a floorplan and write the solution
//! file, and `partplace check` to run the resource precheck without solving.

#![warn(missing_docs)]

mod check;
mod pipeline;
mod solve;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// partplace: a floorplanner for partially reconfigurable FPGA designs.
#[derive(Parser, Debug)]
#[command(name = "partplace", version, about = "Partial-reconfiguration floorplanner")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Show progress notes as well as warnings and errors.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a custom `partplace.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search for a floorplan of one or more designs.
    Solve(SolveArgs),
    /// Compare a design's resource demand with its board.
    Check(CheckArgs),
}

/// Arguments for the `partplace solve` subcommand.
#[derive(Parser, Debug)]
pub struct SolveArgs {
    /// Design files to solve.
    #[arg(required = true, num_args = 1..)]
    pub designs: Vec<PathBuf>,

    /// Write the solution to this file instead of stdout (single design only).
    #[arg(short, long, conflicts_with = "out_dir")]
    pub output: Option<PathBuf>,

    /// Write each solution to `<dir>/<design file name>`.
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Output format for the run report.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Seed for the disruption and improvement random streams.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of improvement rounds.
    #[arg(long)]
    pub rounds: Option<usize>,

    /// Number of concurrent improvement workers.
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Stop searching after this many seconds and keep the best floorplan.
    #[arg(long, value_name = "SECS")]
    pub time_limit: Option<u64>,

    /// Print a map of the floorplan to stderr.
    #[arg(long)]
    pub map: bool,
}

/// Arguments for the `partplace check` subcommand.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Design file to check.
    pub design: PathBuf,

    /// Output format for the report.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Report output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print progress notes.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => std::io::stderr().is_terminal(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
    };

    let result = match cli.command {
        Command::Solve(ref args) => solve::run(args, &global),
        Command::Check(ref args) => check::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_solve_default() {
        let cli = Cli::parse_from(["partplace", "solve", "a.txt"]);
        match cli.command {
            Command::Solve(ref args) => {
                assert_eq!(args.designs, vec![PathBuf::from("a.txt")]);
                assert!(args.output.is_none());
                assert!(args.out_dir.is_none());
                assert_eq!(args.format, ReportFormat::Text);
                assert!(args.seed.is_none());
                assert!(args.rounds.is_none());
                assert!(args.jobs.is_none());
                assert!(args.time_limit.is_none());
                assert!(!args.map);
            }
            _ => panic!("expected Solve command"),
        }
    }

    #[test]
    fn parse_solve_with_overrides() {
        let cli = Cli::parse_from([
            "partplace",
            "solve",
            "a.txt",
            "-o",
            "a.out",
            "--seed",
            "7",
            "--rounds",
            "3",
            "-j",
            "8",
            "--time-limit",
            "60",
            "--map",
        ]);
        match cli.command {
            Command::Solve(ref args) => {
                assert_eq!(args.output.as_deref(), Some(std::path::Path::new("a.out")));
                assert_eq!(args.seed, Some(7));
                assert_eq!(args.rounds, Some(3));
                assert_eq!(args.jobs, Some(8));
                assert_eq!(args.time_limit, Some(60));
                assert!(args.map);
            }
            _ => panic!("expected Solve command"),
        }
    }

    #[test]
    fn parse_solve_batch() {
        let cli = Cli::parse_from(["partplace", "solve", "a.txt", "b.txt", "--out-dir", "out"]);
        match cli.command {
            Command::Solve(ref args) => {
                assert_eq!(args.designs.len(), 2);
                assert_eq!(args.out_dir.as_deref(), Some(std::path::Path::new("out")));
            }
            _ => panic!("expected Solve command"),
        }
    }

    #[test]
    fn solve_requires_a_design() {
        assert!(Cli::try_parse_from(["partplace", "solve"]).is_err());
    }

    #[test]
    fn output_conflicts_with_out_dir() {
        let parsed = Cli::try_parse_from(["partplace", "solve", "a.txt", "-o", "x", "--out-dir", "d"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn parse_check_json() {
        let cli = Cli::parse_from(["partplace", "check", "a.txt", "--format", "json"]);
        match cli.command {
            Command::Check(ref args) => {
                assert_eq!(args.design, PathBuf::from("a.txt"));
                assert_eq!(args.format, ReportFormat::Json);
            }
            _ => panic!("expected Check command"),
        }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from(["partplace", "--quiet", "--color", "never", "check", "a.txt"]);
        assert!(cli.quiet);
        assert!(!cli.verbose);
        assert_eq!(cli.color, ColorChoice::Never);
    }

    #[test]
    fn parse_config_path() {
        let cli = Cli::parse_from(["partplace", "--config", "/tmp/partplace.toml", "check", "a.txt"]);
        assert_eq!(cli.config.as_deref(), Some("/tmp/partplace.toml"));
    }
}

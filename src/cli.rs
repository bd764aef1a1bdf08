// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `plandag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "plandag",
    version,
    about = "Schedule and simulate project plans stored as task DAGs.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// If omitted, `Plandag.toml` in the current working directory is used
    /// when present, and built-in defaults otherwise.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PLANDAG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Load a plan, rationalize its edges and check the DAG rules.
    Validate {
        /// Plan file (JSON).
        plan: PathBuf,
    },
    /// Print early/late spans and slack per task, plus the critical path.
    Slack {
        plan: PathBuf,
    },
    /// Sample task durations and report alternate critical paths.
    Simulate {
        plan: PathBuf,

        /// Number of sampling rounds; overrides `[simulation].loops`.
        #[arg(long, value_name = "N")]
        loops: Option<usize>,

        /// RNG seed; overrides `[simulation].seed`.
        #[arg(long, value_name = "SEED")]
        seed: Option<u64>,
    },
    /// Mark every task as complete as it would be if on schedule `today`.
    Catchup {
        plan: PathBuf,

        /// Day number, counted from the plan start, to catch up to.
        #[arg(long, value_name = "DAY")]
        today: f64,

        /// Write the updated plan here instead of stdout.
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

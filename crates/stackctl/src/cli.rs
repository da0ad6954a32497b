//! Command-line interface definitions for stackctl.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use logging::LogArgs;
use stack_overlay::Edge;

/// Command-line interface for the `stackctl` binary.
#[derive(Parser, Debug)]
#[command(
    name = "stackctl",
    about = "Replay stack overlay scenarios against a simulated compositor",
    version
)]
pub struct Cli {
    /// Logging controls shared across workspace binaries.
    #[command(flatten)]
    pub log: LogArgs,

    /// What to do with the scenario.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay every step of a scenario and print both overlays after each one.
    Run(RunArgs),
    /// Resolve the overlay placement for one window of a scenario.
    Resolve(ResolveArgs),
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Scenario file (RON).
    #[arg(value_name = "SCENARIO")]
    pub scenario: PathBuf,

    /// Optional overlay configuration (RON); defaults apply when omitted.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Arguments for the `resolve` subcommand.
#[derive(Args, Debug, Clone)]
pub struct ResolveArgs {
    /// Scenario file (RON). Only its layout is used; steps are ignored.
    #[arg(value_name = "SCENARIO")]
    pub scenario: PathBuf,

    /// Name of the window to resolve.
    #[arg(long, value_name = "NAME")]
    pub window: String,

    /// Force an edge instead of picking it from the window's position.
    #[arg(long, value_enum)]
    pub edge: Option<EdgeArg>,

    /// Optional overlay configuration (RON); defaults apply when omitted.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Monitor edge as spelled on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeArg {
    /// Left edge.
    Left,
    /// Right edge.
    Right,
}

impl From<EdgeArg> for Edge {
    fn from(arg: EdgeArg) -> Self {
        match arg {
            EdgeArg::Left => Self::Left,
            EdgeArg::Right => Self::Right,
        }
    }
}

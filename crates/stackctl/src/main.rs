#![warn(missing_docs)]

//! Entry point for the `stackctl` binary.

mod cli;
mod error;
mod replay;
mod scenario;

use std::{io, process};

use clap::Parser;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, registry};

use crate::{
    cli::{Cli, Commands},
    error::Result,
};

fn main() {
    if let Err(err) = run() {
        error!("{err}");
        eprintln!("error: {err}");
        process::exit(1);
    }
}

/// Parse CLI arguments, install logging, and dispatch to the chosen subcommand.
fn run() -> Result<()> {
    let Cli { log, command } = Cli::parse();
    let env_filter = logging::env_filter_from_spec(&log.spec());
    registry()
        .with(env_filter)
        .with(fmt::layer().without_time().with_writer(io::stderr))
        .try_init()
        .ok();

    match command {
        Commands::Run(args) => replay::run(&args),
        Commands::Resolve(args) => replay::resolve_window(&args),
    }
}

//! Error handling for the stackctl crate.

use std::{io, path::PathBuf, result};

use thiserror::Error;

/// Convenient result type for stackctl operations.
pub type Result<T> = result::Result<T, Error>;

/// Errors that can occur while loading or replaying a scenario.
#[derive(Debug, Error)]
pub enum Error {
    /// Wrapper for standard I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Errors surfaced by the overlay crate or the simulated host.
    #[error("Overlay error: {0}")]
    Overlay(#[from] stack_overlay::Error),
    /// The scenario file is not valid RON.
    #[error("Failed to parse scenario {}: {message}", path.display())]
    Scenario {
        /// Scenario path.
        path: PathBuf,
        /// Parser message including position.
        message: String,
    },
    /// A step or space refers to a window the scenario does not define.
    #[error("Unknown window name {0:?}")]
    UnknownWindow(String),
    /// Two windows share a name.
    #[error("Duplicate window name {0:?}")]
    DuplicateWindow(String),
}

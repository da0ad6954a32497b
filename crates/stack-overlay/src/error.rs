//! Error types for overlay configuration and host operations.
//!
//! A missing stack boundary is not an error: the resolver answers `None` and
//! the overlay goes idle.

use std::{path::PathBuf, result::Result as StdResult};

use thiserror::Error;

use crate::host::WindowId;

/// Convenient result type for the overlay crate.
pub type Result<T> = StdResult<T, Error>;

/// Errors produced while loading configuration or talking to the host.
#[derive(Debug, Error)]
pub enum Error {
    /// Config file could not be read.
    #[error("Read error at {}: {message}", path.display())]
    Read {
        /// Path that failed to read.
        path: PathBuf,
        /// Human-readable error message.
        message: String,
    },

    /// Config text is not valid RON for [`crate::OverlayConfig`].
    #[error("Config parse error{}: {message}", path.as_ref().map(|p| format!(" at {}", p.display())).unwrap_or_default())]
    Parse {
        /// Path of the offending file, when parsed from disk.
        path: Option<PathBuf>,
        /// Parser message including position.
        message: String,
    },

    /// The host does not know this window (it was closed or never existed).
    #[error("Unknown window {0}")]
    UnknownWindow(WindowId),

    /// The host refused to raise and focus a window.
    #[error("Activation of {window} failed: {message}")]
    Activation {
        /// Window that was being activated.
        window: WindowId,
        /// Reason reported by the host.
        message: String,
    },
}

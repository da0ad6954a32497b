//! stack-overlay: input-capturing overlays for edge-stacked windows.
//!
//! A scrolling tiling layout stacks windows that do not fit on screen against
//! the monitor edges, leaving only a sliver of each visible. This crate keeps
//! one overlay per edge on top of that sliver so a click reliably activates
//! the stacked window, optionally showing its application icon.
//!
//! - [`resolve()`] computes the overlay rectangle and icon offset from the
//!   neighbouring windows' geometry.
//! - [`StackOverlay`] owns one overlay node and its input handling.
//! - [`StackOverlay::is_connected`] reports the restack subscription that
//!   keeps the overlay stacked above its target while the window manager
//!   keeps rewriting the scene graph order.
//! - [`StackOverlays`] is the enable/disable lifecycle for the edge pair.
//!
//! The tiling engine and compositor are reached through the [`Tiling`] and
//! [`Compositor`] traits; [`sim::SimHost`] implements both in memory.
#![warn(unsafe_op_in_unsafe_fn)]

mod config;
mod error;
pub mod geom;
pub mod host;
mod overlay;
mod overlays;
pub mod resolve;
mod restack;
pub mod sim;


pub use config::OverlayConfig;
pub use error::{Error, Result};
pub use geom::{Edge, Point, Rect, WorkArea};
pub use host::{
    AppId, Compositor, NodeId, PointerEvent, Propagation, SubscriptionId, Tiling, WindowGeometry,
    WindowId,
};
pub use overlay::{MISSING_ICON, OverlayState, StackOverlay};
pub use overlays::StackOverlays;
pub use resolve::{Bounds, IconParams, IconPlacement, OverlayPlacement, resolve, resolve_edge};

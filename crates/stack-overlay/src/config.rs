//! Overlay configuration.
//!
//! The stack margin is owned by the tiling engine and read through
//! [`crate::Tiling`]; everything else an overlay needs lives here.

use std::{fs, path::Path, time::Duration};

use serde::Deserialize;

use crate::{Error, Result, resolve::IconParams};

/// Approximate width of the invisible resize border around windows.
pub(crate) const RESIZE_BORDER_WIDTH: i32 = 5;
/// Icon edge length; matches the tiling engine's horizontal window margin.
pub(crate) const ICON_SIZE: i32 = 20;
/// Gap between the icon and the side of the strip it hugs.
pub(crate) const ICON_MARGIN_X: i32 = 2;
/// Gap between the top of the window frame and the icon.
pub(crate) const ICON_MARGIN_Y: i32 = 4;
/// Duration of the fade-out tween.
pub(crate) const FADE_DURATION_MS: u64 = 250;

// Serde default functions
const fn default_show_icon() -> bool {
    true
}
const fn default_resize_border_width() -> i32 {
    RESIZE_BORDER_WIDTH
}
const fn default_icon_size() -> i32 {
    ICON_SIZE
}
const fn default_icon_margin_x() -> i32 {
    ICON_MARGIN_X
}
const fn default_icon_margin_y() -> i32 {
    ICON_MARGIN_Y
}
const fn default_fade_duration_ms() -> u64 {
    FADE_DURATION_MS
}

/// Settings shared by both edge overlays.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct OverlayConfig {
    /// Render the target's application icon inside the overlay.
    #[serde(default = "default_show_icon")]
    pub show_icon: bool,
    /// Width of the resize border kept clear next to the bounding neighbour.
    #[serde(default = "default_resize_border_width")]
    pub resize_border_width: i32,
    /// Icon edge length in pixels.
    #[serde(default = "default_icon_size")]
    pub icon_size: i32,
    /// Horizontal icon margin.
    #[serde(default = "default_icon_margin_x")]
    pub icon_margin_x: i32,
    /// Vertical icon margin below the top of the window frame.
    #[serde(default = "default_icon_margin_y")]
    pub icon_margin_y: i32,
    /// Fade-out duration in milliseconds.
    #[serde(default = "default_fade_duration_ms")]
    pub fade_duration_ms: u64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            show_icon: default_show_icon(),
            resize_border_width: RESIZE_BORDER_WIDTH,
            icon_size: ICON_SIZE,
            icon_margin_x: ICON_MARGIN_X,
            icon_margin_y: ICON_MARGIN_Y,
            fade_duration_ms: FADE_DURATION_MS,
        }
    }
}

impl OverlayConfig {
    /// Parse a configuration from RON text.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| Error::Parse {
            path: None,
            message: e.to_string(),
        })
    }

    /// Load a configuration from a `.ron` file.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        ron::from_str(&text).map_err(|e| Error::Parse {
            path: Some(path.to_path_buf()),
            message: e.to_string(),
        })
    }

    /// Icon parameters for the resolver.
    #[must_use]
    pub fn icon_params(&self) -> IconParams {
        IconParams {
            size: self.icon_size,
            margin_x: self.icon_margin_x,
            margin_y: self.icon_margin_y,
        }
    }

    /// Fade-out duration.
    #[must_use]
    pub fn fade_duration(&self) -> Duration {
        Duration::from_millis(self.fade_duration_ms)
    }
}

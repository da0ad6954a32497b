//! The pair of edge overlays that exists while the extension is enabled.

use std::rc::Rc;

use tracing::info;

use crate::{
    config::OverlayConfig,
    geom::Edge,
    host::{Compositor, Tiling, WindowId},
    overlay::StackOverlay,
};

/// Left and right overlays for one session.
pub struct StackOverlays {
    /// Overlay guarding `x = 0`.
    left: StackOverlay,
    /// Overlay guarding the right monitor boundary.
    right: StackOverlay,
}

impl StackOverlays {
    /// Create both overlays.
    pub fn enable(
        compositor: Rc<dyn Compositor>,
        tiling: Rc<dyn Tiling>,
        cfg: &OverlayConfig,
    ) -> Self {
        let left = StackOverlay::new(compositor.clone(), tiling.clone(), Edge::Left, cfg.clone());
        let right = StackOverlay::new(compositor, tiling, Edge::Right, cfg.clone());
        info!(show_icon = cfg.show_icon, "stack overlays enabled");
        Self { left, right }
    }

    /// Overlay for `edge`.
    #[must_use]
    pub fn get(&self, edge: Edge) -> &StackOverlay {
        match edge {
            Edge::Left => &self.left,
            Edge::Right => &self.right,
        }
    }

    /// Mutable overlay for `edge`.
    pub fn get_mut(&mut self, edge: Edge) -> &mut StackOverlay {
        match edge {
            Edge::Left => &mut self.left,
            Edge::Right => &mut self.right,
        }
    }

    /// Overlay guarding the left edge.
    #[must_use]
    pub fn left(&self) -> &StackOverlay {
        &self.left
    }

    /// Overlay guarding the right edge.
    #[must_use]
    pub fn right(&self) -> &StackOverlay {
        &self.right
    }

    /// Retarget both overlays after a layout pass.
    pub fn set_targets(&mut self, left: Option<WindowId>, right: Option<WindowId>) {
        self.left.set_target(left);
        self.right.set_target(right);
    }

    /// Tear down both overlays: every subscription is dropped and every
    /// owned node destroyed, whatever state they are in.
    pub fn disable(mut self) {
        self.left.destroy();
        self.right.destroy();
        info!("stack overlays disabled");
    }
}

//! One input-capturing overlay guarding one monitor edge.
//!
//! Only a sliver of a stacked window is visible and it is usually animating,
//! so a click on it would land on an unpredictable part of the window. The
//! overlay sits on top of that sliver, swallows the press and activates the
//! window on release.
//!
//! The overlay node is parented to the window group rather than to the
//! target's actor (where it would show up in every clone of the window). The
//! cost is that its stacking has to be managed by hand on every restack.

use std::{
    cell::Cell,
    rc::{Rc, Weak},
};

use tracing::{debug, warn};

use crate::{
    config::OverlayConfig,
    geom::{Edge, Point, Rect},
    host::{Compositor, NodeId, PointerEvent, Propagation, SubscriptionId, Tiling, WindowId},
    resolve::{Bounds, OverlayPlacement, icon_offset, resolve},
    restack::RestackSync,
};

/// Themed icon used when a window has no associated application.
pub const MISSING_ICON: &str = "icon-missing";

/// Lifecycle state of an overlay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlayState {
    /// No target; the overlay is hidden and has no icon.
    Idle,
    /// Visible, positioned over the sliver of the contained window.
    Tracking(WindowId),
}

impl OverlayState {
    /// Current target, if tracking.
    #[must_use]
    pub const fn target(self) -> Option<WindowId> {
        match self {
            Self::Idle => None,
            Self::Tracking(w) => Some(w),
        }
    }
}

/// State reachable from signal handlers.
///
/// Handlers hold a `Weak` to this, so a disconnected or destroyed overlay is
/// never kept alive by the host.
pub(crate) struct Shared {
    /// Compositor owning the scene graph.
    pub(crate) compositor: Rc<dyn Compositor>,
    /// Edge guarded, for logs.
    pub(crate) edge: Edge,
    /// The overlay node.
    pub(crate) node: NodeId,
    /// Current lifecycle state.
    state: Cell<OverlayState>,
    /// Placement applied by the last successful `set_target`.
    placement: Cell<Option<OverlayPlacement>>,
    /// Icon child, owned by the overlay.
    icon: Cell<Option<NodeId>>,
}

impl Shared {
    /// Current state.
    pub(crate) fn state(&self) -> OverlayState {
        self.state.get()
    }

    /// Drop to `Idle`: forget the target, destroy the icon, hide the node.
    pub(crate) fn clear(&self) {
        self.state.set(OverlayState::Idle);
        self.placement.set(None);
        self.destroy_icon();
        self.compositor.hide_node(self.node);
    }

    /// Destroy the icon child, if any.
    fn destroy_icon(&self) {
        if let Some(icon) = self.icon.take() {
            self.compositor.destroy_node(icon);
        }
    }

    /// Release handler: raise and focus the target if it is still around.
    fn activate_target(&self) {
        let OverlayState::Tracking(window) = self.state() else {
            return;
        };
        if self.compositor.window_actor(window).is_none() {
            debug!(edge = %self.edge, %window, "stack overlay target is gone; going idle");
            self.clear();
            return;
        }
        debug!(edge = %self.edge, %window, "activating stacked window");
        if let Err(e) = self.compositor.activate_window(window) {
            warn!(edge = %self.edge, %window, error = %e, "failed to activate stacked window");
        }
    }
}

/// Overlay for one monitor edge.
pub struct StackOverlay {
    /// Overlay settings.
    cfg: OverlayConfig,
    /// Tiling engine, for spaces and the stack margin.
    tiling: Rc<dyn Tiling>,
    /// State shared with signal handlers.
    shared: Rc<Shared>,
    /// Press and release subscriptions on the overlay node.
    pointer_ids: Vec<SubscriptionId>,
    /// Restack subscription.
    restack: RestackSync,
    /// Set once the node has been destroyed.
    destroyed: bool,
}

impl StackOverlay {
    /// Create the overlay node for `edge` and wire its signals.
    ///
    /// The node starts hidden, spanning the full stack margin of the work area.
    pub fn new(
        compositor: Rc<dyn Compositor>,
        tiling: Rc<dyn Tiling>,
        edge: Edge,
        cfg: OverlayConfig,
    ) -> Self {
        let node = compositor.create_overlay_node(&format!("stack-overlay-{edge}"));
        let wa = compositor.work_area();
        let margin = tiling.stack_margin();
        let x = match edge {
            Edge::Left => 0,
            Edge::Right => wa.width - margin,
        };
        compositor.set_node_rect(node, Rect::new(x, wa.y, margin, wa.height));
        compositor.hide_node(node);

        let shared = Rc::new(Shared {
            compositor: compositor.clone(),
            edge,
            node,
            state: Cell::new(OverlayState::Idle),
            placement: Cell::new(None),
            icon: Cell::new(None),
        });

        let press = compositor.connect_pointer(
            node,
            PointerEvent::Press,
            Box::new(|| Propagation::Stop),
        );
        let weak: Weak<Shared> = Rc::downgrade(&shared);
        let release = compositor.connect_pointer(
            node,
            PointerEvent::Release,
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.activate_target();
                }
                Propagation::Stop
            }),
        );
        let restack = RestackSync::connect(&compositor, Rc::downgrade(&shared));
        debug!(%edge, %node, "stack overlay created");

        Self {
            cfg,
            tiling,
            shared,
            pointer_ids: vec![press, release],
            restack,
            destroyed: false,
        }
    }

    /// Edge this overlay guards.
    #[must_use]
    pub fn edge(&self) -> Edge {
        self.shared.edge
    }

    /// The overlay node.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.shared.node
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> OverlayState {
        self.shared.state()
    }

    /// Current target window.
    #[must_use]
    pub fn target(&self) -> Option<WindowId> {
        self.state().target()
    }

    /// Placement applied for the current target.
    #[must_use]
    pub fn placement(&self) -> Option<OverlayPlacement> {
        self.shared.placement.get()
    }

    /// Current icon child node.
    #[must_use]
    pub fn icon(&self) -> Option<NodeId> {
        self.shared.icon.get()
    }

    /// True while the restack subscription is live.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.restack.is_connected()
    }

    /// Point the overlay at `window`, or hide it.
    ///
    /// Returns `true` when the overlay ends up tracking `window`. `None`, a
    /// window without a bounding neighbour, or a window stacked against the
    /// other edge all leave the overlay idle.
    pub fn set_target(&mut self, window: Option<WindowId>) -> bool {
        let edge = self.edge();
        if self.destroyed {
            warn!(%edge, "set_target on a destroyed stack overlay");
            return false;
        }
        let Some(window) = window else {
            debug!(%edge, "no stacked window; stack overlay idle");
            self.shared.clear();
            return false;
        };
        let compositor = self.shared.compositor.clone();
        let placed = self.place(window).zip(compositor.window_actor(window));
        let Some((placement, actor)) = placed else {
            debug!(%edge, %window, "no stack boundary; stack overlay idle");
            self.shared.clear();
            return false;
        };

        let node = self.shared.node;
        self.shared.state.set(OverlayState::Tracking(window));
        self.shared.placement.set(Some(placement));
        compositor.set_node_rect(node, placement.rect);
        if self.cfg.show_icon {
            self.update_icon();
            if self.state() == OverlayState::Idle {
                return false;
            }
        } else {
            self.shared.destroy_icon();
        }
        compositor.set_child_above_sibling(node, actor);
        compositor.show_node(node);
        debug!(%edge, %window, rect = %placement.rect, "stack overlay tracking");
        true
    }

    /// Resolve the placement for `window` on this overlay's edge.
    fn place(&self, window: WindowId) -> Option<OverlayPlacement> {
        let compositor = &self.shared.compositor;
        let space = self.tiling.space_of_window(window)?;
        let bounds = Bounds {
            work_area: compositor.work_area(),
            stack_margin: self.tiling.stack_margin(),
            resize_border_width: self.cfg.resize_border_width,
        };
        let icon = self.cfg.show_icon.then(|| self.cfg.icon_params());
        let placement = resolve(
            window,
            &space,
            |w| compositor.window_geometry(w),
            &bounds,
            icon.as_ref(),
        )?;
        if placement.edge != self.edge() {
            debug!(
                edge = %self.edge(),
                stacked = %placement.edge,
                %window,
                "target is stacked against the other edge"
            );
            return None;
        }
        Some(placement)
    }

    /// Rebuild the icon child for the current target.
    ///
    /// The previous icon is always destroyed first. Windows without an
    /// application get a placeholder glyph.
    pub fn update_icon(&mut self) {
        self.shared.destroy_icon();
        let (OverlayState::Tracking(window), Some(mut placement)) =
            (self.state(), self.placement())
        else {
            return;
        };
        let compositor = self.shared.compositor.clone();
        let Some(geometry) = compositor.window_geometry(window) else {
            debug!(edge = %self.edge(), %window, "stack overlay target is gone; going idle");
            self.shared.clear();
            return;
        };

        let params = self.cfg.icon_params();
        let offset = icon_offset(placement.edge, &placement.rect, &geometry, &params);
        let icon = match compositor.window_app(window) {
            Some(app) => compositor.create_app_icon(&app, params.size),
            None => compositor.create_named_icon(MISSING_ICON, params.size),
        };
        compositor.set_node_position(icon, Point::new(offset.x, offset.y));
        compositor.add_child(self.shared.node, icon);
        self.shared.icon.set(Some(icon));
        placement.icon = Some(offset);
        self.shared.placement.set(Some(placement));
    }

    /// Fade the overlay to fully transparent. Target and visibility are untouched.
    pub fn fade_out(&self) {
        if self.destroyed {
            return;
        }
        self.shared
            .compositor
            .ease_opacity(self.shared.node, 0, self.cfg.fade_duration());
    }

    /// Disconnect every signal and destroy the overlay and icon nodes.
    ///
    /// Safe to call more than once; also run on drop.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        let compositor = self.shared.compositor.clone();
        for id in self.pointer_ids.drain(..) {
            compositor.disconnect(id);
        }
        self.restack.disconnect();
        self.shared.state.set(OverlayState::Idle);
        self.shared.placement.set(None);
        self.shared.destroy_icon();
        compositor.destroy_node(self.shared.node);
        self.destroyed = true;
        debug!(edge = %self.edge(), "stack overlay destroyed");
    }
}

impl Drop for StackOverlay {
    fn drop(&mut self) {
        self.destroy();
    }
}

//! Keeps an overlay stacked directly above its target.
//!
//! The window manager syncs the window group's child order with its own window
//! stacking on every restack, and in doing so throws away the position of any
//! node that is not a window. There is no hook to prevent that, so each
//! overlay re-inserts itself above its target every time a restack is
//! announced. Reordering a node does not trigger another restack, so this
//! cannot loop.

use std::rc::{Rc, Weak};

use tracing::{debug, trace};

use crate::{
    host::{Compositor, SubscriptionId},
    overlay::{OverlayState, Shared},
};

/// Standing restack subscription for one overlay.
pub(crate) struct RestackSync {
    /// Compositor the subscription lives on.
    compositor: Rc<dyn Compositor>,
    /// Live subscription, `None` once disconnected.
    id: Option<SubscriptionId>,
}

impl RestackSync {
    /// Subscribe to restacks on behalf of `overlay`.
    pub(crate) fn connect(compositor: &Rc<dyn Compositor>, overlay: Weak<Shared>) -> Self {
        let id = compositor.connect_restacked(Box::new(move || {
            if let Some(shared) = overlay.upgrade() {
                reassert(&shared);
            }
        }));
        Self {
            compositor: compositor.clone(),
            id: Some(id),
        }
    }

    /// True until [`Self::disconnect`] runs.
    pub(crate) fn is_connected(&self) -> bool {
        self.id.is_some()
    }

    /// Drop the subscription. Idempotent.
    pub(crate) fn disconnect(&mut self) {
        if let Some(id) = self.id.take() {
            self.compositor.disconnect(id);
        }
    }
}

/// Put the overlay back immediately above its target's backing node.
///
/// Does nothing while idle. A target whose backing node has disappeared
/// sends the overlay idle.
pub(crate) fn reassert(shared: &Shared) {
    let OverlayState::Tracking(window) = shared.state() else {
        return;
    };
    match shared.compositor.window_actor(window) {
        Some(actor) => {
            trace!(edge = %shared.edge, %window, %actor, "restack: overlay above target");
            shared.compositor.set_child_above_sibling(shared.node, actor);
        }
        None => {
            debug!(edge = %shared.edge, %window, "restack: target is gone; going idle");
            shared.clear();
        }
    }
}

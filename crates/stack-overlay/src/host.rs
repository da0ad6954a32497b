//! Seams to the tiling engine and the compositor.
//!
//! Overlays never own windows. They hold [`WindowId`] handles and re-query
//! the host every time they need geometry or a backing node; a `None` answer
//! means the window has gone away.

use std::{fmt, time::Duration};

use serde::Deserialize;

use crate::{
    Result,
    geom::{Point, Rect, WorkArea},
};

/// Non-owning handle to a managed window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "win#{}", self.0)
    }
}

/// Handle to a scene-graph node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Handle to a signal connection, used to disconnect it later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

/// Application identifier used to look up an icon.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct AppId(pub String);

/// Geometry of a window as reported by the compositor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowGeometry {
    /// Frame rectangle (the visible window, without client-side shadows).
    pub frame: Rect,
    /// Buffer rectangle (the full surface, including shadows).
    pub buffer: Rect,
    /// Current position of the backing actor, which moves while animating.
    pub actor: Point,
    /// X the window is animating towards, if a move is in flight.
    pub destination_x: Option<i32>,
}

impl WindowGeometry {
    /// Geometry of a window at rest whose buffer coincides with its frame.
    #[must_use]
    pub const fn at_rest(frame: Rect) -> Self {
        Self {
            frame,
            buffer: frame,
            actor: Point::new(frame.x, frame.y),
            destination_x: None,
        }
    }

    /// X the window will settle at: the animation endpoint when moving.
    #[must_use]
    pub fn settled_x(&self) -> i32 {
        self.destination_x.unwrap_or(self.frame.x)
    }

    /// Vertical offset of the frame inside the buffer.
    #[must_use]
    pub const fn frame_offset_y(&self) -> i32 {
        self.frame.y - self.buffer.y
    }
}

/// Pointer events an overlay listens for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerEvent {
    /// Button pressed over the node.
    Press,
    /// Button released over the node.
    Release,
}

/// What a pointer handler wants done with the event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Propagation {
    /// Event is consumed; no default action and no delivery below.
    Stop,
    /// Event continues to the next handler.
    Propagate,
}

/// Callback run on every host restack.
pub type RestackHandler = Box<dyn FnMut()>;

/// Callback run on a pointer event over a node.
pub type PointerHandler = Box<dyn FnMut() -> Propagation>;

/// Queries answered by the tiling engine.
pub trait Tiling {
    /// Ordered (left to right) windows of the space that holds `window`.
    fn space_of_window(&self, window: WindowId) -> Option<Vec<WindowId>>;
    /// Pixels reserved at each monitor edge for stacked windows.
    fn stack_margin(&self) -> i32;
}

/// Scene graph, window and signal primitives offered by the compositor.
///
/// All calls happen on the host's event loop thread. Node primitives must not
/// synchronously emit the restack notification.
pub trait Compositor {
    /// Work area of the monitor the overlays live on.
    fn work_area(&self) -> WorkArea;
    /// Current geometry of `window`, `None` once it is gone.
    fn window_geometry(&self, window: WindowId) -> Option<WindowGeometry>;
    /// Backing node of `window`, `None` once it is gone.
    fn window_actor(&self, window: WindowId) -> Option<NodeId>;
    /// Application associated with `window`, if any.
    fn window_app(&self, window: WindowId) -> Option<AppId>;

    /// Create a reactive, initially hidden node parented to the window group.
    ///
    /// The host must route pointer input over the node to it ahead of the
    /// window content beneath, and keep tracking its region as it moves.
    fn create_overlay_node(&self, name: &str) -> NodeId;
    /// Move and resize a node.
    fn set_node_rect(&self, node: NodeId, rect: Rect);
    /// Move a node, keeping its size.
    fn set_node_position(&self, node: NodeId, pos: Point);
    /// Make a node visible.
    fn show_node(&self, node: NodeId);
    /// Hide a node.
    fn hide_node(&self, node: NodeId);
    /// Append `child` to `parent`.
    fn add_child(&self, parent: NodeId, child: NodeId);
    /// Reorder `node` so it sits immediately above `sibling` in their parent.
    fn set_child_above_sibling(&self, node: NodeId, sibling: NodeId);
    /// Animate the opacity of `node` to `opacity` over `duration`.
    fn ease_opacity(&self, node: NodeId, opacity: u8, duration: Duration);
    /// Destroy a node and all of its children.
    fn destroy_node(&self, node: NodeId);

    /// Create an icon node for `app` at `size` pixels.
    fn create_app_icon(&self, app: &AppId, size: i32) -> NodeId;
    /// Create a themed icon node by name at `size` pixels.
    fn create_named_icon(&self, name: &str, size: i32) -> NodeId;

    /// Subscribe to window restacks.
    fn connect_restacked(&self, handler: RestackHandler) -> SubscriptionId;
    /// Subscribe to `event` on `node`.
    fn connect_pointer(
        &self,
        node: NodeId,
        event: PointerEvent,
        handler: PointerHandler,
    ) -> SubscriptionId;
    /// Drop a subscription. Unknown ids are ignored.
    fn disconnect(&self, id: SubscriptionId);

    /// Raise and focus `window`.
    fn activate_window(&self, window: WindowId) -> Result<()>;
}

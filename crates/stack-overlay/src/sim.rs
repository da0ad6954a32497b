//! In-memory compositor and tiling engine.
//!
//! `SimHost` models the parts of the host the overlays touch: a window group
//! whose child order is rewritten from the window stacking on every restack
//! (dropping every non-window node to the bottom, as the real window manager
//! does), window geometry, icons, pointer and restack signals, and window
//! activation. It backs the tests and the `stackctl` scenario runner.

use std::{
    cell::RefCell,
    collections::{BTreeMap, BTreeSet},
    rc::Rc,
    time::Duration,
};

use tracing::trace;

use crate::{
    Error, Result,
    geom::{Point, Rect, WorkArea},
    host::{
        AppId, Compositor, NodeId, PointerEvent, PointerHandler, Propagation, RestackHandler,
        SubscriptionId, Tiling, WindowGeometry, WindowId,
    },
};

/// What a simulated node represents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Backing node of a managed window.
    WindowActor(WindowId),
    /// Reactive node created through [`Compositor::create_overlay_node`].
    Overlay,
    /// Application icon.
    AppIcon(AppId),
    /// Themed icon looked up by name.
    NamedIcon(String),
}

/// Snapshot of a simulated scene-graph node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimNode {
    /// What the node represents.
    pub kind: NodeKind,
    /// Debug name.
    pub name: String,
    /// Position and size relative to the parent.
    pub rect: Rect,
    /// Visibility.
    pub visible: bool,
    /// Opacity, 0 (transparent) to 255.
    pub opacity: u8,
    /// Duration of the last opacity tween, if one was requested.
    pub fade: Option<Duration>,
    /// Receives pointer events.
    pub reactive: bool,
    /// Parent node; `None` for window group children and detached nodes.
    pub parent: Option<NodeId>,
    /// Children in paint order.
    pub children: Vec<NodeId>,
}

impl SimNode {
    /// A visible, opaque, non-reactive node.
    fn new(kind: NodeKind, name: String, rect: Rect) -> Self {
        Self {
            kind,
            name,
            rect,
            visible: true,
            opacity: u8::MAX,
            fade: None,
            reactive: false,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// A managed window.
#[derive(Clone, Debug)]
struct SimWindow {
    /// Current geometry.
    geometry: WindowGeometry,
    /// Owning application, if known.
    app: Option<AppId>,
    /// Backing node.
    actor: NodeId,
}

/// Shared pointer to a restack callback.
type RestackSlot = Rc<RefCell<RestackHandler>>;

/// Registered pointer callback.
struct PointerSlot {
    /// Node the handler is attached to.
    node: NodeId,
    /// Event it listens for.
    event: PointerEvent,
    /// The callback.
    handler: Rc<RefCell<PointerHandler>>,
}

/// Mutable scene and window state.
struct SimState {
    /// Monitor work area.
    work_area: WorkArea,
    /// Stack margin reported to overlays.
    stack_margin: i32,
    /// Next id for windows, nodes, and subscriptions.
    next_id: u64,
    /// Managed windows.
    windows: BTreeMap<WindowId, SimWindow>,
    /// Spaces, each ordered left to right.
    spaces: Vec<Vec<WindowId>>,
    /// Every live node.
    nodes: BTreeMap<NodeId, SimNode>,
    /// Children of the window group, bottom to top.
    group: Vec<NodeId>,
    /// Window manager stacking, bottom to top.
    stacking: Vec<WindowId>,
    /// Windows activated, oldest first.
    activations: Vec<WindowId>,
    /// Windows whose activation the host refuses.
    refuse_activation: BTreeSet<WindowId>,
    /// Number of restacks announced.
    restacks: u64,
}

impl SimState {
    /// Allocate a fresh id.
    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Insert a node and return its id.
    fn insert_node(&mut self, node: SimNode) -> NodeId {
        let id = NodeId(self.next());
        self.nodes.insert(id, node);
        id
    }

    /// Detach `node` from the window group and from its parent.
    fn unlink(&mut self, node: NodeId) {
        self.group.retain(|n| *n != node);
        let parent = self.nodes.get_mut(&node).and_then(|n| n.parent.take());
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|c| *c != node);
        }
    }

    /// Remove `node` and all of its descendants.
    fn destroy(&mut self, node: NodeId) {
        self.unlink(node);
        let mut pending = vec![node];
        while let Some(id) = pending.pop() {
            if let Some(n) = self.nodes.remove(&id) {
                pending.extend(n.children);
            }
        }
    }

    /// Rewrite the window group from the window stacking.
    fn sync_group(&mut self) {
        let mut group: Vec<NodeId> = self
            .group
            .iter()
            .copied()
            .filter(|n| {
                !matches!(
                    self.nodes.get(n).map(|n| &n.kind),
                    Some(NodeKind::WindowActor(_))
                )
            })
            .collect();
        group.extend(
            self.stacking
                .iter()
                .filter_map(|w| self.windows.get(w).map(|w| w.actor)),
        );
        self.group = group;
    }
}

/// In-memory host implementing [`Compositor`] and [`Tiling`].
pub struct SimHost {
    /// Scene and windows.
    state: RefCell<SimState>,
    /// Restack subscriptions.
    restack_handlers: RefCell<BTreeMap<SubscriptionId, RestackSlot>>,
    /// Pointer subscriptions.
    pointer_handlers: RefCell<BTreeMap<SubscriptionId, PointerSlot>>,
}

impl SimHost {
    /// Empty host for a monitor with `work_area`.
    #[must_use]
    pub fn new(work_area: WorkArea, stack_margin: i32) -> Self {
        Self {
            state: RefCell::new(SimState {
                work_area,
                stack_margin,
                next_id: 0,
                windows: BTreeMap::new(),
                spaces: Vec::new(),
                nodes: BTreeMap::new(),
                group: Vec::new(),
                stacking: Vec::new(),
                activations: Vec::new(),
                refuse_activation: BTreeSet::new(),
                restacks: 0,
            }),
            restack_handlers: RefCell::new(BTreeMap::new()),
            pointer_handlers: RefCell::new(BTreeMap::new()),
        }
    }

    /// Manage a new window on top of the stacking.
    pub fn add_window(&self, geometry: WindowGeometry, app: Option<AppId>) -> WindowId {
        let mut st = self.state.borrow_mut();
        let id = WindowId(st.next());
        let actor = st.insert_node(SimNode::new(
            NodeKind::WindowActor(id),
            format!("window-{}", id.0),
            geometry.buffer,
        ));
        st.windows.insert(
            id,
            SimWindow {
                geometry,
                app,
                actor,
            },
        );
        st.stacking.push(id);
        st.group.push(actor);
        id
    }

    /// Add a space holding `windows`, left to right.
    pub fn add_space(&self, windows: Vec<WindowId>) {
        self.state.borrow_mut().spaces.push(windows);
    }

    /// Change the stack margin reported to overlays.
    pub fn set_stack_margin(&self, margin: i32) {
        self.state.borrow_mut().stack_margin = margin;
    }

    /// Make activation of `window` fail (`true`) or succeed again (`false`).
    pub fn fail_activation(&self, window: WindowId, fail: bool) {
        let mut st = self.state.borrow_mut();
        if fail {
            st.refuse_activation.insert(window);
        } else {
            st.refuse_activation.remove(&window);
        }
    }

    /// Replace a window's geometry.
    pub fn set_geometry(&self, window: WindowId, geometry: WindowGeometry) -> Result<()> {
        let mut st = self.state.borrow_mut();
        let win = st
            .windows
            .get_mut(&window)
            .ok_or(Error::UnknownWindow(window))?;
        win.geometry = geometry;
        let actor = win.actor;
        if let Some(node) = st.nodes.get_mut(&actor) {
            node.rect = Rect::new(
                geometry.actor.x,
                geometry.actor.y,
                geometry.buffer.w,
                geometry.buffer.h,
            );
        }
        Ok(())
    }

    /// Start (`Some`) or finish (`None`) a horizontal animation.
    pub fn set_destination_x(&self, window: WindowId, destination_x: Option<i32>) -> Result<()> {
        let mut geometry = self
            .window_geometry(window)
            .ok_or(Error::UnknownWindow(window))?;
        geometry.destination_x = destination_x;
        self.set_geometry(window, geometry)
    }

    /// Unmanage a window and announce the resulting restack.
    pub fn close_window(&self, window: WindowId) -> Result<()> {
        {
            let mut st = self.state.borrow_mut();
            let win = st
                .windows
                .remove(&window)
                .ok_or(Error::UnknownWindow(window))?;
            st.destroy(win.actor);
            st.stacking.retain(|w| *w != window);
            for space in &mut st.spaces {
                space.retain(|w| *w != window);
            }
        }
        self.restack();
        Ok(())
    }

    /// Move a window to the top of the stacking and announce the restack.
    pub fn raise_window(&self, window: WindowId) -> Result<()> {
        {
            let mut st = self.state.borrow_mut();
            if !st.windows.contains_key(&window) {
                return Err(Error::UnknownWindow(window));
            }
            st.stacking.retain(|w| *w != window);
            st.stacking.push(window);
        }
        self.restack();
        Ok(())
    }

    /// Resync the window group with the stacking, then notify subscribers.
    pub fn restack(&self) {
        {
            let mut st = self.state.borrow_mut();
            st.sync_group();
            st.restacks += 1;
            trace!(restacks = st.restacks, "sim: restacked");
        }
        let handlers: Vec<RestackSlot> = self.restack_handlers.borrow().values().cloned().collect();
        for slot in handlers {
            let mut guard = slot.borrow_mut();
            let handler: &mut dyn FnMut() = &mut **guard;
            handler();
        }
    }

    /// Deliver a button press to `node`.
    pub fn press(&self, node: NodeId) -> Propagation {
        self.dispatch_pointer(node, PointerEvent::Press)
    }

    /// Deliver a button release to `node`.
    pub fn release(&self, node: NodeId) -> Propagation {
        self.dispatch_pointer(node, PointerEvent::Release)
    }

    /// Run the handlers for `event` on `node` until one stops propagation.
    fn dispatch_pointer(&self, node: NodeId, event: PointerEvent) -> Propagation {
        let reactive = self
            .state
            .borrow()
            .nodes
            .get(&node)
            .is_some_and(|n| n.reactive && n.visible);
        if !reactive {
            return Propagation::Propagate;
        }
        let handlers: Vec<Rc<RefCell<PointerHandler>>> = self
            .pointer_handlers
            .borrow()
            .values()
            .filter(|s| s.node == node && s.event == event)
            .map(|s| s.handler.clone())
            .collect();
        for slot in handlers {
            let mut guard = slot.borrow_mut();
            let handler: &mut dyn FnMut() -> Propagation = &mut **guard;
            if handler() == Propagation::Stop {
                return Propagation::Stop;
            }
        }
        Propagation::Propagate
    }

    /// Children of the window group, bottom to top.
    #[must_use]
    pub fn sibling_order(&self) -> Vec<NodeId> {
        self.state.borrow().group.clone()
    }

    /// True when `node` sits immediately above `sibling` in the window group.
    #[must_use]
    pub fn is_directly_above(&self, node: NodeId, sibling: NodeId) -> bool {
        let st = self.state.borrow();
        st.group
            .windows(2)
            .any(|pair| pair[0] == sibling && pair[1] == node)
    }

    /// Snapshot of a node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<SimNode> {
        self.state.borrow().nodes.get(&id).cloned()
    }

    /// Backing node of a window.
    #[must_use]
    pub fn actor_of(&self, window: WindowId) -> Option<NodeId> {
        self.window_actor(window)
    }

    /// Number of live restack and pointer subscriptions.
    #[must_use]
    pub fn live_subscriptions(&self) -> usize {
        self.restack_handlers.borrow().len() + self.pointer_handlers.borrow().len()
    }

    /// Number of live nodes that are not window actors.
    #[must_use]
    pub fn owned_nodes(&self) -> usize {
        self.state
            .borrow()
            .nodes
            .values()
            .filter(|n| !matches!(n.kind, NodeKind::WindowActor(_)))
            .count()
    }

    /// Windows activated so far, oldest first.
    #[must_use]
    pub fn activations(&self) -> Vec<WindowId> {
        self.state.borrow().activations.clone()
    }

    /// Number of restacks announced so far.
    #[must_use]
    pub fn restack_count(&self) -> u64 {
        self.state.borrow().restacks
    }

    /// Apply `f` to a node if it exists.
    fn with_node(&self, id: NodeId, f: impl FnOnce(&mut SimNode)) {
        match self.state.borrow_mut().nodes.get_mut(&id) {
            Some(node) => f(node),
            None => trace!(%id, "sim: operation on unknown node ignored"),
        }
    }

    /// Create a detached icon node.
    fn create_icon(&self, kind: NodeKind, size: i32) -> NodeId {
        let mut st = self.state.borrow_mut();
        let name = format!("icon-{}", st.next_id + 1);
        st.insert_node(SimNode::new(kind, name, Rect::new(0, 0, size, size)))
    }

    /// Allocate a subscription id.
    fn next_subscription(&self) -> SubscriptionId {
        SubscriptionId(self.state.borrow_mut().next())
    }
}

impl Compositor for SimHost {
    fn work_area(&self) -> WorkArea {
        self.state.borrow().work_area
    }

    fn window_geometry(&self, window: WindowId) -> Option<WindowGeometry> {
        self.state.borrow().windows.get(&window).map(|w| w.geometry)
    }

    fn window_actor(&self, window: WindowId) -> Option<NodeId> {
        self.state.borrow().windows.get(&window).map(|w| w.actor)
    }

    fn window_app(&self, window: WindowId) -> Option<AppId> {
        self.state
            .borrow()
            .windows
            .get(&window)
            .and_then(|w| w.app.clone())
    }

    fn create_overlay_node(&self, name: &str) -> NodeId {
        let mut st = self.state.borrow_mut();
        let mut node = SimNode::new(NodeKind::Overlay, name.to_string(), Rect::default());
        node.reactive = true;
        node.visible = false;
        let id = st.insert_node(node);
        st.group.push(id);
        id
    }

    fn set_node_rect(&self, node: NodeId, rect: Rect) {
        self.with_node(node, |n| n.rect = rect);
    }

    fn set_node_position(&self, node: NodeId, pos: Point) {
        self.with_node(node, |n| {
            n.rect.x = pos.x;
            n.rect.y = pos.y;
        });
    }

    fn show_node(&self, node: NodeId) {
        self.with_node(node, |n| n.visible = true);
    }

    fn hide_node(&self, node: NodeId) {
        self.with_node(node, |n| n.visible = false);
    }

    fn add_child(&self, parent: NodeId, child: NodeId) {
        let mut st = self.state.borrow_mut();
        if !st.nodes.contains_key(&parent) || !st.nodes.contains_key(&child) {
            trace!(%parent, %child, "sim: add_child on unknown node ignored");
            return;
        }
        st.unlink(child);
        if let Some(c) = st.nodes.get_mut(&child) {
            c.parent = Some(parent);
        }
        if let Some(p) = st.nodes.get_mut(&parent) {
            p.children.push(child);
        }
    }

    fn set_child_above_sibling(&self, node: NodeId, sibling: NodeId) {
        let mut st = self.state.borrow_mut();
        if !st.group.contains(&node) {
            trace!(%node, "sim: reorder of node outside the window group ignored");
            return;
        }
        st.group.retain(|n| *n != node);
        match st.group.iter().position(|n| *n == sibling) {
            Some(idx) => st.group.insert(idx + 1, node),
            None => st.group.push(node),
        }
    }

    fn ease_opacity(&self, node: NodeId, opacity: u8, duration: Duration) {
        self.with_node(node, |n| {
            n.opacity = opacity;
            n.fade = Some(duration);
        });
    }

    fn destroy_node(&self, node: NodeId) {
        self.state.borrow_mut().destroy(node);
    }

    fn create_app_icon(&self, app: &AppId, size: i32) -> NodeId {
        self.create_icon(NodeKind::AppIcon(app.clone()), size)
    }

    fn create_named_icon(&self, name: &str, size: i32) -> NodeId {
        self.create_icon(NodeKind::NamedIcon(name.to_string()), size)
    }

    fn connect_restacked(&self, handler: RestackHandler) -> SubscriptionId {
        let id = self.next_subscription();
        self.restack_handlers
            .borrow_mut()
            .insert(id, Rc::new(RefCell::new(handler)));
        id
    }

    fn connect_pointer(
        &self,
        node: NodeId,
        event: PointerEvent,
        handler: PointerHandler,
    ) -> SubscriptionId {
        let id = self.next_subscription();
        self.pointer_handlers.borrow_mut().insert(
            id,
            PointerSlot {
                node,
                event,
                handler: Rc::new(RefCell::new(handler)),
            },
        );
        id
    }

    fn disconnect(&self, id: SubscriptionId) {
        let removed = self.restack_handlers.borrow_mut().remove(&id).is_some()
            || self.pointer_handlers.borrow_mut().remove(&id).is_some();
        if !removed {
            trace!(id = id.0, "sim: disconnect of unknown subscription ignored");
        }
    }

    fn activate_window(&self, window: WindowId) -> Result<()> {
        {
            let mut st = self.state.borrow_mut();
            if !st.windows.contains_key(&window) {
                return Err(Error::UnknownWindow(window));
            }
            if st.refuse_activation.contains(&window) {
                return Err(Error::Activation {
                    window,
                    message: "window refused focus".to_string(),
                });
            }
            st.activations.push(window);
        }
        self.raise_window(window)
    }
}

impl Tiling for SimHost {
    fn space_of_window(&self, window: WindowId) -> Option<Vec<WindowId>> {
        self.state
            .borrow()
            .spaces
            .iter()
            .find(|s| s.contains(&window))
            .cloned()
    }

    fn stack_margin(&self) -> i32 {
        self.state.borrow().stack_margin
    }
}

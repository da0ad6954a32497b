//! Overlay placement for a stacked window.
//!
//! The overlay covers the strip between the monitor edge and the neighbour
//! that bounds the stack, never wider than the stack margin. Neighbours that
//! are still animating are measured at their destination so that a layout
//! pass running mid-animation does not produce a size that is wrong one frame
//! later. The y of an animating window is not tracked, so the icon can land
//! slightly off until the next `set_target`.

use crate::{
    geom::{Edge, Rect, WorkArea},
    host::{WindowGeometry, WindowId},
};

/// Monitor and stacking parameters the resolver works against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bounds {
    /// Work area of the monitor.
    pub work_area: WorkArea,
    /// Pixels reserved at each edge for stacked windows.
    pub stack_margin: i32,
    /// Width of the invisible resize border around each window.
    pub resize_border_width: i32,
}

/// Icon sizing and margins inside the overlay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IconParams {
    /// Icon edge length in pixels.
    pub size: i32,
    /// Gap between the icon and the side of the overlay it hugs.
    pub margin_x: i32,
    /// Gap between the top of the window frame and the icon.
    pub margin_y: i32,
}

/// Icon position relative to the overlay's origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IconPlacement {
    /// Horizontal offset.
    pub x: i32,
    /// Vertical offset.
    pub y: i32,
    /// Icon edge length.
    pub size: i32,
}

/// Result of a successful resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OverlayPlacement {
    /// Edge the target is stacked against.
    pub edge: Edge,
    /// Overlay rectangle in monitor-local coordinates.
    pub rect: Rect,
    /// Icon offset, present when one was requested.
    pub icon: Option<IconPlacement>,
}

/// Resolve the overlay for `target` inside `space`.
///
/// The edge is picked from the target's current x. Returns `None` when the
/// target is not in `space`, its geometry is unknown, or there is no neighbour
/// bounding the stack on that edge.
pub fn resolve<G>(
    target: WindowId,
    space: &[WindowId],
    geometry: G,
    bounds: &Bounds,
    icon: Option<&IconParams>,
) -> Option<OverlayPlacement>
where
    G: Fn(WindowId) -> Option<WindowGeometry>,
{
    let target_geom = geometry(target)?;
    let edge = Edge::of_x(target_geom.actor.x, bounds.stack_margin);
    resolve_edge(edge, target, space, geometry, bounds, icon)
}

/// Resolve the overlay for `target` against a fixed `edge`.
pub fn resolve_edge<G>(
    edge: Edge,
    target: WindowId,
    space: &[WindowId],
    geometry: G,
    bounds: &Bounds,
    icon: Option<&IconParams>,
) -> Option<OverlayPlacement>
where
    G: Fn(WindowId) -> Option<WindowGeometry>,
{
    let index = space.iter().position(|w| *w == target)?;
    let neighbor = *space.get(edge.neighbor_index(index)?)?;
    let target_geom = geometry(target)?;
    let neighbor_geom = geometry(neighbor)?;

    let (x, w) = span(edge, &neighbor_geom, bounds);
    let wa = bounds.work_area;
    let rect = Rect::new(x, wa.y, w, wa.height);
    let icon = icon.map(|p| icon_offset(edge, &rect, &target_geom, p));
    Some(OverlayPlacement { edge, rect, icon })
}

/// Horizontal extent `(x, width)` of the overlay bounded by `neighbor`.
#[must_use]
pub fn span(edge: Edge, neighbor: &WindowGeometry, bounds: &Bounds) -> (i32, i32) {
    let margin = bounds.stack_margin.max(0);
    let border = bounds.resize_border_width;
    let monitor_width = bounds.work_area.width;
    let nx = neighbor.settled_x();
    match edge {
        Edge::Left => (0, margin.min(nx.saturating_sub(border).max(0))),
        Edge::Right => {
            let neighbor_edge = nx
                .saturating_add(neighbor.frame.w)
                .saturating_add(border);
            // Clamp to the monitor so a neighbour hanging off-screen cannot
            // produce a negative width.
            let x = monitor_width
                .saturating_sub(margin)
                .max(neighbor_edge)
                .min(monitor_width);
            (x, monitor_width - x)
        }
    }
}

/// Icon offset inside `overlay`: hugging the outer side of the strip and
/// aligned with the top of the target's visible frame.
#[must_use]
pub fn icon_offset(
    edge: Edge,
    overlay: &Rect,
    target: &WindowGeometry,
    params: &IconParams,
) -> IconPlacement {
    let x = match edge {
        Edge::Left => params.margin_x,
        Edge::Right => overlay.w - params.margin_x - params.size,
    };
    let y = target.actor.y + target.frame_offset_y() + params.margin_y - overlay.y;
    IconPlacement {
        x,
        y,
        size: params.size,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::geom::Point;

    const MARGIN: i32 = 50;
    const BORDER: i32 = 5;

    fn bounds() -> Bounds {
        Bounds {
            work_area: WorkArea::below_top_bar(1920, 1080, 32),
            stack_margin: MARGIN,
            resize_border_width: BORDER,
        }
    }

    fn icon() -> IconParams {
        IconParams {
            size: 20,
            margin_x: 2,
            margin_y: 4,
        }
    }

    struct Layout {
        geoms: HashMap<WindowId, WindowGeometry>,
        space: Vec<WindowId>,
    }

    impl Layout {
        fn new(frames: &[(i32, i32)]) -> Self {
            let mut geoms = HashMap::new();
            let mut space = Vec::new();
            for (i, (x, w)) in frames.iter().enumerate() {
                let id = WindowId(i as u64 + 1);
                geoms.insert(id, WindowGeometry::at_rest(Rect::new(*x, 40, *w, 1000)));
                space.push(id);
            }
            Self { geoms, space }
        }

        fn id(&self, index: usize) -> WindowId {
            self.space[index]
        }

        fn animate(&mut self, index: usize, destination_x: i32) {
            let id = self.id(index);
            if let Some(g) = self.geoms.get_mut(&id) {
                g.destination_x = Some(destination_x);
            }
        }

        fn resolve(&self, index: usize, icon: Option<&IconParams>) -> Option<OverlayPlacement> {
            resolve(
                self.id(index),
                &self.space,
                |w| self.geoms.get(&w).copied(),
                &bounds(),
                icon,
            )
        }
    }

    #[test]
    fn left_stack_is_bounded_by_next_window() {
        let layout = Layout::new(&[(0, 800), (50, 800), (860, 800)]);
        let p = layout.resolve(0, None).expect("placement");
        assert_eq!(p.edge, Edge::Left);
        assert_eq!(p.rect, Rect::new(0, 32, 45, 1048));
        assert_eq!(p.icon, None);
    }

    #[test]
    fn destination_x_takes_precedence() {
        let mut layout = Layout::new(&[(0, 800), (50, 800), (860, 800)]);
        layout.animate(1, 800);
        let p = layout.resolve(0, None).expect("placement");
        assert_eq!(p.rect.w, 50);
    }

    #[test]
    fn neighbour_flush_with_edge_gives_empty_strip() {
        let layout = Layout::new(&[(0, 800), (3, 800)]);
        let p = layout.resolve(0, None).expect("placement");
        assert_eq!(p.rect.w, 0);
    }

    #[test]
    fn extreme_neighbour_positions_saturate() {
        let mut layout = Layout::new(&[(0, 800), (50, 800), (1880, 800)]);
        layout.animate(1, i32::MIN);
        assert_eq!(layout.resolve(0, None).expect("left").rect.w, 0);

        layout.animate(1, i32::MAX);
        let p = layout.resolve(2, None).expect("right");
        assert_eq!(p.rect, Rect::new(1920, 32, 0, 1048));
    }

    #[test]
    fn right_stack_is_bounded_by_previous_window() {
        // Previous window ends at 1890; plus border puts the strip at 1895.
        let layout = Layout::new(&[(60, 1000), (1090, 800), (1880, 800)]);
        let p = layout.resolve(2, Some(&icon())).expect("placement");
        assert_eq!(p.edge, Edge::Right);
        assert_eq!(p.rect, Rect::new(1895, 32, 25, 1048));
        let ic = p.icon.expect("icon");
        assert_eq!(ic.x, 25 - 2 - 20);
        assert_eq!(ic.y, 40 + 4 - 32);
    }

    #[test]
    fn right_stack_never_wider_than_margin() {
        let layout = Layout::new(&[(60, 200), (1880, 800)]);
        let p = layout.resolve(1, None).expect("placement");
        assert_eq!(p.rect.x, 1920 - MARGIN);
        assert_eq!(p.rect.w, MARGIN);
    }

    #[test]
    fn right_neighbour_off_screen_clamps_to_zero_width() {
        let layout = Layout::new(&[(60, 3000), (1900, 800)]);
        let p = layout.resolve(1, None).expect("placement");
        assert_eq!(p.rect.x, 1920);
        assert_eq!(p.rect.w, 0);
    }

    #[test]
    fn sole_window_has_no_placement_on_either_edge() {
        let layout = Layout::new(&[(0, 800)]);
        let id = layout.id(0);
        let lookup = |w: WindowId| layout.geoms.get(&w).copied();
        for edge in Edge::ALL {
            assert!(resolve_edge(edge, id, &layout.space, lookup, &bounds(), None).is_none());
        }
        assert!(layout.resolve(0, None).is_none());
    }

    #[test]
    fn rightmost_window_on_left_edge_fails() {
        let layout = Layout::new(&[(900, 800), (10, 800)]);
        assert!(layout.resolve(1, None).is_none());
    }

    #[test]
    fn target_missing_from_space_fails() {
        let layout = Layout::new(&[(0, 800), (50, 800)]);
        let stranger = WindowId(99);
        let lookup = |_: WindowId| Some(WindowGeometry::at_rest(Rect::new(0, 0, 10, 10)));
        assert!(resolve(stranger, &layout.space, lookup, &bounds(), None).is_none());
    }

    #[test]
    fn left_icon_hugs_the_screen_edge() {
        let layout = Layout::new(&[(0, 800), (50, 800)]);
        let p = layout.resolve(0, Some(&icon())).expect("placement");
        let ic = p.icon.expect("icon");
        assert_eq!((ic.x, ic.y, ic.size), (2, 12, 20));
    }

    #[test]
    fn icon_tracks_actor_and_frame_offset() {
        let target = WindowGeometry {
            frame: Rect::new(10, 60, 800, 900),
            buffer: Rect::new(0, 48, 820, 924),
            actor: Point::new(0, 100),
            destination_x: None,
        };
        let overlay = Rect::new(0, 32, 45, 1048);
        let ic = icon_offset(Edge::Left, &overlay, &target, &icon());
        assert_eq!(ic.y, 100 + 12 + 4 - 32);
    }
}

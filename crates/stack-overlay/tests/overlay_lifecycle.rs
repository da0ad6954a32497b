use std::{rc::Rc, time::Duration};

use stack_overlay::{
    AppId, Compositor, Edge, MISSING_ICON, OverlayConfig, OverlayState, Propagation, Rect,
    StackOverlay, StackOverlays, Tiling, WindowGeometry, WindowId, WorkArea,
    sim::{NodeKind, SimHost},
};

const MARGIN: i32 = 50;

struct Fixture {
    host: Rc<SimHost>,
    windows: Vec<WindowId>,
}

/// Three windows: one stacked left, one in view, one stacked right.
fn fixture() -> Fixture {
    let host = Rc::new(SimHost::new(WorkArea::below_top_bar(1920, 1080, 32), MARGIN));
    let frames = [
        Rect::new(0, 40, 800, 1000),
        Rect::new(50, 40, 1000, 1000),
        Rect::new(1880, 40, 800, 1000),
    ];
    let apps = [Some("org.gnome.Terminal"), Some("org.gnome.TextEditor"), None];
    let windows: Vec<WindowId> = frames
        .iter()
        .zip(apps)
        .map(|(f, app)| {
            host.add_window(
                WindowGeometry::at_rest(*f),
                app.map(|a| AppId(a.to_string())),
            )
        })
        .collect();
    host.add_space(windows.clone());
    Fixture { host, windows }
}

fn overlay(fx: &Fixture, edge: Edge, cfg: OverlayConfig) -> StackOverlay {
    let compositor: Rc<dyn Compositor> = fx.host.clone();
    let tiling: Rc<dyn Tiling> = fx.host.clone();
    StackOverlay::new(compositor, tiling, edge, cfg)
}

#[test]
fn new_overlay_is_idle_and_hidden() {
    let fx = fixture();
    let ov = overlay(&fx, Edge::Right, OverlayConfig::default());
    assert_eq!(ov.state(), OverlayState::Idle);
    let node = fx.host.node(ov.node()).expect("overlay node");
    assert_eq!(node.kind, NodeKind::Overlay);
    assert_eq!(node.name, "stack-overlay-right");
    assert!(node.reactive);
    assert!(!node.visible);
    assert_eq!(node.rect, Rect::new(1920 - MARGIN, 32, MARGIN, 1048));
    assert!(ov.is_connected());
}

#[test]
fn left_target_tracks_with_icon() {
    let fx = fixture();
    let mut ov = overlay(&fx, Edge::Left, OverlayConfig::default());
    assert!(ov.set_target(Some(fx.windows[0])));

    assert_eq!(ov.state(), OverlayState::Tracking(fx.windows[0]));
    let node = fx.host.node(ov.node()).unwrap();
    assert!(node.visible);
    assert_eq!(node.rect, Rect::new(0, 32, 45, 1048));

    let actor = fx.host.actor_of(fx.windows[0]).unwrap();
    assert!(fx.host.is_directly_above(ov.node(), actor));

    let icon = ov.icon().expect("icon");
    let icon_node = fx.host.node(icon).unwrap();
    assert_eq!(icon_node.kind, NodeKind::AppIcon(AppId("org.gnome.Terminal".into())));
    assert_eq!(icon_node.parent, Some(ov.node()));
    assert_eq!(icon_node.rect, Rect::new(2, 12, 20, 20));
}

#[test]
fn window_without_app_gets_placeholder_icon() {
    let fx = fixture();
    let mut ov = overlay(&fx, Edge::Right, OverlayConfig::default());
    assert!(ov.set_target(Some(fx.windows[2])));
    let icon_node = fx.host.node(ov.icon().unwrap()).unwrap();
    assert_eq!(icon_node.kind, NodeKind::NamedIcon(MISSING_ICON.to_string()));
    // Strip starts at max(1870, 50 + 1000 + 5).
    assert_eq!(ov.placement().unwrap().rect, Rect::new(1870, 32, 50, 1048));
    assert_eq!(icon_node.rect.x, 50 - 2 - 20);
}

#[test]
fn icons_can_be_disabled() {
    let fx = fixture();
    let cfg = OverlayConfig {
        show_icon: false,
        ..OverlayConfig::default()
    };
    let mut ov = overlay(&fx, Edge::Left, cfg);
    assert!(ov.set_target(Some(fx.windows[0])));
    assert!(ov.icon().is_none());
    assert!(ov.placement().unwrap().icon.is_none());
    assert_eq!(fx.host.owned_nodes(), 1);
}

#[test]
fn retargeting_replaces_state_without_leaking_icons() {
    let fx = fixture();
    let mut ov = overlay(&fx, Edge::Left, OverlayConfig::default());
    assert!(ov.set_target(Some(fx.windows[0])));
    let first_icon = ov.icon().unwrap();
    assert!(ov.set_target(Some(fx.windows[0])));
    assert!(fx.host.node(first_icon).is_none());
    // Overlay node plus exactly one icon.
    assert_eq!(fx.host.owned_nodes(), 2);
    assert_eq!(fx.host.node(ov.node()).unwrap().children.len(), 1);
}

#[test]
fn set_target_is_idempotent() {
    let fx = fixture();
    let mut ov = overlay(&fx, Edge::Left, OverlayConfig::default());
    ov.set_target(Some(fx.windows[0]));
    let first = ov.placement();
    let first_icon = fx.host.node(ov.icon().unwrap()).unwrap().rect;
    ov.set_target(Some(fx.windows[0]));
    assert_eq!(ov.placement(), first);
    assert_eq!(fx.host.node(ov.icon().unwrap()).unwrap().rect, first_icon);
}

#[test]
fn animating_neighbour_uses_destination() {
    let fx = fixture();
    fx.host.set_destination_x(fx.windows[1], Some(800)).unwrap();
    let mut ov = overlay(&fx, Edge::Left, OverlayConfig::default());
    assert!(ov.set_target(Some(fx.windows[0])));
    assert_eq!(ov.placement().unwrap().rect.w, MARGIN);
}

#[test]
fn clearing_the_target_hides_and_drops_icon() {
    let fx = fixture();
    let mut ov = overlay(&fx, Edge::Left, OverlayConfig::default());
    ov.set_target(Some(fx.windows[0]));
    assert!(!ov.set_target(None));
    assert_eq!(ov.state(), OverlayState::Idle);
    assert!(ov.icon().is_none());
    assert!(ov.placement().is_none());
    assert!(!fx.host.node(ov.node()).unwrap().visible);
    assert_eq!(fx.host.owned_nodes(), 1);
}

#[test]
fn sole_window_leaves_both_overlays_idle() {
    let host = Rc::new(SimHost::new(WorkArea::below_top_bar(1920, 1080, 32), MARGIN));
    let only = host.add_window(WindowGeometry::at_rest(Rect::new(0, 40, 800, 1000)), None);
    host.add_space(vec![only]);
    let compositor: Rc<dyn Compositor> = host.clone();
    let tiling: Rc<dyn Tiling> = host.clone();
    let mut overlays = StackOverlays::enable(compositor, tiling, &OverlayConfig::default());
    overlays.set_targets(Some(only), Some(only));
    for edge in Edge::ALL {
        let ov = overlays.get(edge);
        assert_eq!(ov.state(), OverlayState::Idle);
        assert!(!host.node(ov.node()).unwrap().visible);
    }
}

#[test]
fn target_on_the_other_edge_is_rejected() {
    let fx = fixture();
    let mut ov = overlay(&fx, Edge::Right, OverlayConfig::default());
    assert!(ov.set_target(Some(fx.windows[2])));
    // Left-stacked window offered to the right overlay.
    assert!(!ov.set_target(Some(fx.windows[0])));
    assert_eq!(ov.state(), OverlayState::Idle);
}

#[test]
fn window_outside_any_space_is_rejected() {
    let fx = fixture();
    let stray = fx
        .host
        .add_window(WindowGeometry::at_rest(Rect::new(0, 40, 400, 400)), None);
    let mut ov = overlay(&fx, Edge::Left, OverlayConfig::default());
    assert!(!ov.set_target(Some(stray)));
    assert_eq!(ov.state(), OverlayState::Idle);
}

#[test]
fn press_is_swallowed_and_release_activates() {
    let fx = fixture();
    let mut ov = overlay(&fx, Edge::Left, OverlayConfig::default());
    ov.set_target(Some(fx.windows[0]));

    assert_eq!(fx.host.press(ov.node()), Propagation::Stop);
    assert!(fx.host.activations().is_empty());
    assert_eq!(fx.host.release(ov.node()), Propagation::Stop);
    assert_eq!(fx.host.activations(), vec![fx.windows[0]]);
}

#[test]
fn refused_activation_is_contained() {
    let fx = fixture();
    let mut ov = overlay(&fx, Edge::Left, OverlayConfig::default());
    ov.set_target(Some(fx.windows[0]));
    fx.host.fail_activation(fx.windows[0], true);

    assert_eq!(fx.host.release(ov.node()), Propagation::Stop);
    assert_eq!(ov.state(), OverlayState::Tracking(fx.windows[0]));
    assert!(fx.host.activations().is_empty());

    fx.host.fail_activation(fx.windows[0], false);
    assert_eq!(fx.host.release(ov.node()), Propagation::Stop);
    assert_eq!(fx.host.activations(), vec![fx.windows[0]]);
}

#[test]
fn stack_margin_is_read_on_every_retarget() {
    let fx = fixture();
    let mut ov = overlay(&fx, Edge::Left, OverlayConfig::default());
    assert!(ov.set_target(Some(fx.windows[0])));
    assert_eq!(ov.placement().unwrap().rect.w, 45);

    fx.host.set_stack_margin(30);
    assert!(ov.set_target(Some(fx.windows[0])));
    assert_eq!(ov.placement().unwrap().rect.w, 30);
}

#[test]
fn release_after_target_closed_goes_idle() {
    let fx = fixture();
    let mut ov = overlay(&fx, Edge::Left, OverlayConfig::default());
    ov.set_target(Some(fx.windows[0]));
    fx.host.close_window(fx.windows[0]).unwrap();
    // The restack announced by the close already noticed the stale target.
    assert_eq!(ov.state(), OverlayState::Idle);
    assert_eq!(fx.host.release(ov.node()), Propagation::Propagate);
    assert!(fx.host.activations().is_empty());
}

#[test]
fn fade_out_leaves_logical_state_alone() {
    let fx = fixture();
    let mut ov = overlay(&fx, Edge::Left, OverlayConfig::default());
    ov.set_target(Some(fx.windows[0]));
    ov.fade_out();
    let node = fx.host.node(ov.node()).unwrap();
    assert_eq!(node.opacity, 0);
    assert_eq!(node.fade, Some(Duration::from_millis(250)));
    assert!(node.visible);
    assert_eq!(ov.target(), Some(fx.windows[0]));
}

#[test]
fn update_icon_while_idle_only_clears() {
    let fx = fixture();
    let mut ov = overlay(&fx, Edge::Left, OverlayConfig::default());
    ov.update_icon();
    assert!(ov.icon().is_none());
    assert_eq!(fx.host.owned_nodes(), 1);
}

#[test]
fn disable_releases_everything_even_while_tracking() {
    let fx = fixture();
    let compositor: Rc<dyn Compositor> = fx.host.clone();
    let tiling: Rc<dyn Tiling> = fx.host.clone();
    let mut overlays = StackOverlays::enable(compositor, tiling, &OverlayConfig::default());
    overlays.set_targets(Some(fx.windows[0]), Some(fx.windows[2]));
    assert!(matches!(overlays.left().state(), OverlayState::Tracking(_)));
    assert!(matches!(overlays.right().state(), OverlayState::Tracking(_)));
    // Two nodes and two icons; press, release, and restack per overlay.
    assert_eq!(fx.host.owned_nodes(), 4);
    assert_eq!(fx.host.live_subscriptions(), 6);

    overlays.disable();
    assert_eq!(fx.host.owned_nodes(), 0);
    assert_eq!(fx.host.live_subscriptions(), 0);
}

#[test]
fn dropping_an_overlay_destroys_it() {
    let fx = fixture();
    {
        let mut ov = overlay(&fx, Edge::Left, OverlayConfig::default());
        ov.set_target(Some(fx.windows[0]));
        ov.destroy();
        ov.destroy();
        assert!(!ov.is_connected());
        assert!(!ov.set_target(Some(fx.windows[0])));
    }
    {
        let _ov = overlay(&fx, Edge::Right, OverlayConfig::default());
    }
    assert_eq!(fx.host.owned_nodes(), 0);
    assert_eq!(fx.host.live_subscriptions(), 0);
}

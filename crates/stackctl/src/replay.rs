//! Replay scenario steps against the overlays and report what they look like.

use std::{
    io::{self, Write},
    path::Path,
    rc::Rc,
};

use stack_overlay::{
    Bounds, Compositor, Edge, OverlayConfig, OverlayPlacement, OverlayState, StackOverlay,
    StackOverlays, Tiling, WindowId, resolve, resolve_edge,
};
use tracing::{debug, info};

use crate::{
    cli::{ResolveArgs, RunArgs},
    error::Result,
    scenario::{Scenario, Step, World},
};

/// Load an optional overlay config, falling back to defaults.
fn load_config(path: Option<&Path>) -> Result<OverlayConfig> {
    match path {
        Some(p) => Ok(OverlayConfig::load_from_path(p)?),
        None => Ok(OverlayConfig::default()),
    }
}

/// Entry point for `stackctl run`.
pub fn run(args: &RunArgs) -> Result<()> {
    let scenario = Scenario::load(&args.scenario)?;
    let cfg = load_config(args.config.as_deref())?;
    info!(scenario = %args.scenario.display(), steps = scenario.steps.len(), "replaying");
    let lines = replay(&scenario, &cfg)?;
    let mut out = io::stdout().lock();
    for line in lines {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

/// Entry point for `stackctl resolve`.
pub fn resolve_window(args: &ResolveArgs) -> Result<()> {
    let scenario = Scenario::load(&args.scenario)?;
    let cfg = load_config(args.config.as_deref())?;
    let world = scenario.build()?;
    let target = world.lookup(&args.window)?;
    let placement = resolve_one(&world, target, args.edge.map(Edge::from), &cfg);
    let mut out = io::stdout().lock();
    match placement {
        Some(p) => writeln!(out, "{}", describe_placement(&p))?,
        None => writeln!(out, "{}: no placement", args.window)?,
    }
    Ok(())
}

/// Run the resolver for one window of `world`, bypassing the overlays.
fn resolve_one(
    world: &World,
    target: WindowId,
    edge: Option<Edge>,
    cfg: &OverlayConfig,
) -> Option<OverlayPlacement> {
    let host = &world.host;
    let space = host.space_of_window(target)?;
    let bounds = Bounds {
        work_area: host.work_area(),
        stack_margin: host.stack_margin(),
        resize_border_width: cfg.resize_border_width,
    };
    let icon = cfg.show_icon.then(|| cfg.icon_params());
    let geometry = |w: WindowId| host.window_geometry(w);
    match edge {
        Some(edge) => resolve_edge(edge, target, &space, geometry, &bounds, icon.as_ref()),
        None => resolve(target, &space, geometry, &bounds, icon.as_ref()),
    }
}

/// Replay every step of `scenario`, returning one report line per step.
pub fn replay(scenario: &Scenario, cfg: &OverlayConfig) -> Result<Vec<String>> {
    let world = scenario.build()?;
    let compositor: Rc<dyn Compositor> = world.host.clone();
    let tiling: Rc<dyn Tiling> = world.host.clone();
    let mut overlays = StackOverlays::enable(compositor, tiling, cfg);

    let mut lines = Vec::with_capacity(scenario.steps.len());
    for (i, step) in scenario.steps.iter().enumerate() {
        apply(&world, &mut overlays, step)?;
        lines.push(format!(
            "{:>3} {:<20} | {} | {}",
            i + 1,
            step.to_string(),
            describe(&world, overlays.left()),
            describe(&world, overlays.right()),
        ));
    }
    overlays.disable();
    Ok(lines)
}

/// Apply one step.
fn apply(world: &World, overlays: &mut StackOverlays, step: &Step) -> Result<()> {
    let host = &world.host;
    match step {
        Step::SetTarget { edge, window } => {
            let target = window.as_deref().map(|w| world.lookup(w)).transpose()?;
            let tracking = overlays.get_mut(*edge).set_target(target);
            debug!(%edge, tracking, "set target");
        }
        Step::Raise(name) => host.raise_window(world.lookup(name)?)?,
        Step::Restack => host.restack(),
        Step::Press(edge) => {
            let propagation = host.press(overlays.get(*edge).node());
            debug!(%edge, ?propagation, "press");
        }
        Step::Release(edge) => {
            let propagation = host.release(overlays.get(*edge).node());
            debug!(%edge, ?propagation, "release");
        }
        Step::FadeOut(edge) => overlays.get(*edge).fade_out(),
        Step::UpdateIcon(edge) => overlays.get_mut(*edge).update_icon(),
        Step::Close(name) => host.close_window(world.lookup(name)?)?,
        Step::Animate {
            window,
            destination_x,
        } => host.set_destination_x(world.lookup(window)?, *destination_x)?,
    }
    Ok(())
}

/// One-line summary of an overlay.
fn describe(world: &World, overlay: &StackOverlay) -> String {
    let edge = overlay.edge();
    let OverlayState::Tracking(target) = overlay.state() else {
        return format!("{edge}: idle");
    };
    let above = world
        .host
        .actor_of(target)
        .is_some_and(|actor| world.host.is_directly_above(overlay.node(), actor));
    let placement = overlay
        .placement()
        .map(|p| describe_placement(&p))
        .unwrap_or_default();
    let opacity = world.host.node(overlay.node()).map_or(0, |n| n.opacity);
    format!(
        "{edge}: {} {placement}{}{}",
        world.name_of(target),
        if above { "" } else { " (below)" },
        if opacity == 0 { " (faded)" } else { "" },
    )
}

/// Rect and icon of a placement.
fn describe_placement(p: &OverlayPlacement) -> String {
    match p.icon {
        Some(icon) => format!("{} {} icon@{},{}", p.edge, p.rect, icon.x, icon.y),
        None => format!("{} {}", p.edge, p.rect),
    }
}

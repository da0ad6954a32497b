//! Scenario files: a monitor, a tiled layout, and a script of steps to replay.

use std::{collections::BTreeMap, fmt, fs, path::Path, rc::Rc};

use serde::Deserialize;
use stack_overlay::{AppId, Edge, Point, Rect, WindowGeometry, WindowId, WorkArea, sim::SimHost};

use crate::error::{Error, Result};

/// Monitor dimensions.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Monitor {
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

/// One managed window.
#[derive(Debug, Clone, Deserialize)]
pub struct WindowSpec {
    /// Name used by spaces and steps.
    pub name: String,
    /// Frame rectangle.
    pub frame: Rect,
    /// Buffer rectangle; defaults to the frame.
    #[serde(default)]
    pub buffer: Option<Rect>,
    /// Actor position; defaults to the buffer origin.
    #[serde(default)]
    pub actor: Option<Point>,
    /// X the window is animating towards.
    #[serde(default)]
    pub destination_x: Option<i32>,
    /// Application id used for the icon.
    #[serde(default)]
    pub app: Option<String>,
}

impl WindowSpec {
    /// Compositor geometry for this window.
    fn geometry(&self) -> WindowGeometry {
        let buffer = self.buffer.unwrap_or(self.frame);
        WindowGeometry {
            frame: self.frame,
            buffer,
            actor: self.actor.unwrap_or(Point::new(buffer.x, buffer.y)),
            destination_x: self.destination_x,
        }
    }
}

/// A scripted event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub enum Step {
    /// Point an overlay at a window, or clear it with `None`.
    SetTarget {
        /// Overlay to retarget.
        edge: Edge,
        /// Window name.
        window: Option<String>,
    },
    /// Raise a window; the host announces a restack.
    Raise(String),
    /// Announce a restack without changing the stacking.
    Restack,
    /// Button press on an overlay.
    Press(Edge),
    /// Button release on an overlay.
    Release(Edge),
    /// Fade an overlay out.
    FadeOut(Edge),
    /// Re-derive an overlay's icon from current geometry.
    UpdateIcon(Edge),
    /// Close a window; the host announces a restack.
    Close(String),
    /// Start or finish a horizontal animation of a window.
    Animate {
        /// Window name.
        window: String,
        /// Animation endpoint, `None` once settled.
        destination_x: Option<i32>,
    },
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetTarget {
                edge,
                window: Some(w),
            } => write!(f, "target {edge} {w}"),
            Self::SetTarget { edge, window: None } => write!(f, "target {edge} none"),
            Self::Raise(w) => write!(f, "raise {w}"),
            Self::Restack => write!(f, "restack"),
            Self::Press(edge) => write!(f, "press {edge}"),
            Self::Release(edge) => write!(f, "release {edge}"),
            Self::FadeOut(edge) => write!(f, "fade {edge}"),
            Self::UpdateIcon(edge) => write!(f, "icon {edge}"),
            Self::Close(w) => write!(f, "close {w}"),
            Self::Animate {
                window,
                destination_x: Some(x),
            } => write!(f, "animate {window} ->{x}"),
            Self::Animate {
                window,
                destination_x: None,
            } => write!(f, "settle {window}"),
        }
    }
}

/// A complete scenario file.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// Monitor the overlays live on.
    pub monitor: Monitor,
    /// Height of the panel above the work area.
    #[serde(default)]
    pub top_bar: i32,
    /// Pixels reserved at each edge for stacked windows.
    pub stack_margin: i32,
    /// Managed windows, in creation (stacking) order.
    pub windows: Vec<WindowSpec>,
    /// Spaces as ordered lists of window names.
    pub spaces: Vec<Vec<String>>,
    /// Script to replay.
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Scenario {
    /// Parse a scenario from RON text.
    pub fn from_ron_str(text: &str, path: &Path) -> Result<Self> {
        ron::from_str(text).map_err(|e| Error::Scenario {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load a scenario from a `.ron` file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_ron_str(&text, path)
    }

    /// Populate a fresh simulated host with this scenario's layout.
    pub fn build(&self) -> Result<World> {
        let work_area =
            WorkArea::below_top_bar(self.monitor.width, self.monitor.height, self.top_bar);
        let host = Rc::new(SimHost::new(work_area, self.stack_margin));
        let mut names = BTreeMap::new();
        for spec in &self.windows {
            let id = host.add_window(spec.geometry(), spec.app.clone().map(AppId));
            if names.insert(spec.name.clone(), id).is_some() {
                return Err(Error::DuplicateWindow(spec.name.clone()));
            }
        }
        let world = World { host, names };
        for space in &self.spaces {
            let ids = space
                .iter()
                .map(|name| world.lookup(name))
                .collect::<Result<Vec<_>>>()?;
            world.host.add_space(ids);
        }
        Ok(world)
    }
}

/// A scenario layout loaded into a simulated host.
pub struct World {
    /// The simulated compositor and tiling engine.
    pub host: Rc<SimHost>,
    /// Window ids by scenario name.
    names: BTreeMap<String, WindowId>,
}

impl World {
    /// Window id for a scenario name.
    pub fn lookup(&self, name: &str) -> Result<WindowId> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownWindow(name.to_string()))
    }

    /// Scenario name of a window id.
    pub fn name_of(&self, window: WindowId) -> String {
        self.names
            .iter()
            .find(|(_, id)| **id == window)
            .map_or_else(|| window.to_string(), |(name, _)| name.clone())
    }
}

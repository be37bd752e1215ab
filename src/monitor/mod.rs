//! Monitor (output) entities
//!
//! A monitor is a display area in the global logical space. Besides the real
//! outputs there is always one synthetic fallback monitor, enabled only while
//! the compositor has no real output (the unsafe state).

mod manager;

pub use manager::MonitorManager;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::AutoDirection;
use crate::geometry::{Point, Rectangle, Size};
use crate::window::SurfaceId;
use crate::workspace::WorkspaceId;

/// Stable small integer identifying a monitor.
///
/// Real monitors get non-negative ids, reused per output name where possible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonitorId(i32);

impl MonitorId {
    /// Reserved id of the synthetic fallback monitor
    pub const FALLBACK: MonitorId = MonitorId(-1);

    pub const fn new(id: i32) -> Self {
        MonitorId(id)
    }

    pub fn get(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for MonitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a monitor wants to be placed by [`arrange`](MonitorManager::arrange)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Placement {
    /// Explicit logical position
    pub position: Option<Point>,
    pub auto_direction: AutoDirection,
}

/// A layer-shell surface on the top layer, faded out under fullscreen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerSurface {
    pub surface: SurfaceId,
    pub alpha: f32,
    pub fading_out: bool,
}

/// Description of a newly connected output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSpec {
    pub name: String,
    pub description: String,
    /// Mode size in pixels
    pub pixel_size: Size,
    pub scale: f64,
    pub position: Option<Point>,
    pub auto_direction: AutoDirection,
}

impl Default for MonitorSpec {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            pixel_size: Size::new(1920.0, 1080.0),
            scale: 1.0,
            position: None,
            auto_direction: AutoDirection::None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Monitor {
    pub id: MonitorId,
    pub name: String,
    pub description: String,
    /// Logical position in the global space
    pub position: Point,
    pub pixel_size: Size,
    pub scale: f64,
    pub enabled: bool,
    pub active_workspace: Option<WorkspaceId>,
    pub active_special_workspace: Option<WorkspaceId>,
    pub is_unsafe_fallback: bool,
    pub placement: Placement,
    /// Position advertised to legacy clients
    pub compat_position: Point,
    pub compat_scale: f64,
    pub top_layers: Vec<LayerSurface>,
}

impl Monitor {
    pub fn new(id: MonitorId, spec: &MonitorSpec) -> Self {
        let scale = if spec.scale > 0.0 { spec.scale } else { 1.0 };
        Self {
            id,
            name: spec.name.clone(),
            description: spec.description.clone(),
            position: spec.position.unwrap_or_default(),
            pixel_size: spec.pixel_size,
            scale,
            enabled: true,
            active_workspace: None,
            active_special_workspace: None,
            is_unsafe_fallback: false,
            placement: Placement {
                position: spec.position,
                auto_direction: spec.auto_direction,
            },
            compat_position: Point::default(),
            compat_scale: 1.0,
            top_layers: Vec::new(),
        }
    }

    /// The synthetic placeholder used when no real output exists
    pub fn fallback() -> Self {
        let spec = MonitorSpec {
            name: "FALLBACK".into(),
            description: "unsafe fallback output".into(),
            ..MonitorSpec::default()
        };
        let mut monitor = Monitor::new(MonitorId::FALLBACK, &spec);
        monitor.enabled = false;
        monitor.is_unsafe_fallback = true;
        monitor
    }

    /// Logical size
    pub fn size(&self) -> Size {
        self.pixel_size / self.scale
    }

    pub fn logical_box(&self) -> Rectangle {
        Rectangle::new(self.position, self.size())
    }

    pub fn middle(&self) -> Point {
        self.logical_box().center()
    }

    /// Match a static selector: `desc:<prefix>` against the description,
    /// anything else against the name
    pub fn matches_selector(&self, selector: &str) -> bool {
        match selector.strip_prefix("desc:") {
            Some(desc) => !desc.is_empty() && self.description.starts_with(desc.trim()),
            None => self.name == selector,
        }
    }

    /// Whether `workspace` is shown here, as active or active special
    pub fn shows(&self, workspace: WorkspaceId) -> bool {
        self.active_workspace == Some(workspace)
            || self.active_special_workspace == Some(workspace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logical_size_divides_by_scale() {
        let spec = MonitorSpec {
            name: "DP-1".into(),
            pixel_size: Size::new(3840.0, 2160.0),
            scale: 2.0,
            ..MonitorSpec::default()
        };
        let monitor = Monitor::new(MonitorId::new(0), &spec);
        assert_eq!(monitor.size(), Size::new(1920.0, 1080.0));
    }

    #[test]
    fn selector_matching() {
        let spec = MonitorSpec {
            name: "HDMI-A-1".into(),
            description: "Dell Inc. U2720Q".into(),
            ..MonitorSpec::default()
        };
        let monitor = Monitor::new(MonitorId::new(0), &spec);
        assert!(monitor.matches_selector("HDMI-A-1"));
        assert!(monitor.matches_selector("desc:Dell Inc."));
        assert!(!monitor.matches_selector("desc:"));
        assert!(!monitor.matches_selector("DP-1"));
    }

    #[test]
    fn fallback_starts_disabled() {
        let fallback = Monitor::fallback();
        assert!(fallback.is_unsafe_fallback);
        assert!(!fallback.enabled);
        assert_eq!(fallback.id, MonitorId::FALLBACK);
    }
}

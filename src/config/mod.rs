//! Configuration snapshot consumed by the core
//!
//! The core never parses configuration files itself. The embedding
//! compositor builds a [`Config`] (or deserializes one from JSON) and hands it
//! to [`WeftState`](crate::state::WeftState); `reload_config` replaces the
//! snapshot wholesale.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::WeftResult;
use crate::geometry::Point;

#[cfg(test)]
mod tests;

/// What happens when focus is requested for a window that sits under the
/// workspace's fullscreen window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusUnderFullscreen {
    /// Keep focus on the fullscreen window instead
    Redirect,
    /// Demote the fullscreen window and promote the target into its mode
    Promote,
    /// Drop fullscreen on the current holder
    #[default]
    Cancel,
}

impl FocusUnderFullscreen {
    /// Map the numeric config value (0, 1, 2) to a policy, clamping unknowns
    pub fn from_raw(value: i64) -> Self {
        match value {
            i64::MIN..=0 => FocusUnderFullscreen::Redirect,
            1 => FocusUnderFullscreen::Promote,
            _ => FocusUnderFullscreen::Cancel,
        }
    }
}

/// How directional edge-mode focus ranks candidates that touch the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusPreferredMethod {
    /// Most recently focused wins
    #[default]
    History,
    /// Longest shared edge wins
    Length,
}

/// Direct scanout policy for fullscreen windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectScanout {
    #[default]
    Off,
    On,
    /// Only windows that report a game content type
    GamesOnly,
}

/// Direction a monitor without an explicit position is placed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoDirection {
    #[default]
    None,
    Up,
    Down,
    Left,
    Right,
}

/// Per-output placement rule
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorRule {
    /// Output name this rule applies to
    pub name: String,
    /// Explicit logical position; `None` means auto placement
    pub position: Option<Point>,
    pub auto_direction: AutoDirection,
    pub scale: Option<f64>,
}

/// Per-workspace rule
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceRule {
    /// Workspace name (numeric workspaces use their number as name)
    pub name: String,
    /// Output name this workspace is bound to
    pub monitor: Option<String>,
    pub persistent: bool,
    /// Workspace shown first when `monitor` connects
    pub default: bool,
}

/// Read-only configuration snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 0: focus follows clicks only, 1: full follow, 2/3: loose variants
    pub follow_mouse: i64,
    /// Let hit-testing fall through an open special workspace
    pub special_fallthrough: bool,
    pub resize_on_border: bool,
    pub border_size: i64,
    pub extend_border_grab_area: i64,
    pub focus_preferred_method: FocusPreferredMethod,
    /// Allow directional focus to leave the current monitor
    pub monitor_fallback: bool,
    pub on_focus_under_fullscreen: FocusUnderFullscreen,
    pub direct_scanout: DirectScanout,
    pub allow_pin_fullscreen: bool,
    pub hide_special_on_workspace_change: bool,
    pub no_warps: bool,
    /// Angular tolerance (radians) below which nearer candidates win
    pub directional_angle_threshold: f64,
    pub xwayland_force_zero_scaling: bool,
    pub workspace_rules: Vec<WorkspaceRule>,
    pub monitor_rules: Vec<MonitorRule>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            follow_mouse: 1,
            special_fallthrough: false,
            resize_on_border: false,
            border_size: 1,
            extend_border_grab_area: 15,
            focus_preferred_method: FocusPreferredMethod::History,
            monitor_fallback: true,
            on_focus_under_fullscreen: FocusUnderFullscreen::Cancel,
            direct_scanout: DirectScanout::Off,
            allow_pin_fullscreen: false,
            hide_special_on_workspace_change: false,
            no_warps: false,
            directional_angle_threshold: 0.3 * std::f64::consts::PI,
            xwayland_force_zero_scaling: false,
            workspace_rules: Vec::new(),
            monitor_rules: Vec::new(),
        }
    }
}

impl Config {
    /// Load a config snapshot from a JSON file
    pub fn load_from_file(path: &Path) -> WeftResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a config snapshot from a JSON string
    pub fn from_json(content: &str) -> WeftResult<Self> {
        let config: Config = serde_json::from_str(content)?;
        Ok(config)
    }

    /// Margin added around a window's box when hit-testing for border grabs
    pub fn border_grab_margin(&self) -> f64 {
        (self.border_size + self.extend_border_grab_area).max(0) as f64
    }

    /// Workspace rule for a workspace name
    pub fn workspace_rule(&self, name: &str) -> Option<&WorkspaceRule> {
        self.workspace_rules.iter().find(|rule| rule.name == name)
    }

    /// Output name a workspace is bound to by rule
    pub fn bound_monitor_name(&self, workspace_name: &str) -> Option<&str> {
        self.workspace_rule(workspace_name)
            .and_then(|rule| rule.monitor.as_deref())
    }

    /// Name of the workspace marked `default` for an output
    pub fn default_workspace_for(&self, monitor_name: &str) -> Option<&str> {
        self.workspace_rules
            .iter()
            .find(|rule| rule.default && rule.monitor.as_deref() == Some(monitor_name))
            .map(|rule| rule.name.as_str())
    }

    pub fn monitor_rule(&self, name: &str) -> Option<&MonitorRule> {
        self.monitor_rules.iter().find(|rule| rule.name == name)
    }
}

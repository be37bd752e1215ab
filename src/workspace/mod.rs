//! Workspace entities
//!
//! Workspace ids share one integer namespace split into disjoint ranges:
//! - `>= 0`: numbered workspaces
//! - `-99..=-2`: special (overlay) workspaces
//! - `<= -1337`: named workspaces, allocated downwards
//! - `-1`: invalid

mod manager;

pub use manager::WorkspaceManager;

use serde::{Deserialize, Serialize};

use crate::monitor::MonitorId;
use crate::window::{FullscreenMode, WindowId};

/// Unique identifier for workspaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkspaceId(i64);

impl WorkspaceId {
    pub const INVALID: WorkspaceId = WorkspaceId(-1);
    /// Lowest special workspace id
    pub const SPECIAL_START: WorkspaceId = WorkspaceId(-99);
    /// Highest special workspace id
    pub const SPECIAL_END: WorkspaceId = WorkspaceId(-2);
    /// Named workspaces are allocated strictly below this id
    pub const NAMED_START: WorkspaceId = WorkspaceId(-1337);

    pub const fn new(id: i64) -> Self {
        WorkspaceId(id)
    }

    pub fn get(&self) -> i64 {
        self.0
    }

    pub fn is_special(&self) -> bool {
        (Self::SPECIAL_START.0..=Self::SPECIAL_END.0).contains(&self.0)
    }

    pub fn is_named(&self) -> bool {
        self.0 <= Self::NAMED_START.0
    }

    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }
}

impl std::fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Record of the workspace that was active before this one, for
/// back-and-forth switching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviousWorkspace {
    pub id: WorkspaceId,
    pub name: String,
}

/// A virtual desktop
#[derive(Debug, Clone)]
pub struct Workspace {
    pub id: WorkspaceId,
    pub name: String,
    /// Owning monitor; absent only transiently
    pub monitor: Option<MonitorId>,
    pub visible: bool,
    pub is_special: bool,
    pub has_fullscreen_window: bool,
    /// Effective mode of the fullscreen window, if any
    pub fullscreen_mode: FullscreenMode,
    pub persistent: bool,
    pub last_focused_window: Option<WindowId>,
    pub previous: Option<PreviousWorkspace>,
    /// Entrance animation opacity
    pub alpha: f32,
    /// Output name this workspace was last shown on, for hot-plug restore
    pub last_monitor_name: Option<String>,
    /// Created without any windows
    pub was_created_empty: bool,
}

impl Workspace {
    pub fn new(id: WorkspaceId, monitor: MonitorId, name: String, is_empty: bool) -> Self {
        tracing::debug!("Creating workspace {id} ({name}) on monitor {monitor}");
        Self {
            id,
            name,
            monitor: Some(monitor),
            visible: false,
            is_special: id.is_special(),
            has_fullscreen_window: false,
            fullscreen_mode: FullscreenMode::NONE,
            persistent: false,
            last_focused_window: None,
            previous: None,
            alpha: 0.0,
            last_monitor_name: None,
            was_created_empty: is_empty,
        }
    }

    /// Remember `previous` for back-and-forth, ignoring self-references
    pub fn remember_previous(&mut self, previous: &Workspace) {
        if previous.id == self.id {
            return;
        }
        self.previous = Some(PreviousWorkspace {
            id: previous.id,
            name: previous.name.clone(),
        });
    }

    /// Mark the entrance animation as started or finished
    pub fn start_animation(&mut self, entering: bool) {
        self.alpha = if entering { 1.0 } else { 0.0 };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_ranges_are_disjoint() {
        assert!(WorkspaceId::new(-2).is_special());
        assert!(WorkspaceId::new(-99).is_special());
        assert!(!WorkspaceId::new(-100).is_special());
        assert!(!WorkspaceId::new(-1).is_special());
        assert!(WorkspaceId::new(-1337).is_named());
        assert!(!WorkspaceId::new(-1337).is_special());
        assert!(!WorkspaceId::new(3).is_special());
        assert!(!WorkspaceId::INVALID.is_valid());
    }

    #[test]
    fn remember_previous_ignores_self() {
        let mut one = Workspace::new(WorkspaceId::new(1), MonitorId::new(0), "1".into(), true);
        let two = Workspace::new(WorkspaceId::new(2), MonitorId::new(0), "2".into(), true);
        one.remember_previous(&one.clone());
        assert_eq!(one.previous, None);
        one.remember_previous(&two);
        assert_eq!(
            one.previous,
            Some(PreviousWorkspace {
                id: WorkspaceId::new(2),
                name: "2".into()
            })
        );
    }
}

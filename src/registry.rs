//! Entity registry
//!
//! Canonical owner of every window, workspace and monitor. Entities refer to
//! each other by id only; a stale id is an ordinary lookup miss.

use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::{OptionExt, WeftError};
use crate::monitor::{Monitor, MonitorId, MonitorManager};
use crate::window::{Window, WindowId, WindowRegistry};
use crate::workspace::{Workspace, WorkspaceId, WorkspaceManager};

/// Name of the default special workspace
pub const SPECIAL_DEFAULT_NAME: &str = "special:special";

#[derive(Debug, Default)]
pub struct Registry {
    pub windows: WindowRegistry,
    pub workspaces: WorkspaceManager,
    pub monitors: MonitorManager,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn window(&self, id: WindowId) -> Option<&Window> {
        let found = self.windows.get(id);
        if found.is_none() {
            debug!("No window with id {id}");
        }
        found
    }

    pub fn window_mut(&mut self, id: WindowId) -> Option<&mut Window> {
        self.windows.get_mut(id)
    }

    pub fn workspace(&self, id: WorkspaceId) -> Option<&Workspace> {
        self.workspaces.get(id)
    }

    pub fn workspace_mut(&mut self, id: WorkspaceId) -> Option<&mut Workspace> {
        self.workspaces.get_mut(id)
    }

    pub fn monitor(&self, id: MonitorId) -> Option<&Monitor> {
        self.monitors.get(id)
    }

    pub fn monitor_mut(&mut self, id: MonitorId) -> Option<&mut Monitor> {
        self.monitors.get_mut(id)
    }

    /// Create a workspace and return its id.
    ///
    /// A monitor bound to the workspace name by a workspace rule overrides
    /// the requested one. Returns `None` if neither resolves to a monitor.
    pub fn create_workspace(
        &mut self,
        config: &Config,
        id: WorkspaceId,
        monitor: MonitorId,
        name: Option<&str>,
        is_empty: bool,
    ) -> Option<WorkspaceId> {
        if !id.is_valid() {
            error!("Refusing to create a workspace with the invalid id");
            return None;
        }
        let name = name.map_or_else(|| id.to_string(), str::to_string);

        let monitor = self
            .bound_monitor_for_workspace(config, &name)
            .or(Some(monitor))
            .filter(|mon| self.monitors.get(*mon).is_some())
            .ok_or_log(|| WeftError::MonitorNotFound(monitor))
            .ok()?;

        let mut workspace = Workspace::new(id, monitor, name, is_empty);
        workspace.persistent = config
            .workspace_rule(&workspace.name)
            .is_some_and(|rule| rule.persistent);
        workspace.alpha = 0.0;

        info!(
            "Created workspace {} ({}) on monitor {monitor}",
            workspace.id, workspace.name
        );
        self.workspaces.insert(workspace).then_some(id)
    }

    /// Erase every non-persistent workspace that has no windows and is not
    /// shown on any monitor. Returns the erased ids.
    pub fn gc_workspaces(&mut self) -> Vec<WorkspaceId> {
        let doomed: Vec<WorkspaceId> = self
            .workspaces
            .iter()
            .filter(|ws| !ws.persistent)
            .filter(|ws| self.windows.iter().all(|w| w.workspace != ws.id))
            .filter(|ws| !self.is_shown_anywhere(ws.id))
            .map(|ws| ws.id)
            .collect();

        for id in &doomed {
            debug!("Garbage collecting workspace {id}");
            self.workspaces.remove(*id);
        }
        doomed
    }

    /// Active or active-special on some monitor, the fallback included
    pub fn is_shown_anywhere(&self, workspace: WorkspaceId) -> bool {
        self.monitors.iter().any(|mon| mon.shows(workspace))
            || self.monitors.fallback().shows(workspace)
    }

    /// Monitor a workspace name is bound to by a workspace rule, if that
    /// monitor is connected
    pub fn bound_monitor_for_workspace(&self, config: &Config, name: &str) -> Option<MonitorId> {
        let selector = config.bound_monitor_name(name)?;
        let found = self.monitors.by_selector(selector).map(|mon| mon.id);
        if found.is_none() {
            debug!("Workspace '{name}' is bound to '{selector}', which is not connected");
        }
        found
    }

    /// Whether a rule binds `name` to a monitor other than `monitor`
    fn bound_elsewhere(&self, config: &Config, name: &str, monitor: MonitorId) -> bool {
        let Some(selector) = config.bound_monitor_name(name) else {
            return false;
        };
        match self.monitor(monitor) {
            Some(mon) => !mon.matches_selector(selector),
            None => true,
        }
    }

    /// Smallest numeric workspace id, starting at 1, that is free and not
    /// bound by rule to a different monitor
    pub fn find_available_workspace_id(&self, config: &Config, monitor: MonitorId) -> WorkspaceId {
        let mut candidate = 1;
        while self.workspaces.contains(WorkspaceId::new(candidate))
            || self.bound_elsewhere(config, &candidate.to_string(), monitor)
        {
            candidate += 1;
        }
        WorkspaceId::new(candidate)
    }

    /// Workspace a newly connected monitor should show: the rule-declared
    /// default if any, else the first available numeric workspace
    pub fn default_workspace_for_monitor(
        &self,
        config: &Config,
        monitor: MonitorId,
    ) -> (WorkspaceId, String) {
        let rule_default = self
            .monitor(monitor)
            .and_then(|mon| config.default_workspace_for(&mon.name))
            .and_then(|name| self.workspace_target(name));

        match rule_default {
            Some(target) => target,
            None => {
                let id = self.find_available_workspace_id(config, monitor);
                (id, id.to_string())
            }
        }
    }

    /// Resolve a selector to the id and name it refers to, whether or not
    /// the workspace exists yet.
    ///
    /// Accepts `name:<x>`, `special`, `special:<x>`, a non-negative number
    /// or a bare rule name.
    pub fn workspace_target(&self, selector: &str) -> Option<(WorkspaceId, String)> {
        let selector = selector.trim();
        let name = if let Some(name) = selector.strip_prefix("name:") {
            name.to_string()
        } else if selector == "special" {
            SPECIAL_DEFAULT_NAME.to_string()
        } else {
            selector.to_string()
        };

        if let Some(existing) = self.workspaces.iter().find(|ws| ws.name == name) {
            return Some((existing.id, existing.name.clone()));
        }

        if name.starts_with("special:") {
            let id = if name == SPECIAL_DEFAULT_NAME {
                WorkspaceId::SPECIAL_START
            } else {
                self.workspaces.next_special_id()
            };
            return id.is_valid().then_some((id, name));
        }

        match name.parse::<i64>() {
            Ok(id) if id >= 0 => Some((WorkspaceId::new(id), name)),
            Ok(id) => {
                error!("Workspace id {id} is out of range");
                None
            }
            Err(_) if name.is_empty() => {
                error!("Empty workspace selector");
                None
            }
            Err(_) => Some((self.workspaces.next_named_id(), name)),
        }
    }

    /// Resolve a selector, creating the workspace on `monitor` if needed
    pub fn get_or_create_workspace(
        &mut self,
        config: &Config,
        selector: &str,
        monitor: MonitorId,
    ) -> Option<WorkspaceId> {
        let (id, name) = self.workspace_target(selector)?;
        if self.workspaces.contains(id) {
            return Some(id);
        }
        self.create_workspace(config, id, monitor, Some(&name), true)
    }

    /// The member window currently holding fullscreen, if any
    pub fn fullscreen_window(&self, workspace: WorkspaceId) -> Option<WindowId> {
        self.windows
            .in_workspace(workspace)
            .find(|w| w.mapped && w.is_fullscreen())
            .map(|w| w.id)
    }

    pub fn is_workspace_visible(&self, workspace: WorkspaceId) -> bool {
        self.workspaces.get(workspace).is_some_and(|ws| ws.visible)
    }

    /// Mapped windows that are members of a workspace
    pub fn window_count(&self, workspace: WorkspaceId) -> usize {
        self.windows
            .in_workspace(workspace)
            .filter(|w| w.mapped)
            .count()
    }

    /// First mapped, unhidden window of a workspace in stacking order
    pub fn first_window(&self, workspace: WorkspaceId) -> Option<WindowId> {
        self.windows
            .in_workspace(workspace)
            .find(|w| w.is_visible_candidate())
            .map(|w| w.id)
    }
}

//! State validation module for ensuring consistency across the core
//!
//! This module provides validation to ensure that:
//! - Windows reference valid workspaces
//! - A workspace's fullscreen flag matches its member windows, with at most
//!   one fullscreen window per workspace
//! - Monitors show valid workspaces, and workspaces holding windows have a
//!   monitor
//! - The focus history has no duplicates or dead entries

use crate::{
    focus::FocusState,
    monitor::MonitorId,
    registry::Registry,
    window::WindowId,
    workspace::WorkspaceId,
};
use std::collections::{HashMap, HashSet};

/// Errors that can occur during state validation
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Window references a workspace that doesn't exist
    WindowReferencesInvalidWorkspace {
        window: WindowId,
        workspace: WorkspaceId,
    },
    /// Workspace fullscreen flag disagrees with its member windows
    FullscreenFlagMismatch {
        workspace: WorkspaceId,
        flag: bool,
        holders: Vec<WindowId>,
    },
    /// More than one member window holds fullscreen
    MultipleFullscreenWindows {
        workspace: WorkspaceId,
        windows: Vec<WindowId>,
    },
    /// A non-special workspace holds mapped windows but has no live monitor
    WorkspaceWithoutMonitor { workspace: WorkspaceId },
    /// Monitor shows a non-existent workspace
    MonitorShowsInvalidWorkspace {
        monitor: MonitorId,
        workspace: WorkspaceId,
    },
    /// Two workspaces share one id
    DuplicateWorkspaceId { workspace: WorkspaceId },
    /// Special flag disagrees with the id range
    SpecialFlagMismatch { workspace: WorkspaceId },
    /// Focus history lists a window twice
    DuplicateHistoryEntry { window: WindowId },
    /// Focus history lists a window that is gone or unmapped
    HistoryReferencesDeadWindow { window: WindowId },
}

/// Result type for validation operations
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// Trait for types that can validate their internal consistency
pub trait ValidateConsistency {
    /// Validate internal consistency, returning errors if any invariants are violated
    fn validate_consistency(&self) -> ValidationResult;
}

fn into_result(errors: Vec<ValidationError>) -> ValidationResult {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate workspace-window consistency, fullscreen bookkeeping included
pub fn validate_workspace_window_consistency(registry: &Registry) -> ValidationResult {
    let mut errors = Vec::new();

    let mut seen = HashSet::new();
    for ws in registry.workspaces.iter() {
        if !seen.insert(ws.id) {
            errors.push(ValidationError::DuplicateWorkspaceId { workspace: ws.id });
        }
        if ws.is_special != ws.id.is_special() {
            errors.push(ValidationError::SpecialFlagMismatch { workspace: ws.id });
        }
    }

    let mut holders: HashMap<WorkspaceId, Vec<WindowId>> = HashMap::new();
    let mut populated = HashSet::new();
    for window in registry.windows.iter().filter(|w| w.mapped) {
        if !registry.workspaces.contains(window.workspace) {
            errors.push(ValidationError::WindowReferencesInvalidWorkspace {
                window: window.id,
                workspace: window.workspace,
            });
            continue;
        }
        populated.insert(window.workspace);
        if window.is_fullscreen() {
            holders.entry(window.workspace).or_default().push(window.id);
        }
    }

    for ws in registry.workspaces.iter() {
        let ws_holders = holders.remove(&ws.id).unwrap_or_default();
        if ws.has_fullscreen_window != !ws_holders.is_empty() {
            errors.push(ValidationError::FullscreenFlagMismatch {
                workspace: ws.id,
                flag: ws.has_fullscreen_window,
                holders: ws_holders.clone(),
            });
        }
        if ws_holders.len() > 1 {
            errors.push(ValidationError::MultipleFullscreenWindows {
                workspace: ws.id,
                windows: ws_holders,
            });
        }

        let has_monitor = ws
            .monitor
            .is_some_and(|mon| registry.monitors.contains(mon));
        if !ws.is_special && populated.contains(&ws.id) && !has_monitor {
            errors.push(ValidationError::WorkspaceWithoutMonitor { workspace: ws.id });
        }
    }

    into_result(errors)
}

/// Validate that monitors only show existing workspaces
pub fn validate_monitor_consistency(registry: &Registry) -> ValidationResult {
    let mut errors = Vec::new();

    for mon in registry.monitors.iter() {
        for workspace in [mon.active_workspace, mon.active_special_workspace]
            .into_iter()
            .flatten()
        {
            if !registry.workspaces.contains(workspace) {
                errors.push(ValidationError::MonitorShowsInvalidWorkspace {
                    monitor: mon.id,
                    workspace,
                });
            }
        }
    }

    into_result(errors)
}

/// Validate the focus history against the registry
pub fn validate_focus_consistency(focus: &FocusState, registry: &Registry) -> ValidationResult {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for &window in focus.history() {
        if !seen.insert(window) {
            errors.push(ValidationError::DuplicateHistoryEntry { window });
        }
        if !registry.windows.get(window).is_some_and(|w| w.mapped) {
            errors.push(ValidationError::HistoryReferencesDeadWindow { window });
        }
    }

    into_result(errors)
}

impl ValidateConsistency for Registry {
    fn validate_consistency(&self) -> ValidationResult {
        let mut all_errors = Vec::new();
        if let Err(errors) = validate_workspace_window_consistency(self) {
            all_errors.extend(errors);
        }
        if let Err(errors) = validate_monitor_consistency(self) {
            all_errors.extend(errors);
        }
        into_result(all_errors)
    }
}

/// Full state validation combining all consistency checks
pub fn validate_full_state(state: &crate::state::WeftState) -> ValidationResult {
    let mut all_errors = Vec::new();

    if let Err(errors) = state.registry.validate_consistency() {
        all_errors.extend(errors);
    }
    if let Err(errors) = validate_focus_consistency(&state.focus, &state.registry) {
        all_errors.extend(errors);
    }

    into_result(all_errors)
}

#[cfg(debug_assertions)]
/// Debug helper to log validation errors
pub fn log_validation_errors(errors: &[ValidationError]) {
    for error in errors {
        tracing::error!("State validation error: {:?}", error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::monitor::{Monitor, MonitorSpec};
    use crate::window::{FullscreenMode, FullscreenState, Window, WindowSpec};

    fn registry() -> (Registry, WorkspaceId) {
        let mut registry = Registry::new();
        let mon = registry.monitors.next_monitor_id("DP-1");
        registry.monitors.add(Monitor::new(
            mon,
            &MonitorSpec {
                name: "DP-1".into(),
                ..MonitorSpec::default()
            },
        ));
        let ws = registry
            .create_workspace(&Config::default(), WorkspaceId::new(1), mon, None, true)
            .unwrap();
        registry.monitor_mut(mon).unwrap().active_workspace = Some(ws);
        (registry, ws)
    }

    #[test]
    fn consistent_registry_passes() {
        let (mut registry, ws) = registry();
        registry
            .windows
            .insert(Window::new(&WindowSpec::default(), ws, None));
        assert_eq!(registry.validate_consistency(), Ok(()));
    }

    #[test]
    fn unflagged_fullscreen_window_is_reported() {
        let (mut registry, ws) = registry();
        let mut window = Window::new(&WindowSpec::default(), ws, None);
        window.fullscreen = FullscreenState::both(FullscreenMode::FULLSCREEN);
        let id = registry.windows.insert(window);

        let errors = validate_workspace_window_consistency(&registry).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::FullscreenFlagMismatch {
                workspace: ws,
                flag: false,
                holders: vec![id],
            }]
        );
    }

    #[test]
    fn dangling_workspace_reference_is_reported() {
        let (mut registry, _) = registry();
        let id = registry.windows.insert(Window::new(
            &WindowSpec::default(),
            WorkspaceId::new(42),
            None,
        ));
        let errors = registry.validate_consistency().unwrap_err();
        assert!(errors.contains(&ValidationError::WindowReferencesInvalidWorkspace {
            window: id,
            workspace: WorkspaceId::new(42),
        }));
    }
}

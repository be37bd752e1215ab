use tracing::{debug, info, warn};

use crate::backend::Backends;
use crate::config::Config;
use crate::event::EventBus;
use crate::focus::{FocusGuards, FocusState};
use crate::geometry::Point;
use crate::monitor::MonitorId;
use crate::registry::Registry;
use crate::window::{FullscreenMode, Window, WindowId, WindowProps, WindowSpec};
use crate::workspace::WorkspaceId;

/// The compositor core state.
///
/// Owns the entity registry, the focus state and the config snapshot, and
/// drives the external collaborators through [`Backends`]. All coordinator
/// operations are methods on this type, spread over the `focus`,
/// `fullscreen`, `spatial` and `binding` modules.
#[derive(Debug)]
pub struct WeftState {
    pub config: Config,
    pub registry: Registry,
    pub focus: FocusState,
    pub guards: FocusGuards,
    pub backends: Backends,
    pub events: EventBus,
    /// Running on the fallback monitor because no real output exists
    pub(crate) unsafe_state: bool,
}

impl WeftState {
    /// Create the core state. It starts in the unsafe state until the first
    /// monitor connects.
    pub fn new(config: Config, backends: Backends) -> Self {
        let mut state = Self {
            config,
            registry: Registry::new(),
            focus: FocusState::default(),
            guards: FocusGuards::default(),
            backends,
            events: EventBus::new(),
            unsafe_state: false,
        };
        state.enter_unsafe_state();
        state
    }

    /// Replace the config snapshot and re-apply what depends on it
    pub fn reload_config(&mut self, config: Config) {
        info!("Reloading configuration");
        self.config = config;

        for ws in self.registry.workspaces.iter_mut() {
            ws.persistent = self
                .config
                .workspace_rule(&ws.name)
                .is_some_and(|rule| rule.persistent);
        }

        let rules: Vec<_> = self.config.monitor_rules.clone();
        for mon in self.registry.monitors.iter_mut() {
            if let Some(rule) = rules.iter().find(|rule| rule.name == mon.name) {
                mon.placement.position = rule.position;
                mon.placement.auto_direction = rule.auto_direction;
                if let Some(scale) = rule.scale.filter(|scale| *scale > 0.0) {
                    mon.scale = scale;
                }
            }
        }
        self.arrange_monitors();
    }

    pub fn is_unsafe(&self) -> bool {
        self.unsafe_state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Map a new window and return its id.
    ///
    /// The window lands on the workspace named by `spec.workspace`, or else
    /// on the focused monitor's open special workspace or active workspace.
    pub fn map_window(&mut self, spec: &WindowSpec) -> Option<WindowId> {
        let Some(monitor) = self.focus.monitor else {
            warn!("Cannot map a window without a focused monitor");
            return None;
        };

        let workspace = match spec.workspace.as_deref() {
            Some(selector) => {
                self.registry
                    .get_or_create_workspace(&self.config, selector, monitor)?
            }
            None => {
                let mon = self.registry.monitor(monitor)?;
                match mon.active_special_workspace {
                    Some(special) if !spec.pinned => special,
                    _ => mon.active_workspace?,
                }
            }
        };
        let ws_monitor = self
            .registry
            .workspace(workspace)
            .and_then(|ws| ws.monitor)
            .unwrap_or(monitor);

        let mut window = Window::new(spec, workspace, Some(ws_monitor));
        if window.pinned && !window.floating {
            debug!("Pinned windows float, making {} floating", window.id);
            window.floating = true;
        }
        let under_fullscreen = self
            .registry
            .workspace(workspace)
            .is_some_and(|ws| ws.has_fullscreen_window);
        window.created_over_fullscreen = under_fullscreen && window.floating;

        let floating = window.floating;
        let id = self.registry.windows.insert(window);
        info!(
            "Mapped window {id} ({}) on workspace {workspace}",
            spec.class
        );

        if !floating {
            self.backends
                .layout
                .on_tiling_created(&mut self.registry, id);
        }
        self.focus.remember(id);

        if !spec.no_initial_focus && !spec.no_focus {
            self.focus_window(Some(id), None, false);
        }

        #[cfg(debug_assertions)]
        self.check_consistency();
        Some(id)
    }

    /// Unmap a window, dropping fullscreen and moving focus on
    pub fn unmap_window(&mut self, id: WindowId) {
        let Some(window) = self.registry.window(id) else {
            return;
        };
        if !window.mapped {
            return;
        }
        let (workspace, floating, fullscreen) =
            (window.workspace, window.floating, window.is_fullscreen());

        if fullscreen {
            if self.is_unsafe() {
                self.drop_fullscreen(id);
            } else {
                self.set_fullscreen_internal(id, FullscreenMode::NONE);
            }
        }
        if let Some(w) = self.registry.window_mut(id) {
            w.mapped = false;
            w.fading_out = true;
        }
        if !floating {
            self.backends
                .layout
                .on_tiling_removed(&mut self.registry, id);
        }
        if let Some(ws) = self.registry.workspace_mut(workspace) {
            if ws.last_focused_window == Some(id) {
                ws.last_focused_window = None;
            }
        }
        self.focus.forget(id);
        info!("Unmapped window {id}");

        if self.focus.window == Some(id) {
            let next = self.refocus_candidate(workspace);
            self.focus_window(next, None, false);
        }

        #[cfg(debug_assertions)]
        self.check_consistency();
    }

    /// Unmap and forget a window
    pub fn destroy_window(&mut self, id: WindowId) {
        self.unmap_window(id);
        if let Some(w) = self.registry.window_mut(id) {
            w.ready_to_delete = true;
        }
        let Some(window) = self.registry.windows.remove(id) else {
            return;
        };
        self.focus.remove_constraint(window.surface);
        for popup in &window.popups {
            self.focus.remove_constraint(popup.surface);
        }
        debug!("Destroyed window {id}");
        self.registry.gc_workspaces();
    }

    /// Ask a window's client to close it
    pub fn close_window(&mut self, id: WindowId) {
        if self.registry.window(id).is_some() {
            self.backends.activation.send_close(id);
        }
    }

    /// Window to focus after the focused one went away: the most recent
    /// window in history on the same workspace, else whatever is under the
    /// cursor
    fn refocus_candidate(&self, workspace: WorkspaceId) -> Option<WindowId> {
        let from_history = self.focus.history().iter().copied().find(|id| {
            self.registry
                .windows
                .get(*id)
                .is_some_and(|w| w.workspace == workspace && w.is_visible_candidate())
        });
        from_history.or_else(|| self.window_under_cursor())
    }

    /// Window under the pointer using the default hit-test properties
    pub fn window_under_cursor(&self) -> Option<WindowId> {
        let pointer: Point = self.backends.input.pointer_position();
        self.window_at(
            pointer,
            WindowProps::RESERVED_EXTENTS
                | WindowProps::INPUT_EXTENTS
                | WindowProps::ALLOW_FLOATING,
            None,
        )
    }

    /// The focused monitor's active workspace
    pub fn active_workspace(&self) -> Option<WorkspaceId> {
        self.focus
            .monitor
            .and_then(|mon| self.registry.monitor(mon))
            .and_then(|mon| mon.active_workspace)
    }

    /// Run every consistency check over the current state
    pub fn validate_consistency(&self) -> super::validation::ValidationResult {
        super::validation::validate_full_state(self)
    }

    /// Debug helper to check and log validation errors
    #[cfg(debug_assertions)]
    pub fn check_consistency(&self) {
        if let Err(errors) = self.validate_consistency() {
            tracing::error!(
                "State consistency check failed with {} errors:",
                errors.len()
            );
            super::validation::log_validation_errors(&errors);
        }
    }

    /// Monitor a window is on, falling back to its workspace's monitor
    pub fn window_monitor(&self, id: WindowId) -> Option<MonitorId> {
        let window = self.registry.windows.get(id)?;
        window.monitor.or_else(|| {
            self.registry
                .workspaces
                .get(window.workspace)
                .and_then(|ws| ws.monitor)
        })
    }
}

//! Keyboard focus coordination
//!
//! Focus is in one of three states:
//! - unfocused: no window, no surface
//! - a bare surface (a layer or lock surface) without an owning window
//! - a window together with the surface that holds keyboard focus, normally
//!   the window's main surface
//!
//! [`WeftState::focus_window`] is the single entry point that moves window
//! focus. It applies the focus guards, switches workspaces when the target is
//! not visible and resolves conflicts with a fullscreen window on the target's
//! workspace according to `on_focus_under_fullscreen`.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use crate::config::FocusUnderFullscreen;
use crate::event::Event;
use crate::monitor::MonitorId;
use crate::state::WeftState;
use crate::window::{FullscreenMode, SurfaceId, WindowId};
use crate::workspace::WorkspaceId;

/// Observable focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    Unfocused,
    Surface(SurfaceId),
    Window(WindowId, SurfaceId),
}

/// A pointer constraint (lock or confinement) attached to a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerConstraint {
    pub active: bool,
}

/// Focus bookkeeping
#[derive(Debug, Default)]
pub struct FocusState {
    pub window: Option<WindowId>,
    pub surface: Option<SurfaceId>,
    pub monitor: Option<MonitorId>,
    /// Most recent first, no duplicates
    history: Vec<WindowId>,
    constraints: HashMap<SurfaceId, PointerConstraint>,
}

impl FocusState {
    pub fn target(&self) -> FocusTarget {
        match (self.window, self.surface) {
            (Some(window), Some(surface)) => FocusTarget::Window(window, surface),
            (None, Some(surface)) => FocusTarget::Surface(surface),
            _ => FocusTarget::Unfocused,
        }
    }

    pub fn history(&self) -> &[WindowId] {
        &self.history
    }

    /// Move a window to the front of the history
    pub fn promote(&mut self, window: WindowId) {
        self.history.retain(|id| *id != window);
        self.history.insert(0, window);
    }

    /// Append a window at the back unless it is already known
    pub fn remember(&mut self, window: WindowId) {
        if !self.history.contains(&window) {
            self.history.push(window);
        }
    }

    pub fn forget(&mut self, window: WindowId) {
        self.history.retain(|id| *id != window);
    }

    /// Position in the history, 0 being the most recent
    pub fn history_index(&self, window: WindowId) -> Option<usize> {
        self.history.iter().position(|id| *id == window)
    }

    pub fn add_constraint(&mut self, surface: SurfaceId) {
        let active = self.surface == Some(surface);
        self.constraints
            .insert(surface, PointerConstraint { active });
    }

    pub fn remove_constraint(&mut self, surface: SurfaceId) {
        self.constraints.remove(&surface);
    }

    pub fn constraint(&self, surface: SurfaceId) -> Option<PointerConstraint> {
        self.constraints.get(&surface).copied()
    }

    fn set_constraint_active(&mut self, surface: SurfaceId, active: bool) {
        if let Some(constraint) = self.constraints.get_mut(&surface) {
            debug!("Pointer constraint on {surface} active: {active}");
            constraint.active = active;
        }
    }
}

/// A keyboard grab that only lets some surfaces receive focus
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyboardGrab {
    pub allowed: HashSet<SurfaceId>,
}

impl KeyboardGrab {
    pub fn accepts(&self, surface: SurfaceId) -> bool {
        self.allowed.contains(&surface)
    }
}

/// Conditions under which focus requests are rejected
#[derive(Debug, Clone, Default)]
pub struct FocusGuards {
    pub session_locked: bool,
    /// Surfaces of the lock screen, the only ones focusable while locked
    pub lock_surfaces: HashSet<SurfaceId>,
    /// Top-layer surface holding exclusive keyboard interactivity
    pub exclusive_layer: Option<SurfaceId>,
    pub keyboard_grab: Option<KeyboardGrab>,
}

impl FocusGuards {
    fn lock_rejects(&self, surface: Option<SurfaceId>) -> bool {
        self.session_locked && !surface.is_some_and(|s| self.lock_surfaces.contains(&s))
    }

    fn grab_rejects(&self, surface: Option<SurfaceId>) -> bool {
        match (&self.keyboard_grab, surface) {
            (Some(grab), Some(surface)) => !grab.accepts(surface),
            _ => false,
        }
    }
}

/// What to do about a fullscreen window on the target's workspace
enum FullscreenDecision {
    Proceed,
    Redirect(WindowId),
}

impl WeftState {
    /// Focus a window (or clear window focus with `None`).
    ///
    /// `surface` overrides the surface that receives keyboard focus; by
    /// default it is the window's main surface.
    pub fn focus_window(
        &mut self,
        window: Option<WindowId>,
        surface: Option<SurfaceId>,
        preserve_history: bool,
    ) {
        self.focus_window_with(window, surface, preserve_history, false);
    }

    /// [`focus_window`](Self::focus_window) with an explicit fullscreen
    /// cycle flag, which turns the cancel policy into promotion
    pub fn focus_window_with(
        &mut self,
        window: Option<WindowId>,
        surface: Option<SurfaceId>,
        preserve_history: bool,
        force_fullscreen_cycle: bool,
    ) {
        let window = window.filter(|id| match self.registry.window(*id) {
            Some(w) if w.mapped => true,
            Some(_) => {
                debug!("Focus target {id} is not mapped, clearing focus instead");
                false
            }
            None => false,
        });
        let target_surface = surface.or_else(|| {
            window
                .and_then(|id| self.registry.windows.get(id))
                .map(|w| w.surface)
        });

        if self.guards.lock_rejects(target_surface) {
            debug!("Focus rejected: session is locked");
            return;
        }
        if self.guards.exclusive_layer.is_some() {
            debug!("Focus rejected: an exclusive layer surface holds the keyboard");
            return;
        }
        if let Some(w) = window.and_then(|id| self.registry.windows.get(id)) {
            if w.refuses_focus() {
                debug!("Focus rejected: {} does not want focus", w.id);
                return;
            }
            if w.no_focus {
                debug!("Focus rejected: {} has no_focus", w.id);
                return;
            }
        }
        if self.guards.grab_rejects(target_surface) {
            debug!("Focus rejected: keyboard grab does not accept the surface");
            return;
        }

        if self.focus.window == window && self.focus.surface == target_surface {
            debug!("Focus unchanged");
            return;
        }

        let Some(id) = window else {
            self.clear_window_focus();
            return;
        };

        self.backends.layout.bring_to_top(&mut self.registry, id);

        self.repoint_pinned(id);

        let Some((ws_id, visible, is_special, owner)) = self.registry.windows.get(id).and_then(|w| {
            self.registry
                .workspace(w.workspace)
                .map(|ws| (ws.id, ws.visible, ws.is_special, ws.monitor))
        }) else {
            debug!("Focus target {id} has no workspace");
            return;
        };

        if !visible {
            if let Some(ws) = self.registry.workspace_mut(ws_id) {
                ws.last_focused_window = Some(id);
            }
            let monitor = if is_special { self.focus.monitor } else { owner };
            let Some(monitor) = monitor else {
                debug!("No monitor to show workspace {ws_id} on");
                return;
            };
            debug!("Focus target {id} is on hidden workspace {ws_id}, switching");
            self.change_workspace(monitor, ws_id, false, true, true);
            if self.registry.is_workspace_visible(ws_id) {
                self.focus_window_with(Some(id), surface, preserve_history, force_fullscreen_cycle);
            }
            return;
        }

        if let FullscreenDecision::Redirect(holder) =
            self.apply_fullscreen_policy(id, ws_id, force_fullscreen_cycle)
        {
            debug!("Focus redirected from {id} to fullscreen window {holder}");
            self.focus_window_with(Some(holder), None, preserve_history, false);
            return;
        }

        self.close_foreign_special(id, ws_id);

        let Some(target_surface) = target_surface else {
            return;
        };
        // closing the special workspace may already have refocused the target
        if self.focus.window == Some(id) && self.focus.surface == Some(target_surface) {
            return;
        }

        if let Some(prev) = self.focus.window.filter(|prev| *prev != id) {
            if self.registry.windows.contains(prev) {
                self.backends.activation.activate_window(prev, false);
            }
        }

        self.focus_surface(Some(target_surface), Some(id));
        self.focus.window = Some(id);
        self.backends.activation.activate_window(id, true);

        let (payload, monitor) = match self.registry.window_mut(id) {
            Some(w) => {
                w.urgent = false;
                (format!("{},{}", w.class, w.title), w.monitor)
            }
            None => return,
        };
        if let Some(ws) = self.registry.workspace_mut(ws_id) {
            ws.last_focused_window = Some(id);
        }

        info!("Focused window {id}");
        self.events.post("activewindow", payload);
        self.events.post("activewindowv2", format!("{:x}", id.get()));
        self.events.emit(Event::ActiveWindow(Some(id)));
        self.backends.layout.on_focus_change(Some(id));
        self.backends.input.recheck_idle_inhibitors();

        if !preserve_history {
            self.focus.promote(id);
        }
        if let Some(monitor) = monitor {
            self.focus_monitor(monitor);
        }
        if self.config.follow_mouse == 0 {
            self.backends.input.send_motion_to_focused();
        }
    }

    /// Move keyboard focus to a surface. `owner` is the window the surface
    /// belongs to, if any.
    pub fn focus_surface(&mut self, surface: Option<SurfaceId>, owner: Option<WindowId>) {
        if self.focus.surface == surface {
            return;
        }
        if self.guards.lock_rejects(surface) && surface.is_some() {
            debug!("Surface focus rejected: session is locked");
            return;
        }
        if self.guards.grab_rejects(surface) {
            debug!("Surface focus rejected by keyboard grab");
            return;
        }

        let old = self.focus.surface;
        if owner.is_none() {
            if let Some(old) = old {
                self.backends.activation.activate_surface(old, false);
            }
        }

        let Some(surface) = surface else {
            self.backends.input.set_keyboard_focus(None);
            self.events.post("activewindow", ",");
            self.events.post("activewindowv2", "");
            self.events.emit(Event::KeyboardFocus(None));
            self.focus.surface = None;
            if let Some(old) = old {
                self.focus.set_constraint_active(old, false);
            }
            return;
        };

        self.backends.input.set_keyboard_focus(Some(surface));
        self.backends.activation.activate_surface(surface, true);
        self.focus.surface = Some(surface);
        // a bare surface takes focus away from any window
        let displaced = match owner {
            Some(_) => None,
            None => self.focus.window.take(),
        };
        if let Some(prev) = displaced {
            if self.registry.windows.contains(prev) {
                self.backends.activation.activate_window(prev, false);
            }
            self.events.post("activewindow", ",");
            self.events.post("activewindowv2", "");
            self.events.emit(Event::ActiveWindow(None));
            self.backends.layout.on_focus_change(None);
        }
        self.events.emit(Event::KeyboardFocus(Some(surface)));

        if let Some(old) = old {
            self.focus.set_constraint_active(old, false);
        }
        self.focus.set_constraint_active(surface, true);
    }

    /// Make a monitor the focused one
    pub fn focus_monitor(&mut self, monitor: MonitorId) {
        if self.focus.monitor == Some(monitor) {
            return;
        }
        if self.is_unsafe() && monitor != MonitorId::FALLBACK {
            debug!("Not focusing monitor {monitor} while in the unsafe state");
            return;
        }
        let Some(mon) = self.registry.monitor(monitor) else {
            return;
        };
        let workspace_name = mon
            .active_workspace
            .and_then(|ws| self.registry.workspaces.get(ws))
            .map(|ws| ws.name.clone())
            .unwrap_or_default();
        let payload = format!("{},{}", mon.name, workspace_name);

        debug!("Focused monitor {monitor}");
        self.focus.monitor = Some(monitor);
        self.events.post("focusedmon", payload);
    }

    /// Mark a window urgent, unless it already has focus
    pub fn set_urgent(&mut self, window: WindowId) {
        if self.focus.window == Some(window) {
            return;
        }
        if let Some(w) = self.registry.window_mut(window) {
            w.urgent = true;
        }
    }

    pub fn focused_window(&self) -> Option<WindowId> {
        self.focus.window
    }

    pub fn focused_surface(&self) -> Option<SurfaceId> {
        self.focus.surface
    }

    pub fn focused_monitor(&self) -> Option<MonitorId> {
        self.focus.monitor
    }

    pub fn focus_history(&self) -> &[WindowId] {
        self.focus.history()
    }

    fn clear_window_focus(&mut self) {
        if let Some(prev) = self.focus.window.take() {
            if self.registry.windows.contains(prev) {
                self.backends.activation.activate_window(prev, false);
            }
        }
        self.backends.input.set_keyboard_focus(None);
        self.events.post("activewindow", ",");
        self.events.post("activewindowv2", "");
        self.events.emit(Event::ActiveWindow(None));
        self.backends.layout.on_focus_change(None);

        if let Some(old) = self.focus.surface.take() {
            self.focus.set_constraint_active(old, false);
        }
        self.backends.input.recheck_idle_inhibitors();
    }

    /// Pinned windows follow the focused monitor's active workspace
    fn repoint_pinned(&mut self, window: WindowId) {
        let Some(monitor) = self.focus.monitor else {
            return;
        };
        let Some(active) = self
            .registry
            .monitor(monitor)
            .and_then(|mon| mon.active_workspace)
        else {
            return;
        };
        if let Some(w) = self.registry.window_mut(window) {
            if w.pinned && w.workspace != active {
                debug!("Re-pointing pinned {} to workspace {active}", w.id);
                w.workspace = active;
                w.monitor = Some(monitor);
            }
        }
    }

    fn apply_fullscreen_policy(
        &mut self,
        target: WindowId,
        workspace: WorkspaceId,
        force_cycle: bool,
    ) -> FullscreenDecision {
        let has_fullscreen = self
            .registry
            .workspace(workspace)
            .is_some_and(|ws| ws.has_fullscreen_window);
        if !has_fullscreen {
            return FullscreenDecision::Proceed;
        }
        let Some(holder) = self
            .backends
            .layout
            .fullscreen_window(&self.registry, workspace)
            .filter(|holder| *holder != target)
        else {
            return FullscreenDecision::Proceed;
        };
        let Some((floating, over_fullscreen)) = self
            .registry
            .windows
            .get(target)
            .map(|w| (w.floating, w.created_over_fullscreen))
        else {
            return FullscreenDecision::Proceed;
        };

        if floating && over_fullscreen {
            return FullscreenDecision::Proceed;
        }

        let policy = self.config.on_focus_under_fullscreen;
        if policy == FocusUnderFullscreen::Redirect {
            return FullscreenDecision::Redirect(holder);
        }

        if floating {
            if let Some(w) = self.registry.window_mut(target) {
                w.created_over_fullscreen = true;
            }
            return FullscreenDecision::Proceed;
        }

        let promote = policy == FocusUnderFullscreen::Promote || force_cycle;
        if promote {
            let mode = self
                .registry
                .workspace(workspace)
                .map(|ws| ws.fullscreen_mode)
                .unwrap_or(FullscreenMode::FULLSCREEN);
            debug!("Promoting {target} into fullscreen mode {mode:?}");
            self.set_fullscreen_internal(holder, FullscreenMode::NONE);
            self.set_fullscreen_internal(target, mode);
        } else {
            debug!("Cancelling fullscreen of {holder}");
            self.set_fullscreen_internal(holder, FullscreenMode::NONE);
        }
        FullscreenDecision::Proceed
    }

    /// Close an open special workspace that the target is not on
    fn close_foreign_special(&mut self, target: WindowId, workspace: WorkspaceId) {
        if self.config.special_fallthrough {
            return;
        }
        let Some(w) = self.registry.windows.get(target) else {
            return;
        };
        if w.pinned {
            return;
        }
        let Some(monitor) = w.monitor else {
            return;
        };
        let open_special = self
            .registry
            .monitor(monitor)
            .and_then(|mon| mon.active_special_workspace);
        if open_special.is_some_and(|special| special != workspace) {
            debug!("Closing special workspace on {monitor} to focus {target}");
            self.set_special_workspace(monitor, None);
        }
    }
}

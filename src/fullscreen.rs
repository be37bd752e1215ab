//! Fullscreen state machine
//!
//! Every window carries two modes: the internal one, which the layout acts
//! on, and the one reported to the client. A client-only change never touches
//! layout. At most one window per workspace holds an internal mode other than
//! [`FullscreenMode::NONE`]; entering fullscreen evicts the previous holder.

use tracing::{debug, info};

use crate::config::DirectScanout;
use crate::event::Event;
use crate::state::WeftState;
use crate::window::{ContentType, FullscreenMode, FullscreenState, WindowId};
use crate::workspace::WorkspaceId;

impl WeftState {
    /// Apply a fullscreen state pair to a window
    pub fn set_fullscreen_state(&mut self, id: WindowId, desired: FullscreenState) {
        let Some(window) = self.registry.window(id) else {
            return;
        };
        if !window.mapped {
            debug!("Ignoring fullscreen request for unmapped {id}");
            return;
        }
        if self.is_unsafe() {
            debug!("Ignoring fullscreen request for {id}: no output");
            return;
        }

        let desired = FullscreenState::new(
            FullscreenMode::from_raw_clamped(desired.internal.bits()),
            FullscreenMode::from_raw_clamped(desired.client.bits()),
        );
        let workspace = window.workspace;
        let entering = desired.effective() != FullscreenMode::NONE;

        if self.config.allow_pin_fullscreen && entering {
            if let Some(w) = self.registry.window_mut(id) {
                if w.pinned && !w.is_fullscreen() && !w.pin_fullscreened {
                    debug!("Suspending pin of {id} while fullscreen");
                    w.pinned = false;
                    w.pin_fullscreened = true;
                }
            }
        }

        if entering {
            let other = self
                .registry
                .fullscreen_window(workspace)
                .filter(|holder| *holder != id);
            if let Some(holder) = other {
                debug!("Evicting fullscreen holder {holder} on workspace {workspace}");
                self.set_fullscreen_internal(holder, FullscreenMode::NONE);
            }
        }

        let Some(window) = self.registry.window_mut(id) else {
            return;
        };
        let current = window.fullscreen.effective();
        let target = desired.effective();
        let change_internal = !window.pinned && current != target;

        if self.config.allow_pin_fullscreen
            && window.pin_fullscreened
            && window.is_fullscreen()
            && !window.pinned
            && desired.internal == FullscreenMode::NONE
        {
            debug!("Restoring pin of {id}");
            window.pinned = true;
            window.pin_fullscreened = false;
        }

        self.backends
            .activation
            .set_client_fullscreen(id, desired.client.contains(FullscreenMode::FULLSCREEN));

        if !change_internal {
            if let Some(w) = self.registry.window_mut(id) {
                w.fullscreen.client = desired.client;
            }
            self.backends.layout.request_render_hints(id);
            return;
        }

        self.backends
            .layout
            .fullscreen_request(&mut self.registry, id, current, target);

        let Some(window) = self.registry.window_mut(id) else {
            return;
        };
        window.fullscreen = desired;
        let (monitor, surface, content_type) = (window.monitor, window.surface, window.content_type);

        if let Some(ws) = self.registry.workspace_mut(workspace) {
            ws.has_fullscreen_window = target != FullscreenMode::NONE;
            ws.fullscreen_mode = target;
        }

        info!("Window {id} fullscreen {current:?} -> {target:?}");
        let fullscreen = target != FullscreenMode::NONE;
        self.events
            .post("fullscreen", if fullscreen { "1" } else { "0" });
        self.events.emit(Event::Fullscreen {
            window: id,
            fullscreen,
        });

        self.backends.layout.request_render_hints(id);
        if let Some(monitor) = monitor {
            self.backends
                .layout
                .recalculate_monitor(&mut self.registry, monitor);
        }

        for w in self.registry.windows.iter_mut() {
            if w.workspace == workspace
                && w.id != id
                && !w.is_fullscreen()
                && !w.fading_out
                && !w.pinned
            {
                w.created_over_fullscreen = false;
            }
        }
        self.update_fullscreen_fade(workspace);

        self.backends.input.recheck_idle_inhibitors();

        if let Some(monitor) = monitor {
            let scanout = match self.config.direct_scanout {
                DirectScanout::Off => false,
                DirectScanout::On => true,
                DirectScanout::GamesOnly => content_type == ContentType::Game,
            };
            if scanout {
                self.backends
                    .renderer
                    .set_scanout(surface, fullscreen.then_some(monitor));
            }
            self.backends.renderer.ensure_vrr(monitor);
        }

        #[cfg(debug_assertions)]
        self.check_consistency();
    }

    /// Forget a window's fullscreen state without going through layout.
    /// Used when the window goes away while no output is connected, where
    /// [`WeftState::set_fullscreen_state`] refuses to act.
    pub(crate) fn drop_fullscreen(&mut self, id: WindowId) {
        let Some(window) = self.registry.window_mut(id) else {
            return;
        };
        let workspace = window.workspace;
        window.fullscreen = FullscreenState::default();
        if window.pin_fullscreened {
            window.pinned = true;
            window.pin_fullscreened = false;
        }
        if self.registry.fullscreen_window(workspace).is_none() {
            if let Some(ws) = self.registry.workspace_mut(workspace) {
                ws.has_fullscreen_window = false;
                ws.fullscreen_mode = FullscreenMode::NONE;
            }
        }
        debug!("Dropped fullscreen state of {id} on workspace {workspace}");
        self.backends.activation.set_client_fullscreen(id, false);
    }

    /// Set the internal mode, mirroring it to the client
    pub fn set_fullscreen_internal(&mut self, id: WindowId, mode: FullscreenMode) {
        self.set_fullscreen_state(id, FullscreenState::both(mode));
    }

    /// Change only the mode reported to the client
    pub fn set_fullscreen_client(&mut self, id: WindowId, mode: FullscreenMode) {
        let Some(internal) = self.registry.window(id).map(|w| w.fullscreen.internal) else {
            return;
        };
        self.set_fullscreen_state(id, FullscreenState::new(internal, mode));
    }

    /// Enter `mode`, or leave it if it is already the effective mode
    pub fn toggle_fullscreen(&mut self, id: WindowId, mode: FullscreenMode) {
        let Some(current) = self.registry.window(id).map(|w| w.effective_fullscreen()) else {
            return;
        };
        let next = if current == mode.effective() {
            FullscreenMode::NONE
        } else {
            mode
        };
        self.set_fullscreen_internal(id, next);
    }

    /// Recompute window and top-layer opacity for a workspace's fullscreen
    /// state
    pub fn update_fullscreen_fade(&mut self, workspace: WorkspaceId) {
        let Some(ws) = self.registry.workspace(workspace) else {
            return;
        };
        let (fullscreen, mode, monitor) = (ws.has_fullscreen_window, ws.fullscreen_mode, ws.monitor);

        for w in self.registry.windows.iter_mut() {
            if w.workspace != workspace || w.fading_out || w.pinned || w.is_fullscreen() {
                continue;
            }
            w.fullscreen_alpha = if !fullscreen || w.created_over_fullscreen {
                1.0
            } else {
                0.0
            };
        }

        let Some(mon) = monitor.and_then(|mon| self.registry.monitor_mut(mon)) else {
            return;
        };
        if !mon.shows(workspace) {
            return;
        }
        let layer_alpha = if fullscreen && mode == FullscreenMode::FULLSCREEN {
            0.0
        } else {
            1.0
        };
        for layer in mon.top_layers.iter_mut().filter(|ls| !ls.fading_out) {
            layer.alpha = layer_alpha;
        }
    }
}

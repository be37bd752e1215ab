//! Workspace to monitor binding
//!
//! Switching the workspace a monitor shows, opening special workspaces,
//! moving and swapping workspaces between monitors, monitor hot-plug and the
//! unsafe state the core runs in while no real output is connected.

use tracing::{debug, info, warn};

use crate::event::Event;
use crate::geometry::{Point, Rectangle};
use crate::monitor::{Monitor, MonitorId, MonitorSpec};
use crate::state::WeftState;
use crate::window::WindowId;
use crate::workspace::WorkspaceId;

/// Where a window goes when its workspace changes monitor
#[derive(Debug, Clone, Copy)]
struct Relocation {
    monitor: MonitorId,
    /// Origin of the monitor the windows come from, if there was one
    from: Option<Point>,
    to: Rectangle,
}

impl WeftState {
    /// Show `workspace` on `monitor`.
    ///
    /// `internal` switches are bookkeeping only: no refocus, no cursor
    /// movement and no notifications.
    pub fn change_workspace(
        &mut self,
        monitor: MonitorId,
        workspace: WorkspaceId,
        internal: bool,
        no_mouse_move: bool,
        no_focus: bool,
    ) {
        let Some(ws) = self.registry.workspace(workspace) else {
            return;
        };
        if ws.is_special {
            self.set_special_workspace(monitor, Some(workspace));
            return;
        }
        if ws.monitor != Some(monitor) {
            warn!(
                "Workspace {workspace} lives on {:?}, not on monitor {monitor}",
                ws.monitor
            );
            return;
        }
        let Some(mon) = self.registry.monitor(monitor) else {
            return;
        };
        let old = mon.active_workspace;
        if old == Some(workspace) {
            return;
        }

        debug!("Monitor {monitor} switching {old:?} -> {workspace}");
        let previous = old.and_then(|old| self.registry.workspace_mut(old)).map(|prev| {
            prev.visible = false;
            prev.start_animation(false);
            prev.clone()
        });
        if let Some(mon) = self.registry.monitor_mut(monitor) {
            mon.active_workspace = Some(workspace);
        }
        if let Some(ws) = self.registry.workspace_mut(workspace) {
            ws.visible = true;
            ws.start_animation(true);
        }

        // pinned windows follow the monitor
        if let Some(old) = old {
            for w in self.registry.windows.iter_mut() {
                if w.pinned && w.workspace == old && w.monitor == Some(monitor) {
                    w.workspace = workspace;
                }
            }
        }

        self.backends.renderer.damage_monitor(monitor);
        self.backends
            .layout
            .recalculate_monitor(&mut self.registry, monitor);
        self.update_fullscreen_fade(workspace);

        if internal {
            return;
        }

        if let (Some(previous), Some(ws)) = (previous, self.registry.workspace_mut(workspace)) {
            ws.remember_previous(&previous);
        }

        let special_open = self
            .focus
            .monitor
            .and_then(|mon| self.registry.monitor(mon))
            .is_some_and(|mon| mon.active_special_workspace.is_some());
        let focused_pinned_here = self
            .focus
            .window
            .and_then(|id| self.registry.windows.get(id))
            .is_some_and(|w| w.pinned && w.monitor == Some(monitor));

        if !no_focus && !special_open && !focused_pinned_here {
            let target = self.workspace_focus_target(workspace);
            self.focus_window(target, None, false);
        }

        if !no_mouse_move {
            let on_monitor = self
                .registry
                .monitor(monitor)
                .map(|mon| (mon.logical_box(), mon.middle()));
            if let Some((bbox, middle)) = on_monitor {
                if !bbox.contains(self.backends.input.pointer_position()) {
                    self.warp_unless_disabled(middle);
                }
            }
            self.backends.input.send_motion_to_focused();
        }

        if let Some(ws) = self.registry.workspace(workspace) {
            let (name, payload) = (ws.name.clone(), format!("{},{}", ws.id, ws.name));
            self.events.post("workspace", name);
            self.events.post("workspacev2", payload);
            self.events.emit(Event::Workspace(workspace));
        }
    }

    /// Window to focus when a workspace comes into view: its fullscreen
    /// window, its last focused one, what is under the cursor, or its first
    fn workspace_focus_target(&self, workspace: WorkspaceId) -> Option<WindowId> {
        let ws = self.registry.workspace(workspace)?;
        if ws.has_fullscreen_window {
            if let Some(fs) = self
                .backends
                .layout
                .fullscreen_window(&self.registry, workspace)
            {
                return Some(fs);
            }
        }
        let last = ws.last_focused_window.filter(|id| {
            self.registry
                .windows
                .get(*id)
                .is_some_and(|w| w.workspace == workspace && w.is_visible_candidate())
        });
        if last.is_some() {
            return last;
        }
        if self.config.follow_mouse == 1 {
            if let Some(under) = self.window_under_cursor() {
                return Some(under);
            }
        }
        self.registry.first_window(workspace)
    }

    /// Switch the focused monitor to a workspace selector, creating the
    /// workspace when needed. Workspaces owned by another monitor are shown
    /// there and that monitor gains focus.
    pub fn switch_workspace(&mut self, selector: &str) {
        let Some(monitor) = self.focus.monitor else {
            return;
        };
        let Some(workspace) = self
            .registry
            .get_or_create_workspace(&self.config, selector, monitor)
        else {
            return;
        };
        let Some(ws) = self.registry.workspace(workspace) else {
            return;
        };

        if ws.is_special {
            self.toggle_special_workspace(selector);
            return;
        }
        let owner = ws.monitor.unwrap_or(monitor);
        if owner != monitor {
            self.focus_monitor(owner);
        }
        self.change_workspace(owner, workspace, false, false, false);
    }

    /// Open a special workspace on the focused monitor, or close it if it is
    /// already open there
    pub fn toggle_special_workspace(&mut self, selector: &str) {
        let Some(monitor) = self.focus.monitor else {
            return;
        };
        let Some(workspace) = self
            .registry
            .get_or_create_workspace(&self.config, selector, monitor)
        else {
            return;
        };
        if !workspace.is_special() {
            warn!("'{selector}' is not a special workspace");
            return;
        }
        let open = self
            .registry
            .monitor(monitor)
            .and_then(|mon| mon.active_special_workspace);
        if open == Some(workspace) {
            self.set_special_workspace(monitor, None);
        } else {
            self.set_special_workspace(monitor, Some(workspace));
        }
    }

    /// Open (`Some`) or close (`None`) the special workspace on a monitor
    pub fn set_special_workspace(&mut self, monitor: MonitorId, workspace: Option<WorkspaceId>) {
        let Some(mon) = self.registry.monitor(monitor) else {
            return;
        };
        let current = mon.active_special_workspace;
        if current == workspace {
            return;
        }
        let monitor_name = mon.name.clone();

        let Some(workspace) = workspace else {
            if let Some(ws) = current.and_then(|cur| self.registry.workspace_mut(cur)) {
                ws.visible = false;
                ws.start_animation(false);
            }
            if let Some(mon) = self.registry.monitor_mut(monitor) {
                mon.active_special_workspace = None;
            }
            debug!("Closed special workspace on {monitor_name}");
            self.backends
                .layout
                .recalculate_monitor(&mut self.registry, monitor);

            let focused_pinned_here = self
                .focus
                .window
                .and_then(|id| self.registry.windows.get(id))
                .is_some_and(|w| w.pinned && w.monitor == Some(monitor));
            if !focused_pinned_here {
                let target = self
                    .registry
                    .monitor(monitor)
                    .and_then(|mon| mon.active_workspace)
                    .and_then(|ws| self.registry.workspaces.last_focused_window(ws))
                    .or_else(|| self.window_under_cursor());
                self.focus_window(target, None, false);
            }

            self.events
                .post("activespecial", format!(",{monitor_name}"));
            self.events.emit(Event::ActiveSpecial {
                workspace: None,
                monitor,
            });
            self.backends.renderer.damage_monitor(monitor);
            return;
        };

        let Some(ws) = self.registry.workspace(workspace) else {
            return;
        };
        if !ws.is_special {
            warn!("Workspace {workspace} is not special");
            return;
        }
        let owner = ws.monitor;

        if let Some(owner) = owner.filter(|owner| *owner != monitor) {
            let open_there = self
                .registry
                .monitor(owner)
                .is_some_and(|mon| mon.active_special_workspace == Some(workspace));
            if open_there {
                self.set_special_workspace(owner, None);
            }
        }

        if let Some(ws) = current.and_then(|cur| self.registry.workspace_mut(cur)) {
            ws.visible = false;
        }

        if owner != Some(monitor) {
            if let Some(relocation) = self.relocation(owner, monitor) {
                if let Some(ws) = self.registry.workspace_mut(workspace) {
                    ws.monitor = Some(monitor);
                }
                let members = self.registry.windows.ids_in_workspace(workspace);
                self.relocate_windows(&members, relocation);
            }
        }

        if let Some(mon) = self.registry.monitor_mut(monitor) {
            mon.active_special_workspace = Some(workspace);
        }
        let name = match self.registry.workspace_mut(workspace) {
            Some(ws) => {
                ws.visible = true;
                ws.start_animation(true);
                ws.name.clone()
            }
            None => return,
        };
        debug!("Opened special workspace {name} on {monitor_name}");
        self.backends
            .layout
            .recalculate_monitor(&mut self.registry, monitor);
        self.update_fullscreen_fade(workspace);

        let target = self
            .registry
            .workspaces
            .last_focused_window(workspace)
            .filter(|id| {
                self.registry
                    .windows
                    .get(*id)
                    .is_some_and(|w| w.workspace == workspace)
            })
            .or_else(|| self.registry.first_window(workspace))
            .or_else(|| self.window_under_cursor());
        self.focus_window(target, None, false);

        self.events
            .post("activespecial", format!("{name},{monitor_name}"));
        self.events.emit(Event::ActiveSpecial {
            workspace: Some(workspace),
            monitor,
        });
        self.backends.renderer.damage_monitor(monitor);
    }

    /// Move a workspace, with its windows, to another monitor.
    ///
    /// If it was the active workspace of its old monitor, that monitor first
    /// switches to a replacement: another workspace it owns, or a freshly
    /// created one.
    pub fn move_workspace_to_monitor(&mut self, workspace: WorkspaceId, target: MonitorId) {
        let Some(ws) = self.registry.workspace(workspace) else {
            return;
        };
        if !self.registry.monitors.contains(target) {
            debug!("Cannot move workspace {workspace} to missing monitor {target}");
            return;
        }
        let old_monitor = ws.monitor.filter(|old| self.registry.monitor(*old).is_some());
        if old_monitor == Some(target) {
            debug!("Workspace {workspace} already on monitor {target}");
            return;
        }

        let switching_is_active = old_monitor
            .and_then(|old| self.registry.monitor(old))
            .is_some_and(|mon| mon.active_workspace == Some(workspace));

        // an open special workspace closes on its old monitor and reopens on
        // the target when the old monitor had focus
        let special_open = old_monitor
            .and_then(|old| self.registry.monitor(old))
            .is_some_and(|mon| mon.active_special_workspace == Some(workspace));
        let reopen_special =
            special_open && old_monitor.is_some() && self.focus.monitor == old_monitor;
        if let Some(old) = old_monitor.filter(|_| special_open) {
            debug!("Closing special workspace {workspace} on monitor {old} before moving it");
            self.set_special_workspace(old, None);
        }

        let mut replacement = workspace;
        if let Some(old) = old_monitor.filter(|_| switching_is_active) {
            let existing = self
                .registry
                .workspaces
                .on_monitor(old)
                .find(|other| other.id != workspace && !other.is_special)
                .map(|other| other.id);
            replacement = match existing {
                Some(existing) => existing,
                None => {
                    let id = self.registry.find_available_workspace_id(&self.config, old);
                    match self
                        .registry
                        .create_workspace(&self.config, id, old, None, true)
                    {
                        Some(id) => id,
                        None => {
                            warn!("No replacement workspace for monitor {old}, not moving");
                            return;
                        }
                    }
                }
            };
            debug!("Monitor {old} switches to replacement workspace {replacement}");
            self.change_workspace(old, replacement, false, true, true);
        }

        let Some(relocation) = self.relocation(old_monitor, target) else {
            return;
        };
        if let Some(ws) = self.registry.workspace_mut(workspace) {
            ws.monitor = Some(target);
        }

        let members = self.registry.windows.ids_in_workspace(workspace);
        let (pinned, others): (Vec<WindowId>, Vec<WindowId>) = members
            .into_iter()
            .partition(|id| self.registry.windows.get(*id).is_some_and(|w| w.pinned));
        for id in pinned {
            if let Some(w) = self.registry.window_mut(id) {
                w.workspace = replacement;
            }
        }
        self.relocate_windows(&others, relocation);

        let old_was_focused = old_monitor.is_some() && self.focus.monitor == old_monitor;
        if switching_is_active && old_was_focused {
            let target_state = self
                .registry
                .monitor(target)
                .map(|mon| (mon.active_workspace, mon.active_special_workspace));
            if let Some((previous, special)) = target_state {
                if let Some(prev) = previous.and_then(|prev| self.registry.workspace_mut(prev)) {
                    prev.visible = false;
                }
                if self.config.hide_special_on_workspace_change && special.is_some() {
                    self.set_special_workspace(target, None);
                }
            }

            self.focus_monitor(target);
            if let Some(mon) = self.registry.monitor_mut(target) {
                mon.active_workspace = Some(workspace);
            }
            if let Some(ws) = self.registry.workspace_mut(workspace) {
                ws.visible = true;
                ws.start_animation(true);
            }
            self.backends
                .layout
                .recalculate_monitor(&mut self.registry, target);
            self.warp_unless_disabled(relocation.to.center());
            self.backends.input.send_motion_to_focused();
        }

        if reopen_special {
            self.focus_monitor(target);
            self.set_special_workspace(target, Some(workspace));
        }

        if let Some(old) = old_monitor {
            self.backends
                .layout
                .recalculate_monitor(&mut self.registry, old);
        }
        self.update_fullscreen_fade(workspace);
        if replacement != workspace {
            self.update_fullscreen_fade(replacement);
        }

        let Some(ws) = self.registry.workspace(workspace) else {
            return;
        };
        let monitor_name = self
            .registry
            .monitor(target)
            .map(|mon| mon.name.clone())
            .unwrap_or_default();
        info!("Moved workspace {} to monitor {monitor_name}", ws.name);
        let (plain, v2) = (
            format!("{},{monitor_name}", ws.name),
            format!("{},{},{monitor_name}", ws.id, ws.name),
        );
        self.events.post("moveworkspace", plain);
        self.events.post("moveworkspacev2", v2);
        self.events.emit(Event::MoveWorkspace {
            workspace,
            monitor: target,
        });

        #[cfg(debug_assertions)]
        self.check_consistency();
    }

    /// Exchange the active workspaces of two monitors
    pub fn swap_active_workspaces(&mut self, a: MonitorId, b: MonitorId) {
        if a == b {
            return;
        }
        let (Some(mon_a), Some(mon_b)) = (self.registry.monitor(a), self.registry.monitor(b)) else {
            return;
        };
        let (Some(ws_a), Some(ws_b)) = (mon_a.active_workspace, mon_b.active_workspace) else {
            debug!("Both monitors need an active workspace to swap");
            return;
        };
        let (box_a, box_b) = (mon_a.logical_box(), mon_b.logical_box());
        let (name_a, name_b) = (mon_a.name.clone(), mon_b.name.clone());

        // membership is captured before anything moves
        let members_a = self.registry.windows.ids_in_workspace(ws_a);
        let members_b = self.registry.windows.ids_in_workspace(ws_b);
        self.swap_members(&members_a, ws_b, Relocation {
            monitor: b,
            from: Some(box_a.loc),
            to: box_b,
        });
        self.swap_members(&members_b, ws_a, Relocation {
            monitor: a,
            from: Some(box_b.loc),
            to: box_a,
        });

        if let Some(mon) = self.registry.monitor_mut(a) {
            mon.active_workspace = Some(ws_b);
        }
        if let Some(mon) = self.registry.monitor_mut(b) {
            mon.active_workspace = Some(ws_a);
        }
        let snapshot_a = self.registry.workspace(ws_a).cloned();
        let snapshot_b = self.registry.workspace(ws_b).cloned();
        if let Some(ws) = self.registry.workspace_mut(ws_a) {
            ws.monitor = Some(b);
            if let Some(other) = &snapshot_b {
                ws.remember_previous(other);
            }
        }
        if let Some(ws) = self.registry.workspace_mut(ws_b) {
            ws.monitor = Some(a);
            if let Some(other) = &snapshot_a {
                ws.remember_previous(other);
            }
        }

        self.backends.layout.recalculate_monitor(&mut self.registry, a);
        self.backends.layout.recalculate_monitor(&mut self.registry, b);
        self.update_fullscreen_fade(ws_a);
        self.update_fullscreen_fade(ws_b);

        let focused_side = match self.focus.monitor {
            Some(m) if m == a => Some(ws_b),
            Some(m) if m == b => Some(ws_a),
            _ => None,
        };
        if let Some(now_shown) = focused_side {
            let target = self
                .registry
                .workspaces
                .last_focused_window(now_shown)
                .or_else(|| self.window_under_cursor());
            self.focus_window(target, None, false);

            if let Some(ws) = self.registry.workspace(now_shown) {
                let (name, payload) = (ws.name.clone(), format!("{},{}", ws.id, ws.name));
                self.events.post("workspace", name);
                self.events.post("workspacev2", payload);
                self.events.emit(Event::Workspace(now_shown));
            }
        }

        for (workspace, monitor, monitor_name) in [(ws_a, b, &name_b), (ws_b, a, &name_a)] {
            if let Some(ws) = self.registry.workspace(workspace) {
                let (plain, v2) = (
                    format!("{},{monitor_name}", ws.name),
                    format!("{},{},{monitor_name}", ws.id, ws.name),
                );
                self.events.post("moveworkspace", plain);
                self.events.post("moveworkspacev2", v2);
                self.events.emit(Event::MoveWorkspace { workspace, monitor });
            }
        }
        info!("Swapped workspaces {ws_a} and {ws_b} between {name_a} and {name_b}");

        #[cfg(debug_assertions)]
        self.check_consistency();
    }

    /// Pinned members swap workspace, the rest follow their workspace
    fn swap_members(&mut self, members: &[WindowId], other: WorkspaceId, relocation: Relocation) {
        let (pinned, others): (Vec<WindowId>, Vec<WindowId>) = members
            .iter()
            .copied()
            .partition(|id| self.registry.windows.get(*id).is_some_and(|w| w.pinned));
        for id in pinned {
            if let Some(w) = self.registry.window_mut(id) {
                w.workspace = other;
            }
        }
        self.relocate_windows(&others, relocation);
    }

    fn relocation(&self, from: Option<MonitorId>, to: MonitorId) -> Option<Relocation> {
        let to_box = self.registry.monitor(to)?.logical_box();
        let from = from
            .and_then(|from| self.registry.monitor(from))
            .map(|mon| mon.position);
        Some(Relocation {
            monitor: to,
            from,
            to: to_box,
        })
    }

    /// Re-home windows onto a monitor, translating floating windows between
    /// monitor spaces and resizing fullscreen ones to the new monitor
    fn relocate_windows(&mut self, windows: &[WindowId], relocation: Relocation) {
        for id in windows {
            let Some(w) = self.registry.window_mut(*id) else {
                continue;
            };
            w.monitor = Some(relocation.monitor);
            if w.is_fullscreen() {
                w.geometry = relocation.to;
                continue;
            }
            if !w.floating {
                continue;
            }
            match relocation.from {
                Some(from) => {
                    w.geometry = w.geometry.translate(relocation.to.loc - from);
                }
                None => {
                    let size = relocation.to.size;
                    if !size.is_empty() {
                        w.geometry.loc = Point::new(
                            relocation.to.loc.x + w.geometry.loc.x.rem_euclid(size.w),
                            relocation.to.loc.y + w.geometry.loc.y.rem_euclid(size.h),
                        );
                    }
                }
            }
        }
    }

    /// Lay monitors out and notify the layout about the new geometry
    pub fn arrange_monitors(&mut self) {
        self.registry
            .monitors
            .arrange(self.config.xwayland_force_zero_scaling);
        for monitor in self.registry.monitors.ids() {
            self.backends
                .layout
                .recalculate_monitor(&mut self.registry, monitor);
            self.backends.renderer.damage_monitor(monitor);
        }
    }

    /// Bring up a newly connected output and return its id
    pub fn connect_monitor(&mut self, spec: &MonitorSpec) -> Option<MonitorId> {
        if self.registry.monitors.by_name(&spec.name).is_some() {
            warn!("Monitor {} is already connected", spec.name);
            return None;
        }

        let id = self.registry.monitors.next_monitor_id(&spec.name);
        let mut monitor = Monitor::new(id, spec);
        if let Some(rule) = self.config.monitor_rule(&spec.name) {
            if rule.position.is_some() {
                monitor.placement.position = rule.position;
            }
            monitor.placement.auto_direction = rule.auto_direction;
            if let Some(scale) = rule.scale.filter(|scale| *scale > 0.0) {
                monitor.scale = scale;
            }
        }
        let name = monitor.name.clone();
        self.registry.monitors.add(monitor);
        self.arrange_monitors();

        if self.unsafe_state {
            self.adopt_workspaces(MonitorId::FALLBACK, id);
            self.leave_unsafe_state();
        }

        let has_active = self
            .registry
            .monitor(id)
            .is_some_and(|mon| mon.active_workspace.is_some());
        if !has_active {
            self.assign_default_workspace(id);
        }

        let restore: Vec<WorkspaceId> = self
            .registry
            .workspaces
            .iter()
            .filter(|ws| ws.last_monitor_name.as_deref() == Some(name.as_str()))
            .map(|ws| ws.id)
            .collect();
        for workspace in restore {
            let elsewhere = self
                .registry
                .workspace(workspace)
                .is_some_and(|ws| ws.monitor != Some(id));
            if elsewhere {
                debug!("Restoring workspace {workspace} to {name}");
                self.move_workspace_to_monitor(workspace, id);
            }
            if let Some(ws) = self.registry.workspace_mut(workspace) {
                ws.last_monitor_name = None;
            }
        }

        let focus_valid = self
            .focus
            .monitor
            .is_some_and(|mon| self.registry.monitors.contains(mon));
        if !focus_valid {
            self.focus.monitor = None;
            self.focus_monitor(id);
        }

        info!("Monitor {name} connected as {id}");
        self.events.post("monitoradded", name);
        self.events.emit(Event::MonitorAdded(id));

        #[cfg(debug_assertions)]
        self.check_consistency();
        Some(id)
    }

    fn assign_default_workspace(&mut self, monitor: MonitorId) {
        let (workspace, name) = self
            .registry
            .default_workspace_for_monitor(&self.config, monitor);
        let existing_owner = self.registry.workspace(workspace).map(|ws| ws.monitor);
        match existing_owner {
            Some(owner) if owner != Some(monitor) => {
                self.move_workspace_to_monitor(workspace, monitor);
            }
            Some(_) => {}
            None => {
                if self
                    .registry
                    .create_workspace(&self.config, workspace, monitor, Some(&name), true)
                    .is_none()
                {
                    return;
                }
            }
        }
        let owned = self
            .registry
            .workspace(workspace)
            .is_some_and(|ws| ws.monitor == Some(monitor));
        if owned {
            self.change_workspace(monitor, workspace, true, true, true);
        } else {
            warn!("Default workspace {workspace} is bound elsewhere, monitor {monitor} shows nothing");
        }
    }

    /// Hand every workspace of `from` over to `to`, keeping what was shown
    fn adopt_workspaces(&mut self, from: MonitorId, to: MonitorId) {
        let workspaces: Vec<WorkspaceId> = self
            .registry
            .workspaces
            .on_monitor(from)
            .map(|ws| ws.id)
            .collect();
        let Some(relocation) = self.relocation(Some(from), to) else {
            return;
        };
        for workspace in &workspaces {
            if let Some(ws) = self.registry.workspace_mut(*workspace) {
                ws.monitor = Some(to);
            }
            let members = self.registry.windows.ids_in_workspace(*workspace);
            self.relocate_windows(&members, relocation);
        }

        let shown = self.registry.monitor_mut(from).map(|mon| {
            (
                mon.active_workspace.take(),
                mon.active_special_workspace.take(),
            )
        });
        if let (Some((active, special)), Some(mon)) = (shown, self.registry.monitor_mut(to)) {
            mon.active_workspace = active;
            mon.active_special_workspace = special;
        }
        debug!(
            "Monitor {to} adopted {} workspaces from {from}",
            workspaces.len()
        );
        self.backends.layout.recalculate_monitor(&mut self.registry, to);
    }

    /// Tear down a disconnected output, moving its workspaces to another
    /// monitor or, if none is left, to the fallback
    pub fn disconnect_monitor(&mut self, id: MonitorId) {
        if id == MonitorId::FALLBACK {
            warn!("The fallback monitor cannot be disconnected");
            return;
        }
        let Some(mon) = self.registry.monitor(id) else {
            return;
        };
        let name = mon.name.clone();
        let backup = self
            .registry
            .monitors
            .iter()
            .find(|other| other.id != id && !other.is_unsafe_fallback)
            .map(|other| other.id);
        info!("Monitor {name} disconnected, backup {backup:?}");

        let workspaces: Vec<WorkspaceId> = self
            .registry
            .workspaces
            .on_monitor(id)
            .map(|ws| ws.id)
            .collect();
        for workspace in &workspaces {
            if let Some(ws) = self.registry.workspace_mut(*workspace) {
                ws.last_monitor_name = Some(name.clone());
            }
        }

        match backup {
            Some(backup) => {
                if self.focus.monitor == Some(id) {
                    self.focus_monitor(backup);
                    if let Some(middle) = self.registry.monitor(backup).map(|mon| mon.middle()) {
                        self.warp_unless_disabled(middle);
                    }
                }
                // detached first so no replacement workspace gets created
                if let Some(mon) = self.registry.monitor_mut(id) {
                    mon.active_workspace = None;
                    mon.active_special_workspace = None;
                }
                for workspace in &workspaces {
                    if let Some(ws) = self.registry.workspace_mut(*workspace) {
                        ws.visible = false;
                    }
                    self.move_workspace_to_monitor(*workspace, backup);
                }

                let focus_hidden = self
                    .focus
                    .window
                    .and_then(|w| self.registry.windows.get(w))
                    .is_some_and(|w| !self.registry.is_workspace_visible(w.workspace));
                if focus_hidden {
                    let target = self
                        .registry
                        .monitor(backup)
                        .and_then(|mon| mon.active_workspace)
                        .and_then(|ws| self.workspace_focus_target(ws));
                    self.focus_window(target, None, false);
                }
            }
            None => {
                self.adopt_workspaces(id, MonitorId::FALLBACK);
                self.enter_unsafe_state();
            }
        }

        self.registry.monitors.remove(id);
        if self.focus.monitor == Some(id) {
            self.focus.monitor = None;
            self.focus_monitor(backup.unwrap_or(MonitorId::FALLBACK));
        }
        self.arrange_monitors();

        self.events.post("monitorremoved", name);
        self.events.emit(Event::MonitorRemoved(id));

        #[cfg(debug_assertions)]
        self.check_consistency();
    }

    /// Start running against the fallback monitor
    pub fn enter_unsafe_state(&mut self) {
        if self.unsafe_state {
            return;
        }
        info!("Entering unsafe state: no output available");
        self.unsafe_state = true;
        self.registry.monitors.fallback_mut().enabled = true;

        if self.registry.monitors.fallback().active_workspace.is_none() {
            let (workspace, name) = self
                .registry
                .default_workspace_for_monitor(&self.config, MonitorId::FALLBACK);
            let exists = self.registry.workspaces.contains(workspace);
            let created = exists
                || self
                    .registry
                    .create_workspace(&self.config, workspace, MonitorId::FALLBACK, Some(&name), true)
                    .is_some();
            if created {
                if let Some(ws) = self.registry.workspace_mut(workspace) {
                    ws.monitor = Some(MonitorId::FALLBACK);
                    ws.visible = true;
                }
                self.registry.monitors.fallback_mut().active_workspace = Some(workspace);
            }
        }

        self.focus_monitor(MonitorId::FALLBACK);
    }

    /// Stop running against the fallback monitor.
    ///
    /// # Panics
    ///
    /// If no real monitor is connected.
    pub fn leave_unsafe_state(&mut self) {
        if !self.unsafe_state {
            return;
        }
        assert!(
            self.registry.monitors.real_count() > 0,
            "cannot leave the unsafe state without a connected monitor"
        );
        info!("Leaving unsafe state");
        self.unsafe_state = false;
        let fallback = self.registry.monitors.fallback_mut();
        fallback.enabled = false;
        fallback.active_workspace = None;
        fallback.active_special_workspace = None;

        for monitor in self.registry.monitors.ids() {
            self.backends
                .renderer
                .schedule_frame(monitor, "left unsafe state");
        }
        if self.focus.monitor == Some(MonitorId::FALLBACK) {
            self.focus.monitor = None;
            if let Some(first) = self.registry.monitors.ids().first().copied() {
                self.focus_monitor(first);
            }
        }
    }
}

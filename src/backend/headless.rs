//! Headless collaborators that record every call
//!
//! All four implementations share one [`Journal`], so a test can assert on
//! the exact sequence of calls the core made across subsystems.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::trace;

use super::{AppActivation, Backends, InputManager, LayoutEngine, Renderer};
use crate::geometry::{Point, Rectangle};
use crate::monitor::MonitorId;
use crate::registry::Registry;
use crate::window::{FullscreenMode, SurfaceId, WindowId};
use crate::workspace::WorkspaceId;

/// One recorded collaborator call
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    BringToTop(WindowId),
    FocusChange(Option<WindowId>),
    FullscreenRequest {
        window: WindowId,
        from: FullscreenMode,
        to: FullscreenMode,
    },
    RecalculateMonitor(MonitorId),
    TilingCreated(WindowId),
    TilingRemoved(WindowId),
    RenderHints(WindowId),
    DamageMonitor(MonitorId),
    ScheduleFrame(MonitorId),
    SetScanout {
        surface: SurfaceId,
        monitor: Option<MonitorId>,
    },
    EnsureVrr(MonitorId),
    WarpCursor(Point),
    KeyboardFocus(Option<SurfaceId>),
    SendMotion,
    RecheckIdleInhibitors,
    ActivateWindow(WindowId, bool),
    ActivateSurface(SurfaceId, bool),
    ClientFullscreen(WindowId, bool),
    SendClose(WindowId),
}

/// Shared, append-only call log
#[derive(Debug, Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<BackendCall>>>);

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: BackendCall) {
        trace!("backend call {call:?}");
        self.0.borrow_mut().push(call);
    }

    /// Snapshot of every call so far
    pub fn calls(&self) -> Vec<BackendCall> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    pub fn contains(&self, call: &BackendCall) -> bool {
        self.0.borrow().iter().any(|c| c == call)
    }

    /// Number of recorded calls matching `pred`
    pub fn count(&self, pred: impl Fn(&BackendCall) -> bool) -> usize {
        self.0.borrow().iter().filter(|c| pred(c)).count()
    }
}

/// Layout stand-in: fullscreen windows cover their monitor, and the floating
/// geometry is restored on exit
#[derive(Debug, Default)]
pub struct HeadlessLayout {
    journal: Journal,
    saved_geometry: HashMap<WindowId, Rectangle>,
}

impl HeadlessLayout {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            saved_geometry: HashMap::new(),
        }
    }

    fn monitor_box(registry: &Registry, window: WindowId) -> Option<Rectangle> {
        let monitor = registry.windows.get(window)?.monitor?;
        registry.monitors.get(monitor).map(|mon| mon.logical_box())
    }
}

impl LayoutEngine for HeadlessLayout {
    fn bring_to_top(&mut self, registry: &mut Registry, window: WindowId) {
        self.journal.record(BackendCall::BringToTop(window));
        if registry.windows.get(window).is_some_and(|w| w.floating) {
            registry.windows.raise(window);
        }
    }

    fn on_focus_change(&mut self, window: Option<WindowId>) {
        self.journal.record(BackendCall::FocusChange(window));
    }

    fn fullscreen_request(
        &mut self,
        registry: &mut Registry,
        window: WindowId,
        from: FullscreenMode,
        to: FullscreenMode,
    ) {
        self.journal
            .record(BackendCall::FullscreenRequest { window, from, to });
        let monitor_box = Self::monitor_box(registry, window);
        let Some(w) = registry.windows.get_mut(window) else {
            return;
        };

        if to == FullscreenMode::NONE {
            if let Some(saved) = self.saved_geometry.remove(&window) {
                w.geometry = saved;
            }
            return;
        }
        if from == FullscreenMode::NONE {
            self.saved_geometry.insert(window, w.geometry);
        }
        if let Some(bbox) = monitor_box {
            w.geometry = bbox;
        }
    }

    fn fullscreen_window(&self, registry: &Registry, workspace: WorkspaceId) -> Option<WindowId> {
        registry.fullscreen_window(workspace)
    }

    fn recalculate_monitor(&mut self, registry: &mut Registry, monitor: MonitorId) {
        self.journal.record(BackendCall::RecalculateMonitor(monitor));
        let Some(mon) = registry.monitors.get(monitor) else {
            return;
        };
        let bbox = mon.logical_box();
        let shown: Vec<WorkspaceId> = [mon.active_workspace, mon.active_special_workspace]
            .into_iter()
            .flatten()
            .collect();

        for w in registry.windows.iter_mut() {
            if shown.contains(&w.workspace) && w.is_fullscreen() {
                w.geometry = bbox;
            }
        }
    }

    fn on_tiling_created(&mut self, _registry: &mut Registry, window: WindowId) {
        self.journal.record(BackendCall::TilingCreated(window));
    }

    fn on_tiling_removed(&mut self, _registry: &mut Registry, window: WindowId) {
        self.saved_geometry.remove(&window);
        self.journal.record(BackendCall::TilingRemoved(window));
    }

    fn request_render_hints(&mut self, window: WindowId) {
        self.journal.record(BackendCall::RenderHints(window));
    }

    fn is_reachable(&self, registry: &Registry, window: WindowId) -> bool {
        registry.windows.get(window).is_some_and(|w| !w.hidden)
    }
}

#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    journal: Journal,
}

impl Renderer for HeadlessRenderer {
    fn damage_monitor(&mut self, monitor: MonitorId) {
        self.journal.record(BackendCall::DamageMonitor(monitor));
    }

    fn schedule_frame(&mut self, monitor: MonitorId, reason: &str) {
        trace!("frame on {monitor} scheduled: {reason}");
        self.journal.record(BackendCall::ScheduleFrame(monitor));
    }

    fn set_scanout(&mut self, surface: SurfaceId, monitor: Option<MonitorId>) {
        self.journal
            .record(BackendCall::SetScanout { surface, monitor });
    }

    fn ensure_vrr(&mut self, monitor: MonitorId) {
        self.journal.record(BackendCall::EnsureVrr(monitor));
    }
}

/// Input stand-in; the pointer only moves when warped
#[derive(Debug, Default)]
pub struct HeadlessInput {
    journal: Journal,
    pointer: Point,
}

impl InputManager for HeadlessInput {
    fn pointer_position(&self) -> Point {
        self.pointer
    }

    fn warp_cursor(&mut self, position: Point) {
        self.pointer = position;
        self.journal.record(BackendCall::WarpCursor(position));
    }

    fn set_keyboard_focus(&mut self, surface: Option<SurfaceId>) {
        self.journal.record(BackendCall::KeyboardFocus(surface));
    }

    fn send_motion_to_focused(&mut self) {
        self.journal.record(BackendCall::SendMotion);
    }

    fn recheck_idle_inhibitors(&mut self) {
        self.journal.record(BackendCall::RecheckIdleInhibitors);
    }
}

#[derive(Debug, Default)]
pub struct HeadlessActivation {
    journal: Journal,
}

impl AppActivation for HeadlessActivation {
    fn activate_window(&mut self, window: WindowId, active: bool) {
        self.journal
            .record(BackendCall::ActivateWindow(window, active));
    }

    fn activate_surface(&mut self, surface: SurfaceId, active: bool) {
        self.journal
            .record(BackendCall::ActivateSurface(surface, active));
    }

    fn set_client_fullscreen(&mut self, window: WindowId, fullscreen: bool) {
        self.journal
            .record(BackendCall::ClientFullscreen(window, fullscreen));
    }

    fn send_close(&mut self, window: WindowId) {
        self.journal.record(BackendCall::SendClose(window));
    }
}

impl Backends {
    /// Headless collaborators sharing one journal
    pub fn headless() -> (Backends, Journal) {
        let journal = Journal::new();
        let backends = Backends {
            layout: Box::new(HeadlessLayout::new(journal.clone())),
            renderer: Box::new(HeadlessRenderer {
                journal: journal.clone(),
            }),
            input: Box::new(HeadlessInput {
                journal: journal.clone(),
                pointer: Point::default(),
            }),
            activation: Box::new(HeadlessActivation {
                journal: journal.clone(),
            }),
        };
        (backends, journal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::{Monitor, MonitorSpec};
    use crate::window::{Window, WindowSpec};

    #[test]
    fn fullscreen_request_covers_monitor_and_restores() {
        let mut registry = Registry::new();
        let mon = registry.monitors.next_monitor_id("DP-1");
        registry.monitors.add(Monitor::new(
            mon,
            &MonitorSpec {
                name: "DP-1".into(),
                ..MonitorSpec::default()
            },
        ));
        let spec = WindowSpec {
            geometry: Rectangle::from_xywh(10.0, 10.0, 100.0, 100.0),
            ..WindowSpec::default()
        };
        let id = registry
            .windows
            .insert(Window::new(&spec, WorkspaceId::new(1), Some(mon)));

        let journal = Journal::new();
        let mut layout = HeadlessLayout::new(journal.clone());
        layout.fullscreen_request(&mut registry, id, FullscreenMode::NONE, FullscreenMode::FULLSCREEN);
        assert_eq!(
            registry.windows.get(id).unwrap().geometry,
            Rectangle::from_xywh(0.0, 0.0, 1920.0, 1080.0)
        );

        layout.fullscreen_request(&mut registry, id, FullscreenMode::FULLSCREEN, FullscreenMode::NONE);
        assert_eq!(registry.windows.get(id).unwrap().geometry, spec.geometry);
        assert_eq!(journal.count(|c| matches!(c, BackendCall::FullscreenRequest { .. })), 2);
    }
}

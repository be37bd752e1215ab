//! Spatial queries: what is under a point, what lies in a direction, and
//! which monitor a selector string names

use std::f64::consts::PI;

use tracing::{debug, error, warn};

use crate::config::FocusPreferredMethod;
use crate::geometry::{Direction, Point, Rectangle};
use crate::monitor::MonitorId;
use crate::state::WeftState;
use crate::window::{WindowId, WindowProps};
use crate::workspace::WorkspaceId;

/// Edges closer than this count as touching
const STICK_TOLERANCE: f64 = 2.0;

fn sticks(a: f64, b: f64) -> bool {
    (a - b).abs() < STICK_TOLERANCE
}

fn span_overlap(a_start: f64, a_end: f64, b_start: f64, b_end: f64) -> f64 {
    (a_end.min(b_end) - a_start.max(b_start)).max(0.0)
}

/// If `candidate` touches `source` on the `dir` side, the length of the
/// shared edge (possibly zero for corner contact)
pub fn edge_contact(source: &Rectangle, candidate: &Rectangle, dir: Direction) -> Option<f64> {
    let vertical_overlap = || {
        span_overlap(
            source.loc.y,
            source.bottom(),
            candidate.loc.y,
            candidate.bottom(),
        )
    };
    let horizontal_overlap = || {
        span_overlap(
            source.loc.x,
            source.right(),
            candidate.loc.x,
            candidate.right(),
        )
    };

    match dir {
        Direction::Left if sticks(source.loc.x, candidate.right()) => Some(vertical_overlap()),
        Direction::Right if sticks(source.right(), candidate.loc.x) => Some(vertical_overlap()),
        Direction::Up if sticks(source.loc.y, candidate.bottom()) => Some(horizontal_overlap()),
        Direction::Down if sticks(source.bottom(), candidate.loc.y) => Some(horizontal_overlap()),
        _ => None,
    }
}

impl WeftState {
    /// Window under `pos`.
    ///
    /// Pinned floating windows are checked first, then the monitor's open
    /// special workspace, then its active workspace. Within a workspace
    /// floating windows win over tiled ones and a fullscreen window wins
    /// over everything below it.
    #[profiling::function]
    pub fn window_at(
        &self,
        pos: Point,
        props: WindowProps,
        ignore: Option<WindowId>,
    ) -> Option<WindowId> {
        let monitor = self.registry.monitors.from_vector(pos)?;
        let (special, active) = (monitor.active_special_workspace, monitor.active_workspace);

        if props.contains(WindowProps::ALLOW_FLOATING) {
            let pinned = self.registry.windows.iter().rev().find(|w| {
                w.is_visible_candidate()
                    && w.floating
                    && w.pinned
                    && !w.refuses_focus()
                    && !w.no_focus
                    && Some(w.id) != ignore
                    && (w.hit_box(props, &self.config).contains(pos) || w.has_popup_at(pos))
            });
            if let Some(w) = pinned {
                return Some(w.id);
            }
        }

        if let Some(special) = special {
            let found = self.window_at_in_workspace(pos, props, ignore, special, true);
            if found.is_some() || !self.config.special_fallthrough {
                return found;
            }
        }

        self.window_at_in_workspace(pos, props, ignore, active?, false)
    }

    fn window_at_in_workspace(
        &self,
        pos: Point,
        props: WindowProps,
        ignore: Option<WindowId>,
        workspace: WorkspaceId,
        special: bool,
    ) -> Option<WindowId> {
        let floating = |above_fullscreen: bool| -> Option<WindowId> {
            for w in self.registry.windows.iter().rev() {
                if !w.is_visible_candidate()
                    || !w.floating
                    || w.pinned
                    || w.no_focus
                    || Some(w.id) == ignore
                {
                    continue;
                }
                let on_matching_workspace = self
                    .registry
                    .workspace(w.workspace)
                    .is_some_and(|ws| ws.visible && ws.is_special == special);
                if !on_matching_workspace {
                    continue;
                }
                if above_fullscreen && !w.created_over_fullscreen {
                    continue;
                }

                if w.hit_box(props, &self.config).contains(pos) {
                    if w.refuses_focus() {
                        // no parent tracking: the last focused window stands in
                        return self.focus.window;
                    }
                    return Some(w.id);
                }
                if w.has_popup_at(pos) {
                    return Some(w.id);
                }
            }
            None
        };

        if props.contains(WindowProps::ALLOW_FLOATING) {
            if let Some(found) = floating(true) {
                return Some(found);
            }
        }

        if props.contains(WindowProps::FLOATING_ONLY) {
            return floating(false);
        }

        let has_fullscreen = self
            .registry
            .workspace(workspace)
            .is_some_and(|ws| ws.has_fullscreen_window);
        if has_fullscreen && !props.contains(WindowProps::SKIP_FULLSCREEN_PRIORITY) {
            return self
                .backends
                .layout
                .fullscreen_window(&self.registry, workspace);
        }

        if let Some(found) = floating(false) {
            return Some(found);
        }

        let tiled = || {
            self.registry.windows.iter().filter(|w| {
                !w.floating
                    && w.workspace == workspace
                    && w.is_visible_candidate()
                    && !w.refuses_focus()
                    && !w.no_focus
                    && Some(w.id) != ignore
            })
        };
        if let Some(w) = tiled().find(|w| w.has_popup_at(pos)) {
            return Some(w.id);
        }
        tiled()
            .find(|w| w.hit_box(props, &self.config).contains(pos))
            .map(|w| w.id)
    }

    /// Nearest window from `bbox` in `dir`.
    ///
    /// Edge mode (tiled sources) only considers windows whose facing edge
    /// touches the source and ranks them by focus recency or shared edge
    /// length. Angular mode (floating sources) picks by direction angle and
    /// distance, falling back to the workspace's fullscreen window.
    #[profiling::function]
    pub fn window_in_direction(
        &self,
        bbox: Rectangle,
        workspace: WorkspaceId,
        dir: Direction,
        ignore: Option<WindowId>,
        angular: bool,
    ) -> Option<WindowId> {
        let ws = self.registry.workspace(workspace)?;
        let (ws_monitor, ws_has_fullscreen) = (ws.monitor, ws.has_fullscreen_window);

        let candidates = self.registry.windows.iter().filter(|w| {
            if Some(w.id) == ignore || !w.is_visible_candidate() {
                return false;
            }
            if !self.registry.is_workspace_visible(w.workspace) {
                return false;
            }
            if w.monitor == ws_monitor && w.workspace != workspace {
                return false;
            }
            if ws_has_fullscreen && !w.is_fullscreen() && !w.created_over_fullscreen {
                return false;
            }
            if !self.config.monitor_fallback && w.monitor != ws_monitor {
                return false;
            }
            self.backends.layout.is_reachable(&self.registry, w.id)
        });

        if !angular {
            let history = self.focus.history();
            let mut leader = None;
            let mut leader_value = -1.0;

            for w in candidates {
                if w.floating && !w.is_fullscreen() {
                    continue;
                }
                let Some(overlap) = edge_contact(&bbox, &w.geometry, dir) else {
                    continue;
                };

                match self.config.focus_preferred_method {
                    FocusPreferredMethod::History => {
                        if overlap <= 0.0 {
                            continue;
                        }
                        let rank = self
                            .focus
                            .history_index(w.id)
                            .map_or(0.0, |idx| (history.len() - idx) as f64);
                        if rank > leader_value {
                            leader_value = rank;
                            leader = Some(w.id);
                        }
                    }
                    FocusPreferredMethod::Length => {
                        if overlap > leader_value {
                            leader_value = overlap;
                            leader = Some(w.id);
                        }
                    }
                }
            }
            return leader;
        }

        let threshold = self.config.directional_angle_threshold;
        let source = bbox.center();
        let dir_vec = dir.vector();
        let mut leader = None;
        let mut leader_distance = -1.0;
        let mut best_angle = 2.0 * PI;

        for w in candidates {
            if !w.floating && !w.is_fullscreen() {
                continue;
            }
            let offset = w.middle() - source;
            let distance = offset.length();
            let angle = offset.normalize().dot(dir_vec).clamp(-1.0, 1.0).acos();
            if angle > PI / 2.0 {
                continue;
            }

            let nearer_within_tolerance =
                best_angle < threshold && distance < leader_distance && angle < threshold;
            let better_angle = angle < best_angle && best_angle > threshold;
            if nearer_within_tolerance || better_angle || leader_distance == -1.0 {
                leader = Some(w.id);
                leader_distance = distance;
                best_angle = angle;
            }
        }

        leader.or_else(|| {
            ws_has_fullscreen
                .then(|| self.registry.fullscreen_window(workspace))
                .flatten()
        })
    }

    /// Nearest window from an existing window's box, using angular mode for
    /// floating windows
    pub fn window_in_direction_of(&self, window: WindowId, dir: Direction) -> Option<WindowId> {
        let w = self.registry.window(window)?;
        let angular = w.floating && !w.is_fullscreen();
        self.window_in_direction(w.geometry, w.workspace, dir, Some(window), angular)
    }

    /// Move focus in a direction: to the nearest window, or else to the
    /// monitor that lies that way
    pub fn move_focus(&mut self, dir: Direction) {
        let source_window = self.focus.window;
        if let Some(target) = source_window.and_then(|w| self.window_in_direction_of(w, dir)) {
            debug!("Moving focus {dir} to {target}");
            self.focus_window(Some(target), None, false);
            if let Some(middle) = self.registry.window(target).map(|w| w.middle()) {
                self.warp_unless_disabled(middle);
            }
            return;
        }

        let Some(source_monitor) = source_window
            .and_then(|w| self.window_monitor(w))
            .or(self.focus.monitor)
        else {
            return;
        };
        let Some(monitor) = self.monitor_in_direction(source_monitor, dir) else {
            debug!("Nothing {dir} of the focused window");
            return;
        };

        debug!("Moving focus {dir} to monitor {monitor}");
        self.focus_monitor(monitor);
        let target = self
            .registry
            .monitor(monitor)
            .and_then(|mon| mon.active_workspace)
            .and_then(|ws| {
                self.registry
                    .workspaces
                    .last_focused_window(ws)
                    .or_else(|| self.registry.first_window(ws))
            });
        if let Some(target) = target {
            self.focus_window(Some(target), None, false);
        }
        if let Some(middle) = self.registry.monitor(monitor).map(|mon| mon.middle()) {
            self.warp_unless_disabled(middle);
        }
    }

    pub(crate) fn warp_unless_disabled(&mut self, position: Point) {
        if !self.config.no_warps {
            self.backends.input.warp_cursor(position);
        }
    }

    /// Monitor adjacent to `source` in `dir` sharing the longest edge
    pub fn monitor_in_direction(&self, source: MonitorId, dir: Direction) -> Option<MonitorId> {
        let source_box = self.registry.monitor(source)?.logical_box();
        let mut leader = None;
        let mut longest = -1.0;

        for mon in self.registry.monitors.iter() {
            if mon.id == source {
                continue;
            }
            if let Some(overlap) = edge_contact(&source_box, &mon.logical_box(), dir) {
                if overlap > longest {
                    longest = overlap;
                    leader = Some(mon.id);
                }
            }
        }
        leader
    }

    /// Resolve a monitor selector: `current`, a direction, a relative
    /// `+N`/`-N` offset, an absolute id, `desc:<prefix>` or an output name
    pub fn monitor_from_string(&self, token: &str) -> Option<MonitorId> {
        let token = token.trim();

        if token == "current" {
            return self.focus.monitor;
        }

        if let Some(dir) = Direction::parse(token) {
            return self.monitor_in_direction(self.focus.monitor?, dir);
        }

        if token.starts_with('+') || token.starts_with('-') {
            return self.monitor_from_offset(token);
        }

        if !token.is_empty() && token.chars().all(|c| c.is_ascii_digit()) {
            let count = self.registry.monitors.len();
            return match token.parse::<i64>() {
                Ok(id) if id >= 0 && (id as usize) < count => {
                    let found = self.registry.monitors.get(MonitorId::new(id as i32));
                    found.filter(|mon| mon.enabled).map(|mon| mon.id)
                }
                _ => {
                    error!("Monitor id {token} is out of range");
                    None
                }
            };
        }

        let found = self.registry.monitors.by_selector(token).map(|mon| mon.id);
        if found.is_none() {
            debug!("No monitor matches '{token}'");
        }
        found
    }

    fn monitor_from_offset(&self, token: &str) -> Option<MonitorId> {
        let count = self.registry.monitors.len();
        if count == 1 {
            return self.registry.monitors.nth(0).map(|mon| mon.id);
        }
        if count == 0 {
            return None;
        }

        let offset = match token.parse::<i64>() {
            Ok(offset) => offset,
            Err(err) => {
                error!("Invalid monitor offset '{token}': {err}");
                return None;
            }
        };
        let Some(current) = self
            .focus
            .monitor
            .and_then(|mon| self.registry.monitors.index_of(mon))
        else {
            error!("No focused monitor to offset from");
            return None;
        };

        let n = count as i64;
        let mut index = ((current as i64 + offset) % n + n) % n;
        if !(0..n).contains(&index) {
            warn!("Monitor offset {token} wrapped out of range, clamping");
            index = index.clamp(0, n - 1);
        }
        self.registry.monitors.nth(index as usize).map(|mon| mon.id)
    }

    /// Monitor containing `point`, or the nearest one
    pub fn monitor_from_vector(&self, point: Point) -> Option<MonitorId> {
        self.registry.monitors.from_vector(point).map(|mon| mon.id)
    }

    /// Monitor under the pointer
    pub fn monitor_at_cursor(&self) -> Option<MonitorId> {
        self.monitor_from_vector(self.backends.input.pointer_position())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_contact_per_direction() {
        let source = Rectangle::from_xywh(100.0, 100.0, 100.0, 100.0);
        let left = Rectangle::from_xywh(0.0, 150.0, 99.0, 100.0);
        let right = Rectangle::from_xywh(201.0, 0.0, 50.0, 120.0);
        let below = Rectangle::from_xywh(150.0, 200.0, 10.0, 10.0);

        assert_eq!(edge_contact(&source, &left, Direction::Left), Some(50.0));
        assert_eq!(edge_contact(&source, &right, Direction::Right), Some(20.0));
        assert_eq!(edge_contact(&source, &below, Direction::Down), Some(10.0));
        assert_eq!(edge_contact(&source, &below, Direction::Up), None);
        // three pixels apart do not touch
        let apart = Rectangle::from_xywh(203.0, 100.0, 10.0, 10.0);
        assert_eq!(edge_contact(&source, &apart, Direction::Right), None);
    }

    #[test]
    fn corner_contact_has_zero_overlap() {
        let source = Rectangle::from_xywh(0.0, 0.0, 100.0, 100.0);
        let corner = Rectangle::from_xywh(100.0, 100.0, 100.0, 100.0);
        assert_eq!(edge_contact(&source, &corner, Direction::Right), Some(0.0));
    }
}

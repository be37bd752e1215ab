//! Monitor set, id allocation and layout arrangement

use std::collections::HashMap;

use tracing::{debug, info};

use super::{Monitor, MonitorId};
use crate::config::AutoDirection;
use crate::geometry::Point;

/// Owns the connected monitors plus the synthetic fallback
#[derive(Debug)]
pub struct MonitorManager {
    /// Real monitors, in connection order
    monitors: Vec<Monitor>,
    fallback: Monitor,
    /// Output name to the id it was last given, so reconnects keep their id
    id_map: HashMap<String, MonitorId>,
}

impl Default for MonitorManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MonitorManager {
    pub fn new() -> Self {
        Self {
            monitors: Vec::new(),
            fallback: Monitor::fallback(),
            id_map: HashMap::new(),
        }
    }

    /// Enabled monitors, the fallback included only while it is enabled
    pub fn iter(&self) -> impl Iterator<Item = &Monitor> {
        self.monitors
            .iter()
            .chain(std::iter::once(&self.fallback))
            .filter(|mon| mon.enabled)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Monitor> {
        self.monitors
            .iter_mut()
            .chain(std::iter::once(&mut self.fallback))
            .filter(|mon| mon.enabled)
    }

    /// Ids of the enabled monitors, in iteration order
    pub fn ids(&self) -> Vec<MonitorId> {
        self.iter().map(|mon| mon.id).collect()
    }

    /// Number of enabled monitors
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of connected real monitors
    pub fn real_count(&self) -> usize {
        self.monitors.len()
    }

    pub fn get(&self, id: MonitorId) -> Option<&Monitor> {
        if id == MonitorId::FALLBACK {
            return Some(&self.fallback);
        }
        let found = self.monitors.iter().find(|mon| mon.id == id);
        if found.is_none() {
            debug!("No monitor with id {id}");
        }
        found
    }

    pub fn get_mut(&mut self, id: MonitorId) -> Option<&mut Monitor> {
        if id == MonitorId::FALLBACK {
            return Some(&mut self.fallback);
        }
        self.monitors.iter_mut().find(|mon| mon.id == id)
    }

    pub fn contains(&self, id: MonitorId) -> bool {
        self.iter().any(|mon| mon.id == id)
    }

    pub fn fallback(&self) -> &Monitor {
        &self.fallback
    }

    pub fn fallback_mut(&mut self) -> &mut Monitor {
        &mut self.fallback
    }

    pub fn by_name(&self, name: &str) -> Option<&Monitor> {
        self.iter().find(|mon| mon.name == name)
    }

    /// First monitor whose description starts with `prefix`
    pub fn by_description(&self, prefix: &str) -> Option<&Monitor> {
        self.iter().find(|mon| mon.description.starts_with(prefix))
    }

    /// First monitor matching a static `name` / `desc:<prefix>` selector
    pub fn by_selector(&self, selector: &str) -> Option<&Monitor> {
        self.iter().find(|mon| mon.matches_selector(selector))
    }

    /// Monitor containing `point`, or the one closest to it
    pub fn from_vector(&self, point: Point) -> Option<&Monitor> {
        if let Some(mon) = self.iter().find(|mon| mon.logical_box().contains(point)) {
            return Some(mon);
        }

        self.iter().min_by(|a, b| {
            let da = a.logical_box().distance_squared_to(point);
            let db = b.logical_box().distance_squared_to(point);
            da.total_cmp(&db)
        })
    }

    /// Pick an id for an output that is about to connect.
    ///
    /// The id recorded for `name` is reused unless a live monitor holds it;
    /// otherwise the smallest non-negative id not held by a live monitor.
    pub fn next_monitor_id(&mut self, name: &str) -> MonitorId {
        let in_use = |id: MonitorId| self.monitors.iter().any(|mon| mon.id == id);

        if let Some(&id) = self.id_map.get(name) {
            if !in_use(id) {
                debug!("Reusing monitor id {id} for {name}");
                return id;
            }
        }

        let mut candidate = 0;
        while in_use(MonitorId::new(candidate)) {
            candidate += 1;
        }
        let id = MonitorId::new(candidate);
        self.id_map.insert(name.to_string(), id);
        id
    }

    /// Add a connected monitor
    pub fn add(&mut self, monitor: Monitor) {
        info!(
            "Adding monitor {} '{}' ({}x{} @ {})",
            monitor.id, monitor.name, monitor.pixel_size.w, monitor.pixel_size.h, monitor.scale
        );
        self.id_map.insert(monitor.name.clone(), monitor.id);
        self.monitors.push(monitor);
    }

    /// Remove a connected monitor. The fallback cannot be removed.
    pub fn remove(&mut self, id: MonitorId) -> Option<Monitor> {
        let pos = self.monitors.iter().position(|mon| mon.id == id)?;
        Some(self.monitors.remove(pos))
    }

    /// Position of a monitor in iteration order, used for relative selectors
    pub fn index_of(&self, id: MonitorId) -> Option<usize> {
        self.iter().position(|mon| mon.id == id)
    }

    pub fn nth(&self, index: usize) -> Option<&Monitor> {
        self.iter().nth(index)
    }

    /// Lay the real monitors out in the global space.
    ///
    /// Monitors with an explicit position are placed first. The rest are
    /// appended one by one at the edge of the occupied envelope given by
    /// their auto direction (right by default). Afterwards the legacy
    /// compatibility positions are packed left to right.
    pub fn arrange(&mut self, force_zero_scaling: bool) {
        let mut placed: Vec<usize> = Vec::new();
        let mut pending: Vec<usize> = Vec::new();

        for (idx, mon) in self.monitors.iter_mut().enumerate() {
            match mon.placement.position {
                Some(position) => {
                    debug!("Monitor {} placed explicitly at {position}", mon.name);
                    mon.position = position;
                    placed.push(idx);
                }
                None => pending.push(idx),
            }
        }

        for idx in pending {
            let env = Envelope::of(placed.iter().map(|&i| &self.monitors[i]));
            let mon = &mut self.monitors[idx];
            let size = mon.size();
            mon.position = match mon.placement.auto_direction {
                AutoDirection::Up => Point::new(0.0, env.min_up - size.h),
                AutoDirection::Down => Point::new(0.0, env.max_down),
                AutoDirection::Left => Point::new(env.min_left - size.w, 0.0),
                AutoDirection::Right | AutoDirection::None => Point::new(env.max_right, 0.0),
            };
            debug!(
                "Monitor {} auto placed {:?} at {}",
                mon.name, mon.placement.auto_direction, mon.position
            );
            placed.push(idx);
        }

        let mut compat_x = 0.0;
        for mon in &mut self.monitors {
            mon.compat_position = Point::new(compat_x, 0.0);
            if force_zero_scaling {
                compat_x += mon.pixel_size.w;
                mon.compat_scale = mon.scale;
            } else {
                compat_x += mon.size().w;
                mon.compat_scale = 1.0;
            }
        }
    }
}

/// Bounding edges of the monitors placed so far
#[derive(Debug, Default)]
struct Envelope {
    max_right: f64,
    max_down: f64,
    min_left: f64,
    min_up: f64,
}

impl Envelope {
    fn of<'a>(monitors: impl Iterator<Item = &'a Monitor>) -> Self {
        let mut env = Envelope::default();
        for mon in monitors {
            let bbox = mon.logical_box();
            env.max_right = env.max_right.max(bbox.right());
            env.max_down = env.max_down.max(bbox.bottom());
            env.min_left = env.min_left.min(bbox.loc.x);
            env.min_up = env.min_up.min(bbox.loc.y);
        }
        env
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;
    use crate::monitor::MonitorSpec;

    fn spec(name: &str, w: f64, h: f64) -> MonitorSpec {
        MonitorSpec {
            name: name.into(),
            pixel_size: Size::new(w, h),
            ..MonitorSpec::default()
        }
    }

    fn connect(manager: &mut MonitorManager, spec: MonitorSpec) -> MonitorId {
        let id = manager.next_monitor_id(&spec.name);
        manager.add(Monitor::new(id, &spec));
        id
    }

    #[test]
    fn ids_are_reused_per_name() {
        let mut manager = MonitorManager::new();
        let dp = connect(&mut manager, spec("DP-1", 1920.0, 1080.0));
        let hdmi = connect(&mut manager, spec("HDMI-1", 1920.0, 1080.0));
        assert_eq!(dp, MonitorId::new(0));
        assert_eq!(hdmi, MonitorId::new(1));

        manager.remove(dp);
        // a new output takes the free slot
        let usb = connect(&mut manager, spec("USB-1", 800.0, 600.0));
        assert_eq!(usb, MonitorId::new(0));

        // DP-1 comes back but its id is held, so it gets the next free one
        let dp_again = connect(&mut manager, spec("DP-1", 1920.0, 1080.0));
        assert_eq!(dp_again, MonitorId::new(2));

        manager.remove(usb);
        manager.remove(dp_again);
        assert_eq!(manager.next_monitor_id("DP-1"), MonitorId::new(2));
    }

    #[test]
    fn auto_placement_follows_directions() {
        let mut manager = MonitorManager::new();
        let mut left = spec("DP-1", 1920.0, 1080.0);
        left.position = Some(Point::new(0.0, 0.0));
        connect(&mut manager, left);

        let right = connect(&mut manager, spec("DP-2", 2560.0, 1440.0));
        let mut above_spec = spec("DP-3", 1280.0, 720.0);
        above_spec.auto_direction = AutoDirection::Up;
        let above = connect(&mut manager, above_spec);
        let mut left_spec = spec("DP-4", 1000.0, 1000.0);
        left_spec.auto_direction = AutoDirection::Left;
        let far_left = connect(&mut manager, left_spec);

        manager.arrange(false);

        assert_eq!(manager.get(right).unwrap().position, Point::new(1920.0, 0.0));
        assert_eq!(manager.get(above).unwrap().position, Point::new(0.0, -720.0));
        assert_eq!(
            manager.get(far_left).unwrap().position,
            Point::new(-1000.0, 0.0)
        );
    }

    #[test]
    fn compat_positions_pack_horizontally() {
        let mut manager = MonitorManager::new();
        let mut scaled = spec("DP-1", 3840.0, 2160.0);
        scaled.scale = 2.0;
        let first = connect(&mut manager, scaled);
        let second = connect(&mut manager, spec("DP-2", 1920.0, 1080.0));

        manager.arrange(false);
        assert_eq!(
            manager.get(second).unwrap().compat_position,
            Point::new(1920.0, 0.0)
        );
        assert_eq!(manager.get(first).unwrap().compat_scale, 1.0);

        manager.arrange(true);
        assert_eq!(
            manager.get(second).unwrap().compat_position,
            Point::new(3840.0, 0.0)
        );
        assert_eq!(manager.get(first).unwrap().compat_scale, 2.0);
    }

    #[test]
    fn from_vector_prefers_containment_then_distance() {
        let mut manager = MonitorManager::new();
        let a = connect(&mut manager, spec("DP-1", 1000.0, 1000.0));
        let b = connect(&mut manager, spec("DP-2", 1000.0, 1000.0));
        manager.arrange(false);

        assert_eq!(
            manager.from_vector(Point::new(1500.0, 10.0)).map(|m| m.id),
            Some(b)
        );
        assert_eq!(
            manager.from_vector(Point::new(-50.0, 1200.0)).map(|m| m.id),
            Some(a)
        );
    }

    #[test]
    fn fallback_is_hidden_until_enabled() {
        let mut manager = MonitorManager::new();
        assert!(manager.is_empty());
        manager.fallback_mut().enabled = true;
        assert_eq!(manager.ids(), vec![MonitorId::FALLBACK]);
        assert_eq!(manager.real_count(), 0);
    }
}

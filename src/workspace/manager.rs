//! Workspace manager that owns all workspaces

use super::{Workspace, WorkspaceId};
use crate::monitor::MonitorId;
use crate::window::WindowId;
use tracing::{debug, error, warn};

/// Owns every live workspace, in creation order
#[derive(Debug, Default)]
pub struct WorkspaceManager {
    workspaces: Vec<Workspace>,
}

impl WorkspaceManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: WorkspaceId) -> Option<&Workspace> {
        let found = self.workspaces.iter().find(|ws| ws.id == id);
        if found.is_none() {
            debug!("No workspace with id {id}");
        }
        found
    }

    pub fn get_mut(&mut self, id: WorkspaceId) -> Option<&mut Workspace> {
        self.workspaces.iter_mut().find(|ws| ws.id == id)
    }

    pub fn contains(&self, id: WorkspaceId) -> bool {
        self.workspaces.iter().any(|ws| ws.id == id)
    }

    pub fn by_name(&self, name: &str) -> Option<&Workspace> {
        let found = self.workspaces.iter().find(|ws| ws.name == name);
        if found.is_none() {
            debug!("No workspace named '{name}'");
        }
        found
    }

    /// Look a workspace up by selector: `name:<x>`, `special`,
    /// `special:<x>` or a numeric id
    pub fn by_string(&self, selector: &str) -> Option<&Workspace> {
        if let Some(name) = selector.strip_prefix("name:") {
            return self.by_name(name);
        }
        if selector == "special" {
            return self.by_name("special:special");
        }
        if selector.starts_with("special:") {
            return self.by_name(selector);
        }
        match selector.trim().parse::<i64>() {
            Ok(id) => self.get(WorkspaceId::new(id)),
            Err(err) => {
                error!("Invalid workspace selector '{selector}': {err}");
                None
            }
        }
    }

    /// All workspaces, in creation order
    pub fn iter(&self) -> impl Iterator<Item = &Workspace> {
        self.workspaces.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Workspace> {
        self.workspaces.iter_mut()
    }

    /// Workspaces owned by a monitor
    pub fn on_monitor(&self, monitor: MonitorId) -> impl Iterator<Item = &Workspace> {
        self.workspaces
            .iter()
            .filter(move |ws| ws.monitor == Some(monitor))
    }

    /// Insert a workspace. An existing workspace with the same id is kept
    /// and the new one dropped.
    pub fn insert(&mut self, workspace: Workspace) -> bool {
        if self.contains(workspace.id) {
            warn!("Workspace {} already exists, not inserting", workspace.id);
            return false;
        }
        self.workspaces.push(workspace);
        true
    }

    pub fn remove(&mut self, id: WorkspaceId) -> Option<Workspace> {
        let pos = self.workspaces.iter().position(|ws| ws.id == id)?;
        Some(self.workspaces.remove(pos))
    }

    /// Remove every workspace for which `keep` returns false
    pub fn retain(&mut self, keep: impl FnMut(&Workspace) -> bool) {
        self.workspaces.retain(keep);
    }

    /// Next id in the named range, strictly below every named id in use
    pub fn next_named_id(&self) -> WorkspaceId {
        let mut lowest = WorkspaceId::NAMED_START.get() + 1;
        for ws in &self.workspaces {
            if ws.id.get() < -1 && ws.id.get() < lowest {
                lowest = ws.id.get();
            }
        }
        WorkspaceId::new(lowest - 1)
    }

    /// Next id in the special range, strictly above every special id in use
    pub fn next_special_id(&self) -> WorkspaceId {
        let highest = self
            .workspaces
            .iter()
            .filter(|ws| ws.is_special)
            .map(|ws| ws.id.get())
            .fold(WorkspaceId::SPECIAL_START.get(), i64::max);

        let candidate = highest + 1;
        if candidate <= WorkspaceId::SPECIAL_END.get() {
            return WorkspaceId::new(candidate);
        }

        // top of the range is taken, look for a hole
        let free = (WorkspaceId::SPECIAL_START.get() + 1..=WorkspaceId::SPECIAL_END.get())
            .map(WorkspaceId::new)
            .find(|id| !self.contains(*id));
        free.unwrap_or_else(|| {
            warn!("Special workspace range exhausted");
            WorkspaceId::INVALID
        })
    }

    /// The workspace's remembered last-focused window, if set
    pub fn last_focused_window(&self, id: WorkspaceId) -> Option<WindowId> {
        self.get(id).and_then(|ws| ws.last_focused_window)
    }

    pub fn len(&self) -> usize {
        self.workspaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workspaces.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ws(id: i64, name: &str) -> Workspace {
        Workspace::new(WorkspaceId::new(id), MonitorId::new(0), name.into(), true)
    }

    #[test]
    fn selector_forms() {
        let mut manager = WorkspaceManager::new();
        manager.insert(ws(1, "1"));
        manager.insert(ws(-1338, "web"));
        manager.insert(ws(-99, "special:special"));
        manager.insert(ws(-98, "special:term"));

        assert_eq!(manager.by_string("1").map(|w| w.id), Some(WorkspaceId::new(1)));
        assert_eq!(
            manager.by_string("name:web").map(|w| w.id),
            Some(WorkspaceId::new(-1338))
        );
        assert_eq!(
            manager.by_string("special").map(|w| w.id),
            Some(WorkspaceId::new(-99))
        );
        assert_eq!(
            manager.by_string("special:term").map(|w| w.id),
            Some(WorkspaceId::new(-98))
        );
        assert!(manager.by_string("garbage").is_none());
        assert!(manager.by_string("7").is_none());
    }

    #[test]
    fn named_ids_decrease() {
        let mut manager = WorkspaceManager::new();
        assert_eq!(manager.next_named_id(), WorkspaceId::new(-1337));
        manager.insert(ws(-1337, "a"));
        assert_eq!(manager.next_named_id(), WorkspaceId::new(-1338));
        manager.insert(ws(-1338, "b"));
        // special ids never affect the named range
        manager.insert(ws(-50, "special:x"));
        assert_eq!(manager.next_named_id(), WorkspaceId::new(-1339));
    }

    #[test]
    fn special_ids_increase_and_stay_in_range() {
        let mut manager = WorkspaceManager::new();
        assert_eq!(manager.next_special_id(), WorkspaceId::new(-98));
        manager.insert(ws(-98, "special:a"));
        assert_eq!(manager.next_special_id(), WorkspaceId::new(-97));
        manager.insert(ws(-2, "special:top"));
        // range top taken: first hole is handed out
        assert_eq!(manager.next_special_id(), WorkspaceId::new(-97));
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let mut manager = WorkspaceManager::new();
        assert!(manager.insert(ws(1, "1")));
        assert!(!manager.insert(ws(1, "other")));
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.get(WorkspaceId::new(1)).unwrap().name, "1");
    }
}

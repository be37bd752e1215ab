//! Window registry for tracking all windows in the compositor

use super::{SurfaceId, Window, WindowId};
use crate::workspace::WorkspaceId;
use std::collections::HashMap;

/// Central registry for all windows, including their global stacking order
#[derive(Debug, Default)]
pub struct WindowRegistry {
    /// Map from WindowId to Window
    windows: HashMap<WindowId, Window>,
    /// Stacking order, bottom to top
    order: Vec<WindowId>,
    /// Map from main surface to WindowId for quick lookups
    surface_to_id: HashMap<SurfaceId, WindowId>,
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new window on top of the stack
    pub fn insert(&mut self, window: Window) -> WindowId {
        let id = window.id;
        self.surface_to_id.insert(window.surface, id);
        for popup in &window.popups {
            self.surface_to_id.insert(popup.surface, id);
        }
        self.order.push(id);
        self.windows.insert(id, window);
        id
    }

    /// Remove a window from the registry
    pub fn remove(&mut self, id: WindowId) -> Option<Window> {
        let window = self.windows.remove(&id)?;
        self.surface_to_id.retain(|_, owner| *owner != id);
        self.order.retain(|other| *other != id);
        Some(window)
    }

    pub fn get(&self, id: WindowId) -> Option<&Window> {
        self.windows.get(&id)
    }

    pub fn get_mut(&mut self, id: WindowId) -> Option<&mut Window> {
        self.windows.get_mut(&id)
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.windows.contains_key(&id)
    }

    /// Find the window owning a surface (main surface or popup)
    pub fn find_by_surface(&self, surface: SurfaceId) -> Option<WindowId> {
        self.surface_to_id.get(&surface).copied()
    }

    /// All windows, bottom to top
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Window> {
        self.order.iter().filter_map(|id| self.windows.get(id))
    }

    /// Window ids, bottom to top
    pub fn ids(&self) -> Vec<WindowId> {
        self.order.clone()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Window> {
        self.windows.values_mut()
    }

    /// All windows in a specific workspace, bottom to top
    pub fn in_workspace(&self, workspace: WorkspaceId) -> impl Iterator<Item = &Window> {
        self.iter().filter(move |w| w.workspace == workspace)
    }

    /// Ids of the windows in a workspace, bottom to top
    pub fn ids_in_workspace(&self, workspace: WorkspaceId) -> Vec<WindowId> {
        self.in_workspace(workspace).map(|w| w.id).collect()
    }

    /// Move a window to the top of the stacking order
    pub fn raise(&mut self, id: WindowId) -> bool {
        let Some(pos) = self.order.iter().position(|other| *other == id) else {
            return false;
        };
        let id = self.order.remove(pos);
        self.order.push(id);
        true
    }

    /// Stacking position, 0 being the bottom
    pub fn stacking_index(&self, id: WindowId) -> Option<usize> {
        self.order.iter().position(|other| *other == id)
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::WindowSpec;

    fn window(ws: i64) -> Window {
        Window::new(&WindowSpec::default(), WorkspaceId::new(ws), None)
    }

    #[test]
    fn stacking_order_follows_insertion_and_raise() {
        let mut registry = WindowRegistry::new();
        let a = registry.insert(window(1));
        let b = registry.insert(window(1));
        let c = registry.insert(window(2));

        assert_eq!(registry.ids(), vec![a, b, c]);
        assert!(registry.raise(a));
        assert_eq!(registry.ids(), vec![b, c, a]);
        assert_eq!(registry.stacking_index(a), Some(2));
        assert_eq!(registry.ids_in_workspace(WorkspaceId::new(1)), vec![b, a]);
    }

    #[test]
    fn remove_clears_surface_lookup() {
        let mut registry = WindowRegistry::new();
        let w = window(1);
        let surface = w.surface;
        let id = registry.insert(w);
        assert_eq!(registry.find_by_surface(surface), Some(id));

        assert!(registry.remove(id).is_some());
        assert_eq!(registry.find_by_surface(surface), None);
        assert!(registry.remove(id).is_none());
        assert!(registry.is_empty());
    }
}

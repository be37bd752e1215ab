//! Interfaces to the collaborators around the core
//!
//! The core never renders, reads input devices or speaks a wire protocol.
//! It drives those subsystems through the traits below. A compositor plugs in
//! its real implementations; [`headless`] provides recording stand-ins used
//! by the `weft` binary and the tests.

pub mod headless;

use crate::geometry::Point;
use crate::monitor::MonitorId;
use crate::registry::Registry;
use crate::window::{FullscreenMode, SurfaceId, WindowId};
use crate::workspace::WorkspaceId;

/// The active tiling/layout algorithm
pub trait LayoutEngine {
    /// Raise a window in the stacking order
    fn bring_to_top(&mut self, registry: &mut Registry, window: WindowId);

    /// Focus moved to `window`
    fn on_focus_change(&mut self, window: Option<WindowId>);

    /// Lay a window out for a fullscreen transition
    fn fullscreen_request(
        &mut self,
        registry: &mut Registry,
        window: WindowId,
        from: FullscreenMode,
        to: FullscreenMode,
    );

    /// The window the layout considers fullscreen on a workspace
    fn fullscreen_window(&self, registry: &Registry, workspace: WorkspaceId) -> Option<WindowId>;

    /// Re-layout everything shown on a monitor
    fn recalculate_monitor(&mut self, registry: &mut Registry, monitor: MonitorId);

    /// A tiled window was added to its workspace
    fn on_tiling_created(&mut self, registry: &mut Registry, window: WindowId);

    /// A tiled window left its workspace
    fn on_tiling_removed(&mut self, registry: &mut Registry, window: WindowId);

    /// Recompute decoration hints (borders, rounding) for a window
    fn request_render_hints(&mut self, window: WindowId);

    /// Whether directional navigation may land on this window
    fn is_reachable(&self, registry: &Registry, window: WindowId) -> bool;
}

/// The rendering subsystem
pub trait Renderer {
    fn damage_monitor(&mut self, monitor: MonitorId);

    fn schedule_frame(&mut self, monitor: MonitorId, reason: &str);

    /// Offer (`Some`) or withdraw (`None`) a surface as the direct scanout
    /// candidate of a monitor
    fn set_scanout(&mut self, surface: SurfaceId, monitor: Option<MonitorId>);

    /// Re-evaluate variable refresh rate on a monitor
    fn ensure_vrr(&mut self, monitor: MonitorId);
}

/// The input subsystem
pub trait InputManager {
    fn pointer_position(&self) -> Point;

    fn warp_cursor(&mut self, position: Point);

    fn set_keyboard_focus(&mut self, surface: Option<SurfaceId>);

    /// Re-deliver pointer motion to whatever is under the cursor
    fn send_motion_to_focused(&mut self);

    fn recheck_idle_inhibitors(&mut self);
}

/// Client-facing activation state (the protocol or legacy-app shim)
pub trait AppActivation {
    fn activate_window(&mut self, window: WindowId, active: bool);

    fn activate_surface(&mut self, surface: SurfaceId, active: bool);

    fn set_client_fullscreen(&mut self, window: WindowId, fullscreen: bool);

    fn send_close(&mut self, window: WindowId);
}

/// All collaborators the core drives
pub struct Backends {
    pub layout: Box<dyn LayoutEngine>,
    pub renderer: Box<dyn Renderer>,
    pub input: Box<dyn InputManager>,
    pub activation: Box<dyn AppActivation>,
}

impl std::fmt::Debug for Backends {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backends").finish_non_exhaustive()
    }
}

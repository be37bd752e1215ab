//! Window entities
//!
//! A [`Window`] is a mapped client toplevel as the core sees it: where it
//! lives (workspace and monitor handles), how it is laid out (floating,
//! pinned, fullscreen) and which focus rules apply to it.

mod id;
mod registry;

pub use id::{SurfaceId, WindowId};
pub use registry::WindowRegistry;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::geometry::{Point, Rectangle};
use crate::monitor::MonitorId;
use crate::workspace::WorkspaceId;

bitflags::bitflags! {
    /// Fullscreen mode flags.
    ///
    /// A window may transiently carry both flags; layout only ever acts on the
    /// [effective](FullscreenMode::effective) mode.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FullscreenMode: u8 {
        const MAXIMIZED = 1 << 0;
        const FULLSCREEN = 1 << 1;
    }
}

impl FullscreenMode {
    pub const NONE: FullscreenMode = FullscreenMode::empty();

    /// Clamp an untrusted raw value into the valid range
    pub fn from_raw_clamped(raw: u8) -> FullscreenMode {
        FullscreenMode::from_bits_truncate(raw.min(FullscreenMode::all().bits()))
    }

    /// The dominant mode: the highest set bit
    pub fn effective(self) -> FullscreenMode {
        let bits = self.bits();
        if bits == 0 {
            return FullscreenMode::NONE;
        }
        FullscreenMode::from_bits_truncate(1 << (7 - bits.leading_zeros()))
    }

    /// Numeric form used in IPC payloads (0 none, 1 maximized, 2 fullscreen)
    pub fn as_raw(self) -> u8 {
        self.bits()
    }
}

/// The pair of fullscreen modes tracked per window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FullscreenState {
    /// Compositor-authoritative mode, drives layout
    pub internal: FullscreenMode,
    /// Mode reported to the client
    pub client: FullscreenMode,
}

impl FullscreenState {
    pub fn new(internal: FullscreenMode, client: FullscreenMode) -> Self {
        Self { internal, client }
    }

    /// Both fields set to the same mode
    pub fn both(mode: FullscreenMode) -> Self {
        Self::new(mode, mode)
    }

    pub fn effective(&self) -> FullscreenMode {
        self.internal.effective()
    }
}

bitflags::bitflags! {
    /// Which parts of a window count for hit-testing in
    /// [`window_at`](crate::state::WeftState::window_at)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WindowProps: u8 {
        /// Include space reserved by decorations
        const RESERVED_EXTENTS = 1 << 0;
        /// Include the border-grab area when resize-on-border is enabled
        const INPUT_EXTENTS = 1 << 1;
        /// Include the full border
        const FULL_EXTENTS = 1 << 2;
        /// Only floating windows are candidates
        const FLOATING_ONLY = 1 << 3;
        /// Floating windows are candidates
        const ALLOW_FLOATING = 1 << 4;
        /// Do not short-circuit to the fullscreen window
        const SKIP_FULLSCREEN_PRIORITY = 1 << 5;
    }
}

/// Content type hint reported by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    #[default]
    None,
    Photo,
    Video,
    Game,
}

/// A popup owned by a window, positioned relative to the window origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Popup {
    pub surface: SurfaceId,
    pub geometry: Rectangle,
}

/// Everything needed to map a new window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSpec {
    pub class: String,
    pub title: String,
    pub geometry: Rectangle,
    pub floating: bool,
    pub pinned: bool,
    /// Workspace selector; defaults to the focused monitor's active workspace
    pub workspace: Option<String>,
    pub no_focus: bool,
    pub no_initial_focus: bool,
    pub override_redirect: bool,
    pub wants_focus: bool,
    pub content_type: ContentType,
    /// Popup rectangles relative to the window origin
    pub popups: Vec<Rectangle>,
}

/// A managed window
#[derive(Debug, Clone)]
pub struct Window {
    pub id: WindowId,
    /// Main surface, the default keyboard focus target
    pub surface: SurfaceId,
    pub class: String,
    pub title: String,
    pub mapped: bool,
    pub floating: bool,
    pub pinned: bool,
    /// Pinned status suspended while fullscreen
    pub pin_fullscreened: bool,
    pub fullscreen: FullscreenState,
    pub workspace: WorkspaceId,
    pub monitor: Option<MonitorId>,
    pub geometry: Rectangle,
    pub popups: Vec<Popup>,
    pub no_focus: bool,
    pub no_initial_focus: bool,
    pub override_redirect: bool,
    pub wants_focus: bool,
    pub urgent: bool,
    pub hidden: bool,
    pub content_type: ContentType,
    pub created_over_fullscreen: bool,
    pub fading_out: bool,
    pub ready_to_delete: bool,
    /// Opacity applied by the fullscreen fade pass
    pub fullscreen_alpha: f32,
}

impl Window {
    /// Create a mapped window from a spec
    pub fn new(spec: &WindowSpec, workspace: WorkspaceId, monitor: Option<MonitorId>) -> Self {
        Self {
            id: WindowId::next(),
            surface: SurfaceId::next(),
            class: spec.class.clone(),
            title: spec.title.clone(),
            mapped: true,
            floating: spec.floating,
            pinned: spec.pinned,
            pin_fullscreened: false,
            fullscreen: FullscreenState::default(),
            workspace,
            monitor,
            geometry: spec.geometry,
            popups: spec
                .popups
                .iter()
                .map(|geometry| Popup {
                    surface: SurfaceId::next(),
                    geometry: *geometry,
                })
                .collect(),
            no_focus: spec.no_focus,
            no_initial_focus: spec.no_initial_focus,
            override_redirect: spec.override_redirect,
            wants_focus: spec.wants_focus,
            urgent: false,
            hidden: false,
            content_type: spec.content_type,
            created_over_fullscreen: false,
            fading_out: false,
            ready_to_delete: false,
            fullscreen_alpha: 1.0,
        }
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen.effective() != FullscreenMode::NONE
    }

    pub fn effective_fullscreen(&self) -> FullscreenMode {
        self.fullscreen.effective()
    }

    /// Mapped and not hidden
    pub fn is_visible_candidate(&self) -> bool {
        self.mapped && !self.hidden
    }

    /// An override-redirect surface that does not ask for keyboard focus
    pub fn refuses_focus(&self) -> bool {
        self.override_redirect && !self.wants_focus
    }

    pub fn middle(&self) -> Point {
        self.geometry.center()
    }

    /// Box used for hit-testing under the given properties
    pub fn hit_box(&self, props: WindowProps, config: &Config) -> Rectangle {
        let grab = props.contains(WindowProps::INPUT_EXTENTS) && config.resize_on_border;
        let mut margin = 0.0;
        // the border counts once, whichever flag asks for it
        if grab || props.intersects(WindowProps::FULL_EXTENTS | WindowProps::RESERVED_EXTENTS) {
            margin += config.border_size.max(0) as f64;
        }
        if grab {
            margin += config.extend_border_grab_area.max(0) as f64;
        }
        self.geometry.expand(margin)
    }

    /// Whether one of this window's popups covers `point`
    pub fn has_popup_at(&self, point: Point) -> bool {
        self.popups
            .iter()
            .any(|popup| popup.geometry.translate(self.geometry.loc).contains(point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_is_highest_set_bit() {
        assert_eq!(FullscreenMode::NONE.effective(), FullscreenMode::NONE);
        assert_eq!(
            FullscreenMode::MAXIMIZED.effective(),
            FullscreenMode::MAXIMIZED
        );
        assert_eq!(
            FullscreenMode::FULLSCREEN.effective(),
            FullscreenMode::FULLSCREEN
        );
        assert_eq!(
            (FullscreenMode::MAXIMIZED | FullscreenMode::FULLSCREEN).effective(),
            FullscreenMode::FULLSCREEN
        );
    }

    #[test]
    fn raw_modes_are_clamped() {
        assert_eq!(FullscreenMode::from_raw_clamped(0), FullscreenMode::NONE);
        assert_eq!(
            FullscreenMode::from_raw_clamped(2),
            FullscreenMode::FULLSCREEN
        );
        assert_eq!(FullscreenMode::from_raw_clamped(200), FullscreenMode::all());
    }

    #[test]
    fn hit_box_expands_for_border_grab() {
        let spec = WindowSpec {
            geometry: Rectangle::from_xywh(100.0, 100.0, 300.0, 200.0),
            ..WindowSpec::default()
        };
        let window = Window::new(&spec, WorkspaceId::new(1), None);
        let config = Config {
            resize_on_border: true,
            border_size: 2,
            extend_border_grab_area: 10,
            ..Config::default()
        };

        let plain = window.hit_box(WindowProps::empty(), &config);
        assert_eq!(plain, spec.geometry);
        let input = window.hit_box(WindowProps::INPUT_EXTENTS, &config);
        assert_eq!(input, spec.geometry.expand(12.0));
        let reserved = window.hit_box(WindowProps::RESERVED_EXTENTS, &config);
        assert_eq!(reserved, spec.geometry.expand(2.0));
        let combined = window.hit_box(
            WindowProps::RESERVED_EXTENTS | WindowProps::INPUT_EXTENTS,
            &config,
        );
        assert_eq!(combined, spec.geometry.expand(12.0));
        let full = window.hit_box(
            WindowProps::FULL_EXTENTS | WindowProps::INPUT_EXTENTS,
            &config,
        );
        assert_eq!(full, spec.geometry.expand(12.0));

        let no_resize = Config::default();
        assert_eq!(
            window.hit_box(WindowProps::INPUT_EXTENTS, &no_resize),
            spec.geometry
        );
    }

    #[test]
    fn popups_are_window_relative() {
        let spec = WindowSpec {
            geometry: Rectangle::from_xywh(100.0, 100.0, 50.0, 50.0),
            popups: vec![Rectangle::from_xywh(40.0, 40.0, 100.0, 20.0)],
            ..WindowSpec::default()
        };
        let window = Window::new(&spec, WorkspaceId::new(1), None);
        assert!(window.has_popup_at(Point::new(200.0, 150.0)));
        assert!(!window.has_popup_at(Point::new(90.0, 90.0)));
    }
}

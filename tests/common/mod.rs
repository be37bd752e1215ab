//! Common testing utilities for weft integration tests

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use weft::backend::headless::Journal;
use weft::backend::Backends;
use weft::config::Config;
use weft::event::IpcMessage;
use weft::geometry::{Point, Rectangle, Size};
use weft::monitor::{MonitorId, MonitorSpec};
use weft::window::{WindowId, WindowSpec};
use weft::workspace::WorkspaceId;
use weft::WeftState;

/// A headless core with two side by side 1920x1080 monitors
pub struct TestEnv {
    pub state: WeftState,
    pub journal: Journal,
    pub ipc: Rc<RefCell<Vec<IpcMessage>>>,
    pub dp1: MonitorId,
    pub hdmi1: MonitorId,
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn monitor_spec(name: &str) -> MonitorSpec {
    MonitorSpec {
        name: name.to_string(),
        description: format!("Test output {name}"),
        pixel_size: Size::new(1920.0, 1080.0),
        ..MonitorSpec::default()
    }
}

impl TestEnv {
    /// Core with no monitor connected, running on the fallback
    pub fn bare(config: Config) -> (WeftState, Journal, Rc<RefCell<Vec<IpcMessage>>>) {
        init_tracing();
        let (backends, journal) = Backends::headless();
        let mut state = WeftState::new(config, backends);
        let ipc = Rc::new(RefCell::new(Vec::new()));
        let sink = ipc.clone();
        state
            .events
            .add_sink(move |message: &IpcMessage| sink.borrow_mut().push(message.clone()));
        (state, journal, ipc)
    }

    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// DP-1 at (0,0) and HDMI-1 at (1920,0)
    pub fn with_config(config: Config) -> Self {
        let (mut state, journal, ipc) = Self::bare(config);
        let dp1 = state
            .connect_monitor(&monitor_spec("DP-1"))
            .expect("DP-1 connects");
        let hdmi1 = state
            .connect_monitor(&monitor_spec("HDMI-1"))
            .expect("HDMI-1 connects");
        journal.clear();
        ipc.borrow_mut().clear();
        Self {
            state,
            journal,
            ipc,
            dp1,
            hdmi1,
        }
    }

    pub fn map(&mut self, spec: WindowSpec) -> WindowId {
        self.state.map_window(&spec).expect("window maps")
    }

    /// A floating window at the given logical rectangle
    pub fn map_floating(&mut self, class: &str, x: f64, y: f64, w: f64, h: f64) -> WindowId {
        self.map(WindowSpec {
            class: class.to_string(),
            title: class.to_string(),
            geometry: Rectangle::from_xywh(x, y, w, h),
            floating: true,
            ..WindowSpec::default()
        })
    }

    /// A tiled window at the given logical rectangle
    pub fn map_tiled(&mut self, class: &str, x: f64, y: f64, w: f64, h: f64) -> WindowId {
        self.map(WindowSpec {
            class: class.to_string(),
            title: class.to_string(),
            geometry: Rectangle::from_xywh(x, y, w, h),
            ..WindowSpec::default()
        })
    }

    pub fn active_workspace(&self, monitor: MonitorId) -> Option<WorkspaceId> {
        self.state
            .registry
            .monitor(monitor)
            .and_then(|mon| mon.active_workspace)
    }

    pub fn geometry(&self, window: WindowId) -> Rectangle {
        self.state
            .registry
            .window(window)
            .map(|w| w.geometry)
            .expect("window exists")
    }

    pub fn warp(&mut self, x: f64, y: f64) {
        self.state.backends.input.warp_cursor(Point::new(x, y));
    }

    /// IPC messages of one event type, in order
    pub fn messages(&self, event: &str) -> Vec<String> {
        self.ipc
            .borrow()
            .iter()
            .filter(|m| m.event == event)
            .map(|m| m.data.clone())
            .collect()
    }

    pub fn clear_ipc(&self) {
        self.ipc.borrow_mut().clear();
    }

    /// Fail the test on any invariant violation
    pub fn assert_consistent(&self) {
        if let Err(errors) = self.state.validate_consistency() {
            panic!("state is inconsistent: {errors:#?}");
        }
    }
}

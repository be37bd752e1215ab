//! Event system for weft
//!
//! Two channels leave the core:
//! - typed hook [`Event`]s, delivered to in-process listeners registered per
//!   [`EventKind`];
//! - string-keyed [`IpcMessage`]s (`activewindow>>class,title` and friends),
//!   delivered to every [`IpcSink`].
//!
//! Both are dispatched synchronously. A listener that panics is logged and
//! dropped; the panic never escapes into the core.

use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::Serialize;
use tracing::{error, trace};

use crate::monitor::MonitorId;
use crate::window::{SurfaceId, WindowId};
use crate::workspace::WorkspaceId;

/// Hook events observed by in-process listeners
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The focused window changed; `None` when focus was cleared
    ActiveWindow(Option<WindowId>),
    /// The keyboard focus surface changed
    KeyboardFocus(Option<SurfaceId>),
    /// A window entered or left internal fullscreen
    Fullscreen { window: WindowId, fullscreen: bool },
    /// A workspace was moved onto another monitor
    MoveWorkspace {
        workspace: WorkspaceId,
        monitor: MonitorId,
    },
    /// The focused monitor switched to this workspace
    Workspace(WorkspaceId),
    /// A special workspace was opened (`Some`) or closed (`None`)
    ActiveSpecial {
        workspace: Option<WorkspaceId>,
        monitor: MonitorId,
    },
    MonitorAdded(MonitorId),
    MonitorRemoved(MonitorId),
}

/// Discriminant of [`Event`], used to key listener lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ActiveWindow,
    KeyboardFocus,
    Fullscreen,
    MoveWorkspace,
    Workspace,
    ActiveSpecial,
    MonitorAdded,
    MonitorRemoved,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::ActiveWindow(_) => EventKind::ActiveWindow,
            Event::KeyboardFocus(_) => EventKind::KeyboardFocus,
            Event::Fullscreen { .. } => EventKind::Fullscreen,
            Event::MoveWorkspace { .. } => EventKind::MoveWorkspace,
            Event::Workspace(_) => EventKind::Workspace,
            Event::ActiveSpecial { .. } => EventKind::ActiveSpecial,
            Event::MonitorAdded(_) => EventKind::MonitorAdded,
            Event::MonitorRemoved(_) => EventKind::MonitorRemoved,
        }
    }
}

/// A string-keyed notification for IPC clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IpcMessage {
    pub event: String,
    pub data: String,
}

impl IpcMessage {
    pub fn new(event: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            data: data.into(),
        }
    }
}

impl fmt::Display for IpcMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}>>{}", self.event, self.data)
    }
}

/// Event listener trait for hook events
pub trait EventListener {
    /// Called when an event of the subscribed kind occurs
    fn on_event(&mut self, event: &Event);
}

impl<F: FnMut(&Event)> EventListener for F {
    fn on_event(&mut self, event: &Event) {
        self(event)
    }
}

/// Receiver of IPC notifications
pub trait IpcSink {
    fn on_message(&mut self, message: &IpcMessage);
}

impl<F: FnMut(&IpcMessage)> IpcSink for F {
    fn on_message(&mut self, message: &IpcMessage) {
        self(message)
    }
}

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle {
    kind: EventKind,
    id: u64,
}

/// Event bus for distributing events to listeners and sinks
#[derive(Default)]
pub struct EventBus {
    listeners: HashMap<EventKind, Vec<(u64, Box<dyn EventListener>)>>,
    sinks: Vec<Box<dyn IpcSink>>,
    next_id: u64,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field(
                "listeners_count",
                &self.listeners.values().map(Vec::len).sum::<usize>(),
            )
            .field("sinks_count", &self.sinks.len())
            .finish()
    }
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for one kind of event
    pub fn subscribe(
        &mut self,
        kind: EventKind,
        listener: impl EventListener + 'static,
    ) -> ListenerHandle {
        self.next_id += 1;
        let id = self.next_id;
        self.listeners
            .entry(kind)
            .or_default()
            .push((id, Box::new(listener)));
        ListenerHandle { kind, id }
    }

    /// Remove a listener. Returns false if it was already gone.
    pub fn unsubscribe(&mut self, handle: ListenerHandle) -> bool {
        let Some(list) = self.listeners.get_mut(&handle.kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|(id, _)| *id != handle.id);
        list.len() != before
    }

    /// Register an IPC sink
    pub fn add_sink(&mut self, sink: impl IpcSink + 'static) {
        self.sinks.push(Box::new(sink));
    }

    /// Number of listeners for a kind
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.get(&kind).map_or(0, Vec::len)
    }

    /// Deliver a hook event to the listeners of its kind
    pub fn emit(&mut self, event: Event) {
        trace!("Hook event {event:?}");
        let Some(list) = self.listeners.get_mut(&event.kind()) else {
            return;
        };
        list.retain_mut(|(id, listener)| {
            let result = catch_unwind(AssertUnwindSafe(|| listener.on_event(&event)));
            if result.is_err() {
                error!("Listener {id} panicked on {:?}, removing it", event.kind());
                return false;
            }
            true
        });
    }

    /// Broadcast an IPC notification to every sink
    pub fn post(&mut self, event: &str, data: impl Into<String>) {
        let message = IpcMessage::new(event, data);
        trace!("IPC {message}");
        self.sinks.retain_mut(|sink| {
            let result = catch_unwind(AssertUnwindSafe(|| sink.on_message(&message)));
            if result.is_err() {
                error!("IPC sink panicked on '{}', removing it", message.event);
                return false;
            }
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn listeners_only_see_their_kind() {
        let mut bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        bus.subscribe(EventKind::MonitorAdded, move |event: &Event| {
            sink.borrow_mut().push(event.clone())
        });

        bus.emit(Event::MonitorRemoved(MonitorId::new(0)));
        bus.emit(Event::MonitorAdded(MonitorId::new(1)));

        assert_eq!(*seen.borrow(), vec![Event::MonitorAdded(MonitorId::new(1))]);
    }

    #[test]
    fn panicking_listener_is_removed() {
        let mut bus = EventBus::new();
        bus.subscribe(EventKind::Workspace, |_: &Event| panic!("listener bug"));
        let count = Rc::new(RefCell::new(0));
        let counter = count.clone();
        bus.subscribe(EventKind::Workspace, move |_: &Event| {
            *counter.borrow_mut() += 1
        });

        bus.emit(Event::Workspace(WorkspaceId::new(1)));
        assert_eq!(bus.listener_count(EventKind::Workspace), 1);
        bus.emit(Event::Workspace(WorkspaceId::new(2)));
        assert_eq!(*count.borrow(), 2);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut bus = EventBus::new();
        let handle = bus.subscribe(EventKind::ActiveWindow, |_: &Event| {});
        assert!(bus.unsubscribe(handle));
        assert!(!bus.unsubscribe(handle));
        assert_eq!(bus.listener_count(EventKind::ActiveWindow), 0);
    }

    #[test]
    fn ipc_messages_render_with_separator() {
        let mut bus = EventBus::new();
        let lines = Rc::new(RefCell::new(Vec::new()));
        let out = lines.clone();
        bus.add_sink(move |msg: &IpcMessage| out.borrow_mut().push(msg.to_string()));

        bus.post("activewindow", "kitty,~");
        bus.post("activewindowv2", "");
        assert_eq!(
            *lines.borrow(),
            vec!["activewindow>>kitty,~".to_string(), "activewindowv2>>".to_string()]
        );
    }
}

//! Lifecycle notifications of a request object.
//!
//! Notifications are dispatched synchronously: every listener registered for
//! the event runs, in registration order, before `dispatch` returns. A
//! listener receives the object it was registered on as `this`, so it reads
//! fields through the same layer the caller sees.

use crate::xhr::RequestObject;
use parking_lot::RwLock;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Notifications a request object emits during an exchange
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum XhrEvent {
    /// `readyState` changed
    ReadyStateChange,
    /// Transfer started
    LoadStart,
    /// Part of the body arrived
    Progress,
    /// Exchange completed successfully
    Load,
    /// Exchange failed
    Error,
    /// Transfer ended, successfully or not
    LoadEnd,
}

impl XhrEvent {
    pub const ALL: [XhrEvent; 6] = [
        XhrEvent::ReadyStateChange,
        XhrEvent::LoadStart,
        XhrEvent::Progress,
        XhrEvent::Load,
        XhrEvent::Error,
        XhrEvent::LoadEnd,
    ];

    /// DOM event name
    pub fn name(&self) -> &'static str {
        match self {
            XhrEvent::ReadyStateChange => "readystatechange",
            XhrEvent::LoadStart => "loadstart",
            XhrEvent::Progress => "progress",
            XhrEvent::Load => "load",
            XhrEvent::Error => "error",
            XhrEvent::LoadEnd => "loadend",
        }
    }
}

impl Display for XhrEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Callback invoked with the event and the object it was dispatched on.
pub type EventListener = Arc<dyn Fn(XhrEvent, &dyn RequestObject) + Send + Sync>;

/// Wraps a closure into an [`EventListener`].
pub fn listener<F>(f: F) -> EventListener
where
    F: Fn(XhrEvent, &dyn RequestObject) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Listener list of a single request object.
#[derive(Default)]
pub struct EventTarget {
    listeners: RwLock<Vec<(XhrEvent, EventListener)>>,
}

impl EventTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, event: XhrEvent, listener: EventListener) {
        self.listeners.write().push((event, listener));
    }

    /// Runs all listeners for `event`. The list is snapshotted first so
    /// listeners may register further listeners or read the request freely.
    pub fn dispatch(&self, event: XhrEvent, this: &dyn RequestObject) {
        let matching: Vec<EventListener> = self
            .listeners
            .read()
            .iter()
            .filter(|(e, _)| *e == event)
            .map(|(_, l)| l.clone())
            .collect();

        for l in matching {
            l(event, this);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

//! Browser signals the beacon listens to, and the event name each one sends.

use picolytics_core::VisibilityState;

/// Event name sent when the page finishes loading.
pub const LOAD_EVENT: &str = "load";
/// Event name sent on every recurring timer tick after load.
pub const PING_EVENT: &str = "ping";
pub const POPSTATE_EVENT: &str = "popstate";
pub const HASHCHANGE_EVENT: &str = "hashchange";

/// Listener registrations: one DOM event per trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    VisibilityChange,
    PopState,
    HashChange,
    Load,
}

/// Where a trigger's listener is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerTarget {
    Document,
    Window,
}

impl Trigger {
    pub const ALL: [Trigger; 4] = [
        Trigger::VisibilityChange,
        Trigger::PopState,
        Trigger::HashChange,
        Trigger::Load,
    ];

    /// DOM event type to listen for.
    pub fn dom_event(&self) -> &'static str {
        match self {
            Trigger::VisibilityChange => "visibilitychange",
            Trigger::PopState => POPSTATE_EVENT,
            Trigger::HashChange => HASHCHANGE_EVENT,
            Trigger::Load => LOAD_EVENT,
        }
    }

    pub fn target(&self) -> ListenerTarget {
        match self {
            Trigger::VisibilityChange => ListenerTarget::Document,
            Trigger::PopState | Trigger::HashChange | Trigger::Load => ListenerTarget::Window,
        }
    }

    /// The signal this trigger dispatches. Visibility changes carry the
    /// state the host reports when the listener fires.
    pub fn signal(&self, visibility: VisibilityState) -> Signal {
        match self {
            Trigger::VisibilityChange => Signal::VisibilityChange(visibility),
            Trigger::PopState => Signal::PopState,
            Trigger::HashChange => Signal::HashChange,
            Trigger::Load => Signal::Load,
        }
    }
}

/// One occurrence of something that may produce an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    VisibilityChange(VisibilityState),
    PopState,
    HashChange,
    Load,
    /// Recurring timer tick, only after load.
    Ping,
    /// Caller-supplied event name through the exported `pico` hook.
    Manual(String),
}

impl Signal {
    pub fn event_name(&self) -> &str {
        match self {
            Signal::VisibilityChange(state) => state.as_str(),
            Signal::PopState => POPSTATE_EVENT,
            Signal::HashChange => HASHCHANGE_EVENT,
            Signal::Load => LOAD_EVENT,
            Signal::Ping => PING_EVENT,
            Signal::Manual(name) => name,
        }
    }
}

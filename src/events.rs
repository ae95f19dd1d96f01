//! Session Event Bus
//!
//! Components announce what happened instead of calling each other: the
//! action dispatcher requests refreshes, the session reports loads, and the
//! UI layer listens for user-facing notices. Uses a tokio broadcast channel
//! so any number of subscribers see every event.

use tokio::sync::broadcast;

/// Default capacity of the broadcast channel
pub const DEFAULT_CAPACITY: usize = 256;

/// A non-fatal message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }

    /// Text as shown to the user
    pub fn text(&self) -> String {
        match self {
            Notice::Success(message) => message.clone(),
            Notice::Error(message) => format!("❌ Error: {}", message),
        }
    }
}

/// View that should be fetched again
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RefreshTarget {
    Dashboard,
    Module(String),
}

/// Everything published on the bus
#[derive(Debug, Clone, PartialEq)]
pub enum SuiteEvent {
    /// Registry loaded with this many modules
    ModulesLoaded(usize),
    /// Dashboard loaded with this many cards
    DashboardLoaded(usize),
    /// Module view rendered into the content panel
    ModuleRendered(String),
    Notice(Notice),
    RefreshRequested(RefreshTarget),
}

/// Broadcast bus for [`SuiteEvent`]s
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SuiteEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SuiteEvent> {
        self.sender.subscribe()
    }

    /// Publish an event. Returns the number of subscribers that received it;
    /// publishing with no subscribers is not an error.
    pub fn publish(&self, event: SuiteEvent) -> usize {
        tracing::trace!(?event, "Publishing session event");
        self.sender.send(event).unwrap_or(0)
    }

    pub fn notify(&self, notice: Notice) -> usize {
        self.publish(SuiteEvent::Notice(notice))
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Drain every event currently buffered in `receiver`. Lagged events are
/// skipped with a warning.
pub fn drain(receiver: &mut broadcast::Receiver<SuiteEvent>) -> Vec<SuiteEvent> {
    let mut events = Vec::new();
    loop {
        match receiver.try_recv() {
            Ok(event) => events.push(event),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Event subscriber lagged");
            }
            Err(_) => break,
        }
    }
    events
}

//! # Runtime events emitted by the supervisor, reconciler and finish notifier.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Lifecycle events**: subsystem start/stop
//! - **Session events**: a session started, was replaced, was asked to stop, terminated
//! - **Diagnostics**: rejected requests, ignored stale exits, subscriber trouble
//!
//! [`EventKind::SessionTerminated`] is the termination announcement: it is
//! published exactly once per exit of a currently-registered process.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use shellvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::SessionTerminated)
//!     .with_session("term-42")
//!     .with_serial(7)
//!     .with_exit_code(Some(0));
//!
//! assert_eq!(ev.kind, EventKind::SessionTerminated);
//! assert_eq!(ev.session.as_deref(), Some("term-42"));
//! assert_eq!(ev.exit_code, Some(0));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subsystem lifecycle ===
    /// Supervisor started consuming its feeds.
    SupervisorStarted,

    /// Supervisor stopped consuming its feeds and asked every session to stop.
    SupervisorStopped,

    // === Session events ===
    /// A process was launched and registered for an identifier that had none.
    ///
    /// Sets `session`, `serial`.
    SessionStarted,

    /// A process was launched and registered in place of a previous one.
    ///
    /// Sets `session`, `serial` (new process), `reason` (previous serial).
    SessionReplaced,

    /// Termination was requested for the live process of an identifier.
    ///
    /// Sets `session`, `serial`.
    SessionStopRequested,

    /// The registered process exited and its entry was removed.
    ///
    /// Sets `session`, `serial`, `exit_code` (if the backend knows it).
    SessionTerminated,

    /// A process that is no longer registered exited; nothing was changed.
    ///
    /// Sets `session`, `serial`, `exit_code`.
    StaleFinishIgnored,

    // === Request diagnostics ===
    /// A request was dropped at the feed boundary.
    ///
    /// Sets `reason` (error label + message), `session` when known.
    RequestRejected,

    // === Subscriber events ===
    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets `session` (subscriber name), `reason`.
    SubscriberOverflow,

    /// Subscriber panicked during event processing.
    ///
    /// Sets `session` (subscriber name), `reason` (panic message).
    SubscriberPanicked,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Session identifier (or subscriber name for subscriber events).
    pub session: Option<Arc<str>>,
    /// Serial of the process handle the event refers to.
    pub serial: Option<u64>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Exit code of a finished process, if known.
    pub exit_code: Option<i32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            session: None,
            serial: None,
            reason: None,
            exit_code: None,
        }
    }

    /// Attaches a session identifier.
    #[inline]
    pub fn with_session(mut self, id: impl Into<Arc<str>>) -> Self {
        self.session = Some(id.into());
        self
    }

    /// Attaches a handle serial.
    #[inline]
    pub fn with_serial(mut self, serial: u64) -> Self {
        self.serial = Some(serial);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a process exit code.
    #[inline]
    pub fn with_exit_code(mut self, code: Option<i32>) -> Self {
        self.exit_code = code;
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_session(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_session(subscriber)
            .with_reason(info)
    }

    /// True for the termination announcement of `id`.
    #[inline]
    pub fn is_termination_of(&self, id: &str) -> bool {
        self.kind == EventKind::SessionTerminated && self.session.as_deref() == Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_is_monotonic() {
        let a = Event::new(EventKind::SupervisorStarted);
        let b = Event::new(EventKind::SupervisorStopped);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_termination_match() {
        let ev = Event::new(EventKind::SessionTerminated).with_session("a");
        assert!(ev.is_termination_of("a"));
        assert!(!ev.is_termination_of("b"));
        assert!(!Event::new(EventKind::SessionStarted)
            .with_session("a")
            .is_termination_of("a"));
    }
}

//! # LogWriter: event logger
//!
//! A subscriber that renders every [`Event`] through `tracing`, one line per
//! event, at a level matching its severity.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! INFO  session started session="term-1" serial=3
//! INFO  session replaced session="term-1" serial=4 previous=3
//! INFO  stop requested session="term-1" serial=4
//! INFO  session terminated session="term-1" serial=4 exit_code=Some(0)
//! DEBUG stale exit ignored session="term-1" serial=3
//! WARN  request rejected session=None reason="request_protocol: protocol: missing id"
//! ```

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let session = e.session.as_deref().unwrap_or("-");
        match e.kind {
            EventKind::SupervisorStarted => info!("supervisor started"),
            EventKind::SupervisorStopped => info!("supervisor stopped"),
            EventKind::SessionStarted => {
                info!(session, serial = ?e.serial, "session started");
            }
            EventKind::SessionReplaced => {
                info!(session, serial = ?e.serial, previous = ?e.reason, "session replaced");
            }
            EventKind::SessionStopRequested => {
                info!(session, serial = ?e.serial, "stop requested");
            }
            EventKind::SessionTerminated => {
                info!(session, serial = ?e.serial, exit_code = ?e.exit_code, "session terminated");
            }
            EventKind::StaleFinishIgnored => {
                debug!(session, serial = ?e.serial, exit_code = ?e.exit_code, "stale exit ignored");
            }
            EventKind::RequestRejected => {
                warn!(session = ?e.session, reason = ?e.reason, "request rejected");
            }
            EventKind::SubscriberOverflow => {
                warn!(subscriber = session, reason = ?e.reason, "subscriber overflow");
            }
            EventKind::SubscriberPanicked => {
                error!(subscriber = session, info = ?e.reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

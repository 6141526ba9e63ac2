//! # Reconciler: start/stop requests → registry mutations.
//!
//! ## Start
//! ```text
//! handle_start(req)
//!   ├─ id empty?                      → Err(Protocol)
//!   ├─ registry.remove(id) = old?     → old.on_finish(detached) ; old.stop()     (no wait)
//!   ├─ new = factory.create() ; new.on_finish(notifier.hook)
//!   ├─ new.start(req) fails?          → new.on_finish(detached) ; Err(Start)     (registry untouched)
//!   ├─ registry.insert(new) = raced?  → raced.on_finish(detached) ; raced.stop() ; Replaced
//!   └─ new already exited?            → notifier.reap(new)
//! ```
//!
//! ## Stop
//! ```text
//! handle_stop(req)
//!   ├─ nothing registered             → NotRunning
//!   └─ live.stop()                    → Requested   (removal happens on exit)
//! ```
//!
//! ## Feed boundary
//! [`Reconciler::on_start_payload`] / [`Reconciler::on_stop_payload`] parse raw
//! payloads and swallow every error after logging it and publishing
//! `RequestRejected`; one bad message never stops the feed.

use std::sync::Arc;

use tracing::{debug, error, info};

use super::notifier::FinishNotifier;
use super::registry::{Registry, Session};
use crate::error::RequestError;
use crate::events::{Bus, Event, EventKind};
use crate::process::ProcessFactory;
use crate::requests::{StartRequest, StopRequest, parse_start, parse_stop};

/// Result of a successful start request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// No process was registered for the identifier.
    Started { serial: u64 },
    /// A previous process was detached and asked to stop.
    Replaced { serial: u64, previous: u64 },
}

impl StartOutcome {
    /// Serial of the newly registered process.
    pub fn serial(&self) -> u64 {
        match *self {
            StartOutcome::Started { serial } | StartOutcome::Replaced { serial, .. } => serial,
        }
    }
}

/// Result of a stop request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// Termination was requested for the live process.
    Requested { serial: u64 },
    /// Nothing registered for the identifier; no-op.
    NotRunning,
}

/// Applies start/stop requests to the [`Registry`].
pub struct Reconciler {
    registry: Arc<Registry>,
    notifier: Arc<FinishNotifier>,
    factory: Arc<dyn ProcessFactory>,
    bus: Bus,
}

impl Reconciler {
    pub fn new(
        registry: Arc<Registry>,
        notifier: Arc<FinishNotifier>,
        factory: Arc<dyn ProcessFactory>,
        bus: Bus,
    ) -> Self {
        Self {
            registry,
            notifier,
            factory,
            bus,
        }
    }

    /// Starts (or replaces) the process for `req.id`.
    pub async fn handle_start(&self, req: StartRequest) -> Result<StartOutcome, RequestError> {
        if req.id.is_empty() {
            return Err(RequestError::Protocol {
                reason: "missing id",
            });
        }

        let previous = self.registry.remove(&req.id).await;
        if let Some(old) = &previous {
            self.retire(old);
        }

        let session = Session::new(req.id.as_str(), self.factory.create());
        session.handle().on_finish(self.notifier.hook(&session));

        if let Err(source) = session.handle().start(&req).await {
            session
                .handle()
                .on_finish(self.notifier.detached_hook(&session));
            return Err(RequestError::Start { id: req.id, source });
        }

        // A concurrent start for the same id may have registered in the meantime;
        // it is displaced like any previous session and reported as such.
        let raced = self.registry.insert(Arc::clone(&session)).await;
        if let Some(raced) = &raced {
            debug!(
                session = %req.id,
                serial = raced.serial(),
                "concurrent start displaced a fresh process"
            );
            self.retire(raced);
        }

        let outcome = match raced.or(previous) {
            Some(old) => {
                self.bus.publish(
                    Event::new(EventKind::SessionReplaced)
                        .with_session(session.id_arc())
                        .with_serial(session.serial())
                        .with_reason(format!("previous={}", old.serial())),
                );
                StartOutcome::Replaced {
                    serial: session.serial(),
                    previous: old.serial(),
                }
            }
            None => {
                self.bus.publish(
                    Event::new(EventKind::SessionStarted)
                        .with_session(session.id_arc())
                        .with_serial(session.serial()),
                );
                StartOutcome::Started {
                    serial: session.serial(),
                }
            }
        };

        // Exited before the insert landed: the finish hook found nothing to remove.
        if session.has_exited() {
            self.notifier.reap(&session).await;
        }
        Ok(outcome)
    }

    /// Requests termination of the live process for `req.id`, if any.
    pub async fn handle_stop(&self, req: StopRequest) -> StopOutcome {
        let Some(live) = self.registry.lookup(&req.id).await else {
            return StopOutcome::NotRunning;
        };

        live.handle().stop();
        self.bus.publish(
            Event::new(EventKind::SessionStopRequested)
                .with_session(live.id_arc())
                .with_serial(live.serial()),
        );
        StopOutcome::Requested {
            serial: live.serial(),
        }
    }

    /// Feed boundary for start payloads.
    pub async fn on_start_payload(&self, payload: &[u8]) {
        let result = match parse_start(payload) {
            Ok(req) => self.handle_start(req).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(outcome) => debug!(?outcome, "start request handled"),
            Err(e) => self.reject(&e, payload),
        }
    }

    /// Feed boundary for stop payloads.
    pub async fn on_stop_payload(&self, payload: &[u8]) {
        match parse_stop(payload) {
            Ok(Some(req)) => {
                let outcome = self.handle_stop(req).await;
                debug!(?outcome, "stop request handled");
            }
            Ok(None) => debug!("stop request without id ignored"),
            Err(e) => self.reject(&e, payload),
        }
    }

    /// Rebinds the finish hook of a detached session to the logging sink and stops it.
    fn retire(&self, old: &Session) {
        old.handle().on_finish(self.notifier.detached_hook(old));
        old.handle().stop();
        info!(session = old.id(), serial = old.serial(), "stopping superseded process");
    }

    fn reject(&self, err: &RequestError, payload: &[u8]) {
        error!(
            label = err.as_label(),
            error = %err,
            payload = %String::from_utf8_lossy(payload),
            "request dropped"
        );
        let mut ev = Event::new(EventKind::RequestRejected)
            .with_reason(format!("{}: {}", err.as_label(), err.as_message()));
        if let Some(id) = err.session() {
            ev = ev.with_session(id);
        }
        self.bus.publish(ev);
    }
}

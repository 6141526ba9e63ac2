//! # SubscriberSet: per-subscriber delivery lanes.
//!
//! Every subscriber gets its own bounded lane and a worker task draining it, so
//! a slow [`Subscribe::on_event`] only ever delays itself.
//!
//! ```text
//! emit(event) ──try_send──► lane "log"     ──► worker ──► LogWriter::on_event
//!             ──try_send──► lane "audit"   ──► worker ──► Audit::on_event
//!                             │ full/closed                 │ panic
//!                             ▼                             ▼
//!                    Bus(SubscriberOverflow)       Bus(SubscriberPanicked)
//! ```
//!
//! A full lane drops the event for that subscriber only. Workers end once the
//! set is dropped and their lane drains.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc;

use crate::events::{Bus, Event, EventKind};
use crate::subscribers::Subscribe;

struct Lane {
    name: &'static str,
    tx: mpsc::Sender<Arc<Event>>,
}

/// Fan-out of bus events to subscribers.
pub struct SubscriberSet {
    lanes: Vec<Lane>,
    bus: Bus,
}

impl SubscriberSet {
    /// Spawns one worker per subscriber. Must be called inside a tokio runtime.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let lanes = subs
            .into_iter()
            .map(|sub| {
                let (tx, rx) = mpsc::channel(sub.queue_capacity().max(1));
                let name = sub.name();
                tokio::spawn(drain(sub, rx, bus.clone()));
                Lane { name, tx }
            })
            .collect();
        Self { lanes, bus }
    }

    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// Queues `event` on every lane without waiting.
    pub fn emit(&self, event: &Event) {
        let event = Arc::new(event.clone());
        // An overflow notice that overflows itself is not reported again.
        let report = event.kind != EventKind::SubscriberOverflow;

        for lane in &self.lanes {
            let reason = match lane.tx.try_send(Arc::clone(&event)) {
                Ok(()) => continue,
                Err(mpsc::error::TrySendError::Full(_)) => "full",
                Err(mpsc::error::TrySendError::Closed(_)) => "closed",
            };
            if report {
                self.bus.publish(Event::subscriber_overflow(lane.name, reason));
            }
        }
    }
}

/// Worker loop of one lane; a panicking handler is reported and the loop goes on.
async fn drain(sub: Arc<dyn Subscribe>, mut rx: mpsc::Receiver<Arc<Event>>, bus: Bus) {
    while let Some(event) = rx.recv().await {
        let handled = AssertUnwindSafe(sub.on_event(&event)).catch_unwind().await;
        if let Err(panic) = handled {
            bus.publish(Event::subscriber_panicked(sub.name(), panic_message(&*panic)));
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

//! # LocalBroker: in-process stand-in for the message broker.
//!
//! Provides the three channels a deployment gets from its broker:
//! ```text
//! publish_start ──► [<root>.start   work queue] ──► exactly one Supervisor
//! publish_stop  ──► [<root>.stop    fanout    ] ──► every Supervisor
//! announcer()   ──► [<root>.stopped fanout    ] ──► announcements()
//! ```
//! Several supervisors built on one broker behave like several daemons
//! attached to the same exchange: any of them may pick up a start, and a stop
//! reaches whichever one owns the process.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tracing::warn;

use super::announce::AnnounceForwarder;
use super::feeds::{Feeds, Payload, WorkQueue};
use crate::config::SupervisorConfig;
use crate::requests::{StartRequest, StopRequest};

/// In-process broker with a start work queue and stop/announce fanouts.
#[derive(Clone, Debug)]
pub struct LocalBroker {
    start_queue: String,
    start_tx: mpsc::Sender<Payload>,
    start_rx: WorkQueue,
    stop_tx: broadcast::Sender<Payload>,
    announce_tx: broadcast::Sender<Payload>,
}

impl LocalBroker {
    /// Creates the channels sized by [`SupervisorConfig::feed_capacity_clamped`].
    pub fn new(cfg: &SupervisorConfig) -> Self {
        let cap = cfg.feed_capacity_clamped();
        let (start_tx, start_rx) = mpsc::channel(cap);
        let (stop_tx, _) = broadcast::channel(cap);
        let (announce_tx, _) = broadcast::channel(cap);
        Self {
            start_queue: cfg.start_queue(),
            start_tx,
            start_rx: WorkQueue::new(start_rx),
            stop_tx,
            announce_tx,
        }
    }

    /// Feeds for one supervisor instance (shared start queue, own stop subscription).
    pub fn feeds(&self) -> Feeds {
        Feeds::new(self.start_rx.clone(), self.stop_tx.subscribe())
    }

    /// Announcement sink publishing on this broker's `<root>.stopped` fanout.
    pub fn announcer(&self) -> Arc<AnnounceForwarder> {
        Arc::new(AnnounceForwarder::new(self.announce_tx.clone()))
    }

    /// Subscribes to termination announcements.
    pub fn announcements(&self) -> broadcast::Receiver<Payload> {
        self.announce_tx.subscribe()
    }

    /// Enqueues a raw start payload; waits while the queue is full.
    pub async fn publish_start_raw(&self, payload: Payload) {
        if self.start_tx.send(payload).await.is_err() {
            warn!(queue = %self.start_queue, "start queue closed; payload dropped");
        }
    }

    pub async fn publish_start(&self, req: &StartRequest) {
        self.publish_start_raw(req.to_payload()).await;
    }

    /// Broadcasts a raw stop payload. Returns how many instances received it.
    pub fn publish_stop_raw(&self, payload: Payload) -> usize {
        self.stop_tx.send(payload).unwrap_or(0)
    }

    pub fn publish_stop(&self, req: &StopRequest) -> usize {
        self.publish_stop_raw(req.to_payload())
    }
}

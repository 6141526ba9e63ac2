//! # Inbound feeds consumed by the supervisor.
//!
//! ```text
//! start feed: WorkQueue      (each payload → exactly one consumer; shared mpsc receiver)
//! stop feed:  broadcast::Rx  (each payload → every running instance)
//! ```

use std::sync::Arc;

use tokio::sync::{Mutex, broadcast, mpsc};

/// Raw message body as delivered by the transport.
pub type Payload = Vec<u8>;

/// Competing-consumer handle over a start-request queue.
///
/// Clones share one receiver, so every payload is delivered to exactly one of
/// them.
#[derive(Clone, Debug)]
pub struct WorkQueue {
    rx: Arc<Mutex<mpsc::Receiver<Payload>>>,
}

impl WorkQueue {
    pub fn new(rx: mpsc::Receiver<Payload>) -> Self {
        Self {
            rx: Arc::new(Mutex::new(rx)),
        }
    }

    /// Waits for the next payload; `None` once every sender is gone.
    pub async fn next(&self) -> Option<Payload> {
        self.rx.lock().await.recv().await
    }
}

/// The two inbound feeds one supervisor instance consumes.
#[derive(Debug)]
pub struct Feeds {
    /// Start requests (work queue).
    pub start: WorkQueue,
    /// Stop requests (this instance's broadcast subscription).
    pub stop: broadcast::Receiver<Payload>,
}

impl Feeds {
    pub fn new(start: WorkQueue, stop: broadcast::Receiver<Payload>) -> Self {
        Self { start, stop }
    }
}

//! # Termination announcements.
//!
//! [`Announce`] is the outbound seam the finish notifier calls directly, once
//! per reaped session, right after the registry entry is removed. It does not
//! go through the event bus: bus subscribers may lag and skip events, an
//! announcement must not be skipped.
//!
//! [`AnnounceForwarder`] publishes each [`Termination`] as a JSON payload on a
//! broadcast channel (the `<root>.stopped` fanout of a [`LocalBroker`](crate::LocalBroker)).

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::trace;

use super::feeds::Payload;
use crate::requests::Termination;

/// Outbound sink for termination announcements.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use shellvisor::{Announce, Termination};
///
/// struct Stdout;
///
/// #[async_trait]
/// impl Announce for Stdout {
///     async fn announce(&self, termination: Termination) {
///         println!("{} is gone", termination.id);
///     }
/// }
/// ```
#[async_trait]
pub trait Announce: Send + Sync + 'static {
    /// Publishes that the process for `termination.id` terminated.
    async fn announce(&self, termination: Termination);
}

/// Publishes announcements onto a broadcast channel.
pub struct AnnounceForwarder {
    tx: broadcast::Sender<Payload>,
}

impl AnnounceForwarder {
    pub fn new(tx: broadcast::Sender<Payload>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl Announce for AnnounceForwarder {
    async fn announce(&self, termination: Termination) {
        if self.tx.send(termination.to_payload()).is_err() {
            trace!(session = %termination.id, "no announcement listeners");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_forwarder_publishes_json_payload() {
        let (tx, mut rx) = broadcast::channel(8);
        let fwd = AnnounceForwarder::new(tx);

        fwd.announce(Termination { id: "a".into() }).await;

        let payload = rx.recv().await.unwrap();
        let ann: Termination = serde_json::from_slice(&payload).unwrap();
        assert_eq!(ann.id, "a");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_forwarder_without_listeners_is_silent() {
        let (tx, rx) = broadcast::channel(8);
        drop(rx);
        AnnounceForwarder::new(tx)
            .announce(Termination { id: "a".into() })
            .await;
    }
}

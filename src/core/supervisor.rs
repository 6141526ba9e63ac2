//! # Supervisor: composition root and subsystem lifecycle.
//!
//! The [`Supervisor`] owns the event bus, the [`SubscriberSet`], the
//! [`Registry`] and the [`Reconciler`]. It wires the two inbound feeds to the
//! reconciler and owns the start/stop lifecycle of the whole subsystem (not of
//! individual processes).
//!
//! ## High-level architecture
//! ```text
//! start(feeds):
//!   feeds.start (work queue) ──► start_feed loop ──► Reconciler::on_start_payload
//!   feeds.stop  (broadcast)  ──► stop_feed loop  ──► Reconciler::on_stop_payload
//!
//! process exit ──► FinishNotifier ──► Registry::remove_if ──┬──► Announce (direct, never skipped)
//!                                                            └──► Bus(SessionTerminated)
//!
//! Bus ──► subscriber_listener ──► SubscriberSet ──► LogWriter / custom subscribers
//!
//! stop():
//!   runtime token cancel ──► feed loops exit ──► join
//!   every registered handle ──► stop()   (best-effort, no wait)
//! ```
//!
//! ## States
//! `stopped ──start──► started ──stop──► stopped`. Calling `start` twice or
//! `stop` while stopped is logged and reported as a [`SupervisorError`], never fatal.

use std::sync::Arc;

use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::reconciler::Reconciler;
use super::registry::Registry;
use super::shutdown;
use crate::config::SupervisorConfig;
use crate::error::SupervisorError;
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::SubscriberSet;
use crate::transport::{Feeds, WorkQueue};

/// Feed loops of a started supervisor.
struct Running {
    token: CancellationToken,
    feeds: JoinSet<()>,
}

/// Coordinates feeds, the registry and event delivery.
pub struct Supervisor {
    cfg: SupervisorConfig,
    bus: Bus,
    subs: Arc<SubscriberSet>,
    registry: Arc<Registry>,
    reconciler: Arc<Reconciler>,
    running: Mutex<Option<Running>>,
}

impl Supervisor {
    /// Creates a builder; see [`SupervisorBuilder`](crate::SupervisorBuilder).
    pub fn builder(
        cfg: SupervisorConfig,
        factory: Arc<dyn crate::process::ProcessFactory>,
    ) -> super::builder::SupervisorBuilder {
        super::builder::SupervisorBuilder::new(cfg, factory)
    }

    pub(super) fn new_internal(
        cfg: SupervisorConfig,
        bus: Bus,
        subs: Arc<SubscriberSet>,
        registry: Arc<Registry>,
        reconciler: Arc<Reconciler>,
    ) -> Self {
        Self {
            cfg,
            bus,
            subs,
            registry,
            reconciler,
            running: Mutex::new(None),
        }
    }

    /// Starts consuming `feeds`.
    ///
    /// Returns [`SupervisorError::AlreadyStarted`] (and leaves the running
    /// feeds untouched) if already started.
    pub async fn start(&self, feeds: Feeds) -> Result<(), SupervisorError> {
        let mut running = self.running.lock().await;
        if running.is_some() {
            error!("supervisor already started");
            return Err(SupervisorError::AlreadyStarted);
        }

        let token = CancellationToken::new();
        let mut set = JoinSet::new();
        set.spawn(start_feed(
            self.cfg.start_queue(),
            feeds.start,
            Arc::clone(&self.reconciler),
            token.clone(),
        ));
        set.spawn(stop_feed(
            self.cfg.stop_exchange(),
            feeds.stop,
            Arc::clone(&self.reconciler),
            token.clone(),
        ));
        *running = Some(Running { token, feeds: set });

        info!(service = %self.cfg.root_service, "supervisor started");
        self.bus.publish(Event::new(EventKind::SupervisorStarted));
        Ok(())
    }

    /// Stops consuming feeds and asks every registered process to stop.
    ///
    /// Does not wait for the processes to exit; their finish notifications
    /// clean up the registry and announce the terminations.
    pub async fn stop(&self) -> Result<(), SupervisorError> {
        let Some(mut running) = self.running.lock().await.take() else {
            error!("supervisor is not started");
            return Err(SupervisorError::NotStarted);
        };

        running.token.cancel();
        while let Some(res) = running.feeds.join_next().await {
            if let Err(e) = res {
                warn!(error = %e, "feed loop ended abnormally");
            }
        }

        let sessions = self.registry.snapshot().await;
        for session in &sessions {
            session.handle().stop();
        }

        info!(stopped = sessions.len(), "supervisor stopped");
        self.bus.publish(Event::new(EventKind::SupervisorStopped));
        Ok(())
    }

    /// Starts, waits for a termination signal, then stops.
    pub async fn run_until_signal(&self, feeds: Feeds) -> Result<(), SupervisorError> {
        self.start(feeds).await?;
        if let Err(e) = shutdown::wait_for_shutdown_signal().await {
            warn!(error = %e, "signal handler unavailable; stopping");
        }
        self.stop().await
    }

    /// Subscribes to the subscriber fan-out: spawns the listener that forwards
    /// bus events to the [`SubscriberSet`].
    pub(super) fn subscriber_listener(&self) {
        if self.subs.is_empty() {
            return;
        }
        let mut rx = self.bus.subscribe();
        let set = Arc::clone(&self.subs);
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => set.emit(&ev),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "subscriber listener lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }

    /// True between a successful `start` and the matching `stop`.
    pub async fn is_started(&self) -> bool {
        self.running.lock().await.is_some()
    }

    /// Sorted identifiers with a live process.
    pub async fn sessions(&self) -> Vec<String> {
        self.registry.list().await
    }

    /// Receiver for every subsequent runtime event.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Direct access to request handling, bypassing the feeds.
    pub fn reconciler(&self) -> &Arc<Reconciler> {
        &self.reconciler
    }
}

/// Consumes the start work queue until cancelled or closed.
async fn start_feed(
    queue: String,
    feed: WorkQueue,
    reconciler: Arc<Reconciler>,
    token: CancellationToken,
) {
    debug!(%queue, "start feed consuming");
    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            msg = feed.next() => match msg {
                Some(payload) => {
                    debug!(%queue, payload = %String::from_utf8_lossy(&payload), "start request");
                    reconciler.on_start_payload(&payload).await;
                }
                None => {
                    warn!(%queue, "start feed closed");
                    break;
                }
            }
        }
    }
}

/// Consumes this instance's stop subscription until cancelled or closed.
async fn stop_feed(
    exchange: String,
    mut feed: broadcast::Receiver<Vec<u8>>,
    reconciler: Arc<Reconciler>,
    token: CancellationToken,
) {
    debug!(%exchange, "stop feed consuming");
    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            msg = feed.recv() => match msg {
                Ok(payload) => {
                    debug!(%exchange, payload = %String::from_utf8_lossy(&payload), "stop request");
                    reconciler.on_stop_payload(&payload).await;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(%exchange, skipped = n, "stop feed lagged; requests lost");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    warn!(%exchange, "stop feed closed");
                    break;
                }
            }
        }
    }
}

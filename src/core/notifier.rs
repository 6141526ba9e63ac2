//! # FinishNotifier: reacts to process exits.
//!
//! Builds the finish hooks bound to every process handle:
//! - [`FinishNotifier::hook`] for a live session: compare-and-remove from the
//!   registry, then announce the termination;
//! - [`FinishNotifier::detached_hook`] for a superseded session: log only.
//!
//! ## Announcement rule
//! ```text
//! exit(session) ──► mark exited ──► registry.remove_if(id, serial)
//!                                      ├─ Some ─► Announce::announce  (exactly once)
//!                                      │          + SessionTerminated on the bus
//!                                      └─ None ─► nothing (stale, or not inserted yet)
//! ```
//! The announcement goes straight to the [`Announce`] sink; the bus event is
//! diagnostics only and may be skipped by lagging subscribers.
//!
//! The "not inserted yet" case is settled by the reconciler, which reaps the
//! session right after inserting it if it already exited.

use std::sync::{Arc, Weak};

use futures::FutureExt;
use tracing::debug;

use super::registry::{Registry, Session};
use crate::events::{Bus, Event, EventKind};
use crate::process::{ExitInfo, FinishHook};
use crate::requests::Termination;
use crate::transport::Announce;

/// Turns process exits into registry cleanup and termination announcements.
pub struct FinishNotifier {
    registry: Arc<Registry>,
    bus: Bus,
    announcer: Option<Arc<dyn Announce>>,
}

impl FinishNotifier {
    /// Creates a notifier; without an `announcer` terminations are only
    /// published on the bus.
    pub fn new(
        registry: Arc<Registry>,
        bus: Bus,
        announcer: Option<Arc<dyn Announce>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            registry,
            bus,
            announcer,
        })
    }

    /// Hook for a session that is (or is about to be) registered.
    ///
    /// Holds the session weakly so the handle → hook → session chain does not
    /// keep a dropped session alive.
    pub fn hook(self: &Arc<Self>, session: &Arc<Session>) -> FinishHook {
        let notifier = Arc::clone(self);
        let session: Weak<Session> = Arc::downgrade(session);
        Box::new(move |exit| {
            async move {
                match session.upgrade() {
                    Some(session) => {
                        notifier.on_finish(&session, exit).await;
                    }
                    None => debug!(?exit, "exit of a dropped session"),
                }
            }
            .boxed()
        })
    }

    /// Logging sink for a session that was detached from the registry.
    pub fn detached_hook(&self, session: &Session) -> FinishHook {
        let bus = self.bus.clone();
        let id = session.id_arc();
        let serial = session.serial();
        Box::new(move |exit| {
            async move {
                debug!(session = %id, serial, ?exit, "ignored exit of superseded process");
                bus.publish(
                    Event::new(EventKind::StaleFinishIgnored)
                        .with_session(id)
                        .with_serial(serial)
                        .with_exit_code(exit.code),
                );
            }
            .boxed()
        })
    }

    /// Handles the exit of `session`. Returns `true` if it was announced.
    pub async fn on_finish(&self, session: &Session, exit: ExitInfo) -> bool {
        session.mark_exited(exit);
        let announced = self.reap(session).await;
        if !announced {
            debug!(
                session = session.id(),
                serial = session.serial(),
                "exit of unregistered process; nothing to clean up"
            );
        }
        announced
    }

    /// Removes an exited session if it is still the registered one and
    /// announces its termination.
    pub(crate) async fn reap(&self, session: &Session) -> bool {
        if self
            .registry
            .remove_if(session.id(), session.serial())
            .await
            .is_none()
        {
            return false;
        }

        if let Some(announcer) = &self.announcer {
            announcer
                .announce(Termination {
                    id: session.id().to_string(),
                })
                .await;
        }

        let code = session.exit().and_then(|e| e.code);
        self.bus.publish(
            Event::new(EventKind::SessionTerminated)
                .with_session(session.id_arc())
                .with_serial(session.serial())
                .with_exit_code(code),
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::process::ProcessHandle;
    use crate::process::mock::MockProcess;

    #[derive(Default)]
    struct Recorded(Mutex<Vec<String>>);

    #[async_trait]
    impl Announce for Recorded {
        async fn announce(&self, termination: Termination) {
            self.0.lock().unwrap().push(termination.id);
        }
    }

    impl Recorded {
        fn ids(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    fn setup_with(bus_capacity: usize) -> (Arc<Registry>, Bus, Arc<FinishNotifier>, Arc<Recorded>) {
        let registry = Registry::new();
        let bus = Bus::new(bus_capacity);
        let recorded = Arc::new(Recorded::default());
        let announcer: Arc<dyn Announce> = recorded.clone();
        let notifier = FinishNotifier::new(Arc::clone(&registry), bus.clone(), Some(announcer));
        (registry, bus, notifier, recorded)
    }

    fn setup() -> (Arc<Registry>, Bus, Arc<FinishNotifier>) {
        let (registry, bus, notifier, _) = setup_with(64);
        (registry, bus, notifier)
    }

    fn drain(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<Event> {
        std::iter::from_fn(|| rx.try_recv().ok()).collect()
    }

    #[tokio::test]
    async fn test_registered_exit_is_announced_once() {
        let (registry, bus, notifier) = setup();
        let mut rx = bus.subscribe();
        let handle = MockProcess::new(false, false);
        let session = Session::new("a", handle.clone());
        handle.on_finish(notifier.hook(&session));
        registry.insert(Arc::clone(&session)).await;

        assert!(handle.exit(0).await);
        assert!(!handle.exit(0).await);

        assert!(registry.lookup("a").await.is_none());
        let terminated: Vec<_> = drain(&mut rx)
            .into_iter()
            .filter(|e| e.is_termination_of("a"))
            .collect();
        assert_eq!(terminated.len(), 1);
        assert_eq!(terminated[0].serial, Some(session.serial()));
        assert_eq!(terminated[0].exit_code, Some(0));
    }

    #[tokio::test]
    async fn test_exit_of_superseded_session_leaves_successor() {
        let (registry, bus, notifier) = setup();
        let mut rx = bus.subscribe();
        let old = Session::new("a", MockProcess::new(false, false));
        let new = Session::new("a", MockProcess::new(false, false));
        registry.insert(Arc::clone(&new)).await;

        assert!(!notifier.on_finish(&old, ExitInfo::default()).await);

        assert_eq!(registry.lookup("a").await.unwrap().serial(), new.serial());
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_detached_hook_only_logs() {
        let (registry, bus, notifier) = setup();
        let mut rx = bus.subscribe();
        let handle = MockProcess::new(false, false);
        let session = Session::new("a", handle.clone());
        registry.insert(Arc::clone(&session)).await;
        handle.on_finish(notifier.detached_hook(&session));

        handle.exit(9).await;

        assert!(registry.lookup("a").await.is_some());
        let kinds: Vec<_> = drain(&mut rx).into_iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EventKind::StaleFinishIgnored]);
    }

    #[tokio::test]
    async fn test_exit_burst_larger_than_bus_is_fully_announced() {
        let (registry, bus, notifier, recorded) = setup_with(2);
        // A receiver that never reads lags as soon as the burst exceeds the bus.
        let _lagging = bus.subscribe();

        let mut handles = Vec::new();
        for i in 0..10 {
            let handle = MockProcess::new(false, false);
            let session = Session::new(format!("s{i}"), handle.clone());
            handle.on_finish(notifier.hook(&session));
            registry.insert(session).await;
            handles.push(handle);
        }
        for handle in &handles {
            assert!(handle.exit(0).await);
        }

        assert!(registry.is_empty().await);
        let mut ids = recorded.ids();
        ids.sort_unstable();
        let mut expected: Vec<String> = (0..10).map(|i| format!("s{i}")).collect();
        expected.sort_unstable();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn test_stale_exit_is_not_announced() {
        let (registry, _bus, notifier, recorded) = setup_with(8);
        let old = Session::new("a", MockProcess::new(false, false));
        let new = Session::new("a", MockProcess::new(false, false));
        registry.insert(Arc::clone(&new)).await;

        notifier.on_finish(&old, ExitInfo::default()).await;
        notifier.on_finish(&new, ExitInfo::default()).await;
        notifier.on_finish(&new, ExitInfo::default()).await;

        assert_eq!(recorded.ids(), vec!["a".to_string()]);
    }
}

use std::sync::Arc;

use super::{
    notifier::FinishNotifier, reconciler::Reconciler, registry::Registry, supervisor::Supervisor,
};
use crate::{
    config::SupervisorConfig,
    events::Bus,
    process::ProcessFactory,
    subscribers::{Subscribe, SubscriberSet},
    transport::Announce,
};

/// Builder for constructing a [`Supervisor`].
pub struct SupervisorBuilder {
    cfg: SupervisorConfig,
    factory: Arc<dyn ProcessFactory>,
    subscribers: Vec<Arc<dyn Subscribe>>,
    announcer: Option<Arc<dyn Announce>>,
}

impl SupervisorBuilder {
    /// Creates a new builder with the given configuration and process backend.
    pub fn new(cfg: SupervisorConfig, factory: Arc<dyn ProcessFactory>) -> Self {
        Self {
            cfg,
            factory,
            subscribers: Vec::new(),
            announcer: None,
        }
    }

    /// Sets event subscribers.
    ///
    /// Subscribers receive runtime events (session lifecycle, rejected
    /// requests, etc.) through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Adds one event subscriber.
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Sets the sink every termination announcement is delivered to.
    ///
    /// Called directly by the finish notifier, once per terminated session;
    /// unlike subscribers it never misses a termination.
    pub fn with_announcer(mut self, announcer: Arc<dyn Announce>) -> Self {
        self.announcer = Some(announcer);
        self
    }

    /// Builds and returns the Supervisor instance (stopped).
    ///
    /// Initializes the event bus, subscriber workers, registry, finish notifier
    /// and reconciler. Must be called from within a tokio runtime.
    pub fn build(self) -> Arc<Supervisor> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let subs = Arc::new(SubscriberSet::new(self.subscribers, bus.clone()));

        let registry = Registry::new();
        let notifier = FinishNotifier::new(Arc::clone(&registry), bus.clone(), self.announcer);
        let reconciler = Arc::new(Reconciler::new(
            Arc::clone(&registry),
            notifier,
            self.factory,
            bus.clone(),
        ));

        let sup = Arc::new(Supervisor::new_internal(
            self.cfg, bus, subs, registry, reconciler,
        ));
        sup.subscriber_listener();
        sup
    }
}

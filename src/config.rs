//! # Global runtime configuration.
//!
//! Provides [`SupervisorConfig`], centralized settings for the supervisor runtime.
//!
//! ## Naming
//! Feed names are derived from [`SupervisorConfig::root_service`]:
//! - `<root>.start`   work queue of start requests
//! - `<root>.stop`    broadcast exchange of stop requests
//! - `<root>.stopped` broadcast exchange of termination announcements

/// Global configuration for the supervisor runtime.
///
/// ## Field semantics
/// - `root_service`: prefix for every feed name
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped)
/// - `feed_capacity`: buffer size of in-process feeds (min 1; clamped)
///
/// ## Notes
/// All fields are public for flexibility. Prefer the accessors so the clamping
/// rules live in one place.
#[derive(Clone, Debug)]
pub struct SupervisorConfig {
    /// Service name every feed name is derived from.
    pub root_service: String,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Receivers lagging behind more than `bus_capacity` events observe
    /// `Lagged` and skip older items.
    pub bus_capacity: usize,

    /// Capacity of the in-process start queue and stop/announce fanouts.
    pub feed_capacity: usize,
}

impl SupervisorConfig {
    /// Creates a configuration for the given service name with default capacities.
    pub fn for_service(root_service: impl Into<String>) -> Self {
        Self {
            root_service: root_service.into(),
            ..Self::default()
        }
    }

    /// Name of the start-request work queue.
    pub fn start_queue(&self) -> String {
        format!("{}.start", self.root_service)
    }

    /// Name of the stop-request broadcast exchange.
    pub fn stop_exchange(&self) -> String {
        format!("{}.stop", self.root_service)
    }

    /// Name of the termination-announcement broadcast exchange.
    pub fn announce_exchange(&self) -> String {
        format!("{}.stopped", self.root_service)
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns a feed capacity clamped to a minimum of 1.
    #[inline]
    pub fn feed_capacity_clamped(&self) -> usize {
        self.feed_capacity.max(1)
    }
}

impl Default for SupervisorConfig {
    /// Default configuration:
    ///
    /// - `root_service = "shellvisor"`
    /// - `bus_capacity = 1024`
    /// - `feed_capacity = 256`
    fn default() -> Self {
        Self {
            root_service: "shellvisor".to_string(),
            bus_capacity: 1024,
            feed_capacity: 256,
        }
    }
}

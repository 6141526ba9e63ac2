//! Runtime core: registry, reconciliation and lifecycle.
//!
//! Internal modules:
//! - [`registry`]: identifier → live session, compare-and-remove cleanup;
//! - [`reconciler`]: applies start/stop requests to the registry;
//! - [`notifier`]: turns process exits into cleanup and announcements;
//! - [`supervisor`]: composition root, feed loops, subsystem start/stop;
//! - [`builder`]: wires the above together;
//! - [`shutdown`]: cross-platform shutdown signal handling.

mod builder;
mod notifier;
mod reconciler;
mod registry;
mod shutdown;
mod supervisor;

pub use builder::SupervisorBuilder;
pub use notifier::FinishNotifier;
pub use reconciler::{Reconciler, StartOutcome, StopOutcome};
pub use registry::{Registry, Session};
pub use supervisor::Supervisor;

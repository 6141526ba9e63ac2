//! Transport-facing pieces.
//!
//! The core only needs delivery semantics, not a broker protocol:
//! - [`feeds`]: [`WorkQueue`] (start requests) and [`Feeds`];
//! - [`announce`]: [`Announce`] sink and [`AnnounceForwarder`], termination announcements out;
//! - [`local`]: [`LocalBroker`], an in-process broker wiring both together.

mod announce;
mod feeds;
mod local;

pub use announce::{Announce, AnnounceForwarder};
pub use feeds::{Feeds, Payload, WorkQueue};
pub use local::LocalBroker;

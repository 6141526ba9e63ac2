//! # Event subscribers for the shellvisor runtime.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and the built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Reconciler / FinishNotifier ── publish(Event) ──► Bus ──► SubscriberSet
//!                                                               │
//!                                                       ┌───────┴───────┐
//!                                                       ▼               ▼
//!                                                   LogWriter        Custom
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;

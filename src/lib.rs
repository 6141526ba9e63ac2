//! # shellvisor
//!
//! **Shellvisor** keeps a set of long-running shell sessions alive on behalf
//! of remote requesters.
//!
//! Requests arrive over two inbound feeds: a *start* work queue (each request
//! is handled by exactly one instance) and a *stop* fanout (every instance
//! sees every stop). Each live session is tracked by a unique identifier; when
//! a session's process terminates, for whatever reason, the supervisor drops
//! it from the registry and announces the termination exactly once.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   <root>.start (work queue)          <root>.stop (fanout)
//!            │                                  │
//!            ▼                                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Supervisor (composition root)                                    │
//! │  - start_feed / stop_feed loops (cancelled by stop())             │
//! │  - Reconciler (admission: start / replace / stop)                 │
//! │  - Registry (identifier → Session, compare-and-remove)            │
//! │  - FinishNotifier (process exit → cleanup + Announce sink)        │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!  │ProcessHandle │   │ProcessHandle │   │ProcessHandle │
//!  │  (session a) │   │  (session b) │   │  (session c) │
//!  └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!         │ finish hook      │                  │
//!         ▼                  ▼                  ▼
//!   FinishNotifier ──► Announce::announce ──► <root>.stopped (never skipped)
//!         │
//!         ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! │              (capacity: SupervisorConfig::bus_capacity)           │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │  subscriber_listener   │
//!                       └───────────┬────────────┘
//!                                   ▼
//!                             SubscriberSet
//!                          (per-sub queues)
//!                           ┌───────┴───────┐
//!                           ▼               ▼
//!                       LogWriter         custom
//! ```
//!
//! ### Start admission
//! ```text
//! payload ──► parse_start ──► Malformed / missing id ──► RequestRejected
//!                  │
//!                  ▼
//!   registry has id? ── yes ──► detach old session, stop it (no announcement)
//!                  │
//!                  ▼
//!   factory.create() ──► bind finish hook ──► start(req)
//!                  │                              │
//!                  │                        Err ──► RequestRejected, nothing registered
//!                  ▼
//!   registry.insert ──► SessionStarted / SessionReplaced
//!                  │
//!                  ▼
//!   already exited? ── yes ──► reap now (announced once)
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                          |
//! |-------------------|--------------------------------------------------------------|---------------------------------------------|
//! | **Supervision**   | Feed consumption and subsystem lifecycle.                    | [`Supervisor`], [`SupervisorBuilder`]       |
//! | **Reconciliation**| Start / replace / stop semantics per identifier.             | [`Reconciler`], [`Registry`], [`Session`]   |
//! | **Processes**     | Pluggable process backends with a rebindable finish hook.    | [`ProcessHandle`], [`ProcessFactory`], [`ShellProcess`] |
//! | **Requests**      | Typed payloads and validation.                               | [`StartRequest`], [`StopRequest`], [`Termination`] |
//! | **Subscriber API**| Hook into session lifecycle events.                          | [`Subscribe`], [`Event`], [`EventKind`]     |
//! | **Transport**     | Feeds, announcement sink and an in-process broker.           | [`Feeds`], [`Announce`], [`LocalBroker`]    |
//! | **Errors**        | Typed errors for requests, processes and the subsystem.      | [`RequestError`], [`ProcessError`], [`SupervisorError`] |
//! | **Configuration** | Channel names and capacities.                                | [`SupervisorConfig`]                        |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] (enabled by default).
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use shellvisor::{
//!     EventKind, LocalBroker, ShellFactory, StartRequest, StopRequest, Supervisor,
//!     SupervisorConfig,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = SupervisorConfig::default();
//!     let broker = LocalBroker::new(&cfg);
//!
//!     let sup = Supervisor::builder(cfg, Arc::new(ShellFactory::default()))
//!         .with_announcer(broker.announcer())
//!         .build();
//!     sup.start(broker.feeds()).await?;
//!
//!     let mut events = sup.subscribe();
//!     let mut stopped = broker.announcements();
//!     broker
//!         .publish_start(&StartRequest::new("demo").with_param("command", "sleep 30"))
//!         .await;
//!     while events.recv().await?.kind != EventKind::SessionStarted {}
//!     broker.publish_stop(&StopRequest::new("demo"));
//!
//!     let payload = stopped.recv().await?;
//!     println!("{}", String::from_utf8_lossy(&payload));
//!
//!     sup.stop().await?;
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod error;
mod events;
mod process;
mod requests;
mod subscribers;
mod transport;

// ---- Public re-exports ----

pub use config::SupervisorConfig;
pub use self::core::{
    FinishNotifier, Reconciler, Registry, Session, StartOutcome, StopOutcome, Supervisor,
    SupervisorBuilder,
};
pub use error::{ProcessError, RequestError, SupervisorError};
pub use events::{Bus, Event, EventKind};
pub use process::{
    ExitInfo, FinishHook, FinishSlot, HandleRef, ProcessFactory, ProcessHandle, ShellConfig,
    ShellFactory, ShellProcess,
};
pub use requests::{StartRequest, StopRequest, Termination, parse_start, parse_stop};
pub use subscribers::{Subscribe, SubscriberSet};
pub use transport::{Announce, AnnounceForwarder, Feeds, LocalBroker, Payload, WorkQueue};

// Optional: expose a simple built-in logger subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;

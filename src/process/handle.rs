//! # Process backend capability.
//!
//! This module defines the [`ProcessHandle`] trait, the opaque capability the
//! core drives for one supervised process instance, and [`ProcessFactory`]
//! which creates a fresh handle per start request.
//!
//! ## Contract
//! - [`start`](ProcessHandle::start) launches the process; `Ok(())` means the
//!   handle is now live. A handle is started at most once.
//! - [`stop`](ProcessHandle::stop) requests termination and returns immediately.
//! - [`on_finish`](ProcessHandle::on_finish) binds the hook invoked **exactly
//!   once** when the process terminates. Binding again replaces the previous
//!   hook; only the hook bound at exit time runs.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::error::ProcessError;
use crate::requests::StartRequest;

/// What the backend knows about a terminated process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExitInfo {
    /// OS process id, if one was assigned.
    pub pid: Option<u32>,
    /// Exit code; `None` when killed by a signal or unknown.
    pub code: Option<i32>,
}

/// Callback run when a process terminates.
pub type FinishHook = Box<dyn FnOnce(ExitInfo) -> BoxFuture<'static, ()> + Send + 'static>;

/// Shared handle to a process instance.
pub type HandleRef = Arc<dyn ProcessHandle>;

/// One supervised process instance.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use shellvisor::{ExitInfo, FinishHook, FinishSlot, ProcessError, ProcessHandle, StartRequest};
///
/// #[derive(Default)]
/// struct Noop {
///     finish: FinishSlot,
/// }
///
/// #[async_trait]
/// impl ProcessHandle for Noop {
///     async fn start(&self, _req: &StartRequest) -> Result<(), ProcessError> {
///         Ok(())
///     }
///     fn stop(&self) {}
///     fn on_finish(&self, hook: FinishHook) {
///         self.finish.bind(hook);
///     }
/// }
/// ```
#[async_trait]
pub trait ProcessHandle: Send + Sync + 'static {
    /// Launches the process described by `req`.
    async fn start(&self, req: &StartRequest) -> Result<(), ProcessError>;

    /// Requests termination (asynchronous; does not wait for the exit).
    fn stop(&self);

    /// Binds (or rebinds) the finish hook.
    fn on_finish(&self, hook: FinishHook);
}

/// Creates a new, unstarted [`ProcessHandle`] for each start request.
pub trait ProcessFactory: Send + Sync + 'static {
    fn create(&self) -> HandleRef;
}

impl<F> ProcessFactory for F
where
    F: Fn() -> HandleRef + Send + Sync + 'static,
{
    fn create(&self) -> HandleRef {
        self()
    }
}

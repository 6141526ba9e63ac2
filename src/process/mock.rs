//! Test double for [`ProcessHandle`]: records calls and exits on demand.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use super::handle::{ExitInfo, FinishHook, HandleRef, ProcessFactory, ProcessHandle};
use super::hook::FinishSlot;
use crate::error::ProcessError;
use crate::requests::StartRequest;

/// How a [`MockProcess`] behaves.
#[derive(Clone, Default)]
pub(crate) struct Behavior {
    pub(crate) fail_start: bool,
    /// The process dies while `start` is still running.
    pub(crate) exit_on_start: bool,
    pub(crate) exit_on_stop: bool,
    /// `start` waits for one permit before returning.
    pub(crate) gate: Option<Arc<Notify>>,
}

pub(crate) struct MockProcess {
    finish: Arc<FinishSlot>,
    starts: AtomicUsize,
    stops: AtomicUsize,
    behavior: Behavior,
}

impl MockProcess {
    pub(crate) fn new(fail_start: bool, exit_on_stop: bool) -> Arc<Self> {
        Self::with(Behavior {
            fail_start,
            exit_on_stop,
            ..Behavior::default()
        })
    }

    pub(crate) fn with(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            finish: Arc::new(FinishSlot::new()),
            starts: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
            behavior,
        })
    }

    /// Simulates the process exiting; runs the currently bound hook.
    pub(crate) async fn exit(&self, code: i32) -> bool {
        self.finish
            .fire(ExitInfo {
                pid: None,
                code: Some(code),
            })
            .await
    }

    pub(crate) fn start_calls(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub(crate) fn stop_calls(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProcessHandle for MockProcess {
    async fn start(&self, _req: &StartRequest) -> Result<(), ProcessError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.behavior.gate {
            gate.notified().await;
        }
        if self.behavior.fail_start {
            return Err(ProcessError::InvalidParams {
                reason: "mock refused".to_string(),
            });
        }
        if self.behavior.exit_on_start {
            self.exit(0).await;
        }
        Ok(())
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
        if self.behavior.exit_on_stop {
            let finish = Arc::clone(&self.finish);
            tokio::spawn(async move {
                finish.fire(ExitInfo::default()).await;
            });
        }
    }

    fn on_finish(&self, hook: FinishHook) {
        self.finish.bind(hook);
    }
}

/// Factory handing out [`MockProcess`] handles and remembering them in order.
#[derive(Default)]
pub(crate) struct MockFactory {
    created: Mutex<Vec<Arc<MockProcess>>>,
    fail_next: AtomicBool,
    next: Mutex<Option<Behavior>>,
    exit_on_stop: bool,
}

impl MockFactory {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Handles exit by themselves shortly after `stop()`.
    pub(crate) fn exiting_on_stop() -> Arc<Self> {
        Arc::new(Self {
            exit_on_stop: true,
            ..Self::default()
        })
    }

    /// The next created handle refuses to start.
    pub(crate) fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// The next created handle behaves as `behavior` says.
    pub(crate) fn next_behaves(&self, behavior: Behavior) {
        *self.next.lock().unwrap() = Some(behavior);
    }

    /// The next created handle blocks in `start` until the returned gate is notified.
    pub(crate) fn gate_next(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.next_behaves(Behavior {
            gate: Some(Arc::clone(&gate)),
            ..Behavior::default()
        });
        gate
    }

    pub(crate) fn created(&self) -> Vec<Arc<MockProcess>> {
        self.created.lock().unwrap().clone()
    }

    pub(crate) fn nth(&self, n: usize) -> Arc<MockProcess> {
        Arc::clone(&self.created.lock().unwrap()[n])
    }
}

impl ProcessFactory for MockFactory {
    fn create(&self) -> HandleRef {
        let mut behavior = self.next.lock().unwrap().take().unwrap_or_default();
        behavior.fail_start |= self.fail_next.swap(false, Ordering::SeqCst);
        behavior.exit_on_stop |= self.exit_on_stop;
        let handle = MockProcess::with(behavior);
        self.created.lock().unwrap().push(Arc::clone(&handle));
        handle
    }
}

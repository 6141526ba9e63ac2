//! # Rebindable finish-hook storage for backends.
//!
//! [`FinishSlot`] holds the currently bound [`FinishHook`]. Backends call
//! [`FinishSlot::fire`] once the process is gone; the hook is taken out under
//! the lock, so it runs at most once even if `fire` is called twice.

use std::sync::{Mutex, PoisonError};

use super::handle::{ExitInfo, FinishHook};

/// Slot holding the finish hook of one process handle.
#[derive(Default)]
pub struct FinishSlot {
    hook: Mutex<Option<FinishHook>>,
}

impl FinishSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the bound hook.
    pub fn bind(&self, hook: FinishHook) {
        *self.hook.lock().unwrap_or_else(PoisonError::into_inner) = Some(hook);
    }

    /// Runs the bound hook, if any. Returns `false` when nothing was bound
    /// (or it already ran).
    pub async fn fire(&self, exit: ExitInfo) -> bool {
        let hook = self
            .hook
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match hook {
            Some(hook) => {
                hook(exit).await;
                true
            }
            None => false,
        }
    }

    /// True while a hook is bound and has not run yet.
    pub fn is_bound(&self) -> bool {
        self.hook
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

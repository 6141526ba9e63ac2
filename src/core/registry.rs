//! # Session registry - identifier → live process.
//!
//! The registry is the only authority on which process is live for an
//! identifier. Every mutation happens under one exclusive lock.
//!
//! ## Architecture
//! ```text
//! Reconciler ──► insert(session)   → previous session (caller detaches + stops it)
//!            ──► remove(id)        → detached session
//!            ──► lookup(id)
//! FinishNotifier ──► remove_if(id, serial) → removed only if still that exact handle
//! Supervisor ──► snapshot()        (stop everything on shutdown)
//! ```
//!
//! ## Rules
//! - At most one session per identifier
//! - Finish-driven cleanup is compare-and-remove by serial, so an exit of a
//!   superseded handle can never remove its successor
//! - Registry owns the sessions; nothing outside enumerates or mutates the map

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use tokio::sync::RwLock;

use crate::process::{ExitInfo, HandleRef};

/// Source of handle serials.
static SESSION_SERIAL: AtomicU64 = AtomicU64::new(1);

/// One process handle registered (or about to be registered) for an identifier.
pub struct Session {
    id: Arc<str>,
    serial: u64,
    handle: HandleRef,
    exit: OnceLock<ExitInfo>,
}

impl Session {
    /// Wraps a fresh handle and assigns it the next serial.
    pub fn new(id: impl Into<Arc<str>>, handle: HandleRef) -> Arc<Self> {
        Arc::new(Self {
            id: id.into(),
            serial: SESSION_SERIAL.fetch_add(1, Ordering::Relaxed),
            handle,
            exit: OnceLock::new(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn id_arc(&self) -> Arc<str> {
        Arc::clone(&self.id)
    }

    /// Unique serial of the underlying handle.
    pub fn serial(&self) -> u64 {
        self.serial
    }

    pub fn handle(&self) -> &HandleRef {
        &self.handle
    }

    /// Records the exit; later calls keep the first value.
    pub(crate) fn mark_exited(&self, exit: ExitInfo) {
        let _ = self.exit.set(exit);
    }

    /// Exit info, once the backend reported one.
    pub fn exit(&self) -> Option<ExitInfo> {
        self.exit.get().copied()
    }

    pub fn has_exited(&self) -> bool {
        self.exit.get().is_some()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("serial", &self.serial)
            .field("exit", &self.exit.get())
            .finish_non_exhaustive()
    }
}

/// Identifier → live session map.
#[derive(Default)]
pub struct Registry {
    sessions: RwLock<HashMap<Arc<str>, Arc<Session>>>,
}

impl Registry {
    /// Creates a new empty registry.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Returns the live session for `id`.
    pub async fn lookup(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Installs `session` as the live session for its identifier.
    ///
    /// Returns the session it displaced, already absent from the registry.
    pub async fn insert(&self, session: Arc<Session>) -> Option<Arc<Session>> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.id_arc(), session)
    }

    /// Detaches and returns the session for `id`.
    pub async fn remove(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.write().await.remove(id)
    }

    /// Detaches the session for `id` only if it is still the handle with `serial`.
    pub async fn remove_if(&self, id: &str, serial: u64) -> Option<Arc<Session>> {
        let mut sessions = self.sessions.write().await;
        match sessions.get(id) {
            Some(current) if current.serial == serial => sessions.remove(id),
            _ => None,
        }
    }

    /// Returns sorted list of identifiers with a live session.
    pub async fn list(&self) -> Vec<String> {
        let sessions = self.sessions.read().await;
        let mut ids: Vec<String> = sessions.keys().map(|k| k.to_string()).collect();
        ids.sort_unstable();
        ids
    }

    /// Returns every live session (order unspecified).
    pub async fn snapshot(&self) -> Vec<Arc<Session>> {
        self.sessions.read().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::mock::MockProcess;

    fn session(id: &str) -> Arc<Session> {
        Session::new(id, MockProcess::new(false, false))
    }

    #[tokio::test]
    async fn test_insert_returns_displaced_session() {
        let reg = Registry::new();
        let first = session("a");
        let second = session("a");

        assert!(reg.insert(Arc::clone(&first)).await.is_none());
        let displaced = reg.insert(Arc::clone(&second)).await.unwrap();

        assert_eq!(displaced.serial(), first.serial());
        assert_eq!(reg.lookup("a").await.unwrap().serial(), second.serial());
        assert_eq!(reg.len().await, 1);
    }

    #[tokio::test]
    async fn test_remove_if_ignores_superseded_serial() {
        let reg = Registry::new();
        let old = session("a");
        let new = session("a");
        reg.insert(Arc::clone(&old)).await;
        reg.insert(Arc::clone(&new)).await;

        assert!(reg.remove_if("a", old.serial()).await.is_none());
        assert_eq!(reg.lookup("a").await.unwrap().serial(), new.serial());

        assert!(reg.remove_if("a", new.serial()).await.is_some());
        assert!(reg.is_empty().await);
    }

    #[tokio::test]
    async fn test_remove_missing_is_none() {
        let reg = Registry::new();
        assert!(reg.remove("ghost").await.is_none());
        assert!(reg.remove_if("ghost", 1).await.is_none());
    }

    #[tokio::test]
    async fn test_list_is_sorted() {
        let reg = Registry::new();
        for id in ["c", "a", "b"] {
            reg.insert(session(id)).await;
        }
        assert_eq!(reg.list().await, vec!["a", "b", "c"]);
        assert_eq!(reg.snapshot().await.len(), 3);
    }

    #[test]
    fn test_first_exit_wins() {
        let s = session("a");
        assert!(!s.has_exited());
        s.mark_exited(ExitInfo { pid: None, code: Some(1) });
        s.mark_exited(ExitInfo { pid: None, code: Some(2) });
        assert_eq!(s.exit().unwrap().code, Some(1));
    }
}

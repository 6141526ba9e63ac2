//! Process backends.
//!
//! - [`handle`]: the [`ProcessHandle`] / [`ProcessFactory`] capability the core drives;
//! - [`hook`]: [`FinishSlot`], rebindable storage for the finish hook;
//! - [`shell`]: [`ShellProcess`], a `tokio::process` backend.

mod handle;
mod hook;
#[cfg(test)]
pub(crate) mod mock;
mod shell;

pub use handle::{ExitInfo, FinishHook, HandleRef, ProcessFactory, ProcessHandle};
pub use hook::FinishSlot;
pub use shell::{ShellConfig, ShellFactory, ShellProcess};

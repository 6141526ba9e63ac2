//! Error types used by the shellvisor runtime and process backends.
//!
//! This module defines three enums:
//!
//! - [`RequestError`]: a single start/stop request could not be honored.
//! - [`SupervisorError`]: misuse of the subsystem lifecycle (double start/stop).
//! - [`ProcessError`]: a process backend refused or failed to launch.
//!
//! All of them provide `as_label` (stable snake_case label for logs/metrics).

use thiserror::Error;

/// # Errors produced while handling one inbound request.
///
/// None of these are fatal: the feed boundary logs them and moves on to the
/// next message.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RequestError {
    /// Payload could not be decoded at all.
    #[error("malformed payload: {error}")]
    Malformed {
        /// Decoder message.
        error: String,
    },

    /// Payload decoded but violates the request protocol (e.g. missing `id`).
    #[error("protocol error: {reason}")]
    Protocol {
        /// What was wrong with the request.
        reason: &'static str,
    },

    /// The process backend failed to launch the process.
    #[error("cannot start process for {id:?}: {source}")]
    Start {
        /// Identifier the start was requested for.
        id: String,
        /// Backend failure.
        #[source]
        source: ProcessError,
    },
}

impl RequestError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use shellvisor::RequestError;
    ///
    /// let err = RequestError::Protocol { reason: "missing id" };
    /// assert_eq!(err.as_label(), "request_protocol");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RequestError::Malformed { .. } => "request_malformed",
            RequestError::Protocol { .. } => "request_protocol",
            RequestError::Start { .. } => "request_start_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RequestError::Malformed { error } => format!("malformed: {error}"),
            RequestError::Protocol { reason } => format!("protocol: {reason}"),
            RequestError::Start { id, source } => format!("start failed id={id}: {source}"),
        }
    }

    /// Identifier the request referred to, when it got far enough to have one.
    pub fn session(&self) -> Option<&str> {
        match self {
            RequestError::Start { id, .. } => Some(id),
            _ => None,
        }
    }
}

/// # Errors produced by the subsystem lifecycle.
///
/// Reported and logged, never fatal: the offending call is a no-op.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorError {
    /// `start` called while already started.
    #[error("supervisor already started")]
    AlreadyStarted,

    /// `stop` called while not started.
    #[error("supervisor is not started")]
    NotStarted,
}

impl SupervisorError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SupervisorError::AlreadyStarted => "supervisor_already_started",
            SupervisorError::NotStarted => "supervisor_not_started",
        }
    }
}

/// # Errors produced by a process backend.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ProcessError {
    /// Request parameters are unusable for this backend.
    #[error("invalid process parameters: {reason}")]
    InvalidParams {
        /// What is wrong with the parameters.
        reason: String,
    },

    /// The OS refused to spawn the process.
    #[error("spawn failed: {0}")]
    Spawn(#[from] std::io::Error),

    /// The handle was already started once; handles are single-use.
    #[error("process handle already started")]
    AlreadyStarted,
}

impl ProcessError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use shellvisor::ProcessError;
    ///
    /// let err = ProcessError::InvalidParams { reason: "no command".into() };
    /// assert_eq!(err.as_label(), "process_invalid_params");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ProcessError::InvalidParams { .. } => "process_invalid_params",
            ProcessError::Spawn(_) => "process_spawn_failed",
            ProcessError::AlreadyStarted => "process_already_started",
        }
    }
}

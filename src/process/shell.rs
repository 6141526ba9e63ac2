//! # Shell-session backend built on `tokio::process`.
//!
//! [`ShellProcess`] launches one child process per start request and watches
//! it from a background task. When the child exits (on its own or after
//! [`stop`](ProcessHandle::stop)) the bound finish hook receives its
//! [`ExitInfo`].
//!
//! ## Request parameters
//! | key       | type                 | meaning                                   |
//! |-----------|----------------------|-------------------------------------------|
//! | `argv`    | `[string, ...]`      | program and arguments, run directly       |
//! | `command` | `string`             | run as `<shell> -c <command>`             |
//! | `cwd`     | `string` (optional)  | working directory                         |
//! | `env`     | `{string: string}`   | extra environment variables               |
//!
//! `argv` wins when both are present; neither is [`ProcessError::InvalidParams`].

use std::collections::BTreeMap;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::handle::{ExitInfo, FinishHook, HandleRef, ProcessFactory, ProcessHandle};
use super::hook::FinishSlot;
use crate::error::ProcessError;
use crate::requests::StartRequest;

/// Settings shared by every [`ShellProcess`] a [`ShellFactory`] creates.
#[derive(Clone, Debug)]
pub struct ShellConfig {
    /// Shell used for `command` requests.
    pub shell: String,
}

impl Default for ShellConfig {
    /// `shell = "/bin/sh"`
    fn default() -> Self {
        Self {
            shell: "/bin/sh".to_string(),
        }
    }
}

/// Creates [`ShellProcess`] handles.
#[derive(Clone, Debug, Default)]
pub struct ShellFactory {
    cfg: ShellConfig,
}

impl ShellFactory {
    pub fn new(cfg: ShellConfig) -> Self {
        Self { cfg }
    }
}

impl ProcessFactory for ShellFactory {
    fn create(&self) -> HandleRef {
        Arc::new(ShellProcess::new(self.cfg.clone()))
    }
}

/// A child process supervised through [`ProcessHandle`].
pub struct ShellProcess {
    cfg: ShellConfig,
    finish: Arc<FinishSlot>,
    cancel: CancellationToken,
    started: AtomicBool,
}

impl ShellProcess {
    pub fn new(cfg: ShellConfig) -> Self {
        Self {
            cfg,
            finish: Arc::new(FinishSlot::new()),
            cancel: CancellationToken::new(),
            started: AtomicBool::new(false),
        }
    }

    /// Builds the command for `req` without spawning it.
    fn command(&self, req: &StartRequest) -> Result<Command, ProcessError> {
        let invalid = |e: serde_json::Error| ProcessError::InvalidParams {
            reason: e.to_string(),
        };

        let mut cmd = match (
            req.param::<Vec<String>>("argv").map_err(invalid)?,
            req.param::<String>("command").map_err(invalid)?,
        ) {
            (Some(argv), _) => {
                let Some((program, args)) = argv.split_first() else {
                    return Err(ProcessError::InvalidParams {
                        reason: "argv is empty".to_string(),
                    });
                };
                let mut cmd = Command::new(program);
                cmd.args(args);
                cmd
            }
            (None, Some(command)) => {
                let mut cmd = Command::new(&self.cfg.shell);
                cmd.arg("-c").arg(command);
                cmd
            }
            (None, None) => {
                return Err(ProcessError::InvalidParams {
                    reason: "neither argv nor command given".to_string(),
                });
            }
        };

        if let Some(cwd) = req.param::<String>("cwd").map_err(invalid)? {
            cmd.current_dir(cwd);
        }
        if let Some(env) = req.param::<BTreeMap<String, String>>("env").map_err(invalid)? {
            cmd.envs(env);
        }
        cmd.stdin(Stdio::null()).kill_on_drop(true);
        Ok(cmd)
    }
}

#[async_trait]
impl ProcessHandle for ShellProcess {
    async fn start(&self, req: &StartRequest) -> Result<(), ProcessError> {
        let mut cmd = self.command(req)?;
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(ProcessError::AlreadyStarted);
        }

        let mut child = cmd.spawn()?;
        let pid = child.id();
        debug!(session = %req.id, ?pid, "process spawned");

        let cancel = self.cancel.clone();
        let finish = Arc::clone(&self.finish);
        tokio::spawn(async move {
            let status = tokio::select! {
                status = child.wait() => status,
                _ = cancel.cancelled() => {
                    if let Err(e) = child.start_kill() {
                        warn!(?pid, error = %e, "kill failed");
                    }
                    child.wait().await
                }
            };
            let code = match status {
                Ok(status) => status.code(),
                Err(e) => {
                    warn!(?pid, error = %e, "wait failed");
                    None
                }
            };
            finish.fire(ExitInfo { pid, code }).await;
        });
        Ok(())
    }

    fn stop(&self) {
        self.cancel.cancel();
    }

    fn on_finish(&self, hook: FinishHook) {
        self.finish.bind(hook);
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::time::Duration;

    use futures::FutureExt;
    use tokio::sync::oneshot;

    use super::*;

    fn exit_channel(handle: &ShellProcess) -> oneshot::Receiver<ExitInfo> {
        let (tx, rx) = oneshot::channel();
        handle.on_finish(Box::new(move |exit| {
            async move {
                let _ = tx.send(exit);
            }
            .boxed()
        }));
        rx
    }

    #[tokio::test]
    async fn test_command_exit_code_reaches_hook() {
        let handle = ShellProcess::new(ShellConfig::default());
        let rx = exit_channel(&handle);

        handle
            .start(&StartRequest::new("a").with_param("command", "exit 3"))
            .await
            .unwrap();

        let exit = tokio::time::timeout(Duration::from_secs(5), rx)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(exit.code, Some(3));
        assert!(exit.pid.is_some());
    }

    #[tokio::test]
    async fn test_stop_kills_child() {
        let handle = ShellProcess::new(ShellConfig::default());
        let rx = exit_channel(&handle);

        handle
            .start(&StartRequest::new("a").with_param("argv", vec!["sleep", "30"]))
            .await
            .unwrap();
        handle.stop();

        let exit = tokio::time::timeout(Duration::from_secs(5), rx)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(exit.code, None);
    }

    #[tokio::test]
    async fn test_invalid_params_are_rejected() {
        let handle = ShellProcess::new(ShellConfig::default());
        let err = handle.start(&StartRequest::new("a")).await.unwrap_err();
        assert_eq!(err.as_label(), "process_invalid_params");

        let err = handle
            .start(&StartRequest::new("a").with_param("argv", Vec::<String>::new()))
            .await
            .unwrap_err();
        assert_eq!(err.as_label(), "process_invalid_params");
    }

    #[tokio::test]
    async fn test_handle_is_single_use() {
        let handle = ShellProcess::new(ShellConfig::default());
        let req = StartRequest::new("a").with_param("command", "true");
        handle.start(&req).await.unwrap();
        let err = handle.start(&req).await.unwrap_err();
        assert_eq!(err.as_label(), "process_already_started");
    }

    #[tokio::test]
    async fn test_spawn_failure_is_reported() {
        let handle = ShellProcess::new(ShellConfig::default());
        let err = handle
            .start(&StartRequest::new("a").with_param("argv", vec!["/definitely/not/here"]))
            .await
            .unwrap_err();
        assert_eq!(err.as_label(), "process_spawn_failed");
    }
}

//! Runner module - language adapter layer
//!
//! Turns submitted source text into a captured stdout/stderr result:
//! - `InterpretedRunner`: script languages, one interpreter invocation
//! - `CompiledRunner`: compiled languages, a compile phase then a run phase
//!
//! The runner module does NOT:
//! - Choose execution strategies or talk to the remote service
//! - Attach suggestions or assemble responses
//!
//! Every runner works inside its own temporary workspace, created for one
//! attempt and removed on every exit path (success, diagnostics, timeout,
//! error propagation) by the workspace guard's drop.

pub mod compiled;
pub mod interpreted;

use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::debug;

use crate::languages::Language;
use crate::outcome::ExecutionResult;

/// Error line reported when a child process exceeds its time budget
pub const TIMEOUT_MESSAGE: &str = "execution timed out";

/// Raw capture from one child process invocation
#[derive(Debug)]
pub struct RunOutcome {
    /// Exit code; advisory only (-1 when the process was killed)
    pub exit_code: i32,
    /// Stdout content
    pub stdout: String,
    /// Stderr content
    pub stderr: String,
    /// Whether the time budget expired and the child was killed
    pub timed_out: bool,
}

impl RunOutcome {
    /// Check if the process ran to completion with exit code 0
    pub fn is_success(&self) -> bool {
        self.exit_code == 0 && !self.timed_out
    }
}

/// Language adapter: source text in, normalized local result out
#[async_trait]
pub trait LanguageRunner: Send + Sync {
    /// Execute `code`, bounding each child process by `timeout_ms`
    async fn run(&self, code: &str, timeout_ms: u64) -> Result<ExecutionResult>;
}

/// Build the adapter bound to `language`
pub fn runner_for(language: Language, compile_timeout_ms: u64) -> Box<dyn LanguageRunner> {
    if language.is_compiled() {
        Box::new(compiled::CompiledRunner::new(language).with_compile_timeout(compile_timeout_ms))
    } else {
        Box::new(interpreted::InterpretedRunner::new(language))
    }
}

/// Spawn `cmd` with stdin disabled and both output channels captured,
/// enforcing `timeout_ms`. A child that outlives its budget is killed and
/// reaped here; `kill_on_drop` covers the paths where this future itself is
/// dropped early.
pub async fn run_with_timeout(mut cmd: Command, timeout_ms: u64) -> Result<RunOutcome> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd.spawn().context("Failed to spawn child process")?;

    // Drain both pipes concurrently with the wait; a child that fills one
    // pipe while we block on the other would otherwise never exit.
    let stdout_task = tokio::spawn(drain(child.stdout.take()));
    let stderr_task = tokio::spawn(drain(child.stderr.take()));

    match tokio::time::timeout(Duration::from_millis(timeout_ms), child.wait()).await {
        Ok(status) => {
            let status = status.context("Failed to wait for child process")?;
            let stdout = stdout_task.await.unwrap_or_default();
            let stderr = stderr_task.await.unwrap_or_default();

            Ok(RunOutcome {
                exit_code: status.code().unwrap_or(-1),
                stdout,
                stderr,
                timed_out: false,
            })
        }
        Err(_) => {
            let _ = child.start_kill();
            let _ = child.wait().await;
            stdout_task.abort();
            stderr_task.abort();
            debug!("Killed child process after {}ms budget", timeout_ms);

            Ok(RunOutcome {
                exit_code: -1,
                stdout: String::new(),
                stderr: TIMEOUT_MESSAGE.to_string(),
                timed_out: true,
            })
        }
    }
}

/// Read a captured pipe to EOF, tolerating a missing handle
async fn drain<R: AsyncRead + Unpin + Send + 'static>(reader: Option<R>) -> String {
    let mut buf = Vec::new();
    if let Some(mut reader) = reader {
        let _ = reader.read_to_end(&mut buf).await;
    }
    String::from_utf8_lossy(&buf).to_string()
}

use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::invocation::{ExecutionResult, Invocation};

/// Synthetic exit code reported when the child exceeded its timeout and was
/// killed. Matches the coreutils `timeout` convention.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// Synthetic exit code reported when the caller cancelled the check and the
/// child was killed. Matches the shell convention for SIGINT.
pub const CANCELLED_EXIT_CODE: i32 = 130;

/// Synthetic exit code materialized for a command that could not be started.
pub const SPAWN_FAILURE_EXIT_CODE: i32 = 127;

/// Exit code reported when the child was terminated by a signal and the OS
/// provided no exit code.
pub const KILLED_EXIT_CODE: i32 = -1;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("invalid invocation: {0}")]
    InvalidInvocation(String),

    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to capture output: {0}")]
    Capture(#[from] std::io::Error),
}

/// Capability interface for running one external tool invocation.
///
/// The real implementation is [`ProcessRunner`]; tests substitute fakes so
/// classification and reporting can be exercised without spawning anything.
#[async_trait]
pub trait Runner: Send + Sync {
    async fn run(&self, invocation: &Invocation) -> Result<ExecutionResult, RunnerError> {
        self.run_with_cancel(invocation, &CancellationToken::new())
            .await
    }

    async fn run_with_cancel(
        &self,
        invocation: &Invocation,
        cancel: &CancellationToken,
    ) -> Result<ExecutionResult, RunnerError>;
}

/// Runs the invocation as a real OS process.
///
/// Stdout and stderr are read concurrently into one shared buffer, so the
/// result carries them interleaved in the order chunks arrive. Ordering
/// across the two streams is best-effort; within a stream it is preserved.
/// On timeout or cancellation the child is killed and reaped, and the
/// result carries a synthetic exit code plus whatever output arrived before
/// termination.
#[derive(Debug, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

enum WaitOutcome {
    Exited(ExitStatus),
    TimedOut,
    Cancelled,
}

#[async_trait]
impl Runner for ProcessRunner {
    async fn run_with_cancel(
        &self,
        invocation: &Invocation,
        cancel: &CancellationToken,
    ) -> Result<ExecutionResult, RunnerError> {
        validate(invocation)?;

        let start = Instant::now();

        let mut command = Command::new(&invocation.command[0]);
        command
            .args(&invocation.command[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // A dropped future must not leave the child behind.
            .kill_on_drop(true);
        if let Some(dir) = &invocation.working_dir {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|source| RunnerError::Spawn {
            program: invocation.program().to_string(),
            source,
        })?;

        let buffer = Arc::new(Mutex::new(Vec::new()));
        let mut captures = Vec::new();
        if let Some(stdout) = child.stdout.take() {
            captures.push(spawn_capture(stdout, Arc::clone(&buffer)));
        }
        if let Some(stderr) = child.stderr.take() {
            captures.push(spawn_capture(stderr, Arc::clone(&buffer)));
        }

        let waited = tokio::select! {
            status = child.wait() => WaitOutcome::Exited(status?),
            () = tokio::time::sleep(invocation.timeout) => WaitOutcome::TimedOut,
            () = cancel.cancelled() => WaitOutcome::Cancelled,
        };

        let exit_code = match waited {
            WaitOutcome::Exited(status) => status.code().unwrap_or(KILLED_EXIT_CODE),
            WaitOutcome::TimedOut => {
                terminate(&mut child, "timeout").await;
                TIMEOUT_EXIT_CODE
            }
            WaitOutcome::Cancelled => {
                terminate(&mut child, "cancelled").await;
                CANCELLED_EXIT_CODE
            }
        };

        for capture in captures {
            let _ = capture.await;
        }
        let output = buffer.lock().await;
        let combined_output = String::from_utf8_lossy(&output).into_owned();

        Ok(ExecutionResult {
            exit_code,
            combined_output,
            duration: start.elapsed(),
        })
    }
}

fn validate(invocation: &Invocation) -> Result<(), RunnerError> {
    if invocation.command.is_empty() {
        return Err(RunnerError::InvalidInvocation(
            "command must not be empty".to_string(),
        ));
    }
    if invocation.timeout.is_zero() {
        return Err(RunnerError::InvalidInvocation(
            "timeout must be positive".to_string(),
        ));
    }
    Ok(())
}

/// Kill and reap the child. `Child::kill` waits on the process, so no
/// zombie is left behind.
async fn terminate(child: &mut Child, reason: &str) {
    if let Err(err) = child.kill().await {
        tracing::warn!(reason, error = %err, "failed to kill child process");
    }
}

fn spawn_capture<R>(pipe: R, buffer: Arc<Mutex<Vec<u8>>>) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut pipe = pipe;
        let mut chunk = [0u8; 8192];
        loop {
            match pipe.read(&mut chunk).await {
                Ok(0) | Err(_) => break,
                Ok(n) => buffer.lock().await.extend_from_slice(&chunk[..n]),
            }
        }
    })
}

use std::time::Duration;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::invocation::{ExecutionResult, Invocation};
use crate::runner::{Runner, SPAWN_FAILURE_EXIT_CODE};
use crate::verdict::{Markers, Verdict, classify};

/// One verdict paired with the execution result it was derived from. Every
/// outcome carries exactly one result, including failures the runner
/// surfaced before the tool could produce one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckOutcome {
    pub verdict: Verdict,
    pub result: ExecutionResult,
}

/// Run one drift check end to end: invoke the tool, classify what came
/// back, and pair the verdict with its diagnostics.
///
/// Runner errors are not propagated; they become `ExecutionError` verdicts
/// with the error text as the captured output, so callers always get a
/// verdict to gate on. Retrying is the caller's decision.
#[allow(dead_code)] // NOTE: Library entry point; the CLI wires in a cancellation token
pub async fn check(runner: &dyn Runner, invocation: &Invocation, markers: &Markers) -> CheckOutcome {
    check_with_cancel(runner, invocation, markers, &CancellationToken::new()).await
}

pub async fn check_with_cancel(
    runner: &dyn Runner,
    invocation: &Invocation,
    markers: &Markers,
    cancel: &CancellationToken,
) -> CheckOutcome {
    match runner.run_with_cancel(invocation, cancel).await {
        Ok(result) => {
            let verdict = classify(&result, markers);
            CheckOutcome { verdict, result }
        }
        Err(err) => {
            tracing::error!(program = %invocation.program(), error = %err, "tool invocation failed");
            CheckOutcome {
                verdict: Verdict::ExecutionError,
                result: ExecutionResult {
                    exit_code: SPAWN_FAILURE_EXIT_CODE,
                    combined_output: err.to_string(),
                    duration: Duration::ZERO,
                },
            }
        }
    }
}

use std::collections::BTreeSet;

use serde::Serialize;

use crate::invocation::ExecutionResult;

/// The no-op marker the original terraform wording emits for a clean plan.
///
/// Upstream tool releases can rephrase this; keep it configurable per check
/// rather than relying on the default.
pub const DEFAULT_SUCCESS_MARKER: &str = "No changes. Infrastructure is up-to-date.";

/// Classification of one completed invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    NoDrift,
    DriftDetected,
    ExecutionError,
}

/// Which exit codes count as hard failures rather than plan outcomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureExitCodes {
    /// Any non-zero code is a hard failure, except the listed codes the tool
    /// reserves for "changes present" (terraform's `-detailed-exitcode`
    /// reports 2 for a non-empty plan).
    NonZeroExcept(BTreeSet<i32>),
    /// Exactly the listed codes are hard failures.
    Explicit(BTreeSet<i32>),
}

impl Default for FailureExitCodes {
    fn default() -> Self {
        Self::NonZeroExcept(BTreeSet::new())
    }
}

impl FailureExitCodes {
    pub fn contains(&self, exit_code: i32) -> bool {
        match self {
            Self::NonZeroExcept(drift_codes) => {
                exit_code != 0 && !drift_codes.contains(&exit_code)
            }
            Self::Explicit(codes) => codes.contains(&exit_code),
        }
    }
}

/// What the classifier recognizes in a result: the no-op marker and the
/// exit codes treated as hard failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markers {
    pub success_marker: String,
    pub failure_exit_codes: FailureExitCodes,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            success_marker: DEFAULT_SUCCESS_MARKER.to_string(),
            failure_exit_codes: FailureExitCodes::default(),
        }
    }
}

/// Classify one execution result. Pure: same result and markers always
/// yield the same verdict.
///
/// Decision order, first match wins:
/// 1. exit code in the hard-failure set -> `ExecutionError`
/// 2. output contains the success marker (case-sensitive) -> `NoDrift`
/// 3. otherwise -> `DriftDetected`
///
/// Absence of the explicit no-op marker is never treated as success, so an
/// empty output with exit code 0 classifies as `DriftDetected`.
pub fn classify(result: &ExecutionResult, markers: &Markers) -> Verdict {
    if markers.failure_exit_codes.contains(result.exit_code) {
        return Verdict::ExecutionError;
    }
    if result.combined_output.contains(&markers.success_marker) {
        return Verdict::NoDrift;
    }
    Verdict::DriftDetected
}

//! driftcheck - Infrastructure Drift Detection Harness
//!
//! A library for invoking a declarative-infrastructure tool's dry-run,
//! capturing its output, and classifying the result as no drift, drift
//! detected, or execution error.

pub mod check;
pub mod invocation;
pub mod report;
pub mod runner;
pub mod verdict;

mod error;

pub use check::{CheckOutcome, check, check_with_cancel};
pub use invocation::{ExecutionResult, Invocation};
pub use report::{DEFAULT_EXCERPT_LINES, Report, ReportOptions, report};
pub use runner::{ProcessRunner, Runner, RunnerError};
pub use verdict::{DEFAULT_SUCCESS_MARKER, FailureExitCodes, Markers, Verdict, classify};

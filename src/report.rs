use serde::Serialize;

use crate::check::CheckOutcome;
use crate::verdict::Verdict;

pub const DEFAULT_EXCERPT_LINES: usize = 50;

/// What a programmatic caller (CI gate, wrapper script) acts on: the process
/// exit code for the harness itself and a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub exit_code: i32,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    /// How many leading output lines a drift report quotes before eliding.
    pub excerpt_lines: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            excerpt_lines: DEFAULT_EXCERPT_LINES,
        }
    }
}

/// Format a verdict for humans and map it onto the harness exit code:
/// 0 no drift, 1 drift detected, 2 execution error.
pub fn report(outcome: &CheckOutcome, options: &ReportOptions) -> Report {
    let result = &outcome.result;
    match outcome.verdict {
        Verdict::NoDrift => Report {
            exit_code: 0,
            message: format!(
                "no drift: infrastructure is up to date (checked in {:.1}s)",
                result.duration.as_secs_f64()
            ),
        },
        Verdict::DriftDetected => Report {
            exit_code: 1,
            message: format!(
                "drift detected: the plan output does not confirm a clean state\n\n{}",
                excerpt(&result.combined_output, options.excerpt_lines)
            ),
        },
        Verdict::ExecutionError => Report {
            exit_code: 2,
            message: format!(
                "execution error: the tool exited with code {}\n\n{}",
                result.exit_code, result.combined_output
            ),
        },
    }
}

/// First `max_lines` lines of `output`, with a count of what was elided.
fn excerpt(output: &str, max_lines: usize) -> String {
    let total = output.lines().count();
    if total <= max_lines {
        return output.trim_end_matches('\n').to_string();
    }
    let kept: Vec<&str> = output.lines().take(max_lines).collect();
    format!(
        "{}\n... ({} more lines)",
        kept.join("\n"),
        total - max_lines
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invocation::ExecutionResult;
    use std::time::Duration;

    fn outcome(verdict: Verdict, exit_code: i32, output: &str) -> CheckOutcome {
        CheckOutcome {
            verdict,
            result: ExecutionResult {
                exit_code,
                combined_output: output.to_string(),
                duration: Duration::from_millis(1200),
            },
        }
    }

    #[test]
    fn test_no_drift_report() {
        let report = report(
            &outcome(Verdict::NoDrift, 0, "No changes. Infrastructure is up-to-date."),
            &ReportOptions::default(),
        );
        assert_eq!(report.exit_code, 0);
        assert!(report.message.contains("up to date"));
        assert!(report.message.contains("1.2s"));
    }

    #[test]
    fn test_drift_report_quotes_output() {
        let report = report(
            &outcome(Verdict::DriftDetected, 0, "Plan: 3 to add, 0 to change, 0 to destroy."),
            &ReportOptions::default(),
        );
        assert_eq!(report.exit_code, 1);
        assert!(report.message.contains("drift detected"));
        assert!(report.message.contains("Plan: 3 to add"));
    }

    #[test]
    fn test_drift_report_truncates_long_output() {
        let output: String = (1..=80).map(|n| format!("line {n}\n")).collect();
        let report = report(
            &outcome(Verdict::DriftDetected, 0, &output),
            &ReportOptions { excerpt_lines: 50 },
        );
        assert!(report.message.contains("line 50"));
        assert!(!report.message.contains("line 51"));
        assert!(report.message.contains("(30 more lines)"));
    }

    #[test]
    fn test_short_output_is_not_truncated() {
        let report = report(
            &outcome(Verdict::DriftDetected, 0, "one\ntwo\n"),
            &ReportOptions { excerpt_lines: 50 },
        );
        assert!(report.message.contains("one\ntwo"));
        assert!(!report.message.contains("more lines"));
    }

    #[test]
    fn test_execution_error_report_keeps_full_output() {
        let output: String = (1..=80).map(|n| format!("line {n}\n")).collect();
        let failure = format!("{output}Error: invalid credentials");
        let report = report(
            &outcome(Verdict::ExecutionError, 1, &failure),
            &ReportOptions::default(),
        );
        assert_eq!(report.exit_code, 2);
        assert!(report.message.contains("exited with code 1"));
        // Diagnostics are never truncated for hard failures.
        assert!(report.message.contains("line 80"));
        assert!(report.message.contains("invalid credentials"));
    }

    #[test]
    fn test_default_excerpt_lines() {
        assert_eq!(ReportOptions::default().excerpt_lines, 50);
    }
}

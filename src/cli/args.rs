use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::invocation::Invocation;
use crate::report::{DEFAULT_EXCERPT_LINES, ReportOptions};
use crate::verdict::{DEFAULT_SUCCESS_MARKER, FailureExitCodes, Markers};

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CheckCommand,
}

#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Run the infrastructure tool's dry-run and classify the outcome.
    Check(CheckArgs),
}

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    /// Substring that marks a clean, no-op plan in the tool's output.
    #[arg(long, env = "DRIFTCHECK_MARKER", default_value = DEFAULT_SUCCESS_MARKER)]
    pub marker: String,

    /// How long the tool may run before it is killed, in seconds.
    #[arg(
        long,
        env = "DRIFTCHECK_TIMEOUT_SECS",
        default_value_t = 300,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: u64,

    /// Directory the tool runs in (defaults to the current directory).
    #[arg(long, value_name = "DIR")]
    pub working_dir: Option<PathBuf>,

    /// Exit codes the tool reserves for "changes present"; any other
    /// non-zero code is treated as a hard failure.
    #[arg(long = "drift-exit-code", value_name = "CODE")]
    pub drift_exit_codes: Vec<i32>,

    /// Treat exactly these exit codes as hard failures.
    #[arg(
        long = "failure-exit-code",
        value_name = "CODE",
        conflicts_with = "drift_exit_codes"
    )]
    pub failure_exit_codes: Vec<i32>,

    /// How many output lines a drift report quotes before eliding.
    #[arg(long, default_value_t = DEFAULT_EXCERPT_LINES)]
    pub excerpt_lines: usize,

    /// Emit the outcome as JSON on stdout instead of the human report.
    #[arg(long)]
    pub json: bool,

    /// The tool command to run, e.g. `-- terraform plan -out=tfplan`.
    #[arg(required = true, last = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

impl CheckArgs {
    pub fn invocation(&self) -> Invocation {
        let mut invocation =
            Invocation::new(self.command.clone(), Duration::from_secs(self.timeout_secs));
        if let Some(dir) = &self.working_dir {
            invocation = invocation.with_working_dir(dir);
        }
        invocation
    }

    pub fn markers(&self) -> Markers {
        let failure_exit_codes = if self.failure_exit_codes.is_empty() {
            FailureExitCodes::NonZeroExcept(self.drift_exit_codes.iter().copied().collect())
        } else {
            FailureExitCodes::Explicit(self.failure_exit_codes.iter().copied().collect())
        };
        Markers {
            success_marker: self.marker.clone(),
            failure_exit_codes,
        }
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            excerpt_lines: self.excerpt_lines,
        }
    }
}

use std::path::PathBuf;
use std::time::Duration;

use serde::{Serialize, Serializer};

/// A single external-tool invocation: what to run, where, and for how long.
///
/// Constructed once per check and never mutated afterwards. Each check must
/// build a fresh `Invocation`; no state is carried between checks.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub command: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub timeout: Duration,
}

impl Invocation {
    pub fn new(command: Vec<String>, timeout: Duration) -> Self {
        Self {
            command,
            working_dir: None,
            timeout,
        }
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// The program to spawn (first element of the command), or "" when the
    /// command is empty and validation will reject it anyway.
    pub fn program(&self) -> &str {
        self.command.first().map(String::as_str).unwrap_or("")
    }
}

/// What came back from one completed invocation: the tool's exit code, its
/// stdout and stderr interleaved into one buffer, and how long it ran.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionResult {
    pub exit_code: i32,
    pub combined_output: String,
    #[serde(rename = "duration_secs", serialize_with = "duration_secs")]
    pub duration: Duration,
}

fn duration_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

use thiserror::Error;

#[derive(Debug, Error)]
#[allow(dead_code)] // NOTE: TBA in future iterations (unified error handling)
pub enum DriftcheckError {
    #[error(transparent)]
    Runner(#[from] crate::runner::RunnerError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

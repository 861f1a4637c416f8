use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RotateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Input is empty: there is no bit to wrap around")]
    EmptyInput,

    #[error("Incorrect direction ({0}). Must be left or right")]
    InvalidDirection(String),

    #[error("Invalid chunk size: {0}. Must be at least 1 byte")]
    InvalidChunkSize(usize),

    #[error("Unsupported report format: {0}. Must be text or json")]
    UnsupportedReportFormat(String),

    #[error("Output {} is the input file; rotating a file in place is not supported", .0.display())]
    SamePath(PathBuf),
}

pub type Result<T> = std::result::Result<T, RotateError>;

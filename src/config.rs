use crate::error::{Result, RotateError};
use serde::{Deserialize, Serialize};

/// Bytes read, rotated and written per chunk unless overridden
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Check a chunk size is usable (at least one byte)
pub fn validate_chunk_size(chunk_size: usize) -> Result<usize> {
    if chunk_size == 0 {
        return Err(RotateError::InvalidChunkSize(chunk_size));
    }
    Ok(chunk_size)
}

/// How a finished rotation is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Text,
    Json,
}

impl std::str::FromStr for ReportFormat {
    type Err = RotateError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(RotateError::UnsupportedReportFormat(s.to_string())),
        }
    }
}

/// Options for rotating a file
#[derive(Debug, Clone)]
pub struct RotateOptions {
    pub chunk_size: usize,
    pub report: Option<ReportFormat>,
}

impl Default for RotateOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            report: None,
        }
    }
}

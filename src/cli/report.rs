use crate::config::ReportFormat;
use crate::error::Result;
use crate::rotator::RotationStats;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Summary of one file rotation
#[derive(Debug, Clone, Serialize)]
pub struct RotateReport {
    pub input: PathBuf,
    pub output: PathBuf,
    #[serde(flatten)]
    pub stats: RotationStats,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl RotateReport {
    /// Render in the requested format
    pub fn render(&self, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Text => Ok(self.to_string()),
            ReportFormat::Json => {
                let mut json = serde_json::to_string_pretty(self)?;
                json.push('\n');
                Ok(json)
            }
        }
    }
}

impl fmt::Display for RotateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Rotation Summary")?;
        writeln!(f, "================")?;
        writeln!(f)?;
        writeln!(f, "Input: {}", self.input.display())?;
        writeln!(f, "Output: {}", self.output.display())?;
        writeln!(f, "Direction: {}", self.stats.direction)?;
        writeln!(f)?;
        writeln!(f, "Stream:")?;
        writeln!(f, "  Size: {} ({} bytes)", format_size(self.stats.bytes), self.stats.bytes)?;
        writeln!(f, "  Chunk size: {} bytes", self.stats.chunk_size)?;
        writeln!(f, "  Chunks: {}", self.stats.chunks)?;
        writeln!(f, "  Wraparound bit: {}", self.stats.wraparound_bit)?;
        writeln!(f, "  Elapsed: {:?}", self.elapsed)
    }
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.1} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

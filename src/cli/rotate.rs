use crate::cli::report::RotateReport;
use crate::config::RotateOptions;
use crate::direction::Direction;
use crate::error::{Result, RotateError};
use crate::rotator::StreamRotator;
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::time::Instant;
use tracing::{info, instrument};

/// Rotate the whole of `input_path` by one bit and write it to `output_path`.
///
/// The output is created or truncated. It may not be the input file itself,
/// since truncating it would destroy the data before it is read.
#[instrument(skip(options), fields(chunk_size = options.chunk_size), level = "info")]
pub fn rotate_file(
    input_path: &Path,
    output_path: &Path,
    direction: Direction,
    options: &RotateOptions,
) -> Result<RotateReport> {
    let started = Instant::now();
    let rotator = StreamRotator::new(direction).with_chunk_size(options.chunk_size)?;

    let mut input = File::open(input_path)?;
    if is_same_file(input_path, output_path)? {
        return Err(RotateError::SamePath(output_path.to_path_buf()));
    }
    let mut output = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(output_path)?;

    let stats = rotator.rotate(&mut input, &mut output)?;
    output.sync_all()?;

    let elapsed = started.elapsed();
    info!(
        bytes = stats.bytes,
        chunks = stats.chunks,
        ?elapsed,
        "rotated {} {} into {}",
        input_path.display(),
        direction,
        output_path.display()
    );

    Ok(RotateReport {
        input: input_path.to_path_buf(),
        output: output_path.to_path_buf(),
        stats,
        elapsed,
    })
}

/// Whether both paths name the same existing file. Compares file identity,
/// so symlinks and hard links to the input are caught too.
fn is_same_file(a: &Path, b: &Path) -> Result<bool> {
    if !b.exists() {
        return Ok(false);
    }
    Ok(same_file::is_same_file(a, b)?)
}

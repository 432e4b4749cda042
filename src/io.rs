//! Sample file reader.
//!
//! One sample per line, three tab- or whitespace-separated floating-point
//! fields. Blank lines are skipped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::CalibrationError;
use crate::fit::Sample;

/// Read magnetometer samples from a text file.
///
/// Reports `Parse` with the 1-based line number for the first malformed
/// line, and `Io` for filesystem failures.
pub fn read_samples(path: impl AsRef<Path>) -> Result<Vec<Sample>, CalibrationError> {
    let reader = BufReader::new(File::open(path)?);
    let mut samples = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        samples.push(parse_line(trimmed).ok_or(CalibrationError::Parse { line: idx + 1 })?);
    }
    Ok(samples)
}

fn parse_line(line: &str) -> Option<Sample> {
    let mut fields = line.split_whitespace();
    let x = fields.next()?.parse().ok()?;
    let y = fields.next()?.parse().ok()?;
    let z = fields.next()?.parse().ok()?;
    Some(Sample { x, y, z })
}

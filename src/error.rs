use thiserror::Error;

use crate::linalg::LinalgError;

/// Errors surfaced by the calibration pipeline and its input reader.
#[derive(Debug, Error)]
pub enum CalibrationError {
    /// The input file could not be opened or read.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A line of the input file did not parse as three floating-point
    /// fields.
    #[error("malformed sample on line {line}")]
    Parse { line: usize },

    /// Fewer samples than the 10-parameter fit requires.
    #[error("insufficient samples: got {got}, need at least 10")]
    InsufficientSamples { got: usize },

    /// A numeric stage failed (degenerate geometry or non-convergence).
    #[error(transparent)]
    Numeric(#[from] LinalgError),
}

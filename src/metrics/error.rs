use thiserror::Error;

use crate::generator::OutputKind;

/// Errors raised while a generator scores a batch.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MetricError {
    /// The score matrix columns do not line up with the classes found in `y_true`.
    #[error(
        "Score matrix has {columns} columns but y_true contains {classes} distinct classes"
    )]
    ShapeMismatch {
        /// Cardinality of the class index resolved from `y_true`.
        classes: usize,
        /// Column count of the supplied score matrix.
        columns: usize,
    },
    /// Failure raised from inside the generator body.
    #[error("Metric generator failed: {0}")]
    Execution(#[from] ExecutionError),
}

/// Errors produced by generator code while it runs, passed through to the caller unchanged.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExecutionError {
    /// `y_true` and the model output describe a different number of samples.
    #[error("y_true has {expected} samples but the model output has {found}")]
    LengthMismatch { expected: usize, found: usize },
    /// No samples were supplied.
    #[error("Cannot score an empty batch")]
    EmptyInput,
    /// Binary averaging was asked to score more than two distinct labels.
    #[error("Binary averaging needs at most 2 distinct labels across y_true and predictions, found {labels}")]
    NotBinary { labels: usize },
    /// The generator was handed the other output variant.
    #[error("Generator expects {expected} output but received {found}")]
    OutputKind {
        expected: OutputKind,
        found: OutputKind,
    },
}

/// Check that `y_true` is non-empty and matches the output sample count.
pub(crate) fn check_lengths(expected: usize, found: usize) -> Result<(), ExecutionError> {
    if expected == 0 {
        return Err(ExecutionError::EmptyInput);
    }
    if expected != found {
        return Err(ExecutionError::LengthMismatch { expected, found });
    }
    Ok(())
}

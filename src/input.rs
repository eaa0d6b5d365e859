//! JSON scoring batches for the command-line tools.
//!
//! ```json
//! { "y_true": [0, 1, 1, 0], "y_output": [[0.9, 0.1], [0.2, 0.8], [0.6, 0.4], [0.7, 0.3]] }
//! ```
//!
//! `y_output` is a score matrix when its elements are arrays and a prediction vector
//! otherwise. Labels may be integers or strings.

use std::fmt;
use std::path::{Path, PathBuf};

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::generator::{ModelOutput, OutputKind};

/// Class label decoded from JSON.
///
/// Integers order before strings so mixed label sets still have one canonical ordering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Int(i64),
    Text(String),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Int(value) => write!(f, "{value}"),
            Label::Text(value) => f.write_str(value),
        }
    }
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid scoring input: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Score matrix row {row} has {found} columns, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawOutput {
    Scores(Vec<Vec<f64>>),
    Predictions(Vec<Label>),
}

#[derive(Debug, Clone, Deserialize)]
struct RawBatch {
    y_true: Vec<Label>,
    y_output: RawOutput,
}

/// Owned model output.
#[derive(Debug, Clone, PartialEq)]
pub enum OwnedOutput {
    Scores(Array2<f64>),
    Predictions(Vec<Label>),
}

/// Ground truth plus model output, ready to score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringBatch {
    pub y_true: Vec<Label>,
    pub y_output: OwnedOutput,
}

impl ScoringBatch {
    pub fn from_json_str(text: &str) -> Result<Self, InputError> {
        let raw: RawBatch = serde_json::from_str(text)?;
        let y_output = match raw.y_output {
            RawOutput::Scores(rows) => OwnedOutput::Scores(rows_to_matrix(rows)?),
            RawOutput::Predictions(labels) => OwnedOutput::Predictions(labels),
        };
        Ok(Self {
            y_true: raw.y_true,
            y_output,
        })
    }

    pub fn load(path: &Path) -> Result<Self, InputError> {
        let text = std::fs::read_to_string(path).map_err(|source| InputError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn output_kind(&self) -> OutputKind {
        self.output().kind()
    }

    /// Borrowed view for [`MetricGenerator::evaluate`](crate::generator::MetricGenerator::evaluate).
    pub fn output(&self) -> ModelOutput<'_, Label> {
        match &self.y_output {
            OwnedOutput::Scores(scores) => ModelOutput::Scores(scores.view()),
            OwnedOutput::Predictions(preds) => ModelOutput::Predictions(preds),
        }
    }
}

fn rows_to_matrix(rows: Vec<Vec<f64>>) -> Result<Array2<f64>, InputError> {
    let n_rows = rows.len();
    let n_cols = rows.first().map(Vec::len).unwrap_or(0);
    let mut flat = Vec::with_capacity(n_rows * n_cols);
    for (row_idx, row) in rows.into_iter().enumerate() {
        if row.len() != n_cols {
            return Err(InputError::RaggedRow {
                row: row_idx,
                expected: n_cols,
                found: row.len(),
            });
        }
        flat.extend(row);
    }
    Ok(Array2::from_shape_vec((n_rows, n_cols), flat)
        .unwrap_or_else(|_| unreachable!("row lengths checked above")))
}

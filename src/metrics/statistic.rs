use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::averaging::Averaging;
use super::class_index::ClassLabel;
use super::confusion::{ClassCounts, ConfusionMatrix};
use super::error::ExecutionError;

/// Scalar statistics a generator can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Statistic {
    Accuracy,
    Recall,
    Precision,
    F1,
}

impl Statistic {
    pub const ALL: [Statistic; 4] = [
        Statistic::Accuracy,
        Statistic::Recall,
        Statistic::Precision,
        Statistic::F1,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Statistic::Accuracy => "accuracy",
            Statistic::Recall => "recall",
            Statistic::Precision => "precision",
            Statistic::F1 => "f1",
        }
    }

    /// Whether the statistic depends on an averaging strategy.
    pub fn needs_averaging(self) -> bool {
        !matches!(self, Statistic::Accuracy)
    }

    /// Score hard predictions. `averaging` is ignored for accuracy.
    ///
    /// For [`Averaging::Binary`] the positive class is the greatest label seen in `y_true` or
    /// `y_pred`, and more than two distinct labels is an error.
    pub fn compute<L: ClassLabel>(
        self,
        y_true: &[L],
        y_pred: &[L],
        averaging: Averaging,
    ) -> Result<f64, ExecutionError> {
        if self == Statistic::Accuracy {
            return Ok(accuracy(y_true, y_pred));
        }
        let cm = ConfusionMatrix::from_labels(y_true, y_pred);
        let pick = |counts: ClassCounts| match self {
            Statistic::Recall => counts.recall(),
            Statistic::Precision => counts.precision(),
            _ => counts.f1(),
        };
        let k = cm.n_classes();
        let score = match averaging {
            Averaging::Binary if k > 2 => return Err(ExecutionError::NotBinary { labels: k }),
            Averaging::Binary if k == 0 => 0.0,
            Averaging::Binary => pick(cm.counts_for(k - 1)),
            Averaging::Micro => pick(cm.pooled_counts()),
            Averaging::Macro if k == 0 => 0.0,
            Averaging::Macro => {
                let sum: f64 = (0..k).map(|idx| pick(cm.counts_for(idx))).sum();
                sum / k as f64
            }
        };
        Ok(score)
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Statistic {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Statistic::ALL
            .into_iter()
            .find(|stat| stat.as_str() == value)
            .ok_or_else(|| format!("Unknown statistic \"{value}\""))
    }
}

/// Fraction of positions where prediction equals truth.
pub fn accuracy<L: ClassLabel>(y_true: &[L], y_pred: &[L]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    correct as f64 / y_true.len() as f64
}

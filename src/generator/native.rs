//! Compiled-in generators for each [`Statistic`].

use crate::metrics::{
    Averaging, ClassIndex, ClassLabel, ExecutionError, MetricError, Statistic,
    error::check_lengths, project, select_strategy, validate_shape,
};

use super::{MetricGenerator, ModelOutput, OutputKind};

/// Generator backed directly by Rust code rather than source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeGenerator {
    pub statistic: Statistic,
    pub output: OutputKind,
}

impl NativeGenerator {
    pub fn new(statistic: Statistic, output: OutputKind) -> Self {
        Self { statistic, output }
    }
}

impl<L: ClassLabel> MetricGenerator<L> for NativeGenerator {
    fn output_kind(&self) -> OutputKind {
        self.output
    }

    fn evaluate(&self, y_true: &[L], y_output: ModelOutput<'_, L>) -> Result<f64, MetricError> {
        if y_output.kind() != self.output {
            return Err(ExecutionError::OutputKind {
                expected: self.output,
                found: y_output.kind(),
            }
            .into());
        }
        check_lengths(y_true.len(), y_output.len())?;
        let score = match y_output {
            ModelOutput::Scores(scores) => {
                let classes = ClassIndex::resolve(y_true);
                validate_shape(&classes, scores)?;
                let y_pred = project(&classes, scores);
                self.statistic
                    .compute(y_true, &y_pred, select_strategy(&classes))?
            }
            ModelOutput::Predictions(y_pred) => {
                let averaging = if self.statistic.needs_averaging() {
                    select_strategy(&ClassIndex::resolve(y_true))
                } else {
                    Averaging::Binary
                };
                self.statistic.compute(y_true, y_pred, averaging)?
            }
        };
        tracing::trace!(statistic = %self.statistic, output = %self.output, score, "native metric");
        Ok(score)
    }
}

//! Script loader for generator source text.
//!
//! Generators are written in a small, loop-free language with one entry point:
//!
//! ```text
//! def metric_generator(y_true, y_probas):
//!     classes = unique(y_true)
//!     check_shape(classes, y_probas)
//!     y_preds = project(classes, y_probas)
//!     return recall(y_true, y_preds, strategy(classes))
//! ```
//!
//! Builtins:
//! - `unique(labels) -> classes`
//! - `check_shape(classes, scores)`
//! - `project(classes, scores) -> labels`
//! - `strategy(classes) -> averaging`
//! - `accuracy(labels, labels) -> score`
//! - `recall | precision | f1 (labels, labels[, averaging]) -> score`
//!
//! Averaging may be written as `"binary"`, `"micro"` or `"macro"`; when omitted it is
//! `strategy(unique(<first argument>))`. Every name, type and arity is checked at load time,
//! and a score matrix must pass `check_shape` against the same classes before `project` may
//! read it.

mod compile;
mod eval;
mod parse;

pub use compile::ValueType;

use crate::metrics::{ClassLabel, ExecutionError, MetricError, error::check_lengths};

use super::{
    GeneratorDefinition, GeneratorLoader, LoadError, MetricGenerator, ModelOutput, OutputKind,
};
use compile::Program;
use eval::Input;

/// Loader that compiles definitions written in the metric script language.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptLoader;

impl ScriptLoader {
    /// Parse and type-check a definition.
    pub fn compile(
        &self,
        definition: &GeneratorDefinition,
    ) -> Result<ScriptedGenerator, LoadError> {
        let module = parse::parse_module(&definition.source)?;
        let program = compile::compile(module, definition.output)?;
        tracing::debug!(
            name = %definition.name,
            entry = %program.entry,
            output = %definition.output,
            steps = program.steps.len(),
            "Compiled metric generator"
        );
        Ok(ScriptedGenerator {
            name: definition.name.clone(),
            program,
        })
    }
}

impl<L: ClassLabel> GeneratorLoader<L> for ScriptLoader {
    fn load(
        &self,
        definition: &GeneratorDefinition,
    ) -> Result<Box<dyn MetricGenerator<L>>, LoadError> {
        Ok(Box::new(self.compile(definition)?))
    }
}

/// Generator compiled from script source.
#[derive(Debug, Clone)]
pub struct ScriptedGenerator {
    name: String,
    program: Program,
}

impl ScriptedGenerator {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the entry point function in the source.
    pub fn entry_point(&self) -> &str {
        &self.program.entry
    }
}

impl<L: ClassLabel> MetricGenerator<L> for ScriptedGenerator {
    fn output_kind(&self) -> OutputKind {
        self.program.output
    }

    fn evaluate(&self, y_true: &[L], y_output: ModelOutput<'_, L>) -> Result<f64, MetricError> {
        if y_output.kind() != self.program.output {
            return Err(ExecutionError::OutputKind {
                expected: self.program.output,
                found: y_output.kind(),
            }
            .into());
        }
        check_lengths(y_true.len(), y_output.len())?;
        let input = match y_output {
            ModelOutput::Scores(scores) => Input::Scores(scores.reborrow()),
            ModelOutput::Predictions(preds) => Input::Labels(preds),
        };
        let result = eval::run(&self.program, y_true, input);
        if let Err(err) = &result {
            tracing::debug!(name = %self.name, error = %err, "Metric generator failed");
        }
        result
    }
}

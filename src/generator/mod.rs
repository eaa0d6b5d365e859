//! Metric generator contract, loaders and the preset registry.
//!
//! A generator takes ground-truth labels plus model output and returns one score. Definitions
//! are plain source text tagged with the output shape they expect; a [`GeneratorLoader`] turns
//! a definition into something callable.

mod errors;
pub mod native;
pub mod presets;
pub mod script;

use std::fmt;

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

use crate::metrics::{ClassLabel, MetricError};

pub use errors::LoadError;
pub use native::NativeGenerator;
pub use presets::{Registry, RegistryEntry, RegistryError, presets};
pub use script::{ScriptLoader, ScriptedGenerator};

/// Which shape of model output a generator consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// `N x C` score/probability matrix, columns in sorted class order.
    Scores,
    /// One predicted label per sample.
    Predictions,
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputKind::Scores => "scores",
            OutputKind::Predictions => "predictions",
        })
    }
}

/// Model output handed to a generator.
#[derive(Debug)]
pub enum ModelOutput<'a, L> {
    Scores(ArrayView2<'a, f64>),
    Predictions(&'a [L]),
}

impl<L> Clone for ModelOutput<'_, L> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<L> Copy for ModelOutput<'_, L> {}

impl<L> ModelOutput<'_, L> {
    pub fn kind(&self) -> OutputKind {
        match self {
            ModelOutput::Scores(_) => OutputKind::Scores,
            ModelOutput::Predictions(_) => OutputKind::Predictions,
        }
    }

    /// Number of samples described by the output.
    pub fn len(&self) -> usize {
        match self {
            ModelOutput::Scores(scores) => scores.nrows(),
            ModelOutput::Predictions(preds) => preds.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Anything that turns `(y_true, y_output)` into a score.
///
/// Implementations must be pure: the same inputs always produce the same score.
pub trait MetricGenerator<L: ClassLabel>: Send + Sync {
    /// Output variant this generator accepts.
    fn output_kind(&self) -> OutputKind;

    /// Score one batch.
    fn evaluate(&self, y_true: &[L], y_output: ModelOutput<'_, L>) -> Result<f64, MetricError>;
}

impl<L: ClassLabel> fmt::Debug for dyn MetricGenerator<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricGenerator")
            .field("output_kind", &self.output_kind())
            .finish_non_exhaustive()
    }
}

/// Named generator source, tagged with the output shape it consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorDefinition {
    /// Human-readable label for display.
    pub name: String,
    /// Generator body; see [`script`] for the language.
    pub source: String,
    /// Output variant the entry point's second parameter receives.
    pub output: OutputKind,
}

impl GeneratorDefinition {
    pub fn new(name: impl Into<String>, source: impl Into<String>, output: OutputKind) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            output,
        }
    }
}

/// Capability that compiles a [`GeneratorDefinition`] into a callable generator.
///
/// Loaders reject definitions that break the contract before any scoring happens.
pub trait GeneratorLoader<L: ClassLabel> {
    fn load(
        &self,
        definition: &GeneratorDefinition,
    ) -> Result<Box<dyn MetricGenerator<L>>, LoadError>;
}

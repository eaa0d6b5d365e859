//! Metric generators for scoring model output against ground truth.
/// Application directory resolution.
pub mod app_dirs;
/// User generator configuration.
pub mod config;
/// Generator contract, script loader and presets.
pub mod generator;
/// JSON scoring batches.
pub mod input;
/// Tracing setup for binaries.
pub mod logging;
/// Class alignment, projection, averaging and statistics.
pub mod metrics;

pub use generator::{
    GeneratorDefinition, GeneratorLoader, LoadError, MetricGenerator, ModelOutput, OutputKind,
    ScriptLoader, presets,
};
pub use metrics::{Averaging, ClassIndex, ClassLabel, ExecutionError, MetricError, Statistic};

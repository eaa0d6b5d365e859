//! Built-in generator definitions and the registry that serves them.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use serde::Serialize;
use thiserror::Error;

use crate::config::{ConfigError, GeneratorsConfig};
use crate::metrics::ClassLabel;

use super::{GeneratorDefinition, GeneratorLoader, LoadError, MetricGenerator, OutputKind};

const ACCURACY_FROM_SCORES: &str = r#"# Accuracy from a score/probability matrix of shape (num_samples, num_classes).
# Columns must follow the sorted unique values of y_true.
def metric_generator(y_true, y_probas):
    classes = unique(y_true)
    check_shape(classes, y_probas)
    y_preds = project(classes, y_probas)
    return accuracy(y_true, y_preds)
"#;

const ACCURACY_FROM_PREDS: &str = r#"# Accuracy from predicted labels.
def metric_generator(y_true, y_preds):
    return accuracy(y_true, y_preds)
"#;

const RECALL_FROM_SCORES: &str = r#"# Recall from a score/probability matrix of shape (num_samples, num_classes).
# Columns must follow the sorted unique values of y_true.
# More than two classes use micro-averaging.
def metric_generator(y_true, y_probas):
    classes = unique(y_true)
    check_shape(classes, y_probas)
    y_preds = project(classes, y_probas)
    return recall(y_true, y_preds, strategy(classes))
"#;

const RECALL_FROM_PREDS: &str = r#"# Recall from predicted labels. More than two classes use micro-averaging.
def metric_generator(y_true, y_preds):
    classes = unique(y_true)
    return recall(y_true, y_preds, strategy(classes))
"#;

const PRECISION_FROM_SCORES: &str = r#"# Precision from a score/probability matrix of shape (num_samples, num_classes).
# Columns must follow the sorted unique values of y_true.
# More than two classes use micro-averaging.
def metric_generator(y_true, y_probas):
    classes = unique(y_true)
    check_shape(classes, y_probas)
    y_preds = project(classes, y_probas)
    return precision(y_true, y_preds, strategy(classes))
"#;

const PRECISION_FROM_PREDS: &str = r#"# Precision from predicted labels. More than two classes use micro-averaging.
def metric_generator(y_true, y_preds):
    classes = unique(y_true)
    return precision(y_true, y_preds, strategy(classes))
"#;

const F1_FROM_SCORES: &str = r#"# F1 score from a score/probability matrix of shape (num_samples, num_classes).
# Columns must follow the sorted unique values of y_true.
# More than two classes use micro-averaging.
def metric_generator(y_true, y_probas):
    classes = unique(y_true)
    check_shape(classes, y_probas)
    y_preds = project(classes, y_probas)
    return f1(y_true, y_preds, strategy(classes))
"#;

const F1_FROM_PREDS: &str = r#"# F1 score from predicted labels. More than two classes use micro-averaging.
def metric_generator(y_true, y_preds):
    classes = unique(y_true)
    return f1(y_true, y_preds, strategy(classes))
"#;

const PRESETS: &[(&str, &str, OutputKind, &str)] = &[
    ("accuracy_from_scores", "Accuracy", OutputKind::Scores, ACCURACY_FROM_SCORES),
    ("accuracy_from_preds", "Accuracy", OutputKind::Predictions, ACCURACY_FROM_PREDS),
    ("recall_from_scores", "Recall", OutputKind::Scores, RECALL_FROM_SCORES),
    ("recall_from_preds", "Recall", OutputKind::Predictions, RECALL_FROM_PREDS),
    ("precision_from_scores", "Precision", OutputKind::Scores, PRECISION_FROM_SCORES),
    ("precision_from_preds", "Precision", OutputKind::Predictions, PRECISION_FROM_PREDS),
    ("f1_from_scores", "F1 Score", OutputKind::Scores, F1_FROM_SCORES),
    ("f1_from_preds", "F1 Score", OutputKind::Predictions, F1_FROM_PREDS),
];

static PRESET_REGISTRY: LazyLock<Registry> = LazyLock::new(|| {
    let entries = PRESETS
        .iter()
        .map(|&(key, name, output, source)| {
            (key.to_string(), GeneratorDefinition::new(name, source, output))
        })
        .collect();
    Registry { entries }
});

/// Process-wide preset registry.
pub fn presets() -> &'static Registry {
    &PRESET_REGISTRY
}

/// Errors resolving a generator by key.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("No metric generator registered under `{0}`")]
    UnknownKey(String),
    #[error("Metric generator `{key}` is invalid: {source}")]
    Load { key: String, source: LoadError },
}

/// Read-only mapping from key to generator definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    entries: BTreeMap<String, GeneratorDefinition>,
}

/// Registry entry as exposed to consumers.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RegistryEntry {
    pub key: String,
    #[serde(flatten)]
    pub definition: GeneratorDefinition,
}

impl Registry {
    /// Presets plus the generators declared in `config`.
    ///
    /// User keys may not shadow a preset or each other.
    pub fn with_user_generators(config: &GeneratorsConfig) -> Result<Self, ConfigError> {
        let mut registry = presets().clone();
        for generator in &config.generators {
            if registry.entries.contains_key(&generator.key) {
                return Err(ConfigError::DuplicateKey {
                    key: generator.key.clone(),
                });
            }
            registry
                .entries
                .insert(generator.key.clone(), generator.definition());
        }
        tracing::debug!(
            user = config.generators.len(),
            total = registry.entries.len(),
            "Built metric generator registry"
        );
        Ok(registry)
    }

    pub fn get(&self, key: &str) -> Option<&GeneratorDefinition> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &GeneratorDefinition)> {
        self.entries.iter().map(|(key, def)| (key.as_str(), def))
    }

    /// Snapshot of every entry for display or serialization.
    pub fn entries(&self) -> Vec<RegistryEntry> {
        self.entries
            .iter()
            .map(|(key, definition)| RegistryEntry {
                key: key.clone(),
                definition: definition.clone(),
            })
            .collect()
    }

    /// Resolve `key` and compile it with `loader`.
    pub fn load<L: ClassLabel>(
        &self,
        key: &str,
        loader: &dyn GeneratorLoader<L>,
    ) -> Result<Box<dyn MetricGenerator<L>>, RegistryError> {
        let definition = self
            .get(key)
            .ok_or_else(|| RegistryError::UnknownKey(key.to_string()))?;
        loader.load(definition).map_err(|source| RegistryError::Load {
            key: key.to_string(),
            source,
        })
    }
}

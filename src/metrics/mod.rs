//! Validation and scoring building blocks shared by every metric generator.
//!
//! Score-based generators run these in a fixed order: resolve the class index from `y_true`,
//! validate the score matrix against it, project to hard predictions, pick an averaging
//! strategy, then compute the statistic.

pub mod averaging;
pub mod class_index;
pub mod confusion;
pub mod error;
pub mod projection;
pub mod shape;
pub mod statistic;

pub use averaging::{Averaging, select_strategy};
pub use class_index::{ClassIndex, ClassLabel};
pub use confusion::{ConfusionMatrix, PerClassStats, precision_recall_by_class};
pub use error::{ExecutionError, MetricError};
pub use projection::{argmax, project};
pub use shape::validate_shape;
pub use statistic::{Statistic, accuracy};

use ndarray::ArrayView2;

use super::class_index::{ClassIndex, ClassLabel};
use super::error::MetricError;

/// Require one score column per class in `class_index`.
///
/// Must run before [`project`](super::projection::project); mismatched matrices are never
/// truncated or padded.
pub fn validate_shape<L: ClassLabel>(
    class_index: &ClassIndex<L>,
    scores: ArrayView2<'_, f64>,
) -> Result<(), MetricError> {
    let columns = scores.ncols();
    if class_index.len() != columns {
        return Err(MetricError::ShapeMismatch {
            classes: class_index.len(),
            columns,
        });
    }
    Ok(())
}

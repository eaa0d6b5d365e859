use ndarray::{ArrayView1, ArrayView2};

use super::class_index::{ClassIndex, ClassLabel};

/// Convert a score matrix into hard predictions.
///
/// Each row resolves to the label at its arg-max column. Callers validate the shape first;
/// rows wider than the class index are a programming error.
pub fn project<L: ClassLabel>(class_index: &ClassIndex<L>, scores: ArrayView2<'_, f64>) -> Vec<L> {
    scores
        .rows()
        .into_iter()
        .map(|row| class_index.labels()[argmax(row)].clone())
        .collect()
}

/// Index of the largest value; ties go to the lowest index and NaN never wins.
pub fn argmax(row: ArrayView1<'_, f64>) -> usize {
    let mut best_idx = 0usize;
    let mut best = f64::NAN;
    for (idx, &value) in row.iter().enumerate() {
        if value > best || (best.is_nan() && !value.is_nan()) {
            best = value;
            best_idx = idx;
        }
    }
    best_idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn picks_label_at_max_column() {
        let index = ClassIndex::resolve(&[0, 1, 2]);
        let scores = array![[0.1, 0.7, 0.2]];
        assert_eq!(project(&index, scores.view()), vec![1]);
    }

    #[test]
    fn maps_through_sorted_string_labels() {
        let index = ClassIndex::resolve(&["spam", "ham", "eggs"]);
        let scores = array![[0.8, 0.1, 0.1], [0.1, 0.1, 0.8], [0.2, 0.6, 0.2]];
        assert_eq!(project(&index, scores.view()), vec!["eggs", "spam", "ham"]);
    }

    #[test]
    fn ties_resolve_to_lowest_column() {
        let row = array![0.4, 0.4, 0.2];
        assert_eq!(argmax(row.view()), 0);
        let row = array![0.1, 0.45, 0.45];
        assert_eq!(argmax(row.view()), 1);
    }

    #[test]
    fn nan_entries_are_skipped() {
        let row = array![f64::NAN, 0.3, 0.2];
        assert_eq!(argmax(row.view()), 1);
        let row = array![f64::NAN, f64::NAN];
        assert_eq!(argmax(row.view()), 0);
    }

    #[test]
    fn negative_scores_are_supported() {
        let row = array![-3.0, -0.5, -1.0];
        assert_eq!(argmax(row.view()), 1);
    }
}

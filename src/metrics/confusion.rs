//! Confusion counts and the per-class rates derived from them.

use super::class_index::{ClassIndex, ClassLabel};

/// Confusion matrix for a `K`-class problem.
#[derive(Debug, Clone)]
pub struct ConfusionMatrix<L> {
    classes: ClassIndex<L>,
    /// Row-major `KxK` counts (`truth * K + predicted`).
    counts: Vec<u32>,
}

/// Precision/recall statistics for a single class.
#[derive(Debug, Clone, PartialEq)]
pub struct PerClassStats {
    /// `TP / (TP + FP)`.
    pub precision: f64,
    /// `TP / (TP + FN)`.
    pub recall: f64,
    /// Harmonic mean of precision and recall.
    pub f1: f64,
    /// Total number of true examples for the class.
    pub support: u32,
}

impl<L: ClassLabel> ConfusionMatrix<L> {
    /// Tally paired labels over every class seen in either array.
    ///
    /// Pairs beyond the shorter array are ignored; callers check lengths up front.
    pub fn from_labels(y_true: &[L], y_pred: &[L]) -> Self {
        let classes = ClassIndex::resolve_union(y_true, y_pred);
        let k = classes.len();
        let mut cm = Self {
            classes,
            counts: vec![0; k * k],
        };
        for (truth, predicted) in y_true.iter().zip(y_pred) {
            let (Some(t), Some(p)) = (cm.classes.position(truth), cm.classes.position(predicted))
            else {
                continue;
            };
            cm.add(t, p);
        }
        cm
    }

    fn add(&mut self, truth: usize, predicted: usize) {
        let idx = truth * self.n_classes() + predicted;
        self.counts[idx] = self.counts[idx].saturating_add(1);
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn classes(&self) -> &ClassIndex<L> {
        &self.classes
    }

    pub fn get(&self, truth: usize, predicted: usize) -> u32 {
        self.counts[truth * self.n_classes() + predicted]
    }

    /// True positives, false positives and false negatives for one class.
    pub fn counts_for(&self, class_idx: usize) -> ClassCounts {
        let k = self.n_classes();
        let tp = self.get(class_idx, class_idx) as u64;
        let mut fp = 0u64;
        let mut fn_ = 0u64;
        for other in 0..k {
            if other == class_idx {
                continue;
            }
            fn_ += self.get(class_idx, other) as u64;
            fp += self.get(other, class_idx) as u64;
        }
        ClassCounts { tp, fp, fn_ }
    }

    /// Counts summed over every class.
    pub fn pooled_counts(&self) -> ClassCounts {
        (0..self.n_classes())
            .map(|idx| self.counts_for(idx))
            .fold(ClassCounts::default(), |acc, c| ClassCounts {
                tp: acc.tp + c.tp,
                fp: acc.fp + c.fp,
                fn_: acc.fn_ + c.fn_,
            })
    }

    /// Overall exact-match rate.
    pub fn accuracy(&self) -> f64 {
        let total: u64 = self.counts.iter().map(|&v| v as u64).sum();
        let correct: u64 = (0..self.n_classes()).map(|i| self.get(i, i) as u64).sum();
        ratio(correct, total)
    }
}

/// Raw counts behind precision and recall.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassCounts {
    pub tp: u64,
    pub fp: u64,
    pub fn_: u64,
}

impl ClassCounts {
    pub fn precision(&self) -> f64 {
        ratio(self.tp, self.tp + self.fp)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.tp, self.tp + self.fn_)
    }

    pub fn f1(&self) -> f64 {
        harmonic_mean(self.precision(), self.recall())
    }
}

/// Compute per-class precision and recall, in class index order.
pub fn precision_recall_by_class<L: ClassLabel>(cm: &ConfusionMatrix<L>) -> Vec<PerClassStats> {
    (0..cm.n_classes())
        .map(|class_idx| {
            let counts = cm.counts_for(class_idx);
            PerClassStats {
                precision: counts.precision(),
                recall: counts.recall(),
                f1: counts.f1(),
                support: (counts.tp + counts.fn_) as u32,
            }
        })
        .collect()
}

/// Zero denominators score as zero.
fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn harmonic_mean(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_land_in_truth_by_prediction_cells() {
        let cm = ConfusionMatrix::from_labels(&[0, 1, 1, 0], &[0, 1, 0, 0]);
        assert_eq!(cm.n_classes(), 2);
        assert_eq!(cm.get(0, 0), 2);
        assert_eq!(cm.get(1, 0), 1);
        assert_eq!(cm.get(1, 1), 1);
        assert_eq!(cm.get(0, 1), 0);
        assert_eq!(cm.accuracy(), 0.75);
    }

    #[test]
    fn predicted_only_labels_extend_the_matrix() {
        let cm = ConfusionMatrix::from_labels(&["a", "a"], &["a", "z"]);
        assert_eq!(cm.classes().labels(), &["a", "z"]);
        let z = cm.counts_for(1);
        assert_eq!(z, ClassCounts { tp: 0, fp: 1, fn_: 0 });
        assert_eq!(z.recall(), 0.0);
    }

    #[test]
    fn per_class_stats_follow_class_order() {
        let cm = ConfusionMatrix::from_labels(&[0, 1, 2, 1, 2], &[0, 1, 1, 1, 2]);
        let stats = precision_recall_by_class(&cm);
        assert_eq!(stats.len(), 3);
        assert_eq!(stats[0].recall, 1.0);
        assert_eq!(stats[1].recall, 1.0);
        assert_eq!(stats[1].precision, 2.0 / 3.0);
        assert_eq!(stats[2].recall, 0.5);
        assert_eq!(stats[2].support, 2);
    }

    #[test]
    fn pooled_counts_sum_every_class() {
        let cm = ConfusionMatrix::from_labels(&[0, 1, 2, 1, 2], &[0, 1, 1, 1, 2]);
        let pooled = cm.pooled_counts();
        assert_eq!(pooled, ClassCounts { tp: 4, fp: 1, fn_: 1 });
    }

    #[test]
    fn f1_of_zero_rates_is_zero() {
        let counts = ClassCounts { tp: 0, fp: 3, fn_: 2 };
        assert_eq!(counts.f1(), 0.0);
    }
}

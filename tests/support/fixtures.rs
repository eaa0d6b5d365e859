use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Score matrix that puts `confidence` on each predicted column and spreads the rest.
pub fn one_hot_scores(predicted_columns: &[usize], n_classes: usize, confidence: f64) -> Array2<f64> {
    let rest = (1.0 - confidence) / (n_classes.saturating_sub(1).max(1)) as f64;
    let mut scores = Array2::from_elem((predicted_columns.len(), n_classes), rest);
    for (row, &col) in predicted_columns.iter().enumerate() {
        scores[[row, col]] = confidence;
    }
    scores
}

/// Seeded random labels in `0..n_classes`.
pub fn labels(n: usize, n_classes: u32, seed: u64) -> Vec<u32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| rng.random_range(0..n_classes)).collect()
}

//! Similarity scoring over embedding vectors.

use crate::model::MemoryRecord;

/// Cosine similarity between two vectors.
///
/// Defined as 0.0 when either vector has zero magnitude. Vectors of unequal
/// length are compared over their common prefix.
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Score candidates against a query embedding and keep the top `limit`.
///
/// The sort is stable, so candidates supplied in insertion order keep that
/// order on score ties.
pub fn rank(
    query: &[f32],
    records: Vec<MemoryRecord>,
    limit: usize,
) -> Vec<(MemoryRecord, f32)> {
    let mut scored: Vec<(MemoryRecord, f32)> = records
        .into_iter()
        .map(|record| {
            let score = cosine(query, &record.vector);
            (record, score)
        })
        .collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(limit);
    scored
}

#[cfg(test)]
mod tests {
    use super::{cosine, rank};
    use crate::model::MemoryRecord;
    use pretty_assertions::assert_eq;

    fn record(text: &str, vector: Vec<f32>) -> MemoryRecord {
        MemoryRecord::new(text, "user-1", None, vector).expect("record")
    }

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let similarity = cosine(&[0.6, 0.8], &[0.6, 0.8]);
        assert!((similarity - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        assert_eq!(cosine(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn cosine_of_zero_magnitude_vector_is_zero() {
        assert_eq!(cosine(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine(&[], &[1.0]), 0.0);
    }

    #[test]
    fn rank_orders_by_descending_score_and_truncates() {
        let records = vec![
            record("far", vec![0.0, 1.0, 0.0]),
            record("near", vec![0.9, 0.1, 0.0]),
            record("exact", vec![1.0, 0.0, 0.0]),
        ];
        let ranked = rank(&[1.0, 0.0, 0.0], records, 2);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].0.text, "exact");
        assert_eq!(ranked[1].0.text, "near");
        assert!(ranked[0].1 >= ranked[1].1);
    }

    #[test]
    fn rank_breaks_ties_by_input_order() {
        let records = vec![
            record("first", vec![1.0, 0.0]),
            record("second", vec![1.0, 0.0]),
        ];
        let ranked = rank(&[1.0, 0.0], records, 10);
        assert_eq!(ranked[0].0.text, "first");
        assert_eq!(ranked[1].0.text, "second");
    }

    #[test]
    fn rank_returns_fewer_results_than_limit_when_short() {
        let ranked = rank(&[1.0], vec![record("only", vec![1.0])], 5);
        assert_eq!(ranked.len(), 1);
    }
}

//! Batched cosine similarity over keyword embeddings.
//!
//! All matrices are dense `ndarray` arrays with one row per keyword.

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use seo_types::KeywordRecord;
use tracing::{debug, error, warn};

use crate::error::TopicsError;

/// Stack keyword embeddings into an `N×D` matrix.
///
/// `D` is the length of the first valid embedding in the batch, or
/// `fallback_dimension` when there is none. Invalid embeddings (empty or
/// non-finite) become zero rows; their similarity to everything is 0, so
/// the keyword degrades instead of failing the run.
///
/// Fails when the batch is empty or a valid embedding has a different
/// length than `D`.
pub fn embedding_matrix(
    records: &[KeywordRecord],
    fallback_dimension: usize,
) -> Result<Array2<f64>, TopicsError> {
    if records.is_empty() {
        error!("No keyword records to cluster");
        return Err(TopicsError::InputShape(
            "empty keyword batch".to_string(),
        ));
    }

    let dimension = records
        .iter()
        .find(|r| r.has_valid_embedding())
        .map(KeywordRecord::dimension)
        .unwrap_or(fallback_dimension);

    let mut matrix = Array2::<f64>::zeros((records.len(), dimension));
    let mut degenerate = 0usize;

    for (index, record) in records.iter().enumerate() {
        if !record.has_valid_embedding() {
            warn!(
                keyword = %record.keyword,
                dimension,
                "Invalid embedding, substituting zero vector"
            );
            degenerate += 1;
            continue;
        }

        if record.dimension() != dimension {
            let message = format!(
                "embedding for '{}' has dimension {}, expected {}",
                record.keyword,
                record.dimension(),
                dimension
            );
            error!("{}", message);
            return Err(TopicsError::InputShape(message));
        }

        matrix
            .row_mut(index)
            .assign(&ArrayView1::from(record.embedding.as_slice()));
    }

    debug!(
        rows = records.len(),
        dimension, degenerate, "Built embedding matrix"
    );

    Ok(matrix)
}

/// Pairwise cosine similarity of the rows of `embeddings`.
///
/// Rows are divided by their Euclidean norm; a row with norm exactly 0 is
/// left as is. The similarity matrix is the normalized matrix times its
/// transpose, clipped to `[-1, 1]` and mirrored so it is exactly symmetric.
pub fn similarity_matrix(embeddings: ArrayView2<'_, f64>) -> Result<Array2<f64>, TopicsError> {
    let (rows, dimension) = embeddings.dim();
    if rows == 0 || dimension == 0 {
        let message = format!("cannot compare a {}x{} embedding matrix", rows, dimension);
        error!("{}", message);
        return Err(TopicsError::InputShape(message));
    }

    let mut norms = embeddings.map_axis(Axis(1), |row| row.dot(&row).sqrt());

    let zero_rows = norms.iter().filter(|&&norm| norm == 0.0).count();
    if zero_rows > 0 {
        warn!(
            zero_rows,
            "Zero-norm embeddings present; their similarity scores are meaningless"
        );
    }
    norms.mapv_inplace(|norm| if norm == 0.0 { 1.0 } else { norm });

    let normalized = &embeddings / &norms.insert_axis(Axis(1));
    let mut similarity = normalized.dot(&normalized.t());
    similarity.mapv_inplace(|s| s.clamp(-1.0, 1.0));

    for i in 0..rows {
        for j in (i + 1)..rows {
            similarity[[j, i]] = similarity[[i, j]];
        }
    }

    Ok(similarity)
}

/// Convert similarity to distance: `|1 - similarity|`.
///
/// The absolute value keeps floating-point overshoot from producing
/// negative distances. Entries land in `[0, 2]`.
pub fn distance_matrix(similarity: ArrayView2<'_, f64>) -> Result<Array2<f64>, TopicsError> {
    let (rows, cols) = similarity.dim();
    if rows != cols {
        let message = format!("similarity matrix must be square, got {}x{}", rows, cols);
        error!("{}", message);
        return Err(TopicsError::InputShape(message));
    }

    Ok(similarity.mapv(|s| (1.0 - s).abs()))
}

//! Density-based keyword clustering.
//!
//! [`Dbscan`] only ever sees a precomputed distance matrix, so the notion
//! of similarity can change without touching the grouping policy.
//! [`ClusterEngine`] wires embeddings through similarity and distance into
//! it.

use ndarray::ArrayView2;
use seo_types::{ClusterAssignment, KeywordRecord, NOISE_CLUSTER};
use tracing::{debug, error, info};

use crate::config::ClusteringConfig;
use crate::error::TopicsError;
use crate::similarity::{distance_matrix, embedding_matrix, similarity_matrix};

/// DBSCAN over a precomputed distance matrix.
#[derive(Debug, Clone, Copy)]
pub struct Dbscan {
    /// Neighbourhood radius (inclusive)
    eps: f64,
    /// Neighbourhood size that makes a core point
    min_samples: usize,
}

impl Dbscan {
    /// Create a new DBSCAN instance.
    pub fn new(eps: f64, min_samples: usize) -> Self {
        Self { eps, min_samples }
    }

    /// Cluster the points described by a square distance matrix.
    ///
    /// Points are visited in index order. Each unvisited core point starts
    /// a new cluster (ids 0, 1, 2, ...) that grows through the neighbourhoods
    /// of its core members; border points join the first cluster reaching
    /// them. Points reached by no cluster are [`NOISE_CLUSTER`]. A point is in
    /// its own neighbourhood only if its self-distance is within `eps`, so a
    /// zero vector (self-distance 1) is noise. The result depends only on
    /// the matrix and parameters.
    pub fn fit_precomputed(
        &self,
        distances: ArrayView2<'_, f64>,
    ) -> Result<ClusterAssignment, TopicsError> {
        let (rows, cols) = distances.dim();
        if rows != cols {
            let message = format!("distance matrix must be square, got {}x{}", rows, cols);
            error!("{}", message);
            return Err(TopicsError::InputShape(message));
        }
        if distances.iter().any(|d| !d.is_finite()) {
            let message = "distance matrix contains non-finite values".to_string();
            error!("{}", message);
            return Err(TopicsError::InputShape(message));
        }

        let n = rows;
        let neighborhoods: Vec<Vec<usize>> = (0..n)
            .map(|i| {
                (0..n)
                    .filter(|&j| distances[[i, j]] <= self.eps)
                    .collect()
            })
            .collect();
        let is_core: Vec<bool> = neighborhoods
            .iter()
            .map(|neighbors| neighbors.len() >= self.min_samples)
            .collect();

        let mut labels = vec![NOISE_CLUSTER; n];
        let mut next_cluster = 0i32;
        let mut stack = Vec::new();

        for seed in 0..n {
            if labels[seed] != NOISE_CLUSTER || !is_core[seed] {
                continue;
            }

            labels[seed] = next_cluster;
            stack.push(seed);

            while let Some(point) = stack.pop() {
                for &neighbor in &neighborhoods[point] {
                    if labels[neighbor] == NOISE_CLUSTER {
                        labels[neighbor] = next_cluster;
                        if is_core[neighbor] {
                            stack.push(neighbor);
                        }
                    }
                }
            }

            next_cluster += 1;
        }

        Ok(ClusterAssignment::new(labels))
    }
}

/// Groups keywords into topic clusters from their embeddings.
#[derive(Debug, Clone)]
pub struct ClusterEngine {
    config: ClusteringConfig,
}

impl ClusterEngine {
    /// Create a new cluster engine.
    pub fn new(config: ClusteringConfig) -> Result<Self, TopicsError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Get the configuration.
    pub fn config(&self) -> &ClusteringConfig {
        &self.config
    }

    /// Cluster keyword records, zero-filling invalid embeddings first.
    pub fn cluster_records(
        &self,
        records: &[KeywordRecord],
    ) -> Result<ClusterAssignment, TopicsError> {
        let embeddings = embedding_matrix(records, self.config.fallback_dimension)?;
        self.cluster_embeddings(embeddings.view())
    }

    /// Cluster the rows of an `N×D` embedding matrix.
    ///
    /// Every row receives a cluster id, possibly [`NOISE_CLUSTER`].
    pub fn cluster_embeddings(
        &self,
        embeddings: ArrayView2<'_, f64>,
    ) -> Result<ClusterAssignment, TopicsError> {
        info!(
            keywords = embeddings.nrows(),
            dimension = embeddings.ncols(),
            "Clustering keyword embeddings"
        );

        let similarity = similarity_matrix(embeddings)?;
        let distances = distance_matrix(similarity.view())?;

        let (min, max) = distances
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &d| {
                (lo.min(d), hi.max(d))
            });
        debug!(min, max, "Distance range");

        let eps = self.config.eps();
        let assignment = Dbscan::new(eps, self.config.min_samples)
            .fit_precomputed(distances.view())?;

        info!(
            clusters = assignment.cluster_count(),
            noise = assignment.noise_count(),
            eps,
            min_samples = self.config.min_samples,
            "Clustering complete"
        );

        Ok(assignment)
    }
}

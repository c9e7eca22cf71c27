//! Clustering and labeling configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::TopicsError;

/// Master configuration for keyword topic clustering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopicsConfig {
    /// Clustering settings
    #[serde(default)]
    pub clustering: ClusteringConfig,

    /// Labeling settings
    #[serde(default)]
    pub labeling: LabelingConfig,
}

impl TopicsConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<(), TopicsError> {
        self.clustering.validate()?;
        self.labeling.validate()
    }
}

/// Keyword clustering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusteringConfig {
    /// Minimum cosine similarity for two keywords to be neighbours.
    /// The DBSCAN radius is `1 - min_similarity`.
    #[serde(default = "default_min_similarity")]
    pub min_similarity: f64,

    /// Neighbours (the keyword included) needed for a cluster nucleus
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,

    /// Dimension used to zero-fill invalid embeddings when the batch has
    /// no valid embedding to take the dimension from
    #[serde(default = "default_fallback_dimension")]
    pub fallback_dimension: usize,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            min_similarity: default_min_similarity(),
            min_samples: default_min_samples(),
            fallback_dimension: default_fallback_dimension(),
        }
    }
}

impl ClusteringConfig {
    /// Clustering radius in distance space.
    pub fn eps(&self) -> f64 {
        1.0 - self.min_similarity
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), TopicsError> {
        if !(self.min_similarity > 0.0 && self.min_similarity <= 1.0) {
            return Err(TopicsError::InvalidConfig(format!(
                "min_similarity must be in (0, 1], got {}",
                self.min_similarity
            )));
        }
        if self.min_samples == 0 {
            return Err(TopicsError::InvalidConfig(
                "min_samples must be >= 1".to_string(),
            ));
        }
        if self.fallback_dimension == 0 {
            return Err(TopicsError::InvalidConfig(
                "fallback_dimension must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_min_similarity() -> f64 {
    0.85
}
fn default_min_samples() -> usize {
    1
}
fn default_fallback_dimension() -> usize {
    768
}

/// Topic labeling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelingConfig {
    /// Whether to label clusters at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maximum labeling requests in flight
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Per-request time limit in seconds
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,

    /// Send the noise group (`-1`) to the labeler as well
    #[serde(default = "default_true")]
    pub label_noise: bool,
}

impl Default for LabelingConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            concurrency: default_concurrency(),
            call_timeout_secs: default_call_timeout_secs(),
            label_noise: default_true(),
        }
    }
}

impl LabelingConfig {
    /// Per-request time limit.
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), TopicsError> {
        if self.concurrency == 0 {
            return Err(TopicsError::InvalidConfig(
                "concurrency must be >= 1".to_string(),
            ));
        }
        if self.call_timeout_secs == 0 {
            return Err(TopicsError::InvalidConfig(
                "call_timeout_secs must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}
fn default_concurrency() -> usize {
    5
}
fn default_call_timeout_secs() -> u64 {
    60
}

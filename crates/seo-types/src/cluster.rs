//! Cluster assignment, summary and label types.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Cluster id reserved for keywords not dense enough to join any cluster.
pub const NOISE_CLUSTER: i32 = -1;

/// Mapping from keyword index to cluster id.
///
/// Position `i` holds the cluster of the `i`-th keyword of the batch.
/// Ids carry no ordering meaning beyond [`NOISE_CLUSTER`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterAssignment {
    labels: Vec<i32>,
}

impl ClusterAssignment {
    /// Wrap per-keyword cluster ids.
    pub fn new(labels: Vec<i32>) -> Self {
        Self { labels }
    }

    /// Cluster ids in keyword order.
    pub fn labels(&self) -> &[i32] {
        &self.labels
    }

    /// Number of assigned keywords.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether no keyword was assigned.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Cluster id of the keyword at `index`.
    pub fn cluster_of(&self, index: usize) -> Option<i32> {
        self.labels.get(index).copied()
    }

    /// Number of distinct non-noise clusters.
    pub fn cluster_count(&self) -> usize {
        self.labels
            .iter()
            .filter(|&&id| id != NOISE_CLUSTER)
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Number of keywords labelled as noise.
    pub fn noise_count(&self) -> usize {
        self.labels.iter().filter(|&&id| id == NOISE_CLUSTER).count()
    }

    /// Keyword indices belonging to `cluster_id`, in keyword order.
    pub fn members(&self, cluster_id: i32) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, &id)| id == cluster_id)
            .map(|(index, _)| index)
            .collect()
    }
}

/// Aggregate view of one cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSummary {
    /// Cluster id (`-1` for noise)
    pub cluster_id: i32,
    /// Number of keywords in the cluster
    pub size: usize,
    /// Member keywords in input order
    pub keywords: Vec<String>,
    /// Leading members, used for reporting
    pub sample_keywords: Vec<String>,
}

impl ClusterSummary {
    /// Build a summary from the ordered member keywords of a cluster.
    pub fn from_keywords(cluster_id: i32, keywords: Vec<String>, sample_size: usize) -> Self {
        let sample_keywords = keywords.iter().take(sample_size).cloned().collect();
        Self {
            cluster_id,
            size: keywords.len(),
            keywords,
            sample_keywords,
        }
    }

    /// Whether this is the noise group.
    pub fn is_noise(&self) -> bool {
        self.cluster_id == NOISE_CLUSTER
    }
}

/// Topic and subtopic assigned to a cluster.
///
/// Both fields are `None` when the labeling call failed or its answer
/// could not be parsed; downstream code must tolerate missing labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicLabel {
    pub topic: Option<String>,
    pub subtopic: Option<String>,
}

impl TopicLabel {
    /// Create a label from both parts.
    pub fn new(topic: impl Into<String>, subtopic: impl Into<String>) -> Self {
        Self {
            topic: Some(topic.into()),
            subtopic: Some(subtopic.into()),
        }
    }

    /// The `(None, None)` label.
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether at least one part is present.
    pub fn is_labeled(&self) -> bool {
        self.topic.is_some() || self.subtopic.is_some()
    }
}

/// A cluster summary with its label attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledCluster {
    #[serde(flatten)]
    pub summary: ClusterSummary,
    #[serde(flatten)]
    pub label: TopicLabel,
}

/// Final per-keyword output row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordTopic {
    pub keyword: String,
    pub cluster_id: i32,
    pub topic: Option<String>,
    pub subtopic: Option<String>,
}

impl KeywordTopic {
    /// Row for a keyword whose cluster has not been labeled.
    pub fn unlabeled(keyword: impl Into<String>, cluster_id: i32) -> Self {
        Self {
            keyword: keyword.into(),
            cluster_id,
            topic: None,
            subtopic: None,
        }
    }

    /// Copy the cluster label onto this row.
    pub fn with_label(mut self, label: &TopicLabel) -> Self {
        self.topic = label.topic.clone();
        self.subtopic = label.subtopic.clone();
        self
    }
}

//! End-to-end keyword topic pipeline.
//!
//! records → embeddings → clusters → summaries → labels → per-keyword rows

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use seo_types::{
    ClusterAssignment, ClusterSummary, KeywordRecord, KeywordTopic, LabeledCluster, TopicLabel,
};
use tracing::info;

use crate::clustering::ClusterEngine;
use crate::config::TopicsConfig;
use crate::error::TopicsError;
use crate::labeler::TopicLabeler;
use crate::llm::LlmClient;
use crate::summary::summarize_clusters;

/// Clustering result before labeling.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterReport {
    /// One row per input keyword, in input order, without labels
    pub keywords: Vec<KeywordTopic>,
    /// Cluster summaries, largest first
    pub clusters: Vec<ClusterSummary>,
    /// Raw cluster id per keyword
    pub assignment: ClusterAssignment,
}

impl ClusterReport {
    /// Number of real clusters (noise excluded).
    pub fn cluster_count(&self) -> usize {
        self.assignment.cluster_count()
    }

    /// Number of noise keywords.
    pub fn noise_count(&self) -> usize {
        self.assignment.noise_count()
    }
}

/// Labeled pipeline output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutput {
    /// When the run finished
    pub generated_at: DateTime<Utc>,
    /// One row per input keyword, in input order
    pub keywords: Vec<KeywordTopic>,
    /// Cluster summaries with labels, largest first
    pub clusters: Vec<LabeledCluster>,
    /// Number of real clusters (noise excluded)
    pub cluster_count: usize,
    /// Number of noise keywords
    pub noise_count: usize,
}

/// Clusters keyword embeddings and labels the clusters.
pub struct TopicPipeline {
    engine: ClusterEngine,
    labeler: Option<TopicLabeler>,
}

impl TopicPipeline {
    /// Create a pipeline.
    ///
    /// Labeling runs only when a client is given and `labeling.enabled` is
    /// set; otherwise every label is `(None, None)`.
    pub fn new(config: TopicsConfig, client: Option<Arc<dyn LlmClient>>) -> Result<Self, TopicsError> {
        config.validate()?;

        let engine = ClusterEngine::new(config.clustering)?;
        let labeler = if config.labeling.enabled {
            client.map(|client| TopicLabeler::new(client, config.labeling))
        } else {
            None
        };

        Ok(Self { engine, labeler })
    }

    /// Whether [`run`](Self::run) will call the labeling client.
    pub fn labels_enabled(&self) -> bool {
        self.labeler.is_some()
    }

    /// Cluster keyword records and summarize the clusters.
    pub fn cluster(&self, records: &[KeywordRecord]) -> Result<ClusterReport, TopicsError> {
        let assignment = self.engine.cluster_records(records)?;

        let keywords: Vec<&str> = records.iter().map(|r| r.keyword.as_str()).collect();
        let clusters = summarize_clusters(&keywords, &assignment)?;

        let rows = records
            .iter()
            .zip(assignment.labels())
            .map(|(record, &cluster_id)| KeywordTopic::unlabeled(record.keyword.clone(), cluster_id))
            .collect();

        Ok(ClusterReport {
            keywords: rows,
            clusters,
            assignment,
        })
    }

    /// Cluster, then label every cluster and every keyword.
    pub async fn run(&self, records: &[KeywordRecord]) -> Result<PipelineOutput, TopicsError> {
        let report = self.cluster(records)?;

        let labels = match &self.labeler {
            Some(labeler) => labeler.label_clusters(&report.clusters).await,
            None => vec![TopicLabel::none(); report.clusters.len()],
        };

        let output = attach_labels(report, labels);
        info!(
            keywords = output.keywords.len(),
            clusters = output.cluster_count,
            noise = output.noise_count,
            "Topic pipeline complete"
        );

        Ok(output)
    }
}

/// Pair labels 1:1 with summaries and copy them onto keywords by cluster id.
fn attach_labels(report: ClusterReport, labels: Vec<TopicLabel>) -> PipelineOutput {
    let cluster_count = report.cluster_count();
    let noise_count = report.noise_count();

    let by_cluster: HashMap<i32, &TopicLabel> = report
        .clusters
        .iter()
        .zip(&labels)
        .map(|(summary, label)| (summary.cluster_id, label))
        .collect();

    let keywords = report
        .keywords
        .into_iter()
        .map(|row| match by_cluster.get(&row.cluster_id) {
            Some(label) => row.with_label(label),
            None => row,
        })
        .collect();

    let clusters = report
        .clusters
        .into_iter()
        .zip(labels)
        .map(|(summary, label)| LabeledCluster { summary, label })
        .collect();

    PipelineOutput {
        generated_at: Utc::now(),
        keywords,
        clusters,
        cluster_count,
        noise_count,
    }
}

//! Per-cluster summaries ranked by size.

use std::collections::HashMap;

use seo_types::{ClusterAssignment, ClusterSummary};
use tracing::error;

use crate::error::TopicsError;

/// Number of leading members kept as `sample_keywords`.
pub const SAMPLE_SIZE: usize = 5;

/// Summarize the clusters of an assignment.
///
/// Keywords keep their input order inside each cluster. Clusters are
/// ordered by size, largest first; equal sizes keep the order in which
/// their ids first appear. The noise group is summarized like any other.
pub fn summarize_clusters<S: AsRef<str>>(
    keywords: &[S],
    assignment: &ClusterAssignment,
) -> Result<Vec<ClusterSummary>, TopicsError> {
    if keywords.len() != assignment.len() {
        let message = format!(
            "{} keywords but {} cluster assignments",
            keywords.len(),
            assignment.len()
        );
        error!("{}", message);
        return Err(TopicsError::InputShape(message));
    }

    let mut slots: HashMap<i32, usize> = HashMap::new();
    let mut groups: Vec<(i32, Vec<String>)> = Vec::new();

    for (keyword, &cluster_id) in keywords.iter().zip(assignment.labels()) {
        let slot = *slots.entry(cluster_id).or_insert_with(|| {
            groups.push((cluster_id, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(keyword.as_ref().to_string());
    }

    let mut summaries: Vec<ClusterSummary> = groups
        .into_iter()
        .map(|(cluster_id, members)| ClusterSummary::from_keywords(cluster_id, members, SAMPLE_SIZE))
        .collect();

    // Stable: ties stay in first-seen order.
    summaries.sort_by(|a, b| b.size.cmp(&a.size));

    Ok(summaries)
}

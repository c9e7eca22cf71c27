//! Command implementations for the seo-topics tool.
//!
//! Handles:
//! - cluster: load keywords, cluster, write unlabeled dumps
//! - label: cluster and label through a language model (or the mock)
//! - parse-label: run the label parser on one answer

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use seo_topics::{parse_label, ApiLlmClient, LlmClient, MockLlmClient, TopicPipeline};
use seo_types::{LabeledCluster, TopicLabel};
use tracing::info;

use crate::cli::InputArgs;
use crate::output::{format_cluster_table, load_records, write_outputs, OutputPaths};
use crate::settings::Settings;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set.
pub fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

/// Apply `cluster`/`label` flags on top of loaded settings.
pub fn apply_input_overrides(settings: &mut Settings, args: &InputArgs) {
    if let Some(dir) = &args.output_dir {
        settings.output_dir = dir.clone();
    }
    if let Some(min_similarity) = args.min_similarity {
        settings.topics.clustering.min_similarity = min_similarity;
    }
    if let Some(min_samples) = args.min_samples {
        settings.topics.clustering.min_samples = min_samples;
    }
    if let Some(format) = args.format {
        settings.format = format;
    }
}

/// Result of a `cluster` or `label` run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub paths: OutputPaths,
    pub clusters: Vec<LabeledCluster>,
    pub cluster_count: usize,
    pub noise_count: usize,
}

/// Cluster keywords and write the dumps without labels.
pub fn run_cluster(settings: &Settings, input: &Path) -> Result<RunReport> {
    let records = load_records(input)?;

    let pipeline = TopicPipeline::new(settings.topics.clone(), None)
        .context("Invalid clustering configuration")?;
    let report = pipeline
        .cluster(&records)
        .with_context(|| format!("Failed to cluster {}", input.display()))?;

    let cluster_count = report.cluster_count();
    let noise_count = report.noise_count();
    let clusters: Vec<LabeledCluster> = report
        .clusters
        .into_iter()
        .map(|summary| LabeledCluster {
            summary,
            label: TopicLabel::none(),
        })
        .collect();

    let paths = write_outputs(&settings.output_dir, settings.format, &report.keywords, &clusters)?;

    info!(clusters = cluster_count, noise = noise_count, "Clustering finished");
    Ok(RunReport {
        paths,
        clusters,
        cluster_count,
        noise_count,
    })
}

/// Cluster and label keywords, then write the dumps.
pub async fn run_label(settings: &Settings, input: &Path, mock_llm: bool) -> Result<RunReport> {
    let records = load_records(input)?;

    let client: Arc<dyn LlmClient> = if mock_llm {
        info!("Using offline mock labeler");
        Arc::new(MockLlmClient::new())
    } else {
        let config = settings.llm.client_config()?;
        info!(provider = ?config.provider, model = %config.model, "Using API labeler");
        Arc::new(ApiLlmClient::new(config).context("Failed to build API client")?)
    };

    let pipeline = TopicPipeline::new(settings.topics.clone(), Some(client))
        .context("Invalid topic configuration")?;
    let output = pipeline
        .run(&records)
        .await
        .with_context(|| format!("Failed to process {}", input.display()))?;

    let paths = write_outputs(
        &settings.output_dir,
        settings.format,
        &output.keywords,
        &output.clusters,
    )?;

    Ok(RunReport {
        paths,
        clusters: output.clusters,
        cluster_count: output.cluster_count,
        noise_count: output.noise_count,
    })
}

/// Print the cluster table and output locations.
pub fn print_report(report: &RunReport) {
    print!("{}", format_cluster_table(&report.clusters));
    println!();
    println!(
        "{} clusters, {} noise keywords",
        report.cluster_count, report.noise_count
    );
    println!("Keywords: {}", report.paths.keywords.display());
    println!("Clusters: {}", report.paths.clusters.display());
}

/// Parse one labeling answer and render both parts.
pub fn describe_label(text: &str) -> String {
    let label = parse_label(text);
    format!(
        "topic: {}\nsubtopic: {}",
        label.topic.as_deref().unwrap_or("<none>"),
        label.subtopic.as_deref().unwrap_or("<none>")
    )
}

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use e2e_tests::bulk_keywords;
use seo_topics::{
    distance_matrix, embedding_matrix, similarity_matrix, summarize_clusters, ClusteringConfig,
    Dbscan, LabelingConfig, MockLlmClient, TopicLabeler,
};

const DEFAULT_ITERATIONS: usize = 3;

#[derive(Parser, Debug)]
#[command(name = "cluster_bench", about = "seo-topics clustering benchmark harness")]
struct Args {
    #[arg(long, value_enum, default_value = "small")]
    tier: DatasetTier,
    #[arg(long, default_value_t = DEFAULT_ITERATIONS)]
    iterations: usize,
    #[arg(long, default_value_t = 0.85)]
    min_similarity: f64,
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
enum DatasetTier {
    Small,
    Medium,
    Large,
}

impl DatasetTier {
    /// (keywords, topics, dimension)
    fn shape(&self) -> (usize, usize, usize) {
        match self {
            DatasetTier::Small => (500, 25, 64),
            DatasetTier::Medium => (2_000, 80, 384),
            DatasetTier::Large => (5_000, 200, 768),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct StepMetrics {
    p50_ms: f64,
    p90_ms: f64,
    p99_ms: f64,
    samples: usize,
}

#[derive(Debug, Serialize, Deserialize)]
struct BenchmarkOutput {
    tier: DatasetTier,
    keywords: usize,
    dimension: usize,
    iterations: usize,
    generated_at: String,
    clusters: usize,
    noise: usize,
    steps: BTreeMap<String, StepMetrics>,
}

struct IterationSample {
    durations: Vec<(&'static str, f64)>,
    clusters: usize,
    noise: usize,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let args = Args::parse();
    let (count, topics, dimension) = args.tier.shape();
    let clustering = ClusteringConfig {
        min_similarity: args.min_similarity,
        ..Default::default()
    };
    clustering.validate().map_err(|e| e.to_string())?;

    let mut samples: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    let mut last = (0, 0);

    for iteration in 0..args.iterations.max(1) {
        let sample = run_iteration(count, topics, dimension, iteration as u64, &clustering).await?;
        for (step, duration_ms) in sample.durations {
            samples.entry(step.to_string()).or_default().push(duration_ms);
        }
        last = (sample.clusters, sample.noise);
    }

    let output = BenchmarkOutput {
        tier: args.tier,
        keywords: count,
        dimension,
        iterations: args.iterations.max(1),
        generated_at: Utc::now().to_rfc3339(),
        clusters: last.0,
        noise: last.1,
        steps: build_metrics(&samples),
    };

    let json = serde_json::to_string_pretty(&output).map_err(|e| e.to_string())?;
    let table = render_table(&output);
    if let Some(out_dir) = &args.out_dir {
        write_outputs(out_dir, &json, &table)?;
    }

    println!("{}", table);
    println!("\n{}", json);
    Ok(())
}

async fn run_iteration(
    count: usize,
    topics: usize,
    dimension: usize,
    seed: u64,
    clustering: &ClusteringConfig,
) -> Result<IterationSample, String> {
    let records = bulk_keywords(count, topics, dimension, seed);
    let mut durations = Vec::new();

    let start = Instant::now();
    let embeddings =
        embedding_matrix(&records, clustering.fallback_dimension).map_err(|e| e.to_string())?;
    durations.push(("embedding_matrix", elapsed_ms(start)));

    let start = Instant::now();
    let similarity = similarity_matrix(embeddings.view()).map_err(|e| e.to_string())?;
    durations.push(("similarity", elapsed_ms(start)));

    let start = Instant::now();
    let distances = distance_matrix(similarity.view()).map_err(|e| e.to_string())?;
    durations.push(("distance", elapsed_ms(start)));

    let start = Instant::now();
    let assignment = Dbscan::new(clustering.eps(), clustering.min_samples)
        .fit_precomputed(distances.view())
        .map_err(|e| e.to_string())?;
    durations.push(("dbscan", elapsed_ms(start)));

    let start = Instant::now();
    let keywords: Vec<&str> = records.iter().map(|r| r.keyword.as_str()).collect();
    let summaries = summarize_clusters(&keywords, &assignment).map_err(|e| e.to_string())?;
    durations.push(("summarize", elapsed_ms(start)));

    let start = Instant::now();
    let labeler = TopicLabeler::new(Arc::new(MockLlmClient::new()), LabelingConfig::default());
    let labels = labeler.label_clusters(&summaries).await;
    durations.push(("label_mock", elapsed_ms(start)));

    if labels.len() != summaries.len() {
        return Err("label count does not match cluster count".to_string());
    }

    Ok(IterationSample {
        durations,
        clusters: assignment.cluster_count(),
        noise: assignment.noise_count(),
    })
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

fn build_metrics(samples: &BTreeMap<String, Vec<f64>>) -> BTreeMap<String, StepMetrics> {
    samples
        .iter()
        .map(|(step, durations)| {
            let mut sorted = durations.clone();
            sorted.sort_by(f64::total_cmp);
            (
                step.clone(),
                StepMetrics {
                    p50_ms: percentile(&sorted, 50.0),
                    p90_ms: percentile(&sorted, 90.0),
                    p99_ms: percentile(&sorted, 99.0),
                    samples: durations.len(),
                },
            )
        })
        .collect()
}

fn percentile(values: &[f64], percentile: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let rank = (percentile / 100.0) * (values.len() as f64 - 1.0);
    let low = rank.floor() as usize;
    let high = rank.ceil() as usize;
    if low == high {
        values[low]
    } else {
        let weight = rank - low as f64;
        values[low] + (values[high] - values[low]) * weight
    }
}

fn render_table(output: &BenchmarkOutput) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "Benchmark Results (keywords={}, dimension={}, iterations={}, clusters={}, noise={})",
        output.keywords, output.dimension, output.iterations, output.clusters, output.noise
    ));
    lines.push("step\tp50_ms\tp90_ms\tp99_ms".to_string());

    for (step, metrics) in &output.steps {
        lines.push(format!(
            "{}\t{:.2}\t{:.2}\t{:.2}",
            step, metrics.p50_ms, metrics.p90_ms, metrics.p99_ms
        ));
    }
    lines.join("\n")
}

fn write_outputs(out_dir: &Path, json: &str, table: &str) -> Result<(), String> {
    fs::create_dir_all(out_dir).map_err(|e| format!("Failed to create out dir: {e}"))?;
    fs::write(out_dir.join("latest.json"), json).map_err(|e| e.to_string())?;
    fs::write(out_dir.join("latest.txt"), table).map_err(|e| e.to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_interpolates() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&values, 0.0), 1.0);
        assert_eq!(percentile(&values, 100.0), 4.0);
        assert!((percentile(&values, 50.0) - 2.5).abs() < 1e-12);
        assert_eq!(percentile(&[], 50.0), 0.0);
    }

    #[tokio::test]
    async fn test_iteration_finds_planted_topics() {
        let sample = run_iteration(60, 6, 32, 1, &ClusteringConfig::default())
            .await
            .unwrap();
        assert_eq!(sample.clusters, 6);
        assert_eq!(sample.noise, 0);
        assert_eq!(sample.durations.len(), 6);
    }
}

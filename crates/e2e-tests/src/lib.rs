//! End-to-end test infrastructure for seo-topics.
//!
//! Provides a temp-dir TestHarness and synthetic keyword fixtures for
//! tests covering the full load-cluster-label-write pipeline.

use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use seo_types::KeywordRecord;

/// Embedding dimension of the synthetic fixtures.
pub const FIXTURE_DIMENSION: usize = 32;

/// Keyword groups used by most tests, largest first.
pub const SEO_TOPICS: &[(&str, &[&str])] = &[
    (
        "drills",
        &[
            "cordless drill",
            "best cordless drill",
            "milwaukee m18 drill",
            "drill price",
            "cheap cordless drill",
            "drill with battery",
        ],
    ),
    (
        "vacuums",
        &[
            "vacuum cleaner",
            "best vacuum cleaner",
            "how to use vacuum cleaner",
            "vacuum cleaner guide",
        ],
    ),
    (
        "sinks",
        &["inset sink", "granite inset sink", "ceramic inset sink"],
    ),
];

/// Shared test harness for E2E tests.
///
/// Owns a temp directory with separate input and output locations.
pub struct TestHarness {
    /// Keeps temp dir alive for the lifetime of the harness
    pub _temp_dir: tempfile::TempDir,
    /// Where input keyword files are written
    pub input_dir: PathBuf,
    /// Where the tool writes its dumps
    pub output_dir: PathBuf,
}

impl TestHarness {
    /// Create a new test harness with a fresh temp directory.
    pub fn new() -> Self {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let input_dir = temp_dir.path().join("input");
        let output_dir = temp_dir.path().join("output");
        std::fs::create_dir_all(&input_dir).expect("Failed to create input dir");

        Self {
            _temp_dir: temp_dir,
            input_dir,
            output_dir,
        }
    }

    /// Write records as a JSON array and return the file path.
    pub fn write_json_input(&self, name: &str, records: &[KeywordRecord]) -> PathBuf {
        let path = self.input_dir.join(name);
        let json = serde_json::to_string_pretty(records).expect("Failed to serialize records");
        std::fs::write(&path, json).expect("Failed to write JSON input");
        path
    }

    /// Write records as CSV with a JSON-encoded embedding column.
    pub fn write_csv_input(&self, name: &str, records: &[KeywordRecord]) -> PathBuf {
        let path = self.input_dir.join(name);
        let mut writer = csv::Writer::from_path(&path).expect("Failed to create CSV input");
        writer
            .write_record(["keyword", "embedding"])
            .expect("Failed to write CSV header");
        for record in records {
            let embedding =
                serde_json::to_string(&record.embedding).expect("Failed to encode embedding");
            writer
                .write_record([record.keyword.as_str(), embedding.as_str()])
                .expect("Failed to write CSV row");
        }
        writer.flush().expect("Failed to flush CSV input");
        path
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Random unit vector.
pub fn random_direction(rng: &mut StdRng, dimension: usize) -> Vec<f64> {
    let raw: Vec<f64> = (0..dimension).map(|_| rng.random_range(-1.0..1.0)).collect();
    let norm = raw.iter().map(|v| v * v).sum::<f64>().sqrt();
    raw.into_iter().map(|v| v / norm).collect()
}

/// Build keyword records whose embeddings form one tight group per topic.
///
/// Each topic gets a random direction; each keyword is that direction plus
/// small noise, so members of a topic sit well above 0.85 cosine
/// similarity and different topics far below it.
pub fn synthetic_keywords(topics: &[(&str, &[&str])], seed: u64) -> Vec<KeywordRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut records = Vec::new();

    for (_, keywords) in topics {
        let direction = random_direction(&mut rng, FIXTURE_DIMENSION);
        for keyword in keywords.iter() {
            let embedding = direction
                .iter()
                .map(|v| v + rng.random_range(-0.03..0.03))
                .collect();
            records.push(KeywordRecord::new(*keyword, embedding));
        }
    }

    records
}

/// The standard fixture: [`SEO_TOPICS`] with a fixed seed.
pub fn seo_fixture() -> Vec<KeywordRecord> {
    synthetic_keywords(SEO_TOPICS, 7)
}

/// Build `count` keywords spread over `topics` groups (for benchmarks).
pub fn bulk_keywords(count: usize, topics: usize, dimension: usize, seed: u64) -> Vec<KeywordRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    let directions: Vec<Vec<f64>> = (0..topics.max(1))
        .map(|_| random_direction(&mut rng, dimension))
        .collect();

    (0..count)
        .map(|i| {
            let direction = &directions[i % directions.len()];
            let embedding = direction
                .iter()
                .map(|v| v + rng.random_range(-0.03..0.03))
                .collect();
            KeywordRecord::new(format!("keyword {i}"), embedding)
        })
        .collect()
}

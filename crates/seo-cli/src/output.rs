//! Reading keyword files and writing the clustering dumps.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use seo_types::{KeywordRecord, KeywordTopic, LabeledCluster};
use tracing::{debug, info};

use crate::cli::OutputFormat;

/// Base name of the per-keyword dump.
pub const KEYWORDS_FILE: &str = "clustered_keywords";

/// Base name of the per-cluster dump.
pub const CLUSTERS_FILE: &str = "cluster_analysis";

/// Separator for keyword lists in CSV cells.
const LIST_SEPARATOR: &str = ", ";

/// CSV input row; the embedding column holds a JSON-encoded array.
#[derive(Debug, Deserialize)]
struct CsvKeywordRow {
    keyword: String,
    #[serde(default)]
    embedding: String,
}

/// CSV output row for a cluster; list columns are flattened to text.
#[derive(Debug, Serialize)]
struct CsvClusterRow<'a> {
    cluster_id: i32,
    size: usize,
    keywords: String,
    sample_keywords: String,
    topic: Option<&'a str>,
    subtopic: Option<&'a str>,
}

impl<'a> From<&'a LabeledCluster> for CsvClusterRow<'a> {
    fn from(cluster: &'a LabeledCluster) -> Self {
        Self {
            cluster_id: cluster.summary.cluster_id,
            size: cluster.summary.size,
            keywords: cluster.summary.keywords.join(LIST_SEPARATOR),
            sample_keywords: cluster.summary.sample_keywords.join(LIST_SEPARATOR),
            topic: cluster.label.topic.as_deref(),
            subtopic: cluster.label.subtopic.as_deref(),
        }
    }
}

/// Where the two dumps were written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub keywords: PathBuf,
    pub clusters: PathBuf,
}

/// Read keyword records from a JSON array or a CSV file.
///
/// The format follows the file extension; anything but `.csv` is read as
/// JSON. Unreadable embeddings come back empty.
pub fn load_records(path: &Path) -> Result<Vec<KeywordRecord>> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    let records = if is_csv {
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        reader
            .deserialize::<CsvKeywordRow>()
            .map(|row| {
                let row = row.with_context(|| format!("Malformed row in {}", path.display()))?;
                let embedding = serde_json::from_str(&row.embedding).unwrap_or_default();
                Ok(KeywordRecord::new(row.keyword, embedding))
            })
            .collect::<Result<Vec<_>>>()?
    } else {
        let file =
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse keyword records from {}", path.display()))?
    };

    info!(path = %path.display(), records = records.len(), "Loaded keyword records");
    Ok(records)
}

/// Write `clustered_keywords` and `cluster_analysis` into `dir`.
pub fn write_outputs(
    dir: &Path,
    format: OutputFormat,
    keywords: &[KeywordTopic],
    clusters: &[LabeledCluster],
) -> Result<OutputPaths> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let paths = OutputPaths {
        keywords: dir.join(format!("{}.{}", KEYWORDS_FILE, format.extension())),
        clusters: dir.join(format!("{}.{}", CLUSTERS_FILE, format.extension())),
    };

    match format {
        OutputFormat::Csv => {
            write_csv(&paths.keywords, keywords.iter())?;
            write_csv(&paths.clusters, clusters.iter().map(CsvClusterRow::from))?;
        }
        OutputFormat::Json => {
            write_json(&paths.keywords, keywords)?;
            write_json(&paths.clusters, clusters)?;
        }
    }

    debug!(
        keywords = %paths.keywords.display(),
        clusters = %paths.clusters.display(),
        "Wrote output files"
    );
    Ok(paths)
}

fn write_csv<T, I>(path: &Path, rows: I) -> Result<()>
where
    T: Serialize,
    I: Iterator<Item = T>,
{
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("Failed to create {}", path.display()))?;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    writer.flush()?;
    Ok(())
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    writer.flush()?;
    Ok(())
}

/// Render clusters as a fixed-width text table.
pub fn format_cluster_table(clusters: &[LabeledCluster]) -> String {
    let mut table = format!(
        "{:>8}  {:>5}  {:<28}  {:<28}  {}\n",
        "CLUSTER", "SIZE", "TOPIC", "SUBTOPIC", "SAMPLE KEYWORDS"
    );
    for cluster in clusters {
        table.push_str(&format!(
            "{:>8}  {:>5}  {:<28}  {:<28}  {}\n",
            cluster.summary.cluster_id,
            cluster.summary.size,
            cluster.label.topic.as_deref().unwrap_or("-"),
            cluster.label.subtopic.as_deref().unwrap_or("-"),
            cluster.summary.sample_keywords.join(LIST_SEPARATOR),
        ));
    }
    table
}

//! CLI argument parsing for the seo-topics tool.
//!
//! Flags given here override every other configuration source.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// SEO keyword topic clustering
///
/// Groups keywords by embedding similarity and labels each group with a
/// `Topic | Subtopic` pair.
#[derive(Parser, Debug)]
#[command(name = "seo-topics")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/seo-topics/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Tool commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Cluster keywords without labeling
    Cluster(InputArgs),

    /// Cluster keywords and label every cluster
    Label {
        #[command(flatten)]
        input: InputArgs,

        /// Maximum labeling requests in flight
        #[arg(long)]
        concurrency: Option<usize>,

        /// Answer labeling requests offline instead of calling a model
        #[arg(long)]
        mock_llm: bool,
    },

    /// Parse a `Topic | Subtopic` answer and print both parts
    ParseLabel {
        /// Answer text to parse
        text: String,
    },
}

/// Input and clustering options shared by `cluster` and `label`.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Keyword file: JSON array or CSV with `keyword` and `embedding` columns
    #[arg(short, long)]
    pub input: PathBuf,

    /// Directory for the output files (default from config)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Minimum cosine similarity for two keywords to be neighbours
    #[arg(long)]
    pub min_similarity: Option<f64>,

    /// Neighbours needed (the keyword included) to seed a cluster
    #[arg(long)]
    pub min_samples: Option<usize>,

    /// Output file format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,
}

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl OutputFormat {
    /// File extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

//! seo-topics command-line library.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (cluster, label, parse-label)
//! - `output`: Keyword file loading and CSV/JSON dumps
//! - `settings`: Layered configuration

pub mod cli;
pub mod commands;
pub mod output;
pub mod settings;

pub use cli::{Cli, Commands, InputArgs, OutputFormat};
pub use commands::{
    apply_input_overrides, describe_label, init_logging, print_report, run_cluster, run_label,
    RunReport,
};
pub use output::{format_cluster_table, load_records, write_outputs, OutputPaths};
pub use settings::{LlmSettings, Settings, SettingsError};

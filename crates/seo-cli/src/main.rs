//! SEO keyword topic clustering
//!
//! # Usage
//!
//! ```bash
//! seo-topics cluster --input keywords.json [--min-similarity 0.85] [--format csv]
//! seo-topics label --input keywords.json [--concurrency 5] [--mock-llm]
//! seo-topics parse-label '"Drills" | "Pricing"'
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/seo-topics/config.toml)
//! 3. `--config` file
//! 4. Environment variables (SEO_TOPICS__*)
//! 5. CLI flags

use anyhow::{Context, Result};
use clap::Parser;

use seo_cli::{
    apply_input_overrides, describe_label, init_logging, print_report, run_cluster, run_label,
    Cli, Commands, Settings,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings =
        Settings::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(log_level) = cli.log_level {
        settings.log_level = log_level;
    }
    init_logging(&settings.log_level)?;

    match cli.command {
        Commands::Cluster(input) => {
            apply_input_overrides(&mut settings, &input);
            let report = run_cluster(&settings, &input.input)?;
            print_report(&report);
        }
        Commands::Label {
            input,
            concurrency,
            mock_llm,
        } => {
            apply_input_overrides(&mut settings, &input);
            if let Some(concurrency) = concurrency {
                settings.topics.labeling.concurrency = concurrency;
            }
            let report = run_label(&settings, &input.input, mock_llm).await?;
            print_report(&report);
        }
        Commands::ParseLabel { text } => {
            println!("{}", describe_label(&text));
        }
    }

    Ok(())
}

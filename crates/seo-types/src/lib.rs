//! # seo-types
//!
//! Shared domain types for SEO keyword topic clustering.
//!
//! This crate defines the data structures passed between the clustering
//! engine, the topic labeler and the CLI:
//! - Keyword records: a keyword and its embedding vector
//! - Cluster assignments: keyword index to cluster id (`-1` = noise)
//! - Cluster summaries and their topic labels
//! - Per-keyword output rows
//!
//! ## Usage
//!
//! ```rust
//! use seo_types::{KeywordRecord, TopicLabel};
//!
//! let record = KeywordRecord::new("cordless drill", vec![0.1, 0.9]);
//! assert_eq!(record.dimension(), 2);
//! assert!(!TopicLabel::none().is_labeled());
//! ```

pub mod cluster;
pub mod keyword;

pub use cluster::{
    ClusterAssignment, ClusterSummary, KeywordTopic, LabeledCluster, TopicLabel, NOISE_CLUSTER,
};
pub use keyword::KeywordRecord;

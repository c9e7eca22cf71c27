//! # seo-topics
//!
//! Keyword embedding clustering and topic labeling.
//!
//! Turns a batch of keyword embeddings into topic clusters and labels each
//! cluster with a `Topic | Subtopic` pair obtained from a language model.
//!
//! ## Features
//! - Batched cosine similarity over an `ndarray` matrix
//! - DBSCAN over a precomputed distance matrix
//! - Deterministic cluster summaries ranked by size
//! - Tolerant parsing of free-text `Topic | Subtopic` answers
//! - Bounded, order-preserving fan-out of labeling calls

pub mod clustering;
pub mod config;
pub mod error;
pub mod label_parser;
pub mod labeler;
pub mod llm;
pub mod pipeline;
pub mod similarity;
pub mod summary;

pub use clustering::{ClusterEngine, Dbscan};
pub use config::{ClusteringConfig, LabelingConfig, TopicsConfig};
pub use error::TopicsError;
pub use label_parser::parse_label;
pub use labeler::TopicLabeler;
pub use llm::{ApiLlmClient, ApiLlmClientConfig, LlmClient, LlmProvider, MockLlmClient};
pub use pipeline::{ClusterReport, PipelineOutput, TopicPipeline};
pub use similarity::{distance_matrix, embedding_matrix, similarity_matrix};
pub use summary::{summarize_clusters, SAMPLE_SIZE};

//! Keyword records as produced by the keyword-extraction pipeline.

use serde::{Deserialize, Deserializer, Serialize};

/// A keyword and its embedding vector.
///
/// The embedding is read leniently: a JSON array of numbers, a string
/// holding a JSON-encoded array (what a CSV round-trip leaves behind), or
/// `null`/missing. Anything unreadable becomes an empty embedding, which
/// the clustering engine later zero-fills.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRecord {
    /// The keyword text
    pub keyword: String,
    /// Embedding vector (empty when missing or unreadable)
    #[serde(default, deserialize_with = "deserialize_embedding")]
    pub embedding: Vec<f64>,
}

impl KeywordRecord {
    /// Create a new keyword record.
    pub fn new(keyword: impl Into<String>, embedding: Vec<f64>) -> Self {
        Self {
            keyword: keyword.into(),
            embedding,
        }
    }

    /// Length of the embedding vector.
    pub fn dimension(&self) -> usize {
        self.embedding.len()
    }

    /// Whether the embedding is usable: non-empty and every value finite.
    pub fn has_valid_embedding(&self) -> bool {
        !self.embedding.is_empty() && self.embedding.iter().all(|v| v.is_finite())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawEmbedding {
    Values(Vec<f64>),
    Encoded(String),
    Other(serde_json::Value),
}

fn deserialize_embedding<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let embedding = match RawEmbedding::deserialize(deserializer)? {
        RawEmbedding::Values(values) => values,
        RawEmbedding::Encoded(text) => serde_json::from_str(&text).unwrap_or_default(),
        RawEmbedding::Other(_) => Vec::new(),
    };
    Ok(embedding)
}

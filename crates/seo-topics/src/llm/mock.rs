//! Offline client for tests and dry runs.

use async_trait::async_trait;

use super::LlmClient;
use crate::error::TopicsError;

/// Mock client that answers deterministically without a network.
///
/// Reads the last `Keywords:` line of the prompt and answers
/// `[<First Keyword>] | [<subtopic>]`, title-casing the first keyword.
/// A prompt without keywords gets `- | -`.
pub struct MockLlmClient {
    /// Subtopic put in every answer
    subtopic: String,
}

impl MockLlmClient {
    /// Create a new mock client.
    pub fn new() -> Self {
        Self {
            subtopic: "Related Searches".to_string(),
        }
    }

    /// Create with a custom subtopic.
    pub fn with_subtopic(subtopic: impl Into<String>) -> Self {
        Self {
            subtopic: subtopic.into(),
        }
    }
}

impl Default for MockLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, prompt: &str) -> Result<String, TopicsError> {
        let first_keyword = prompt
            .lines()
            .rev()
            .find_map(|line| line.trim().strip_prefix("Keywords:"))
            .and_then(|list| list.split(',').map(str::trim).find(|k| !k.is_empty()));

        Ok(match first_keyword {
            Some(keyword) => format!("[{}] | [{}]", title_case(keyword), self.subtopic),
            None => "- | -".to_string(),
        })
    }
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_answers_from_keywords_line() {
        let client = MockLlmClient::new();
        let answer = client
            .complete("Classify these.\nKeywords: cordless drill,drill price")
            .await
            .unwrap();
        assert_eq!(answer, "[Cordless Drill] | [Related Searches]");
    }

    #[tokio::test]
    async fn test_mock_uses_last_keywords_line() {
        let client = MockLlmClient::with_subtopic("Pricing");
        let prompt = "Keywords: example one\n...\nKeywords: kitchen sink";
        assert_eq!(
            client.complete(prompt).await.unwrap(),
            "[Kitchen Sink] | [Pricing]"
        );
    }

    #[tokio::test]
    async fn test_mock_without_keywords() {
        let client = MockLlmClient::default();
        assert_eq!(client.complete("nothing here").await.unwrap(), "- | -");
        assert_eq!(client.complete("Keywords: , ,").await.unwrap(), "- | -");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("milwaukee m18  drill"), "Milwaukee M18 Drill");
        assert_eq!(title_case(""), "");
    }
}

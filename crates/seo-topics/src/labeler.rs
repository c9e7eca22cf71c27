//! Topic labeling of keyword clusters through a language model.
//!
//! Each cluster's keywords go out as one prompt; the answer is parsed with
//! [`parse_label`]. Labeling never fails a run: an unreachable, slow or
//! unparseable answer leaves that cluster with an empty label.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use seo_types::{ClusterSummary, TopicLabel};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::LabelingConfig;
use crate::label_parser::parse_label;
use crate::llm::LlmClient;

/// Build the labeling prompt for one cluster.
///
/// Keywords are joined with `,` and placed on the final `Keywords:` line.
pub fn build_label_prompt<S: AsRef<str>>(keywords: &[S]) -> String {
    let joined = keywords
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join(",");

    format!(
        r#"SEO keyword clustering: Topic and Subtopic classification.

Give one Topic and one Subtopic for the keyword list below.
Topics are short, specific category names; brand-specific keywords keep the
brand in the topic. Subtopics name one searcher intent, either
informational ("How To", "Guide", "Understanding") or transactional
("Shopping", "Comparison", "Options"), never both. Materials, applications,
skill levels and features get their own subtopics.

Answer with exactly one line in the form:
"Topic" | "Subtopic"

If no specific subtopic exists, use "-" as the subtopic.
If the keywords are unclear or unrelated, answer "- | -".

Examples:
Keywords: best vacuum cleaner,vaccum cleaner
"Vacuum Cleaners" | "Product Comparison & Selection"

Keywords: how to use vacuum cleaner,guide to use vaccum cleaner
"Vacuum Cleaners" | "Usage & Maintenance Guide"

Keywords: milwaukee m18 drill price
"Milwaukee M18 Drills" | "Shopping & Pricing"

Keywords: inset sink stainless steel,granite inset sink,ceramic inset sink
"Inset Sinks" | "Material Options"

Keywords: {joined}"#
    )
}

/// Assigns `Topic | Subtopic` labels to keyword clusters.
pub struct TopicLabeler {
    client: Arc<dyn LlmClient>,
    config: LabelingConfig,
}

impl TopicLabeler {
    /// Create a new labeler over a shared client.
    pub fn new(client: Arc<dyn LlmClient>, config: LabelingConfig) -> Self {
        Self { client, config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &LabelingConfig {
        &self.config
    }

    /// Label one keyword group.
    ///
    /// Returns `(None, None)` when the call fails, times out, or the answer
    /// has no recognizable `Topic | Subtopic` shape.
    pub async fn assign_label<S: AsRef<str>>(&self, keywords: &[S]) -> TopicLabel {
        if keywords.is_empty() {
            debug!("No keywords to label");
            return TopicLabel::none();
        }

        let prompt = build_label_prompt(keywords);

        let response = match timeout(self.config.call_timeout(), self.client.complete(&prompt)).await
        {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                warn!(
                    error = %e,
                    keywords = keywords.len(),
                    "Label request failed"
                );
                return TopicLabel::none();
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.config.call_timeout_secs,
                    keywords = keywords.len(),
                    "Label request timed out"
                );
                return TopicLabel::none();
            }
        };

        let label = parse_label(&response);
        if !label.is_labeled() {
            debug!(response = %response, "Label answer has no Topic | Subtopic shape");
        }
        label
    }

    /// Label every cluster, at most `concurrency` requests at a time.
    ///
    /// The result has one label per input cluster and position `i` always
    /// belongs to `clusters[i]`, whatever order the answers arrive in.
    pub async fn label_clusters(&self, clusters: &[ClusterSummary]) -> Vec<TopicLabel> {
        info!(
            clusters = clusters.len(),
            concurrency = self.config.concurrency,
            "Labeling clusters"
        );

        let mut labels = vec![TopicLabel::none(); clusters.len()];

        let mut answers = stream::iter(clusters.iter().enumerate())
            .map(|(index, cluster)| async move { (index, self.label_cluster(cluster).await) })
            .buffer_unordered(self.config.concurrency.max(1));

        while let Some((index, label)) = answers.next().await {
            labels[index] = label;
        }

        let labeled = labels.iter().filter(|l| l.is_labeled()).count();
        info!(labeled, total = clusters.len(), "Labeling complete");

        labels
    }

    async fn label_cluster(&self, cluster: &ClusterSummary) -> TopicLabel {
        if cluster.is_noise() && !self.config.label_noise {
            debug!(size = cluster.size, "Skipping noise cluster");
            return TopicLabel::none();
        }

        self.assign_label(&cluster.keywords).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use seo_types::NOISE_CLUSTER;

    use crate::error::TopicsError;
    use crate::llm::MockLlmClient;

    fn keywords_of(prompt: &str) -> String {
        prompt
            .lines()
            .last()
            .and_then(|line| line.strip_prefix("Keywords: "))
            .unwrap_or_default()
            .to_string()
    }

    /// Answers after a delay taken from the first keyword (`"<millis>:<name>"`).
    struct DelayedClient;

    #[async_trait]
    impl LlmClient for DelayedClient {
        async fn complete(&self, prompt: &str) -> Result<String, TopicsError> {
            let keywords = keywords_of(prompt);
            let (delay, name) = keywords.split_once(':').unwrap();
            tokio::time::sleep(Duration::from_millis(delay.parse().unwrap())).await;
            Ok(format!("\"{}\" | \"Guide\"", name))
        }
    }

    /// Fails for prompts mentioning "boom", answers otherwise.
    struct FlakyClient;

    #[async_trait]
    impl LlmClient for FlakyClient {
        async fn complete(&self, prompt: &str) -> Result<String, TopicsError> {
            let keywords = keywords_of(prompt);
            if keywords.contains("boom") {
                return Err(TopicsError::LabelCall("HTTP 500".to_string()));
            }
            Ok(format!("[{}] | [Pricing]", keywords))
        }
    }

    /// Counts calls and tracks the highest number in flight.
    #[derive(Default)]
    struct CountingClient {
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl LlmClient for CountingClient {
        async fn complete(&self, _prompt: &str) -> Result<String, TopicsError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok("Topic | Subtopic".to_string())
        }
    }

    struct StuckClient;

    #[async_trait]
    impl LlmClient for StuckClient {
        async fn complete(&self, _prompt: &str) -> Result<String, TopicsError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok("Never | Reached".to_string())
        }
    }

    fn cluster(id: i32, keywords: &[&str]) -> ClusterSummary {
        ClusterSummary::from_keywords(id, keywords.iter().map(|k| k.to_string()).collect(), 5)
    }

    fn labeler(client: impl LlmClient + 'static, config: LabelingConfig) -> TopicLabeler {
        TopicLabeler::new(Arc::new(client), config)
    }

    #[test]
    fn test_prompt_ends_with_joined_keywords() {
        let prompt = build_label_prompt(&["cordless drill", "drill price"]);
        assert!(prompt.ends_with("Keywords: cordless drill,drill price"));
        assert!(prompt.contains("\"Topic\" | \"Subtopic\""));
    }

    #[tokio::test]
    async fn test_assign_label_parses_answer() {
        let labeler = labeler(MockLlmClient::new(), LabelingConfig::default());
        let label = labeler.assign_label(&["vacuum cleaner", "best vacuum"]).await;
        assert_eq!(label, TopicLabel::new("Vacuum Cleaner", "Related Searches"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_order_preserved_under_out_of_order_completion() {
        let clusters = vec![
            cluster(0, &["300:first"]),
            cluster(1, &["10:second"]),
            cluster(2, &["200:third"]),
            cluster(3, &["1:fourth"]),
        ];
        let config = LabelingConfig {
            concurrency: 4,
            ..Default::default()
        };

        let labels = labeler(DelayedClient, config).label_clusters(&clusters).await;

        let topics: Vec<Option<String>> = labels.into_iter().map(|l| l.topic).collect();
        assert_eq!(
            topics,
            vec![
                Some("first".to_string()),
                Some("second".to_string()),
                Some("third".to_string()),
                Some("fourth".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_call_is_isolated() {
        let clusters = vec![
            cluster(0, &["drills"]),
            cluster(1, &["boom"]),
            cluster(2, &["sinks"]),
        ];
        let labels = labeler(FlakyClient, LabelingConfig::default())
            .label_clusters(&clusters)
            .await;

        assert_eq!(labels.len(), 3);
        assert_eq!(labels[0], TopicLabel::new("drills", "Pricing"));
        assert_eq!(labels[1], TopicLabel::none());
        assert_eq!(labels[2], TopicLabel::new("sinks", "Pricing"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_gives_empty_label() {
        let config = LabelingConfig {
            call_timeout_secs: 1,
            ..Default::default()
        };
        let label = labeler(StuckClient, config).assign_label(&["drill"]).await;
        assert_eq!(label, TopicLabel::none());
    }

    #[tokio::test]
    async fn test_unparseable_answer_gives_empty_label() {
        struct Chatty;

        #[async_trait]
        impl LlmClient for Chatty {
            async fn complete(&self, _prompt: &str) -> Result<String, TopicsError> {
                Ok("I cannot classify these keywords.".to_string())
            }
        }

        let label = labeler(Chatty, LabelingConfig::default())
            .assign_label(&["asdf"])
            .await;
        assert!(!label.is_labeled());
    }

    #[tokio::test]
    async fn test_noise_skipped_when_configured() {
        let client = Arc::new(CountingClient::default());
        let config = LabelingConfig {
            label_noise: false,
            ..Default::default()
        };
        let labeler = TopicLabeler::new(client.clone(), config);

        let clusters = vec![cluster(0, &["a", "b"]), cluster(NOISE_CLUSTER, &["c"])];
        let labels = labeler.label_clusters(&clusters).await;

        assert!(labels[0].is_labeled());
        assert_eq!(labels[1], TopicLabel::none());
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_noise_labeled_by_default() {
        let client = Arc::new(CountingClient::default());
        let labeler = TopicLabeler::new(client.clone(), LabelingConfig::default());

        let clusters = vec![cluster(NOISE_CLUSTER, &["c"])];
        let labels = labeler.label_clusters(&clusters).await;

        assert!(labels[0].is_labeled());
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrency_is_bounded() {
        let client = Arc::new(CountingClient::default());
        let config = LabelingConfig {
            concurrency: 2,
            ..Default::default()
        };
        let labeler = TopicLabeler::new(client.clone(), config);

        let clusters: Vec<ClusterSummary> = (0..7).map(|i| cluster(i, &["kw"])).collect();
        let labels = labeler.label_clusters(&clusters).await;

        assert_eq!(labels.len(), 7);
        assert_eq!(client.calls.load(Ordering::SeqCst), 7);
        assert!(client.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_no_clusters_no_calls() {
        let client = Arc::new(CountingClient::default());
        let labeler = TopicLabeler::new(client.clone(), LabelingConfig::default());
        assert!(labeler.label_clusters(&[]).await.is_empty());
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }
}

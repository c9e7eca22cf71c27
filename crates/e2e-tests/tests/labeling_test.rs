//! Labeling E2E tests against a mock HTTP model endpoint.
//!
//! Exercises ApiLlmClient -> TopicLabeler -> parse_label through the full
//! pipeline, including failures that must stay confined to one cluster.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use e2e_tests::seo_fixture;
use seo_topics::{
    ApiLlmClient, ApiLlmClientConfig, LabelingConfig, LlmClient, TopicPipeline, TopicsConfig,
};
use seo_types::TopicLabel;

fn chat_answer(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    }))
}

fn api_pipeline(server: &MockServer, labeling: LabelingConfig) -> TopicPipeline {
    let config = ApiLlmClientConfig::openai("test-key", "gpt-4o-mini").with_base_url(server.uri());
    let client: Arc<dyn LlmClient> = Arc::new(ApiLlmClient::new(config).unwrap());
    TopicPipeline::new(
        TopicsConfig {
            labeling,
            ..Default::default()
        },
        Some(client),
    )
    .unwrap()
}

async fn mount_answer(server: &MockServer, first_keyword: &str, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains(format!("Keywords: {first_keyword},")))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

/// Each answer shape the parser accepts reaches the right cluster.
#[tokio::test]
async fn test_labels_from_api_answers() {
    let server = MockServer::start().await;
    mount_answer(
        &server,
        "cordless drill",
        chat_answer("\"Cordless Drills\" | \"Shopping & Pricing\""),
    )
    .await;
    mount_answer(
        &server,
        "vacuum cleaner",
        chat_answer("[Vacuum Cleaners] | [Usage Guide]"),
    )
    .await;
    mount_answer(
        &server,
        "inset sink",
        chat_answer("Here you go:\nInset Sinks | Material Options"),
    )
    .await;

    let output = api_pipeline(&server, LabelingConfig::default())
        .run(&seo_fixture())
        .await
        .unwrap();

    let labels: Vec<TopicLabel> = output.clusters.iter().map(|c| c.label.clone()).collect();
    assert_eq!(
        labels,
        vec![
            TopicLabel::new("Cordless Drills", "Shopping & Pricing"),
            TopicLabel::new("Vacuum Cleaners", "Usage Guide"),
            TopicLabel::new("Inset Sinks", "Material Options"),
        ]
    );
    assert_eq!(output.keywords[0].topic.as_deref(), Some("Cordless Drills"));
}

/// A failing, a rate-limited and a slow call only blank their own cluster.
#[tokio::test]
async fn test_failures_are_isolated() {
    let server = MockServer::start().await;
    mount_answer(&server, "cordless drill", ResponseTemplate::new(500)).await;
    mount_answer(&server, "vacuum cleaner", ResponseTemplate::new(429)).await;
    mount_answer(
        &server,
        "inset sink",
        chat_answer("[Inset Sinks] | [Material Options]"),
    )
    .await;

    let output = api_pipeline(&server, LabelingConfig::default())
        .run(&seo_fixture())
        .await
        .unwrap();

    assert_eq!(output.clusters[0].label, TopicLabel::none());
    assert_eq!(output.clusters[1].label, TopicLabel::none());
    assert_eq!(
        output.clusters[2].label,
        TopicLabel::new("Inset Sinks", "Material Options")
    );
    assert_eq!(output.cluster_count, 3);
}

/// An answer slower than the call timeout yields an empty label.
#[tokio::test]
async fn test_slow_answer_times_out() {
    let server = MockServer::start().await;
    mount_answer(
        &server,
        "cordless drill",
        chat_answer("[Drills] | [Pricing]").set_delay(Duration::from_secs(3)),
    )
    .await;
    mount_answer(&server, "vacuum cleaner", chat_answer("[Vacuums] | [Guide]")).await;
    mount_answer(&server, "inset sink", chat_answer("[Sinks] | [Materials]")).await;

    let labeling = LabelingConfig {
        call_timeout_secs: 1,
        ..Default::default()
    };
    let output = api_pipeline(&server, labeling)
        .run(&seo_fixture())
        .await
        .unwrap();

    assert_eq!(output.clusters[0].label, TopicLabel::none());
    assert_eq!(output.clusters[1].label, TopicLabel::new("Vacuums", "Guide"));
    assert_eq!(output.clusters[2].label, TopicLabel::new("Sinks", "Materials"));
}

/// Unparseable answers are tolerated.
#[tokio::test]
async fn test_unparseable_answer_leaves_label_empty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(chat_answer("I am not sure what these keywords mean."))
        .mount(&server)
        .await;

    let output = api_pipeline(&server, LabelingConfig::default())
        .run(&seo_fixture())
        .await
        .unwrap();

    assert!(output.clusters.iter().all(|c| !c.label.is_labeled()));
    assert!(output.keywords.iter().all(|k| k.topic.is_none()));
}

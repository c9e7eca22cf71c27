//! Hosted model client for OpenAI-compatible and Anthropic endpoints.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::{LlmClient, SYSTEM_PROMPT};
use crate::error::TopicsError;

/// Wire protocol spoken by the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// `POST {base_url}/chat/completions` with a bearer token
    #[default]
    OpenAi,
    /// `POST {base_url}/messages` with an `x-api-key` header
    Anthropic,
}

/// Configuration for [`ApiLlmClient`].
#[derive(Debug, Clone)]
pub struct ApiLlmClientConfig {
    /// Protocol to use
    pub provider: LlmProvider,

    /// API base URL (e.g., "https://api.openai.com/v1")
    pub base_url: String,

    /// Model to use (e.g., "gpt-4o-mini")
    pub model: String,

    /// API key
    pub api_key: SecretString,

    /// HTTP request timeout
    pub timeout: Duration,

    /// Upper bound on generated tokens
    pub max_tokens: u32,
}

impl ApiLlmClientConfig {
    /// Create config for the OpenAI API.
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: LlmProvider::OpenAi,
            base_url: "https://api.openai.com/v1".to_string(),
            model: model.into(),
            api_key: SecretString::from(api_key.into()),
            timeout: Duration::from_secs(60),
            max_tokens: 1000,
        }
    }

    /// Create config for the Anthropic API.
    pub fn claude(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: LlmProvider::Anthropic,
            base_url: "https://api.anthropic.com/v1".to_string(),
            model: model.into(),
            api_key: SecretString::from(api_key.into()),
            timeout: Duration::from_secs(60),
            max_tokens: 1000,
        }
    }

    /// Point the client at a different endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the HTTP request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// [`LlmClient`] backed by a hosted chat model.
///
/// Sends the SEO system instruction and the prompt with temperature 0.
/// One request per call; failures are returned to the caller untouched.
pub struct ApiLlmClient {
    client: Client,
    config: ApiLlmClientConfig,
}

impl ApiLlmClient {
    /// Create a new API client.
    pub fn new(config: ApiLlmClientConfig) -> Result<Self, TopicsError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TopicsError::InvalidConfig(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Get the configuration.
    pub fn config(&self) -> &ApiLlmClientConfig {
        &self.config
    }

    async fn openai_request(&self, prompt: &str) -> Result<String, TopicsError> {
        #[derive(Serialize)]
        struct OpenAIRequest<'a> {
            model: &'a str,
            messages: Vec<ChatMessage<'a>>,
            max_tokens: u32,
            temperature: f32,
        }

        #[derive(Deserialize)]
        struct OpenAIResponse {
            choices: Vec<OpenAIChoice>,
        }

        #[derive(Deserialize)]
        struct OpenAIChoice {
            message: OpenAIMessageResponse,
        }

        #[derive(Deserialize)]
        struct OpenAIMessageResponse {
            #[serde(default)]
            content: Option<String>,
        }

        let request = OpenAIRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: 0.0,
        };

        let url = format!("{}/chat/completions", self.config.base_url);

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.config.api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(request_error)?;

        let body: OpenAIResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| TopicsError::LabelCall(format!("malformed response: {}", e)))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| TopicsError::LabelCall("no choices in response".to_string()))
    }

    async fn anthropic_request(&self, prompt: &str) -> Result<String, TopicsError> {
        #[derive(Serialize)]
        struct AnthropicRequest<'a> {
            model: &'a str,
            max_tokens: u32,
            temperature: f32,
            system: &'a str,
            messages: Vec<ChatMessage<'a>>,
        }

        #[derive(Deserialize)]
        struct AnthropicResponse {
            content: Vec<AnthropicContent>,
        }

        #[derive(Deserialize)]
        struct AnthropicContent {
            #[serde(default)]
            text: Option<String>,
        }

        let request = AnthropicRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            temperature: 0.0,
            system: SYSTEM_PROMPT,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let url = format!("{}/messages", self.config.base_url);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", self.config.api_key.expose_secret())
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(request_error)?;

        let body: AnthropicResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| TopicsError::LabelCall(format!("malformed response: {}", e)))?;

        body.content
            .into_iter()
            .find_map(|c| c.text)
            .ok_or_else(|| TopicsError::LabelCall("no content in response".to_string()))
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

fn request_error(e: reqwest::Error) -> TopicsError {
    if e.is_timeout() {
        TopicsError::Timeout
    } else {
        TopicsError::LabelCall(e.to_string())
    }
}

async fn check_status(response: Response) -> Result<Response, TopicsError> {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(TopicsError::RateLimited);
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        error!(%status, "Label request rejected");
        return Err(TopicsError::LabelCall(format!("HTTP {}: {}", status, body)));
    }

    Ok(response)
}

#[async_trait]
impl LlmClient for ApiLlmClient {
    async fn complete(&self, prompt: &str) -> Result<String, TopicsError> {
        debug!(
            provider = ?self.config.provider,
            model = %self.config.model,
            "Sending label request"
        );

        match self.config.provider {
            LlmProvider::OpenAi => self.openai_request(prompt).await,
            LlmProvider::Anthropic => self.anthropic_request(prompt).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn openai_client(server: &MockServer) -> ApiLlmClient {
        let config = ApiLlmClientConfig::openai("test-key", "gpt-4o-mini").with_base_url(server.uri());
        ApiLlmClient::new(config).unwrap()
    }

    #[test]
    fn test_openai_config() {
        let config = ApiLlmClientConfig::openai("test-key", "gpt-4o-mini");
        assert_eq!(config.provider, LlmProvider::OpenAi);
        assert!(config.base_url.contains("openai"));
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.max_tokens, 1000);
    }

    #[test]
    fn test_claude_config() {
        let config = ApiLlmClientConfig::claude("test-key", "claude-3-5-haiku-latest");
        assert_eq!(config.provider, LlmProvider::Anthropic);
        assert!(config.base_url.contains("anthropic"));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = ApiLlmClientConfig::openai("k", "m").with_base_url("http://localhost:9/v1/");
        assert_eq!(config.base_url, "http://localhost:9/v1");
    }

    #[test]
    fn test_provider_deserializes_lowercase() {
        let provider: LlmProvider = serde_json::from_str(r#""anthropic""#).unwrap();
        assert_eq!(provider, LlmProvider::Anthropic);
        let provider: LlmProvider = serde_json::from_str(r#""openai""#).unwrap();
        assert_eq!(provider, LlmProvider::OpenAi);
    }

    #[tokio::test]
    async fn test_openai_request_shape_and_answer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini",
                "temperature": 0.0,
                "messages": [
                    {"role": "system", "content": SYSTEM_PROMPT},
                    {"role": "user", "content": "Keywords: drill"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "\"Drills\" | \"Pricing\""}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let answer = openai_client(&server).complete("Keywords: drill").await.unwrap();
        assert_eq!(answer, "\"Drills\" | \"Pricing\"");
    }

    #[tokio::test]
    async fn test_anthropic_request_shape_and_answer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .and(header("x-api-key", "test-key"))
            .and(header("anthropic-version", "2023-06-01"))
            .and(body_partial_json(json!({"system": SYSTEM_PROMPT})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{"type": "text", "text": "[Sinks] | [Material Options]"}]
            })))
            .mount(&server)
            .await;

        let config = ApiLlmClientConfig::claude("test-key", "claude-3-5-haiku-latest")
            .with_base_url(server.uri());
        let client = ApiLlmClient::new(config).unwrap();
        let answer = client.complete("Keywords: sink").await.unwrap();
        assert_eq!(answer, "[Sinks] | [Material Options]");
    }

    #[tokio::test]
    async fn test_rate_limit_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .expect(1)
            .mount(&server)
            .await;

        let result = openai_client(&server).complete("Keywords: x").await;
        assert!(matches!(result, Err(TopicsError::RateLimited)));
    }

    #[tokio::test]
    async fn test_server_error_is_label_call_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        match openai_client(&server).complete("Keywords: x").await {
            Err(TopicsError::LabelCall(message)) => assert!(message.contains("boom")),
            other => panic!("expected LabelCall, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_choices_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        assert!(matches!(
            openai_client(&server).complete("Keywords: x").await,
            Err(TopicsError::LabelCall(_))
        ));
    }

    #[tokio::test]
    async fn test_slow_endpoint_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_millis(500))
                    .set_body_json(json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let config = ApiLlmClientConfig::openai("test-key", "gpt-4o-mini")
            .with_base_url(server.uri())
            .with_timeout(Duration::from_millis(50));
        let client = ApiLlmClient::new(config).unwrap();
        assert!(matches!(
            client.complete("Keywords: x").await,
            Err(TopicsError::Timeout)
        ));
    }
}

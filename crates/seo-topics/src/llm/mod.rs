//! Text-generation clients used for topic labeling.
//!
//! The labeler only needs "prompt in, text out"; [`LlmClient`] is that
//! boundary. [`ApiLlmClient`] talks to a hosted model, [`MockLlmClient`]
//! answers offline.

mod api;
mod mock;

pub use api::{ApiLlmClient, ApiLlmClientConfig, LlmProvider};
pub use mock::MockLlmClient;

use async_trait::async_trait;

use crate::error::TopicsError;

/// System instruction sent with every labeling request.
pub const SYSTEM_PROMPT: &str = "You are an intelligent SEO Expert.";

/// Pluggable text-generation client.
///
/// Implementations must be safe to call concurrently; the labeler keeps
/// several requests in flight against one shared client.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a prompt and return the raw answer text.
    async fn complete(&self, prompt: &str) -> Result<String, TopicsError>;
}

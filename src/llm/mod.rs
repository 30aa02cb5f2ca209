//! Generation backend — Ollama over HTTP, behind the `ReplyGenerator`
//! seam so the poller can be exercised with a stub.

pub mod retry;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::error::GenerationError;
use retry::RetryPolicy;

/// Prompt template for a professional reply. `{recipient_name}` and
/// `{email_body}` are substituted before the call.
const PROMPT_TEMPLATE: &str = "\
You are writing a professional email response. Write a polite, formal response that maintains a professional tone.
Guidelines:
- Use proper business etiquette
- Be concise but thorough
- Avoid casual language, slang, or emojis
- Maintain a professional and respectful tone
- Use proper grammar and punctuation
- Keep the response focused and relevant to the original email
- Address the recipient by their name: {recipient_name}
- Format paragraphs properly:
  * Start each paragraph with a clear topic sentence
  * Keep paragraphs focused and well-structured
  * Use proper spacing between paragraphs
  * Ensure logical flow between ideas
  * Left-align all text

Original email:
{email_body}

Your response:
";

/// Produces a reply for one inbound message.
#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    /// Generate a reply to `email_body`, addressed to `recipient_name`.
    /// Fails only after the backend's retries are exhausted.
    async fn generate(
        &self,
        email_body: &str,
        recipient_name: &str,
    ) -> Result<String, GenerationError>;
}

/// Ollama client: liveness probe on `/api/tags`, completion via
/// `/api/generate`, both under the retry policy.
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    retry: RetryPolicy,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Liveness probe. Any transport error or non-success status fails
    /// the current attempt.
    async fn probe(&self) -> Result<(), GenerationError> {
        let url = format!("{}/api/tags", self.base_url);
        self.http
            .get(&url)
            .send()
            .await
            .map_err(|e| GenerationError::Unavailable(e.to_string()))?
            .error_for_status()
            .map_err(|e| GenerationError::Unavailable(e.to_string()))?;
        Ok(())
    }

    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        let url = format!("{}/api/generate", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&json!({
                "model": self.model,
                "prompt": prompt,
                "stream": false,
            }))
            .send()
            .await
            .map_err(|e| GenerationError::Request(e.to_string()))?
            .error_for_status()
            .map_err(|e| GenerationError::Request(e.to_string()))?;

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;
        Ok(body.response)
    }

    /// One attempt: probe, then generate, then trim.
    async fn attempt(&self, prompt: &str) -> Result<String, GenerationError> {
        self.probe().await?;
        let text = self.complete(prompt).await?;
        Ok(text.trim().to_string())
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[async_trait]
impl ReplyGenerator for OllamaClient {
    async fn generate(
        &self,
        email_body: &str,
        recipient_name: &str,
    ) -> Result<String, GenerationError> {
        let prompt = render_prompt(recipient_name, email_body);
        retry::retry_with_policy(&self.retry, || self.attempt(&prompt)).await
    }
}

/// Substitute the template slots.
pub fn render_prompt(recipient_name: &str, email_body: &str) -> String {
    PROMPT_TEMPLATE
        .replace("{recipient_name}", recipient_name)
        .replace("{email_body}", email_body)
}

//! OpenAI-compatible backend client
//!
//! One reqwest client serves both the embeddings and chat completion
//! endpoints. The credential comes from `Config`, never from the environment
//! here.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Error, Result};

use super::chat::ChatProvider;
use super::embedding::EmbeddingProvider;

/// Client for an OpenAI-compatible API
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    chat_model: String,
    embed_model: String,
    dimensions: usize,
    temperature: f32,
}

impl OpenAiClient {
    /// Create a client from configuration
    pub fn new(config: &Config) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::config("backend credential is empty"));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.llm.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.llm.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            chat_model: config.llm.chat_model.clone(),
            embed_model: config.embeddings.model.clone(),
            dimensions: config.embeddings.dimensions,
            temperature: config.llm.temperature,
        })
    }

    async fn post_json<B: Serialize, T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::backend(format!(
                "{} returned {}: {}",
                url, status, detail
            )));
        }

        Ok(response.json().await?)
    }
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    index: usize,
    embedding: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for OpenAiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let batch = self.embed_batch(&[text.to_string()]).await?;
        batch
            .into_iter()
            .next()
            .ok_or_else(|| Error::backend("embeddings response was empty"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let request = EmbeddingsRequest {
            model: &self.embed_model,
            input: texts,
        };
        let mut response: EmbeddingsResponse = self.post_json("/embeddings", &request).await?;
        if response.data.len() != texts.len() {
            return Err(Error::backend(format!(
                "requested {} embeddings, backend returned {}",
                texts.len(),
                response.data.len()
            )));
        }
        // The API does not guarantee input order.
        response.data.sort_by_key(|d| d.index);
        Ok(response.data.into_iter().map(|d| d.embedding).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "openai-embeddings"
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl ChatProvider for OpenAiClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.chat_model,
            temperature: self.temperature,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        let response: ChatResponse = self.post_json("/chat/completions", &request).await?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|text| text.trim().to_string())
            .ok_or_else(|| Error::backend("chat completion had no content"))
    }

    fn name(&self) -> &str {
        "openai-chat"
    }

    fn model(&self) -> &str {
        &self.chat_model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_key() -> Config {
        Config {
            api_key: "sk-test".to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn rejects_empty_credential() {
        let config = Config::default();
        assert!(matches!(
            OpenAiClient::new(&config),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn trims_trailing_slash_from_base_url() {
        let mut config = config_with_key();
        config.llm.base_url = "http://127.0.0.1:9999/v1/".to_string();
        let client = OpenAiClient::new(&config).unwrap();
        assert_eq!(client.base_url, "http://127.0.0.1:9999/v1");
    }
}

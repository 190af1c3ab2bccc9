//! Chat completion client for OpenAI-compatible endpoints.
//!
//! Ollama exposes the same `/chat/completions` surface, so one client covers
//! both providers; only endpoint, key and model differ.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ChatError, ChatModel};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

pub struct OpenAiChat {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiChat {
    /// `endpoint` defaults to `https://api.openai.com/v1`. `api_key` is
    /// omitted for local endpoints that need none.
    pub fn new(api_key: Option<String>, model: String, endpoint: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            api_key,
            model,
        }
    }
}

#[async_trait]
impl ChatModel for OpenAiChat {
    async fn complete(&self, system: &str, user: &str) -> Result<String, ChatError> {
        let url = format!("{}/chat/completions", self.endpoint);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                Message { role: "system", content: system },
                Message { role: "user", content: user },
            ],
            temperature: 0.0,
        };

        let mut req = self.client.post(&url).json(&request);
        if let Some(key) = &self.api_key {
            req = req.header("Authorization", format!("Bearer {key}"));
        }

        let response = req.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Api { status, body });
        }

        let result: ChatResponse = response.json().await?;
        result
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(ChatError::EmptyResponse)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let chat = OpenAiChat::new(Some("key".into()), "gpt-4o-mini".into(), None);
        assert_eq!(chat.model_name(), "gpt-4o-mini");
        assert_eq!(chat.endpoint, "https://api.openai.com/v1");
    }

    #[test]
    fn test_local_endpoint_without_key() {
        let chat = OpenAiChat::new(
            None,
            "llama3.1".into(),
            Some("http://localhost:11434/v1".into()),
        );
        assert!(chat.api_key.is_none());
        assert_eq!(chat.endpoint, "http://localhost:11434/v1");
    }
}

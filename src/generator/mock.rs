//! Mock chat model for testing.

use async_trait::async_trait;

use super::{ChatError, ChatModel};

/// Deterministic chat model that echoes the question it was asked.
#[derive(Default)]
pub struct MockChat;

#[async_trait]
impl ChatModel for MockChat {
    async fn complete(&self, _system: &str, user: &str) -> Result<String, ChatError> {
        // Echo the last line (the instruction carrying the question) so tests
        // can assert the prompt reached the model.
        let tail = user.lines().last().unwrap_or_default();
        Ok(format!("mock answer ({tail})"))
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

/// Chat model that always fails, for exercising error paths.
pub struct FailingChat;

#[async_trait]
impl ChatModel for FailingChat {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, ChatError> {
        Err(ChatError::Api {
            status: 503,
            body: "service unavailable".to_string(),
        })
    }

    fn model_name(&self) -> &str {
        "failing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_chat_echoes() {
        let chat = MockChat;
        let out = chat.complete("system", "line one\nQuestion: why?").await.unwrap();
        assert!(out.contains("Question: why?"));
    }

    #[tokio::test]
    async fn test_failing_chat_errors() {
        let chat = FailingChat;
        let err = chat.complete("s", "u").await.unwrap_err();
        assert!(matches!(err, ChatError::Api { status: 503, .. }));
    }
}

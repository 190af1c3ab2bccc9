//! Answer generation: assemble a bounded context prompt from retrieved
//! chunks and ask a chat model for an answer with document citations.

pub mod mock;
pub mod openai;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::store::SearchResult;

/// Errors from chat completion calls.
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("chat request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("chat API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("chat response contained no choices")]
    EmptyResponse,
}

/// Trait for chat completion backends.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Request a completion for a system prompt plus one user message.
    async fn complete(&self, system: &str, user: &str) -> Result<String, ChatError>;

    /// Return the model identifier used for generation.
    fn model_name(&self) -> &str;
}

/// A chunk that made it into the prompt, in inclusion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Citation {
    pub filename: String,
    pub position: usize,
}

/// Generated answer plus the sources actually shown to the model.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<Citation>,
}

const SYSTEM_PROMPT: &str = "You are a helpful assistant that answers questions using only the \
provided context from indexed documents. Cite the document name whenever you reference its \
content. If the answer cannot be found in the context, say so explicitly instead of guessing.";

/// Builds the bounded context prompt and calls the chat model.
pub struct Generator {
    max_context_chars: usize,
}

impl Generator {
    #[must_use]
    pub fn new(max_context_chars: usize) -> Self {
        Self { max_context_chars }
    }

    /// Generate an answer for `question` from `hits` (most relevant first).
    ///
    /// Chunks are added to the context in order until the character budget is
    /// reached; the returned citations list exactly the chunks included.
    pub async fn generate(
        &self,
        chat: &dyn ChatModel,
        question: &str,
        hits: &[SearchResult],
    ) -> Result<Answer, ChatError> {
        let (context, sources) = self.build_context(hits);

        let user = format!(
            "Context from indexed documents:\n\n{context}\n\nQuestion: {question}\n\n\
             Answer using the context above, citing document names."
        );

        let text = chat.complete(SYSTEM_PROMPT, &user).await?;
        Ok(Answer { text, sources })
    }

    /// Concatenate `[Document: … | Chunk …]` blocks within the budget.
    fn build_context(&self, hits: &[SearchResult]) -> (String, Vec<Citation>) {
        const SEPARATOR: &str = "\n\n---\n\n";

        let mut context = String::new();
        let mut sources = Vec::new();

        for hit in hits {
            let block = format!(
                "[Document: {} | Chunk {}]\n{}",
                hit.filename, hit.position, hit.content
            );
            let sep_len = if context.is_empty() { 0 } else { SEPARATOR.len() };

            if context.len() + sep_len + block.len() > self.max_context_chars {
                // A lone over-budget block is truncated, not dropped.
                if context.is_empty() {
                    let truncated: String =
                        block.chars().take(self.max_context_chars).collect();
                    context.push_str(&truncated);
                    sources.push(Citation {
                        filename: hit.filename.clone(),
                        position: hit.position,
                    });
                }
                break;
            }

            if !context.is_empty() {
                context.push_str(SEPARATOR);
            }
            context.push_str(&block);
            sources.push(Citation {
                filename: hit.filename.clone(),
                position: hit.position,
            });
        }

        (context, sources)
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockChat;
    use super::*;

    fn hit(name: &str, position: usize, content: &str) -> SearchResult {
        SearchResult {
            filename: name.to_string(),
            content: content.to_string(),
            position,
            similarity: 0.9,
            embedding: vec![0.0; 4],
        }
    }

    #[test]
    fn test_context_includes_all_within_budget() {
        let generator = Generator::new(10_000);
        let hits = vec![hit("a.txt", 0, "first"), hit("b.txt", 3, "second")];

        let (context, sources) = generator.build_context(&hits);
        assert!(context.contains("[Document: a.txt | Chunk 0]\nfirst"));
        assert!(context.contains("[Document: b.txt | Chunk 3]\nsecond"));
        assert_eq!(
            sources,
            vec![
                Citation { filename: "a.txt".into(), position: 0 },
                Citation { filename: "b.txt".into(), position: 3 },
            ]
        );
    }

    #[test]
    fn test_context_budget_drops_tail() {
        let generator = Generator::new(80);
        let hits = vec![
            hit("a.txt", 0, "short"),
            hit("b.txt", 1, &"x".repeat(500)),
        ];

        let (context, sources) = generator.build_context(&hits);
        assert!(context.len() <= 80);
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].filename, "a.txt");
    }

    #[test]
    fn test_single_oversized_block_truncated() {
        let generator = Generator::new(60);
        let hits = vec![hit("big.txt", 0, &"y".repeat(500))];

        let (context, sources) = generator.build_context(&hits);
        assert_eq!(context.chars().count(), 60);
        assert_eq!(sources.len(), 1);
    }

    #[tokio::test]
    async fn test_generate_returns_sources() {
        let generator = Generator::new(6000);
        let chat = MockChat::default();
        let hits = vec![hit("notes.md", 2, "Rust ships a borrow checker.")];

        let answer = generator
            .generate(&chat, "What does Rust ship?", &hits)
            .await
            .unwrap();
        assert!(!answer.text.is_empty());
        assert_eq!(answer.sources.len(), 1);
        assert_eq!(answer.sources[0].filename, "notes.md");
        assert_eq!(answer.sources[0].position, 2);
    }
}

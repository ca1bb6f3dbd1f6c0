//! Opaque LLM/embedding capabilities (spec §1/§9): `complete`, `stream`,
//! `embed` are abstracted behind traits so the pipeline, retriever, and
//! chat assembler can be exercised against deterministic fakes without
//! network access.

pub mod embedding;
pub mod openrouter;
pub mod prompts;

use futures_util::stream::BoxStream;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage], task_type: &str) -> anyhow::Result<String>;

    async fn stream(
        &self,
        messages: &[ChatMessage],
        task_type: &str,
    ) -> anyhow::Result<BoxStream<'static, anyhow::Result<String>>>;
}

#[async_trait::async_trait]
pub trait EmbeddingClient: Send + Sync {
    async fn embed(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;

    async fn embed_one(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let mut v = self.embed(std::slice::from_ref(&text.to_string())).await?;
        v.pop().ok_or_else(|| anyhow::anyhow!("embedding capability returned no vectors"))
    }
}

#[cfg(test)]
pub mod fakes {
    use super::*;
    use futures_util::stream;

    /// Deterministic LLM fake: echoes a canned response per task type,
    /// ignoring the prompt content.
    pub struct FakeLlmClient {
        pub response: String,
    }

    #[async_trait::async_trait]
    impl LlmClient for FakeLlmClient {
        async fn complete(&self, _messages: &[ChatMessage], _task_type: &str) -> anyhow::Result<String> {
            Ok(self.response.clone())
        }

        async fn stream(
            &self,
            _messages: &[ChatMessage],
            _task_type: &str,
        ) -> anyhow::Result<BoxStream<'static, anyhow::Result<String>>> {
            let chunks: Vec<anyhow::Result<String>> =
                self.response.split(' ').map(|w| Ok(format!("{w} "))).collect();
            Ok(Box::pin(stream::iter(chunks)))
        }
    }

    /// Deterministic embedding fake: maps each text to a fixed-dim vector
    /// derived from its byte length, so equal-length texts embed equally.
    pub struct FakeEmbeddingClient {
        pub dim: usize,
    }

    #[async_trait::async_trait]
    impl EmbeddingClient for FakeEmbeddingClient {
        async fn embed(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|t| {
                    let seed = (t.len() as f32 + 1.0).recip();
                    vec![seed; self.dim]
                })
                .collect())
        }
    }
}

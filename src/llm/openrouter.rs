//! Model-agnostic LLM client via OpenRouter, grounded on the original's
//! `app/llm/client.py`.

use std::sync::Arc;

use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use serde::Deserialize;
use serde_json::json;

use crate::config::ModelRegistry;
use crate::llm::{ChatMessage, LlmClient};

const BASE_URL: &str = "https://openrouter.ai/api/v1";

pub struct OpenRouterClient {
    http: reqwest::Client,
    api_key: String,
    registry: Arc<ModelRegistry>,
}

impl OpenRouterClient {
    pub fn new(api_key: String, registry: Arc<ModelRegistry>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            registry,
        }
    }
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct StreamChunk {
    choices: Vec<StreamChoice>,
}

#[derive(Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
}

#[derive(Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

#[async_trait::async_trait]
impl LlmClient for OpenRouterClient {
    async fn complete(&self, messages: &[ChatMessage], task_type: &str) -> anyhow::Result<String> {
        let model = self.registry.get_model(task_type);
        let body = json!({
            "model": model,
            "messages": messages,
            "temperature": 0.7,
            "max_tokens": 4096,
        });

        let result: Result<CompletionResponse, _> = async {
            let resp = self
                .http
                .post(format!("{BASE_URL}/chat/completions"))
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await?
                .error_for_status()?;
            resp.json::<CompletionResponse>().await
        }
        .await;

        match result {
            Ok(r) => Ok(r
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .unwrap_or_default()),
            Err(e) => {
                tracing::error!(model = %model, task_type, error = %e, "LLM call failed");
                Err(e.into())
            }
        }
    }

    async fn stream(
        &self,
        messages: &[ChatMessage],
        task_type: &str,
    ) -> anyhow::Result<BoxStream<'static, anyhow::Result<String>>> {
        let model = self.registry.get_model(task_type);
        let body = json!({
            "model": model,
            "messages": messages,
            "temperature": 0.7,
            "max_tokens": 4096,
            "stream": true,
        });

        let resp = self
            .http
            .post(format!("{BASE_URL}/chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                tracing::error!(model = %model, task_type, error = %e, "LLM stream failed");
                e
            })?;

        let byte_stream = resp.bytes_stream();
        let stream = byte_stream
            .map(|chunk| chunk.map_err(anyhow::Error::from))
            .flat_map(|chunk| {
                let deltas = chunk
                    .map(|bytes| parse_sse_deltas(&bytes))
                    .unwrap_or_else(|e| vec![Err(e)]);
                futures_util::stream::iter(deltas)
            });

        Ok(Box::pin(stream))
    }
}

/// Parses one or more `data: {...}` SSE lines out of a raw chunk of the
/// OpenAI-compatible streaming response, skipping the `[DONE]` sentinel.
fn parse_sse_deltas(bytes: &[u8]) -> Vec<anyhow::Result<String>> {
    let text = String::from_utf8_lossy(bytes);
    text.lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .filter(|payload| *payload != "[DONE]")
        .filter_map(|payload| {
            serde_json::from_str::<StreamChunk>(payload)
                .ok()
                .and_then(|c| c.choices.into_iter().next())
                .and_then(|c| c.delta.content)
        })
        .map(Ok)
        .collect()
}

//! Opaque HTTP-backed embedding capability. The source loads a local
//! `sentence-transformers` model process-wide (`app/processing/embedder.py`);
//! spec §1 explicitly scopes embedding out of core as an external
//! `embed(texts) -> vectors` collaborator, so this calls out to a
//! separately-hosted embedding service instead of loading a model in-process.

use serde::{Deserialize, Serialize};

use crate::llm::EmbeddingClient;

pub struct HttpEmbeddingClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl HttpEmbeddingClient {
    pub fn new(base_url: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            model,
        }
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[async_trait::async_trait]
impl EmbeddingClient for HttpEmbeddingClient {
    async fn embed(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let body = EmbedRequest {
            model: &self.model,
            input: texts,
        };

        let resp = self
            .http
            .post(format!("{}/embed", self.base_url))
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json::<EmbedResponse>()
            .await?;

        Ok(resp.embeddings)
    }
}

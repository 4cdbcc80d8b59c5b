use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::configuration::EmbeddingSettings;

#[async_trait::async_trait]
pub trait EmbeddingModel: Send + Sync {
    /// Fixed-dimensionality embedding of `text`.
    async fn encode(&self, text: &str) -> Result<Vec<f32>>;
}

/// Client for an OpenAI-compatible `/embeddings` endpoint.
pub struct EmbeddingClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct EmbeddingPayload<'a> {
    input: &'a str,
    model: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingRow>,
}

#[derive(Deserialize)]
struct EmbeddingRow {
    embedding: Vec<f32>,
}

impl EmbeddingClient {
    pub fn new(settings: EmbeddingSettings) -> Self {
        EmbeddingClient {
            client: reqwest::Client::new(),
            base_url: settings.base_url,
            api_key: settings.api_key,
            model: settings.model,
        }
    }
}

#[async_trait::async_trait]
impl EmbeddingModel for EmbeddingClient {
    async fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/embeddings", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&EmbeddingPayload {
                input: text,
                model: &self.model,
            })
            .send()
            .await?
            .error_for_status()?;

        let parsed: EmbeddingResponse = response.json().await?;

        parsed
            .data
            .into_iter()
            .next()
            .map(|row| row.embedding)
            .ok_or_else(|| anyhow!("Embedding response contained no vectors"))
    }
}

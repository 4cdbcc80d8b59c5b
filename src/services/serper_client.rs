use anyhow::Result;
use serde::Serialize;

use crate::configuration::SearchSettings;
use crate::domain::lead::RawResult;

#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    /// May legitimately return zero hits; transport errors bubble up and
    /// are downgraded to zero results by the caller.
    async fn search(&self, query: &str) -> Result<Vec<RawResult>>;
}

/// Web search through the Serper API.
pub struct SerperClient {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    results_per_query: u8,
}

#[derive(Serialize)]
struct SearchPayload {
    q: String,
    num: u8,
}

impl SerperClient {
    pub fn new(settings: SearchSettings) -> Self {
        SerperClient {
            client: reqwest::Client::new(),
            api_key: settings.api_key,
            endpoint: settings.endpoint,
            results_per_query: settings.results_per_query,
        }
    }
}

#[async_trait::async_trait]
impl SearchProvider for SerperClient {
    async fn search(&self, query: &str) -> Result<Vec<RawResult>> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", &self.api_key)
            .json(&SearchPayload {
                q: query.to_string(),
                num: self.results_per_query,
            })
            .send()
            .await?
            .error_for_status()?;

        let data: serde_json::Value = response.json().await?;
        Ok(parse_organic_results(&data))
    }
}

fn parse_organic_results(data: &serde_json::Value) -> Vec<RawResult> {
    match data.get("organic").and_then(|o| o.as_array()) {
        Some(items) => items
            .iter()
            .map(|item| RawResult {
                title: string_field(item, "title"),
                link: string_field(item, "link"),
                snippet: string_field(item, "snippet"),
            })
            .collect(),
        None => vec![],
    }
}

fn string_field(item: &serde_json::Value, key: &str) -> String {
    item.get(key)
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}

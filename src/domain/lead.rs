use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::intent::IntentAnalysis;

#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    pub industry: String,
    pub location: Option<String>,
    pub buying_signals: String,
}

/// One hit from the search provider, before scraping and classification.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResult {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

/// A search result enriched with its intent classification and composite
/// score. The unit of ranking and persistence; `link` is unique in storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub title: String,
    pub link: String,
    pub snippet: String,
    pub domain: String,
    pub intent_analysis: IntentAnalysis,
    pub imre_score: f64,
}

/// A lead as read back from storage. Snippets are not persisted, so this is
/// narrower than `Lead`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StoredLead {
    pub title: String,
    pub link: String,
    pub domain: String,
    pub intent_score: i32,
    pub intent_level: String,
    pub imre_score: f64,
}

pub fn extract_domain(link: &str) -> String {
    match Url::parse(link) {
        Ok(parsed_url) => match parsed_url.host_str() {
            Some(host) => match host.strip_prefix("www.") {
                Some(h) => h.to_string(),
                None => host.to_string(),
            },
            None => "".to_string(),
        },
        Err(_) => "".to_string(),
    }
}

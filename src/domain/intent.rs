use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One nearest-neighbor row returned by the vector index. `intent_weight`
/// carries sign and magnitude into the weighted average, `similarity` is
/// cosine similarity in [0, 1].
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct IntentExample {
    pub bucket: String,
    pub similarity: f64,
    pub intent_weight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntentLevel {
    #[serde(rename = "High Intent")]
    High,
    #[serde(rename = "Medium Intent")]
    Medium,
    #[serde(rename = "Low Intent")]
    Low,
    #[serde(rename = "No Intent")]
    No,
}

impl IntentLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentLevel::High => "High Intent",
            IntentLevel::Medium => "Medium Intent",
            IntentLevel::Low => "Low Intent",
            IntentLevel::No => "No Intent",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentAnalysis {
    pub buying_intent: bool,
    pub intent_score: i32,
    pub intent_level: IntentLevel,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "HashMap::is_empty", default)]
    pub bucket_distribution: HashMap<String, u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub dominant_bucket: Option<String>,
    pub max_similarity: f64,
}

impl IntentAnalysis {
    /// Sentinel for text too short to classify. No collaborator is called
    /// before returning this.
    pub fn insufficient_content() -> Self {
        Self::unscored("Insufficient content")
    }

    /// Sentinel for an empty nearest-neighbor result set.
    pub fn no_matches() -> Self {
        Self::unscored("No similarity matches found")
    }

    fn unscored(reason: &str) -> Self {
        IntentAnalysis {
            buying_intent: false,
            intent_score: 0,
            intent_level: IntentLevel::No,
            reason: Some(reason.to_string()),
            bucket_distribution: HashMap::new(),
            dominant_bucket: None,
            max_similarity: 0.0,
        }
    }
}

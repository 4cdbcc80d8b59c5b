use std::sync::Arc;

use anyhow::Result;

use crate::domain::intent::{IntentAnalysis, IntentExample, IntentLevel};
use crate::services::EmbeddingModel;

/// How many labeled neighbors the vector index is asked for.
pub const MATCH_COUNT: usize = 20;

/// Below this trimmed length a text is not worth embedding.
const MIN_CONTENT_CHARS: usize = 20;

const HIGH_INTENT_MIN_SCORE: i32 = 85;
const MEDIUM_INTENT_MIN_SCORE: i32 = 60;
const LOW_INTENT_MIN_SCORE: i32 = 35;

/// Reference bucket that must dominate the neighbor set for a High Intent
/// call. Score alone is not enough at the top tier.
pub const HIGH_INTENT_BUCKET: &str = "data1";

#[async_trait::async_trait]
pub trait VectorIndex: Send + Sync {
    async fn nearest(&self, embedding: &[f32], k: usize) -> Result<Vec<IntentExample>>;
}

/// Classifies a text's buying intent by similarity against labeled
/// reference examples: embed the text, pull the nearest neighbors and take
/// the similarity-weighted average of their intent weights, so close
/// matches dominate and far-away outliers barely register.
pub struct IntentClassifier {
    embedder: Arc<dyn EmbeddingModel>,
    index: Arc<dyn VectorIndex>,
}

impl IntentClassifier {
    pub fn new(embedder: Arc<dyn EmbeddingModel>, index: Arc<dyn VectorIndex>) -> Self {
        IntentClassifier { embedder, index }
    }

    pub async fn classify(&self, text: &str) -> Result<IntentAnalysis> {
        if text.trim().chars().count() < MIN_CONTENT_CHARS {
            return Ok(IntentAnalysis::insufficient_content());
        }

        let embedding = self.embedder.encode(text).await?;
        let examples = self.index.nearest(&embedding, MATCH_COUNT).await?;

        if examples.is_empty() {
            return Ok(IntentAnalysis::no_matches());
        }

        // Buckets are counted in encounter order; equal counts resolve to
        // the bucket seen first.
        let mut bucket_counts: Vec<(String, u32)> = vec![];
        let mut weighted_score = 0.0;
        let mut total_similarity = 0.0;
        let mut max_similarity: f64 = 0.0;

        for example in &examples {
            max_similarity = max_similarity.max(example.similarity);
            weighted_score += example.intent_weight * example.similarity;
            total_similarity += example.similarity;

            match bucket_counts.iter_mut().find(|(b, _)| b == &example.bucket) {
                Some((_, count)) => *count += 1,
                None => bucket_counts.push((example.bucket.clone(), 1)),
            }
        }

        let final_score = match total_similarity > 0.0 {
            true => ((weighted_score / total_similarity) * 100.0).round() as i32,
            false => 0,
        };
        let final_score = final_score.clamp(0, 100);

        let mut dominant = &bucket_counts[0];
        for entry in &bucket_counts[1..] {
            if entry.1 > dominant.1 {
                dominant = entry;
            }
        }
        let dominant_bucket = dominant.0.clone();

        let (buying_intent, intent_level) =
            if final_score >= HIGH_INTENT_MIN_SCORE && dominant_bucket == HIGH_INTENT_BUCKET {
                (true, IntentLevel::High)
            } else if final_score >= MEDIUM_INTENT_MIN_SCORE {
                (true, IntentLevel::Medium)
            } else if final_score >= LOW_INTENT_MIN_SCORE {
                (false, IntentLevel::Low)
            } else {
                (false, IntentLevel::No)
            };

        Ok(IntentAnalysis {
            buying_intent,
            intent_score: final_score,
            intent_level,
            reason: None,
            bucket_distribution: bucket_counts.into_iter().collect(),
            dominant_bucket: Some(dominant_bucket),
            max_similarity: (max_similarity * 1000.0).round() / 1000.0,
        })
    }
}

use crate::domain::intent::IntentAnalysis;

// IMRE weighting policy: Intent, Match-strength, Recency, Expansion.
const INTENT_WEIGHT: f64 = 0.6;
const MATCH_WEIGHT: f64 = 0.2;
const RECENCY_WEIGHT: f64 = 0.1;
const EXPANSION_WEIGHT: f64 = 0.1;

// Neutral placeholder until a temporal signal is available on leads.
const NEUTRAL_RECENCY: f64 = 50.0;

const EXPANSION_KEYWORDS: [&str; 7] = [
    "rfp",
    "tender",
    "supplier search",
    "vendor registration",
    "expansion",
    "new plant",
    "procurement",
];

/// Composite ranking score for a classified lead, rounded to 2 decimals.
/// Missing signals contribute their neutral value instead of erroring.
pub fn calculate_imre(analysis: &IntentAnalysis, title: &str, snippet: &str) -> f64 {
    let intent_score = analysis.intent_score as f64;
    let match_strength = analysis.max_similarity * 100.0;

    let content = format!("{} {}", title, snippet).to_lowercase();
    let expansion_score = match EXPANSION_KEYWORDS.iter().any(|k| content.contains(k)) {
        true => 100.0,
        false => 0.0,
    };

    let imre_score = intent_score * INTENT_WEIGHT
        + match_strength * MATCH_WEIGHT
        + NEUTRAL_RECENCY * RECENCY_WEIGHT
        + expansion_score * EXPANSION_WEIGHT;

    (imre_score * 100.0).round() / 100.0
}

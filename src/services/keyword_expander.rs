use itertools::Itertools;

/// Expand an industry/signal description into the query variants the
/// pipeline searches with. The raw inputs are kept alongside four templated
/// procurement-flavored variants; duplicates collapse by value equality.
pub fn expand_keywords(industry: &str, buying_signals: &str) -> Vec<String> {
    [
        industry.to_string(),
        buying_signals.to_string(),
        format!("{} procurement", industry),
        format!("{} RFP", industry),
        format!("{} supplier search", industry),
        format!("{} expansion news", industry),
    ]
    .into_iter()
    .unique()
    .collect()
}

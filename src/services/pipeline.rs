use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use serde::Serialize;

use crate::dal::lead_db::LeadStore;
use crate::domain::intent::IntentLevel;
use crate::domain::lead::{extract_domain, Lead, RawResult, SearchRequest};
use crate::services::{
    calculate_imre, deduplicate_leads, expand_keywords, IntentClassifier, PageFetcher,
    SearchProvider,
};

/// Bound on concurrently processed results within one keyword's batch. The
/// stage is pure I/O (fetch, embed, retrieve, insert) so a small pool hides
/// most of the latency.
const MAX_CONCURRENT_RESULTS: usize = 8;

#[derive(Debug, Default, Serialize)]
pub struct RunStats {
    pub total_keywords: usize,
    pub total_results_found: usize,
    pub new_leads_processed: usize,
    pub skipped_existing: usize,
    pub high_intent: usize,
    pub medium_intent: usize,
    pub low_intent: usize,
    pub no_intent: usize,
}

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub processing_time_seconds: f64,
    pub stats: RunStats,
    pub keywords_used: Vec<String>,
    pub leads: Vec<Lead>,
}

/// Drives one search request end to end: expand keywords, search each one,
/// scrape and classify the fresh results, then dedupe, rank, and filter the
/// accumulated leads. Collaborator failures stay scoped to the keyword or
/// result they hit; the run itself always completes with a report.
pub struct SearchPipeline {
    search: Arc<dyn SearchProvider>,
    fetcher: Arc<dyn PageFetcher>,
    classifier: IntentClassifier,
    store: Arc<dyn LeadStore>,
}

impl SearchPipeline {
    pub fn new(
        search: Arc<dyn SearchProvider>,
        fetcher: Arc<dyn PageFetcher>,
        classifier: IntentClassifier,
        store: Arc<dyn LeadStore>,
    ) -> Self {
        SearchPipeline {
            search,
            fetcher,
            classifier,
            store,
        }
    }

    pub async fn run(&self, request: &SearchRequest, min_intent: i32) -> RunReport {
        let started = Instant::now();

        let keywords = expand_keywords(&request.industry, &request.buying_signals);

        let mut stats = RunStats {
            total_keywords: keywords.len(),
            ..Default::default()
        };
        let mut all_leads: Vec<Lead> = vec![];

        for keyword in &keywords {
            let results = match self.search.search(keyword).await {
                Ok(results) => results,
                Err(e) => {
                    log::error!("Search failed for keyword {}: {:?}", keyword, e);
                    vec![]
                }
            };
            stats.total_results_found += results.len();

            // The known-lead check runs before any result is dispatched so
            // re-runs never re-scrape or re-classify persisted leads.
            let mut fresh = vec![];
            for result in results {
                match self.store.exists(&result.link).await {
                    Ok(true) => stats.skipped_existing += 1,
                    Ok(false) => fresh.push(result),
                    Err(e) => {
                        log::error!("Lead lookup failed for {}: {:?}", result.link, e);
                    }
                }
            }

            let processed: Vec<Option<Lead>> = stream::iter(fresh)
                .map(|result| self.process_result(result))
                .buffered(MAX_CONCURRENT_RESULTS)
                .collect()
                .await;

            for lead in processed.into_iter().flatten() {
                stats.new_leads_processed += 1;
                match lead.intent_analysis.intent_level {
                    IntentLevel::High => stats.high_intent += 1,
                    IntentLevel::Medium => stats.medium_intent += 1,
                    IntentLevel::Low => stats.low_intent += 1,
                    IntentLevel::No => stats.no_intent += 1,
                }
                all_leads.push(lead);
            }
        }

        let mut leads = deduplicate_leads(all_leads);
        // Stable sort keeps input order on ties; the min-intent filter runs
        // after it and so never reorders survivors.
        leads.sort_by(|a, b| b.imre_score.total_cmp(&a.imre_score));
        if min_intent > 0 {
            leads.retain(|lead| lead.intent_analysis.intent_score >= min_intent);
        }

        let processing_time_seconds = (started.elapsed().as_secs_f64() * 100.0).round() / 100.0;

        log::info!(
            "Search completed | Results: {} | New: {} | Skipped: {} | High: {} | Medium: {} | Low: {} | Time: {}s",
            stats.total_results_found,
            stats.new_leads_processed,
            stats.skipped_existing,
            stats.high_intent,
            stats.medium_intent,
            stats.low_intent,
            processing_time_seconds,
        );

        RunReport {
            processing_time_seconds,
            stats,
            keywords_used: keywords,
            leads,
        }
    }

    async fn process_result(&self, result: RawResult) -> Option<Lead> {
        let content = self.fetcher.fetch(&result.link).await;
        if content.is_empty() {
            return None;
        }

        let analysis = match self.classifier.classify(&content).await {
            Ok(analysis) => analysis,
            Err(e) => {
                log::error!(
                    "Intent classification unavailable for {}: {:?}",
                    result.link,
                    e
                );
                return None;
            }
        };

        let imre_score = calculate_imre(&analysis, &result.title, &result.snippet);
        let lead = Lead {
            domain: extract_domain(&result.link),
            title: result.title,
            link: result.link,
            snippet: result.snippet,
            intent_analysis: analysis,
            imre_score,
        };

        // Insert races on the same link are expected across concurrent
        // results; AlreadyExists is not an error.
        if let Err(e) = self.store.insert(&lead).await {
            log::error!("Failed to persist lead {}: {:?}", lead.link, e);
        }

        Some(lead)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};
    use std::sync::{Arc, Mutex};

    use anyhow::{anyhow, Result};

    use super::{SearchPipeline, SearchRequest};
    use crate::dal::lead_db::{InsertOutcome, LeadQuery, LeadStore};
    use crate::domain::intent::IntentExample;
    use crate::domain::lead::{Lead, RawResult, StoredLead};
    use crate::services::{
        EmbeddingModel, IntentClassifier, PageFetcher, SearchProvider, VectorIndex,
    };

    struct FakeSearch {
        results: HashMap<String, Vec<RawResult>>,
        failing: Vec<String>,
    }

    impl FakeSearch {
        fn with(keyword: &str, results: Vec<RawResult>) -> Self {
            FakeSearch {
                results: HashMap::from([(keyword.to_string(), results)]),
                failing: vec![],
            }
        }
    }

    #[async_trait::async_trait]
    impl SearchProvider for FakeSearch {
        async fn search(&self, query: &str) -> Result<Vec<RawResult>> {
            if self.failing.iter().any(|q| q == query) {
                return Err(anyhow!("search provider down"));
            }
            Ok(self.results.get(query).cloned().unwrap_or_default())
        }
    }

    struct FakePages {
        pages: HashMap<String, String>,
    }

    #[async_trait::async_trait]
    impl PageFetcher for FakePages {
        async fn fetch(&self, url: &str) -> String {
            self.pages.get(url).cloned().unwrap_or_default()
        }
    }

    // Encodes the leading integer of the page text into the embedding; the
    // index turns it into one full-similarity neighbor whose weight
    // reproduces that integer as the intent score.
    struct ScriptedEmbedder;

    #[async_trait::async_trait]
    impl EmbeddingModel for ScriptedEmbedder {
        async fn encode(&self, text: &str) -> Result<Vec<f32>> {
            let score: f32 = text
                .split_whitespace()
                .next()
                .unwrap_or("0")
                .parse()
                .unwrap_or(0.0);
            Ok(vec![score])
        }
    }

    struct ScriptedIndex;

    #[async_trait::async_trait]
    impl VectorIndex for ScriptedIndex {
        async fn nearest(&self, embedding: &[f32], _k: usize) -> Result<Vec<IntentExample>> {
            Ok(vec![IntentExample {
                bucket: "data1".to_string(),
                similarity: 1.0,
                intent_weight: embedding[0] as f64 / 100.0,
            }])
        }
    }

    #[derive(Default)]
    struct InMemoryLeads {
        links: Mutex<HashSet<String>>,
    }

    #[async_trait::async_trait]
    impl LeadStore for InMemoryLeads {
        async fn exists(&self, link: &str) -> Result<bool> {
            Ok(self.links.lock().unwrap().contains(link))
        }

        async fn insert(&self, lead: &Lead) -> Result<InsertOutcome> {
            match self.links.lock().unwrap().insert(lead.link.clone()) {
                true => Ok(InsertOutcome::Inserted),
                false => Ok(InsertOutcome::AlreadyExists),
            }
        }

        async fn query(&self, _filter: &LeadQuery) -> Result<Vec<StoredLead>> {
            Ok(vec![])
        }
    }

    fn pipeline(
        search: FakeSearch,
        pages: HashMap<String, String>,
        store: Arc<InMemoryLeads>,
    ) -> SearchPipeline {
        let classifier =
            IntentClassifier::new(Arc::new(ScriptedEmbedder), Arc::new(ScriptedIndex));
        SearchPipeline::new(
            Arc::new(search),
            Arc::new(FakePages { pages }),
            classifier,
            store,
        )
    }

    fn request(industry: &str, signals: &str) -> SearchRequest {
        SearchRequest {
            industry: industry.to_string(),
            location: None,
            buying_signals: signals.to_string(),
        }
    }

    fn hit(link: &str, title: &str) -> RawResult {
        RawResult {
            title: title.to_string(),
            link: link.to_string(),
            snippet: "plain snippet".to_string(),
        }
    }

    fn page(score: i32) -> String {
        format!("{} buyers are actively sourcing suppliers this quarter", score)
    }

    #[tokio::test]
    async fn run_aggregates_counts_and_ranks_leads() {
        let search = FakeSearch::with(
            "valves",
            vec![
                hit("https://a.example.com/1", "One"),
                hit("https://b.example.com/2", "Two"),
                hit("https://c.example.com/3", "Three"),
            ],
        );
        // Third result has no scrapeable content.
        let pages = HashMap::from([
            ("https://a.example.com/1".to_string(), page(90)),
            ("https://b.example.com/2".to_string(), page(40)),
        ]);

        let pipeline = pipeline(search, pages, Arc::new(InMemoryLeads::default()));
        let report = pipeline.run(&request("valves", "tender watch"), 0).await;

        assert_eq!(report.stats.total_keywords, 6);
        assert_eq!(report.stats.total_results_found, 3);
        assert_eq!(report.stats.new_leads_processed, 2);
        assert_eq!(report.stats.skipped_existing, 0);
        assert_eq!(report.stats.high_intent, 1);
        assert_eq!(report.stats.low_intent, 1);
        assert_eq!(report.keywords_used.len(), 6);

        // 90*0.6 + 100*0.2 + 50*0.1 = 79, then 40*0.6 + 20 + 5 = 49.
        assert_eq!(report.leads.len(), 2);
        assert_eq!(report.leads[0].link, "https://a.example.com/1");
        assert_eq!(report.leads[0].imre_score, 79.0);
        assert_eq!(report.leads[0].domain, "a.example.com");
        assert_eq!(report.leads[1].imre_score, 49.0);
    }

    #[tokio::test]
    async fn second_identical_run_skips_persisted_leads() {
        let store = Arc::new(InMemoryLeads::default());
        let pages = HashMap::from([
            ("https://a.example.com/1".to_string(), page(90)),
            ("https://b.example.com/2".to_string(), page(40)),
        ]);
        let results = vec![
            hit("https://a.example.com/1", "One"),
            hit("https://b.example.com/2", "Two"),
        ];

        let first = pipeline(
            FakeSearch::with("valves", results.clone()),
            pages.clone(),
            store.clone(),
        )
        .run(&request("valves", "tender watch"), 0)
        .await;

        let second = pipeline(FakeSearch::with("valves", results), pages, store)
            .run(&request("valves", "tender watch"), 0)
            .await;

        assert_eq!(second.stats.skipped_existing, first.stats.new_leads_processed);
        assert_eq!(second.stats.new_leads_processed, 0);
        assert!(second.leads.is_empty());
    }

    #[tokio::test]
    async fn filter_runs_after_sort_and_keeps_order() {
        let search = FakeSearch::with(
            "valves",
            vec![
                hit("https://low.example.com/1", "Low"),
                hit("https://top.example.com/2", "Top"),
                hit("https://mid.example.com/3", "Mid"),
            ],
        );
        let pages = HashMap::from([
            ("https://low.example.com/1".to_string(), page(8)),
            ("https://top.example.com/2".to_string(), page(90)),
            ("https://mid.example.com/3".to_string(), page(50)),
        ]);

        let pipeline = pipeline(search, pages, Arc::new(InMemoryLeads::default()));
        let report = pipeline.run(&request("valves", "tender watch"), 10).await;

        let links: Vec<&str> = report.leads.iter().map(|l| l.link.as_str()).collect();
        assert_eq!(
            links,
            vec!["https://top.example.com/2", "https://mid.example.com/3"]
        );
    }

    #[tokio::test]
    async fn duplicate_titles_across_keywords_collapse_after_counting() {
        let mut search = FakeSearch::with(
            "valves",
            vec![hit("https://a.example.com/1", "Same Headline")],
        );
        search.results.insert(
            "tender watch".to_string(),
            vec![hit("https://b.example.com/2", "same headline")],
        );
        let pages = HashMap::from([
            ("https://a.example.com/1".to_string(), page(70)),
            ("https://b.example.com/2".to_string(), page(70)),
        ]);

        let pipeline = pipeline(search, pages, Arc::new(InMemoryLeads::default()));
        let report = pipeline.run(&request("valves", "tender watch"), 0).await;

        // Both are processed and counted; the title collision drops the
        // later one from the ranked output.
        assert_eq!(report.stats.new_leads_processed, 2);
        assert_eq!(report.leads.len(), 1);
        assert_eq!(report.leads[0].link, "https://a.example.com/1");
    }

    #[tokio::test]
    async fn failing_keyword_does_not_abort_the_run() {
        let mut search = FakeSearch::with(
            "tender watch",
            vec![hit("https://a.example.com/1", "One")],
        );
        search.failing.push("valves".to_string());
        let pages = HashMap::from([("https://a.example.com/1".to_string(), page(70))]);

        let pipeline = pipeline(search, pages, Arc::new(InMemoryLeads::default()));
        let report = pipeline.run(&request("valves", "tender watch"), 0).await;

        assert_eq!(report.stats.total_results_found, 1);
        assert_eq!(report.stats.new_leads_processed, 1);
        assert_eq!(report.leads.len(), 1);
    }

    #[tokio::test]
    async fn unscrapeable_results_are_counted_but_not_classified() {
        let search = FakeSearch::with("valves", vec![hit("https://a.example.com/1", "One")]);

        let pipeline = pipeline(search, HashMap::new(), Arc::new(InMemoryLeads::default()));
        let report = pipeline.run(&request("valves", "tender watch"), 0).await;

        assert_eq!(report.stats.total_results_found, 1);
        assert_eq!(report.stats.new_leads_processed, 0);
        assert!(report.leads.is_empty());
    }
}

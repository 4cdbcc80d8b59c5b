use std::collections::HashSet;

use crate::domain::lead::Lead;

fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Collapse near-duplicate leads within one run, first occurrence wins and
/// input order is preserved. A lead is dropped when either its link or its
/// normalized title has been seen earlier — a title collision counts as a
/// duplicate even when the links differ, trading a little recall for fewer
/// duplicate-looking leads.
pub fn deduplicate_leads(leads: Vec<Lead>) -> Vec<Lead> {
    let mut seen_urls: HashSet<String> = HashSet::new();
    let mut seen_titles: HashSet<String> = HashSet::new();

    let mut unique_leads = Vec::with_capacity(leads.len());

    for lead in leads {
        let normalized_title = normalize_title(&lead.title);

        if seen_urls.contains(&lead.link) {
            continue;
        }
        if seen_titles.contains(&normalized_title) {
            continue;
        }

        seen_urls.insert(lead.link.clone());
        seen_titles.insert(normalized_title);
        unique_leads.push(lead);
    }

    unique_leads
}

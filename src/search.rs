use crate::sources::{PaperRecord, PaperSource};
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;

/// Fan one query out to every configured source in parallel, collect
/// whatever each managed to return, and deduplicate by normalized title.
///
/// A source that errors or panics contributes zero records; an empty
/// result is a valid outcome, indistinguishable from "nothing matched".
/// Overall latency is bounded by the slowest source, not the sum.
pub async fn federated_search(
    sources: &[Arc<dyn PaperSource>],
    query: &str,
    per_source_max: u32,
) -> Vec<PaperRecord> {
    if sources.is_empty() {
        return Vec::new();
    }

    let handles: Vec<_> = sources
        .iter()
        .map(|source| {
            let source = Arc::clone(source);
            let query = query.to_string();
            tokio::spawn(async move {
                let name = source.name().to_string();
                (name, source.search(&query, per_source_max).await)
            })
        })
        .collect();

    let mut all_results = Vec::new();
    for outcome in join_all(handles).await {
        match outcome {
            Ok((name, Ok(results))) => {
                tracing::info!("Retrieved {} papers from {}", results.len(), name);
                all_results.extend(results);
            }
            Ok((name, Err(e))) => tracing::warn!("Source {} failed: {}", name, e),
            Err(e) => tracing::warn!("Source task panicked: {}", e),
        }
    }

    dedup_by_title(all_results)
}

/// Keep the first occurrence of each normalized title, drop the rest.
/// Which source "wins" a cross-source duplicate is an artifact of the
/// collection order, deliberately so.
pub fn dedup_by_title(records: Vec<PaperRecord>) -> Vec<PaperRecord> {
    let mut seen: HashSet<String> = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(normalize_title(&record.title)))
        .collect()
}

/// Dedup key: lowercased, whitespace-trimmed and collapsed title.
fn normalize_title(title: &str) -> String {
    title
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub mod arxiv;
pub mod scholar;
pub mod semantic_scholar;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Placeholder used when a provider returns no abstract for a paper.
pub const NO_ABSTRACT: &str = "No abstract available";

/// One paper, normalized to a common shape regardless of which provider
/// it came from. Provider-native schemas never leak past their adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperRecord {
    pub title: String,
    pub authors: Vec<String>,
    pub abstract_text: String,
    pub url: String,
    pub publication_date: Option<String>,
    pub source: String,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("API error: {0}")]
    Api(String),
}

/// One external paper provider. Implementations translate their native
/// response shape into `PaperRecord`s, stamp their own source label on
/// every record, and drop items whose title is empty after trimming.
#[async_trait]
pub trait PaperSource: Send + Sync {
    fn name(&self) -> &str;

    /// Search the provider, returning up to `max_results` records in the
    /// provider's own relevance order. A single malformed item is skipped,
    /// not a reason to fail the whole fetch.
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<PaperRecord>, SourceError>;

    /// Release any long-lived session the adapter holds. Most adapters
    /// have nothing to do here.
    async fn close(&self) {}
}

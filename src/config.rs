use std::path::PathBuf;
use std::sync::Arc;

use crate::sources::{self, PaperSource};

pub const DEFAULT_MAX_RESULTS: u32 = 10;
pub const KNOWN_SOURCES: [&str; 3] = ["arxiv", "semantic_scholar", "scholar"];

/// Configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub semantic_scholar_api_key: Option<String>,
    pub export_dir: PathBuf,
    pub max_results: u32,
    pub enabled_source_names: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        let semantic_scholar_api_key = std::env::var("SEMANTIC_SCHOLAR_API_KEY").ok();
        let export_dir = std::env::var("RESEARCH_SCRAPER_EXPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("exports"));
        let max_results = std::env::var("RESEARCH_SCRAPER_MAX_RESULTS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_MAX_RESULTS);
        let enabled_source_names = std::env::var("RESEARCH_SCRAPER_SOURCES")
            .map(|s| parse_source_list(&s))
            .unwrap_or_default();

        Self {
            semantic_scholar_api_key,
            export_dir,
            max_results,
            enabled_source_names,
        }
    }

    /// Build the enabled source set. An empty filter enables everything;
    /// any subset, down to a single source, works without special-casing.
    pub fn build_sources(&self, override_filter: Option<&[String]>) -> Vec<Arc<dyn PaperSource>> {
        let filter: Vec<String> = override_filter
            .map(|f| f.iter().map(|s| s.trim().to_lowercase()).collect())
            .unwrap_or_else(|| self.enabled_source_names.clone());
        let filter_active = !filter.is_empty();
        let should_enable = |name: &str| !filter_active || filter.iter().any(|f| f == name);

        let mut enabled: Vec<Arc<dyn PaperSource>> = Vec::new();
        if should_enable("arxiv") {
            enabled.push(Arc::new(sources::arxiv::ArxivClient::new()));
        }
        if should_enable("semantic_scholar") {
            enabled.push(Arc::new(sources::semantic_scholar::SemanticScholarClient::new(
                self.semantic_scholar_api_key.clone(),
            )));
        }
        if should_enable("scholar") {
            enabled.push(Arc::new(sources::scholar::ScholarClient::new()));
        }
        enabled
    }

    /// Status descriptions for each known source.
    pub fn source_status(&self) -> Vec<SourceStatus> {
        let mut statuses = vec![
            SourceStatus {
                name: "arxiv".into(),
                enabled: true,
                note: "No API key required".into(),
            },
            SourceStatus {
                name: "semantic_scholar".into(),
                enabled: true,
                note: if self.semantic_scholar_api_key.is_some() {
                    "API key set".into()
                } else {
                    "No API key (rate limited)".into()
                },
            },
            SourceStatus {
                name: "scholar".into(),
                enabled: true,
                note: "HTML scraping, may be throttled".into(),
            },
        ];

        if !self.enabled_source_names.is_empty() {
            for s in &mut statuses {
                if !self.enabled_source_names.contains(&s.name) {
                    s.enabled = false;
                    s.note = "Disabled by RESEARCH_SCRAPER_SOURCES filter".into();
                }
            }
        }

        statuses
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct SourceStatus {
    pub name: String,
    pub enabled: bool,
    pub note: String,
}

pub fn parse_source_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

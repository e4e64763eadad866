use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::search::federated_search;
use crate::sources::{PaperRecord, PaperSource};
use crate::table::PaperTable;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no papers to export")]
    Empty,
    #[error("failed to write export file: {0}")]
    Io(#[from] std::io::Error),
}

/// Holds the most recent aggregation result and serves derived views over
/// it. A new search replaces the held list wholesale.
pub struct PaperCatalog {
    sources: Vec<Arc<dyn PaperSource>>,
    export_dir: PathBuf,
    per_source_max: u32,
    papers: Vec<PaperRecord>,
}

impl PaperCatalog {
    pub fn new(
        sources: Vec<Arc<dyn PaperSource>>,
        export_dir: PathBuf,
        per_source_max: u32,
    ) -> Self {
        Self {
            sources,
            export_dir,
            per_source_max,
            papers: Vec::new(),
        }
    }

    /// Run the federated search and replace the held result with whatever
    /// it produced, including nothing.
    pub async fn search(&mut self, query: &str) -> &[PaperRecord] {
        tracing::info!("Searching for papers with query: {}", query);
        self.papers = federated_search(&self.sources, query, self.per_source_max).await;
        tracing::info!("Total unique papers found: {}", self.papers.len());
        &self.papers
    }

    pub fn papers(&self) -> &[PaperRecord] {
        &self.papers
    }

    /// Case-insensitive substring match of any keyword against title or
    /// abstract, preserving the held order.
    pub fn filter(&self, keywords: &[String]) -> Vec<&PaperRecord> {
        self.papers
            .iter()
            .filter(|paper| {
                let title = paper.title.to_lowercase();
                let abstract_text = paper.abstract_text.to_lowercase();
                keywords.iter().any(|kw| {
                    let kw = kw.to_lowercase();
                    title.contains(&kw) || abstract_text.contains(&kw)
                })
            })
            .collect()
    }

    /// Project the held records and write them as CSV. With no explicit
    /// path, a timestamped file inside the export directory is used and
    /// the directory is created on demand. Nothing is written when no
    /// papers are held.
    pub fn export_csv(&self, path: Option<&Path>) -> Result<PathBuf, ExportError> {
        if self.papers.is_empty() {
            return Err(ExportError::Empty);
        }

        let target = match path {
            Some(p) => p.to_path_buf(),
            None => {
                std::fs::create_dir_all(&self.export_dir)?;
                let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
                self.export_dir.join(format!("research_papers_{}.csv", stamp))
            }
        };

        let table = PaperTable::project(&self.papers);
        std::fs::write(&target, table.to_csv())?;
        tracing::info!("Exported {} papers to {}", self.papers.len(), target.display());
        Ok(target)
    }

    /// Human-readable digest of up to `limit` held papers.
    pub fn summary(&self, limit: usize) -> String {
        if self.papers.is_empty() {
            return "No papers to summarize.".to_string();
        }
        let mut out = String::from("Research Paper Summary:\n\n");
        for paper in self.papers.iter().take(limit) {
            out.push_str(&format!("Title: {}\n", paper.title));
            out.push_str(&format!("Authors: {}\n", paper.authors.join(", ")));
            out.push_str(&format!("Source: {}\n", paper.source));
            out.push_str(&format!("Web Link: {}\n", paper.url));
            let snippet: String = paper.abstract_text.chars().take(200).collect();
            let ellipsis = if paper.abstract_text.chars().count() > 200 {
                "..."
            } else {
                ""
            };
            out.push_str(&format!("Abstract: {}{}\n\n", snippet, ellipsis));
        }
        out
    }

    /// Release every source's resources.
    pub async fn close(&self) {
        for source in &self.sources {
            source.close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::SourceError;
    use async_trait::async_trait;

    fn record(title: &str, abstract_text: &str) -> PaperRecord {
        PaperRecord {
            title: title.to_string(),
            authors: vec!["A. Author".to_string()],
            abstract_text: abstract_text.to_string(),
            url: "https://example.org".to_string(),
            publication_date: Some("2024".to_string()),
            source: "arXiv".to_string(),
        }
    }

    struct StubSource(Vec<PaperRecord>);

    #[async_trait]
    impl PaperSource for StubSource {
        fn name(&self) -> &str {
            "stub"
        }

        async fn search(
            &self,
            _query: &str,
            _max_results: u32,
        ) -> Result<Vec<PaperRecord>, SourceError> {
            Ok(self.0.clone())
        }
    }

    fn catalog_with(papers: Vec<PaperRecord>, export_dir: PathBuf) -> PaperCatalog {
        let mut catalog = PaperCatalog::new(Vec::new(), export_dir, 10);
        catalog.papers = papers;
        catalog
    }

    #[tokio::test]
    async fn search_replaces_held_result_wholesale() {
        let sources: Vec<Arc<dyn PaperSource>> =
            vec![Arc::new(StubSource(vec![record("First Batch", "x")]))];
        let mut catalog = PaperCatalog::new(sources, PathBuf::from("exports"), 10);
        assert_eq!(catalog.search("q").await.len(), 1);
        assert_eq!(catalog.papers()[0].title, "First Batch");

        let empty: Vec<Arc<dyn PaperSource>> = vec![Arc::new(StubSource(vec![]))];
        catalog.sources = empty;
        assert!(catalog.search("q").await.is_empty());
        assert!(catalog.papers().is_empty());
    }

    #[test]
    fn filter_matches_title_or_abstract_case_insensitively() {
        let catalog = catalog_with(
            vec![
                record("Graph Neural Networks", "message passing"),
                record("Transformers", "attention is discussed in the ABSTRACT"),
                record("Unrelated", "nothing here"),
            ],
            PathBuf::from("exports"),
        );
        let hits = catalog.filter(&["GRAPH".to_string(), "attention".to_string()]);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "Graph Neural Networks");
        assert_eq!(hits[1].title, "Transformers");
    }

    #[test]
    fn filter_on_empty_catalog_is_empty() {
        let catalog = catalog_with(Vec::new(), PathBuf::from("exports"));
        assert!(catalog.filter(&["anything".to_string()]).is_empty());
    }

    #[test]
    fn export_with_nothing_held_fails_and_creates_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = catalog_with(Vec::new(), dir.path().to_path_buf());
        let err = catalog.export_csv(None).unwrap_err();
        assert!(matches!(err, ExportError::Empty));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn export_writes_csv_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = catalog_with(
            vec![record("Exported Paper", "abs")],
            dir.path().to_path_buf(),
        );
        let path = catalog.export_csv(None).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("title,authors,abstract,url,source,publication_date\n"));
        assert!(contents.contains("Exported Paper"));
    }

    #[test]
    fn export_to_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("papers.csv");
        let catalog = catalog_with(vec![record("P", "a")], PathBuf::from("unused"));
        let path = catalog.export_csv(Some(&target)).unwrap();
        assert_eq!(path, target);
        assert!(target.exists());
    }

    #[test]
    fn export_to_unwritable_path_is_io_error() {
        let catalog = catalog_with(vec![record("P", "a")], PathBuf::from("unused"));
        let err = catalog
            .export_csv(Some(Path::new("/nonexistent-dir/papers.csv")))
            .unwrap_err();
        assert!(matches!(err, ExportError::Io(_)));
    }

    #[test]
    fn summary_lists_papers_or_says_none() {
        let empty = catalog_with(Vec::new(), PathBuf::from("exports"));
        assert_eq!(empty.summary(10), "No papers to summarize.");

        let catalog = catalog_with(
            vec![record("Summarized", &"long ".repeat(100))],
            PathBuf::from("exports"),
        );
        let summary = catalog.summary(10);
        assert!(summary.contains("Title: Summarized"));
        assert!(summary.contains("..."));
    }
}

use super::{PaperRecord, PaperSource, SourceError, NO_ABSTRACT};
use async_trait::async_trait;
use serde::Deserialize;

const BASE_URL: &str = "https://api.semanticscholar.org/graph/v1";
const FIELDS: &str = "title,authors,abstract,url,year";
const SOURCE_LABEL: &str = "Semantic Scholar";

pub struct SemanticScholarClient {
    client: reqwest::Client,
    api_key: Option<String>,
}

impl SemanticScholarClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("research-scraper/0.1")
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .unwrap(),
            api_key,
        }
    }

    fn add_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => req.header("x-api-key", key),
            None => req,
        }
    }
}

#[derive(Deserialize)]
struct S2SearchResponse {
    data: Option<Vec<S2Paper>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct S2Paper {
    paper_id: Option<String>,
    title: Option<String>,
    authors: Option<Vec<S2Author>>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    year: Option<u32>,
    url: Option<String>,
}

#[derive(Deserialize)]
struct S2Author {
    name: Option<String>,
}

fn s2_to_record(p: &S2Paper) -> Option<PaperRecord> {
    let title = p.title.as_deref().unwrap_or("").trim().to_string();
    if title.is_empty() {
        return None;
    }
    let url = p
        .url
        .clone()
        .filter(|u| !u.is_empty())
        .or_else(|| {
            p.paper_id
                .as_ref()
                .map(|id| format!("https://www.semanticscholar.org/paper/{}", id))
        })
        .unwrap_or_default();
    Some(PaperRecord {
        title,
        authors: p
            .authors
            .as_ref()
            .map(|a| a.iter().filter_map(|a| a.name.clone()).collect())
            .unwrap_or_default(),
        abstract_text: p
            .abstract_text
            .clone()
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| NO_ABSTRACT.to_string()),
        url,
        publication_date: p.year.map(|y| y.to_string()),
        source: SOURCE_LABEL.to_string(),
    })
}

fn parse_search_response(body: &str) -> Result<Vec<PaperRecord>, SourceError> {
    let resp: S2SearchResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::Parse(format!("Semantic Scholar response: {}", e)))?;
    Ok(resp
        .data
        .unwrap_or_default()
        .iter()
        .filter_map(s2_to_record)
        .collect())
}

#[async_trait]
impl PaperSource for SemanticScholarClient {
    fn name(&self) -> &str {
        "semantic_scholar"
    }

    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<PaperRecord>, SourceError> {
        let url = format!("{}/paper/search", BASE_URL);
        let limit = max_results.min(100).to_string();
        let resp = self
            .add_auth(self.client.get(&url).query(&[
                ("query", query),
                ("limit", limit.as_str()),
                ("fields", FIELDS),
            ]))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(SourceError::Api(format!(
                "Semantic Scholar returned {}",
                resp.status()
            )));
        }
        let body = resp.text().await?;
        let mut papers = parse_search_response(&body)?;
        papers.truncate(max_results as usize);
        Ok(papers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "total": 3,
        "data": [
            {
                "paperId": "abc123",
                "title": "Emergent Tool Use in Multi-Agent Games",
                "abstract": "Agents discover tool use.",
                "year": 2020,
                "url": "https://www.semanticscholar.org/paper/abc123",
                "authors": [{"authorId": "1", "name": "A. Author"}, {"authorId": "2", "name": "B. Author"}]
            },
            {
                "paperId": "def456",
                "title": "Paper Without Abstract",
                "abstract": null,
                "year": null,
                "url": null,
                "authors": []
            },
            {
                "paperId": "ghi789",
                "title": "   ",
                "abstract": "Whitespace title is dropped.",
                "year": 2021,
                "url": null,
                "authors": []
            }
        ]
    }"#;

    #[test]
    fn normalizes_papers_and_drops_untitled() {
        let papers = parse_search_response(SAMPLE).unwrap();
        assert_eq!(papers.len(), 2);

        let first = &papers[0];
        assert_eq!(first.title, "Emergent Tool Use in Multi-Agent Games");
        assert_eq!(first.authors.len(), 2);
        assert_eq!(first.publication_date.as_deref(), Some("2020"));
        assert_eq!(first.source, "Semantic Scholar");

        let second = &papers[1];
        assert_eq!(second.abstract_text, NO_ABSTRACT);
        assert_eq!(second.url, "https://www.semanticscholar.org/paper/def456");
        assert!(second.publication_date.is_none());
    }

    #[test]
    fn missing_data_field_is_empty_not_error() {
        let papers = parse_search_response(r#"{"total": 0}"#).unwrap();
        assert!(papers.is_empty());
    }

    #[test]
    fn garbage_body_is_a_parse_error() {
        let err = parse_search_response("not json").unwrap_err();
        assert!(matches!(err, SourceError::Parse(_)));
    }
}

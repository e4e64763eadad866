use super::{PaperRecord, PaperSource, SourceError, NO_ABSTRACT};
use async_trait::async_trait;
use scraper::{Html, Selector};

const BASE_URL: &str = "https://scholar.google.com/scholar";
const SOURCE_LABEL: &str = "Google Scholar";

/// Scholar has no public API; results come from scraping the rendered
/// results page. This is the one adapter that owns a long-lived scraping
/// session, and the one most likely to be left out of the configured set.
pub struct ScholarClient {
    client: reqwest::Client,
}

impl ScholarClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(
                    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
                     Chrome/120.0 Safari/537.36",
                )
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .unwrap(),
        }
    }
}

impl Default for ScholarClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaperSource for ScholarClient {
    fn name(&self) -> &str {
        "scholar"
    }

    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<PaperRecord>, SourceError> {
        let html = self
            .client
            .get(BASE_URL)
            .query(&[("q", query), ("hl", "en")])
            .send()
            .await?
            .text()
            .await?;
        parse_scholar_html(&html, max_results)
    }

    async fn close(&self) {
        tracing::debug!("Closing Google Scholar session");
    }
}

fn parse_scholar_html(html: &str, max_results: u32) -> Result<Vec<PaperRecord>, SourceError> {
    let document = Html::parse_document(html);
    let result_sel = sel(".gs_ri")?;
    let title_sel = sel(".gs_rt a")?;
    let byline_sel = sel(".gs_a")?;
    let snippet_sel = sel(".gs_rs")?;

    let mut papers = Vec::new();
    for result in document.select(&result_sel) {
        if papers.len() >= max_results as usize {
            break;
        }
        // Blocks without a linked title are citations-only stubs; skip them.
        let Some(title_el) = result.select(&title_sel).next() else {
            continue;
        };
        let title = collapse_ws(&title_el.text().collect::<String>());
        if title.is_empty() {
            continue;
        }
        let url = title_el.value().attr("href").unwrap_or("").to_string();

        let byline = result
            .select(&byline_sel)
            .next()
            .map(|el| collapse_ws(&el.text().collect::<String>()))
            .unwrap_or_default();
        let (authors, year) = parse_byline(&byline);

        let abstract_text = result
            .select(&snippet_sel)
            .next()
            .map(|el| collapse_ws(&el.text().collect::<String>()))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| NO_ABSTRACT.to_string());

        papers.push(PaperRecord {
            title,
            authors,
            abstract_text,
            url,
            publication_date: year,
            source: SOURCE_LABEL.to_string(),
        });
    }
    Ok(papers)
}

fn sel(css: &str) -> Result<Selector, SourceError> {
    Selector::parse(css).map_err(|e| SourceError::Parse(format!("bad selector: {:?}", e)))
}

/// The `.gs_a` byline looks like "A Author, B Author - Journal, 2020 -
/// publisher.com". Authors are the segment before the first dash; the year
/// is the first 4-digit token after it.
fn parse_byline(byline: &str) -> (Vec<String>, Option<String>) {
    if byline.is_empty() {
        return (Vec::new(), None);
    }
    let mut segments = byline.split(" - ");
    let authors = segments
        .next()
        .unwrap_or("")
        .split(',')
        .map(|a| a.trim().trim_end_matches('…').trim().to_string())
        .filter(|a| !a.is_empty())
        .collect();
    let year = segments
        .next()
        .and_then(|rest| {
            rest.split(|c: char| !c.is_ascii_digit())
                .find(|tok| tok.len() == 4)
        })
        .map(|y| y.to_string());
    (authors, year)
}

fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

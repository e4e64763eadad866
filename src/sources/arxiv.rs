use super::{PaperRecord, PaperSource, SourceError, NO_ABSTRACT};
use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;

const BASE_URL: &str = "https://export.arxiv.org/api/query";
const SOURCE_LABEL: &str = "arXiv";

pub struct ArxivClient {
    client: reqwest::Client,
}

impl ArxivClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("research-scraper/0.1")
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .unwrap(),
        }
    }
}

impl Default for ArxivClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaperSource for ArxivClient {
    fn name(&self) -> &str {
        "arxiv"
    }

    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<PaperRecord>, SourceError> {
        let url = format!(
            "{}?search_query=all:{}&start=0&max_results={}&sortBy=relevance&sortOrder=descending",
            BASE_URL,
            urlencoded(query),
            max_results
        );
        let resp = self.client.get(&url).send().await?.text().await?;
        // Respect rate limit: 1 req / 3s
        tokio::time::sleep(std::time::Duration::from_secs(3)).await;
        let mut papers = parse_atom_feed(&resp)?;
        papers.truncate(max_results as usize);
        Ok(papers)
    }
}

fn urlencoded(s: &str) -> String {
    s.replace(' ', "+").replace(':', "%3A").replace('/', "%2F")
}

fn parse_atom_feed(xml: &str) -> Result<Vec<PaperRecord>, SourceError> {
    let mut reader = Reader::from_str(xml);
    let mut papers = Vec::new();
    let mut in_entry = false;
    let mut current_tag = String::new();
    let mut title = String::new();
    let mut summary = String::new();
    let mut authors: Vec<String> = Vec::new();
    let mut published = String::new();
    let mut link_pdf = String::new();
    let mut link_abs = String::new();
    let mut author_name = String::new();
    let mut in_author = false;
    let mut buf = Vec::new();

    let capture_link = |e: &quick_xml::events::BytesStart,
                        link_pdf: &mut String,
                        link_abs: &mut String| {
        let mut href = String::new();
        let mut title_attr = String::new();
        for attr in e.attributes().flatten() {
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
            let val = String::from_utf8_lossy(&attr.value).to_string();
            if key == "href" {
                href = val;
            } else if key == "title" {
                title_attr = val;
            }
        }
        if title_attr == "pdf" {
            *link_pdf = href;
        } else if link_abs.is_empty() && href.contains("abs") {
            *link_abs = href;
        }
    };

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if tag == "entry" {
                    in_entry = true;
                    title.clear();
                    summary.clear();
                    authors.clear();
                    published.clear();
                    link_pdf.clear();
                    link_abs.clear();
                } else if in_entry {
                    current_tag = tag.clone();
                    if tag == "author" {
                        in_author = true;
                        author_name.clear();
                    }
                    if tag == "link" {
                        capture_link(&e, &mut link_pdf, &mut link_abs);
                    }
                }
            }
            Ok(Event::Empty(e)) if in_entry => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if tag == "link" {
                    capture_link(&e, &mut link_pdf, &mut link_abs);
                }
            }
            Ok(Event::Text(e)) if in_entry => {
                let text = e.unescape().unwrap_or_default().to_string();
                match current_tag.as_str() {
                    "title" => title.push_str(&text),
                    "summary" => summary.push_str(&text),
                    "published" => published.push_str(&text),
                    "name" if in_author => author_name.push_str(&text),
                    _ => {}
                }
            }
            Ok(Event::End(e)) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if tag == "entry" && in_entry {
                    in_entry = false;
                    // Entries without a title never reach the merge step.
                    if !title.trim().is_empty() {
                        let abstract_text = if summary.trim().is_empty() {
                            NO_ABSTRACT.to_string()
                        } else {
                            summary.trim().replace('\n', " ")
                        };
                        papers.push(PaperRecord {
                            title: title.trim().replace('\n', " "),
                            authors: authors.clone(),
                            abstract_text,
                            url: if link_pdf.is_empty() {
                                link_abs.clone()
                            } else {
                                link_pdf.clone()
                            },
                            publication_date: if published.trim().is_empty() {
                                None
                            } else {
                                Some(published.trim().to_string())
                            },
                            source: SOURCE_LABEL.to_string(),
                        });
                    }
                } else if tag == "author" && in_author {
                    in_author = false;
                    if !author_name.trim().is_empty() {
                        authors.push(author_name.trim().to_string());
                    }
                }
                if tag == current_tag {
                    current_tag.clear();
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(SourceError::Parse(format!("XML parse error: {}", e))),
            _ => {}
        }
        buf.clear();
    }
    Ok(papers)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_ATOM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <id>http://arxiv.org/abs/2301.12345v1</id>
    <title>Cooperative Multi-Agent
 Reinforcement Learning</title>
    <summary>A survey of cooperation in multi-agent RL.</summary>
    <published>2023-01-15T00:00:00Z</published>
    <author><name>John Doe</name></author>
    <author><name>Jane Smith</name></author>
    <link href="http://arxiv.org/abs/2301.12345v1" rel="alternate" type="text/html"/>
    <link href="http://arxiv.org/pdf/2301.12345v1" title="pdf" type="application/pdf"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/2302.00001v1</id>
    <title></title>
    <summary>Entry with no title gets dropped.</summary>
  </entry>
</feed>"#;

    #[test]
    fn parses_entries_and_drops_untitled() {
        let papers = parse_atom_feed(SAMPLE_ATOM).unwrap();
        assert_eq!(papers.len(), 1);
        let p = &papers[0];
        assert_eq!(p.title, "Cooperative Multi-Agent  Reinforcement Learning");
        assert_eq!(p.authors, vec!["John Doe", "Jane Smith"]);
        assert_eq!(p.url, "http://arxiv.org/pdf/2301.12345v1");
        assert_eq!(p.publication_date.as_deref(), Some("2023-01-15T00:00:00Z"));
        assert_eq!(p.source, "arXiv");
    }

    #[test]
    fn missing_summary_gets_placeholder() {
        let xml = r#"<feed><entry><title>Bare Entry</title></entry></feed>"#;
        let papers = parse_atom_feed(xml).unwrap();
        assert_eq!(papers.len(), 1);
        assert_eq!(papers[0].abstract_text, NO_ABSTRACT);
        assert!(papers[0].url.is_empty());
        assert!(papers[0].publication_date.is_none());
    }

    #[test]
    fn malformed_xml_is_a_parse_error() {
        let err = parse_atom_feed("<feed><entry></feed>").unwrap_err();
        assert!(matches!(err, SourceError::Parse(_)));
    }
}

use crate::sources::PaperRecord;

/// Column order for the row projection and the CSV header.
pub const COLUMNS: [&str; 6] = [
    "title",
    "authors",
    "abstract",
    "url",
    "source",
    "publication_date",
];

/// Row-oriented view of a record list: one row per paper, authors joined
/// into a single display string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperTable {
    pub rows: Vec<[String; 6]>,
}

impl PaperTable {
    /// Pure projection; the same record list always yields the same table,
    /// and an empty list yields an empty table.
    pub fn project(records: &[PaperRecord]) -> Self {
        let rows = records
            .iter()
            .map(|r| {
                [
                    r.title.clone(),
                    r.authors.join(", "),
                    r.abstract_text.clone(),
                    r.url.clone(),
                    r.source.clone(),
                    r.publication_date.clone().unwrap_or_default(),
                ]
            })
            .collect();
        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Serialize as CSV with a header row. Fields containing the delimiter,
    /// quotes, or newlines are quoted with embedded quotes doubled.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        out.push_str(&COLUMNS.join(","));
        out.push('\n');
        for row in &self.rows {
            let line: Vec<String> = row.iter().map(|field| csv_escape(field)).collect();
            out.push_str(&line.join(","));
            out.push('\n');
        }
        out
    }

    /// Compact plain-text rendering for terminal output.
    pub fn render(&self, max_rows: usize) -> String {
        if self.rows.is_empty() {
            return "No papers found.".to_string();
        }
        let mut out = String::new();
        for (i, row) in self.rows.iter().take(max_rows).enumerate() {
            let [title, authors, _, url, source, date] = row;
            out.push_str(&format!("{:>3}. {} [{}]\n", i + 1, title, source));
            if !authors.is_empty() {
                out.push_str(&format!("     {}\n", authors));
            }
            if !date.is_empty() {
                out.push_str(&format!("     {}\n", date));
            }
            if !url.is_empty() {
                out.push_str(&format!("     {}\n", url));
            }
        }
        if self.rows.len() > max_rows {
            out.push_str(&format!("     ... and {} more\n", self.rows.len() - max_rows));
        }
        out
    }
}

fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

//! Tabular types that flow through one ingestion run
//!
//! [`RawTable`] is the fetched wide table, [`MeltedRow`] the reshaper output
//! (still text), and [`LongRecord`] the classified, normalized row handed to
//! the upserter. None of them outlive a run.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Static description of one published source file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceDescriptor {
    /// Path relative to the configured base URL, e.g. `download/Producao.csv`
    pub path: &'static str,
    /// Field separator (`b';'` or `b'\t'`)
    pub separator: u8,
    /// Category implied by the file itself, for file-identity domains
    pub category: Option<&'static str>,
}

impl SourceDescriptor {
    pub const fn new(path: &'static str, separator: u8) -> Self {
        Self {
            path,
            separator,
            category: None,
        }
    }

    pub const fn with_category(mut self, category: &'static str) -> Self {
        self.category = Some(category);
        self
    }

    /// Final path segment, used as the local cache key
    pub fn basename(&self) -> &'static str {
        self.path.rsplit('/').next().unwrap_or(self.path)
    }
}

/// A fetched table: named columns, rows of optional cells
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub path: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    /// Build a table, cleaning headers and cells.
    ///
    /// Headers are trimmed (a leading BOM is dropped) and repeated names get
    /// `.1`, `.2`, ... suffixes in order of appearance. Cells that are empty
    /// after trimming become `None`; short rows are padded.
    pub fn new(path: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let headers = dedup_headers(headers);
        let width = headers.len();

        let rows = rows
            .into_iter()
            .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
            .map(|row| {
                let mut cells: Vec<Option<String>> = row
                    .into_iter()
                    .take(width)
                    .map(|cell| {
                        let trimmed = cell.trim();
                        if trimmed.is_empty() {
                            None
                        } else {
                            Some(trimmed.to_string())
                        }
                    })
                    .collect();
                cells.resize(width, None);
                cells
            })
            .collect();

        Self {
            path: path.into(),
            headers,
            rows,
        }
    }

    /// Parse delimited text; the first record is the header row
    pub fn from_delimited(path: impl Into<String>, text: &str, separator: u8) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(separator)
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut records = reader.records();
        let headers = match records.next() {
            Some(record) => record?.iter().map(str::to_string).collect(),
            None => Vec::new(),
        };

        let mut rows = Vec::new();
        for record in records {
            rows.push(record?.iter().map(str::to_string).collect());
        }

        Ok(Self::new(path, headers, rows))
    }

    /// Case-insensitive column lookup
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = name.to_lowercase();
        self.headers.iter().position(|h| h.to_lowercase() == wanted)
    }

    /// First column matching any of `names`
    pub fn find_column(&self, names: &[&str]) -> Option<usize> {
        names.iter().find_map(|name| self.column_index(name))
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn dedup_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();

    headers
        .into_iter()
        .map(|raw| {
            let name = raw.trim_start_matches('\u{feff}').trim().to_string();
            let count = seen.entry(name.clone()).or_insert(0);
            let unique = if *count == 0 {
                name
            } else {
                format!("{}.{}", name, count)
            };
            *count += 1;
            unique
        })
        .collect()
}

/// Reshaper output: one entity at one year, cells still textual
#[derive(Debug, Clone, PartialEq)]
pub struct MeltedRow {
    pub entity: Option<String>,
    pub marker: Option<String>,
    pub year_label: String,
    pub quantity: Option<String>,
    /// Paired metric; `Some` only for layouts that carry one
    pub secondary: Option<String>,
}

impl MeltedRow {
    pub fn year(&self) -> Option<i32> {
        self.year_label.trim().parse().ok()
    }

    /// Compact rendering for log lines
    pub fn describe(&self) -> String {
        format!(
            "entity={:?} marker={:?} year={} quantity={:?} secondary={:?}",
            self.entity, self.marker, self.year_label, self.quantity, self.secondary
        )
    }
}

/// A classified, normalized long-format row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongRecord {
    pub year: i32,
    pub entity_key: String,
    pub quantity: f64,
    pub secondary_value: Option<f64>,
    pub category: String,
    pub subcategory: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_are_cleaned_and_deduplicated() {
        let table = RawTable::new(
            "x.csv",
            vec![
                "\u{feff}País".to_string(),
                " 2020 ".to_string(),
                "2020".to_string(),
                "2021".to_string(),
                "2021".to_string(),
                "2021".to_string(),
            ],
            vec![],
        );
        assert_eq!(
            table.headers,
            vec!["País", "2020", "2020.1", "2021", "2021.1", "2021.2"]
        );
        assert_eq!(table.column_index("país"), Some(0));
        assert_eq!(table.find_column(&["pais", "País"]), Some(0));
    }

    #[test]
    fn test_cells_are_trimmed_and_padded() {
        let table = RawTable::new(
            "x.csv",
            vec!["produto".into(), "2020".into(), "2021".into()],
            vec![vec!["  Tinto ".into(), "  ".into()], vec!["".into(), "".into()]],
        );
        // blank rows are skipped entirely
        assert_eq!(table.row_count(), 1);
        assert_eq!(
            table.rows[0],
            vec![Some("Tinto".to_string()), None, None]
        );
    }

    #[test]
    fn test_from_delimited_parses_flexible_rows() {
        let text = "produto;control;2020;2021\nVinho;vm_x;10;20\nSuco;su_y;5\n";
        let table = RawTable::from_delimited("p.csv", text, b';').unwrap();
        assert_eq!(table.headers.len(), 4);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[1][3], None);
    }

    #[test]
    fn test_basename() {
        let source = SourceDescriptor::new("download/Producao.csv", b';');
        assert_eq!(source.basename(), "Producao.csv");
        assert_eq!(source.category, None);
        assert_eq!(source.with_category("suco").category, Some("suco"));
    }
}

//! Wide-to-long reshaping
//!
//! The published tables have one row per entity and one column per year.
//! Some carry a second metric per year in a repeated year column, which the
//! table loader has already renamed to `YYYY.1`.

use crate::error::{IngestError, Result};
use crate::table::{MeltedRow, RawTable};

/// Which columns identify a row and whether a paired metric is present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableLayout {
    /// Accepted names for the entity column, tried in order
    pub entity_column: &'static [&'static str],
    /// Marker (control code) column, if the domain has one
    pub marker_column: Option<&'static str>,
    /// Whether `YYYY.1` columns carry a secondary metric
    pub paired_metric: bool,
}

/// Unpivot `table` into one [`MeltedRow`] per row per year column.
///
/// Output is year-major: every row for the first year column, then every row
/// for the next. Nothing is dropped here; a table with R rows and Y year
/// columns always yields R×Y rows.
pub fn melt(table: &RawTable, layout: &TableLayout) -> Result<Vec<MeltedRow>> {
    let entity_idx = table.find_column(layout.entity_column).ok_or_else(|| {
        IngestError::Validation(format!(
            "{}: missing entity column (expected one of {:?})",
            table.path, layout.entity_column
        ))
    })?;

    let marker_idx = match layout.marker_column {
        Some(name) => Some(table.column_index(name).ok_or_else(|| {
            IngestError::Validation(format!("{}: missing marker column '{}'", table.path, name))
        })?),
        None => None,
    };

    let years = year_columns(table, layout.paired_metric);
    let mut melted = Vec::with_capacity(table.row_count() * years.len());

    for year in &years {
        for row in &table.rows {
            let secondary = if layout.paired_metric {
                let value = year
                    .companion
                    .and_then(|idx| cell(row, idx))
                    .unwrap_or_else(|| "0".to_string());
                Some(value)
            } else {
                None
            };

            melted.push(MeltedRow {
                entity: cell(row, entity_idx),
                marker: marker_idx.and_then(|idx| cell(row, idx)),
                year_label: year.label.clone(),
                quantity: cell(row, year.index),
                secondary,
            });
        }
    }

    Ok(melted)
}

/// Rows shorter than the header read as absent cells
fn cell(row: &[Option<String>], idx: usize) -> Option<String> {
    row.get(idx).cloned().flatten()
}

#[derive(Debug)]
struct YearColumn {
    label: String,
    index: usize,
    companion: Option<usize>,
}

fn year_columns(table: &RawTable, paired: bool) -> Vec<YearColumn> {
    table
        .headers
        .iter()
        .enumerate()
        .filter(|(_, name)| is_year_label(name))
        .map(|(index, name)| YearColumn {
            label: name.clone(),
            index,
            companion: if paired {
                table.column_index(&format!("{}.1", name))
            } else {
                None
            },
        })
        .collect()
}

fn is_year_label(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit())
}

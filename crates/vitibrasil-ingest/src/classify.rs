//! Category and subcategory assignment
//!
//! Each domain plugs one [`Classify`] strategy into its pipeline. Returning
//! `None` drops the row.

use crate::table::SourceDescriptor;

/// Category tags for one row; the subcategory is never an empty string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub category: &'static str,
    pub subcategory: Option<&'static str>,
}

impl Classification {
    pub const fn category(category: &'static str) -> Self {
        Self {
            category,
            subcategory: None,
        }
    }
}

pub trait Classify: Send + Sync {
    fn classify(&self, source: &SourceDescriptor, marker: Option<&str>) -> Option<Classification>;
}

/// First prefix in `table` that `marker` starts with; case-sensitive
fn match_prefix(
    table: &[(&'static str, &'static str)],
    marker: Option<&str>,
) -> Option<&'static str> {
    let marker = marker?.trim();
    table
        .iter()
        .find(|(prefix, _)| marker.starts_with(prefix))
        .map(|(_, tag)| *tag)
}

/// The source file alone determines the category
#[derive(Debug, Clone, Copy, Default)]
pub struct FileIdentity;

impl Classify for FileIdentity {
    fn classify(&self, source: &SourceDescriptor, _marker: Option<&str>) -> Option<Classification> {
        source
            .category
            .filter(|c| !c.is_empty())
            .map(Classification::category)
    }
}

/// Category from the marker's prefix; ordered, first match wins.
///
/// Without a fallback, rows whose marker matches nothing are dropped.
#[derive(Debug, Clone)]
pub struct MarkerPrefix {
    prefixes: Vec<(&'static str, &'static str)>,
    fallback: Option<&'static str>,
}

impl MarkerPrefix {
    pub fn new(prefixes: &[(&'static str, &'static str)]) -> Self {
        Self {
            prefixes: prefixes.to_vec(),
            fallback: None,
        }
    }

    /// Category for rows with no matching (or no) marker
    pub fn with_fallback(mut self, category: &'static str) -> Self {
        self.fallback = Some(category).filter(|c| !c.is_empty());
        self
    }
}

impl Classify for MarkerPrefix {
    fn classify(&self, _source: &SourceDescriptor, marker: Option<&str>) -> Option<Classification> {
        match_prefix(&self.prefixes, marker)
            .or(self.fallback)
            .map(Classification::category)
    }
}

/// Category from the file, subcategory from the marker.
///
/// Categories listed as optional keep rows whose marker matches nothing (with
/// no subcategory); every other category drops them.
#[derive(Debug, Clone, Default)]
pub struct FileWithMarkerSubcategory {
    tables: Vec<(&'static str, Vec<(&'static str, &'static str)>)>,
    optional: Vec<&'static str>,
}

impl FileWithMarkerSubcategory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(
        mut self,
        category: &'static str,
        prefixes: &[(&'static str, &'static str)],
    ) -> Self {
        self.tables.push((category, prefixes.to_vec()));
        self
    }

    pub fn with_optional(mut self, category: &'static str) -> Self {
        self.optional.push(category);
        self
    }

    fn prefixes_for(&self, category: &str) -> &[(&'static str, &'static str)] {
        self.tables
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, table)| table.as_slice())
            .unwrap_or(&[])
    }
}

impl Classify for FileWithMarkerSubcategory {
    fn classify(&self, source: &SourceDescriptor, marker: Option<&str>) -> Option<Classification> {
        let category = source.category.filter(|c| !c.is_empty())?;

        match match_prefix(self.prefixes_for(category), marker) {
            Some(subcategory) => Some(Classification {
                category,
                subcategory: Some(subcategory),
            }),
            None if self.optional.contains(&category) => Some(Classification::category(category)),
            None => None,
        }
    }
}

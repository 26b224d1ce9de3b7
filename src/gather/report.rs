//! Aggregate report and the documents printed for the caller

use crate::domain::category::Category;
use crate::domain::ports::Record;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

// =============================================================================
// Info Report
// =============================================================================

/// Results of one gather run, one entry per category.
///
/// Every category is present; categories that were not requested stay empty.
#[derive(Debug, Clone, PartialEq)]
pub struct InfoReport {
    results: IndexMap<Category, Vec<Record>>,
}

impl InfoReport {
    /// Report with every category present and empty
    pub fn new() -> Self {
        Self {
            results: Category::ALL
                .iter()
                .map(|category| (*category, Vec::new()))
                .collect(),
        }
    }

    /// Store the records gathered for a category
    pub fn set(&mut self, category: Category, records: Vec<Record>) {
        self.results.insert(category, records);
    }

    pub fn get(&self, category: Category) -> &[Record] {
        self.results
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Record count per category, in report order
    pub fn counts(&self) -> IndexMap<Category, usize> {
        Category::ALL
            .iter()
            .map(|category| (*category, self.get(*category).len()))
            .collect()
    }

    /// Total records across all categories
    pub fn total_records(&self) -> usize {
        self.results.values().map(Vec::len).sum()
    }
}

impl Default for InfoReport {
    fn default() -> Self {
        Self::new()
    }
}

impl Serialize for InfoReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.results.len()))?;
        for (category, records) in &self.results {
            map.serialize_entry(category.report_key(), records)?;
        }
        map.end()
    }
}

// =============================================================================
// Output Documents
// =============================================================================

/// Document printed when gathering succeeds
#[derive(Debug, Clone, serde::Serialize)]
pub struct SuccessOutput<'a> {
    pub changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    pub cluster: &'a str,
    pub gathered_at: DateTime<Utc>,
    #[serde(flatten)]
    pub report: &'a InfoReport,
}

impl<'a> SuccessOutput<'a> {
    pub fn new(report: &'a InfoReport, cluster: &'a str, name: Option<&'a str>) -> Self {
        Self {
            changed: false,
            name,
            cluster,
            gathered_at: Utc::now(),
            report,
        }
    }
}

/// Document printed when gathering fails
#[derive(Debug, Clone, serde::Serialize)]
pub struct FailureOutput {
    pub failed: bool,
    pub changed: bool,
    pub msg: String,
}

impl FailureOutput {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            failed: true,
            changed: false,
            msg: msg.into(),
        }
    }

    /// Failure document for an error, naming the category when one failed
    pub fn from_error(err: &crate::error::Error) -> Self {
        Self::new(format!("Module failed. Error [{}].", err))
    }
}

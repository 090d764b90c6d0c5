//! The cross-implementation aggregation matrix.
//!
//! A sparse table keyed by (section id, short title) rows and implementation
//! columns. Rows and columns keep first-seen order across all processed
//! reports so the rendered tables stay stable as new reports land. Built
//! incrementally by the normalizer, then read-only during rendering.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Normalized conformance outcome for one (section, short title,
/// implementation) triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Success,
    Failure,
    /// The implementation declared the test but its runner skipped it.
    NoSupport,
    /// The whole section is structurally untestable; raw outcome ignored.
    NoTests,
    /// The implementation never declared the test at all. Never stored in
    /// the matrix; it is the implicit default for absent cells.
    Untested,
}

impl Status {
    /// The wire/display name, also used as the cell class attribute.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Success => "success",
            Status::Failure => "failure",
            Status::NoSupport => "no support",
            Status::NoTests => "no tests",
            Status::Untested => "untested",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of a section table: a short title plus per-implementation cells.
#[derive(Debug, Clone, Default)]
pub struct Row {
    cells: HashMap<String, Status>,
}

impl Row {
    /// Status for an implementation, defaulting to `Untested` when the
    /// implementation never populated the cell.
    pub fn status(&self, implementation: &str) -> Status {
        self.cells
            .get(implementation)
            .copied()
            .unwrap_or(Status::Untested)
    }

    pub fn set(&mut self, implementation: &str, status: Status) {
        self.cells.insert(implementation.to_string(), status);
    }
}

/// All rows of one section, in first-seen short-title order.
#[derive(Debug, Clone, Default)]
pub struct SectionResults {
    order: Vec<String>,
    rows: HashMap<String, Row>,
}

impl SectionResults {
    /// Get-or-create the row for a short title, preserving insertion order.
    pub fn row_mut(&mut self, short_title: &str) -> &mut Row {
        if !self.rows.contains_key(short_title) {
            self.order.push(short_title.to_string());
        }
        self.rows.entry(short_title.to_string()).or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Iterate (short title, row) in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Row)> {
        self.order
            .iter()
            .filter_map(|t| self.rows.get(t).map(|r| (t.as_str(), r)))
    }
}

/// The full matrix: per-section results plus the implementation column order.
#[derive(Debug, Clone, Default)]
pub struct AggregationMatrix {
    sections: HashMap<String, SectionResults>,
    implementations: Vec<String>,
}

impl AggregationMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an implementation column in first-seen order. Idempotent.
    pub fn add_implementation(&mut self, name: &str) {
        if !self.implementations.iter().any(|i| i == name) {
            self.implementations.push(name.to_string());
        }
    }

    /// Implementation names in first-seen (column) order.
    pub fn implementations(&self) -> &[String] {
        &self.implementations
    }

    pub fn record(
        &mut self,
        section_id: &str,
        short_title: &str,
        implementation: &str,
        status: Status,
    ) {
        self.sections
            .entry(section_id.to_string())
            .or_default()
            .row_mut(short_title)
            .set(implementation, status);
    }

    pub fn section(&self, section_id: &str) -> Option<&SectionResults> {
        self.sections.get(section_id)
    }

    /// Status for a triple; `Untested` when the row exists but the
    /// implementation never touched it, `None` when the row itself does not
    /// exist.
    pub fn status(
        &self,
        section_id: &str,
        short_title: &str,
        implementation: &str,
    ) -> Option<Status> {
        let section = self.sections.get(section_id)?;
        let (_, row) = section.iter().find(|(t, _)| **t == *short_title)?;
        Some(row.status(implementation))
    }
}

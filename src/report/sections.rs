//! Section table and test-title classification.
//!
//! Tests in a raw report are identified only by their free-text full title
//! (the concatenation of nested suite names). The section table maps each
//! human-readable section name to a short machine id and, by its ordering,
//! decides both classification priority and rendering order.

use serde::{Deserialize, Serialize};

/// Ordered mapping from human-readable section name to short section id.
///
/// Order matters twice: classification returns the first name that prefixes
/// a title, and the renderer emits one table per section in this order. The
/// table is constructed so that no registered name is a prefix of another.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct SectionTable {
    entries: Vec<SectionEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SectionEntry {
    /// Section name as it appears at the start of test titles.
    pub name: String,
    /// Short machine identifier used as the matrix key.
    pub id: String,
}

/// A successful classification of a full test title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified<'a> {
    /// Short id of the matched section.
    pub section_id: &'a str,
    /// Matched section name.
    pub section_name: &'a str,
    /// The full title with the section-name prefix (and one space) removed.
    /// Used as the matrix row key; must be byte-identical across
    /// implementations for rows to line up.
    pub short_title: String,
}

impl SectionTable {
    pub fn new(entries: Vec<SectionEntry>) -> Self {
        Self { entries }
    }

    /// The VCDM 1.0 section taxonomy.
    pub fn vcdm_v1() -> Self {
        let pairs = [
            ("Basic Documents", "basic"),
            ("Credential Status (optional)", "status"),
            ("Advanced Documents", "advanced"),
            ("Linked Data Proofs (optional)", "ldp"),
            ("Credential Schema (optional)", "schema"),
            ("Refresh Service (optional)", "refresh"),
            ("Terms of Use (optional)", "tou"),
            ("Evidence (optional)", "evidence"),
            ("JWT (optional)", "jwt"),
            ("Zero-Knowledge Proofs (optional)", "zkp"),
        ];
        Self {
            entries: pairs
                .iter()
                .map(|(name, id)| SectionEntry {
                    name: (*name).to_string(),
                    id: (*id).to_string(),
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate sections in configured (rendering) order.
    pub fn iter(&self) -> impl Iterator<Item = &SectionEntry> {
        self.entries.iter()
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Classify a full test title by first literal-prefix match in table
    /// order. Returns `None` when no registered section name prefixes the
    /// title; callers treat that as "not part of the tracked taxonomy", not
    /// as an error.
    pub fn classify(&self, full_title: &str) -> Option<Classified<'_>> {
        let entry = self
            .entries
            .iter()
            .find(|e| full_title.starts_with(e.name.as_str()))?;
        // Strip the section name plus the single separating space. A title
        // that is exactly the section name yields an empty short title.
        let rest = &full_title[entry.name.len()..];
        let short_title = rest.strip_prefix(' ').unwrap_or(rest).to_string();
        Some(Classified {
            section_id: &entry.id,
            section_name: &entry.name,
            short_title,
        })
    }
}

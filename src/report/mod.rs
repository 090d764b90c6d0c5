//! Implementation-report aggregation.
//!
//! Each implementation under test produces one `<name>-report.json` file, the
//! raw output of running that implementation's generator through the test
//! runner. This module loads those files, normalizes each test outcome
//! against the section taxonomy and override policy, folds everything into a
//! single [`matrix::AggregationMatrix`], and renders the cross-implementation
//! conformance tables.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod matrix;
pub mod normalize;
pub mod overrides;
pub mod render;
pub mod sections;

use matrix::AggregationMatrix;
use normalize::Normalizer;
use overrides::OverrideRules;
use sections::SectionTable;

/// Suffix that marks a file as an implementation report and carries the
/// implementation's display name in the remainder of the filename.
pub const REPORT_SUFFIX: &str = "-report.json";

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed report {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("report policy {path} is invalid: {reason}")]
    Policy { path: PathBuf, reason: String },
}

/// One executed test case. A present, non-empty `err` object means failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTestRecord {
    #[serde(rename = "fullTitle")]
    pub full_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<serde_json::Value>,
}

impl RawTestRecord {
    /// Mocha emits `err: {}` for passing tests; only a non-empty object
    /// counts as a failure.
    pub fn failed(&self) -> bool {
        match &self.err {
            None => false,
            Some(serde_json::Value::Object(map)) => !map.is_empty(),
            Some(serde_json::Value::Null) => false,
            Some(_) => true,
        }
    }
}

/// A test the runner marked pending: declared but not executed, which the
/// report treats as "not supported" by the implementation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPendingRecord {
    #[serde(rename = "fullTitle")]
    pub full_title: String,
}

/// One implementation's full run output. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawReport {
    pub tests: Vec<RawTestRecord>,
    #[serde(default)]
    pub pending: Vec<RawPendingRecord>,
}

impl RawReport {
    pub fn load(path: &Path) -> Result<Self, ReportError> {
        let data = fs::read_to_string(path).map_err(|source| ReportError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ReportError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn is_pending(&self, full_title: &str) -> bool {
        self.pending.iter().any(|p| p.full_title == full_title)
    }
}

/// Section taxonomy plus override rules: the complete static configuration
/// for one aggregation run. Loaded once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportPolicy {
    pub sections: SectionTable,
    #[serde(flatten)]
    pub overrides: OverrideRules,
}

impl Default for ReportPolicy {
    fn default() -> Self {
        Self::vcdm_v1()
    }
}

impl ReportPolicy {
    /// Built-in policy for the VCDM 1.0 suite: the ten-section taxonomy and
    /// the curated suppression lists.
    pub fn vcdm_v1() -> Self {
        Self {
            sections: SectionTable::vcdm_v1(),
            overrides: OverrideRules::vcdm_v1(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, ReportError> {
        let data = fs::read_to_string(path).map_err(|source| ReportError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let policy: Self = serde_json::from_str(&data).map_err(|source| ReportError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if policy.sections.is_empty() {
            return Err(ReportError::Policy {
                path: path.to_path_buf(),
                reason: "section table is empty".into(),
            });
        }
        Ok(policy)
    }
}

/// A discovered report file with the implementation name parsed from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFile {
    pub implementation: String,
    pub path: PathBuf,
}

/// Find all `*-report.json` files directly under `dir`, sorted by filename
/// so column order is stable across runs on the same directory.
pub fn discover_reports(dir: &Path) -> Result<Vec<ReportFile>, ReportError> {
    let entries = fs::read_dir(dir).map_err(|source| ReportError::Read {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut found = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(implementation) = name.strip_suffix(REPORT_SUFFIX) {
            if implementation.is_empty() {
                warn!(file = name, "report file has no implementation name, skipping");
                continue;
            }
            found.push(ReportFile {
                implementation: implementation.to_string(),
                path,
            });
        }
    }
    found.sort_by(|a, b| a.implementation.cmp(&b.implementation));
    debug!(dir = %dir.display(), count = found.len(), "discovered report files");
    Ok(found)
}

/// Aggregate every report under `dir` into one matrix.
///
/// A malformed file aborts processing of that file with a diagnostic naming
/// it but does not prevent the remaining reports from being aggregated.
pub fn aggregate_dir(dir: &Path, policy: &ReportPolicy) -> Result<AggregationMatrix, ReportError> {
    let files = discover_reports(dir)?;
    let normalizer = Normalizer::new(policy);
    let mut matrix = AggregationMatrix::new();

    for file in &files {
        info!(implementation = %file.implementation, "parsing report");
        match RawReport::load(&file.path) {
            Ok(report) => {
                matrix.add_implementation(&file.implementation);
                normalizer.absorb(&report, &file.implementation, &mut matrix);
            }
            Err(err) => {
                warn!(file = %file.path.display(), error = %err, "skipping malformed report");
            }
        }
    }
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn raw_test_record_err_emptiness_decides_failure() {
        let passed: RawTestRecord =
            serde_json::from_str(r#"{"fullTitle":"t","err":{}}"#).unwrap();
        assert!(!passed.failed());

        let no_err: RawTestRecord = serde_json::from_str(r#"{"fullTitle":"t"}"#).unwrap();
        assert!(!no_err.failed());

        let failed: RawTestRecord =
            serde_json::from_str(r#"{"fullTitle":"t","err":{"message":"x"}}"#).unwrap();
        assert!(failed.failed());
    }

    #[test]
    fn raw_report_tolerates_missing_pending() {
        let report: RawReport = serde_json::from_str(r#"{"tests":[]}"#).unwrap();
        assert!(report.pending.is_empty());
    }

    #[test]
    fn discover_reports_parses_names_and_sorts() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("zeta-report.json"), "{}").unwrap();
        fs::write(tmp.path().join("alpha-report.json"), "{}").unwrap();
        fs::write(tmp.path().join("notes.txt"), "").unwrap();
        fs::write(tmp.path().join("-report.json"), "{}").unwrap();

        let files = discover_reports(tmp.path()).unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.implementation.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn aggregate_dir_survives_a_malformed_report() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("broken-report.json"), "not json").unwrap();
        fs::write(
            tmp.path().join("good-report.json"),
            r#"{"tests":[{"fullTitle":"Basic Documents `@context` property MUST exist"}],"pending":[]}"#,
        )
        .unwrap();

        let matrix = aggregate_dir(tmp.path(), &ReportPolicy::vcdm_v1()).unwrap();
        assert_eq!(matrix.implementations(), &["good".to_string()]);
        assert_eq!(
            matrix.status("basic", "`@context` property MUST exist", "good"),
            Some(matrix::Status::Success)
        );
    }

    #[test]
    fn policy_load_rejects_empty_section_table() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("policy.json");
        fs::write(&path, r#"{"sections":[]}"#).unwrap();
        assert!(matches!(
            ReportPolicy::load(&path),
            Err(ReportError::Policy { .. })
        ));
    }
}

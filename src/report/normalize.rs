//! Normalizes one raw report into matrix cells.
//!
//! For every test a report declares: classify the title against the section
//! table, apply the override policy, resolve a [`Status`], and write it into
//! the matrix. Status priority when rules stack: section-level `no tests`
//! override, then pending (`no support`), then err-based pass/fail.

use tracing::debug;

use super::matrix::{AggregationMatrix, Status};
use super::overrides::OverrideRules;
use super::sections::SectionTable;
use super::{RawReport, ReportPolicy};

/// Stateless per-run normalizer borrowing the static policy.
pub struct Normalizer<'a> {
    sections: &'a SectionTable,
    overrides: &'a OverrideRules,
}

impl<'a> Normalizer<'a> {
    pub fn new(policy: &'a ReportPolicy) -> Self {
        Self {
            sections: &policy.sections,
            overrides: &policy.overrides,
        }
    }

    /// Fold one implementation's report into the matrix. Idempotent for a
    /// given (report, implementation) pair: statuses depend only on the
    /// report contents and the policy, never on call count.
    pub fn absorb(&self, report: &RawReport, implementation: &str, matrix: &mut AggregationMatrix) {
        for test in &report.tests {
            let full_title = test.full_title.as_str();

            let Some(classified) = self.sections.classify(full_title) else {
                debug!(title = full_title, "title matches no registered section, dropping");
                continue;
            };

            if self.overrides.skips_section(classified.section_id) {
                debug!(
                    section = classified.section_id,
                    title = full_title,
                    "section skipped by policy"
                );
                continue;
            }

            if self.overrides.suppresses(full_title) {
                debug!(title = full_title, "title suppressed by override policy");
                continue;
            }

            let status = if self.overrides.forces_no_tests(classified.section_id) {
                Status::NoTests
            } else if report.is_pending(full_title) {
                Status::NoSupport
            } else if test.failed() {
                Status::Failure
            } else {
                Status::Success
            };

            matrix.record(
                classified.section_id,
                &classified.short_title,
                implementation,
                status,
            );
        }
    }
}

//! Diagnostic aggregation: ordering, fingerprints, counts and status.
//!
//! No formatting happens here; rendering belongs to the reporter.

use crate::fingerprint::fingerprint_for_diagnostic;
use std::cmp::Ordering;
use stylepolicy_types::{Diagnostic, FileReport, RepoPath, SeverityCounts, Status};

/// Build the report for one run.
pub fn aggregate(path: RepoPath, mut diagnostics: Vec<Diagnostic>) -> FileReport {
    // Deterministic ordering before fingerprinting.
    diagnostics.sort_by(compare_diagnostics);

    for diagnostic in &mut diagnostics {
        diagnostic.fingerprint = Some(fingerprint_for_diagnostic(path.as_str(), diagnostic));
    }

    FileReport {
        status: Status::from_diagnostics(&diagnostics),
        counts: SeverityCounts::from_diagnostics(&diagnostics),
        path,
        diagnostics,
    }
}

/// Worst status across several reports.
pub fn overall_status(reports: &[FileReport]) -> Status {
    reports
        .iter()
        .map(|r| r.status)
        .max()
        .unwrap_or(Status::Clean)
}

/// Sum of per-file counts.
pub fn total_counts(reports: &[FileReport]) -> SeverityCounts {
    reports
        .iter()
        .fold(SeverityCounts::default(), |mut acc, report| {
            acc.advisory += report.counts.advisory;
            acc.blocking += report.counts.blocking;
            acc
        })
}

pub fn compare_diagnostics(a: &Diagnostic, b: &Diagnostic) -> Ordering {
    // Ordering priority:
    // 1) line
    // 2) column
    // 3) rule_id
    // 4) code
    // 5) message
    a.position
        .line
        .cmp(&b.position.line)
        .then(a.position.column.cmp(&b.position.column))
        .then(a.rule_id.cmp(&b.rule_id))
        .then(a.code.cmp(&b.code))
        .then(a.message.cmp(&b.message))
}

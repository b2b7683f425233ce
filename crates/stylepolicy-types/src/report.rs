use crate::{Diagnostic, RepoPath, Severity};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Stable schema identifier for stylepolicy reports.
pub const SCHEMA_REPORT_V1: &str = "stylepolicy.report.v1";

/// Overall outcome of one or more evaluation runs.
///
/// Ordered so that `max` yields the worst outcome.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Clean,
    Advisory,
    Blocking,
}

impl Status {
    /// Status implied by a set of diagnostics.
    pub fn from_diagnostics<'a>(diagnostics: impl IntoIterator<Item = &'a Diagnostic>) -> Self {
        diagnostics
            .into_iter()
            .map(|d| match d.severity {
                Severity::Blocking => Status::Blocking,
                Severity::Advisory => Status::Advisory,
                Severity::Off => Status::Clean,
            })
            .max()
            .unwrap_or(Status::Clean)
    }

    /// Map status to a process exit code: 0 = clean/advisory, 2 = blocking.
    pub fn exit_code(self) -> i32 {
        match self {
            Status::Clean | Status::Advisory => 0,
            Status::Blocking => 2,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SeverityCounts {
    pub advisory: u32,
    pub blocking: u32,
}

impl SeverityCounts {
    pub fn from_diagnostics(diagnostics: &[Diagnostic]) -> Self {
        let mut counts = SeverityCounts::default();
        for d in diagnostics {
            match d.severity {
                Severity::Advisory => counts.advisory += 1,
                Severity::Blocking => counts.blocking += 1,
                Severity::Off => {}
            }
        }
        counts
    }
}

/// Diagnostics for one analyzed tree, in reporting order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FileReport {
    pub path: RepoPath,
    pub status: Status,
    pub counts: SeverityCounts,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ToolMeta {
    pub name: String,
    pub version: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RunMeta {
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub finished_at: OffsetDateTime,
    pub duration_ms: u64,
}

/// Output of one check run over many trees.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CheckReport {
    pub schema: String,
    pub tool: ToolMeta,
    pub run: RunMeta,
    /// Worst status across `files`.
    pub status: Status,
    pub counts: SeverityCounts,
    /// Policy layer names in merge order.
    pub layers: Vec<String>,
    /// One report per tree, in input order.
    pub files: Vec<FileReport>,
}

//! Stable DTOs and IDs used across the stylepolicy workspace.
//!
//! This crate is intentionally boring:
//! - severities, positions and diagnostics handed to reporters
//! - the per-file report and overall status
//! - stable string IDs for built-in rules and finding codes
//! - canonical repo-relative path handling

#![forbid(unsafe_code)]

pub mod diagnostic;
pub mod ids;
pub mod path;
pub mod report;

pub use diagnostic::{Diagnostic, LineCol, OffsetRange, Position, Severity};
pub use path::RepoPath;
pub use report::{CheckReport, FileReport, RunMeta, SeverityCounts, Status, ToolMeta, SCHEMA_REPORT_V1};

//! Report rendering: a plain-text summary and the JSON artifact.

use anyhow::Context;
use camino::Utf8Path;
use std::fmt::Write as _;
use stylepolicy_types::{CheckReport, Status};

/// One line per diagnostic, in report order, followed by totals.
pub fn render_text(report: &CheckReport) -> String {
    let mut out = String::new();
    let mut problems = 0usize;

    for file in &report.files {
        for d in &file.diagnostics {
            problems += 1;
            let _ = writeln!(
                out,
                "{}:{}:{} {} {} {}",
                file.path.as_str(),
                d.position.line,
                d.position.column,
                d.severity,
                d.rule_id,
                d.message
            );
        }
    }

    if problems == 0 {
        out.push_str("no problems\n");
    } else {
        let noun = if problems == 1 { "problem" } else { "problems" };
        let _ = writeln!(
            out,
            "\n{problems} {noun} ({} blocking, {} advisory)",
            report.counts.blocking, report.counts.advisory
        );
    }
    let _ = writeln!(out, "status: {}", status_label(report));
    out
}

fn status_label(report: &CheckReport) -> &'static str {
    match report.status {
        Status::Clean => "clean",
        Status::Advisory => "advisory",
        Status::Blocking => "blocking",
    }
}

pub fn serialize_report(report: &CheckReport) -> anyhow::Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(report).context("serialize report")?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Write the JSON report, creating parent directories.
pub fn write_report(path: &Utf8Path, report: &CheckReport) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_str().is_empty()
    {
        std::fs::create_dir_all(parent).with_context(|| format!("create {parent}"))?;
    }
    let bytes = serialize_report(report)?;
    std::fs::write(path, bytes).with_context(|| format!("write {path}"))
}

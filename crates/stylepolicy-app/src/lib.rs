//! Use case orchestration for stylepolicy.
//!
//! This crate provides the application layer: use cases that coordinate the
//! settings and domain layers. It is intentionally thin; parsing source text
//! and printing belong to the caller.

#![forbid(unsafe_code)]

mod check;
mod explain;
mod render;

pub use check::{run_check, CheckInput, CheckOutput, PolicyFormat};
pub use explain::{format_explanation, format_not_found, run_explain, ExplainOutput, RuleExplanation};
pub use render::{render_text, serialize_report, write_report};

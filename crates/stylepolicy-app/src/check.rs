//! The `check` use case: resolve a policy once, evaluate trees, produce a report.

use anyhow::Context;
use camino::Utf8Path;
use stylepolicy_domain::report::{overall_status, total_counts};
use stylepolicy_domain::{RuleRegistry, SyntaxTree};
use stylepolicy_settings::{
    LayerSource, NoSource, Overrides, PolicyDocument, PolicyResolver, ResolvedPolicy,
};
use stylepolicy_types::{CheckReport, RunMeta, SCHEMA_REPORT_V1, ToolMeta};
use time::OffsetDateTime;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PolicyFormat {
    #[default]
    Json,
    Toml,
}

impl PolicyFormat {
    /// Guess from the file extension; anything but `.toml` is JSON.
    pub fn from_path(path: &Utf8Path) -> Self {
        match path.extension() {
            Some("toml") => PolicyFormat::Toml,
            _ => PolicyFormat::Json,
        }
    }
}

/// Input for the check use case.
#[derive(Clone)]
pub struct CheckInput<'a> {
    /// Name used for the local layer in errors and reports.
    pub policy_name: &'a str,
    /// Policy document contents (empty string if not found).
    pub policy_text: &'a str,
    pub format: PolicyFormat,
    /// Resolves `extends` references that are not presets.
    pub source: &'a dyn LayerSource,
    /// Caller overrides, applied last.
    pub overrides: Overrides,
    pub trees: &'a [SyntaxTree],
}

impl<'a> CheckInput<'a> {
    pub fn new(policy_name: &'a str, policy_text: &'a str, trees: &'a [SyntaxTree]) -> Self {
        Self {
            policy_name,
            policy_text,
            format: PolicyFormat::from_path(Utf8Path::new(policy_name)),
            source: &NoSource,
            overrides: Overrides::default(),
            trees,
        }
    }
}

/// Output from the check use case.
#[derive(Clone, Debug)]
pub struct CheckOutput {
    pub report: CheckReport,
    /// The resolved policy used for every tree.
    pub resolved: ResolvedPolicy,
}

/// Run the check use case: parse the policy, expand and merge the cascade,
/// evaluate every tree, produce a report.
pub fn run_check(input: CheckInput<'_>, registry: &RuleRegistry) -> anyhow::Result<CheckOutput> {
    let started_at = OffsetDateTime::now_utc();

    // Parse policy (empty is allowed, defaults apply).
    let document = if input.policy_text.trim().is_empty() {
        PolicyDocument::default()
    } else {
        let parsed = match input.format {
            PolicyFormat::Json => {
                stylepolicy_settings::parse_layer_json(input.policy_name, input.policy_text)
            }
            PolicyFormat::Toml => {
                stylepolicy_settings::parse_layer_toml(input.policy_name, input.policy_text)
            }
        };
        parsed.context("parse policy")?
    };

    let resolved = PolicyResolver::new(registry)
        .with_source(input.source)
        .resolve(input.policy_name, &document, &input.overrides)
        .context("resolve policy")?;

    tracing::debug!(
        layers = resolved.layers.len(),
        rules = resolved.policy.rules.len(),
        trees = input.trees.len(),
        "policy resolved"
    );

    let files = stylepolicy_domain::evaluate_all(input.trees, &resolved.policy, registry);

    let finished_at = OffsetDateTime::now_utc();
    let duration_ms = (finished_at - started_at).whole_milliseconds().max(0) as u64;

    let report = CheckReport {
        schema: SCHEMA_REPORT_V1.to_string(),
        tool: ToolMeta {
            name: "stylepolicy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        run: RunMeta {
            started_at,
            finished_at,
            duration_ms,
        },
        status: overall_status(&files),
        counts: total_counts(&files),
        layers: resolved.layers.clone(),
        files,
    };

    Ok(CheckOutput { report, resolved })
}

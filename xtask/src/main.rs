//! Developer tasks (schema generation, fixture validation).
//!
//! Keeping this separate keeps the library crates free of tooling deps.

use anyhow::{Context, bail};
use schemars::schema_for;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use stylepolicy_domain::{RuleRegistry, SyntaxTree};
use stylepolicy_test_util::normalize_nondeterministic;

/// Get the project root (parent of xtask directory).
fn project_root() -> anyhow::Result<PathBuf> {
    let manifest_dir = match std::env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => std::env::current_dir().context("determine current directory")?,
    };

    if manifest_dir.ends_with("xtask") {
        manifest_dir
            .parent()
            .map(Path::to_path_buf)
            .context("xtask has no parent")
    } else {
        Ok(manifest_dir)
    }
}

fn schemas_dir() -> anyhow::Result<PathBuf> {
    Ok(project_root()?.join("schemas"))
}

fn fixtures_dir() -> anyhow::Result<PathBuf> {
    Ok(project_root()?.join("tests").join("fixtures"))
}

/// Schema definition with its target filename.
struct SchemaSpec {
    filename: &'static str,
    generate: fn() -> schemars::Schema,
}

fn generate_layer_schema() -> schemars::Schema {
    schema_for!(stylepolicy_settings::PolicyDocument)
}

fn generate_report_schema() -> schemars::Schema {
    schema_for!(stylepolicy_types::CheckReport)
}

const LAYER_SCHEMA: &str = "stylepolicy.layer.v1.json";
const REPORT_SCHEMA: &str = "stylepolicy.report.v1.json";

fn schema_specs() -> Vec<SchemaSpec> {
    vec![
        SchemaSpec {
            filename: LAYER_SCHEMA,
            generate: generate_layer_schema,
        },
        SchemaSpec {
            filename: REPORT_SCHEMA,
            generate: generate_report_schema,
        },
    ]
}

/// Serialize a schema to pretty-printed JSON with trailing newline.
fn serialize_schema(schema: &schemars::Schema) -> anyhow::Result<String> {
    let mut json = serde_json::to_string_pretty(schema).context("Failed to serialize schema")?;
    json.push('\n');
    Ok(json)
}

fn emit_schemas(dir: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(dir).context("Failed to create schemas directory")?;

    for spec in schema_specs() {
        let json = serialize_schema(&(spec.generate)())?;
        let path = dir.join(spec.filename);
        fs::write(&path, &json)
            .with_context(|| format!("Failed to write schema to {}", path.display()))?;
        println!("Wrote {}", path.display());
    }

    println!("\nSchemas emitted successfully.");
    Ok(())
}

/// Check that schemas in `dir` match what would be generated.
fn validate_schemas(dir: &Path) -> anyhow::Result<()> {
    let mut missing = Vec::new();
    let mut mismatched = Vec::new();

    for spec in schema_specs() {
        let path = dir.join(spec.filename);
        if !path.exists() {
            missing.push(spec.filename);
            continue;
        }

        let expected = serialize_schema(&(spec.generate)())?;
        let actual = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if expected != actual {
            mismatched.push(spec.filename);
        }
    }

    if missing.is_empty() && mismatched.is_empty() {
        println!("All schemas are up to date.");
        return Ok(());
    }

    if !missing.is_empty() {
        eprintln!("Missing schemas:");
        for name in &missing {
            eprintln!("  - {name}");
        }
    }
    if !mismatched.is_empty() {
        eprintln!("Schemas out of date:");
        for name in &mismatched {
            eprintln!("  - {name}");
        }
    }
    eprintln!("\nRun `cargo xtask emit-schemas` to regenerate.");
    bail!("Schema validation failed")
}

fn read_json(path: &Path) -> anyhow::Result<serde_json::Value> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Validate every fixture case:
/// 1. `policy.json` parses, resolves against the built-in registry, and its
///    canonical form validates against the layer schema
/// 2. `tree.json` deserializes into a syntax tree
/// 3. `expected.json` validates against the report schema and carries no
///    real timestamps or versions
fn validate_fixtures() -> anyhow::Result<()> {
    let layer_schema = serde_json::to_value(generate_layer_schema())?;
    let report_schema = serde_json::to_value(generate_report_schema())?;
    let layer_validator = jsonschema::validator_for(&layer_schema)
        .map_err(|e| anyhow::anyhow!("Failed to compile layer schema: {e}"))?;
    let report_validator = jsonschema::validator_for(&report_schema)
        .map_err(|e| anyhow::anyhow!("Failed to compile report schema: {e}"))?;
    let registry = RuleRegistry::builtin();

    let dir = fixtures_dir()?;
    let mut cases = Vec::new();
    for entry in fs::read_dir(&dir).with_context(|| format!("Failed to read {}", dir.display()))? {
        let path = entry?.path();
        if path.is_dir() {
            cases.push(path);
        }
    }
    cases.sort();

    let mut errors = Vec::new();
    for case_dir in &cases {
        let case = case_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let policy_text = fs::read_to_string(case_dir.join("policy.json"))
            .with_context(|| format!("{case}: read policy.json"))?;
        match stylepolicy_settings::parse_layer_json("policy.json", &policy_text) {
            Ok(doc) => {
                let canonical = serde_json::to_value(&doc)?;
                for err in layer_validator.iter_errors(&canonical) {
                    errors.push(format!("{case}: policy.json: schema validation: {err}"));
                }
                if let Err(err) = stylepolicy_settings::PolicyResolver::new(&registry).resolve(
                    "policy.json",
                    &doc,
                    &stylepolicy_settings::Overrides::default(),
                ) {
                    errors.push(format!("{case}: policy.json: {err}"));
                }
            }
            Err(err) => errors.push(format!("{case}: {err}")),
        }

        let tree = read_json(&case_dir.join("tree.json"))?;
        if let Err(err) = serde_json::from_value::<SyntaxTree>(tree) {
            errors.push(format!("{case}: tree.json: {err}"));
        }

        let expected = read_json(&case_dir.join("expected.json"))?;
        for err in report_validator.iter_errors(&expected) {
            errors.push(format!("{case}: expected.json: schema validation: {err}"));
        }
        if normalize_nondeterministic(expected.clone()) != expected {
            errors.push(format!(
                "{case}: expected.json contains unnormalized timestamps or versions"
            ));
        }

        println!("  ✓ {case}");
    }

    if cases.is_empty() {
        bail!("No fixture cases found in {}", dir.display());
    }

    if !errors.is_empty() {
        eprintln!("\nFixture errors:");
        for err in &errors {
            eprintln!("  - {err}");
        }
        bail!("Fixture validation failed with {} errors", errors.len());
    }

    println!("\n✓ All {} fixture cases are valid!", cases.len());
    Ok(())
}

/// Rule ids that appear in at least one fixture's `expected.json`.
fn fixture_rule_ids(dir: &Path) -> anyhow::Result<BTreeSet<String>> {
    let mut seen = BTreeSet::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))? {
        let case_dir = entry?.path();
        let expected = case_dir.join("expected.json");
        if !case_dir.is_dir() || !expected.exists() {
            continue;
        }

        let report = read_json(&expected)?;
        let files = report["files"].as_array().map(Vec::as_slice).unwrap_or(&[]);
        for file in files {
            let diagnostics = file["diagnostics"].as_array().map(Vec::as_slice).unwrap_or(&[]);
            for diagnostic in diagnostics {
                if let Some(id) = diagnostic["rule_id"].as_str() {
                    seen.insert(id.to_string());
                }
            }
        }
    }
    Ok(seen)
}

/// Built-in rules that no golden fixture exercises, in declaration order.
fn uncovered_rules(registry: &RuleRegistry, fixtures: &Path) -> anyhow::Result<Vec<String>> {
    let seen = fixture_rule_ids(fixtures)?;
    Ok(registry
        .rules()
        .iter()
        .filter(|r| r.plugin.is_none() && !seen.contains(&r.id))
        .map(|r| r.id.clone())
        .collect())
}

/// Every built-in rule documents itself, accepts an empty option list and
/// fires in at least one golden fixture.
fn rule_coverage(fixtures: &Path) -> anyhow::Result<()> {
    let registry = RuleRegistry::builtin();
    let mut errors = Vec::new();

    for registered in registry.rules() {
        if registered.rule.description().is_empty() {
            errors.push(format!("Rule '{}' has empty description", registered.id));
        }
        if registered.rule.interests().is_empty() {
            errors.push(format!("Rule '{}' declares no node kinds", registered.id));
        }
        if let Err(err) = registered.rule.validate_options(&[]) {
            errors.push(format!("Rule '{}' rejects default options: {err}", registered.id));
        }
    }

    for id in uncovered_rules(&registry, fixtures)? {
        errors.push(format!("Rule '{id}' is not exercised by any fixture"));
    }

    if errors.is_empty() {
        println!("✓ {} rules covered", registry.rules().len());
        Ok(())
    } else {
        for error in &errors {
            eprintln!("  - {error}");
        }
        bail!("Rule coverage failed with {} errors", errors.len())
    }
}

fn print_help() {
    eprintln!("xtask commands:");
    eprintln!("  help               Show this message");
    eprintln!("  emit-schemas       Generate JSON schemas from Rust types to schemas/");
    eprintln!("  validate-schemas   Check schemas/ matches generated output (run emit-schemas first)");
    eprintln!("  print-schema-ids   Print known schema IDs");
    eprintln!("  validate-fixtures  Validate tests/fixtures against the generated schemas");
    eprintln!("  rule-coverage      Check every built-in rule fires in a golden fixture");
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let cmd = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    match cmd {
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        "emit-schemas" => emit_schemas(&schemas_dir()?),
        "validate-schemas" => validate_schemas(&schemas_dir()?),
        "validate-fixtures" => validate_fixtures(),
        "rule-coverage" => rule_coverage(&fixtures_dir()?),
        "print-schema-ids" => {
            for spec in schema_specs() {
                println!("{}", spec.filename.trim_end_matches(".json"));
            }
            Ok(())
        }
        other => bail!("unknown xtask command: {other}\n\nRun `cargo xtask help` for usage."),
    }
    .context("xtask failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_case(root: &Path, case: &str, rule_ids: &[&str]) {
        let dir = root.join(case);
        fs::create_dir_all(&dir).expect("case dir");
        let diagnostics: Vec<serde_json::Value> = rule_ids
            .iter()
            .map(|id| serde_json::json!({"rule_id": id}))
            .collect();
        let report = serde_json::json!({"files": [{"diagnostics": diagnostics}]});
        fs::write(dir.join("expected.json"), report.to_string()).expect("write expected");
    }

    #[test]
    fn uncovered_rules_lists_rules_missing_from_fixtures() {
        let registry = RuleRegistry::builtin();
        let tmp = tempfile::tempdir().expect("tempdir");
        write_case(tmp.path(), "a", &["no-var", "eqeqeq"]);
        write_case(tmp.path(), "b", &["no-debugger"]);

        let missing = uncovered_rules(&registry, tmp.path()).expect("scan");
        assert_eq!(missing.len(), registry.rules().len() - 3);
        assert!(!missing.iter().any(|id| id == "no-var" || id == "no-debugger"));
        assert!(missing.iter().any(|id| id == "prefer-const"));
        assert!(rule_coverage(tmp.path()).is_err());
    }

    #[test]
    fn committed_fixtures_cover_every_builtin_rule() {
        let registry = RuleRegistry::builtin();
        let fixtures = fixtures_dir().expect("fixtures dir");
        assert_eq!(
            uncovered_rules(&registry, &fixtures).expect("scan"),
            Vec::<String>::new()
        );
    }

    #[test]
    fn emitted_schemas_validate() {
        let tmp = tempfile::tempdir().expect("tempdir");
        assert!(validate_schemas(tmp.path()).is_err());

        emit_schemas(tmp.path()).expect("emit");
        validate_schemas(tmp.path()).expect("fresh schemas are current");

        fs::write(tmp.path().join(REPORT_SCHEMA), "{}\n").expect("overwrite");
        assert!(validate_schemas(tmp.path()).is_err());
    }
}

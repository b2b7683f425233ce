//! Severity resolver.
//!
//! Rule settings arrive in several shapes: `2`, `"error"`, `["warn", {..}]`.
//! [`classify`] maps the raw value onto a tagged [`SeverityEncoding`] once so
//! the rest of the cascade only ever sees a [`RuleSetting`].

use serde_json::Value;
use stylepolicy_types::Severity;

/// Normalized rule setting from one layer.
///
/// `options: None` means the layer only set a severity; earlier options stay
/// in effect during merging.
#[derive(Clone, Debug, PartialEq)]
pub struct RuleSetting {
    pub severity: Severity,
    pub options: Option<Vec<Value>>,
}

impl RuleSetting {
    pub fn new(severity: Severity) -> Self {
        Self {
            severity,
            options: None,
        }
    }

    pub fn with_options(severity: Severity, options: Vec<Value>) -> Self {
        Self {
            severity,
            options: Some(options),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SeverityEncoding<'a> {
    /// `0`, `1`, `2`
    Level(u64),
    /// `"off"`, `"warn"`, `"error"`, ...
    Name(&'a str),
    /// `[severity, ...options]`
    Tuple {
        severity: &'a Value,
        options: &'a [Value],
    },
}

pub fn classify(value: &Value) -> Result<SeverityEncoding<'_>, String> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .map(SeverityEncoding::Level)
            .ok_or_else(|| format!("expected 0, 1 or 2, found {n}")),
        Value::String(s) => Ok(SeverityEncoding::Name(s)),
        Value::Array(items) => match items.split_first() {
            Some((severity, options)) => Ok(SeverityEncoding::Tuple { severity, options }),
            None => Err("empty rule setting".to_string()),
        },
        other => Err(format!("unsupported rule setting: {other}")),
    }
}

fn level(n: u64) -> Result<Severity, String> {
    match n {
        0 => Ok(Severity::Off),
        1 => Ok(Severity::Advisory),
        2 => Ok(Severity::Blocking),
        other => Err(format!("expected 0, 1 or 2, found {other}")),
    }
}

fn named(name: &str) -> Result<Severity, String> {
    match name {
        "off" => Ok(Severity::Off),
        "warn" | "warning" | "advisory" => Ok(Severity::Advisory),
        "error" | "blocking" => Ok(Severity::Blocking),
        other => Err(format!(
            "unknown severity '{other}' (expected off|warn|error|advisory|blocking)"
        )),
    }
}

/// Resolve a raw rule setting.
pub fn resolve(value: &Value) -> Result<RuleSetting, String> {
    match classify(value)? {
        SeverityEncoding::Level(n) => level(n).map(RuleSetting::new),
        SeverityEncoding::Name(name) => named(name).map(RuleSetting::new),
        SeverityEncoding::Tuple { severity, options } => {
            let severity = match classify(severity)? {
                SeverityEncoding::Level(n) => level(n)?,
                SeverityEncoding::Name(name) => named(name)?,
                SeverityEncoding::Tuple { .. } => {
                    return Err("severity inside a tuple must be a scalar".to_string());
                }
            };
            if options.is_empty() {
                Ok(RuleSetting::new(severity))
            } else {
                Ok(RuleSetting::with_options(severity, options.to_vec()))
            }
        }
    }
}

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rule enablement strength. `Off` only appears in policies; emitted
/// diagnostics are always `Advisory` or `Blocking`.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Off,
    Advisory,
    Blocking,
}

impl Severity {
    pub fn is_enabled(self) -> bool {
        self != Severity::Off
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Off => "off",
            Severity::Advisory => "advisory",
            Severity::Blocking => "blocking",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 1-based line, 1-based column.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    JsonSchema,
)]
pub struct LineCol {
    pub line: u32,
    pub column: u32,
}

impl LineCol {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// Byte offset range in the source text.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    JsonSchema,
)]
pub struct OffsetRange {
    pub start: usize,
    pub end: usize,
}

impl OffsetRange {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Zero-width range at an offset.
    pub const fn at(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }
}

impl fmt::Display for OffsetRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Position {
    pub line: u32,
    pub column: u32,
    pub span: OffsetRange,
}

impl Position {
    pub fn new(at: LineCol, span: OffsetRange) -> Self {
        Self {
            line: at.line,
            column: at.column,
            span,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Diagnostic {
    pub rule_id: String,
    pub code: String,
    pub severity: Severity,
    pub message: String,
    pub position: Position,

    /// Stable identifier intended for dedup and trending. A hash of
    /// `path + rule_id + code + line + column + message`, filled by the aggregator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

impl Diagnostic {
    pub fn new(
        rule_id: impl Into<String>,
        code: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        position: Position,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            code: code.into(),
            severity,
            message: message.into(),
            position,
            fingerprint: None,
        }
    }
}

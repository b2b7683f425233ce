//! Policy layer parsing, `extends` expansion and the configuration cascade.
//!
//! This crate is IO-free: documents arrive as strings or values, and
//! `extends` references that are not presets are loaded through a caller
//! supplied [`LayerSource`].

#![forbid(unsafe_code)]

pub mod cascade;
mod error;
pub mod layer;
pub mod model;
pub mod presets;
mod resolve;
pub mod severity;

pub use cascade::{merge, merge_pair, resolve_policy};
pub use error::ConfigError;
pub use layer::{LayerKind, PolicyLayer};
pub use model::PolicyDocument;
pub use resolve::{LayerSource, NoSource, Overrides, PolicyResolver, ResolvedPolicy, OVERRIDES_LAYER};
pub use severity::RuleSetting;

use serde_json::Value;

/// Parse a JSON policy document (`.stylepolicy.json`, `.eslintrc.json`).
pub fn parse_layer_json(name: &str, input: &str) -> Result<PolicyDocument, ConfigError> {
    serde_json::from_str(input).map_err(|e| parse_error(name, e))
}

/// Parse a TOML policy document.
pub fn parse_layer_toml(name: &str, input: &str) -> Result<PolicyDocument, ConfigError> {
    toml::from_str(input).map_err(|e| parse_error(name, e))
}

/// Parse an already-decoded document, e.g. a plugin config.
pub fn parse_layer_value(name: &str, value: Value) -> Result<PolicyDocument, ConfigError> {
    serde_json::from_value(value).map_err(|e| parse_error(name, e))
}

fn parse_error(name: &str, err: impl std::fmt::Display) -> ConfigError {
    ConfigError::Parse {
        layer: name.to_string(),
        reason: err.to_string(),
    }
}

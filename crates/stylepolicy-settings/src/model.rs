use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One policy layer as written by users (`.stylepolicy.json` / `.toml`).
///
/// eslintrc spellings (`env`, `parserOptions`, `ecmaVersion`) are accepted
/// as aliases. Unknown keys are rejected.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PolicyDocument {
    /// Optional schema reference for editors.
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Execution environments whose globals are pre-declared.
    #[serde(default, alias = "env", skip_serializing_if = "Option::is_none")]
    pub environments: Option<EnvironmentsDecl>,

    /// Layers applied before this one, in order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<OneOrMany>,

    #[serde(
        default,
        alias = "parserOptions",
        skip_serializing_if = "Option::is_none"
    )]
    pub parser_capabilities: Option<ParserCapabilitiesDecl>,

    /// Plugin names whose namespaced rules this cascade may configure.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plugins: Vec<String>,

    /// Identifier -> access mode.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub globals: BTreeMap<String, GlobalDecl>,

    /// Rule id (or alias) -> severity, or `[severity, ...options]`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub rules: BTreeMap<String, Value>,
}

/// `["browser", "node"]` or `{ "browser": true, "node": true }`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum EnvironmentsDecl {
    List(Vec<String>),
    Map(BTreeMap<String, bool>),
}

impl EnvironmentsDecl {
    /// Declared ids. Map entries set to `false` declare nothing.
    pub fn ids(&self) -> Vec<&str> {
        match self {
            EnvironmentsDecl::List(ids) => ids.iter().map(String::as_str).collect(),
            EnvironmentsDecl::Map(ids) => ids
                .iter()
                .filter(|(_, enabled)| **enabled)
                .map(|(id, _)| id.as_str())
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn as_slice(&self) -> &[String] {
        match self {
            OneOrMany::One(one) => std::slice::from_ref(one),
            OneOrMany::Many(many) => many,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ParserCapabilitiesDecl {
    /// Edition number (`5`, `6`, `2021`) or `"latest"`.
    #[serde(default, alias = "ecmaVersion", skip_serializing_if = "Option::is_none")]
    pub syntax_version: Option<SyntaxVersionDecl>,

    /// `script`, `commonjs` or `module`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,

    /// Shorthand for `sourceType`: `true` = module, `false` = script.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_mode: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum SyntaxVersionDecl {
    Number(u16),
    Name(String),
}

/// `true`/`"writable"` for read-write, `false`/`"readonly"` for read-only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum GlobalDecl {
    Flag(bool),
    Mode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_eslintrc_spellings() {
        let doc: PolicyDocument = serde_json::from_str(
            r#"{
                "env": {"browser": true, "es2021": true, "node": false},
                "extends": "eslint:recommended",
                "parserOptions": {"ecmaVersion": "latest", "sourceType": "module"},
                "rules": {"semi": ["error", "always"]}
            }"#,
        )
        .expect("parse");

        let envs = doc.environments.as_ref().expect("environments");
        assert_eq!(envs.ids(), vec!["browser", "es2021"]);
        assert_eq!(
            doc.extends.as_ref().map(OneOrMany::as_slice),
            Some(&["eslint:recommended".to_string()][..])
        );
        let caps = doc.parser_capabilities.expect("capabilities");
        assert_eq!(
            caps.syntax_version,
            Some(SyntaxVersionDecl::Name("latest".to_string()))
        );
        assert_eq!(caps.source_type.as_deref(), Some("module"));
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = serde_json::from_str::<PolicyDocument>(r#"{"rulez": {}}"#);
        assert!(err.is_err());
        let err = serde_json::from_str::<PolicyDocument>(
            r#"{"parserCapabilities": {"jsx": true}}"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn environments_list_form() {
        let doc: PolicyDocument =
            serde_json::from_str(r#"{"environments": ["node", "es6"]}"#).expect("parse");
        assert_eq!(
            doc.environments.expect("environments").ids(),
            vec!["node", "es6"]
        );
    }
}

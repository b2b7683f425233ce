//! Execution environments and the scope resolver.
//!
//! An environment is a named bundle of pre-declared globals plus the syntax
//! capabilities it implies. The table is built once at startup and read-only
//! afterwards.

use crate::policy::{SourceType, SyntaxVersion};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Environment that is always in scope, whether declared or not.
pub const BUILTIN_ENVIRONMENT: &str = "builtin";

/// Ordered from least to most permissive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessMode {
    ReadOnly,
    ReadWrite,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown environment: {id}")]
pub struct UnknownEnvironment {
    pub id: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Environment {
    pub globals: BTreeMap<String, AccessMode>,
    pub syntax_version: Option<SyntaxVersion>,
    pub source_type: Option<SourceType>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn readonly(mut self, names: &[&str]) -> Self {
        for name in names {
            self.grant(name, AccessMode::ReadOnly);
        }
        self
    }

    pub fn writable(mut self, names: &[&str]) -> Self {
        for name in names {
            self.grant(name, AccessMode::ReadWrite);
        }
        self
    }

    pub fn implies_syntax(mut self, version: SyntaxVersion) -> Self {
        self.syntax_version = Some(version);
        self
    }

    pub fn implies_source_type(mut self, source_type: SourceType) -> Self {
        self.source_type = Some(source_type);
        self
    }

    fn grant(&mut self, name: &str, mode: AccessMode) {
        let entry = self.globals.entry(name.to_string()).or_insert(mode);
        *entry = (*entry).max(mode);
    }
}

#[derive(Clone, Debug, Default)]
pub struct EnvironmentTable {
    envs: BTreeMap<String, Environment>,
}

impl EnvironmentTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let mut table = Self::empty();
        table.register(BUILTIN_ENVIRONMENT, Environment::new().readonly(ES5_GLOBALS));
        table.register("browser", browser());
        table.register("node", node());
        table.register(
            "commonjs",
            Environment::new()
                .readonly(&["require", "module"])
                .writable(&["exports"])
                .implies_source_type(SourceType::CommonJs),
        );
        table.register("worker", worker());
        table.register(
            "shared-node-browser",
            Environment::new().readonly(SHARED_NODE_BROWSER_GLOBALS),
        );
        table.register("es6", es_edition(2015));
        for year in 2015..=SyntaxVersion::LATEST.year() {
            table.register(&format!("es{year}"), es_edition(year));
        }
        table
    }

    /// Registers (or replaces) an environment.
    pub fn register(&mut self, id: &str, env: Environment) {
        self.envs.insert(id.to_string(), env);
    }

    pub fn get(&self, id: &str) -> Option<&Environment> {
        self.envs.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.envs.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.envs.keys().map(String::as_str)
    }
}

/// Union of the declared environments' globals plus implied capabilities.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedScope {
    pub globals: BTreeMap<String, AccessMode>,
    pub syntax_version: Option<SyntaxVersion>,
    pub source_type: Option<SourceType>,
}

/// Resolve declared environments against the table.
///
/// The builtin environment is always included. When two environments grant
/// the same identifier the more permissive access mode wins; implied
/// capabilities take the newest syntax version and the most module-like
/// source type.
pub fn resolve_scope(
    environments: &BTreeSet<String>,
    table: &EnvironmentTable,
) -> Result<ResolvedScope, UnknownEnvironment> {
    let mut scope = ResolvedScope::default();

    if let Some(builtin) = table.get(BUILTIN_ENVIRONMENT) {
        absorb(&mut scope, builtin);
    }

    for id in environments {
        let env = table
            .get(id)
            .ok_or_else(|| UnknownEnvironment { id: id.clone() })?;
        absorb(&mut scope, env);
    }

    Ok(scope)
}

fn absorb(scope: &mut ResolvedScope, env: &Environment) {
    for (name, mode) in &env.globals {
        let entry = scope.globals.entry(name.clone()).or_insert(*mode);
        *entry = (*entry).max(*mode);
    }
    scope.syntax_version = scope.syntax_version.max(env.syntax_version);
    scope.source_type = scope.source_type.max(env.source_type);
}

fn browser() -> Environment {
    Environment::new()
        .readonly(&[
            "window",
            "document",
            "navigator",
            "location",
            "history",
            "screen",
            "self",
            "top",
            "parent",
            "frames",
            "console",
            "alert",
            "confirm",
            "prompt",
            "fetch",
            "localStorage",
            "sessionStorage",
            "requestAnimationFrame",
            "cancelAnimationFrame",
            "getComputedStyle",
            "addEventListener",
            "removeEventListener",
            "dispatchEvent",
            "performance",
            "crypto",
            "atob",
            "btoa",
            "Element",
            "HTMLElement",
            "Node",
            "Event",
            "CustomEvent",
            "XMLHttpRequest",
            "WebSocket",
            "Worker",
            "Blob",
            "FormData",
            "Headers",
            "Request",
            "Response",
        ])
        .readonly(SHARED_NODE_BROWSER_GLOBALS)
        .writable(&["name", "status", "onload", "onerror", "onresize"])
}

fn node() -> Environment {
    Environment::new()
        .readonly(&[
            "process",
            "require",
            "module",
            "__dirname",
            "__filename",
            "Buffer",
            "global",
            "setImmediate",
            "clearImmediate",
            "structuredClone",
        ])
        .readonly(SHARED_NODE_BROWSER_GLOBALS)
        .writable(&["exports"])
        .implies_source_type(SourceType::CommonJs)
}

fn worker() -> Environment {
    Environment::new()
        .readonly(&["self", "postMessage", "importScripts", "close", "fetch"])
        .readonly(SHARED_NODE_BROWSER_GLOBALS)
        .writable(&["onmessage", "onerror"])
}

fn es_edition(year: u16) -> Environment {
    let mut env = Environment::new().readonly(ES5_GLOBALS);
    for (since, names) in ES_ADDITIONS {
        if *since <= year {
            env = env.readonly(names);
        }
    }
    match SyntaxVersion::from_number(year) {
        Some(version) => env.implies_syntax(version),
        None => env,
    }
}

const ES5_GLOBALS: &[&str] = &[
    "Array",
    "Boolean",
    "Date",
    "Error",
    "EvalError",
    "Function",
    "Infinity",
    "JSON",
    "Math",
    "NaN",
    "Number",
    "Object",
    "RangeError",
    "ReferenceError",
    "RegExp",
    "String",
    "SyntaxError",
    "TypeError",
    "URIError",
    "decodeURI",
    "decodeURIComponent",
    "encodeURI",
    "encodeURIComponent",
    "escape",
    "eval",
    "isFinite",
    "isNaN",
    "parseFloat",
    "parseInt",
    "undefined",
    "unescape",
];

const ES_ADDITIONS: &[(u16, &[&str])] = &[
    (
        2015,
        &[
            "ArrayBuffer",
            "DataView",
            "Float32Array",
            "Float64Array",
            "Int8Array",
            "Int16Array",
            "Int32Array",
            "Map",
            "Promise",
            "Proxy",
            "Reflect",
            "Set",
            "Symbol",
            "Uint8Array",
            "Uint8ClampedArray",
            "Uint16Array",
            "Uint32Array",
            "WeakMap",
            "WeakSet",
        ],
    ),
    (2017, &["Atomics", "SharedArrayBuffer"]),
    (2020, &["BigInt", "BigInt64Array", "BigUint64Array", "globalThis"]),
    (2021, &["AggregateError", "FinalizationRegistry", "WeakRef"]),
];

const SHARED_NODE_BROWSER_GLOBALS: &[&str] = &[
    "console",
    "setTimeout",
    "clearTimeout",
    "setInterval",
    "clearInterval",
    "queueMicrotask",
    "URL",
    "URLSearchParams",
    "TextEncoder",
    "TextDecoder",
];

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn builtin_globals_are_always_in_scope() {
        let scope = resolve_scope(&BTreeSet::new(), &EnvironmentTable::builtin()).expect("scope");
        assert_eq!(scope.globals.get("Object"), Some(&AccessMode::ReadOnly));
        assert!(!scope.globals.contains_key("window"));
        assert_eq!(scope.syntax_version, None);
        assert_eq!(scope.source_type, None);
    }

    #[test]
    fn environments_union_and_imply_capabilities() {
        let scope = resolve_scope(
            &ids(&["browser", "es2021", "node"]),
            &EnvironmentTable::builtin(),
        )
        .expect("scope");

        assert_eq!(scope.globals.get("window"), Some(&AccessMode::ReadOnly));
        assert_eq!(scope.globals.get("process"), Some(&AccessMode::ReadOnly));
        assert_eq!(scope.globals.get("exports"), Some(&AccessMode::ReadWrite));
        assert_eq!(scope.globals.get("WeakRef"), Some(&AccessMode::ReadOnly));
        assert_eq!(scope.syntax_version.map(SyntaxVersion::year), Some(2021));
        assert_eq!(scope.source_type, Some(SourceType::CommonJs));
    }

    #[test]
    fn conflicting_access_resolves_to_read_write() {
        let mut table = EnvironmentTable::builtin();
        table.register("legacy-shell", Environment::new().writable(&["window"]));

        let scope = resolve_scope(&ids(&["browser", "legacy-shell"]), &table).expect("scope");
        assert_eq!(scope.globals.get("window"), Some(&AccessMode::ReadWrite));
    }

    #[test]
    fn es_editions_are_cumulative() {
        let scope = resolve_scope(&ids(&["es2015"]), &EnvironmentTable::builtin()).expect("scope");
        assert!(scope.globals.contains_key("Promise"));
        assert!(!scope.globals.contains_key("BigInt"));

        let scope = resolve_scope(&ids(&["es6"]), &EnvironmentTable::builtin()).expect("scope");
        assert_eq!(scope.syntax_version, Some(SyntaxVersion::ES2015));
    }

    #[test]
    fn unknown_environment_fails() {
        let err = resolve_scope(&ids(&["deno"]), &EnvironmentTable::builtin())
            .expect_err("deno is not registered");
        assert_eq!(err.id, "deno");
    }
}

//! Validated, unmerged cascade input.

use crate::error::ConfigError;
use crate::model::{GlobalDecl, ParserCapabilitiesDecl, PolicyDocument, SyntaxVersionDecl};
use crate::severity::{self, RuleSetting};
use std::collections::{BTreeMap, BTreeSet};
use stylepolicy_domain::env::AccessMode;
use stylepolicy_domain::policy::{SourceType, SyntaxVersion};
use stylepolicy_domain::registry::RuleRegistry;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum LayerKind {
    BaseCatalog,
    Inherited,
    PluginCatalog,
    LocalOverride,
}

/// One layer with every id canonicalized and every value checked against the
/// registry. Immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct PolicyLayer {
    pub name: String,
    pub kind: LayerKind,
    pub environments: BTreeSet<String>,
    pub syntax_version: Option<SyntaxVersion>,
    pub source_type: Option<SourceType>,
    pub plugins: BTreeSet<String>,
    pub globals: BTreeMap<String, AccessMode>,
    /// Canonical rule id -> setting.
    pub rules: BTreeMap<String, RuleSetting>,
}

impl PolicyLayer {
    pub fn new(name: impl Into<String>, kind: LayerKind) -> Self {
        Self {
            name: name.into(),
            kind,
            environments: BTreeSet::new(),
            syntax_version: None,
            source_type: None,
            plugins: BTreeSet::new(),
            globals: BTreeMap::new(),
            rules: BTreeMap::new(),
        }
    }

    /// Validate a document. `extends` is ignored here; expansion happens in
    /// the resolver.
    pub fn from_document(
        name: &str,
        kind: LayerKind,
        doc: &PolicyDocument,
        registry: &RuleRegistry,
    ) -> Result<Self, ConfigError> {
        let mut layer = PolicyLayer::new(name, kind);

        if let Some(envs) = &doc.environments {
            for id in envs.ids() {
                if !registry.environments().contains(id) {
                    return Err(ConfigError::UnknownEnvironment {
                        layer: name.to_string(),
                        environment: id.to_string(),
                    });
                }
                layer.environments.insert(id.to_string());
            }
        }

        if let Some(caps) = &doc.parser_capabilities {
            let (syntax_version, source_type) = parse_capabilities(name, caps)?;
            layer.syntax_version = syntax_version;
            layer.source_type = source_type;
        }

        for plugin in &doc.plugins {
            if registry.plugin(plugin).is_none() {
                return Err(ConfigError::UnknownPlugin {
                    layer: name.to_string(),
                    plugin: plugin.clone(),
                });
            }
            layer.plugins.insert(plugin.clone());
        }

        for (global, decl) in &doc.globals {
            let mode = parse_global(decl).map_err(|reason| ConfigError::InvalidGlobal {
                layer: name.to_string(),
                name: global.clone(),
                reason,
            })?;
            layer.globals.insert(global.clone(), mode);
        }

        for (id, value) in &doc.rules {
            let Some(registered) = registry.get(id) else {
                return Err(ConfigError::UnknownRule {
                    layer: name.to_string(),
                    rule: id.clone(),
                });
            };

            let setting = severity::resolve(value).map_err(|reason| ConfigError::InvalidSeverity {
                layer: name.to_string(),
                rule: id.clone(),
                reason,
            })?;

            if let Some(options) = &setting.options {
                registered
                    .rule
                    .validate_options(options)
                    .map_err(|source| ConfigError::SchemaValidation {
                        layer: name.to_string(),
                        rule: id.clone(),
                        source,
                    })?;
            }

            layer.rules.insert(registered.id.clone(), setting);
        }

        Ok(layer)
    }
}

fn parse_capabilities(
    layer: &str,
    caps: &ParserCapabilitiesDecl,
) -> Result<(Option<SyntaxVersion>, Option<SourceType>), ConfigError> {
    let invalid = |key: &str, reason: String| ConfigError::InvalidCapability {
        layer: layer.to_string(),
        key: key.to_string(),
        reason,
    };

    let syntax_version = match &caps.syntax_version {
        None => None,
        Some(SyntaxVersionDecl::Number(n)) => Some(SyntaxVersion::from_number(*n).ok_or_else(
            || invalid("syntaxVersion", format!("unsupported version {n}")),
        )?),
        Some(SyntaxVersionDecl::Name(name)) if name == "latest" => Some(SyntaxVersion::LATEST),
        Some(SyntaxVersionDecl::Name(name)) => {
            return Err(invalid(
                "syntaxVersion",
                format!("expected a number or \"latest\", found {name:?}"),
            ));
        }
    };

    let source_type = match (caps.source_type.as_deref(), caps.module_mode) {
        (Some(_), Some(_)) => {
            return Err(invalid(
                "moduleMode",
                "cannot be combined with sourceType".to_string(),
            ));
        }
        (Some("script"), None) => Some(SourceType::Script),
        (Some("commonjs"), None) => Some(SourceType::CommonJs),
        (Some("module"), None) => Some(SourceType::Module),
        (Some(other), None) => {
            return Err(invalid(
                "sourceType",
                format!("expected script|commonjs|module, found {other:?}"),
            ));
        }
        (None, Some(true)) => Some(SourceType::Module),
        (None, Some(false)) => Some(SourceType::Script),
        (None, None) => None,
    };

    Ok((syntax_version, source_type))
}

fn parse_global(decl: &GlobalDecl) -> Result<AccessMode, String> {
    match decl {
        GlobalDecl::Flag(true) => Ok(AccessMode::ReadWrite),
        GlobalDecl::Flag(false) => Ok(AccessMode::ReadOnly),
        GlobalDecl::Mode(mode) => match mode.as_str() {
            "writable" | "writeable" | "readwrite" | "read-write" => Ok(AccessMode::ReadWrite),
            "readonly" | "readable" | "read-only" => Ok(AccessMode::ReadOnly),
            other => Err(format!(
                "expected readonly|writable or a boolean, found {other:?}"
            )),
        },
    }
}

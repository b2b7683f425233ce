use stylepolicy_domain::options::OptionsError;

/// Configuration-time failure. Every variant names the layer it came from;
/// resolution stops at the first error, before any tree is evaluated.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{layer}: unknown rule '{rule}'")]
    UnknownRule { layer: String, rule: String },

    #[error("{layer}: unknown environment '{environment}'")]
    UnknownEnvironment { layer: String, environment: String },

    #[error("{layer}: invalid options for rule '{rule}': {source}")]
    SchemaValidation {
        layer: String,
        rule: String,
        #[source]
        source: OptionsError,
    },

    #[error("{layer}: invalid severity for rule '{rule}': {reason}")]
    InvalidSeverity {
        layer: String,
        rule: String,
        reason: String,
    },

    #[error("{layer}: unknown plugin '{plugin}'")]
    UnknownPlugin { layer: String, plugin: String },

    #[error("{layer}: invalid global '{name}': {reason}")]
    InvalidGlobal {
        layer: String,
        name: String,
        reason: String,
    },

    #[error("{layer}: invalid parser capability '{key}': {reason}")]
    InvalidCapability {
        layer: String,
        key: String,
        reason: String,
    },

    #[error("{layer}: cannot resolve extends '{reference}'")]
    UnresolvedExtends { layer: String, reference: String },

    #[error("{layer}: extends cycle: {}", .chain.join(" -> "))]
    ExtendsCycle { layer: String, chain: Vec<String> },

    #[error("{layer}: {reason}")]
    Parse { layer: String, reason: String },
}

impl ConfigError {
    /// Name of the layer the error is attributed to.
    pub fn layer(&self) -> &str {
        match self {
            ConfigError::UnknownRule { layer, .. }
            | ConfigError::UnknownEnvironment { layer, .. }
            | ConfigError::SchemaValidation { layer, .. }
            | ConfigError::InvalidSeverity { layer, .. }
            | ConfigError::UnknownPlugin { layer, .. }
            | ConfigError::InvalidGlobal { layer, .. }
            | ConfigError::InvalidCapability { layer, .. }
            | ConfigError::UnresolvedExtends { layer, .. }
            | ConfigError::ExtendsCycle { layer, .. }
            | ConfigError::Parse { layer, .. } => layer,
        }
    }

    /// Offending key within the layer, when there is one.
    pub fn key(&self) -> Option<&str> {
        match self {
            ConfigError::UnknownRule { rule, .. }
            | ConfigError::SchemaValidation { rule, .. }
            | ConfigError::InvalidSeverity { rule, .. } => Some(rule),
            ConfigError::UnknownEnvironment { environment, .. } => Some(environment),
            ConfigError::UnknownPlugin { plugin, .. } => Some(plugin),
            ConfigError::InvalidGlobal { name, .. } => Some(name),
            ConfigError::InvalidCapability { key, .. } => Some(key),
            ConfigError::UnresolvedExtends { reference, .. } => Some(reference),
            ConfigError::ExtendsCycle { .. } | ConfigError::Parse { .. } => None,
        }
    }
}

//! Positional rule options and their validation.
//!
//! A rule's option payload is the list of values following the severity in
//! the tuple form, e.g. `["error", "single", { "avoidEscape": true }]` carries
//! `["single", { "avoidEscape": true }]`. Rules declare their schema as serde
//! types and read each slot through [`slot`].

use serde::de::DeserializeOwned;
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum OptionsError {
    #[error("expected at most {max} option(s), found {found}")]
    TooMany { max: usize, found: usize },
    #[error("option {index}: {reason}")]
    Invalid { index: usize, reason: String },
}

pub fn at_most(options: &[Value], max: usize) -> Result<(), OptionsError> {
    if options.len() > max {
        return Err(OptionsError::TooMany {
            max,
            found: options.len(),
        });
    }
    Ok(())
}

/// Deserialize the option at `index`, if present.
pub fn slot<T: DeserializeOwned>(options: &[Value], index: usize) -> Result<Option<T>, OptionsError> {
    let Some(value) = options.get(index) else {
        return Ok(None);
    };
    serde_json::from_value(value.clone())
        .map(Some)
        .map_err(|e| OptionsError::Invalid {
            index,
            reason: e.to_string(),
        })
}

/// Compile a user-supplied pattern option.
pub fn pattern(index: usize, source: &str) -> Result<regex::Regex, OptionsError> {
    regex::Regex::new(source).map_err(|e| OptionsError::Invalid {
        index,
        reason: format!("invalid pattern {source:?}: {e}"),
    })
}

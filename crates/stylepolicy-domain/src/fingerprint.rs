use sha2::{Digest, Sha256};
use stylepolicy_types::Diagnostic;

/// Compute a stable SHA-256 fingerprint for a diagnostic.
///
/// Identity fields:
/// - path (repo-relative)
/// - rule_id
/// - code
/// - line and column
/// - message
pub fn fingerprint_for_diagnostic(path: &str, diagnostic: &Diagnostic) -> String {
    let line = diagnostic.position.line.to_string();
    let column = diagnostic.position.column.to_string();
    let parts = [
        path,
        diagnostic.rule_id.as_str(),
        diagnostic.code.as_str(),
        line.as_str(),
        column.as_str(),
        diagnostic.message.as_str(),
    ];
    let canonical = parts.join("|");

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let digest = hasher.finalize();
    hex::encode(digest)
}

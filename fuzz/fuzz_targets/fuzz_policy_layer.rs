//! Fuzz target for policy layer parsing and resolution.
//!
//! Goal: parsing a JSON or TOML layer and resolving it against the built-in
//! registry should **never panic**. Configuration errors are fine.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_policy_layer
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use stylepolicy_domain::RuleRegistry;
use stylepolicy_settings::{Overrides, PolicyResolver};

fuzz_target!(|data: &[u8]| {
    if data.len() > 64 * 1024 {
        return;
    }
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let registry = RuleRegistry::builtin();
    let resolver = PolicyResolver::new(&registry);

    for parsed in [
        stylepolicy_settings::parse_layer_json("fuzz.json", text),
        stylepolicy_settings::parse_layer_toml("fuzz.toml", text),
    ] {
        if let Ok(doc) = parsed {
            let _ = resolver.resolve("fuzz", &doc, &Overrides::default());
        }
    }
});

//! Fuzz target for rule settings.
//!
//! Goal: arbitrary severity encodings and option payloads for every built-in
//! rule are either rejected at load time or accepted by the rule's visitor
//! factory. Nothing panics.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_rule_setting
//! ```

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use stylepolicy_domain::RuleRegistry;

#[derive(Arbitrary, Debug)]
struct SettingInput {
    rule_index: u8,
    /// JSON text for the raw setting, e.g. `["error", {"avoidEscape": true}]`.
    setting: String,
}

fuzz_target!(|input: SettingInput| {
    if input.setting.len() > 4096 {
        return;
    }
    let Ok(value) = serde_json::from_str::<serde_json::Value>(&input.setting) else {
        return;
    };

    let registry = RuleRegistry::builtin();
    let rules = registry.rules();
    let registered = &rules[input.rule_index as usize % rules.len()];

    let Ok(setting) = stylepolicy_settings::severity::resolve(&value) else {
        return;
    };
    let options = setting.options.unwrap_or_default();
    if registered.rule.validate_options(&options).is_ok() {
        assert!(registered.rule.create(&options).is_ok());
    }
});

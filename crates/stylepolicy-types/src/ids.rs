//! Stable identifiers for built-in rules and finding codes.
//!
//! `rule_id` is kebab-case (plugin rules are namespaced as `plugin/rule`).
//! `code` is a short snake_case discriminator.

// Rules
pub const RULE_STATEMENT_TERMINATOR: &str = "statement-terminator";
pub const RULE_QUOTE_STYLE: &str = "quote-style";
pub const RULE_NO_CONSOLE: &str = "no-console";
pub const RULE_NO_DEBUGGER: &str = "no-debugger";
pub const RULE_NO_UNDEF: &str = "no-undef";
pub const RULE_NO_GLOBAL_ASSIGN: &str = "no-global-assign";
pub const RULE_NO_UNUSED_VARS: &str = "no-unused-vars";
pub const RULE_NO_VAR: &str = "no-var";
pub const RULE_PREFER_CONST: &str = "prefer-const";
pub const RULE_PREFER_TEMPLATE: &str = "prefer-template";
pub const RULE_CAMELCASE: &str = "camelcase";
pub const RULE_EQEQEQ: &str = "eqeqeq";

// Codes: statement-terminator
pub const CODE_MISSING_TERMINATOR: &str = "missing_terminator";
pub const CODE_EXTRA_TERMINATOR: &str = "extra_terminator";

// Codes: quote-style
pub const CODE_WRONG_QUOTES: &str = "wrong_quotes";

// Codes: no-console
pub const CODE_CONSOLE_CALL: &str = "console_call";

// Codes: no-debugger
pub const CODE_DEBUGGER_STATEMENT: &str = "debugger_statement";

// Codes: no-undef
pub const CODE_UNDEFINED_IDENTIFIER: &str = "undefined_identifier";

// Codes: no-global-assign
pub const CODE_READONLY_GLOBAL: &str = "readonly_global";

// Codes: no-unused-vars
pub const CODE_UNUSED_VARIABLE: &str = "unused_variable";
pub const CODE_UNUSED_PARAMETER: &str = "unused_parameter";

// Codes: no-var
pub const CODE_VAR_DECLARATION: &str = "var_declaration";

// Codes: prefer-const
pub const CODE_NEVER_REASSIGNED: &str = "never_reassigned";

// Codes: prefer-template
pub const CODE_STRING_CONCATENATION: &str = "string_concatenation";

// Codes: camelcase
pub const CODE_NOT_CAMEL_CASE: &str = "not_camel_case";

// Codes: eqeqeq
pub const CODE_LOOSE_EQUALITY: &str = "loose_equality";

// Engine-level
pub const CODE_RULE_INTERNAL_ERROR: &str = "rule_internal_error";

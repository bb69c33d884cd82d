// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Python
//!
//! Helpers that turn manifest values into Python source fragments.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Literal, identifier and module-path rendering for Python providers

use serde_json::Value;

const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

/// Double-quoted Python string literal
pub fn string_literal(text: &str) -> String {
    // JSON string escapes are a subset of Python's
    Value::String(text.to_string()).to_string()
}

/// Python literal for a JSON value
pub fn literal(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(number) => number.to_string(),
        Value::String(text) => string_literal(text),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(literal).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(entries) => {
            let entries: Vec<String> = entries
                .iter()
                .map(|(key, value)| format!("{}: {}", string_literal(key), literal(value)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
    }
}

/// Python literal for a float, always with a decimal point
pub fn float_literal(value: f64) -> String {
    if value.is_nan() {
        "float(\"nan\")".to_string()
    } else if value.is_infinite() {
        let sign = if value < 0.0 { "-" } else { "" };
        format!("float(\"{}inf\")", sign)
    } else {
        literal(&Value::from(value))
    }
}

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

/// Valid ASCII Python identifier that is not a keyword
pub fn is_identifier(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_') && !is_keyword(word)
}

/// Map a resource name onto a Python identifier (`weather-tool` → `weather_tool`)
pub fn identifier(name: &str) -> String {
    let mut ident: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    if is_keyword(&ident) {
        ident.push('_');
    }
    ident
}

/// `maxOutputTokens` → `max_output_tokens`; snake_case input is unchanged
pub fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut previous_lower = false;
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            if previous_lower {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
            previous_lower = false;
        } else {
            out.push(c);
            previous_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        }
    }
    out
}

/// Dotted module path of a `.py` file (`some/nested/path/tool.py` → `some.nested.path.tool`)
///
/// Returns `None` for absolute paths, parent references and components that
/// are not identifiers.
pub fn module_path(file: &str) -> Option<String> {
    let file = file.strip_prefix("./").unwrap_or(file);
    let stem = file.strip_suffix(".py")?;
    if stem.is_empty() || stem.starts_with('/') {
        return None;
    }

    let parts: Vec<&str> = stem.split('/').collect();
    if parts.iter().all(|part| is_identifier(part)) {
        Some(parts.join("."))
    } else {
        None
    }
}

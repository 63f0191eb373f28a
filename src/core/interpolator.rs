// src/core/interpolator.rs

use crate::constants::PLACEHOLDER_DELIMITER;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::collections::HashMap;

lazy_static! {
    // Any `@@@KEY@@@` token. Keys never contain `@` or whitespace.
    static ref PLACEHOLDER_RE: Regex =
        Regex::new(r"@@@([^@\s]+)@@@").expect("placeholder regex is valid");
}

/// Builds the placeholder token for a key, e.g. `HOST_IP` -> `@@@HOST_IP@@@`.
pub fn placeholder(key: &str) -> String {
    format!("{0}{1}{0}", PLACEHOLDER_DELIMITER, key)
}

/// Replaces every `@@@KEY@@@` token whose key is present in `mapping` with its value.
///
/// Tokens naming unknown keys are left untouched. Substitution is a single pass over
/// the input: values inserted by one token are never re-scanned, so the result does
/// not depend on the iteration order of `mapping`.
pub fn substitute(text: &str, mapping: &HashMap<String, String>) -> String {
    PLACEHOLDER_RE
        .replace_all(text, |caps: &Captures<'_>| match caps.get(1) {
            Some(key) => match mapping.get(key.as_str()) {
                Some(value) => value.clone(),
                None => {
                    log::trace!("No value for placeholder '{}', leaving it as is.", key.as_str());
                    caps.get(0).map_or_else(String::new, |m| m.as_str().to_string())
                }
            },
            None => String::new(),
        })
        .into_owned()
}

/// Lists the distinct keys referenced by `text`, in order of first appearance.
pub fn referenced_keys(text: &str) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for caps in PLACEHOLDER_RE.captures_iter(text) {
        if let Some(key) = caps.get(1) {
            if !keys.iter().any(|k| k == key.as_str()) {
                keys.push(key.as_str().to_string());
            }
        }
    }
    keys
}

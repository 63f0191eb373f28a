// src/models.rs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use crate::constants::{AUX_PLUGIN_GROUP, WEB_PLUGIN_GROUP};

// --- CONFIGURATION VALUES ---

/// A single configuration value.
///
/// The variant is chosen by the caller and decides the partition the value is stored in:
/// `Text` values are eligible for placeholder substitution, everything else is not.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum ConfigValue {
    /// A string, stored in the replacement partition.
    Text(String),
    /// A boolean switch (e.g. `SIMULATION`).
    Flag(bool),
    /// A list of strings (e.g. `ALTERNATIVE_IPS`).
    List(Vec<String>),
}

impl ConfigValue {
    /// Returns `true` when the value belongs to the string partition.
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    /// Returns the inner string of a `Text` value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the inner boolean of a `Flag` value.
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the inner items of a `List` value.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{}", s),
            Self::Flag(b) => write!(f, "{}", b),
            Self::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<Vec<String>> for ConfigValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// One configuration layer (the global layer, or a target overlay).
///
/// Strings are kept apart from every other value so that the string partition can be
/// handed to the templater as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layer {
    pub strings: HashMap<String, String>,
    pub other: HashMap<String, ConfigValue>,
}

impl Layer {
    /// Looks a key up in both partitions.
    pub fn get(&self, key: &str) -> Option<ConfigValue> {
        if let Some(s) = self.strings.get(key) {
            return Some(ConfigValue::Text(s.clone()));
        }
        self.other.get(key).cloned()
    }

    /// Returns `true` if the key exists in either partition.
    pub fn contains(&self, key: &str) -> bool {
        self.strings.contains_key(key) || self.other.contains_key(key)
    }

    /// Writes a value into its partition. A key never lives in both partitions at once.
    pub fn insert(&mut self, key: &str, value: ConfigValue) {
        match value {
            ConfigValue::Text(s) => {
                self.other.remove(key);
                self.strings.insert(key.to_string(), s);
            }
            other => {
                self.strings.remove(key);
                self.other.insert(key.to_string(), other);
            }
        }
    }

    /// All entries of the layer, sorted by key.
    pub fn entries(&self) -> Vec<(String, ConfigValue)> {
        let mut entries: Vec<(String, ConfigValue)> = self
            .strings
            .iter()
            .map(|(k, v)| (k.clone(), ConfigValue::Text(v.clone())))
            .chain(self.other.iter().map(|(k, v)| (k.clone(), v.clone())))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

/// Identifies which layer a store operation reads from or writes to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    Global,
    Target(String),
}

impl Scope {
    /// Convenience constructor for a target scope.
    pub fn target(key: impl Into<String>) -> Self {
        Self::Target(key.into())
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::Target(key) => write!(f, "{}", key),
        }
    }
}

// --- RESOURCES ---

/// A named command template loaded from the resources profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEntry {
    pub name: String,
    pub template: String,
}

/// A resource whose template has been run through the templater.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ResolvedResource {
    pub name: String,
    pub value: String,
}

// --- RUN OPTIONS ---

/// The plugin group a run targets. Only `web` and `aux` are implemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginGroup {
    /// Targets are URLs.
    Web,
    /// Auxiliary run, targets are not interpreted.
    Aux,
}

impl PluginGroup {
    /// Parses a group name, returning `None` for groups without an implementation.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            WEB_PLUGIN_GROUP => Some(Self::Web),
            AUX_PLUGIN_GROUP => Some(Self::Aux),
            _ => None,
        }
    }
}

/// Options for a single run, as supplied by the caller (CLI flags or an options file).
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    #[serde(default, alias = "Force_Overwrite")]
    pub force_overwrite: bool,
    #[serde(default, alias = "Interactive")]
    pub interactive: bool,
    #[serde(default, alias = "Simulation")]
    pub simulation: bool,
    /// `(profile type, file)` pairs overriding the default profiles, applied in order.
    #[serde(default, alias = "Profiles")]
    pub profiles: Vec<(String, PathBuf)>,
    #[serde(default = "default_plugin_group", alias = "PluginGroup")]
    pub plugin_group: String,
    #[serde(default, alias = "Scope")]
    pub scope: Vec<String>,
}

fn default_plugin_group() -> String {
    WEB_PLUGIN_GROUP.to_string()
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            force_overwrite: false,
            interactive: false,
            simulation: false,
            profiles: Vec::new(),
            plugin_group: default_plugin_group(),
            scope: Vec::new(),
        }
    }
}

// src/core/config_store.rs

//! # Config Store
//!
//! The layered key/value store behind every setting of a run. It holds one global
//! layer and one overlay per target. An overlay is a snapshot of the global layer taken
//! the first time its target is selected; later global writes never reach it.
//!
//! Every operation has a scope-explicit form (`get_in`, `set_in`, ...). The plain forms
//! (`get`, `set`, ...) act on the current scope, which is switched with
//! [`ConfigStore::select_target`] and [`ConfigStore::select_global`].

use crate::models::{ConfigValue, Layer, Scope};
use crate::system::error_sink::ErrorSink;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Recoverable: the current unit of work should be abandoned, the run goes on.
    #[error("The configuration item: '{key}' does not exist!")]
    MissingKey { key: String },
    #[error("The configuration item: '{key}' is not {expected}.")]
    TypeMismatch { key: String, expected: &'static str },
    #[error("No configuration exists for target '{target}'.")]
    UnknownTarget { target: String },
}

impl StoreError {
    /// `true` for errors that only abort the current unit of work.
    pub fn is_unit_abort(&self) -> bool {
        matches!(self, Self::MissingKey { .. })
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

pub struct ConfigStore {
    global: Layer,
    targets: HashMap<String, Layer>,
    /// Known targets, in creation order.
    target_order: Vec<String>,
    current: Scope,
    errors: Rc<dyn ErrorSink>,
}

impl fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigStore")
            .field("current", &self.current)
            .field("targets", &self.target_order)
            .finish_non_exhaustive()
    }
}

impl ConfigStore {
    /// Creates an empty store whose current scope is the global one.
    pub fn new(errors: Rc<dyn ErrorSink>) -> Self {
        Self {
            global: Layer::default(),
            targets: HashMap::new(),
            target_order: Vec::new(),
            current: Scope::Global,
            errors,
        }
    }

    // --- SCOPES ---

    pub fn current_scope(&self) -> &Scope {
        &self.current
    }

    /// The key of the current target, or `None` while the global scope is current.
    pub fn current_target(&self) -> Option<&str> {
        match &self.current {
            Scope::Global => None,
            Scope::Target(key) => Some(key),
        }
    }

    /// Known targets, in the order they were first selected.
    pub fn targets(&self) -> &[String] {
        &self.target_order
    }

    /// Makes `target` the current scope, creating its overlay from a snapshot of the
    /// global layer if it does not exist yet. Always records `TARGET = target`.
    pub fn select_target(&mut self, target: &str) {
        if !self.targets.contains_key(target) {
            log::debug!("Creating configuration overlay for target '{}'.", target);
            self.targets.insert(target.to_string(), self.global.clone());
            self.target_order.push(target.to_string());
        }
        self.current = Scope::target(target);
        self.set("TARGET", target);
    }

    /// Makes the global layer current again.
    pub fn select_global(&mut self) {
        self.current = Scope::Global;
    }

    /// Drops every target overlay. The global layer becomes current.
    pub fn reset_targets(&mut self) {
        self.targets.clear();
        self.target_order.clear();
        self.current = Scope::Global;
    }

    fn layer(&self, scope: &Scope) -> StoreResult<&Layer> {
        match scope {
            Scope::Global => Ok(&self.global),
            Scope::Target(key) => self.targets.get(key).ok_or_else(|| StoreError::UnknownTarget {
                target: key.clone(),
            }),
        }
    }

    fn layer_mut(&mut self, scope: &Scope) -> StoreResult<&mut Layer> {
        match scope {
            Scope::Global => Ok(&mut self.global),
            Scope::Target(key) => {
                self.targets
                    .get_mut(key)
                    .ok_or_else(|| StoreError::UnknownTarget {
                        target: key.clone(),
                    })
            }
        }
    }

    // --- SCOPE-EXPLICIT ACCESS ---

    /// Reads `key` from `scope`. A missing key is reported to the error sink.
    pub fn get_in(&self, scope: &Scope, key: &str) -> StoreResult<ConfigValue> {
        match self.layer(scope)?.get(key) {
            Some(value) => Ok(value),
            None => {
                let error = StoreError::MissingKey {
                    key: key.to_string(),
                };
                self.errors.report(&error.to_string());
                Err(error)
            }
        }
    }

    /// Writes `key` into `scope`. The value's variant decides its partition.
    pub fn set_in(
        &mut self,
        scope: &Scope,
        key: &str,
        value: impl Into<ConfigValue>,
    ) -> StoreResult<()> {
        let value = value.into();
        log::trace!("[{}] {} = {}", scope, key, value);
        self.layer_mut(scope)?.insert(key, value);
        Ok(())
    }

    pub fn is_set_in(&self, scope: &Scope, key: &str) -> bool {
        self.layer(scope).is_ok_and(|layer| layer.contains(key))
    }

    /// The string partition of `scope`, used as the templating source.
    pub fn replacement_mapping_in(&self, scope: &Scope) -> StoreResult<&HashMap<String, String>> {
        Ok(&self.layer(scope)?.strings)
    }

    // --- CURRENT-SCOPE ACCESS ---

    /// Reads `key` from the current scope, searching both partitions.
    pub fn get(&self, key: &str) -> StoreResult<ConfigValue> {
        self.get_in(&self.current, key)
    }

    /// Writes `key` into the current scope.
    pub fn set(&mut self, key: &str, value: impl Into<ConfigValue>) {
        let scope = self.current.clone();
        // The current scope always has a layer: targets are created before selection.
        if let Err(e) = self.set_in(&scope, key, value) {
            log::error!("Dropping write of '{}': {}", key, e);
        }
    }

    /// Non-failing existence check in the current scope.
    pub fn is_set(&self, key: &str) -> bool {
        self.is_set_in(&self.current, key)
    }

    /// The string partition of the current scope.
    pub fn replacement_mapping(&self) -> &HashMap<String, String> {
        match &self.current {
            Scope::Global => &self.global.strings,
            Scope::Target(key) => match self.targets.get(key) {
                Some(layer) => &layer.strings,
                None => &self.global.strings,
            },
        }
    }

    /// Reads a string value from the current scope.
    pub fn get_str(&self, key: &str) -> StoreResult<String> {
        match self.get(key)? {
            ConfigValue::Text(s) => Ok(s),
            _ => Err(StoreError::TypeMismatch {
                key: key.to_string(),
                expected: "a string",
            }),
        }
    }

    /// Reads a boolean value from the current scope.
    pub fn get_flag(&self, key: &str) -> StoreResult<bool> {
        self.get(key)?
            .as_flag()
            .ok_or_else(|| StoreError::TypeMismatch {
                key: key.to_string(),
                expected: "a flag",
            })
    }

    /// Reads a list value from the current scope.
    pub fn get_list(&self, key: &str) -> StoreResult<Vec<String>> {
        match self.get(key)? {
            ConfigValue::List(items) => Ok(items),
            _ => Err(StoreError::TypeMismatch {
                key: key.to_string(),
                expected: "a list",
            }),
        }
    }

    /// Reads several keys at once, failing on the first missing one.
    pub fn get_as_list(&self, keys: &[&str]) -> StoreResult<Vec<ConfigValue>> {
        keys.iter().map(|key| self.get(key)).collect()
    }

    /// Splits a comma-separated header list (e.g. `BAD_HEADERS`).
    pub fn get_header_list(&self, key: &str) -> StoreResult<Vec<String>> {
        Ok(self.get_str(key)?.split(',').map(str::to_string).collect())
    }

    /// Reads a path setting; with `partial`, only its last component.
    pub fn get_file_name(&self, key: &str, partial: bool) -> StoreResult<String> {
        let path = self.get_str(key)?;
        if partial {
            return Ok(path.rsplit('/').next().unwrap_or_default().to_string());
        }
        Ok(path)
    }

    /// Collects the distinct values of `key` over every known target, in target
    /// creation order. The current scope is left untouched.
    pub fn get_all_across_targets(&self, key: &str) -> StoreResult<Vec<ConfigValue>> {
        let mut matches: Vec<ConfigValue> = Vec::new();
        for target in &self.target_order {
            let value = self.get_in(&Scope::target(target.as_str()), key)?;
            if !matches.contains(&value) {
                matches.push(value);
            }
        }
        Ok(matches)
    }

    /// Every entry of `scope`, sorted by key.
    pub fn entries_in(&self, scope: &Scope) -> StoreResult<Vec<(String, ConfigValue)>> {
        self.layer(scope).map(Layer::entries)
    }

    /// Every entry of the current scope, sorted by key.
    pub fn entries(&self) -> Vec<(String, ConfigValue)> {
        self.entries_in(&self.current).unwrap_or_default()
    }

    /// Logs every entry of the current scope at debug level.
    pub fn show(&self) {
        log::debug!("Configuration settings ({})", self.current);
        for (key, value) in self.entries() {
            log::debug!("{} => {}", key, value);
        }
    }
}

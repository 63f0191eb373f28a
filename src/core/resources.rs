// src/core/resources.rs

use crate::core::interpolator;
use crate::models::{ResolvedResource, ResourceEntry};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Command templates and links grouped by category, as read from the resources profile.
///
/// Categories are case-insensitive: they are stored and looked up uppercased.
#[derive(Debug, Clone, Default)]
pub struct ResourceCatalog {
    source: PathBuf,
    entries: HashMap<String, Vec<ResourceEntry>>,
}

impl ResourceCatalog {
    pub fn new(source: &Path) -> Self {
        Self {
            source: source.to_path_buf(),
            entries: HashMap::new(),
        }
    }

    /// The file this catalog was loaded from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Appends an entry to a category, keeping file order.
    pub fn add(&mut self, category: &str, entry: ResourceEntry) {
        self.entries
            .entry(category.to_uppercase())
            .or_default()
            .push(entry);
    }

    pub fn is_resource_type(&self, category: &str) -> bool {
        self.entries.contains_key(&category.to_uppercase())
    }

    /// Category names, sorted.
    pub fn categories(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Entries of a category, templates untouched.
    pub fn raw_resources(&self, category: &str) -> &[ResourceEntry] {
        self.entries
            .get(&category.to_uppercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Resolves every template of `category` against `mapping`.
    ///
    /// An undefined category is not an error: it is logged and yields no resources.
    pub fn resolve(
        &self,
        category: &str,
        mapping: &HashMap<String, String>,
    ) -> Vec<ResolvedResource> {
        let category = category.to_uppercase();
        let Some(entries) = self.entries.get(&category) else {
            log::warn!(
                "The resource type: '{}' is not defined on '{}'",
                category,
                self.source.display()
            );
            return Vec::new();
        };

        entries
            .iter()
            .map(|entry| {
                let value = interpolator::substitute(&entry.template, mapping);
                let unresolved = interpolator::referenced_keys(&value);
                if !unresolved.is_empty() {
                    log::debug!(
                        "Resource '{}/{}' still references unset keys: {}",
                        category,
                        entry.name,
                        unresolved.join(", ")
                    );
                }
                ResolvedResource {
                    name: entry.name.clone(),
                    value,
                }
            })
            .collect()
    }

    /// Resolves several categories and concatenates the results in the given order.
    pub fn resolve_list(
        &self,
        categories: &[&str],
        mapping: &HashMap<String, String>,
    ) -> Vec<ResolvedResource> {
        categories
            .iter()
            .flat_map(|category| self.resolve(category, mapping))
            .collect()
    }
}

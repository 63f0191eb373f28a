// src/system/plugins.rs

use crate::constants::COMMENT_PREFIX;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PluginError {
    #[error("Could not read plugin order file '{path}': {source}")]
    OrderFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not list plugins for group '{group}' in '{path}': {source}")]
    PluginDir {
        group: String,
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// The plugin subsystem as seen by the configuration: a list of groups and a load
/// order per group.
pub trait PluginCatalog {
    /// Loads the test groups used by web plugins. Called before profiles are read.
    fn load_web_test_groups(&mut self) -> Result<(), PluginError>;

    /// All plugin groups known to the catalog.
    fn groups(&self) -> Vec<String>;

    /// Loads the order of `group` from a plugin order profile.
    fn load_order_from_file(&mut self, group: &str, path: &Path) -> Result<(), PluginError>;

    /// Loads the order of `group` from the plugins installed on disk.
    fn load_order_from_filesystem(&mut self, group: &str) -> Result<(), PluginError>;

    /// The load order of `group`, if one was loaded.
    fn load_order(&self, group: &str) -> Option<&[String]>;
}

/// Catalog backed by plain files: order profiles list one plugin per line, and plugins
/// installed on disk live in `<plugins_dir>/<group>/`.
#[derive(Debug, Clone)]
pub struct DirectoryPluginCatalog {
    plugins_dir: PathBuf,
    groups: Vec<String>,
    orders: HashMap<String, Vec<String>>,
}

impl DirectoryPluginCatalog {
    pub fn new(plugins_dir: impl Into<PathBuf>, groups: &[&str]) -> Self {
        Self {
            plugins_dir: plugins_dir.into(),
            groups: groups.iter().map(|g| g.to_string()).collect(),
            orders: HashMap::new(),
        }
    }
}

impl PluginCatalog for DirectoryPluginCatalog {
    /// Does nothing here: web test groups are the subdirectories of `plugins/web/`,
    /// so there is nothing to load ahead of the profiles.
    fn load_web_test_groups(&mut self) -> Result<(), PluginError> {
        log::debug!("Web test groups are implied by the plugin directory layout.");
        Ok(())
    }

    fn groups(&self) -> Vec<String> {
        self.groups.clone()
    }

    fn load_order_from_file(&mut self, group: &str, path: &Path) -> Result<(), PluginError> {
        log::info!("Loading plugin order for '{}' from: {}", group, path.display());
        let content = fs::read_to_string(path).map_err(|e| PluginError::OrderFile {
            path: path.display().to_string(),
            source: e,
        })?;
        let order = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with(COMMENT_PREFIX))
            .map(str::to_string)
            .collect();
        self.orders.insert(group.to_string(), order);
        Ok(())
    }

    fn load_order_from_filesystem(&mut self, group: &str) -> Result<(), PluginError> {
        let group_dir = self.plugins_dir.join(group);
        if !group_dir.is_dir() {
            log::debug!("No plugin directory for group '{}'.", group);
            self.orders.insert(group.to_string(), Vec::new());
            return Ok(());
        }
        let to_error = |e: std::io::Error| PluginError::PluginDir {
            group: group.to_string(),
            path: group_dir.display().to_string(),
            source: e,
        };
        let mut order = Vec::new();
        for entry in fs::read_dir(&group_dir).map_err(to_error)? {
            let entry = entry.map_err(to_error)?;
            let name = entry.file_name().to_string_lossy().into_owned();
            // Hidden entries (e.g. `.gitkeep`) are not plugins.
            if !name.starts_with('.') {
                order.push(name);
            }
        }
        order.sort();
        self.orders.insert(group.to_string(), order);
        Ok(())
    }

    fn load_order(&self, group: &str) -> Option<&[String]> {
        self.orders.get(group).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_file_skips_comments_and_blank_lines() {
        let tmp = tempfile::tempdir().unwrap();
        let order_file = tmp.path().join("web.cfg");
        fs::write(&order_file, "# order\nSpiders\n\n  Robots  \n").unwrap();

        let mut catalog = DirectoryPluginCatalog::new(tmp.path(), &["web"]);
        catalog.load_order_from_file("web", &order_file).unwrap();
        assert_eq!(
            catalog.load_order("web"),
            Some(&["Spiders".to_string(), "Robots".to_string()][..])
        );
    }

    #[test]
    fn test_order_from_filesystem_is_sorted() {
        let tmp = tempfile::tempdir().unwrap();
        let group_dir = tmp.path().join("net");
        fs::create_dir_all(&group_dir).unwrap();
        fs::write(group_dir.join("b_scan.py"), "").unwrap();
        fs::write(group_dir.join("a_ping.py"), "").unwrap();
        fs::write(group_dir.join(".gitkeep"), "").unwrap();

        let mut catalog = DirectoryPluginCatalog::new(tmp.path(), &["net"]);
        catalog.load_order_from_filesystem("net").unwrap();
        assert_eq!(
            catalog.load_order("net"),
            Some(&["a_ping.py".to_string(), "b_scan.py".to_string()][..])
        );
    }

    #[test]
    fn test_web_test_groups_need_no_loading() {
        let mut catalog = DirectoryPluginCatalog::new("/nonexistent", &["web"]);
        assert!(catalog.load_web_test_groups().is_ok());
        assert_eq!(catalog.groups(), vec!["web"]);
        assert_eq!(catalog.load_order("web"), None);
    }

    #[test]
    fn test_missing_order_file_is_an_error() {
        let mut catalog = DirectoryPluginCatalog::new("/nonexistent", &["web"]);
        let result = catalog.load_order_from_file("web", Path::new("/nonexistent/web.cfg"));
        assert!(matches!(result, Err(PluginError::OrderFile { .. })));
    }
}

// src/system/filesystem.rs

use std::fs;
use std::io;
use std::path::Path;

/// Creates output directories on behalf of the path deriver.
pub trait DirectoryCreator {
    /// Creates `path` and every missing parent. Existing directories are not an error.
    fn create_missing_dirs(&self, path: &Path) -> io::Result<()>;
}

/// Creates directories on the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalDirectories;

impl DirectoryCreator for LocalDirectories {
    fn create_missing_dirs(&self, path: &Path) -> io::Result<()> {
        if path.is_dir() {
            return Ok(());
        }
        log::debug!("Creating missing directories: {}", path.display());
        fs::create_dir_all(path)
    }
}

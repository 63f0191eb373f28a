//! # Config Loader
//!
//! Reads the two line-oriented profile formats used by the framework:
//!
//! - **Config profiles** (`Key: Value`), loaded straight into a [`ConfigStore`]. Any
//!   `@@@FRAMEWORK_DIR@@@` placeholder in a value is replaced with the install root.
//!   Loading a second file on top of the first overwrites keys in place.
//! - **Resource profiles** (`TYPE_____Name_____Template`), loaded into a
//!   [`ResourceCatalog`].
//!
//! Lines starting with `#` are comments in both formats. Any line that does not parse is
//! fatal, and the error names the file and the line.
use crate::{
    constants::{COMMENT_PREFIX, FRAMEWORK_DIR_KEY, RESOURCE_FIELD_COUNT, RESOURCE_FIELD_DELIMITER},
    core::{config_store::ConfigStore, interpolator, resources::ResourceCatalog},
    models::ResourceEntry,
};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Could not read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Problem in config file: '{path}' -> Cannot parse line {line_number}: {line}")]
    MalformedConfigLine {
        path: String,
        line_number: usize,
        line: String,
    },
    #[error(
        "{path} ERROR: The delimiter is incorrect in line {line_number}: {fields:?}"
    )]
    MalformedResourceLine {
        path: String,
        line_number: usize,
        fields: Vec<String>,
    },
}

fn read_profile(path: &Path) -> Result<String, ProfileError> {
    fs::read_to_string(path).map_err(|e| ProfileError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

fn is_skippable(line: &str) -> bool {
    let line = line.trim_start();
    line.is_empty() || line.starts_with(COMMENT_PREFIX)
}

/// Splits a `Key: Value` line. The key is everything before the first colon; the value
/// is the rest of the line, trimmed, so `KEY:value` and `KEY: value` read the same.
/// Returns `None` if there is no colon or the key is empty.
pub fn parse_config_line(line: &str) -> Option<(&str, &str)> {
    let (key, rest) = line.split_once(':')?;
    if key.is_empty() {
        return None;
    }
    Some((key, rest.trim()))
}

/// Loads a config profile into the current scope of `store`.
///
/// Returns the number of settings read.
pub fn load_config_file(
    path: &Path,
    root_dir: &Path,
    store: &mut ConfigStore,
) -> Result<usize, ProfileError> {
    log::info!("Loading config from: {} ..", path.display());
    let content = read_profile(path)?;

    let root_mapping = HashMap::from([(
        FRAMEWORK_DIR_KEY.to_string(),
        root_dir.to_string_lossy().into_owned(),
    )]);

    let mut loaded = 0;
    for (index, line) in content.lines().enumerate() {
        if is_skippable(line) {
            continue;
        }
        let (key, value) =
            parse_config_line(line).ok_or_else(|| ProfileError::MalformedConfigLine {
                path: path.display().to_string(),
                line_number: index + 1,
                line: line.to_string(),
            })?;
        store.set(key, interpolator::substitute(value, &root_mapping));
        loaded += 1;
    }

    log::debug!("{} settings loaded from '{}'.", loaded, path.display());
    Ok(loaded)
}

/// Splits a resource line into `(category, entry)`. The category is uppercased.
pub fn parse_resource_line(line: &str) -> Result<(String, ResourceEntry), Vec<String>> {
    let fields: Vec<&str> = line.split(RESOURCE_FIELD_DELIMITER).collect();
    match fields.as_slice() {
        [category, name, template] => Ok((
            category.to_uppercase(),
            ResourceEntry {
                name: name.to_string(),
                template: template.to_string(),
            },
        )),
        _ => Err(fields.iter().map(|f| f.to_string()).collect()),
    }
}

/// Loads a resources profile. A single malformed line fails the whole load.
pub fn load_resource_file(path: &Path) -> Result<ResourceCatalog, ProfileError> {
    log::info!("Loading resources from: {} ..", path.display());
    let content = read_profile(path)?;

    let mut catalog = ResourceCatalog::new(path);
    for (index, line) in content.lines().enumerate() {
        if is_skippable(line) {
            continue;
        }
        match parse_resource_line(line) {
            Ok((category, entry)) => catalog.add(&category, entry),
            Err(fields) => {
                log::error!(
                    "{} ERROR: The delimiter is incorrect in this line: {:?} (expected {} fields)",
                    path.display(),
                    fields,
                    RESOURCE_FIELD_COUNT
                );
                return Err(ProfileError::MalformedResourceLine {
                    path: path.display().to_string(),
                    line_number: index + 1,
                    fields,
                });
            }
        }
    }

    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConfigValue;
    use crate::system::error_sink::LogSink;
    use std::rc::Rc;

    fn new_store() -> ConfigStore {
        ConfigStore::new(Rc::new(LogSink::new()))
    }

    fn write_file(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_parse_config_line() {
        assert_eq!(parse_config_line("OUTPUT_PATH: /out"), Some(("OUTPUT_PATH", "/out")));
        // Colons inside the value survive.
        assert_eq!(
            parse_config_line("PROXY: http://127.0.0.1:8080  "),
            Some(("PROXY", "http://127.0.0.1:8080"))
        );
        assert_eq!(parse_config_line("EMPTY:"), Some(("EMPTY", "")));
        assert_eq!(parse_config_line("no delimiter here"), None);
        assert_eq!(parse_config_line(": value"), None);
        assert_eq!(parse_config_line("KEY:value"), Some(("KEY", "value")));
    }

    #[test]
    fn test_key_with_spaces_and_indented_comment() {
        assert_eq!(
            parse_config_line("Tool Path: /opt/x"),
            Some(("Tool Path", "/opt/x"))
        );

        let tmp = tempfile::tempdir().unwrap();
        let path = write_file(
            tmp.path(),
            "tools.cfg",
            "  # note: x\nTool Path: /opt/x\n",
        );
        let mut store = new_store();
        let loaded = load_config_file(&path, Path::new("/opt/fw"), &mut store).unwrap();

        assert_eq!(loaded, 1);
        assert_eq!(store.get_str("Tool Path").unwrap(), "/opt/x");
        assert!(!store.is_set("  # note"));
    }

    #[test]
    fn test_load_config_file_substitutes_root_and_skips_comments() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_file(
            tmp.path(),
            "framework_config.cfg",
            "# comment: ignored\n\nOUTPUT_PATH: @@@FRAMEWORK_DIR@@@/out\nUSER_AGENT: Mozilla/5.0 (X11)\n",
        );
        let mut store = new_store();
        let loaded = load_config_file(&path, Path::new("/opt/fw"), &mut store).unwrap();

        assert_eq!(loaded, 2);
        assert_eq!(store.get_str("OUTPUT_PATH").unwrap(), "/opt/fw/out");
        assert_eq!(store.get_str("USER_AGENT").unwrap(), "Mozilla/5.0 (X11)");
        assert!(!store.is_set("# comment"));
    }

    #[test]
    fn test_later_profile_overlays_earlier_one() {
        let tmp = tempfile::tempdir().unwrap();
        let defaults = write_file(tmp.path(), "a.cfg", "A: 1\nB: 2\n");
        let general = write_file(tmp.path(), "b.cfg", "B: 3\n");
        let mut store = new_store();
        load_config_file(&defaults, tmp.path(), &mut store).unwrap();
        load_config_file(&general, tmp.path(), &mut store).unwrap();

        assert_eq!(store.get("A").unwrap(), ConfigValue::from("1"));
        assert_eq!(store.get("B").unwrap(), ConfigValue::from("3"));
    }

    #[test]
    fn test_malformed_config_line_names_file_and_line() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_file(tmp.path(), "bad.cfg", "A: 1\nthis line is broken\n");
        let err = load_config_file(&path, tmp.path(), &mut new_store()).unwrap_err();

        match &err {
            ProfileError::MalformedConfigLine { line_number, line, .. } => {
                assert_eq!(*line_number, 2);
                assert_eq!(line, "this line is broken");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let message = err.to_string();
        assert!(message.contains("bad.cfg"));
        assert!(message.contains("this line is broken"));
    }

    #[test]
    fn test_missing_config_file_is_io_error() {
        let err = load_config_file(Path::new("/nonexistent/x.cfg"), Path::new("/"), &mut new_store())
            .unwrap_err();
        assert!(matches!(err, ProfileError::Io { .. }));
    }

    #[test]
    fn test_parse_resource_line() {
        let (category, entry) =
            parse_resource_line("SearchEngines_____Google_____https://google.com/?q=@@@HOST_NAME@@@")
                .unwrap();
        assert_eq!(category, "SEARCHENGINES");
        assert_eq!(entry.name, "Google");
        assert_eq!(entry.template, "https://google.com/?q=@@@HOST_NAME@@@");

        let fields = parse_resource_line("A_____B").unwrap_err();
        assert_eq!(fields, vec!["A", "B"]);
        assert!(parse_resource_line("A_____B_____C_____D").is_err());
    }

    #[test]
    fn test_load_resource_file_keeps_order_per_category() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_file(
            tmp.path(),
            "resources.cfg",
            "# Type_____Name_____Resource\nrobots_____First_____one\nROBOTS_____Second_____two\nother_____X_____x\n",
        );
        let catalog = load_resource_file(&path).unwrap();
        let names: Vec<_> = catalog
            .raw_resources("ROBOTS")
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["First", "Second"]);
        assert!(catalog.is_resource_type("OTHER"));
    }

    #[test]
    fn test_malformed_resource_line_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_file(tmp.path(), "resources.cfg", "A_____ok_____x\nbroken_____line\n");
        let err = load_resource_file(&path).unwrap_err();
        match err {
            ProfileError::MalformedResourceLine { line_number, fields, .. } => {
                assert_eq!(line_number, 2);
                assert_eq!(fields, vec!["broken", "line"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

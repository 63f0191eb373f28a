// src/core/paths.rs

//! # Paths
//!
//! Computes the on-disk layout of a run and registers every path in the store:
//!
//! ```text
//! OUTPUT_PATH/
//! ├── db/                          global databases (RUN_DB, ERROR_DB, ...)
//! ├── <url id>.html                HTML_DETAILED_REPORT_PATH
//! └── <ip>/                        HOST_OUTPUT
//!     └── <port>/                  PORT_OUTPUT
//!         └── <url id>/            URL_OUTPUT, HTTP databases and transaction logs
//!             └── partial/         PARTIAL_URL_OUTPUT_PATH
//! ```
//!
//! All path settings are plain strings so resource templates can reference them.

use crate::core::config_store::{ConfigStore, StoreError};
use crate::constants::FRAMEWORK_DIR_KEY;
use crate::models::ConfigValue;
use crate::system::filesystem::DirectoryCreator;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PathError {
    #[error("Could not expand path '{value}': {message}")]
    Expansion { value: String, message: String },
    #[error("Could not create output directory '{path}': {source}")]
    DirectoryCreation {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Joins `base` and `child` with exactly one `/` between them.
fn join(base: &str, child: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), child)
}

/// Expands `~` and environment variables in a user-supplied path.
pub fn expand_path(value: &str) -> Result<String, PathError> {
    shellexpand::full(value)
        .map(|expanded| expanded.into_owned())
        .map_err(|e| PathError::Expansion {
            value: value.to_string(),
            message: e.to_string(),
        })
}

/// The directory name used for a URL: `/` becomes `_` and `:` is dropped.
///
/// `http://example.com:8080/app` gives `http__example.com8080_app`.
pub fn url_output_id(url: &str) -> String {
    url.replace('/', "_").replace(':', "")
}

/// Settings that depend only on the framework config and `OUTPUT_PATH`. Written into the
/// current scope, which is the global one during setup.
pub fn derive_global_settings(store: &mut ConfigStore, root_dir: &Path) -> Result<(), PathError> {
    let root = dunce::simplified(root_dir).to_string_lossy().into_owned();
    store.set(FRAMEWORK_DIR_KEY, root);

    let output_path = expand_path(&store.get_str("OUTPUT_PATH")?)?;
    let output_path = output_path.trim_end_matches('/').to_string();
    store.set("OUTPUT_PATH", output_path.as_str());

    let db_path = join(&output_path, "db/");
    for (key, file) in [
        ("RUN_DB", "runs.txt"),
        ("ERROR_DB", "errors.txt"),
        ("SEED_DB", "seed.txt"),
        ("SUMMARY_HTMLID_DB", "htmlid.txt"),
        ("DEBUG_DB", "debug.txt"),
        ("PLUGIN_REPORT_REGISTER", "plugin_report_register.txt"),
        ("DETAILED_REPORT_REGISTER", "detailed_report_register.txt"),
    ] {
        store.set(key, format!("{db_path}{file}"));
    }

    // Shell-friendly variants for tools that cannot take spaces in an argument.
    let user_agent = store.get_str("USER_AGENT")?;
    store.set("USER_AGENT_#", user_agent.replace(' ', "#"));
    store.set(
        "SHORT_USER_AGENT",
        user_agent.split(' ').next().unwrap_or_default(),
    );

    let html_report = store.get_str("HTML_REPORT")?;
    store.set("HTML_REPORT_PATH", join(&output_path, &html_report));
    Ok(())
}

/// Registers the HTTP databases and transaction logs rooted at `db_path`.
///
/// `db_path` is used as a prefix and is expected to end with `/`.
pub fn init_http_dbs(store: &mut ConfigStore, db_path: &str) {
    log::debug!("HTTP databases under: {}", db_path);
    for (key, file) in [
        ("TRANSACTION_LOG_TXT", "transaction_log.txt"),
        ("TRANSACTION_LOG_HTML", "transaction_log.html"),
        ("TRANSACTION_LOG_TRANSACTIONS", "transactions/"),
        ("TRANSACTION_LOG_REQUESTS", "transactions/requests/"),
        ("TRANSACTION_LOG_RESPONSE_HEADERS", "transactions/response_headers/"),
        ("TRANSACTION_LOG_RESPONSE_BODIES", "transactions/response_bodies/"),
        ("TRANSACTION_LOG_FILES", "files/"),
    ] {
        store.set(key, format!("{db_path}{file}"));
    }

    // Vetted URLs were confirmed to exist; potential ones were only seen.
    let url_db_path = format!("{db_path}db/");
    store.set("HTMLID_DB", format!("{url_db_path}htmlid.txt"));
    for (category, file) in [
        ("ALL", "urls.txt"),
        ("ERROR", "error_urls.txt"),
        ("FILE", "file_urls.txt"),
        ("IMAGE", "image_urls.txt"),
        ("FUZZABLE", "fuzzable_urls.txt"),
        ("EXTERNAL", "external_urls.txt"),
    ] {
        let vetted = if category == "ALL" { "all_urls.txt" } else { file };
        store.set(&format!("{category}_URLS_DB"), format!("{url_db_path}{vetted}"));
        store.set(
            &format!("POTENTIAL_{category}_URLS_DB"),
            format!("{url_db_path}potential_{file}"),
        );
    }
}

/// Derives the output tree of the URL target that is current in `store`. Needs
/// `TARGET_URL`, `HOST_IP` and `PORT_NUMBER` to be set already.
///
/// Unless `SIMULATION` is on, the URL output directory and its parents are created.
pub fn derive_output_settings(
    store: &mut ConfigStore,
    dirs: &dyn DirectoryCreator,
) -> Result<(), PathError> {
    let output_path = store.get_str("OUTPUT_PATH")?;
    let target_url = store.get_str("TARGET_URL")?;

    let host_output = join(&output_path, &store.get_str("HOST_IP")?);
    let port_output = join(&host_output, &store.get_str("PORT_NUMBER")?);
    let id = url_output_id(&target_url);
    let url_output = format!("{}/", join(&port_output, &id));
    let partial_output = format!("{url_output}partial");

    store.set("HOST_OUTPUT", host_output);
    store.set("PORT_OUTPUT", port_output);
    store.set("URL_OUTPUT", url_output.as_str());
    store.set(
        "PARTIAL_REPORT_REGISTER",
        join(&partial_output, "partial_report_register.txt"),
    );
    store.set("PARTIAL_URL_OUTPUT_PATH", partial_output);

    // Per-URL reports sit next to each other so they share browser storage.
    store.set(
        "HTML_DETAILED_REPORT_PATH",
        join(&output_path, &format!("{id}.html")),
    );
    store.set("URL_REPORT_LINK_PATH", join(&output_path, "index.html"));

    if is_simulation(store) {
        log::info!("Simulation: not creating '{}'.", url_output);
    } else {
        dirs.create_missing_dirs(Path::new(&url_output))
            .map_err(|e| PathError::DirectoryCreation {
                path: url_output.clone(),
                source: e,
            })?;
    }

    init_http_dbs(store, &url_output);
    Ok(())
}

fn is_simulation(store: &ConfigStore) -> bool {
    store.is_set("SIMULATION") && matches!(store.get("SIMULATION"), Ok(ConfigValue::Flag(true)))
}

/// `value` relative to `OUTPUT_PATH`, for links inside reports. Values outside the output
/// tree are returned unchanged.
pub fn partial_path(output_path: &str, value: &str) -> String {
    match Path::new(value).strip_prefix(output_path) {
        Ok(relative) => relative.to_string_lossy().into_owned(),
        Err(_) => value.to_string(),
    }
}

// src/core/config_resolver.rs

//! # Configuration
//!
//! Ties the store, the profile loader and the derivers together. A run goes through:
//!
//! 1. [`Configuration::load`]: framework defaults into the global layer.
//! 2. [`Configuration::process_options`]: run-mode flags, profiles, global settings, then
//!    one overlay per target (`web`) or the single `aux` overlay.
//!
//! After that, resources are resolved on demand against the current target.

use crate::constants::{
    AUX_TARGET, DEFAULT_PROFILES, FRAMEWORK_CONFIG_FILE, GENERAL_PROFILE, RESOURCES_PROFILE,
};
use crate::core::config_loader::{self, ProfileError};
use crate::core::config_store::{ConfigStore, StoreError, StoreResult};
use crate::core::paths::{self, PathError};
use crate::core::resources::ResourceCatalog;
use crate::core::target_resolver::{self, TargetError};
use crate::models::{PluginGroup, ResolvedResource, ResourceEntry, RunOptions, Scope};
use crate::system::error_sink::ErrorSink;
use crate::system::filesystem::DirectoryCreator;
use crate::system::host_resolver::HostResolver;
use crate::system::plugins::{PluginCatalog, PluginError};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SetupError {
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Target(#[from] TargetError),
    #[error(transparent)]
    Path(#[from] PathError),
    #[error(transparent)]
    Plugin(#[from] PluginError),
    #[error("Sorry, plugin group '{group}' is not implemented yet!")]
    UnsupportedPluginGroup { group: String },
    #[error("No targets given: a '{group}' run needs at least one target URL.")]
    EmptyScope { group: String },
    #[error("No '{kind}' profile configured and none given.")]
    MissingProfile { kind: String },
}

type SetupResult<T> = Result<T, SetupError>;

/// The outside world as seen by the configuration.
pub struct Collaborators {
    pub resolver: Box<dyn HostResolver>,
    pub directories: Box<dyn DirectoryCreator>,
    pub plugins: Box<dyn PluginCatalog>,
    pub errors: Rc<dyn ErrorSink>,
}

pub struct Configuration {
    root_dir: PathBuf,
    store: ConfigStore,
    resources: ResourceCatalog,
    /// Profile file per profile type, after defaults and user overrides.
    profiles: HashMap<String, PathBuf>,
    resolver: Box<dyn HostResolver>,
    directories: Box<dyn DirectoryCreator>,
    plugins: Box<dyn PluginCatalog>,
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("root_dir", &self.root_dir)
            .field("store", &self.store)
            .field("profiles", &self.profiles)
            .finish_non_exhaustive()
    }
}

impl Configuration {
    /// Creates the configuration for the install at `root_dir` and loads the framework
    /// defaults into the global layer.
    pub fn load(root_dir: &Path, collaborators: Collaborators) -> SetupResult<Self> {
        let mut store = ConfigStore::new(collaborators.errors);
        config_loader::load_config_file(&root_dir.join(FRAMEWORK_CONFIG_FILE), root_dir, &mut store)?;

        Ok(Self {
            root_dir: root_dir.to_path_buf(),
            store,
            resources: ResourceCatalog::default(),
            profiles: HashMap::new(),
            resolver: collaborators.resolver,
            directories: collaborators.directories,
            plugins: collaborators.plugins,
        })
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ConfigStore {
        &mut self.store
    }

    pub fn plugins(&self) -> &dyn PluginCatalog {
        self.plugins.as_ref()
    }

    /// Replaces the hostname resolver, e.g. once the lookup command is known.
    pub fn set_resolver(&mut self, resolver: Box<dyn HostResolver>) {
        self.resolver = resolver;
    }

    /// The file loaded for a profile type, if any.
    pub fn profile(&self, kind: &str) -> Option<&Path> {
        self.profiles.get(kind).map(PathBuf::as_path)
    }

    /// Applies the options of a run. Can be called again: previous targets are dropped.
    pub fn process_options(&mut self, options: &RunOptions) -> SetupResult<()> {
        self.store.select_global();
        self.store.set("FORCE_OVERWRITE", options.force_overwrite);
        self.store.set("INTERACTIVE", options.interactive);
        self.store.set("SIMULATION", options.simulation);

        self.plugins.load_web_test_groups()?;
        self.load_profiles(&options.profiles)?;
        paths::derive_global_settings(&mut self.store, &self.root_dir)?;
        self.derive_from_target(options)
    }

    /// Picks a file for every profile type (defaults first, then user overrides) and
    /// loads them: the general overlay, the resources and each group's plugin order.
    pub fn load_profiles(&mut self, overrides: &[(String, PathBuf)]) -> SetupResult<()> {
        self.profiles.clear();
        for (kind, setting) in DEFAULT_PROFILES {
            if !self.store.is_set(setting) {
                log::debug!("No default '{}' profile ({} is not set).", kind, setting);
                continue;
            }
            let file = paths::expand_path(&self.store.get_str(setting)?)?;
            self.profiles.insert(kind.to_string(), PathBuf::from(file));
        }
        for (kind, file) in overrides {
            let file = paths::expand_path(&file.to_string_lossy())?;
            self.profiles.insert(kind.clone(), PathBuf::from(file));
        }

        let general = self.required_profile(GENERAL_PROFILE)?;
        config_loader::load_config_file(&general, &self.root_dir, &mut self.store)?;

        let resources = self.required_profile(RESOURCES_PROFILE)?;
        self.resources = config_loader::load_resource_file(&resources)?;

        for group in self.plugins.groups() {
            match self.profiles.get(&group) {
                Some(file) => self.plugins.load_order_from_file(&group, file)?,
                None => self.plugins.load_order_from_filesystem(&group)?,
            }
        }
        Ok(())
    }

    fn required_profile(&self, kind: &str) -> SetupResult<PathBuf> {
        self.profiles
            .get(kind)
            .cloned()
            .ok_or_else(|| SetupError::MissingProfile {
                kind: kind.to_string(),
            })
    }

    /// Builds the target overlays for the run's plugin group.
    pub fn derive_from_target(&mut self, options: &RunOptions) -> SetupResult<()> {
        let group = PluginGroup::from_name(&options.plugin_group).ok_or_else(|| {
            SetupError::UnsupportedPluginGroup {
                group: options.plugin_group.clone(),
            }
        })?;

        self.store.reset_targets();
        match group {
            PluginGroup::Web => {
                if options.scope.is_empty() {
                    return Err(SetupError::EmptyScope {
                        group: options.plugin_group.clone(),
                    });
                }
                for url in &options.scope {
                    self.derive_url_target(url)?;
                }
            }
            PluginGroup::Aux => self.derive_aux_target()?,
        }
        Ok(())
    }

    fn derive_url_target(&mut self, raw_url: &str) -> SetupResult<()> {
        let target = target_resolver::normalize_url(raw_url);
        log::info!("Deriving configuration for target: {}", target);
        self.store.select_target(&target);

        target_resolver::derive_url_settings(&mut self.store, self.resolver.as_ref(), raw_url)?;
        paths::derive_output_settings(&mut self.store, self.directories.as_ref())?;

        // Virtual hosts are grouped under ip/port in the summary.
        let host_ip = self.store.get_str("HOST_IP")?;
        let port = self.store.get_str("PORT_NUMBER")?;
        self.store.set("REVIEW_OFFSET", target.as_str());
        self.store.set("SUMMARY_HOST_IP", host_ip);
        self.store.set("SUMMARY_PORT_NUMBER", port);
        self.store.set("REPORT_TYPE", "URL");
        Ok(())
    }

    /// Aux runs have no URL. Their settings go into the global layer, then into an
    /// overlay named `aux`.
    fn derive_aux_target(&mut self) -> SetupResult<()> {
        let output_path = self.store.get_str("OUTPUT_PATH")?;
        let aux_output = format!("{output_path}/aux");
        self.store.set("AUX_OUTPUT_PATH", aux_output.as_str());
        self.store
            .set("HTML_DETAILED_REPORT_PATH", format!("{output_path}/aux.html"));
        paths::init_http_dbs(&mut self.store, &format!("{aux_output}/db/"));
        self.store.set("REVIEW_OFFSET", "AUX");
        self.store.set("SUMMARY_HOST_IP", "");
        self.store.set("SUMMARY_PORT_NUMBER", "");
        self.store.set("REPORT_TYPE", "AUX");
        self.store.select_target(AUX_TARGET);
        Ok(())
    }

    // --- RESOURCES ---

    pub fn resource_catalog(&self) -> &ResourceCatalog {
        &self.resources
    }

    /// Resolves a resource category against the current scope.
    pub fn resources(&self, category: &str) -> Vec<ResolvedResource> {
        self.resources
            .resolve(category, self.store.replacement_mapping())
    }

    /// Resolves several categories against `scope`, concatenated in order.
    pub fn resources_in(&self, scope: &Scope, categories: &[&str]) -> StoreResult<Vec<ResolvedResource>> {
        let mapping = self.store.replacement_mapping_in(scope)?;
        Ok(self.resources.resolve_list(categories, mapping))
    }

    pub fn resource_list(&self, categories: &[&str]) -> Vec<ResolvedResource> {
        self.resources
            .resolve_list(categories, self.store.replacement_mapping())
    }

    pub fn raw_resources(&self, category: &str) -> &[ResourceEntry] {
        self.resources.raw_resources(category)
    }

    pub fn is_resource_type(&self, category: &str) -> bool {
        self.resources.is_resource_type(category)
    }

    // --- PATH ACCESSORS ---

    pub fn html_transaction_log(&self, partial: bool) -> StoreResult<String> {
        self.store.get_file_name("TRANSACTION_LOG_HTML", partial)
    }

    pub fn txt_transaction_log(&self, partial: bool) -> StoreResult<String> {
        self.store.get_file_name("TRANSACTION_LOG_TXT", partial)
    }

    /// A path setting relative to `OUTPUT_PATH`.
    pub fn partial_path(&self, key: &str) -> StoreResult<String> {
        let output_path = self.store.get_str("OUTPUT_PATH")?;
        Ok(paths::partial_path(&output_path, &self.store.get_str(key)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConfigValue;
    use crate::system::error_sink::LogSink;
    use crate::system::executor::ExecutionError;
    use crate::system::filesystem::LocalDirectories;
    use crate::system::plugins::DirectoryPluginCatalog;
    use std::fs;
    use tempfile::TempDir;

    struct FakeResolver(HashMap<&'static str, &'static str>);

    impl HostResolver for FakeResolver {
        fn lookup(&self, hostname: &str) -> Result<String, ExecutionError> {
            self.0
                .get(hostname)
                .map(|answer| answer.to_string())
                .ok_or_else(|| ExecutionError::NonZeroExitStatus(format!("host {hostname}")))
        }
    }

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn fixture() -> TempDir {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        write(
            root,
            FRAMEWORK_CONFIG_FILE,
            "# Framework defaults\n\
             OUTPUT_PATH: @@@FRAMEWORK_DIR@@@/out\n\
             USER_AGENT: Mozilla/5.0 (X11; Linux x86_64)\n\
             HTML_REPORT: report.html\n\
             DEFAULT_GENERAL_PROFILE: @@@FRAMEWORK_DIR@@@/profiles/general/default.cfg\n\
             DEFAULT_RESOURCES_PROFILE: @@@FRAMEWORK_DIR@@@/profiles/resources/default.cfg\n\
             DEFAULT_WEB_PLUGIN_ORDER_PROFILE: @@@FRAMEWORK_DIR@@@/profiles/plugin_order/web.cfg\n",
        );
        write(root, "profiles/general/default.cfg", "BAD_HEADERS: Server,X-Powered-By\nTIMEOUT: 10\n");
        write(
            root,
            "profiles/resources/default.cfg",
            "# Type_____Name_____Resource\n\
             Nikto_____Scan_____nikto -h @@@HOST_IP@@@ -p @@@PORT_NUMBER@@@\n\
             Search_____Site_____https://duckduckgo.com/?q=site:@@@TOP_DOMAIN@@@\n",
        );
        write(root, "profiles/plugin_order/web.cfg", "Spiders\nRobots\n");
        tmp
    }

    fn configuration(root: &Path) -> (Configuration, Rc<LogSink>) {
        let sink = Rc::new(LogSink::new());
        let collaborators = Collaborators {
            resolver: Box::new(FakeResolver(HashMap::from([
                ("www.example.com", "1.2.3.4\n5.6.7.8"),
                ("intranet.local", "10.0.0.5"),
            ]))),
            directories: Box::new(LocalDirectories),
            plugins: Box::new(DirectoryPluginCatalog::new(
                root.join("plugins"),
                &["web", "net", "aux"],
            )),
            errors: sink.clone(),
        };
        (Configuration::load(root, collaborators).unwrap(), sink)
    }

    fn web_options(scope: &[&str]) -> RunOptions {
        RunOptions {
            scope: scope.iter().map(|s| s.to_string()).collect(),
            ..RunOptions::default()
        }
    }

    #[test]
    fn test_web_run_derives_one_overlay_per_target() {
        let tmp = fixture();
        let (mut config, _) = configuration(tmp.path());
        config
            .process_options(&web_options(&["www.example.com/", "https://intranet.local:8443"]))
            .unwrap();

        let store = config.store();
        assert_eq!(
            store.targets(),
            &["http://www.example.com".to_string(), "https://intranet.local:8443".to_string()]
        );
        // The last target stays current.
        assert_eq!(store.current_target(), Some("https://intranet.local:8443"));
        assert_eq!(store.get_str("HOST_IP").unwrap(), "10.0.0.5");
        assert!(store.get_flag("INTERNAL_IP").unwrap());
        assert_eq!(store.get_str("REPORT_TYPE").unwrap(), "URL");
        assert_eq!(store.get_str("SUMMARY_PORT_NUMBER").unwrap(), "8443");

        let first = Scope::target("http://www.example.com");
        assert_eq!(store.get_in(&first, "HOST_IP").unwrap(), ConfigValue::from("1.2.3.4"));
        assert_eq!(
            store.get_in(&first, "ALTERNATIVE_IPS").unwrap(),
            ConfigValue::List(vec!["5.6.7.8".to_string()])
        );
        assert_eq!(
            store.get_in(&first, "REVIEW_OFFSET").unwrap(),
            ConfigValue::from("http://www.example.com")
        );

        let ports = store.get_all_across_targets("PORT_NUMBER").unwrap();
        assert_eq!(ports, vec![ConfigValue::from("80"), ConfigValue::from("8443")]);

        let url_output = tmp.path().join("out/1.2.3.4/80/http__www.example.com");
        assert!(url_output.is_dir());
    }

    #[test]
    fn test_global_layer_has_no_target_facts() {
        let tmp = fixture();
        let (mut config, _) = configuration(tmp.path());
        config.process_options(&web_options(&["www.example.com"])).unwrap();

        let store = config.store();
        assert!(!store.is_set_in(&Scope::Global, "HOST_IP"));
        assert!(store.is_set_in(&Scope::Global, "RUN_DB"));
        assert!(store.is_set_in(&Scope::Global, "TIMEOUT"));
    }

    #[test]
    fn test_resources_resolve_against_current_target() {
        let tmp = fixture();
        let (mut config, _) = configuration(tmp.path());
        config.process_options(&web_options(&["www.example.com"])).unwrap();

        let resolved = config.resources("nikto");
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].value, "nikto -h 1.2.3.4 -p 80");

        let listed = config.resource_list(&["search", "nikto"]);
        assert_eq!(listed[0].value, "https://duckduckgo.com/?q=site:example.com");
        assert!(config.resources("undefined").is_empty());
        assert!(config.is_resource_type("SEARCH"));
        assert_eq!(
            config.raw_resources("search")[0].template,
            "https://duckduckgo.com/?q=site:@@@TOP_DOMAIN@@@"
        );

        let global = config.resources_in(&Scope::Global, &["nikto"]).unwrap();
        assert_eq!(global[0].value, "nikto -h @@@HOST_IP@@@ -p @@@PORT_NUMBER@@@");
    }

    #[test]
    fn test_aux_run_uses_aux_target() {
        let tmp = fixture();
        let (mut config, _) = configuration(tmp.path());
        let options = RunOptions {
            plugin_group: "aux".to_string(),
            ..RunOptions::default()
        };
        config.process_options(&options).unwrap();

        let out = tmp.path().join("out").to_string_lossy().into_owned();
        let store = config.store();
        assert_eq!(store.current_target(), Some(AUX_TARGET));
        assert_eq!(store.get_str("REPORT_TYPE").unwrap(), "AUX");
        assert_eq!(store.get_str("SUMMARY_HOST_IP").unwrap(), "");
        assert_eq!(
            store.get_str("TRANSACTION_LOG_TXT").unwrap(),
            format!("{out}/aux/db/transaction_log.txt")
        );
        assert_eq!(
            store.get_str("HTML_DETAILED_REPORT_PATH").unwrap(),
            format!("{out}/aux.html")
        );
        assert!(store.is_set_in(&Scope::Global, "AUX_OUTPUT_PATH"));
        assert_eq!(config.txt_transaction_log(true).unwrap(), "transaction_log.txt");
        assert_eq!(
            config.html_transaction_log(false).unwrap(),
            format!("{out}/aux/db/transaction_log.html")
        );
        assert_eq!(
            config.partial_path("TRANSACTION_LOG_HTML").unwrap(),
            "aux/db/transaction_log.html"
        );
    }

    #[test]
    fn test_unsupported_group_and_empty_scope_are_fatal() {
        let tmp = fixture();
        let (mut config, _) = configuration(tmp.path());

        let options = RunOptions {
            plugin_group: "net".to_string(),
            scope: vec!["www.example.com".to_string()],
            ..RunOptions::default()
        };
        let err = config.process_options(&options).unwrap_err();
        assert!(matches!(err, SetupError::UnsupportedPluginGroup { ref group } if group == "net"));

        let err = config.process_options(&web_options(&[])).unwrap_err();
        assert!(matches!(err, SetupError::EmptyScope { .. }));
    }

    #[test]
    fn test_unresolvable_host_is_fatal_and_named() {
        let tmp = fixture();
        let (mut config, _) = configuration(tmp.path());
        let err = config
            .process_options(&web_options(&["unknown.example.org"]))
            .unwrap_err();
        assert!(err.to_string().contains("unknown.example.org"));
    }

    #[test]
    fn test_rerun_resets_previous_targets() {
        let tmp = fixture();
        let (mut config, _) = configuration(tmp.path());
        config.process_options(&web_options(&["www.example.com"])).unwrap();
        config.process_options(&web_options(&["intranet.local"])).unwrap();
        assert_eq!(config.store().targets(), &["http://intranet.local".to_string()]);
    }

    #[test]
    fn test_target_key_matches_target_url() {
        let tmp = fixture();
        let (mut config, _) = configuration(tmp.path());
        config
            .process_options(&web_options(&["http://www.example.com//"]))
            .unwrap();

        let store = config.store();
        let target = store.get_str("TARGET").unwrap();
        assert_eq!(store.get_str("TARGET_URL").unwrap(), target);
        assert_eq!(store.targets(), &[target]);
    }

    #[test]
    fn test_simulation_creates_no_directories() {
        let tmp = fixture();
        let (mut config, _) = configuration(tmp.path());
        let options = RunOptions {
            simulation: true,
            ..web_options(&["www.example.com"])
        };
        config.process_options(&options).unwrap();
        assert!(config.store().get_flag("SIMULATION").unwrap());
        assert!(!tmp.path().join("out").exists());
    }

    #[test]
    fn test_user_profile_overrides_default() {
        let tmp = fixture();
        write(tmp.path(), "custom/general.cfg", "TIMEOUT: 99\n");
        let (mut config, _) = configuration(tmp.path());
        let options = RunOptions {
            profiles: vec![("g".to_string(), tmp.path().join("custom/general.cfg"))],
            ..web_options(&["www.example.com"])
        };
        config.process_options(&options).unwrap();

        assert_eq!(config.store().get_str("TIMEOUT").unwrap(), "99");
        assert!(!config.store().is_set("BAD_HEADERS"));
        assert_eq!(config.profile("g"), Some(tmp.path().join("custom/general.cfg").as_path()));
    }

    #[test]
    fn test_plugin_orders_loaded_per_group() {
        let tmp = fixture();
        let (mut config, _) = configuration(tmp.path());
        config.process_options(&web_options(&["www.example.com"])).unwrap();

        assert_eq!(
            config.plugins().load_order("web"),
            Some(&["Spiders".to_string(), "Robots".to_string()][..])
        );
        // No net profile configured and no plugin directory: empty order.
        assert_eq!(config.plugins().load_order("net"), Some(&[][..]));
    }

    #[test]
    fn test_missing_key_reaches_the_error_sink() {
        let tmp = fixture();
        let (mut config, sink) = configuration(tmp.path());
        config.process_options(&web_options(&["www.example.com"])).unwrap();

        let err = config.store().get("NOT_CONFIGURED").unwrap_err();
        assert!(err.is_unit_abort());
        assert!(sink.messages().iter().any(|m| m.contains("NOT_CONFIGURED")));
    }

    #[test]
    fn test_malformed_framework_config_is_fatal() {
        let tmp = fixture();
        write(tmp.path(), FRAMEWORK_CONFIG_FILE, "OUTPUT_PATH /out\n");
        let collaborators = Collaborators {
            resolver: Box::new(FakeResolver(HashMap::new())),
            directories: Box::new(LocalDirectories),
            plugins: Box::new(DirectoryPluginCatalog::new(tmp.path(), &[])),
            errors: Rc::new(LogSink::new()),
        };
        let err = Configuration::load(tmp.path(), collaborators).unwrap_err();
        assert!(matches!(
            err,
            SetupError::Profile(ProfileError::MalformedConfigLine { line_number: 1, .. })
        ));
    }
}

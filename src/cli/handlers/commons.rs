// src/cli/handlers/commons.rs

// Shared setup used by every action: root discovery, run options and the configuration.

use anyhow::{Context, Result, anyhow};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::{
    cli::args::RunArgs,
    constants::{DNS_LOOKUP_COMMAND_KEY, PLUGIN_GROUPS, PLUGINS_DIR, ROOT_ENV_VAR},
    core::{
        config_resolver::{Collaborators, Configuration},
        target_resolver,
    },
    models::{RunOptions, Scope},
    system::{
        error_sink::LogSink, filesystem::LocalDirectories, host_resolver::ShellHostResolver,
        plugins::DirectoryPluginCatalog,
    },
};

/// The install root: `--root`, then `$TARGETCFG_ROOT`, then the current directory.
pub fn resolve_root(root: Option<&Path>) -> Result<PathBuf> {
    let root = match root {
        Some(path) => path.to_path_buf(),
        None => match env::var(ROOT_ENV_VAR) {
            Ok(value) => PathBuf::from(shellexpand::tilde(&value).into_owned()),
            Err(_) => env::current_dir().context(t!("error.no_current_dir"))?,
        },
    };
    dunce::canonicalize(&root)
        .with_context(|| format!(t!("error.root_not_found"), path = root.display()))
}

/// Reads the options file, if any, and applies the command-line flags on top.
pub fn load_run_options(args: &RunArgs) -> Result<RunOptions> {
    let mut options = match &args.options {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!(t!("error.read_options"), path = path.display()))?;
            toml::from_str::<RunOptions>(&content)
                .with_context(|| format!(t!("error.parse_options"), path = path.display()))?
        }
        None => RunOptions::default(),
    };

    options.force_overwrite |= args.force_overwrite;
    options.interactive |= args.interactive;
    options.simulation |= args.simulation;
    options.profiles.extend(args.profiles.iter().cloned());
    if let Some(group) = &args.group {
        options.plugin_group = group.clone();
    }
    if !args.scope.is_empty() {
        options.scope = args.scope.clone();
    }
    Ok(options)
}

/// Loads the framework at the selected root and applies the run options.
pub fn build_configuration(args: &RunArgs) -> Result<Configuration> {
    let root = resolve_root(args.root.as_deref())?;
    let options = load_run_options(args)?;
    log::debug!("Run options: {:?}", options);

    let collaborators = Collaborators {
        resolver: Box::new(ShellHostResolver::default()),
        directories: Box::new(LocalDirectories),
        plugins: Box::new(DirectoryPluginCatalog::new(
            root.join(PLUGINS_DIR),
            PLUGIN_GROUPS,
        )),
        errors: Rc::new(LogSink::new()),
    };
    let mut config = Configuration::load(&root, collaborators)
        .with_context(|| format!(t!("error.load_framework"), path = root.display()))?;

    if config.store().is_set(DNS_LOOKUP_COMMAND_KEY) {
        let command = config.store().get_str(DNS_LOOKUP_COMMAND_KEY)?;
        config.set_resolver(Box::new(ShellHostResolver::new(command)));
    }

    config.process_options(&options)?;
    config.store().show();
    Ok(config)
}

/// The scope an action reads from: `--target`, the global layer, or the current scope.
///
/// Target URLs are normalized the same way the run normalizes them, so `example.com/`
/// finds `http://example.com`.
pub fn select_scope(config: &Configuration, target: Option<&str>, global: bool) -> Result<Scope> {
    if global {
        return Ok(Scope::Global);
    }
    let Some(raw) = target else {
        return Ok(config.store().current_scope().clone());
    };

    let store = config.store();
    let key = if store.targets().iter().any(|t| t == raw) {
        raw.to_string()
    } else {
        target_resolver::normalize_url(raw)
    };
    if !store.targets().contains(&key) {
        return Err(anyhow!(format!(t!("error.unknown_target"), target = raw)));
    }
    Ok(Scope::Target(key))
}

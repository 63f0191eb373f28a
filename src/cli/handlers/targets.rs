// src/cli/handlers/targets.rs

use crate::{
    cli::{args::TargetsArgs, handlers::commons},
    core::config_store::ConfigStore,
    models::Scope,
};
use anyhow::Result;
use clap::Parser;
use colored::*;

/// Lists the targets of the run with the address and port each one resolved to.
pub fn handle(args: Vec<String>) -> Result<()> {
    let targets_args = TargetsArgs::try_parse_from(&args)?;
    let config = commons::build_configuration(&targets_args.run)?;
    let store = config.store();

    println!("\n--- {} ---", t!("targets.header"));
    for target in store.targets() {
        let scope = Scope::target(target.as_str());
        let marker = if store.current_target() == Some(target.as_str()) {
            "*".green().bold()
        } else {
            " ".normal()
        };
        println!(
            "{} {:<40} {:<16} {}",
            marker,
            target.yellow(),
            value_or_dash(store, &scope, "HOST_IP"),
            value_or_dash(store, &scope, "PORT_NUMBER")
        );
    }
    Ok(())
}

/// Aux targets have no address, so missing facts are shown as `-`.
fn value_or_dash(store: &ConfigStore, scope: &Scope, key: &str) -> String {
    if !store.is_set_in(scope, key) {
        return "-".to_string();
    }
    store
        .get_in(scope, key)
        .map(|value| value.to_string())
        .unwrap_or_else(|_| "-".to_string())
}

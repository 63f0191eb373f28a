// src/cli/handlers/show.rs

use crate::{cli::args::ShowArgs, cli::handlers::commons, models::ConfigValue};
use anyhow::Result;
use clap::Parser;
use colored::*;
use std::collections::BTreeMap;

/// Dumps every setting of one scope, sorted by key.
pub fn handle(args: Vec<String>) -> Result<()> {
    let show_args = ShowArgs::try_parse_from(&args)?;
    let config = commons::build_configuration(&show_args.run)?;
    let scope = commons::select_scope(&config, show_args.target.as_deref(), show_args.global)?;
    let entries = config.store().entries_in(&scope)?;

    if show_args.json {
        let map: BTreeMap<String, ConfigValue> = entries.into_iter().collect();
        println!("{}", serde_json::to_string_pretty(&map)?);
        return Ok(());
    }

    println!("\n--- {} '{}' ---", t!("show.header"), scope.to_string().yellow());
    let width = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    for (key, value) in &entries {
        println!("  {:<width$} {}", key.blue(), value, width = width);
    }
    println!("\n{}", format!(t!("show.summary"), count = entries.len()).dimmed());
    Ok(())
}

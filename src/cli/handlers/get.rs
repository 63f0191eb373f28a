// src/cli/handlers/get.rs

use crate::{cli::args::GetArgs, cli::handlers::commons};
use anyhow::{Context, Result};
use clap::Parser;

/// Prints one setting, or its distinct values over every target.
///
/// Output is the bare value, one per line, so it can be used from scripts.
pub fn handle(args: Vec<String>) -> Result<()> {
    let get_args = GetArgs::try_parse_from(&args)?;
    let config = commons::build_configuration(&get_args.run)?;
    let store = config.store();

    if get_args.all_targets {
        let values = store
            .get_all_across_targets(&get_args.key)
            .with_context(|| format!(t!("get.error.across_targets"), key = get_args.key))?;
        for value in values {
            println!("{}", value);
        }
        return Ok(());
    }

    let scope = commons::select_scope(&config, get_args.target.as_deref(), false)?;
    let value = store
        .get_in(&scope, &get_args.key)
        .with_context(|| format!(t!("get.error.in_scope"), scope = scope))?;
    println!("{}", value);
    Ok(())
}

// src/cli/handlers/resources.rs

use crate::{cli::args::ResourcesArgs, cli::handlers::commons};
use anyhow::Result;
use clap::Parser;
use colored::*;

/// Prints the resources of the given categories, resolved against one scope.
pub fn handle(args: Vec<String>) -> Result<()> {
    let resources_args = ResourcesArgs::try_parse_from(&args)?;
    let config = commons::build_configuration(&resources_args.run)?;
    let scope = commons::select_scope(&config, resources_args.target.as_deref(), false)?;

    for category in &resources_args.categories {
        if !config.is_resource_type(category) {
            println!(
                "{}",
                format!(t!("resources.warn.undefined"), category = category).yellow()
            );
            continue;
        }

        println!("\n--- {} ---", category.to_uppercase().green().bold());
        if resources_args.raw {
            for entry in config.raw_resources(category) {
                println!("  {} {}", entry.name.blue(), entry.template);
            }
            continue;
        }
        for resource in config.resources_in(&scope, &[category.as_str()])? {
            println!("  {} {}", resource.name.blue(), resource.value);
        }
    }
    Ok(())
}

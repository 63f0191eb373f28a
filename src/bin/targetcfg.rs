// src/bin/targetcfg.rs

use anyhow::{Result, anyhow};
use clap::{CommandFactory, Parser};
use colored::*;
use targetcfg::cli::{Cli, handlers};
use targetcfg::t;

// --- Command Definition and Registry ---

/// An action, its aliases, and the handler that parses the rest of the arguments.
struct CommandDefinition {
    name: &'static str,
    aliases: &'static [&'static str],
    handler: fn(Vec<String>) -> Result<()>,
}

static COMMAND_REGISTRY: &[CommandDefinition] = &[
    CommandDefinition {
        name: "show",
        aliases: &["dump"],
        handler: handlers::show::handle,
    },
    CommandDefinition {
        name: "get",
        aliases: &[],
        handler: handlers::get::handle,
    },
    CommandDefinition {
        name: "resources",
        aliases: &["res"],
        handler: handlers::resources::handle,
    },
    CommandDefinition {
        name: "targets",
        aliases: &["ls"],
        handler: handlers::targets::handle,
    },
];

/// Finds a command definition in the registry by its name or alias.
fn find_command(name: &str) -> Option<&'static CommandDefinition> {
    COMMAND_REGISTRY
        .iter()
        .find(|cmd| cmd.name == name || cmd.aliases.contains(&name))
}

fn main() {
    env_logger::init();

    if let Err(e) = run_cli(Cli::parse()) {
        eprintln!("\n{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run_cli(cli: Cli) -> Result<()> {
    log::debug!("CLI args parsed: {:?}", cli);

    let Some((action, args)) = cli.args.split_first() else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let command = find_command(action).ok_or_else(|| unknown_action(action))?;
    (command.handler)(args.to_vec())
}

fn unknown_action(action: &str) -> anyhow::Error {
    let known: Vec<&str> = COMMAND_REGISTRY.iter().map(|cmd| cmd.name).collect();
    anyhow!(format!(
        t!("error.unknown_action"),
        action = action,
        available = known.join(", ")
    ))
}

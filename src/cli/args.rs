// src/cli/args.rs
use clap::{Args, Parser};
use std::path::PathBuf;

/// Flags shared by every action: where the framework lives and how the run is set up.
#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Install root of the framework. Defaults to $TARGETCFG_ROOT, then the current directory.
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// A TOML file with run options. Flags given on the command line take precedence.
    #[arg(long)]
    pub options: Option<PathBuf>,

    /// Overrides a profile (e.g. "g=~/my_general.cfg", "r=./resources.cfg").
    #[arg(long = "profile", value_parser = parse_profile)]
    pub profiles: Vec<(String, PathBuf)>,

    /// Plugin group of the run: "web" or "aux".
    #[arg(long)]
    pub group: Option<String>,

    /// Target URLs of the run.
    #[arg(long = "scope", short = 's', value_delimiter = ',')]
    pub scope: Vec<String>,

    /// Derive everything but do not create output directories.
    #[arg(long)]
    pub simulation: bool,

    #[arg(long)]
    pub force_overwrite: bool,

    #[arg(long)]
    pub interactive: bool,
}

/// Parses a `TYPE=FILE` profile override.
fn parse_profile(value: &str) -> Result<(String, PathBuf), String> {
    match value.split_once('=') {
        Some((kind, file)) if !kind.is_empty() && !file.is_empty() => {
            Ok((kind.to_string(), PathBuf::from(file)))
        }
        _ => Err(format!("expected TYPE=FILE, got '{value}'")),
    }
}

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
pub struct ShowArgs {
    /// Show this target's overlay instead of the current scope.
    #[arg(long, conflicts_with = "global")]
    pub target: Option<String>,

    /// Show the global layer.
    #[arg(long)]
    pub global: bool,

    /// Print the settings as JSON.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
pub struct GetArgs {
    /// The setting to read.
    pub key: String,

    /// Read from this target's overlay instead of the current scope.
    #[arg(long, conflicts_with = "all_targets")]
    pub target: Option<String>,

    /// Print the distinct values of the setting over every target.
    #[arg(long)]
    pub all_targets: bool,

    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
pub struct ResourcesArgs {
    /// Resource categories to resolve, in order (case-insensitive).
    #[arg(required = true, num_args = 1..)]
    pub categories: Vec<String>,

    /// Resolve against this target instead of the current scope.
    #[arg(long)]
    pub target: Option<String>,

    /// Print the templates without substituting settings.
    #[arg(long)]
    pub raw: bool,

    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
pub struct TargetsArgs {
    #[command(flatten)]
    pub run: RunArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_args_are_shared_by_actions() {
        let args = GetArgs::try_parse_from([
            "HOST_IP",
            "--scope",
            "a.com,https://b.com",
            "--profile",
            "g=/tmp/general.cfg",
            "--simulation",
        ])
        .unwrap();

        assert_eq!(args.key, "HOST_IP");
        assert_eq!(args.run.scope, vec!["a.com", "https://b.com"]);
        assert_eq!(
            args.run.profiles,
            vec![("g".to_string(), PathBuf::from("/tmp/general.cfg"))]
        );
        assert!(args.run.simulation);
        assert!(!args.all_targets);
    }

    #[test]
    fn test_malformed_profile_is_rejected() {
        assert!(TargetsArgs::try_parse_from(["--profile", "general.cfg"]).is_err());
        assert!(TargetsArgs::try_parse_from(["--profile", "=x"]).is_err());
    }

    #[test]
    fn test_resources_need_a_category() {
        assert!(ResourcesArgs::try_parse_from(["--target", "a.com"]).is_err());
        let args = ResourcesArgs::try_parse_from(["nikto", "search", "--raw"]).unwrap();
        assert_eq!(args.categories, vec!["nikto", "search"]);
        assert!(args.raw);
    }

    #[test]
    fn test_show_target_conflicts_with_global() {
        assert!(ShowArgs::try_parse_from(["--target", "a.com", "--global"]).is_err());
    }
}

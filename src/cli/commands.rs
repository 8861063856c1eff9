//! CLI command definitions using clap
//!
//! Defines all CLI subcommands and their arguments.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::collections::HashMap;

use crate::target::Verbosity;

/// Multi-language project orchestrator.
///
/// Runs lifecycle commands (build, test, lint, ...) across every target of a
/// polyglot project, in dependency order, using each target's toolchain.
#[derive(Parser, Debug)]
#[command(name = "polyrun")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Project config file (defaults to polyrun.toml in this or a parent directory)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a command on targets in dependency order
    Run(RunArgs),

    /// List configured targets
    List(ListArgs),

    /// Print the dependency order of targets
    Order(OrderArgs),

    /// Detect which toolchain a directory uses
    Detect(DetectArgs),

    /// List available toolchains or show one toolchain's commands
    Toolchains(ToolchainsArgs),
}

/// Arguments for the `run` subcommand
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Command name to run (e.g., build, test, ci)
    #[arg(required = true)]
    pub command: String,

    /// Targets to run on, with their dependencies (defaults to all)
    #[arg(short, long = "target")]
    pub targets: Vec<String>,

    /// Prefer the `:quiet` variant of the command
    #[arg(long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Prefer the `:verbose` variant of the command
    #[arg(long)]
    pub verbose: bool,

    /// Start from a minimal environment instead of the current one
    #[arg(long)]
    pub isolated: bool,

    /// Timeout in seconds per shell command (overrides defaults.timeout, 0 disables)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Extra environment variables in KEY=VALUE format
    #[arg(short, long = "env", value_parser = parse_key_value)]
    pub env: Vec<(String, String)>,

    /// Arguments appended to every shell command
    #[arg(last = true)]
    pub args: Vec<String>,
}

impl RunArgs {
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else if self.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Default
        }
    }

    /// Convert env pairs to a HashMap; later pairs win
    pub fn env_as_map(&self) -> HashMap<String, String> {
        self.env.iter().cloned().collect()
    }
}

/// Parse KEY=VALUE argument
fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid argument '{}': expected KEY=VALUE format", s))?;
    if pos == 0 {
        return Err(format!("invalid argument '{}': empty key", s));
    }
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

/// Arguments for the `list` subcommand
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the `order` subcommand
#[derive(Args, Debug)]
pub struct OrderArgs {
    /// Restrict to these targets and their dependencies
    #[arg(short, long = "target")]
    pub targets: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Output format options
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format
    Table,
    /// JSON output
    Json,
    /// Plain text (one item per line)
    Plain,
}

/// Arguments for the `detect` subcommand
#[derive(Args, Debug)]
pub struct DetectArgs {
    /// Directory to inspect (defaults to current directory)
    pub dir: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the `toolchains` subcommand
#[derive(Args, Debug)]
pub struct ToolchainsArgs {
    /// Show the resolved commands of this toolchain
    pub name: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse_run_simple() {
        let cli = Cli::parse_from(["polyrun", "run", "build"]);
        if let Commands::Run(args) = cli.command {
            assert_eq!(args.command, "build");
            assert!(args.targets.is_empty());
            assert_eq!(args.verbosity(), Verbosity::Default);
            assert!(args.timeout.is_none());
        } else {
            panic!("Expected Run command");
        }
        assert!(!cli.debug);
    }

    #[test]
    fn test_cli_parse_run_full() {
        let cli = Cli::parse_from([
            "polyrun",
            "run",
            "test",
            "-t",
            "rust",
            "-t",
            "go",
            "--quiet",
            "--isolated",
            "--timeout",
            "30",
            "-e",
            "CI=1",
            "--",
            "--nocapture",
            "-x",
        ]);
        if let Commands::Run(args) = cli.command {
            assert_eq!(args.targets, vec!["rust".to_string(), "go".to_string()]);
            assert_eq!(args.verbosity(), Verbosity::Quiet);
            assert!(args.isolated);
            assert_eq!(args.timeout, Some(30));
            assert_eq!(args.env_as_map().get("CI"), Some(&"1".to_string()));
            assert_eq!(args.args, vec!["--nocapture".to_string(), "-x".to_string()]);
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn test_cli_run_verbose() {
        let cli = Cli::parse_from(["polyrun", "run", "build", "--verbose"]);
        if let Commands::Run(args) = cli.command {
            assert_eq!(args.verbosity(), Verbosity::Verbose);
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn test_cli_run_quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["polyrun", "run", "build", "--quiet", "--verbose"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_list_json() {
        let cli = Cli::parse_from(["polyrun", "list", "-f", "json"]);
        if let Commands::List(args) = cli.command {
            assert!(matches!(args.format, OutputFormat::Json));
        } else {
            panic!("Expected List command");
        }
    }

    #[test]
    fn test_cli_parse_order() {
        let cli = Cli::parse_from(["polyrun", "order", "-t", "app"]);
        if let Commands::Order(args) = cli.command {
            assert_eq!(args.targets, vec!["app".to_string()]);
            assert!(matches!(args.format, OutputFormat::Plain));
        } else {
            panic!("Expected Order command");
        }
    }

    #[test]
    fn test_cli_parse_detect() {
        let cli = Cli::parse_from(["polyrun", "detect", "rust"]);
        if let Commands::Detect(args) = cli.command {
            assert_eq!(args.dir, Some("rust".to_string()));
        } else {
            panic!("Expected Detect command");
        }
    }

    #[test]
    fn test_cli_parse_toolchains() {
        let cli = Cli::parse_from(["polyrun", "toolchains", "cargo", "-f", "json"]);
        if let Commands::Toolchains(args) = cli.command {
            assert_eq!(args.name, Some("cargo".to_string()));
            assert!(matches!(args.format, OutputFormat::Json));
        } else {
            panic!("Expected Toolchains command");
        }
    }

    #[test]
    fn test_cli_global_flags() {
        let cli = Cli::parse_from(["polyrun", "-d", "-c", "/path/to/polyrun.toml", "list"]);
        assert!(cli.debug);
        assert_eq!(cli.config, Some("/path/to/polyrun.toml".to_string()));
    }

    #[test]
    fn test_parse_key_value_valid() {
        let result = parse_key_value("FOO=bar");
        assert_eq!(result, Ok(("FOO".to_string(), "bar".to_string())));
    }

    #[test]
    fn test_parse_key_value_with_equals() {
        let result = parse_key_value("FOO=bar=baz");
        assert_eq!(result, Ok(("FOO".to_string(), "bar=baz".to_string())));
    }

    #[test]
    fn test_parse_key_value_invalid() {
        assert!(parse_key_value("INVALID").is_err());
        assert!(parse_key_value("=value").is_err());
    }

    #[test]
    fn test_cli_verify() {
        // Verify CLI structure is valid
        Cli::command().debug_assert();
    }
}

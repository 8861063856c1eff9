//! polyrun CLI entry point
//!
//! Usage:
//!   polyrun run <command> [-t target]... [-- args...]   Run a command in dependency order
//!   polyrun list                                        List configured targets
//!   polyrun order                                       Print the dependency order
//!   polyrun detect [dir]                                Detect a directory's toolchain
//!   polyrun toolchains [name]                           List or show toolchains

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use polyrun::cli::commands::{DetectArgs, ListArgs, OrderArgs, OutputFormat, RunArgs, ToolchainsArgs};
use polyrun::cli::{Cli, Commands};
use polyrun::config::load_config;
use polyrun::toolchain::{detect_toolchains, ToolchainResolver};
use polyrun::{CancellationToken, ExecOptions, Project, Target};

/// Environment variable holding the log filter
const LOG_ENV: &str = "POLYRUN_LOG";

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.debug);

    let result = run(cli).await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {:#}", "error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run(args) => run_command(args, cli.config.as_deref()).await?,
        Commands::List(args) => list_targets(args, cli.config.as_deref())?,
        Commands::Order(args) => show_order(args, cli.config.as_deref())?,
        Commands::Detect(args) => detect_toolchain(args)?,
        Commands::Toolchains(args) => show_toolchains(args, cli.config.as_deref())?,
    }

    Ok(())
}

fn load_project(config_path: Option<&str>) -> Result<Project> {
    let loaded = load_config(config_path)?;
    let path = loaded.path.clone();
    Project::load(loaded).with_context(|| format!("Invalid project configuration in {}", path.display()))
}

/// Run a command on the selected targets in dependency order
async fn run_command(args: RunArgs, config_path: Option<&str>) -> Result<()> {
    let project = load_project(config_path)?;
    let registry = project.registry();

    let order: Vec<&Target> = if args.targets.is_empty() {
        registry.topological_order()?
    } else {
        registry.order_for(args.targets.as_slice())?
    };

    let token = CancellationToken::new();
    let ctrl_c = {
        let token = token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::debug!("Interrupt received, cancelling");
                token.cancel();
            }
        })
    };

    let mut options = ExecOptions::new()
        .with_args(args.args.iter().cloned())
        .with_verbosity(args.verbosity())
        .isolated(args.isolated)
        .with_cancel(token);
    options.env = args.env_as_map();
    if let Some(secs) = args.timeout {
        options = options.with_timeout(Duration::from_secs(secs));
    }

    let mut ran = 0usize;
    let mut skipped = 0usize;
    let mut outcome: Result<()> = Ok(());

    for target in order {
        let selected = args.targets.iter().any(|t| t == target.name());
        if !target.has_command(&args.command) && !selected {
            tracing::debug!("{} has no '{}' command", target.name(), args.command);
            continue;
        }

        eprintln!("{} {} {}", "==>".cyan().bold(), target.name().bold(), args.command);

        match target.execute(&args.command, &options).await {
            Ok(()) => ran += 1,
            Err(e) if e.is_skip() => {
                skipped += 1;
                eprintln!(
                    "{}: {}: skipped {} ({})",
                    "warning".yellow().bold(),
                    target.name(),
                    args.command,
                    e.skip_signal().map(ToString::to_string).unwrap_or_default()
                );
            }
            Err(e) => {
                outcome = Err(anyhow::Error::new(e)
                    .context(format!("'{}' failed on target '{}'", args.command, target.name())));
                break;
            }
        }
    }

    ctrl_c.abort();
    outcome?;

    eprintln!(
        "{}: {} on {} target(s), {} skipped",
        "done".green().bold(),
        args.command,
        ran,
        skipped
    );

    Ok(())
}

/// List configured targets
fn list_targets(args: ListArgs, config_path: Option<&str>) -> Result<()> {
    let project = load_project(config_path)?;
    let targets = project.registry().all();

    match args.format {
        OutputFormat::Json => {
            let views: Vec<_> = targets.iter().map(|t| t.view()).collect();
            let json = serde_json::to_string_pretty(&serde_json::json!({
                "project": project.name(),
                "version": project.version(),
                "root": project.root(),
                "targets": views
            }))?;
            println!("{}", json);
        }
        OutputFormat::Plain => {
            for target in &targets {
                println!("{}", target.name());
            }
        }
        OutputFormat::Table => {
            println!("{}: {}", "Project".cyan(), project.name());
            println!("{}: {}", "Root".cyan(), project.root().display());
            println!();
            if targets.is_empty() {
                println!("No targets configured.");
                return Ok(());
            }

            let width = targets.iter().map(|t| t.name().len()).max().unwrap_or(10);
            for target in &targets {
                let deps = if target.depends_on().is_empty() {
                    String::new()
                } else {
                    format!(" <- {}", target.depends_on().join(", "))
                };
                println!(
                    "  {:width$}  {:9}  {:8}  {}{}",
                    target.name().green(),
                    target.kind().to_string(),
                    target.toolchain().unwrap_or("-"),
                    target.directory(),
                    deps.dimmed(),
                    width = width
                );
            }
        }
    }

    Ok(())
}

/// Print the dependency order
fn show_order(args: OrderArgs, config_path: Option<&str>) -> Result<()> {
    let project = load_project(config_path)?;
    let registry = project.registry();

    let order = if args.targets.is_empty() {
        registry.topological_order()?
    } else {
        registry.order_for(args.targets.as_slice())?
    };
    let names: Vec<&str> = order.iter().map(|t| t.name()).collect();

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&names)?),
        OutputFormat::Plain => {
            for name in &names {
                println!("{}", name);
            }
        }
        OutputFormat::Table => {
            for (i, name) in names.iter().enumerate() {
                println!("  {:>3}. {}", i + 1, name.green());
            }
        }
    }

    Ok(())
}

/// Detect the toolchain of a directory
fn detect_toolchain(args: DetectArgs) -> Result<()> {
    let dir = match args.dir {
        Some(dir) => PathBuf::from(dir),
        None => std::env::current_dir().context("Failed to get current directory")?,
    };
    if !dir.is_dir() {
        anyhow::bail!("Not a directory: {}", dir.display());
    }

    let matches = detect_toolchains(&dir);
    let detected = matches.first().map(|m| m.toolchain.clone());

    match args.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&serde_json::json!({
                "path": dir,
                "detected": detected,
                "matches": matches
            }))?;
            println!("{}", json);
        }
        OutputFormat::Plain => {
            if let Some(detected) = detected {
                println!("{}", detected);
            }
        }
        OutputFormat::Table => {
            println!("{}: {}", "Path".cyan(), dir.display());
            match &detected {
                Some(name) => println!("{}: {}", "Detected".green(), name),
                None => println!("{}: {}", "Detected".yellow(), "None"),
            }

            if !matches.is_empty() {
                println!();
                println!("{}:", "Matches".cyan());
                for m in &matches {
                    println!("  - {} ({})", m.toolchain, m.file);
                }
            }
        }
    }

    Ok(())
}

/// Resolver over the project's custom toolchains, or built-ins only when
/// no project config is found
fn resolver_for(config_path: Option<&str>) -> Result<ToolchainResolver> {
    match load_config(config_path) {
        Ok(loaded) => Ok(ToolchainResolver::new(&loaded.config.toolchains)?),
        Err(e) if config_path.is_none() => {
            tracing::debug!("No project config, showing built-in toolchains: {:#}", e);
            Ok(ToolchainResolver::default())
        }
        Err(e) => Err(e),
    }
}

/// List toolchains or show one toolchain's commands
fn show_toolchains(args: ToolchainsArgs, config_path: Option<&str>) -> Result<()> {
    let resolver = resolver_for(config_path)?;

    let Some(name) = args.name else {
        let names = resolver.names();
        match args.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&names)?),
            OutputFormat::Plain | OutputFormat::Table => {
                for name in &names {
                    println!("{}", name);
                }
            }
        }
        return Ok(());
    };

    let toolchain = resolver.resolve(&name)?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(toolchain)?),
        OutputFormat::Plain => {
            for command in toolchain.commands.keys() {
                println!("{}", command);
            }
        }
        OutputFormat::Table => {
            println!("{}: {}", "Toolchain".cyan(), toolchain.name);
            if let Some(base) = &toolchain.extends {
                println!("{}: {}", "Extends".cyan(), base);
            }
            println!();

            let width = toolchain.commands.keys().map(String::len).max().unwrap_or(10);
            for (command, def) in &toolchain.commands {
                println!("  {:width$}  {}", command.green(), def, width = width);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolver_for_missing_explicit_config() {
        assert!(resolver_for(Some("/nonexistent/polyrun.toml")).is_err());
    }

    #[test]
    fn test_resolver_for_project_toolchains() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("polyrun.toml");
        std::fs::write(
            &path,
            r#"
            [toolchains.web]
            extends = "npm"
            "#,
        )
        .unwrap();

        let resolver = resolver_for(path.to_str()).unwrap();
        assert!(resolver.contains("web"));
        assert!(resolver.contains("cargo"));
    }
}

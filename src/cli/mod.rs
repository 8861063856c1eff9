//! CLI module for polyrun
//!
//! Provides command-line interface with the following subcommands:
//! - `run` - Run a command on targets in dependency order
//! - `list` - List configured targets
//! - `order` - Print the dependency order
//! - `detect` - Detect the toolchain of a directory
//! - `toolchains` - List toolchains or show one toolchain's commands

pub mod commands;

pub use commands::{Cli, Commands, OutputFormat};

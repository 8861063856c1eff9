//! Process execution
//!
//! Spawns interpolated commands through the platform shell with a layered
//! environment, inherited stdio, and hard kill on cancellation or timeout.

pub mod shell;

pub use shell::{run_shell, shell_program, Environment, ShellOptions, ISOLATED_KEEP, SHIM_VARS};

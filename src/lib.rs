//! polyrun - multi-language project orchestrator
//!
//! Maps lifecycle actions (build, test, lint, ...) onto the right toolchain
//! command for every target of a polyglot project, orders targets by their
//! dependencies, and runs the commands through the platform shell.
//!
//! ## Layers
//!
//! - **Toolchains** - built-in presets plus custom toolchains that `extends` a base
//! - **Targets** - per-directory units with a resolved command table
//! - **Registry** - validated dependency graph with a deterministic topological order
//! - **Execution** - variant lookup, `${var}` interpolation, availability probing,
//!   and shell invocation with skip-vs-fail classification
//!
//! ## Example
//!
//! ```no_run
//! use polyrun::{ExecOptions, Project};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let loaded = polyrun::config::load_config(None)?;
//! let project = Project::load(loaded)?;
//!
//! for target in project.registry().topological_order()? {
//!     match target.execute("build", &ExecOptions::new()).await {
//!         Ok(()) => {}
//!         Err(e) if e.is_skip() => eprintln!("{}: skipped ({})", target.name(), e),
//!         Err(e) => return Err(e.into()),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod cancel;
pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod probe;
pub mod project;
pub mod target;
pub mod toolchain;

pub use cancel::CancellationToken;
pub use cli::{Cli, Commands};
pub use config::Config;
pub use error::{ConfigError, ErrorInfo, SkipReason, SkipSignal, TaskError};
pub use probe::{ScriptCache, SharedScriptCache};
pub use project::Project;
pub use target::{ExecOptions, Registry, Target, TargetKind, TargetView, Verbosity};
pub use toolchain::{CommandDef, CommandTable, Toolchain, ToolchainResolver};

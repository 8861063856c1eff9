//! Command execution on a target
//!
//! `execute(name, options)` walks the pipeline:
//! 1. verbosity variant lookup (`name:quiet` / `name:verbose`)
//! 2. definition lookup, where a missing name is [`TaskError::UndefinedCommand`]
//! 3. `Disabled` skips, `Sequence` pushes its steps, `Shell` runs
//! 4. interpolation, availability probing, argument forwarding, shell spawn
//!
//! Sequences are driven by an explicit work stack rather than recursion. The
//! first error or skip of any step ends the whole call and is returned as is.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::interpolate::interpolate;
use super::Target;
use crate::cancel::CancellationToken;
use crate::error::{SkipSignal, TaskError};
use crate::executor::{run_shell, Environment, ShellOptions};
use crate::probe;
use crate::toolchain::CommandDef;

/// Output verbosity requested by the caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    #[default]
    Default,
    Quiet,
    Verbose,
}

impl Verbosity {
    /// Command-name suffix of the matching variant
    pub fn suffix(&self) -> Option<&'static str> {
        match self {
            Verbosity::Default => None,
            Verbosity::Quiet => Some(":quiet"),
            Verbosity::Verbose => Some(":verbose"),
        }
    }
}

/// Per-call execution options
///
/// Every step of a sequence runs with the same options.
#[derive(Debug, Clone, Default)]
pub struct ExecOptions {
    /// Appended, space-joined, to every shell command
    pub args: Vec<String>,
    /// Highest-precedence environment layer
    pub env: HashMap<String, String>,
    pub verbosity: Verbosity,
    /// Start from a minimal environment instead of the process environment
    pub isolated: bool,
    /// Per shell command; overrides the target default. Zero disables it.
    pub timeout: Option<Duration>,
    pub cancel: Option<CancellationToken>,
}

impl ExecOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn isolated(mut self, isolated: bool) -> Self {
        self.isolated = isolated;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set timeout in seconds
    pub fn with_timeout_secs(self, secs: u64) -> Self {
        self.with_timeout(Duration::from_secs(secs))
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }
}

/// Work item for the sequence interpreter
enum Step<'a> {
    /// Resolve and run a command name
    Run(&'a str),
    /// The innermost active sequence finished
    Leave,
}

impl Target {
    /// Definition key and definition for `name` under `verbosity`
    fn lookup(&self, name: &str, verbosity: Verbosity) -> Option<(String, &CommandDef)> {
        if let Some(suffix) = verbosity.suffix() {
            let variant = format!("{name}{suffix}");
            if let Some(def) = self.commands.get(&variant) {
                return Some((variant, def));
            }
        }
        self.commands
            .get(name)
            .map(|def| (name.to_string(), def))
    }

    /// Run command `name` on this target
    ///
    /// # Errors
    /// * `TaskError::Skipped` - disabled, executable missing, or script missing
    /// * `TaskError::UndefinedCommand` - no such command (also for sequence steps)
    /// * `TaskError::RecursiveCommand` - a sequence includes itself
    /// * `TaskError::CommandFailed` / `SpawnFailed` - the shell step failed
    /// * `TaskError::Cancelled` / `Timeout` - stopped by the caller or the clock
    pub async fn execute(&self, name: &str, options: &ExecOptions) -> Result<(), TaskError> {
        let mut stack = vec![Step::Run(name)];
        let mut active: Vec<String> = Vec::new();

        while let Some(step) = stack.pop() {
            let name = match step {
                Step::Run(name) => name,
                Step::Leave => {
                    active.pop();
                    continue;
                }
            };

            if options.is_cancelled() {
                return Err(TaskError::Cancelled);
            }

            let (key, def) =
                self.lookup(name, options.verbosity)
                    .ok_or_else(|| TaskError::UndefinedCommand {
                        target: self.name.clone(),
                        command: name.to_string(),
                    })?;

            match def {
                CommandDef::Disabled => {
                    tracing::debug!("{}: '{}' is disabled", self.name, key);
                    return Err(SkipSignal::disabled().into());
                }
                CommandDef::Sequence(steps) => {
                    if active.contains(&key) {
                        return Err(TaskError::RecursiveCommand {
                            target: self.name.clone(),
                            command: key,
                        });
                    }
                    tracing::debug!("{}: '{}' runs {:?}", self.name, key, steps);

                    stack.push(Step::Leave);
                    stack.extend(steps.iter().rev().map(|s| Step::Run(s.as_str())));
                    active.push(key);
                }
                CommandDef::Shell(template) => {
                    self.run_template(&key, template, options).await?;
                }
            }
        }

        Ok(())
    }

    /// Synchronous wrapper around [`execute`](Self::execute)
    ///
    /// Builds a current-thread runtime, so it must not be called from inside
    /// an async context.
    pub fn execute_blocking(&self, name: &str, options: &ExecOptions) -> Result<(), TaskError> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| {
                TaskError::Io(std::io::Error::other(format!(
                    "Failed to create runtime: {}",
                    e
                )))
            })?;

        rt.block_on(self.execute(name, options))
    }

    /// The command line `template` would run as, after interpolation and
    /// argument forwarding
    pub fn render(&self, key: &str, template: &str, args: &[String]) -> Result<String, TaskError> {
        let mut command = interpolate(template, &self.variables()).map_err(|_| {
            TaskError::InvalidTemplate {
                command: key.to_string(),
            }
        })?;

        if !args.is_empty() {
            command.push(' ');
            command.push_str(&args.join(" "));
        }

        Ok(command)
    }

    fn environment(&self, options: &ExecOptions) -> Environment {
        let mut env = Environment::inherit(options.isolated);
        env.apply(&self.env).apply(&options.env);
        env
    }

    async fn run_template(
        &self,
        key: &str,
        template: &str,
        options: &ExecOptions,
    ) -> Result<(), TaskError> {
        let interpolated = self.render(key, template, &[])?;
        let cwd = self.working_dir();
        let env = self.environment(options);

        if let Err(signal) = probe::probe(&interpolated, &cwd, env.get("PATH"), self.cache.as_ref()) {
            tracing::info!("{}: skipping '{}' ({})", self.name, key, signal);
            return Err(signal.into());
        }

        let command = self.render(key, template, &options.args)?;

        let mut shell = ShellOptions::default();
        let timeout = options.timeout.or(self.default_timeout).filter(|t| !t.is_zero());
        if let Some(timeout) = timeout {
            shell = shell.with_timeout(timeout);
        }
        if let Some(token) = &options.cancel {
            shell = shell.with_cancel(token.clone());
        }

        tracing::info!("{}: running '{}'", self.name, key);
        run_shell(&command, &cwd, &env, &shell).await
    }
}

//! Platform shell invocation
//!
//! Runs one interpolated command line through the platform shell:
//! - POSIX: `sh -c <command>`
//! - Windows: the full-path `powershell.exe -NoProfile -NonInteractive -Command <command>`,
//!   bypassing any `powershell` shim earlier on PATH
//!
//! stdout and stderr are inherited. The child is hard-killed on cancellation
//! or timeout; there is no grace period.

use std::collections::{BTreeMap, HashMap};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::cancel::CancellationToken;
use crate::error::TaskError;

/// Variables set by package-manager shims that confuse nested invocations
pub const SHIM_VARS: &[&str] = &[
    "npm_lifecycle_event",
    "npm_lifecycle_script",
    "npm_config_user_agent",
    "npm_execpath",
    "npm_node_execpath",
    "POLYRUN_SHIM",
];

/// Variables kept from the process environment in isolated mode
pub const ISOLATED_KEEP: &[&str] = &[
    "PATH", "HOME", "USER", "TMPDIR", "TEMP", "TMP", "SYSTEMROOT", "LANG", "TERM",
];

/// Environment handed to the child process
///
/// Built from the process environment and then overlaid, layer by layer;
/// later layers win on key collision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<OsString, OsString>,
}

#[cfg(windows)]
fn normalize_key(key: &OsStr) -> OsString {
    key.to_string_lossy().to_ascii_uppercase().into()
}

#[cfg(not(windows))]
fn normalize_key(key: &OsStr) -> OsString {
    key.to_os_string()
}

fn key_in(key: &OsStr, list: &[&str]) -> bool {
    let key = normalize_key(key);
    list.iter().any(|name| normalize_key(OsStr::new(name)) == key)
}

impl Environment {
    /// Empty environment
    pub fn empty() -> Self {
        Self::default()
    }

    /// The current process environment without shim variables; only the
    /// [`ISOLATED_KEEP`] allow-list when `isolated` is set
    pub fn inherit(isolated: bool) -> Self {
        Self::from_vars(std::env::vars_os(), isolated)
    }

    fn from_vars(vars: impl IntoIterator<Item = (OsString, OsString)>, isolated: bool) -> Self {
        let vars = vars
            .into_iter()
            .filter(|(key, _)| !key_in(key, SHIM_VARS))
            .filter(|(key, _)| !isolated || key_in(key, ISOLATED_KEEP))
            .map(|(key, value)| (normalize_key(&key), value))
            .collect();
        Self { vars }
    }

    /// Overlay a layer of variables
    pub fn apply(&mut self, layer: &HashMap<String, String>) -> &mut Self {
        for (key, value) in layer {
            self.vars
                .insert(normalize_key(OsStr::new(key)), OsString::from(value));
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&OsStr> {
        self.vars
            .get(&normalize_key(OsStr::new(key)))
            .map(OsString::as_os_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OsStr, &OsStr)> {
        self.vars.iter().map(|(k, v)| (k.as_os_str(), v.as_os_str()))
    }
}

/// Program and leading arguments of the platform shell
#[cfg(windows)]
pub fn shell_program() -> (PathBuf, &'static [&'static str]) {
    let system_root =
        std::env::var_os("SystemRoot").unwrap_or_else(|| OsString::from(r"C:\Windows"));
    let program = PathBuf::from(system_root)
        .join("System32")
        .join("WindowsPowerShell")
        .join("v1.0")
        .join("powershell.exe");
    (program, &["-NoProfile", "-NonInteractive", "-Command"])
}

/// Program and leading arguments of the platform shell
#[cfg(not(windows))]
pub fn shell_program() -> (PathBuf, &'static [&'static str]) {
    (PathBuf::from("sh"), &["-c"])
}

/// How to run a single shell command
#[derive(Debug, Clone, Default)]
pub struct ShellOptions {
    /// Hard kill after this long
    pub timeout: Option<Duration>,
    /// Hard kill when cancelled
    pub cancel: Option<CancellationToken>,
}

impl ShellOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

enum Outcome {
    Exited(std::io::Result<std::process::ExitStatus>),
    Cancelled,
    TimedOut,
}

/// Run `command` through the platform shell and wait for it
///
/// # Errors
/// * `TaskError::SpawnFailed` - the shell could not be started
/// * `TaskError::CommandFailed` - non-zero exit, or killed by a signal
/// * `TaskError::Cancelled` - the token was cancelled; the child was killed
/// * `TaskError::Timeout` - the timeout elapsed; the child was killed
pub async fn run_shell(
    command: &str,
    cwd: &Path,
    env: &Environment,
    options: &ShellOptions,
) -> Result<(), TaskError> {
    if options.cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
        return Err(TaskError::Cancelled);
    }

    let (program, shell_args) = shell_program();

    let mut cmd = Command::new(&program);
    cmd.args(shell_args)
        .arg(command)
        .current_dir(cwd)
        .env_clear()
        .envs(env.iter())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .kill_on_drop(true);

    tracing::debug!("Executing: {} (in {})", command, cwd.display());

    let mut child = cmd.spawn().map_err(|e| TaskError::SpawnFailed {
        command: command.to_string(),
        error: e.to_string(),
    })?;

    let cancelled = async {
        match &options.cancel {
            Some(token) => token.cancelled().await,
            None => std::future::pending().await,
        }
    };

    let expired = async {
        match options.timeout {
            Some(timeout) => tokio::time::sleep(timeout).await,
            None => std::future::pending().await,
        }
    };

    let outcome = tokio::select! {
        status = child.wait() => Outcome::Exited(status),
        _ = cancelled => Outcome::Cancelled,
        _ = expired => Outcome::TimedOut,
    };

    let status = match outcome {
        Outcome::Exited(status) => status?,
        Outcome::Cancelled => {
            kill(&mut child, command).await;
            return Err(TaskError::Cancelled);
        }
        Outcome::TimedOut => {
            kill(&mut child, command).await;
            return Err(TaskError::Timeout {
                command: command.to_string(),
                timeout: options.timeout.unwrap_or_default(),
            });
        }
    };

    if status.success() {
        Ok(())
    } else {
        Err(TaskError::CommandFailed {
            command: command.to_string(),
            exit_code: status.code(),
        })
    }
}

async fn kill(child: &mut tokio::process::Child, command: &str) {
    tracing::debug!("Killing child process {:?}: {}", child.id(), command);
    if let Err(e) = child.start_kill() {
        tracing::warn!("Failed to kill child process {:?}: {}", child.id(), e);
        return;
    }
    // Reap it so no zombie is left behind
    if let Err(e) = child.wait().await {
        tracing::warn!("Failed to reap killed child process: {}", e);
    }
}

//! Availability probing for interpolated shell commands
//!
//! A negative probe is a skip, not a failure:
//! - the first token is not a shell builtin and is not on PATH
//! - a package-manager script is missing from `package.json`
//!
//! Commands starting with a quote are inline shell expressions and are
//! never probed.

pub mod cache;
pub mod package_manager;

use std::ffi::OsStr;
use std::path::Path;

pub use cache::{PackageManifest, ScriptCache, SharedScriptCache};
pub use package_manager::{script_invocation, PackageManager, ScriptInvocation};

use crate::error::SkipSignal;

/// Shell builtins and keywords that need no PATH lookup
pub const SHELL_BUILTINS: &[&str] = &[
    ".", ":", "[", "[[", "alias", "break", "case", "cd", "command", "continue", "do", "done",
    "echo", "elif", "else", "esac", "eval", "exec", "exit", "export", "false", "fi", "for",
    "function", "if", "local", "printf", "pwd", "read", "return", "set", "shift", "source",
    "test", "then", "time", "trap", "true", "type", "ulimit", "umask", "unset", "until",
    "wait", "while", "{", "(",
];

pub fn is_shell_builtin(name: &str) -> bool {
    SHELL_BUILTINS.contains(&name)
}

/// `NAME=value` prefix assignment
pub(crate) fn is_env_assignment(token: &str) -> bool {
    match token.split_once('=') {
        Some((name, _)) => {
            !name.is_empty()
                && name
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    }
}

/// Executable name to look up for `command`, if any
///
/// Leading `NAME=value` assignments are skipped. Returns `None` for empty
/// commands and for commands starting with a quote.
pub fn executable_candidate(command: &str) -> Option<&str> {
    let trimmed = command.trim_start();
    if trimmed.starts_with(['"', '\'']) {
        return None;
    }

    trimmed
        .split_whitespace()
        .find(|token| !is_env_assignment(token))
}

/// Check a package-manager script invocation against the cached manifest
///
/// Only a manifest that exists and lacks the script produces a skip.
pub fn check_script(command: &str, cwd: &Path, cache: &dyn ScriptCache) -> Result<(), SkipSignal> {
    let Some(invocation) = script_invocation(command) else {
        return Ok(());
    };

    match cache.get(cwd) {
        Some(manifest) if !manifest.has_script(&invocation.script) => {
            tracing::debug!(
                "{} script '{}' not found in {}",
                invocation.manager,
                invocation.script,
                cwd.display()
            );
            Err(SkipSignal::script_not_found(invocation.script))
        }
        _ => Ok(()),
    }
}

/// Probe whether `command` can run in `cwd`
///
/// # Arguments
/// * `command` - Interpolated command line
/// * `cwd` - Working directory the command will run in
/// * `path` - PATH value to search (`None` = the process PATH)
/// * `cache` - Manifest cache for package-manager scripts
pub fn probe(
    command: &str,
    cwd: &Path,
    path: Option<&OsStr>,
    cache: &dyn ScriptCache,
) -> Result<(), SkipSignal> {
    let Some(candidate) = executable_candidate(command) else {
        return Ok(());
    };

    if is_shell_builtin(candidate) {
        return Ok(());
    }

    let found = match path {
        Some(path) => which::which_in(candidate, Some(path), cwd),
        None => which::which_in(candidate, std::env::var_os("PATH"), cwd),
    };

    if let Err(e) = found {
        tracing::debug!("'{}' not found on PATH: {}", candidate, e);
        return Err(SkipSignal::command_not_found(candidate));
    }

    check_script(command, cwd, cache)
}

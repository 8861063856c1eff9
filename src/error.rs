//! Error types for polyrun
//!
//! Three families:
//! - [`ConfigError`] - fatal construction errors, raised before any target runs
//! - [`SkipSignal`] - a command was intentionally not executed (not a failure)
//! - [`TaskError`] - an execution attempt that did not succeed

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// Errors raised while resolving toolchains and building the target registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A target or lookup referenced a toolchain that is neither custom nor built-in
    #[error("Unknown toolchain '{name}'")]
    UnknownToolchain { name: String },

    /// A custom toolchain extends a base that does not exist
    #[error("Toolchain '{toolchain}' extends unknown base toolchain '{base}'")]
    UnknownBaseToolchain { toolchain: String, base: String },

    /// A chain of `extends` loops back on itself
    #[error("Toolchain '{toolchain}' has a cyclic extends chain: {chain}")]
    ToolchainCycle { toolchain: String, chain: String },

    /// Target `type` is not `language` or `auxiliary`
    #[error("Target '{target}' has invalid type '{value}' (expected 'language' or 'auxiliary')")]
    InvalidTargetType { target: String, value: String },

    /// A target lists itself in `depends_on`
    #[error("Target '{target}' depends on itself")]
    SelfDependency { target: String },

    /// A target depends on a name that is not in the registry
    #[error("Target '{target}' depends on unknown target '{dependency}'")]
    UnknownDependency { target: String, dependency: String },

    /// The dependency graph contains a cycle
    #[error("Circular dependency detected involving target '{target}'")]
    CircularDependency { target: String },

    /// Two targets share a name
    #[error("Target '{name}' is defined more than once")]
    DuplicateTarget { name: String },

    /// A lookup named a target that is not in the registry
    #[error("Unknown target '{name}'")]
    UnknownTarget { name: String },
}

/// Why a command was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The command is explicitly disabled in the command table
    Disabled,
    /// The executable is not on PATH and is not a shell builtin
    CommandNotFound,
    /// A package-manager script is missing from the manifest
    ScriptNotFound,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Disabled => write!(f, "explicitly disabled"),
            SkipReason::CommandNotFound => write!(f, "command not found"),
            SkipReason::ScriptNotFound => write!(f, "script not found"),
        }
    }
}

/// A non-error outcome: the command was intentionally not executed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkipSignal {
    pub reason: SkipReason,
    /// Missing executable or script name, when there is one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl SkipSignal {
    pub fn disabled() -> Self {
        Self {
            reason: SkipReason::Disabled,
            detail: None,
        }
    }

    pub fn command_not_found(executable: impl Into<String>) -> Self {
        Self {
            reason: SkipReason::CommandNotFound,
            detail: Some(executable.into()),
        }
    }

    pub fn script_not_found(script: impl Into<String>) -> Self {
        Self {
            reason: SkipReason::ScriptNotFound,
            detail: Some(script.into()),
        }
    }
}

impl std::fmt::Display for SkipSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}: {}", self.reason, detail),
            None => write!(f, "{}", self.reason),
        }
    }
}

/// Errors returned by `Target::execute`
#[derive(Error, Debug)]
pub enum TaskError {
    /// The command was skipped; see [`TaskError::is_skip`]
    #[error("Skipped ({0})")]
    Skipped(SkipSignal),

    /// No definition for the command name on this target
    #[error("Command '{command}' is not defined for target '{target}'")]
    UndefinedCommand { target: String, command: String },

    /// A composite command refers back to itself
    #[error("Command '{command}' on target '{target}' recursively includes itself")]
    RecursiveCommand { target: String, command: String },

    /// The template or a variable value contains the reserved NUL character
    #[error("Command template for '{command}' contains a NUL character")]
    InvalidTemplate { command: String },

    /// The shell exited with a non-zero status
    #[error("Command failed with exit code {}: {command}", exit_code_label(.exit_code))]
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
    },

    /// Failed to spawn the shell
    #[error("Failed to spawn command: {command}")]
    SpawnFailed { command: String, error: String },

    /// Command timed out and was killed
    #[error("Command timed out after {timeout:?}: {command}")]
    Timeout { command: String, timeout: Duration },

    /// Caller cancelled the execution
    #[error("Execution was cancelled")]
    Cancelled,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn exit_code_label(code: &Option<i32>) -> String {
    code.map(|c| c.to_string())
        .unwrap_or_else(|| "none".to_string())
}

impl TaskError {
    /// True for skip signals, which are not failures
    pub fn is_skip(&self) -> bool {
        matches!(self, TaskError::Skipped(_))
    }

    /// True when the caller stopped the run
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TaskError::Cancelled)
    }

    /// The skip signal, if this is a skip
    pub fn skip_signal(&self) -> Option<&SkipSignal> {
        match self {
            TaskError::Skipped(signal) => Some(signal),
            _ => None,
        }
    }
}

impl From<SkipSignal> for TaskError {
    fn from(signal: SkipSignal) -> Self {
        TaskError::Skipped(signal)
    }
}

/// Serializable error info for JSON output
#[derive(Debug, Serialize, Clone)]
pub struct ErrorInfo {
    pub message: String,
    pub error_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorInfo {
    fn new(message: String, error_type: &str) -> Self {
        Self {
            message,
            error_type: error_type.to_string(),
            suggestion: None,
            exit_code: None,
            detail: None,
        }
    }

    fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl From<&TaskError> for ErrorInfo {
    fn from(err: &TaskError) -> Self {
        let message = err.to_string();
        match err {
            TaskError::Skipped(signal) => {
                let mut info = ErrorInfo::new(message, "skipped");
                info.detail = signal.detail.clone();
                match signal.reason {
                    SkipReason::Disabled => info,
                    SkipReason::CommandNotFound => {
                        info.with_suggestion("Install the tool or add it to PATH")
                    }
                    SkipReason::ScriptNotFound => {
                        info.with_suggestion("Add the script to package.json")
                    }
                }
            }
            TaskError::UndefinedCommand { .. } => ErrorInfo::new(message, "undefined_command")
                .with_suggestion("Define the command on the target or its toolchain"),
            TaskError::RecursiveCommand { .. } => ErrorInfo::new(message, "recursive_command")
                .with_suggestion("Remove the self-reference from the command sequence"),
            TaskError::InvalidTemplate { .. } => ErrorInfo::new(message, "invalid_template"),
            TaskError::CommandFailed { exit_code, .. } => {
                let mut info = ErrorInfo::new(message, "command_failed");
                info.exit_code = *exit_code;
                info
            }
            TaskError::SpawnFailed { error, .. } => {
                let mut info = ErrorInfo::new(message, "spawn_failed");
                info.detail = Some(error.clone());
                info.with_suggestion("Check that the shell and working directory exist")
            }
            TaskError::Timeout { .. } => ErrorInfo::new(message, "timeout")
                .with_suggestion("Try increasing the timeout or checking if the command hangs"),
            TaskError::Cancelled => ErrorInfo::new(message, "cancelled"),
            TaskError::Io(_) => ErrorInfo::new(message, "io_error"),
        }
    }
}

impl From<&ConfigError> for ErrorInfo {
    fn from(err: &ConfigError) -> Self {
        let info = ErrorInfo::new(err.to_string(), "config_error");
        match err {
            ConfigError::UnknownToolchain { .. } | ConfigError::UnknownBaseToolchain { .. } => {
                info.with_suggestion("Run 'polyrun toolchains' to see available toolchains")
            }
            ConfigError::CircularDependency { .. } | ConfigError::SelfDependency { .. } => {
                info.with_suggestion("Check depends_on in polyrun.toml")
            }
            ConfigError::UnknownTarget { .. } => {
                info.with_suggestion("Run 'polyrun list' to see configured targets")
            }
            _ => info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_is_not_failure() {
        let err = TaskError::from(SkipSignal::disabled());
        assert!(err.is_skip());
        assert!(!err.is_cancelled());

        let err = TaskError::CommandFailed {
            command: "cargo build".to_string(),
            exit_code: Some(101),
        };
        assert!(!err.is_skip());
    }

    #[test]
    fn test_skip_signal_display() {
        assert_eq!(SkipSignal::disabled().to_string(), "explicitly disabled");
        assert_eq!(
            SkipSignal::command_not_found("cargo").to_string(),
            "command not found: cargo"
        );
        assert_eq!(
            SkipSignal::script_not_found("lint").to_string(),
            "script not found: lint"
        );
    }

    #[test]
    fn test_command_failed_message() {
        let err = TaskError::CommandFailed {
            command: "go test ./...".to_string(),
            exit_code: Some(1),
        };
        assert_eq!(err.to_string(), "Command failed with exit code 1: go test ./...");

        let err = TaskError::CommandFailed {
            command: "sleep 5".to_string(),
            exit_code: None,
        };
        assert!(err.to_string().contains("exit code none"));
    }

    #[test]
    fn test_timeout_message_keeps_sub_second_precision() {
        let err = TaskError::Timeout {
            command: "sleep 10".to_string(),
            timeout: Duration::from_millis(250),
        };
        assert_eq!(err.to_string(), "Command timed out after 250ms: sleep 10");

        let err = TaskError::Timeout {
            command: "sleep 10".to_string(),
            timeout: Duration::from_secs(30),
        };
        assert_eq!(err.to_string(), "Command timed out after 30s: sleep 10");
    }

    #[test]
    fn test_config_error_messages() {
        let err = ConfigError::UnknownBaseToolchain {
            toolchain: "web".to_string(),
            base: "nmp".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Toolchain 'web' extends unknown base toolchain 'nmp'"
        );

        let err = ConfigError::CircularDependency {
            target: "a".to_string(),
        };
        assert!(err.to_string().contains("'a'"));
    }

    #[test]
    fn test_error_info_from_skip() {
        let err = TaskError::from(SkipSignal::command_not_found("zig"));
        let info = ErrorInfo::from(&err);

        assert_eq!(info.error_type, "skipped");
        assert_eq!(info.detail, Some("zig".to_string()));
        assert!(info.suggestion.is_some());
    }

    #[test]
    fn test_error_info_from_command_failed() {
        let err = TaskError::CommandFailed {
            command: "make".to_string(),
            exit_code: Some(2),
        };
        let info = ErrorInfo::from(&err);

        assert_eq!(info.error_type, "command_failed");
        assert_eq!(info.exit_code, Some(2));
    }

    #[test]
    fn test_error_info_skips_empty_fields() {
        let info = ErrorInfo::from(&TaskError::Cancelled);

        let json = serde_json::to_string(&info).unwrap();
        assert!(json.contains("\"error_type\":\"cancelled\""));
        assert!(!json.contains("suggestion"));
        assert!(!json.contains("exit_code"));
        assert!(!json.contains("detail"));
    }
}

//! Toolchain model: named command-template presets per build ecosystem
//!
//! - [`catalog`] - built-in presets (cargo, npm, go, ...)
//! - [`resolver`] - merges custom toolchains with built-ins, resolving `extends`
//! - [`detect`] - infers a toolchain from marker files in a directory

pub mod catalog;
pub mod detect;
pub mod resolver;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use detect::{detect_toolchain, detect_toolchains};
pub use resolver::ToolchainResolver;

/// Command name to definition, ordered for stable listing
pub type CommandTable = BTreeMap<String, CommandDef>;

/// A single command definition
///
/// In `polyrun.toml` this is written as `false` (disabled), a string (shell
/// template) or an array of command names (sequence). Any other shape is
/// rejected while deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCommandDef", into = "RawCommandDef")]
pub enum CommandDef {
    /// Explicit no-op that produces a skip signal
    Disabled,
    /// Shell command template, may contain `${var}` placeholders
    Shell(String),
    /// Names of other commands on the same target, run in order
    Sequence(Vec<String>),
}

impl CommandDef {
    pub fn shell(template: impl Into<String>) -> Self {
        CommandDef::Shell(template.into())
    }

    pub fn sequence<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandDef::Sequence(names.into_iter().map(Into::into).collect())
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, CommandDef::Disabled)
    }
}

impl std::fmt::Display for CommandDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandDef::Disabled => write!(f, "(disabled)"),
            CommandDef::Shell(template) => write!(f, "{}", template),
            CommandDef::Sequence(names) => write!(f, "[{}]", names.join(", ")),
        }
    }
}

/// Wire shape of a command definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawCommandDef {
    Flag(bool),
    Shell(String),
    Sequence(Vec<String>),
}

impl TryFrom<RawCommandDef> for CommandDef {
    type Error = String;

    fn try_from(raw: RawCommandDef) -> Result<Self, Self::Error> {
        match raw {
            RawCommandDef::Flag(false) => Ok(CommandDef::Disabled),
            RawCommandDef::Flag(true) => Err(
                "invalid command definition `true`: use `false` to disable, a string, or a list of command names"
                    .to_string(),
            ),
            RawCommandDef::Shell(template) => Ok(CommandDef::Shell(template)),
            RawCommandDef::Sequence(names) => Ok(CommandDef::Sequence(names)),
        }
    }
}

impl From<CommandDef> for RawCommandDef {
    fn from(def: CommandDef) -> Self {
        match def {
            CommandDef::Disabled => RawCommandDef::Flag(false),
            CommandDef::Shell(template) => RawCommandDef::Shell(template),
            CommandDef::Sequence(names) => RawCommandDef::Sequence(names),
        }
    }
}

/// A resolved toolchain. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toolchain {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    pub commands: CommandTable,
}

impl Toolchain {
    pub fn new(name: impl Into<String>, commands: CommandTable) -> Self {
        Self {
            name: name.into(),
            extends: None,
            commands,
        }
    }

    pub fn command(&self, name: &str) -> Option<&CommandDef> {
        self.commands.get(name)
    }
}

//! Targets: configured language or auxiliary units
//!
//! A [`Target`] owns its resolved command table and everything needed to run
//! a command: directories, environment overrides, and interpolation variables.
//! Targets are built once from configuration and never mutated afterwards.

pub mod execute;
pub mod interpolate;
pub mod registry;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::TargetConfig;
use crate::error::ConfigError;
use crate::probe::{ScriptCache, SharedScriptCache};
use crate::toolchain::{detect_toolchain, CommandDef, CommandTable, ToolchainResolver};

pub use execute::{ExecOptions, Verbosity};
pub use registry::Registry;

/// What a target represents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    /// An implementation in one language
    #[default]
    Language,
    /// A grouping such as docs or shared fixtures
    Auxiliary,
}

impl TargetKind {
    /// Parse the `type` field of a target; absent means `language`
    pub fn parse(target: &str, value: Option<&str>) -> Result<Self, ConfigError> {
        match value {
            None | Some("language") => Ok(TargetKind::Language),
            Some("auxiliary") => Ok(TargetKind::Auxiliary),
            Some(other) => Err(ConfigError::InvalidTargetType {
                target: target.to_string(),
                value: other.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Language => "language",
            TargetKind::Auxiliary => "auxiliary",
        }
    }
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Shared inputs for building targets from configuration
pub struct BuildContext<'a> {
    /// Absolute project root
    pub root: &'a Path,
    pub resolver: &'a ToolchainResolver,
    /// Project version, exposed as `${version}`
    pub version: Option<&'a str>,
    /// Detect a toolchain when a target names none
    pub auto_detect: bool,
    /// Timeout applied when a call sets none
    pub default_timeout: Option<Duration>,
    pub cache: Arc<dyn ScriptCache>,
}

/// A configured target
#[derive(Clone)]
pub struct Target {
    name: String,
    title: String,
    kind: TargetKind,
    directory: String,
    cwd: Option<String>,
    toolchain: Option<String>,
    commands: CommandTable,
    vars: HashMap<String, String>,
    env: HashMap<String, String>,
    depends_on: Vec<String>,
    demo_path: Option<String>,
    root_dir: PathBuf,
    version: Option<String>,
    default_timeout: Option<Duration>,
    cache: Arc<dyn ScriptCache>,
}

impl std::fmt::Debug for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Target")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("directory", &self.directory)
            .field("cwd", &self.cwd)
            .field("toolchain", &self.toolchain)
            .field("commands", &self.commands)
            .field("depends_on", &self.depends_on)
            .field("root_dir", &self.root_dir)
            .finish_non_exhaustive()
    }
}

impl Target {
    /// A language target named `name` in `<root_dir>/<name>` with no commands
    pub fn new(name: impl Into<String>, root_dir: impl Into<PathBuf>) -> Self {
        let name = name.into();
        Self {
            title: name.clone(),
            directory: name.clone(),
            name,
            kind: TargetKind::Language,
            cwd: None,
            toolchain: None,
            commands: CommandTable::new(),
            vars: HashMap::new(),
            env: HashMap::new(),
            depends_on: Vec::new(),
            demo_path: None,
            root_dir: root_dir.into(),
            version: None,
            default_timeout: None,
            cache: SharedScriptCache::global(),
        }
    }

    /// Build a target from its configuration entry
    ///
    /// Without an explicit `toolchain`, the toolchain is detected from the
    /// target directory when auto-detection is on; a target with neither has
    /// only its own commands.
    pub fn from_config(
        name: &str,
        config: &TargetConfig,
        ctx: &BuildContext<'_>,
    ) -> Result<Self, ConfigError> {
        let kind = TargetKind::parse(name, config.kind.as_deref())?;
        let mut target = Target::new(name, ctx.root).with_kind(kind);

        if let Some(directory) = &config.directory {
            target.directory = directory.clone();
        }
        target.cwd = config.cwd.clone();
        if let Some(title) = &config.title {
            target.title = title.clone();
        }

        let toolchain = match &config.toolchain {
            Some(toolchain) => Some(toolchain.clone()),
            None if ctx.auto_detect => detect_toolchain(&target.directory_path()),
            None => None,
        };

        target.commands = ctx.resolver.resolved_commands(toolchain.as_deref(), config)?;
        target.toolchain = toolchain;
        target.vars = config.vars.clone();
        target.env = config.env.clone();
        target.demo_path = config.demo_path.clone();
        target.version = ctx.version.map(str::to_string);
        target.default_timeout = ctx.default_timeout;
        target.cache = Arc::clone(&ctx.cache);

        for dependency in &config.depends_on {
            target = target.with_dependency(dependency.clone());
        }

        tracing::debug!(
            "Built target '{}' (toolchain: {}, {} commands)",
            target.name,
            target.toolchain.as_deref().unwrap_or("none"),
            target.commands.len()
        );

        Ok(target)
    }

    pub fn with_kind(mut self, kind: TargetKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_directory(mut self, directory: impl Into<String>) -> Self {
        self.directory = directory.into();
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<String>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn with_toolchain_commands(mut self, toolchain: impl Into<String>, commands: CommandTable) -> Self {
        self.toolchain = Some(toolchain.into());
        self.commands = commands;
        self
    }

    pub fn with_command(mut self, name: impl Into<String>, def: CommandDef) -> Self {
        self.commands.insert(name.into(), def);
        self
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Add a dependency; repeated names are kept once, first position wins
    pub fn with_dependency(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.depends_on.contains(&name) {
            self.depends_on.push(name);
        }
        self
    }

    pub fn with_demo_path(mut self, path: impl Into<String>) -> Self {
        self.demo_path = Some(path.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }

    pub fn with_cache(mut self, cache: Arc<dyn ScriptCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    /// Directory relative to the project root
    pub fn directory(&self) -> &str {
        &self.directory
    }

    /// Working directory relative to the project root
    pub fn cwd(&self) -> &str {
        self.cwd.as_deref().unwrap_or(&self.directory)
    }

    /// Toolchain the command table came from, if any
    pub fn toolchain(&self) -> Option<&str> {
        self.toolchain.as_deref()
    }

    pub fn commands(&self) -> &CommandTable {
        &self.commands
    }

    pub fn vars(&self) -> &HashMap<String, String> {
        &self.vars
    }

    pub fn env(&self) -> &HashMap<String, String> {
        &self.env
    }

    pub fn depends_on(&self) -> &[String] {
        &self.depends_on
    }

    pub fn demo_path(&self) -> Option<&str> {
        self.demo_path.as_deref()
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// `<root>/<directory>`
    pub fn directory_path(&self) -> PathBuf {
        self.root_dir.join(&self.directory)
    }

    /// `<root>/<cwd>`, where commands run
    pub fn working_dir(&self) -> PathBuf {
        self.root_dir.join(self.cwd())
    }

    pub fn has_command(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Names of runnable commands, without `:quiet`/`:verbose` variants
    pub fn command_names(&self) -> Vec<&str> {
        self.commands
            .keys()
            .map(String::as_str)
            .filter(|name| !name.contains(':'))
            .collect()
    }

    /// Variables available to `${...}`: builtins overlaid by custom vars
    pub fn variables(&self) -> HashMap<String, String> {
        let mut vars = HashMap::from([
            ("target".to_string(), self.name.clone()),
            ("target_dir".to_string(), self.directory.clone()),
            (
                "root".to_string(),
                self.root_dir.to_string_lossy().into_owned(),
            ),
            (
                "version".to_string(),
                self.version.clone().unwrap_or_default(),
            ),
        ]);
        vars.extend(self.vars.iter().map(|(k, v)| (k.clone(), v.clone())));
        vars
    }

    /// Read-only view for listings and documentation
    pub fn view(&self) -> TargetView {
        TargetView {
            name: self.name.clone(),
            title: self.title.clone(),
            kind: self.kind,
            directory: self.directory.clone(),
            toolchain: self.toolchain.clone(),
            depends_on: self.depends_on.clone(),
            demo_path: self.demo_path.clone(),
            commands: self.command_names().into_iter().map(str::to_string).collect(),
        }
    }
}

/// Serializable snapshot of a target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetView {
    pub name: String,
    pub title: String,
    pub kind: TargetKind,
    pub directory: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toolchain: Option<String>,
    pub depends_on: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demo_path: Option<String>,
    pub commands: Vec<String>,
}

//! Configuration model for polyrun
//!
//! Mirrors `polyrun.toml`: project metadata, custom toolchains and targets.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::toolchain::CommandTable;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Project metadata
    #[serde(default)]
    pub project: ProjectConfig,

    /// Defaults applied to every execution
    #[serde(default)]
    pub defaults: Defaults,

    /// Custom toolchains, shadowing built-ins of the same name
    #[serde(default)]
    pub toolchains: HashMap<String, ToolchainConfig>,

    /// Targets keyed by name
    #[serde(default)]
    pub targets: HashMap<String, TargetConfig>,
}

/// Project metadata
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ProjectConfig {
    pub name: Option<String>,

    /// Project version, exposed to commands as `${version}`
    pub version: Option<String>,
}

/// Execution defaults
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    /// Timeout in seconds for each shell command (0 = no timeout)
    #[serde(default)]
    pub timeout: u64,

    /// Infer a toolchain from marker files when a target names none
    #[serde(default = "default_auto_detect")]
    pub auto_detect: bool,
}

fn default_auto_detect() -> bool {
    true
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout: 0,
            auto_detect: default_auto_detect(),
        }
    }
}

/// A custom toolchain declaration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ToolchainConfig {
    /// Base toolchain whose commands are inherited
    pub extends: Option<String>,

    /// Commands declared (or overridden) by this toolchain
    #[serde(default)]
    pub commands: CommandTable,
}

/// A target declaration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct TargetConfig {
    /// `language` (default) or `auxiliary`
    #[serde(rename = "type")]
    pub kind: Option<String>,

    /// Display title (defaults to the target name)
    pub title: Option<String>,

    /// Directory relative to the project root (defaults to the target name)
    pub directory: Option<String>,

    /// Working directory relative to the project root (defaults to `directory`)
    pub cwd: Option<String>,

    /// Toolchain name; auto-detected when absent
    pub toolchain: Option<String>,

    /// Command overrides applied on top of the toolchain's table
    #[serde(default)]
    pub commands: CommandTable,

    /// Environment overrides for every command of this target
    #[serde(default)]
    pub env: HashMap<String, String>,

    /// Custom interpolation variables
    #[serde(default)]
    pub vars: HashMap<String, String>,

    /// Targets that must run before this one
    #[serde(default)]
    pub depends_on: Vec<String>,

    /// Path to a demo file, used by documentation generation
    pub demo_path: Option<String>,
}

impl Config {
    /// List all configured target names, sorted
    pub fn list_targets(&self) -> Vec<String> {
        let mut names: Vec<String> = self.targets.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a target is configured
    pub fn has_target(&self, name: &str) -> bool {
        self.targets.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolchain::CommandDef;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.targets.is_empty());
        assert!(config.toolchains.is_empty());
        assert_eq!(config.defaults.timeout, 0);
        assert!(config.defaults.auto_detect);
    }

    #[test]
    fn test_deserialize_minimal_config() {
        let toml = r#"
            [targets.rust]
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        let rust = config.targets.get("rust").unwrap();

        assert!(rust.kind.is_none());
        assert!(rust.toolchain.is_none());
        assert!(rust.depends_on.is_empty());
        assert!(config.defaults.auto_detect);
    }

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
            [project]
            name = "hello"
            version = "1.4.0"

            [defaults]
            timeout = 120
            auto_detect = false

            [toolchains.web]
            extends = "npm"

            [toolchains.web.commands]
            lint = "npx eslint ."
            format = false
            ci = ["lint", "test"]

            [targets.typescript]
            type = "language"
            title = "TypeScript"
            directory = "ts"
            cwd = "ts/app"
            toolchain = "web"
            depends_on = ["proto"]
            demo_path = "src/demo.ts"

            [targets.typescript.env]
            NODE_ENV = "test"

            [targets.typescript.vars]
            entry = "src/main.ts"

            [targets.proto]
            type = "auxiliary"

            [targets.proto.commands]
            build = "buf generate"
        "#;

        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.project.version.as_deref(), Some("1.4.0"));
        assert_eq!(config.defaults.timeout, 120);
        assert!(!config.defaults.auto_detect);

        let web = config.toolchains.get("web").unwrap();
        assert_eq!(web.extends.as_deref(), Some("npm"));
        assert_eq!(web.commands.get("format"), Some(&CommandDef::Disabled));
        assert_eq!(
            web.commands.get("ci"),
            Some(&CommandDef::sequence(["lint", "test"]))
        );

        let ts = config.targets.get("typescript").unwrap();
        assert_eq!(ts.kind.as_deref(), Some("language"));
        assert_eq!(ts.directory.as_deref(), Some("ts"));
        assert_eq!(ts.cwd.as_deref(), Some("ts/app"));
        assert_eq!(ts.depends_on, vec!["proto"]);
        assert_eq!(ts.env.get("NODE_ENV"), Some(&"test".to_string()));
        assert_eq!(ts.vars.get("entry"), Some(&"src/main.ts".to_string()));

        let proto = config.targets.get("proto").unwrap();
        assert_eq!(
            proto.commands.get("build"),
            Some(&CommandDef::shell("buf generate"))
        );
    }

    #[test]
    fn test_list_targets_sorted() {
        let toml = r#"
            [targets.zig]
            [targets.go]
            [targets.c]
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.list_targets(), vec!["c", "go", "zig"]);
        assert!(config.has_target("go"));
        assert!(!config.has_target("rust"));
    }

    #[test]
    fn test_config_serialization() {
        let toml = r#"
            [targets.rust.commands]
            fmt = false
            build = "cargo build"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        let toml_str = toml::to_string_pretty(&config).unwrap();

        // Should be able to deserialize what we serialized
        let back: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(
            back.targets["rust"].commands.get("fmt"),
            Some(&CommandDef::Disabled)
        );
    }
}
